// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::model::parser::{DEFAULT_CALL, DEFAULT_FRIDAY_CALL, DEFAULT_REFERENCE_YEAR};
use crate::storage::LocalStorage;
use anyhow::{Context, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;

fn default_reference_year() -> i32 {
    DEFAULT_REFERENCE_YEAR
}
fn default_friday_call_time() -> String {
    DEFAULT_FRIDAY_CALL.to_string()
}
fn default_call_time() -> String {
    DEFAULT_CALL.to_string()
}

fn default_excluded_tokens() -> Vec<String> {
    vec!["WORSHIP".to_string()]
}

fn default_cast_file() -> String {
    "cast.json".to_string()
}
fn default_mappings_file() -> String {
    "group_mappings.json".to_string()
}
fn default_schedule_file() -> String {
    "schedules.json".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_reference_year")]
    pub reference_year: i32,
    #[serde(default = "default_friday_call_time")]
    pub friday_call_time: String,
    #[serde(default = "default_call_time")]
    pub default_call_time: String,

    /// Attendee tokens dropped without asking (non-attendance activities).
    #[serde(default = "default_excluded_tokens")]
    pub excluded_tokens: Vec<String>,

    // Resolved through `AppContext::get_data_path`.
    #[serde(default = "default_cast_file")]
    pub cast_file: String,
    #[serde(default = "default_mappings_file")]
    pub mappings_file: String,
    #[serde(default = "default_schedule_file")]
    pub schedule_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_year: DEFAULT_REFERENCE_YEAR,
            friday_call_time: DEFAULT_FRIDAY_CALL.to_string(),
            default_call_time: DEFAULT_CALL.to_string(),
            excluded_tokens: default_excluded_tokens(),
            cast_file: default_cast_file(),
            mappings_file: default_mappings_file(),
            schedule_file: default_schedule_file(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;

        Ok(config)
    }

    /// Loads the config, writing the defaults out first if there is none yet.
    pub fn load_or_init(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(config) => Ok(config),
            Err(e) if Self::is_missing_config_error(&e) => {
                let config = Self::default();
                config.save(ctx)?;
                log::info!("Wrote default config to {}", Self::get_path_string(ctx)?);
                Ok(config)
            }
            Err(e) => Err(e),
        }
    }

    /// Detects whether an error means the config file was missing, either
    /// our own "not found" message or an IO NotFound somewhere in the chain.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }
        err.chain().any(|cause| {
            cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
        })
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    pub fn get_path_string(ctx: &dyn AppContext) -> Result<String> {
        let path = ctx.get_config_file_path()?;
        Ok(path.to_string_lossy().to_string())
    }
}
