// File: ./src/context.rs
/*! Where callsheet keeps its files.

`config.toml` sits in the config directory. The cast roster, the group
mappings and the generated schedule sit in the data directory unless the
config names them with an absolute path. `StandardContext` uses the platform
directories, or `<root>/config` and `<root>/data` when `--root` is given.
`TestContext` puts both under a throwaway directory.
*/

use crate::config::Config;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.toml";

pub trait AppContext: Send + Sync + std::fmt::Debug {
    fn get_data_dir(&self) -> Result<PathBuf>;
    fn get_config_dir(&self) -> Result<PathBuf>;

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(self.get_config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Absolute names are used as given, relative ones land in the data dir.
    fn get_data_path(&self, name: &str) -> Result<PathBuf> {
        let path = Path::new(name);
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }
        Ok(self.get_data_dir()?.join(path))
    }

    fn get_cast_path(&self, config: &Config) -> Result<PathBuf> {
        self.get_data_path(&config.cast_file)
    }

    fn get_mappings_path(&self, config: &Config) -> Result<PathBuf> {
        self.get_data_path(&config.mappings_file)
    }

    fn get_schedule_path(&self, config: &Config) -> Result<PathBuf> {
        self.get_data_path(&config.schedule_file)
    }
}

fn created(dir: PathBuf) -> Result<PathBuf> {
    fs::create_dir_all(&dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    Ok(dir)
}

#[derive(Clone, Debug, Default)]
pub struct StandardContext {
    root: Option<PathBuf>,
}

impl StandardContext {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn dir(&self, under_root: &str, platform: fn(&ProjectDirs) -> &Path) -> Result<PathBuf> {
        let dir = match &self.root {
            Some(root) => root.join(under_root),
            None => {
                let dirs = ProjectDirs::from("org", "callsheet", "callsheet")
                    .context("No home directory to keep the cast roster in")?;
                platform(&dirs).to_path_buf()
            }
        };
        created(dir)
    }
}

impl AppContext for StandardContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        self.dir("data", ProjectDirs::data_dir)
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        self.dir("config", ProjectDirs::config_dir)
    }
}

/// Scratch directory for one test, deleted when the context goes away.
#[derive(Clone, Debug)]
pub struct TestContext {
    pub root: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("callsheet-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&root).expect("scratch directory for TestContext");
        Self { root }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        created(self.root.join("data"))
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        created(self.root.join("config"))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}
