// File: src/controller.rs
//! One conversion run: load the roster, parse the call sheet, persist results.
//! The binary and the tests both go through `ScheduleController` so the
//! load -> parse -> save ordering lives in one place.
use crate::config::Config;
use crate::context::AppContext;
use crate::model::parser::{ParserOptions, ScheduleParser};
use crate::model::roster::Roster;
use crate::model::schedule::Schedule;
use crate::resolve::{DecisionPrompt, NameResolver, ResolutionStats};
use crate::storage::{LocalStorage, RosterStorage, ScheduleStorage};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Explicit paths win over the ones derived from the config.
#[derive(Debug, Clone, Default)]
pub struct RunPaths {
    pub source: PathBuf,
    pub cast: Option<PathBuf>,
    pub mappings: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub schedule: Schedule,
    pub roster: Roster,
    pub stats: ResolutionStats,
    pub roster_changed: bool,
    pub schedule_path: PathBuf,
}

pub struct ScheduleController<'c> {
    ctx: &'c dyn AppContext,
    config: Config,
}

impl<'c> ScheduleController<'c> {
    pub fn new(ctx: &'c dyn AppContext, config: Config) -> Self {
        Self { ctx, config }
    }

    fn roster_storage(&self, paths: &RunPaths) -> Result<RosterStorage> {
        let cast = match &paths.cast {
            Some(p) => p.clone(),
            None => self.ctx.get_cast_path(&self.config)?,
        };
        let mappings = match &paths.mappings {
            Some(p) => p.clone(),
            None => self.ctx.get_mappings_path(&self.config)?,
        };
        Ok(RosterStorage::new(cast, mappings))
    }

    /// Parses `text` against `roster` in memory. No IO.
    pub fn convert(
        &self,
        text: &str,
        roster: &mut Roster,
        prompt: &mut dyn DecisionPrompt,
    ) -> (Schedule, ResolutionStats) {
        let parser = ScheduleParser::new(ParserOptions::from(&self.config));
        let mut resolver = NameResolver::new(prompt, &self.config.excluded_tokens);
        let schedule = parser.parse(text, roster, &mut resolver);
        (schedule, resolver.stats())
    }

    /// Full run. With `dry_run` nothing is written back.
    pub fn run(
        &self,
        paths: &RunPaths,
        prompt: &mut dyn DecisionPrompt,
        dry_run: bool,
    ) -> Result<RunOutcome> {
        let storage = self.roster_storage(paths)?;
        let mut roster = storage.load()?;
        let text = LocalStorage::read_text(&paths.source)?;
        let before = roster.clone();

        let (schedule, stats) = self.convert(&text, &mut roster, prompt);
        let roster_changed = roster != before;

        let schedule_path = match &paths.output {
            Some(p) => p.clone(),
            None => self.ctx.get_schedule_path(&self.config)?,
        };

        if dry_run {
            log::info!("Dry run: nothing written");
        } else {
            ScheduleStorage::save(&schedule_path, &schedule)
                .context("Failed to save the schedule")?;
            if roster_changed {
                storage.save(&roster).context("Failed to save the roster")?;
            }
        }

        Ok(RunOutcome {
            schedule,
            roster,
            stats,
            roster_changed,
            schedule_path,
        })
    }
}
