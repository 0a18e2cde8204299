/*
 * callsheet/src/resolve.rs
 *
 * Name resolution for attendee tokens.
 *
 * Known names pass straight through. Unknown ones are "conflicts": a
 * `DecisionPrompt` collaborator (a human at a terminal, or a scripted fake in
 * tests) decides what the token means, the decision is applied to the roster,
 * and it may be remembered for the rest of the run in a `ResolutionCache`.
 *
 * The roster is never owned here. Callers hand in `&mut Roster` on every
 * call so the single writer stays explicit.
 */

use crate::model::roster::{FULL_CAST, Roster};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

/// Everything a collaborator needs to decide about one unknown token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictPrompt {
    pub token: String,
    pub date: NaiveDate,
    pub time: String,
    pub actors: Vec<String>,
    pub roles: Vec<String>,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    Ignore,
    FullCast,
    MapToRole(String),
    MapToGroup(String),
    NewRoleForActor(String),
    NewGroup(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub outcome: DecisionOutcome,
    pub apply_to_all: bool,
}

impl Decision {
    pub fn once(outcome: DecisionOutcome) -> Self {
        Self {
            outcome,
            apply_to_all: false,
        }
    }

    pub fn always(outcome: DecisionOutcome) -> Self {
        Self {
            outcome,
            apply_to_all: true,
        }
    }
}

/// Source of human decisions. Implementations must only return valid
/// outcomes; use [`Selection::into_outcome`] to check raw picks.
pub trait DecisionPrompt {
    fn decide(&mut self, request: &ConflictPrompt) -> Decision;
}

/// Raw picks from a menu, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub actors: Vec<String>,
    pub roles: Vec<String>,
    pub groups: Vec<String>,
    pub full_cast: bool,
    pub ignore: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    Empty,
    MixedCategories,
    MultipleRolesOrGroups,
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::Empty => write!(f, "Nothing was selected."),
            SelectionError::MixedCategories => write!(
                f,
                "Pick from one category only: actors, a role, a group, full cast or ignore."
            ),
            SelectionError::MultipleRolesOrGroups => {
                write!(f, "Pick exactly one role or one group.")
            }
        }
    }
}

impl std::error::Error for SelectionError {}

impl Selection {
    pub fn into_outcome(mut self) -> Result<DecisionOutcome, SelectionError> {
        let mut seen = std::collections::HashSet::new();
        self.actors.retain(|a| seen.insert(a.clone()));

        let categories = [
            !self.actors.is_empty(),
            !self.roles.is_empty(),
            !self.groups.is_empty(),
            self.full_cast,
            self.ignore,
        ]
        .iter()
        .filter(|picked| **picked)
        .count();

        match categories {
            0 => return Err(SelectionError::Empty),
            1 => {}
            _ => return Err(SelectionError::MixedCategories),
        }
        if self.roles.len() > 1 || self.groups.len() > 1 {
            return Err(SelectionError::MultipleRolesOrGroups);
        }

        if self.ignore {
            return Ok(DecisionOutcome::Ignore);
        }
        if self.full_cast {
            return Ok(DecisionOutcome::FullCast);
        }
        if let Some(role) = self.roles.pop() {
            return Ok(DecisionOutcome::MapToRole(role));
        }
        if let Some(group) = self.groups.pop() {
            return Ok(DecisionOutcome::MapToGroup(group));
        }
        if self.actors.len() == 1 {
            return Ok(DecisionOutcome::NewRoleForActor(self.actors.remove(0)));
        }
        Ok(DecisionOutcome::NewGroup(self.actors))
    }
}

/// What a remembered decision replays to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedDecision {
    Ignore,
    FullCast,
    MappedTo(String),
}

impl CachedDecision {
    fn replay(&self) -> Option<String> {
        match self {
            CachedDecision::Ignore => None,
            CachedDecision::FullCast => Some(FULL_CAST.to_string()),
            CachedDecision::MappedTo(name) => Some(name.clone()),
        }
    }
}

/// Per-run memo of "apply to all" decisions, keyed by the uppercased token.
#[derive(Debug, Clone, Default)]
pub struct ResolutionCache {
    entries: HashMap<String, CachedDecision>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, token: &str) -> Option<&CachedDecision> {
        self.entries.get(&token.trim().to_uppercase())
    }

    pub fn remember(&mut self, token: &str, decision: CachedDecision) {
        self.entries.insert(token.trim().to_uppercase(), decision);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    pub conflicts: usize,
    pub prompts: usize,
    pub cache_hits: usize,
    pub roles_created: usize,
    pub groups_created: usize,
}

pub struct NameResolver<'a> {
    prompt: &'a mut dyn DecisionPrompt,
    excluded: Vec<String>,
    cache: ResolutionCache,
    stats: ResolutionStats,
}

impl<'a> NameResolver<'a> {
    pub fn new(prompt: &'a mut dyn DecisionPrompt, excluded_tokens: &[String]) -> Self {
        Self {
            prompt,
            excluded: excluded_tokens
                .iter()
                .map(|t| t.trim().to_uppercase())
                .collect(),
            cache: ResolutionCache::new(),
            stats: ResolutionStats::default(),
        }
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub fn stats(&self) -> ResolutionStats {
        self.stats
    }

    /// Maps a raw attendee token to a canonical name, or `None` to drop it.
    pub fn resolve(
        &mut self,
        roster: &mut Roster,
        token: &str,
        date: NaiveDate,
        time: &str,
    ) -> Option<String> {
        let token = token.trim();
        if token.is_empty() || self.excluded.contains(&token.to_uppercase()) {
            return None;
        }
        if roster.contains_name(token) {
            return Some(token.to_string());
        }

        self.stats.conflicts += 1;
        log::info!("Unrecognized name '{}' on {} at {}", token, date, time);
        self.resolve_conflict(roster, token, date, time)
    }

    pub fn resolve_conflict(
        &mut self,
        roster: &mut Roster,
        token: &str,
        date: NaiveDate,
        time: &str,
    ) -> Option<String> {
        if let Some(cached) = self.cache.get(token) {
            self.stats.cache_hits += 1;
            log::debug!("Reusing earlier decision for '{}': {:?}", token, cached);
            return cached.replay();
        }

        let request = ConflictPrompt {
            token: token.to_string(),
            date,
            time: time.to_string(),
            actors: roster.list_actors(),
            roles: roster.list_roles(),
            groups: roster.list_groups(),
        };
        self.stats.prompts += 1;
        let decision = self.prompt.decide(&request);
        let upper = token.to_uppercase();

        let (result, cached) = match decision.outcome {
            DecisionOutcome::Ignore => {
                log::info!("Ignoring '{}'", token);
                (None, CachedDecision::Ignore)
            }
            DecisionOutcome::FullCast => {
                log::info!("'{}' means the full cast", token);
                (Some(FULL_CAST.to_string()), CachedDecision::FullCast)
            }
            DecisionOutcome::MapToRole(name) | DecisionOutcome::MapToGroup(name) => {
                log::info!("'{}' maps to '{}'", token, name);
                (Some(name.clone()), CachedDecision::MappedTo(name))
            }
            DecisionOutcome::NewRoleForActor(actor) => {
                roster.add_role_to_actor(&actor, &upper);
                self.stats.roles_created += 1;
                log::info!("Created role '{}' for {}", upper, actor);
                (Some(upper.clone()), CachedDecision::MappedTo(upper))
            }
            DecisionOutcome::NewGroup(actors) => {
                if actors.len() < 2 {
                    log::warn!(
                        "Group '{}' created with {} member(s); expected at least two",
                        upper,
                        actors.len()
                    );
                }
                roster.add_group(&upper, &actors);
                self.stats.groups_created += 1;
                log::info!("Created group '{}' with {}", upper, actors.join(", "));
                (Some(upper.clone()), CachedDecision::MappedTo(upper))
            }
        };

        if decision.apply_to_all {
            self.cache.remember(token, cached);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(actors: &[&str], roles: &[&str], groups: &[&str]) -> Selection {
        Selection {
            actors: actors.iter().map(|s| s.to_string()).collect(),
            roles: roles.iter().map(|s| s.to_string()).collect(),
            groups: groups.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn selection_rejects_empty_and_mixed() {
        assert_eq!(
            Selection::default().into_outcome(),
            Err(SelectionError::Empty)
        );
        assert_eq!(
            pick(&["Ann"], &["MATE"], &[]).into_outcome(),
            Err(SelectionError::MixedCategories)
        );
        assert_eq!(
            pick(&[], &["MATE"], &["CREW"]).into_outcome(),
            Err(SelectionError::MixedCategories)
        );
        let mut ignore_and_cast = Selection::default();
        ignore_and_cast.ignore = true;
        ignore_and_cast.full_cast = true;
        assert_eq!(
            ignore_and_cast.into_outcome(),
            Err(SelectionError::MixedCategories)
        );
    }

    #[test]
    fn selection_rejects_two_roles() {
        assert_eq!(
            pick(&[], &["MATE", "COOK"], &[]).into_outcome(),
            Err(SelectionError::MultipleRolesOrGroups)
        );
        assert_eq!(
            pick(&[], &[], &["CREW", "BAND"]).into_outcome(),
            Err(SelectionError::MultipleRolesOrGroups)
        );
    }

    #[test]
    fn selection_actor_count_picks_outcome() {
        assert_eq!(
            pick(&["Ann"], &[], &[]).into_outcome(),
            Ok(DecisionOutcome::NewRoleForActor("Ann".to_string()))
        );
        // Picking the same actor twice is still a single actor.
        assert_eq!(
            pick(&["Ann", "Ann"], &[], &[]).into_outcome(),
            Ok(DecisionOutcome::NewRoleForActor("Ann".to_string()))
        );
        assert_eq!(
            pick(&["Ann", "Bo"], &[], &[]).into_outcome(),
            Ok(DecisionOutcome::NewGroup(vec![
                "Ann".to_string(),
                "Bo".to_string()
            ]))
        );
        assert_eq!(
            pick(&[], &[], &["CREW"]).into_outcome(),
            Ok(DecisionOutcome::MapToGroup("CREW".to_string()))
        );
    }

    #[test]
    fn cache_keys_are_case_insensitive() {
        let mut cache = ResolutionCache::new();
        cache.remember("Pirates ", CachedDecision::MappedTo("CREW".into()));
        assert_eq!(
            cache.get("pirates"),
            Some(&CachedDecision::MappedTo("CREW".into()))
        );
        assert_eq!(cache.len(), 1);
    }
}
