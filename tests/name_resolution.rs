// File: tests/name_resolution.rs
use callsheet::model::{CastDocument, GroupMappings, Roster};
use callsheet::resolve::{
    CachedDecision, ConflictPrompt, Decision, DecisionOutcome, DecisionPrompt, NameResolver,
};
use chrono::NaiveDate;
use std::collections::VecDeque;

/// Hands out pre-recorded decisions and remembers every question asked.
#[derive(Default)]
struct ScriptedPrompt {
    answers: VecDeque<Decision>,
    asked: Vec<ConflictPrompt>,
}

impl ScriptedPrompt {
    fn with(answers: Vec<Decision>) -> Self {
        Self {
            answers: answers.into(),
            asked: Vec::new(),
        }
    }
}

impl DecisionPrompt for ScriptedPrompt {
    fn decide(&mut self, request: &ConflictPrompt) -> Decision {
        self.asked.push(request.clone());
        self.answers
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt for '{}'", request.token))
    }
}

fn sample_roster() -> Roster {
    let mut cast = CastDocument::default();
    for (actor, roles) in [
        ("Ann Lee", vec!["CAPTAIN", "PIRATES"]),
        ("Bo Diaz", vec!["MATE", "PIRATES"]),
        ("Cy Park", vec!["MERMAID"]),
    ] {
        cast.actors.push(actor.to_string());
        cast.actor_roles.insert(
            actor.to_string(),
            roles.into_iter().map(String::from).collect(),
        );
    }
    let mut mappings = GroupMappings::new();
    for g in ["PIRATES", "ALPHA", "BETA"] {
        mappings.insert(g.to_string(), g.to_string());
    }
    Roster::from_documents(cast, mappings)
}

fn sept(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, day).unwrap()
}

#[test]
fn test_known_names_pass_through_unchanged() {
    let mut roster = sample_roster();
    let mut prompt = ScriptedPrompt::default();
    let mut resolver = NameResolver::new(&mut prompt, &["WORSHIP".to_string()]);

    for token in ["ALPHA", "beta", "Captain", "full cast", "FULL CAST", "Mermaid"] {
        assert_eq!(
            resolver.resolve(&mut roster, token, sept(5), "5:30-9:00"),
            Some(token.to_string()),
            "{} should resolve as itself",
            token
        );
    }
    assert_eq!(resolver.stats().prompts, 0);
    drop(resolver);
    assert!(prompt.asked.is_empty());
}

#[test]
fn test_excluded_and_empty_tokens_are_dropped_silently() {
    let mut roster = sample_roster();
    let mut prompt = ScriptedPrompt::default();
    let mut resolver = NameResolver::new(&mut prompt, &["WORSHIP".to_string()]);

    assert_eq!(resolver.resolve(&mut roster, "Worship", sept(5), "9:00-10:00"), None);
    assert_eq!(resolver.resolve(&mut roster, "WORSHIP", sept(5), "9:00-10:00"), None);
    assert_eq!(resolver.resolve(&mut roster, "   ", sept(5), "9:00-10:00"), None);
    assert_eq!(resolver.resolve(&mut roster, "", sept(5), "9:00-10:00"), None);
    assert_eq!(resolver.stats().conflicts, 0);
    drop(resolver);
    assert!(prompt.asked.is_empty());
}

#[test]
fn test_prompt_receives_context_and_sorted_lists() {
    let mut roster = sample_roster();
    let mut prompt = ScriptedPrompt::with(vec![Decision::once(DecisionOutcome::Ignore)]);
    let mut resolver = NameResolver::new(&mut prompt, &[]);

    assert_eq!(resolver.resolve(&mut roster, "Sharks", sept(6), "10:00-12:00"), None);
    drop(resolver);

    let asked = &prompt.asked[0];
    assert_eq!(asked.token, "Sharks");
    assert_eq!(asked.date, sept(6));
    assert_eq!(asked.time, "10:00-12:00");
    assert_eq!(asked.actors, vec!["Ann Lee", "Bo Diaz", "Cy Park"]);
    // PIRATES is a group alias, so it is listed as a group only.
    assert_eq!(asked.roles, vec!["CAPTAIN", "MATE", "MERMAID"]);
    assert_eq!(asked.groups, vec!["ALPHA", "BETA", "PIRATES"]);
}

#[test]
fn test_apply_to_all_skips_second_prompt() {
    let mut roster = sample_roster();
    let mut prompt = ScriptedPrompt::with(vec![Decision::always(DecisionOutcome::MapToGroup(
        "PIRATES".to_string(),
    ))]);
    let mut resolver = NameResolver::new(&mut prompt, &[]);

    let first = resolver.resolve(&mut roster, "Buccaneers", sept(5), "5:30-9:00");
    let second = resolver.resolve(&mut roster, "buccaneers", sept(6), "9:30-2:00");

    assert_eq!(first, Some("PIRATES".to_string()));
    assert_eq!(second, Some("PIRATES".to_string()));
    assert_eq!(resolver.stats().prompts, 1);
    assert_eq!(resolver.stats().cache_hits, 1);
    assert_eq!(
        resolver.cache().get("BUCCANEERS"),
        Some(&CachedDecision::MappedTo("PIRATES".to_string()))
    );
    drop(resolver);
    assert_eq!(prompt.asked.len(), 1);
}

#[test]
fn test_one_off_decision_asks_again() {
    let mut roster = sample_roster();
    let mut prompt = ScriptedPrompt::with(vec![
        Decision::once(DecisionOutcome::FullCast),
        Decision::once(DecisionOutcome::Ignore),
    ]);
    let mut resolver = NameResolver::new(&mut prompt, &[]);

    assert_eq!(
        resolver.resolve(&mut roster, "Everyone", sept(5), "5:30-9:00"),
        Some("FULL CAST".to_string())
    );
    assert_eq!(resolver.resolve(&mut roster, "Everyone", sept(6), "9:30-2:00"), None);
    assert!(resolver.cache().is_empty());
    drop(resolver);
    assert_eq!(prompt.asked.len(), 2);
}

#[test]
fn test_cached_ignore_and_full_cast_replay() {
    let mut roster = sample_roster();
    let mut prompt = ScriptedPrompt::with(vec![
        Decision::always(DecisionOutcome::Ignore),
        Decision::always(DecisionOutcome::FullCast),
    ]);
    let mut resolver = NameResolver::new(&mut prompt, &[]);

    assert_eq!(resolver.resolve(&mut roster, "Lunch", sept(5), "12:00-1:00"), None);
    assert_eq!(resolver.resolve(&mut roster, "LUNCH", sept(6), "12:00-1:00"), None);
    assert_eq!(
        resolver.resolve(&mut roster, "All", sept(5), "5:30-9:00"),
        Some("FULL CAST".to_string())
    );
    assert_eq!(
        resolver.resolve(&mut roster, "all", sept(6), "5:30-9:00"),
        Some("FULL CAST".to_string())
    );
    assert_eq!(resolver.stats().prompts, 2);
}

#[test]
fn test_new_role_for_actor_updates_roster() {
    let mut roster = sample_roster();
    let mut prompt = ScriptedPrompt::with(vec![Decision::always(
        DecisionOutcome::NewRoleForActor("Cy Park".to_string()),
    )]);
    let mut resolver = NameResolver::new(&mut prompt, &[]);

    let result = resolver.resolve(&mut roster, "Sea Witch", sept(5), "5:30-9:00");
    assert_eq!(result, Some("SEA WITCH".to_string()));
    assert_eq!(roster.roles_of("Cy Park"), ["MERMAID", "SEA WITCH"]);
    // Now a known role: no conflict the second time round.
    assert!(roster.contains_name("sea witch"));
    assert_eq!(
        resolver.resolve(&mut roster, "Sea Witch", sept(6), "9:30-2:00"),
        Some("Sea Witch".to_string())
    );
    assert_eq!(resolver.stats().roles_created, 1);
    assert_eq!(resolver.stats().cache_hits, 0);
}

#[test]
fn test_new_group_registers_alias_and_members() {
    let mut roster = sample_roster();
    let mut prompt = ScriptedPrompt::with(vec![Decision::once(DecisionOutcome::NewGroup(vec![
        "Ann Lee".to_string(),
        "Cy Park".to_string(),
    ]))]);
    let mut resolver = NameResolver::new(&mut prompt, &[]);

    let result = resolver.resolve(&mut roster, "Duet", sept(5), "5:30-9:00");
    assert_eq!(result, Some("DUET".to_string()));
    assert_eq!(resolver.stats().groups_created, 1);
    drop(resolver);

    assert_eq!(roster.canonical_group("DUET"), Some("DUET"));
    assert!(roster.list_groups().contains(&"DUET".to_string()));
    assert!(roster.roles_of("Ann Lee").contains(&"DUET".to_string()));
    assert!(roster.roles_of("Cy Park").contains(&"DUET".to_string()));
    assert!(!roster.roles_of("Bo Diaz").contains(&"DUET".to_string()));
    assert!(!roster.list_roles().contains(&"DUET".to_string()));
}

#[test]
fn test_map_to_role_returns_role_verbatim() {
    let mut roster = sample_roster();
    let before = roster.clone();
    let mut prompt = ScriptedPrompt::with(vec![Decision::once(DecisionOutcome::MapToRole(
        "CAPTAIN".to_string(),
    ))]);
    let mut resolver = NameResolver::new(&mut prompt, &[]);

    assert_eq!(
        resolver.resolve(&mut roster, "Capt.", sept(5), "5:30-9:00"),
        Some("CAPTAIN".to_string())
    );
    drop(resolver);
    assert_eq!(roster, before, "mapping to an existing role must not touch the roster");
}
