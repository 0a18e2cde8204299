// File: src/model/roster.rs
//! Cast roster: actors, the roles/groups each one carries, and group aliases.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel attendee meaning "everybody is called".
pub const FULL_CAST: &str = "FULL CAST";

/// On-disk shape of `cast.json`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CastDocument {
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub actor_roles: BTreeMap<String, Vec<String>>,
}

/// On-disk shape of `group_mappings.json` (alias -> canonical).
pub type GroupMappings = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    actors: Vec<String>,
    actor_roles: BTreeMap<String, Vec<String>>,
    group_mappings: GroupMappings,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the two persisted documents into one roster.
    ///
    /// Aliases are uppercased on the way in. Role lists are deduplicated
    /// ignoring case (first spelling wins) and any actor that only shows up as
    /// a key of `actor_roles` is added to the actor list so the two stay
    /// consistent.
    pub fn from_documents(cast: CastDocument, mappings: GroupMappings) -> Self {
        let mut roster = Self::new();
        for actor in cast.actors {
            roster.ensure_actor(&actor);
        }
        for (actor, roles) in cast.actor_roles {
            roster.ensure_actor(&actor);
            roster.actor_roles.entry(actor.clone()).or_default();
            for role in roles {
                roster.add_role_to_actor(&actor, &role);
            }
        }
        for (alias, canonical) in mappings {
            roster
                .group_mappings
                .insert(alias.trim().to_uppercase(), canonical.trim().to_uppercase());
        }
        roster
    }

    /// Splits the roster back into the documents it was loaded from.
    pub fn to_documents(&self) -> (CastDocument, GroupMappings) {
        let cast = CastDocument {
            actors: self.actors.clone(),
            actor_roles: self.actor_roles.clone(),
        };
        (cast, self.group_mappings.clone())
    }

    /// True if the token is the full-cast sentinel, a group alias, or a role
    /// held by any actor. Case-insensitive.
    pub fn contains_name(&self, token: &str) -> bool {
        let upper = token.trim().to_uppercase();
        if upper.is_empty() {
            return false;
        }
        if upper == FULL_CAST || self.group_mappings.contains_key(&upper) {
            return true;
        }
        self.actor_roles
            .values()
            .flatten()
            .any(|role| role.to_uppercase() == upper)
    }

    pub fn list_actors(&self) -> Vec<String> {
        let mut actors = self.actors.clone();
        actors.sort();
        actors
    }

    /// Roles that are not also registered as group aliases, one entry per
    /// case-insensitive name.
    pub fn list_roles(&self) -> Vec<String> {
        let mut roles: BTreeMap<String, &String> = BTreeMap::new();
        for role in self.actor_roles.values().flatten() {
            let upper = role.to_uppercase();
            if !self.group_mappings.contains_key(&upper) {
                roles.entry(upper).or_insert(role);
            }
        }
        roles.into_values().cloned().collect()
    }

    pub fn list_groups(&self) -> Vec<String> {
        self.group_mappings.keys().cloned().collect()
    }

    pub fn roles_of(&self, actor: &str) -> &[String] {
        self.actor_roles
            .get(actor)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn canonical_group(&self, alias: &str) -> Option<&str> {
        self.group_mappings
            .get(&alias.trim().to_uppercase())
            .map(String::as_str)
    }

    pub fn has_actor(&self, actor: &str) -> bool {
        self.actors.iter().any(|a| a == actor)
    }

    /// Appends `role` to the actor's role list unless it is already there in
    /// any case. Unknown actors are created on the fly.
    pub fn add_role_to_actor(&mut self, actor: &str, role: &str) {
        self.ensure_actor(actor);
        let roles = self.actor_roles.entry(actor.to_string()).or_default();
        let upper = role.to_uppercase();
        if !roles.iter().any(|r| r.to_uppercase() == upper) {
            log::debug!("Added role {} to {}", role, actor);
            roles.push(role.to_string());
        }
    }

    /// Registers `group` as a self-mapped alias and gives it to every member.
    pub fn add_group(&mut self, group: &str, members: &[String]) {
        self.group_mappings
            .insert(group.to_string(), group.to_string());
        for member in members {
            self.add_role_to_actor(member, group);
        }
    }

    fn ensure_actor(&mut self, actor: &str) {
        if !self.has_actor(actor) {
            self.actors.push(actor.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_documents_backfills_actor_list() {
        let mut cast = CastDocument::default();
        cast.actors.push("Ann Lee".to_string());
        cast.actor_roles
            .insert("Bo Diaz".to_string(), vec!["MATE".into(), "MATE".into()]);
        let mut mappings = GroupMappings::new();
        mappings.insert("crew".to_string(), "Crew".to_string());

        let roster = Roster::from_documents(cast, mappings);

        assert_eq!(roster.list_actors(), vec!["Ann Lee", "Bo Diaz"]);
        assert_eq!(roster.roles_of("Bo Diaz"), ["MATE"]);
        assert_eq!(roster.canonical_group("Crew"), Some("CREW"));
        assert!(roster.roles_of("Ann Lee").is_empty());
    }

    #[test]
    fn roles_differing_only_in_case_are_one_role() {
        let mut cast = CastDocument::default();
        cast.actor_roles
            .insert("Bo Diaz".to_string(), vec!["Mate".into(), "MATE".into()]);
        cast.actor_roles
            .insert("Cy Park".to_string(), vec!["MATE".into()]);
        let mut roster = Roster::from_documents(cast, GroupMappings::new());

        assert_eq!(roster.roles_of("Bo Diaz"), ["Mate"]);
        assert_eq!(roster.list_roles(), vec!["MATE"]);

        roster.add_role_to_actor("Cy Park", "mate");
        assert_eq!(roster.roles_of("Cy Park"), ["MATE"]);
    }

    #[test]
    fn saving_does_not_invent_empty_role_lists() {
        let mut cast = CastDocument::default();
        cast.actors = vec!["Ann Lee".into(), "Bo Diaz".into(), "Cy Park".into()];
        cast.actor_roles.insert("Cy Park".to_string(), Vec::new());
        let mut roster = Roster::from_documents(cast, GroupMappings::new());

        roster.add_group("DUO", &["Ann Lee".to_string()]);
        let (saved, _) = roster.to_documents();

        assert_eq!(saved.actors, vec!["Ann Lee", "Bo Diaz", "Cy Park"]);
        let keys: Vec<_> = saved.actor_roles.keys().cloned().collect();
        // Cy Park's empty list came from the input and is kept.
        assert_eq!(keys, vec!["Ann Lee", "Cy Park"]);
    }
}
