//! Name-indexed registry of playable characters.

use std::collections::BTreeMap;

use duel_core::{CharacterSource, CharacterTemplate};
use tracing::debug;

use crate::characters::{aura, denken, flamme, stille, ubel};

/// Character registry keyed by normalized name.
///
/// Lookups ignore case and accept `u` for `ü`, so `"ubel"` finds Übel.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    templates: BTreeMap<String, CharacterTemplate>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every shipped character.
    pub fn standard() -> Self {
        let mut roster = Self::new();
        roster.register(ubel::template());
        roster.register(stille::template());
        roster.register(denken::template());
        roster.register(flamme::template());
        roster.register(aura::template());
        roster
    }

    /// Adds `template`, replacing any character with the same normalized name.
    pub fn register(&mut self, template: CharacterTemplate) {
        let key = normalize(&template.name);
        debug!(target: "duel::content", name = %template.name, "registered character");
        self.templates.insert(key, template);
    }

    pub fn get(&self, name: &str) -> Option<&CharacterTemplate> {
        self.templates.get(&normalize(name))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CharacterTemplate> {
        self.templates.values()
    }
}

impl CharacterSource for Roster {
    fn character(&self, name: &str) -> Option<CharacterTemplate> {
        self.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        self.iter().map(|t| t.name.clone()).collect()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace('ü', "u")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_roster_ships_five_characters() {
        let roster = Roster::standard();
        assert_eq!(roster.len(), 5);
        let mut names = roster.names();
        names.sort();
        assert_eq!(names, vec!["Aura", "Denken", "Flamme", "Stille", "Übel"]);
    }

    #[test]
    fn lookup_ignores_case_and_umlaut() {
        let roster = Roster::standard();
        for query in ["Übel", "übel", "UBEL", " ubel "] {
            assert_eq!(
                roster.character(query).map(|t| t.name),
                Some("Übel".to_string()),
                "{query}"
            );
        }
        assert!(roster.character("Frieren").is_none());
    }

    #[test]
    fn every_deck_fills_a_starting_hand() {
        for template in Roster::standard().iter() {
            let cards: usize = template.deck.iter().map(|e| e.count).sum();
            assert!(cards >= 12, "{} has only {cards} cards", template.name);
            assert!(template.signature.is_some(), "{} lacks a signature", template.name);
        }
    }
}
