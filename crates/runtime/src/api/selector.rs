//! Pre-match character choice.
//!
//! Each side names the character it brings through a [`CharacterSelector`].
//! A side that makes no choice leaves the match incomplete: it never starts.
use std::sync::Mutex;

use async_trait::async_trait;
use duel_core::Side;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::errors::Result;

/// A side's character pick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterChoice {
    pub name: String,
    /// The pick was left to chance; only changes the announcement.
    pub random: bool,
}

impl CharacterChoice {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            random: false,
        }
    }
}

#[async_trait]
pub trait CharacterSelector: Send + Sync {
    /// Picks one of `roster` for `side`, or `None` to decline the match.
    async fn select_character(&self, side: Side, roster: &[String])
    -> Result<Option<CharacterChoice>>;
}

/// Always answers with the same character, or always declines.
pub struct FixedSelector {
    choice: Option<CharacterChoice>,
}

impl FixedSelector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            choice: Some(CharacterChoice::named(name)),
        }
    }

    pub fn decline() -> Self {
        Self { choice: None }
    }
}

#[async_trait]
impl CharacterSelector for FixedSelector {
    async fn select_character(
        &self,
        _side: Side,
        _roster: &[String],
    ) -> Result<Option<CharacterChoice>> {
        Ok(self.choice.clone())
    }
}

/// Rolls for a character from the roster.
pub struct RandomSelector {
    rng: Mutex<StdRng>,
}

impl RandomSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

#[async_trait]
impl CharacterSelector for RandomSelector {
    async fn select_character(
        &self,
        _side: Side,
        roster: &[String],
    ) -> Result<Option<CharacterChoice>> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(roster.choose(&mut *rng).map(|name| CharacterChoice {
            name: name.clone(),
            random: true,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn random_selector_stays_inside_the_roster() {
        let roster = vec!["Stille".to_string(), "Denken".to_string()];
        let selector = RandomSelector::new(3);
        for _ in 0..16 {
            let choice = selector
                .select_character(Side::Challenger, &roster)
                .await
                .unwrap()
                .unwrap();
            assert!(choice.random);
            assert!(roster.contains(&choice.name));
        }
        assert_eq!(
            selector.select_character(Side::Challenged, &[]).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn fixed_selector_can_decline() {
        let roster = vec!["Aura".to_string()];
        let declined = FixedSelector::decline()
            .select_character(Side::Challenged, &roster)
            .await
            .unwrap();
        assert!(declined.is_none());
        let fixed = FixedSelector::new("Flamme")
            .select_character(Side::Challenged, &roster)
            .await
            .unwrap();
        assert_eq!(fixed, Some(CharacterChoice::named("Flamme")));
    }
}
