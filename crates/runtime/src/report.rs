//! Final summary of a match.

use duel_core::{Game, Outcome, PerSide, Side, Stats, TieReason};
use serde::{Deserialize, Serialize};

use crate::api::CharacterChoice;

/// How a match terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Win { winner: Side, loser: Side },
    Tie(TieReason),
    /// A side made no character choice, so no turn was played.
    Incomplete,
}

impl From<Outcome> for MatchResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win { winner, loser } => MatchResult::Win { winner, loser },
            Outcome::Tie(reason) => MatchResult::Tie(reason),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub result: MatchResult,
    pub turns: u32,
    pub choices: PerSide<Option<CharacterChoice>>,
    /// Stats when the match ended. `None` for incomplete matches.
    pub final_stats: Option<PerSide<Stats>>,
    /// Damage each side dealt, as landed after plugin modifiers.
    pub damage_dealt: PerSide<f64>,
}

impl MatchReport {
    pub(crate) fn incomplete(choices: PerSide<Option<CharacterChoice>>) -> Self {
        Self {
            result: MatchResult::Incomplete,
            turns: 0,
            choices,
            final_stats: None,
            damage_dealt: PerSide::default(),
        }
    }

    pub(crate) fn finished(
        game: &Game,
        choices: PerSide<Option<CharacterChoice>>,
        damage_dealt: PerSide<f64>,
    ) -> Self {
        Self {
            result: game
                .outcome
                .map(MatchResult::from)
                .unwrap_or(MatchResult::Incomplete),
            turns: game.turn_count,
            choices,
            final_stats: Some(PerSide::from_fn(|side| game.character(side).stats)),
            damage_dealt,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        match self.result {
            MatchResult::Win { winner, .. } => Some(winner),
            _ => None,
        }
    }

    /// Name of the character on `side`, if one was chosen.
    pub fn character(&self, side: Side) -> Option<&str> {
        self.choices[side].as_ref().map(|c| c.name.as_str())
    }
}
