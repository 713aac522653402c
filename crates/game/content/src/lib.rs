//! Playable characters for the duel engine.
//!
//! Each character is a [`CharacterTemplate`](duel_core::CharacterTemplate)
//! built in code: its deck, its ability hooks and the signature move other
//! characters may borrow. The [`Roster`] indexes them by name and is what the
//! runtime consumes through [`CharacterSource`](duel_core::CharacterSource).

pub mod characters;
pub mod roster;

pub use roster::Roster;

#[cfg(test)]
pub(crate) mod test_support {
    use duel_core::{
        Ability, BattleConfig, Card, CharacterTemplate, DeckEntry, Dice, Game, Nature, Stats,
    };

    fn idle() -> Card {
        Card::new("Idle", Nature::Util)
    }

    /// 100/12/10/0/10 with no hooks and a filler deck.
    pub fn sandbag() -> CharacterTemplate {
        CharacterTemplate::new(
            "Sandbag",
            Stats::new(100.0, 12.0, 10.0, 0.0, 10.0, 0.0),
            Ability::new("Sandbag", "Takes hits."),
        )
        .deck(vec![DeckEntry::new(idle(), 12)])
    }

    pub fn duel_of(
        challenger: CharacterTemplate,
        challenged: CharacterTemplate,
        dice: impl Dice + 'static,
    ) -> Game {
        Game::new(&challenger, &challenged, BattleConfig::new(), Box::new(dice))
    }
}
