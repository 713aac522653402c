//! Deterministic rules for a turn-based two-player card duel.
//!
//! `duel-core` owns the canonical battle rules: characters and their decks,
//! dice-driven move offers, move ordering, attack resolution, timed effects
//! and game-over detection. It never performs I/O. All state mutation flows
//! through [`game::Game`], and card actions, ability hooks and timed effects
//! reach it through the contexts in [`context`].
pub mod ability;
pub mod card;
pub mod character;
pub mod config;
pub mod context;
pub mod deck;
pub mod defaults;
pub mod dice;
pub mod effect;
pub mod error;
pub mod game;
pub mod messages;
pub mod plugin;
pub mod side;
pub mod stats;

pub use ability::{Ability, AbilityHook, HookKind};
pub use card::{Card, CardTraits, Nature, calculate_effect_value};
pub use character::{Character, CharacterFlags, CharacterSource, CharacterTemplate, Pronouns};
pub use config::BattleConfig;
pub use context::{CardContext, EffectContext};
pub use deck::{Deck, DeckEntry};
pub use dice::{Dice, ScriptedDice, SeededDice};
pub use effect::{EffectId, TimedEffect};
pub use error::{BattleError, ErrorSeverity, Result};
pub use game::{
    AttackRequest, Game, MoveOffer, MoveSlot, Outcome, Research, SideState, Theory, TieReason,
    TurnPhase, calculate_damage,
};
pub use messages::{Channel, MessageLog, MessageSink};
pub use plugin::GamePlugin;
pub use side::{PerSide, Side};
pub use stats::{Stat, StatBounds, Stats, round2};
