//! Unified error types surfaced by the runtime API.
//!
//! Wraps rule violations raised by the engine together with failures of the
//! collaborators the runtime drives (move providers, character selectors),
//! so clients can bubble them up with consistent context.
use std::fmt;

use duel_core::{BattleError, Side};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error("{kind} not set for the {side:?} side")]
    CollaboratorNotSet { kind: CollaboratorKind, side: Side },

    #[error("unknown character {0:?}")]
    UnknownCharacter(String),

    #[error("{kind} for the {side:?} side failed: {message}")]
    Collaborator {
        kind: CollaboratorKind,
        side: Side,
        message: String,
    },
}

impl RuntimeError {
    /// Shorthand for a move provider failure.
    pub fn provider(side: Side, message: impl Into<String>) -> Self {
        Self::Collaborator {
            kind: CollaboratorKind::MoveProvider,
            side,
            message: message.into(),
        }
    }

    /// Shorthand for a character selector failure.
    pub fn selector(side: Side, message: impl Into<String>) -> Self {
        Self::Collaborator {
            kind: CollaboratorKind::CharacterSelector,
            side,
            message: message.into(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CollaboratorKind {
    MoveProvider,
    CharacterSelector,
}

impl fmt::Display for CollaboratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CollaboratorKind::MoveProvider => "move provider",
            CollaboratorKind::CharacterSelector => "character selector",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_collaborator_and_side() {
        let err = RuntimeError::CollaboratorNotSet {
            kind: CollaboratorKind::MoveProvider,
            side: Side::Challenged,
        };
        assert_eq!(err.to_string(), "move provider not set for the Challenged side");

        let err = RuntimeError::selector(Side::Challenger, "lobby closed");
        assert_eq!(
            err.to_string(),
            "character selector for the Challenger side failed: lobby closed"
        );
    }

    #[test]
    fn battle_errors_convert_transparently() {
        let err: RuntimeError = BattleError::DeckExhausted.into();
        assert_eq!(err.to_string(), BattleError::DeckExhausted.to_string());
    }
}
