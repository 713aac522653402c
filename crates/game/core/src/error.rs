//! Common error infrastructure for duel-core.
//!
//! Only invariant violations are errors here. Expected game-flow outcomes
//! (a missed attack, a card whose precondition fails, a side that never picks
//! a move) are ordinary branches that write a line to the battle log instead.
//!
//! # Design Principles
//!
//! - **Abort the step**: an error propagates with `?` out of the card action,
//!   hook, or phase that hit it
//! - **Severity Classification**: errors are categorized so the runtime can
//!   decide whether the match can continue

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Validation**: invalid input from a collaborator (bad side index, bad slot)
/// - **Internal**: the match state violated an invariant (empty deck, bad hand index)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input, should not retry without changes.
    ///
    /// Examples: side index outside 0..=1, slot not present in the offer
    Validation,

    /// Unexpected state inconsistency inside the match.
    ///
    /// Examples: discarding past the end of the hand, drawing from two empty piles
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Errors raised by the battle rules.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    #[error("side index must be 0 or 1, got {0}")]
    InvalidSide(usize),

    #[error("hand index {index} is out of bounds for a hand of {len} cards")]
    HandIndexOutOfBounds { index: usize, len: usize },

    #[error("cannot draw: both the active pile and the discard pile are empty")]
    DeckExhausted,

    #[error("slot {0} is not part of the offered moves")]
    UnknownSlot(u8),
}

impl BattleError {
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidSide(_) | Self::UnknownSlot(_) => ErrorSeverity::Validation,
            Self::HandIndexOutOfBounds { .. } | Self::DeckExhausted => ErrorSeverity::Internal,
        }
    }

    /// Returns a static string identifier for this error variant.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSide(_) => "invalid_side",
            Self::HandIndexOutOfBounds { .. } => "hand_index_out_of_bounds",
            Self::DeckExhausted => "deck_exhausted",
            Self::UnknownSlot(_) => "unknown_slot",
        }
    }
}

pub type Result<T, E = BattleError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_errors_are_internal() {
        assert!(BattleError::DeckExhausted.severity().is_internal());
        assert!(
            BattleError::HandIndexOutOfBounds { index: 7, len: 6 }
                .severity()
                .is_internal()
        );
        assert_eq!(
            BattleError::InvalidSide(2).severity(),
            ErrorSeverity::Validation
        );
    }

    #[test]
    fn error_messages_carry_context() {
        let err = BattleError::HandIndexOutOfBounds { index: 7, len: 6 };
        assert_eq!(
            err.to_string(),
            "hand index 7 is out of bounds for a hand of 6 cards"
        );
        assert_eq!(err.error_code(), "hand_index_out_of_bounds");
    }
}
