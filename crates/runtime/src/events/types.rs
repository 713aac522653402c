//! Event types for different topics.

use duel_core::{Channel, MoveSlot, PerSide, Side, TurnPhase};
use serde::{Deserialize, Serialize};

use crate::report::MatchReport;

/// Events related to the match as a whole
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatchEvent {
    /// Both characters were chosen and the opening hands drawn.
    Started { characters: PerSide<String> },
    /// The match ended, or never started.
    Finished(MatchReport),
}

/// Events related to turn management (lightweight)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TurnEvent {
    /// The orchestrator entered `phase` of `turn`.
    Phase { turn: u32, phase: TurnPhase },
    /// A side's selection after validation against its offer.
    MoveSelected {
        turn: u32,
        side: Side,
        slot: Option<MoveSlot>,
        timed_out: bool,
    },
}

/// Battle text flushed from one channel, oldest line first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub channel: Channel,
    pub lines: Vec<String>,
}
