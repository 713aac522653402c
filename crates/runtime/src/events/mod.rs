//! Topic-based event bus for runtime events.
//!
//! Matches publish phase changes, move selections and battle text to
//! separate topics; consumers subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{LogEvent, MatchEvent, TurnEvent};
