//! Cloneable façade for observing a match.
//!
//! [`MatchHandle`] hides the bus plumbing so spectators can stream one topic
//! or several while the match task owns the game.
use std::collections::HashMap;

use tokio::sync::broadcast;

use crate::events::{Event, EventBus, Topic};

/// Client-facing handle to watch a running match
#[derive(Clone, Debug)]
pub struct MatchHandle {
    event_bus: EventBus,
}

impl MatchHandle {
    pub(crate) fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Match` - start and final report
    /// - `Topic::Turn` - phase changes and move selections
    /// - `Topic::Log` - battle text per channel, in flush order
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
