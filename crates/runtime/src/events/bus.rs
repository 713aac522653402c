//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{LogEvent, MatchEvent, TurnEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Match start and final report
    Match,
    /// Phase changes and move selections
    Turn,
    /// Battle text flushed from the message log
    Log,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Match, Topic::Turn, Topic::Log];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Match(MatchEvent),
    Turn(TurnEvent),
    Log(LogEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Match(_) => Topic::Match,
            Event::Turn(_) => Topic::Turn,
            Event::Log(_) => Topic::Log,
        }
    }
}

#[derive(Debug)]
struct TopicChannels {
    matches: broadcast::Sender<Event>,
    turns: broadcast::Sender<Event>,
    log: broadcast::Sender<Event>,
}

impl TopicChannels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Match => &self.matches,
            Topic::Turn => &self.turns,
            Topic::Log => &self.log,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Channels are created up front, so publishing
/// never takes a lock.
#[derive(Clone, Debug)]
pub struct EventBus {
    channels: Arc<TopicChannels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(TopicChannels {
                matches: broadcast::channel(capacity).0,
                turns: broadcast::channel(capacity).0,
                log: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.channels.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "duel::events", ?topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use duel_core::{Channel, TurnPhase};

    use super::*;

    #[tokio::test]
    async fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut log = bus.subscribe(Topic::Log);
        let mut turns = bus.subscribe(Topic::Turn);

        bus.publish(Event::Turn(TurnEvent::Phase {
            turn: 1,
            phase: TurnPhase::TurnStart,
        }));
        bus.publish(Event::Log(LogEvent {
            channel: Channel::Gameroom,
            lines: vec!["# Turn 1".into()],
        }));

        match log.recv().await.unwrap() {
            Event::Log(event) => assert_eq!(event.lines, vec!["# Turn 1"]),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(turns.recv().await.unwrap(), Event::Turn(_)));
        assert!(log.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::default();
        bus.publish(Event::Log(LogEvent {
            channel: Channel::Gameroom,
            lines: Vec::new(),
        }));
        let receivers = bus.subscribe_multiple(&Topic::ALL);
        assert_eq!(receivers.len(), 3);
    }
}
