//! Ordered battle-log buffers, one per logical channel.

use std::collections::BTreeMap;

use crate::side::Side;

/// Logical destination for battle text. Transport is up to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    /// Shared room both players and spectators read.
    Gameroom,
    /// Private thread of one side (hand, offers, discards).
    Private(Side),
}

/// Append-only per-channel buffer drained at checkpoints.
pub trait MessageSink {
    fn push(&mut self, channel: Channel, line: String);

    /// Returns and clears everything pending on `channel`, oldest first.
    fn flush(&mut self, channel: Channel) -> Vec<String>;
}

/// In-memory sink owned by the game.
#[derive(Clone, Debug, Default)]
pub struct MessageLog {
    pending: BTreeMap<Channel, Vec<String>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for pushing to the game room.
    pub fn gameroom(&mut self, line: impl Into<String>) {
        self.push(Channel::Gameroom, line.into());
    }

    pub fn pending(&self, channel: Channel) -> &[String] {
        self.pending.get(&channel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Channels that currently hold unflushed lines.
    pub fn dirty_channels(&self) -> Vec<Channel> {
        self.pending
            .iter()
            .filter(|(_, lines)| !lines.is_empty())
            .map(|(channel, _)| *channel)
            .collect()
    }
}

impl MessageSink for MessageLog {
    fn push(&mut self, channel: Channel, line: String) {
        self.pending.entry(channel).or_default().push(line);
    }

    fn flush(&mut self, channel: Channel) -> Vec<String> {
        self.pending.remove(&channel).unwrap_or_default()
    }
}
