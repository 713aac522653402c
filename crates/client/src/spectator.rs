//! Prints the battle log as the match publishes it.
use std::io::Write;

use duel_core::{Channel, PerSide};
use duel_runtime::{Event, LogEvent};
use tokio::sync::broadcast::{self, error::RecvError};

/// Streams log events to `out` until the bus closes.
///
/// Private channels are skipped unless `show_private` is set; when shown,
/// each line is prefixed with the owning player's name.
pub async fn print_log(
    mut rx: broadcast::Receiver<Event>,
    players: PerSide<String>,
    show_private: bool,
    mut out: impl Write,
) -> std::io::Result<()> {
    loop {
        match rx.recv().await {
            Ok(Event::Log(event)) => write_event(&mut out, &event, &players, show_private)?,
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "battle log lagged behind");
            }
            Err(RecvError::Closed) => return out.flush(),
        }
    }
}

fn write_event(
    out: &mut impl Write,
    event: &LogEvent,
    players: &PerSide<String>,
    show_private: bool,
) -> std::io::Result<()> {
    let prefix = match event.channel {
        Channel::Gameroom => None,
        Channel::Private(_) if !show_private => return Ok(()),
        Channel::Private(side) => Some(players[side].as_str()),
    };
    for line in &event.lines {
        match &prefix {
            Some(prefix) => writeln!(out, "[{prefix}] {line}")?,
            None => writeln!(out, "{line}")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use duel_core::Side;
    use duel_runtime::EventBus;

    use super::*;

    fn players() -> PerSide<String> {
        PerSide::new("Ann".to_string(), "Bo".to_string())
    }

    fn log(channel: Channel, lines: &[&str]) -> Event {
        Event::Log(LogEvent {
            channel,
            lines: lines.iter().map(|l| l.to_string()).collect(),
        })
    }

    #[tokio::test]
    async fn prints_game_room_and_hides_private_lines() {
        let bus = EventBus::with_capacity(8);
        let rx = bus.subscribe(duel_runtime::Topic::Log);
        bus.publish(log(Channel::Gameroom, &["# Turn 1"]));
        bus.publish(log(Channel::Private(Side::Challenger), &["### Draws: 0, 1"]));
        drop(bus);

        let mut out = Vec::new();
        print_log(rx, players(), false, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "# Turn 1\n");
    }

    #[tokio::test]
    async fn private_lines_carry_the_player_name() {
        let bus = EventBus::with_capacity(8);
        let rx = bus.subscribe(duel_runtime::Topic::Log);
        bus.publish(log(Channel::Private(Side::Challenged), &["a", "b"]));
        drop(bus);

        let mut out = Vec::new();
        print_log(rx, players(), true, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[Bo] a\n[Bo] b\n");
    }
}
