use std::time::Duration;

use async_trait::async_trait;
use duel_core::{BattleConfig, Channel, MoveSlot, ScriptedDice, Side, TieReason, TurnPhase};
use duel_runtime::{
    CollaboratorKind, Event, EventBus, FixedSelector, LogEvent, Match, MatchConfig, MatchEvent,
    MatchResult, MoveProvider, MoveRequest, Result, RuntimeError, ScriptedMoveProvider, Topic,
    TurnEvent, WaitMoveProvider,
};
use tokio::sync::broadcast;

/// Never answers; the orchestrator has to time it out.
struct Stalled;

#[async_trait]
impl MoveProvider for Stalled {
    async fn select_move(&self, _request: &MoveRequest) -> Result<Option<MoveSlot>> {
        std::future::pending().await
    }
}

fn config() -> MatchConfig {
    MatchConfig {
        turn_duration: Duration::from_millis(50),
        event_buffer_size: 4096,
        ..MatchConfig::default()
    }
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn log_lines(events: &[Event], channel: Channel) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Log(LogEvent { channel: c, lines }) if *c == channel => Some(lines.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}

#[tokio::test]
async fn declined_selection_leaves_the_match_incomplete() {
    let bus = EventBus::with_capacity(16);
    let mut matches = bus.subscribe(Topic::Match);

    let report = Match::builder()
        .selector(Side::Challenger, FixedSelector::new("Stille"))
        .selector(Side::Challenged, FixedSelector::decline())
        .provider(Side::Challenger, WaitMoveProvider)
        .provider(Side::Challenged, WaitMoveProvider)
        .event_bus(bus)
        .run()
        .await
        .unwrap();

    assert_eq!(report.result, MatchResult::Incomplete);
    assert_eq!(report.turns, 0);
    assert_eq!(report.character(Side::Challenger), Some("Stille"));
    match drain(&mut matches).as_slice() {
        [Event::Match(MatchEvent::Finished(finished))] => assert_eq!(finished, &report),
        other => panic!("unexpected events {other:?}"),
    }
}

#[tokio::test]
async fn build_returns_none_without_both_choices() {
    let built = Match::builder()
        .selector(Side::Challenger, FixedSelector::decline())
        .selector(Side::Challenged, FixedSelector::new("Aura"))
        .provider(Side::Challenger, WaitMoveProvider)
        .provider(Side::Challenged, WaitMoveProvider)
        .build()
        .await
        .unwrap();
    assert!(built.is_none());
}

#[tokio::test]
async fn missing_collaborators_and_unknown_names_are_errors() {
    let err = Match::builder()
        .selector(Side::Challenger, FixedSelector::new("Denken"))
        .selector(Side::Challenged, FixedSelector::new("Denken"))
        .provider(Side::Challenger, WaitMoveProvider)
        .run()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::CollaboratorNotSet {
            kind: CollaboratorKind::MoveProvider,
            side: Side::Challenged
        }
    ));

    let err = Match::builder()
        .selector(Side::Challenger, FixedSelector::new("Frieren"))
        .selector(Side::Challenged, FixedSelector::new("Denken"))
        .provider(Side::Challenger, WaitMoveProvider)
        .provider(Side::Challenged, WaitMoveProvider)
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownCharacter(name) if name == "Frieren"));
}

#[tokio::test]
async fn double_forfeit_is_a_tie_after_one_turn() {
    let report = Match::builder()
        .config(config())
        .selector(Side::Challenger, FixedSelector::new("Denken"))
        .selector(Side::Challenged, FixedSelector::new("Flamme"))
        .provider(Side::Challenger, ScriptedMoveProvider::new([MoveSlot::FORFEIT]))
        .provider(Side::Challenged, ScriptedMoveProvider::new([MoveSlot::FORFEIT]))
        .dice(ScriptedDice::new([]))
        .run()
        .await
        .unwrap();

    assert_eq!(report.result, MatchResult::Tie(TieReason::DoubleForfeit));
    assert_eq!(report.turns, 1);
    assert_eq!(report.winner(), None);
}

#[tokio::test]
async fn turn_limit_ties_before_moves_are_offered() {
    let bus = EventBus::with_capacity(4096);
    let mut turns = bus.subscribe(Topic::Turn);
    let mut log = bus.subscribe(Topic::Log);

    let report = Match::builder()
        .config(MatchConfig {
            battle: BattleConfig::with_turn_limit(3),
            ..config()
        })
        .selector(Side::Challenger, FixedSelector::new("Denken"))
        .selector(Side::Challenged, FixedSelector::new("Flamme"))
        .provider(Side::Challenger, WaitMoveProvider)
        .provider(Side::Challenged, WaitMoveProvider)
        .dice(ScriptedDice::new([]))
        .event_bus(bus)
        .run()
        .await
        .unwrap();

    assert_eq!(report.result, MatchResult::Tie(TieReason::TurnLimit));
    assert_eq!(report.turns, 3);

    let events = drain(&mut turns);
    let starts = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                Event::Turn(TurnEvent::Phase {
                    phase: TurnPhase::TurnStart,
                    ..
                })
            )
        })
        .count();
    let offers = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                Event::Turn(TurnEvent::Phase {
                    phase: TurnPhase::MoveOffer,
                    ..
                })
            )
        })
        .count();
    assert_eq!(starts, 3);
    assert_eq!(offers, 2);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Turn(TurnEvent::MoveSelected {
            slot: Some(MoveSlot::WAIT),
            timed_out: false,
            ..
        })
    )));

    let room = log_lines(&drain(&mut log), Channel::Gameroom);
    assert_eq!(room[0], "## Challenger selected 🧓 **Denken**!");
    assert_eq!(room[1], "## Challenged selected 🔥 **Flamme**!");
    assert!(room.iter().any(|l| l == "## 3 Turn Limit Reached - Game Over!"));
}

#[tokio::test]
async fn stalled_provider_contributes_no_move() {
    let bus = EventBus::with_capacity(4096);
    let mut turns = bus.subscribe(Topic::Turn);
    let mut log = bus.subscribe(Topic::Log);

    let report = Match::builder()
        .config(config())
        .selector(Side::Challenger, FixedSelector::new("Stille"))
        .selector(Side::Challenged, FixedSelector::new("Denken"))
        .provider(Side::Challenger, Stalled)
        .provider(Side::Challenged, ScriptedMoveProvider::new([MoveSlot::FORFEIT]))
        .dice(ScriptedDice::new([]))
        .event_bus(bus)
        .run()
        .await
        .unwrap();

    assert_eq!(
        report.result,
        MatchResult::Win {
            winner: Side::Challenger,
            loser: Side::Challenged
        }
    );
    assert_eq!(report.turns, 1);

    let events = drain(&mut turns);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Turn(TurnEvent::MoveSelected {
            side: Side::Challenger,
            slot: None,
            timed_out: true,
            ..
        })
    )));
    let private = log_lines(&drain(&mut log), Channel::Private(Side::Challenger));
    assert!(private.iter().any(|l| l == "Stille did not pick a move in time."));
}

#[tokio::test]
async fn slot_outside_the_offer_counts_as_no_move() {
    let bus = EventBus::with_capacity(4096);
    let mut turns = bus.subscribe(Topic::Turn);

    // A d6 never rolls 6, so hand slot 6 is never offered.
    let report = Match::builder()
        .config(config())
        .selector(Side::Challenger, FixedSelector::new("Aura"))
        .selector(Side::Challenged, FixedSelector::new("Flamme"))
        .provider(Side::Challenger, ScriptedMoveProvider::new([MoveSlot(6)]))
        .provider(Side::Challenged, ScriptedMoveProvider::new([MoveSlot::FORFEIT]))
        .dice(ScriptedDice::new([]))
        .event_bus(bus)
        .run()
        .await
        .unwrap();

    assert_eq!(report.winner(), Some(Side::Challenger));
    let selections: Vec<_> = drain(&mut turns)
        .into_iter()
        .filter_map(|e| match e {
            Event::Turn(TurnEvent::MoveSelected {
                side,
                slot,
                timed_out,
                ..
            }) => Some((side, slot, timed_out)),
            _ => None,
        })
        .collect();
    assert_eq!(
        selections,
        vec![
            (Side::Challenger, None, false),
            (Side::Challenged, Some(MoveSlot::FORFEIT), false),
        ]
    );
}

#[tokio::test]
async fn revealed_draws_reach_the_game_room() {
    let bus = EventBus::with_capacity(4096);
    let mut log = bus.subscribe(Topic::Log);

    Match::builder()
        .config(MatchConfig {
            reveal_hand: true,
            reveal_draw: true,
            ..config()
        })
        .selector(Side::Challenger, FixedSelector::new("Denken"))
        .selector(Side::Challenged, FixedSelector::new("Übel"))
        .provider(Side::Challenger, ScriptedMoveProvider::new([MoveSlot::FORFEIT]))
        .provider(Side::Challenged, WaitMoveProvider)
        .dice(ScriptedDice::new([]))
        .event_bus(bus)
        .run()
        .await
        .unwrap();

    let room = log_lines(&drain(&mut log), Channel::Gameroom);
    assert!(room.iter().any(|l| l == "## Denken's Active Cards: "));
    assert!(room.iter().any(|l| l == "## Übel's Active Cards: "));
    assert!(room.iter().any(|l| l.starts_with("# 🧓 Denken's Hand:")));
}
