//! Runtime orchestration for duel matches.
//!
//! This crate wires the move provider and character selector abstractions,
//! the event bus and the engine plugins into a match API. Consumers build a
//! [`Match`] through [`MatchBuilder`], watch it through [`MatchHandle`], and
//! receive a [`MatchReport`] once it ends.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator, its config and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`plugins`] holds the engine plugins every match registers
//! - [`report`] describes how a match ended
pub mod api;
pub mod events;
pub mod plugins;
pub mod report;
pub mod runtime;

pub use api::{
    CharacterChoice, CharacterSelector, CollaboratorKind, FixedSelector, MatchHandle,
    MoveProvider, MoveRequest, RandomMoveProvider, RandomSelector, Result, RuntimeError,
    ScriptedMoveProvider, WaitMoveProvider,
};
pub use events::{Event, EventBus, LogEvent, MatchEvent, Topic, TurnEvent};
pub use plugins::DamageLogPlugin;
pub use report::{MatchReport, MatchResult};
pub use runtime::{Match, MatchBuilder, MatchConfig};
