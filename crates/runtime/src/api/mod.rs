//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! the orchestrator can stay focused on the turn loop.

pub mod errors;
pub mod handle;
pub mod providers;
pub mod selector;

pub use errors::{CollaboratorKind, Result, RuntimeError};
pub use handle::MatchHandle;
pub use providers::{
    MoveProvider, MoveRequest, RandomMoveProvider, ScriptedMoveProvider, WaitMoveProvider,
};
pub use selector::{CharacterChoice, CharacterSelector, FixedSelector, RandomSelector};
