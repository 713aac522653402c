//! Asynchronous abstraction for sourcing each side's move.
//!
//! Runtime users plug in [`MoveProvider`] implementations so a match can run
//! with human input, scripted fixtures, or simple bots. The orchestrator
//! bounds every call by the turn duration; a provider that does not answer
//! in time simply contributes no move.
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use duel_core::{MoveOffer, MoveSlot, Side, Stats};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::errors::Result;

/// Read-only snapshot handed to a provider when its side must pick a move.
#[derive(Clone, Debug)]
pub struct MoveRequest {
    pub side: Side,
    pub turn: u32,
    pub character: String,
    pub stats: Stats,
    pub hand_size: usize,
    pub offer: MoveOffer,
    /// Time the orchestrator waits before treating the side as idle.
    pub budget: Duration,
}

/// Trait for picking one of the offered moves.
///
/// Different implementations can handle:
/// - Player input (from UI/CLI)
/// - Bots choosing among the offer
/// - Scripted/replayed selections
/// - Testing fixtures
#[async_trait]
pub trait MoveProvider: Send + Sync {
    /// Returns the chosen slot, or `None` to pass the turn.
    ///
    /// A slot outside `request.offer` counts as no move.
    async fn select_move(&self, request: &MoveRequest) -> Result<Option<MoveSlot>>;
}

/// Always waits when it can. Useful for testing or as a fallback.
pub struct WaitMoveProvider;

#[async_trait]
impl MoveProvider for WaitMoveProvider {
    async fn select_move(&self, request: &MoveRequest) -> Result<Option<MoveSlot>> {
        Ok([MoveSlot::WAIT, MoveSlot::DO_NOTHING]
            .into_iter()
            .find(|slot| request.offer.contains(*slot)))
    }
}

/// Replays a fixed list of selections, then passes.
pub struct ScriptedMoveProvider {
    moves: Mutex<VecDeque<Option<MoveSlot>>>,
}

impl ScriptedMoveProvider {
    pub fn new<I, S>(moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Option<MoveSlot>>,
    {
        Self {
            moves: Mutex::new(moves.into_iter().map(Into::into).collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.moves.lock().map(|m| m.len()).unwrap_or_default()
    }
}

#[async_trait]
impl MoveProvider for ScriptedMoveProvider {
    async fn select_move(&self, _request: &MoveRequest) -> Result<Option<MoveSlot>> {
        let mut moves = self.moves.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(moves.pop_front().flatten())
    }
}

/// Picks uniformly among the offered hand cards, falling back to the other
/// defaults. Never forfeits unless nothing else is offered.
pub struct RandomMoveProvider {
    rng: Mutex<StdRng>,
}

impl RandomMoveProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

#[async_trait]
impl MoveProvider for RandomMoveProvider {
    async fn select_move(&self, request: &MoveRequest) -> Result<Option<MoveSlot>> {
        let offer = &request.offer;
        let hand: Vec<MoveSlot> = offer.available().filter(|s| s.hand_index().is_some()).collect();
        let candidates = if hand.is_empty() {
            offer
                .available()
                .filter(|s| *s != MoveSlot::FORFEIT)
                .collect()
        } else {
            hand
        };

        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let pick = candidates.choose(&mut *rng).copied();
        Ok(pick.or_else(|| offer.contains(MoveSlot::FORFEIT).then_some(MoveSlot::FORFEIT)))
    }
}
