//! Dice source for offers, shuffles, coin flips and percentage checks.
//!
//! The engine only sees the [`Dice`] trait, so matches can run on a seeded
//! generator for replay and tests can script exact rolls.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Source of uniformly distributed rolls.
pub trait Dice: Send {
    /// Zero-based roll in `0..sides`. Returns 0 when `sides` is 0.
    fn roll(&mut self, sides: u32) -> u32;

    /// Percentage roll in `1..=100`.
    fn roll_d100(&mut self) -> u32 {
        self.roll(100) + 1
    }

    /// Fair coin; `true` means the first of two candidates wins.
    fn coin_flip(&mut self) -> bool {
        self.roll(2) == 0
    }

    /// Generator used for deck shuffles.
    fn rng(&mut self) -> &mut dyn RngCore;
}

/// Dice backed by a seedable [`StdRng`].
pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeds from OS entropy for casual matches.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Dice for SeededDice {
    fn roll(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.rng.gen_range(0..sides)
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }
}

/// Replays a fixed sequence of rolls, then keeps returning `fallback`.
///
/// Each scripted value is reduced modulo the requested number of sides.
/// Shuffles draw from a fixed-seed generator and never consume scripted rolls.
#[derive(Clone, Debug)]
pub struct ScriptedDice {
    rolls: VecDeque<u32>,
    fallback: u32,
    shuffler: StdRng,
}

impl Default for ScriptedDice {
    fn default() -> Self {
        Self::new([])
    }
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback: 0,
            shuffler: StdRng::seed_from_u64(0),
        }
    }

    pub fn with_fallback(mut self, fallback: u32) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.rolls.pop_front().unwrap_or(self.fallback) % sides
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.shuffler
    }
}
