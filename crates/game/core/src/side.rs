//! The two fixed roles of a match and per-side storage.

use core::ops::{Index, IndexMut};

use crate::error::{BattleError, Result};

/// One of the two seats in a match. Side 0 is the challenger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Challenger,
    Challenged,
}

impl Side {
    /// Both sides in fixed scan order.
    pub const BOTH: [Side; 2] = [Side::Challenger, Side::Challenged];

    pub const fn other(self) -> Self {
        match self {
            Side::Challenger => Side::Challenged,
            Side::Challenged => Side::Challenger,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Side::Challenger => 0,
            Side::Challenged => 1,
        }
    }

    /// Converts a raw index coming from outside the engine.
    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Side::Challenger),
            1 => Ok(Side::Challenged),
            other => Err(BattleError::InvalidSide(other)),
        }
    }
}

/// A value stored once per side, indexed by [`Side`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerSide<T>([T; 2]);

impl<T> PerSide<T> {
    pub const fn new(challenger: T, challenged: T) -> Self {
        Self([challenger, challenged])
    }

    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        Self([f(Side::Challenger), f(Side::Challenged)])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        Side::BOTH.into_iter().zip(self.0.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Side, &mut T)> {
        Side::BOTH.into_iter().zip(self.0.iter_mut())
    }

    pub fn map<U>(self, mut f: impl FnMut(Side, T) -> U) -> PerSide<U> {
        let [a, b] = self.0;
        PerSide([f(Side::Challenger, a), f(Side::Challenged, b)])
    }

    pub fn as_ref(&self) -> PerSide<&T> {
        let [a, b] = &self.0;
        PerSide([a, b])
    }
}

impl<T> Index<Side> for PerSide<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        &self.0[side.index()]
    }
}

impl<T> IndexMut<Side> for PerSide<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        &mut self.0[side.index()]
    }
}
