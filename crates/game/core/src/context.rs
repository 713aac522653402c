//! Resolution contexts handed to card actions, ability hooks and timed effects.
//!
//! A context is rebuilt for every invocation from `(game, side)` and, for
//! cards, the acting card. It borrows the game mutably for the duration of
//! the call, so nothing captured by a closure outlives the step.

use std::ops::{Deref, DerefMut};

use crate::card::Card;
use crate::character::{Character, Pronouns};
use crate::effect::{EffectId, TimedEffect};
use crate::error::Result;
use crate::game::Game;
use crate::side::Side;
use crate::stats::{Stat, Stats};

/// Context for hooks and timed effects: the game seen from one side.
pub struct EffectContext<'a> {
    game: &'a mut Game,
    side: Side,
}

impl<'a> EffectContext<'a> {
    pub fn new(game: &'a mut Game, side: Side) -> Self {
        Self { game, side }
    }

    pub fn game(&self) -> &Game {
        self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        self.game
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn opponent_side(&self) -> Side {
        self.side.other()
    }

    pub fn me(&self) -> &Character {
        &self.game.characters[self.side]
    }

    pub fn me_mut(&mut self) -> &mut Character {
        &mut self.game.characters[self.side]
    }

    pub fn opponent(&self) -> &Character {
        &self.game.characters[self.side.other()]
    }

    pub fn opponent_mut(&mut self) -> &mut Character {
        &mut self.game.characters[self.side.other()]
    }

    pub fn self_stats(&self) -> Stats {
        self.me().stats
    }

    pub fn opponent_stats(&self) -> Stats {
        self.opponent().stats
    }

    pub fn name(&self) -> &str {
        &self.me().name
    }

    pub fn opponent_name(&self) -> &str {
        &self.opponent().name
    }

    pub fn pronouns(&self) -> Pronouns {
        self.me().pronouns
    }

    pub fn turn_count(&self) -> u32 {
        self.game.turn_count
    }

    /// Move this side resolved last turn.
    pub fn last_card(&self) -> Option<&Card> {
        self.game.sides[self.side].last_used.as_ref()
    }

    pub fn opponent_last_card(&self) -> Option<&Card> {
        self.game.sides[self.side.other()].last_used.as_ref()
    }

    /// Adjusts one of this side's stats by a flat amount.
    pub fn flat_self_stat(&mut self, amount: f64, stat: Stat) -> f64 {
        self.game.adjust_stat(self.side, amount, stat);
        amount
    }

    pub fn flat_opponent_stat(&mut self, amount: f64, stat: Stat) -> f64 {
        self.game.adjust_stat(self.side.other(), amount, stat);
        amount
    }

    pub fn flat_attack(&mut self, damage: f64) -> Result<f64> {
        self.game.common_attack(self.side, damage, 0.0, false)
    }

    pub fn flat_attack_piercing(&mut self, damage: f64, additional_pierce: f64) -> Result<f64> {
        self.game
            .common_attack(self.side, damage, additional_pierce, false)
    }

    /// Attack fired from a timed effect.
    pub fn timed_attack(&mut self, damage: f64) -> Result<f64> {
        self.game.common_attack(self.side, damage, 0.0, true)
    }

    pub fn self_effect(&mut self, effect: TimedEffect) -> Result<EffectId> {
        self.game.add_effect(self.side, effect)
    }

    pub fn opponent_effect(&mut self, effect: TimedEffect) -> Result<EffectId> {
        self.game.add_effect(self.side.other(), effect)
    }

    /// Pushes a line to the game room.
    pub fn send(&mut self, line: impl Into<String>) {
        self.game.messages.gameroom(line);
    }

    pub fn roll_d100(&mut self) -> u32 {
        self.game.roll_d100()
    }
}

/// Context for one card resolution. Derefs to the side's [`EffectContext`].
pub struct CardContext<'a> {
    inner: EffectContext<'a>,
    card: Card,
}

impl<'a> CardContext<'a> {
    pub fn new(game: &'a mut Game, side: Side, card: Card) -> Self {
        Self {
            inner: EffectContext::new(game, side),
            card,
        }
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    /// Empower-scaled magnitude of the card's effect slot `index`.
    pub fn calc_effect(&self, index: usize) -> f64 {
        self.card.calc_effect(index)
    }

    /// Adjusts one of this side's stats by `multiplier` times effect slot `index`.
    pub fn self_stat(&mut self, index: usize, stat: Stat, multiplier: f64) -> f64 {
        let change = self.calc_effect(index) * multiplier;
        self.inner.flat_self_stat(change, stat)
    }

    pub fn opponent_stat(&mut self, index: usize, stat: Stat, multiplier: f64) -> f64 {
        let change = self.calc_effect(index) * multiplier;
        self.inner.flat_opponent_stat(change, stat)
    }

    /// Attacks with effect slot `index` as move damage. Returns that damage.
    pub fn basic_attack(&mut self, index: usize) -> Result<f64> {
        self.basic_attack_piercing(index, 0.0)
    }

    pub fn basic_attack_piercing(&mut self, index: usize, additional_pierce: f64) -> Result<f64> {
        let damage = self.calc_effect(index);
        self.inner.flat_attack_piercing(damage, additional_pierce)?;
        Ok(damage)
    }

    /// Runs the card's own action. Wrappers call this to resolve the card.
    pub fn play(&mut self) -> Result<()> {
        match self.card.card_action() {
            Some(action) => action(self),
            None => Ok(()),
        }
    }

    /// Context for `card` with the same game and side binding.
    pub fn with_card(&mut self, card: Card) -> CardContext<'_> {
        CardContext::new(&mut *self.inner.game, self.inner.side, card)
    }
}

impl<'a> Deref for CardContext<'a> {
    type Target = EffectContext<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for CardContext<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
