//! Active and discard piles. The hand lives on the character.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use tracing::debug;

use crate::card::Card;
use crate::dice::Dice;
use crate::error::{BattleError, Result};

/// A template card and how many copies go into a fresh deck.
#[derive(Clone, Debug)]
pub struct DeckEntry {
    pub card: Card,
    pub count: usize,
}

impl DeckEntry {
    pub fn new(card: Card, count: usize) -> Self {
        Self { card, count }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Deck {
    active: VecDeque<Card>,
    discard: Vec<Card>,
}

impl Deck {
    /// Expands entries into an unshuffled active pile.
    pub fn from_entries(entries: &[DeckEntry]) -> Self {
        let active = entries
            .iter()
            .flat_map(|entry| std::iter::repeat_n(entry.card.clone(), entry.count))
            .collect();
        Self {
            active,
            discard: Vec::new(),
        }
    }

    pub fn shuffle(&mut self, dice: &mut dyn Dice) {
        self.active.make_contiguous().shuffle(dice.rng());
    }

    /// Takes the top card, reshuffling the discard pile in when the active pile is empty.
    pub fn draw(&mut self, dice: &mut dyn Dice) -> Result<Card> {
        if self.active.is_empty() {
            if self.discard.is_empty() {
                return Err(BattleError::DeckExhausted);
            }
            let mut recycled = std::mem::take(&mut self.discard);
            recycled.shuffle(dice.rng());
            debug!(
                target: "duel::deck",
                cards = recycled.len(),
                "reshuffled discard pile into active pile"
            );
            self.active.extend(recycled);
        }
        self.active.pop_front().ok_or(BattleError::DeckExhausted)
    }

    pub fn discard(&mut self, card: Card) {
        self.discard.push(card);
    }

    /// Takes back the most recently discarded card.
    pub fn pop_discard(&mut self) -> Option<Card> {
        self.discard.pop()
    }

    /// Excises the first card titled `title`, searching the active pile then the discard pile.
    pub fn remove(&mut self, title: &str) -> Option<Card> {
        if let Some(pos) = self.active.iter().position(|c| c.title == title) {
            return self.active.remove(pos);
        }
        let pos = self.discard.iter().position(|c| c.title == title)?;
        Some(self.discard.remove(pos))
    }

    pub fn swap_piles(&mut self) {
        let active: Vec<Card> = std::mem::take(&mut self.active).into();
        let discard = std::mem::replace(&mut self.discard, active);
        self.active = discard.into();
    }

    pub fn active(&self) -> impl Iterator<Item = &Card> {
        self.active.iter()
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.discard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
