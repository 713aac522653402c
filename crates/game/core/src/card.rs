//! Card templates, per-instance empower state and conditional transformation.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::config::BattleConfig;
use crate::context::CardContext;
use crate::error::Result;
use crate::game::Game;
use crate::side::Side;
use crate::stats::round2;

/// Action run once when the card resolves.
pub type CardAction = Arc<dyn Fn(&mut CardContext<'_>) -> Result<()> + Send + Sync>;

/// Produces the card this one stands in for, given the current board.
///
/// Receives the original card so the replacement can inherit its empower level.
pub type ConditionalCard = Arc<dyn Fn(&Card, &Game, Side) -> Card + Send + Sync>;

/// Renders a description from the empowered effect magnitudes.
pub type DescribeFn = Arc<dyn Fn(&[f64]) -> String + Send + Sync>;

/// Scales `base` by the empower level: +10% per level, two decimals.
pub fn calculate_effect_value(base: f64, empower_level: i32) -> f64 {
    round2(base * (1.0 + f64::from(empower_level) * BattleConfig::EMPOWER_BOOST))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Nature {
    Attack,
    Defense,
    Util,
    Default,
}

bitflags! {
    /// Static markers consulted by content and the offer phase.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CardTraits: u8 {
        /// The owner's signature move.
        const SIGNATURE = 1 << 0;
        /// Counts toward theory-driven abilities.
        const THEORY = 1 << 1;
        /// Leaves the deck for good once played from hand.
        const REMOVE_ON_PLAY = 1 << 2;
        /// Empower level is meaningless for this card and not shown.
        const HIDE_EMPOWER = 1 << 3;
        /// Produced by copying the opponent's signature.
        const EMPATHIZED = 1 << 4;
    }
}

#[derive(Clone)]
pub struct Card {
    pub title: String,
    pub emoji: String,
    pub nature: Nature,
    /// Higher resolves first.
    pub priority: i32,
    /// Base magnitudes before empower scaling.
    pub effects: Vec<f64>,
    /// HP paid when the card resolves.
    pub hp_cost: f64,
    pub empower_level: i32,
    pub traits: CardTraits,
    /// Percentage chance for content-defined failure rolls.
    pub failure_rate: Option<u32>,
    describe: Option<DescribeFn>,
    action: Option<CardAction>,
    conditional: Option<ConditionalCard>,
}

impl Card {
    pub fn new(title: impl Into<String>, nature: Nature) -> Self {
        Self {
            title: title.into(),
            emoji: String::new(),
            nature,
            priority: 0,
            effects: Vec::new(),
            hp_cost: 0.0,
            empower_level: 0,
            traits: CardTraits::empty(),
            failure_rate: None,
            describe: None,
            action: None,
            conditional: None,
        }
    }

    pub fn emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = emoji.into();
        self
    }

    pub fn effects(mut self, effects: impl Into<Vec<f64>>) -> Self {
        self.effects = effects.into();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn hp_cost(mut self, hp_cost: f64) -> Self {
        self.hp_cost = hp_cost;
        self
    }

    pub fn traits(mut self, traits: CardTraits) -> Self {
        self.traits |= traits;
        self
    }

    pub fn failure_rate(mut self, percent: u32) -> Self {
        self.failure_rate = Some(percent);
        self
    }

    pub fn with_empower(mut self, level: i32) -> Self {
        self.empower_level = level;
        self
    }

    pub fn describe(mut self, f: impl Fn(&[f64]) -> String + Send + Sync + 'static) -> Self {
        self.describe = Some(Arc::new(f));
        self
    }

    pub fn action(
        mut self,
        f: impl Fn(&mut CardContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.action = Some(Arc::new(f));
        self
    }

    pub fn conditional(
        mut self,
        f: impl Fn(&Card, &Game, Side) -> Card + Send + Sync + 'static,
    ) -> Self {
        self.conditional = Some(Arc::new(f));
        self
    }

    /// Empower-scaled magnitude of effect slot `index`; 0 for a missing slot.
    pub fn calc_effect(&self, index: usize) -> f64 {
        self.effects
            .get(index)
            .map(|base| calculate_effect_value(*base, self.empower_level))
            .unwrap_or(0.0)
    }

    pub fn scaled_effects(&self) -> Vec<f64> {
        (0..self.effects.len()).map(|i| self.calc_effect(i)).collect()
    }

    pub fn description(&self) -> String {
        match &self.describe {
            Some(describe) => describe(&self.scaled_effects()),
            None => String::new(),
        }
    }

    /// Title as shown in offers, e.g. `Cleave + 2`.
    pub fn display_title(&self) -> String {
        if self.traits.contains(CardTraits::HIDE_EMPOWER) {
            self.title.clone()
        } else {
            format!("{} + {}", self.title, self.empower_level)
        }
    }

    /// One-line listing used for hands and offers.
    pub fn summary(&self) -> String {
        let mut line = format!("{} **{}**", self.emoji, self.display_title());
        if self.priority != 0 && self.priority != BattleConfig::FORFEIT_PRIORITY {
            line.push_str(&format!(" (priority {})", self.priority));
        }
        let description = self.description();
        if !description.is_empty() {
            line.push_str(": ");
            line.push_str(&description);
        }
        line
    }

    pub fn card_action(&self) -> Option<CardAction> {
        self.action.clone()
    }

    pub fn has_conditional(&self) -> bool {
        self.conditional.is_some()
    }

    /// Resolves the concrete card to use.
    ///
    /// Applies the transformation, then at most one more hop. The returned card
    /// never carries a transformation, so resolving it again is a no-op.
    pub fn resolve_conditional(&self, game: &Game, side: Side) -> Card {
        let Some(first) = &self.conditional else {
            return self.clone();
        };
        let mut card = first(self, game, side);
        if let Some(second) = card.conditional.clone() {
            card = second(&card, game, side);
        }
        card.conditional = None;
        card
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("title", &self.title)
            .field("nature", &self.nature)
            .field("priority", &self.priority)
            .field("effects", &self.effects)
            .field("empower_level", &self.empower_level)
            .field("traits", &self.traits)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Card {
    /// Identity for deck bookkeeping: same template at the same empower level.
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
            && self.empower_level == other.empower_level
            && self.effects == other.effects
            && self.priority == other.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::duel;

    #[test]
    fn empower_scaling_adds_ten_percent_per_level() {
        assert_eq!(calculate_effect_value(10.0, 0), 10.0);
        assert_eq!(calculate_effect_value(10.0, 1), 11.0);
        assert_eq!(calculate_effect_value(10.0, 3), 13.0);
        assert_eq!(calculate_effect_value(8.0, -2), 6.4);
    }

    #[test]
    fn empower_scaling_is_monotonic() {
        let mut previous = f64::MIN;
        for level in 0..40 {
            let value = calculate_effect_value(7.5, level);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn description_uses_scaled_effects() {
        let card = Card::new("Slash", Nature::Attack)
            .effects([10.0, 2.0])
            .describe(|e| format!("DMG {}. SPD+{}", e[0], e[1]))
            .with_empower(1);
        assert_eq!(card.description(), "DMG 11. SPD+2.2");
        assert_eq!(card.display_title(), "Slash + 1");
    }

    #[test]
    fn conditional_resolution_stops_after_two_hops() {
        let game = duel();
        let third = Card::new("Third", Nature::Util)
            .conditional(|_, _, _| Card::new("Fourth", Nature::Util));
        let second = Card::new("Second", Nature::Util)
            .conditional(move |_, _, _| third.clone());
        let first = Card::new("First", Nature::Util)
            .conditional(move |_, _, _| second.clone());

        let resolved = first.resolve_conditional(&game, Side::Challenger);
        assert_eq!(resolved.title, "Third");
        assert!(!resolved.has_conditional());

        // Resolving the concrete card again does not advance the chain.
        let again = resolved.resolve_conditional(&game, Side::Challenger);
        assert_eq!(again.title, "Third");
    }

    #[test]
    fn conditional_can_inherit_empower_level() {
        let game = duel();
        let card = Card::new("Foundation", Nature::Attack)
            .with_empower(4)
            .conditional(|original, _, _| {
                Card::new("First Page", Nature::Attack)
                    .effects([5.0])
                    .with_empower(original.empower_level)
            });
        let resolved = card.resolve_conditional(&game, Side::Challenged);
        assert_eq!(resolved.empower_level, 4);
        assert_eq!(resolved.calc_effect(0), 7.0);
    }
}
