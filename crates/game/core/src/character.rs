//! Per-match character state and the immutable templates it is cloned from.

use std::collections::BTreeMap;

use crate::ability::Ability;
use crate::card::{Card, CardTraits};
use crate::deck::{Deck, DeckEntry};
use crate::dice::Dice;
use crate::effect::TimedEffect;
use crate::error::{BattleError, Result};
use crate::messages::{Channel, MessageLog, MessageSink};
use crate::stats::{Stat, StatBounds, Stats, round2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pronouns {
    pub personal: &'static str,
    pub possessive: &'static str,
    pub reflexive: &'static str,
}

impl Pronouns {
    pub const FEMININE: Self = Self {
        personal: "she",
        possessive: "her",
        reflexive: "herself",
    };
    pub const MASCULINE: Self = Self {
        personal: "he",
        possessive: "his",
        reflexive: "himself",
    };
    pub const IMPERSONAL: Self = Self {
        personal: "it",
        possessive: "its",
        reflexive: "itself",
    };
}

/// Engine-consulted switches and factors carried by a character.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterFlags {
    /// HP is hidden from revealed-state text.
    pub mana_suppressed: bool,
    /// Sees through the opponent's mana suppression.
    pub ignore_mana_suppressed: bool,
    /// Stat changes never reveal the new value.
    pub deceitful: bool,
    pub overheal: bool,
    /// Discards are mirrored to the game room.
    pub public_discards: bool,
    /// Discard and Wait are offered each turn.
    pub default_options: bool,
    pub attacked_this_turn: bool,
    pub timed_attacked_this_turn: bool,
    /// Fraction of incoming damage ignored.
    pub defense_damage_reduction: f64,
    /// Fraction of the defender's TrueDEF ignored by this character's card attacks.
    pub pierce_factor: f64,
    /// Set for characters whose defeat is decided by their own ability.
    pub death_floor: Option<f64>,
}

impl Default for CharacterFlags {
    fn default() -> Self {
        Self {
            mana_suppressed: false,
            ignore_mana_suppressed: false,
            deceitful: false,
            overheal: false,
            public_discards: false,
            default_options: true,
            attacked_this_turn: false,
            timed_attacked_this_turn: false,
            defense_damage_reduction: 0.0,
            pierce_factor: 0.0,
            death_floor: None,
        }
    }
}

/// Immutable character definition. Matches clone it; nothing mutates it.
#[derive(Clone, Debug)]
pub struct CharacterTemplate {
    pub name: String,
    pub emoji: String,
    pub pronouns: Pronouns,
    pub stats: Stats,
    pub deck: Vec<DeckEntry>,
    pub ability: Ability,
    pub flags: CharacterFlags,
    /// Move other characters may borrow through empathy-style cards.
    pub signature: Option<Card>,
}

impl CharacterTemplate {
    pub fn new(name: impl Into<String>, stats: Stats, ability: Ability) -> Self {
        Self {
            name: name.into(),
            emoji: String::new(),
            pronouns: Pronouns::IMPERSONAL,
            stats,
            deck: Vec::new(),
            ability,
            flags: CharacterFlags::default(),
            signature: None,
        }
    }

    pub fn emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = emoji.into();
        self
    }

    pub fn pronouns(mut self, pronouns: Pronouns) -> Self {
        self.pronouns = pronouns;
        self
    }

    pub fn deck(mut self, deck: Vec<DeckEntry>) -> Self {
        self.deck = deck;
        self
    }

    pub fn flags(mut self, flags: CharacterFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn signature(mut self, card: Card) -> Self {
        self.signature = Some(card);
        self
    }
}

/// Supplies character templates by name.
pub trait CharacterSource: Send + Sync {
    fn character(&self, name: &str) -> Option<CharacterTemplate>;

    fn names(&self) -> Vec<String>;
}

#[derive(Clone, Debug)]
pub struct Character {
    pub name: String,
    pub emoji: String,
    pub pronouns: Pronouns,
    pub stats: Stats,
    pub initial_stats: Stats,
    pub ability: Ability,
    pub deck: Deck,
    pub hand: Vec<Card>,
    pub timed_effects: Vec<TimedEffect>,
    /// Next offer only contains default options.
    pub skip_turn: bool,
    pub flags: CharacterFlags,
    /// Named counters for character-specific content.
    pub counters: BTreeMap<&'static str, f64>,
    pub signature: Option<Card>,
}

impl Character {
    pub fn from_template(template: &CharacterTemplate) -> Self {
        Self {
            name: template.name.clone(),
            emoji: template.emoji.clone(),
            pronouns: template.pronouns,
            stats: template.stats,
            initial_stats: template.stats,
            ability: template.ability.clone(),
            deck: Deck::from_entries(&template.deck),
            hand: Vec::new(),
            timed_effects: Vec::new(),
            skip_turn: false,
            flags: template.flags.clone(),
            counters: BTreeMap::new(),
            signature: template.signature.clone(),
        }
    }

    pub fn bounds(&self) -> StatBounds {
        StatBounds {
            max_hp: self.initial_stats.hp,
            overheal: self.flags.overheal,
            death_floor: self.flags.death_floor,
        }
    }

    pub fn draw_card(&mut self, dice: &mut dyn Dice) -> Result<()> {
        let card = self.deck.draw(dice)?;
        self.hand.push(card);
        Ok(())
    }

    pub fn draw_starting_hand(&mut self, count: usize, dice: &mut dyn Dice) -> Result<()> {
        self.deck.shuffle(dice);
        for _ in 0..count {
            self.draw_card(dice)?;
        }
        Ok(())
    }

    /// Moves the hand card at `index` to the discard pile.
    pub fn discard_card(
        &mut self,
        index: usize,
        log: &mut MessageLog,
        channel: Channel,
    ) -> Result<Card> {
        if index >= self.hand.len() {
            return Err(BattleError::HandIndexOutOfBounds {
                index,
                len: self.hand.len(),
            });
        }
        let card = self.hand.remove(index);
        let line = format!("Discarded {} + {}", card.title, card.empower_level);
        if self.flags.public_discards {
            log.gameroom(format!("{}: {}", self.name, line));
        }
        log.push(channel, line);
        self.deck.discard(card.clone());
        Ok(card)
    }

    /// Plays the hand card at `index`: it leaves the hand, the rest of the
    /// hand is empowered, and a replacement is drawn.
    pub fn play_card(
        &mut self,
        index: usize,
        dice: &mut dyn Dice,
        log: &mut MessageLog,
        channel: Channel,
    ) -> Result<Card> {
        let card = self.discard_card(index, log, channel)?;
        if card.traits.contains(CardTraits::REMOVE_ON_PLAY) {
            self.deck.pop_discard();
        }
        self.empower_hand();
        self.draw_card(dice)?;
        Ok(card)
    }

    pub fn empower_hand(&mut self) {
        for card in &mut self.hand {
            card.empower_level += 1;
        }
    }

    /// Adds `delta` to `stat`, clamped, and reports the change to the game room.
    ///
    /// Always succeeds today; the return value leaves room for blocked changes.
    pub fn adjust_stat(&mut self, delta: f64, stat: Stat, log: &mut MessageLog) -> bool {
        let delta = round2(delta);
        let proposed = round2(self.stats.get(stat) + delta);
        self.write_stat(stat, proposed);

        let label = stat.label();
        let mut lines = Vec::with_capacity(2);
        if delta < 0.0 {
            lines.push(format!("{} *lost* *{}* {}!", self.name, -delta, label));
        } else {
            lines.push(format!("{} **gained** **{}** {}!", self.name, delta, label));
        }
        if self.reveals(stat) {
            lines.push(format!(
                "{}'s new {}: **{}**",
                self.name,
                label,
                self.stats.get(stat)
            ));
        }
        log.gameroom(lines.join(". "));
        true
    }

    /// Sets `stat` to `value`, clamped. `announce` controls the log line.
    pub fn set_stat(
        &mut self,
        value: f64,
        stat: Stat,
        log: &mut MessageLog,
        announce: bool,
    ) -> bool {
        let value = round2(value);
        self.write_stat(stat, value);
        if announce {
            log.gameroom(format!("{}'s {} is set to {}.", self.name, stat.label(), value));
        }
        true
    }

    fn write_stat(&mut self, stat: Stat, proposed: f64) {
        let clamped = self.bounds().clamp(stat, self.stats.get(stat), proposed);
        self.stats.set(stat, clamped);
    }

    fn reveals(&self, stat: Stat) -> bool {
        !(self.flags.deceitful || (stat == Stat::HP && self.flags.mana_suppressed))
    }

    pub fn remove_expired_effects(&mut self) {
        self.timed_effects.retain(|effect| !effect.is_expired());
    }

    pub fn counter(&self, key: &str) -> f64 {
        self.counters.get(key).copied().unwrap_or(0.0)
    }

    pub fn set_counter(&mut self, key: &'static str, value: f64) {
        self.counters.insert(key, value);
    }

    pub fn add_counter(&mut self, key: &'static str, delta: f64) -> f64 {
        let value = self.counter(key) + delta;
        self.counters.insert(key, value);
        value
    }

    /// Visible HP text, honoring mana suppression.
    pub fn hp_text(&self) -> String {
        if self.flags.mana_suppressed {
            "??".to_string()
        } else {
            self.stats.hp.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Nature;
    use crate::dice::ScriptedDice;
    use crate::side::Side;

    fn template() -> CharacterTemplate {
        CharacterTemplate::new(
            "Tester",
            Stats::new(100.0, 12.0, 10.0, 0.0, 10.0, 0.0),
            Ability::new("None", ""),
        )
        .deck(vec![
            DeckEntry::new(Card::new("Jab", Nature::Attack).effects([6.0]), 6),
            DeckEntry::new(
                Card::new("Insight", Nature::Util).traits(CardTraits::REMOVE_ON_PLAY),
                2,
            ),
        ])
    }

    #[test]
    fn template_is_not_mutated_by_character() {
        let template = template();
        let mut character = Character::from_template(&template);
        let mut log = MessageLog::new();
        character.adjust_stat(-30.0, Stat::HP, &mut log);
        character.ability.name.push_str(" (changed)");
        assert_eq!(template.stats.hp, 100.0);
        assert_eq!(template.ability.name, "None");
        assert_eq!(character.initial_stats.hp, 100.0);
    }

    #[test]
    fn adjust_stat_clamps_and_reports() {
        let mut character = Character::from_template(&template());
        let mut log = MessageLog::new();
        character.adjust_stat(-50.0, Stat::ATK, &mut log);
        assert_eq!(character.stats.atk, 1.0);
        character.adjust_stat(25.0, Stat::HP, &mut log);
        assert_eq!(character.stats.hp, 100.0);

        let lines = log.flush(Channel::Gameroom);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("*lost* *50* ATK"));
        assert!(lines[0].contains("new ATK: **1**"));
    }

    #[test]
    fn suppressed_hp_hides_new_value() {
        let mut character = Character::from_template(&template());
        character.flags.mana_suppressed = true;
        let mut log = MessageLog::new();
        character.adjust_stat(-5.0, Stat::HP, &mut log);
        character.adjust_stat(2.0, Stat::SPD, &mut log);
        let lines = log.flush(Channel::Gameroom);
        assert!(!lines[0].contains("new HP"));
        assert!(lines[1].contains("new SPD: **12**"));
    }

    #[test]
    fn deceitful_hides_every_new_value() {
        let mut character = Character::from_template(&template());
        character.flags.deceitful = true;
        let mut log = MessageLog::new();
        character.adjust_stat(3.0, Stat::DEF, &mut log);
        let lines = log.flush(Channel::Gameroom);
        assert!(!lines[0].contains("new DEF"));
    }

    #[test]
    fn discard_out_of_bounds_is_an_error() {
        let mut character = Character::from_template(&template());
        let mut log = MessageLog::new();
        let err = character
            .discard_card(0, &mut log, Channel::Private(Side::Challenger))
            .unwrap_err();
        assert_eq!(err, BattleError::HandIndexOutOfBounds { index: 0, len: 0 });
    }

    #[test]
    fn play_card_empowers_rest_of_hand_and_redraws() {
        let mut character = Character::from_template(&template());
        let mut dice = ScriptedDice::new([]);
        let mut log = MessageLog::new();
        character.draw_starting_hand(6, &mut dice).unwrap();

        let played = character
            .play_card(2, &mut dice, &mut log, Channel::Private(Side::Challenger))
            .unwrap();
        assert_eq!(played.empower_level, 0);
        assert_eq!(character.hand.len(), 6);
        assert!(character.hand[..5].iter().all(|c| c.empower_level == 1));
        assert_eq!(character.hand[5].empower_level, 0);
        assert_eq!(
            log.flush(Channel::Private(Side::Challenger)),
            vec![format!("Discarded {} + 0", played.title)]
        );
    }

    #[test]
    fn remove_on_play_cards_leave_the_deck() {
        let mut character = Character::from_template(&template());
        let mut dice = ScriptedDice::new([]);
        let mut log = MessageLog::new();
        character
            .hand
            .push(Card::new("Insight", Nature::Util).traits(CardTraits::REMOVE_ON_PLAY));
        let before = character.deck.len();
        character
            .play_card(0, &mut dice, &mut log, Channel::Private(Side::Challenged))
            .unwrap();
        // The played copy never reaches the discard pile; one card was drawn.
        assert_eq!(character.deck.len(), before - 1);
        assert!(character.deck.discard_pile().iter().all(|c| c.title != "Insight"));
    }
}
