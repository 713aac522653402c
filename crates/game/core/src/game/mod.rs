//! Match state and the rules that read or mutate both sides at once.
//!
//! [`Game`] is the authoritative owner of a match: the two characters, the
//! per-side turn metadata, game-wide theory flags, the battle log and the
//! dice. Card actions, ability hooks and timed effects all receive a context
//! borrowing the game mutably, so every rule flows through the methods here.

mod attack;
mod effects;
mod turn;

pub use attack::{AttackRequest, calculate_damage};
pub use turn::{MoveOffer, MoveSlot, TurnPhase};

use std::sync::Arc;

use bitflags::bitflags;
use tracing::{debug, info};

use crate::card::Card;
use crate::character::{Character, CharacterTemplate};
use crate::config::BattleConfig;
use crate::context::EffectContext;
use crate::dice::Dice;
use crate::error::Result;
use crate::messages::{Channel, MessageLog};
use crate::plugin::GamePlugin;
use crate::side::{PerSide, Side};
use crate::stats::Stat;

bitflags! {
    /// Game-wide rule changes unlocked by theory cards. Never cleared.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Theory: u8 {
        /// ATK, DEF and SPD changes are halved.
        const IRREVERSIBILITY = 1 << 0;
        /// Offered cards take the turn count as their empower level.
        const BALANCE = 1 << 1;
        /// The first offer dice always read 0, 1, 2, 3.
        const PRESCIENCE = 1 << 2;
        /// Both sides swapped their active and discard piles.
        const SOUL = 1 << 3;
    }
}

bitflags! {
    /// Per-side research effects that modify the theories while active.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Research: u8 {
        const MILLENIUM_BARRIER = 1 << 0;
        const THOUSAND_YEAR_SANCTUARY = 1 << 1;
        const TREE_OF_LIFE = 1 << 2;
    }
}

/// Turn metadata kept for one side.
#[derive(Clone, Debug)]
pub struct SideState {
    /// The side's current attack misses. Reset after every attack.
    pub attack_missed: bool,
    /// The side's current attack was already countered. Reset after every attack.
    pub attack_countered: bool,
    /// Multiplier applied to the side's raw attack damage.
    pub attack_modifier: f64,
    pub forfeited: bool,
    /// The side's move resolves with the opponent as the acting character.
    pub context_reversed: bool,
    pub research: Research,
    /// Move picked this turn, set before resolution.
    pub selected: Option<Card>,
    /// Move resolved in the previous turn.
    pub last_used: Option<Card>,
    /// Slots offered this turn.
    pub current_draws: Vec<MoveSlot>,
}

impl Default for SideState {
    fn default() -> Self {
        Self {
            attack_missed: false,
            attack_countered: false,
            attack_modifier: 1.0,
            forfeited: false,
            context_reversed: false,
            research: Research::empty(),
            selected: None,
            last_used: None,
            current_draws: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TieReason {
    DoubleForfeit,
    TurnLimit,
}

/// How a finished match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Win { winner: Side, loser: Side },
    Tie(TieReason),
}

impl Outcome {
    pub fn defeat(loser: Side) -> Self {
        Outcome::Win {
            winner: loser.other(),
            loser,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::Win { winner, .. } => Some(*winner),
            Outcome::Tie(_) => None,
        }
    }

    pub fn loser(&self) -> Option<Side> {
        match self {
            Outcome::Win { loser, .. } => Some(*loser),
            Outcome::Tie(_) => None,
        }
    }
}

pub struct Game {
    pub characters: PerSide<Character>,
    pub sides: PerSide<SideState>,
    pub turn_count: u32,
    /// Monotonic: once set, never cleared.
    pub game_over: bool,
    pub outcome: Option<Outcome>,
    pub theories: Theory,
    pub messages: MessageLog,
    plugins: Vec<Arc<dyn GamePlugin>>,
    dice: Box<dyn Dice>,
    config: BattleConfig,
    next_effect_id: u64,
}

impl Game {
    /// Builds a match from two templates. Templates are cloned, never mutated.
    pub fn new(
        challenger: &CharacterTemplate,
        challenged: &CharacterTemplate,
        config: BattleConfig,
        dice: Box<dyn Dice>,
    ) -> Self {
        Self {
            characters: PerSide::new(
                Character::from_template(challenger),
                Character::from_template(challenged),
            ),
            sides: PerSide::default(),
            turn_count: 0,
            game_over: false,
            outcome: None,
            theories: Theory::empty(),
            messages: MessageLog::new(),
            plugins: Vec::new(),
            dice,
            config,
            next_effect_id: 0,
        }
    }

    /// Registers plugins. Invocation follows registration order.
    pub fn with_plugins(mut self, plugins: impl IntoIterator<Item = Arc<dyn GamePlugin>>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn character(&self, side: Side) -> &Character {
        &self.characters[side]
    }

    pub fn character_mut(&mut self, side: Side) -> &mut Character {
        &mut self.characters[side]
    }

    pub fn dice(&mut self) -> &mut dyn Dice {
        self.dice.as_mut()
    }

    pub fn roll_d100(&mut self) -> u32 {
        self.dice.roll_d100()
    }

    pub(crate) fn plugins(&self) -> Vec<Arc<dyn GamePlugin>> {
        self.plugins.clone()
    }

    /// Prepares both characters and runs the start-of-match plugin hooks.
    pub fn start(&mut self) -> Result<()> {
        for side in Side::BOTH {
            if self.characters[side.other()].flags.ignore_mana_suppressed {
                self.characters[side].flags.mana_suppressed = false;
            }
        }
        for plugin in self.plugins() {
            plugin.modify_initial_stats(self)?;
        }
        let hand = self.config.starting_hand;
        for side in Side::BOTH {
            let Game {
                characters, dice, ..
            } = self;
            characters[side].draw_starting_hand(hand, dice.as_mut())?;
        }
        for plugin in self.plugins() {
            plugin.on_game_start(self)?;
        }
        info!(
            target: "duel::game",
            challenger = %self.characters[Side::Challenger].name,
            challenged = %self.characters[Side::Challenged].name,
            plugins = self.plugins.len(),
            "match started"
        );
        Ok(())
    }

    /// Stat change routed through the game-wide theory rules.
    pub fn adjust_stat(&mut self, side: Side, delta: f64, stat: Stat) -> bool {
        let mut delta = delta;
        if stat.is_combat_stat() && self.theories.contains(Theory::IRREVERSIBILITY) {
            delta /= 2.0;
            if delta > 0.0
                && self.sides[side.other()]
                    .research
                    .contains(Research::MILLENIUM_BARRIER)
            {
                delta = 0.0;
            }
        }
        let Game {
            characters,
            messages,
            ..
        } = self;
        characters[side].adjust_stat(delta, stat, messages)
    }

    pub fn set_stat(&mut self, side: Side, value: f64, stat: Stat, announce: bool) -> bool {
        let Game {
            characters,
            messages,
            ..
        } = self;
        characters[side].set_stat(value, stat, messages, announce)
    }

    /// Draws one card into the hand of `side`.
    pub fn draw_card(&mut self, side: Side) -> Result<()> {
        let Game {
            characters, dice, ..
        } = self;
        characters[side].draw_card(dice.as_mut())
    }

    /// Discards the hand card at `index`, reporting it on the side's private channel.
    pub fn discard_card(&mut self, side: Side, index: usize) -> Result<Card> {
        let Game {
            characters,
            messages,
            ..
        } = self;
        characters[side].discard_card(index, messages, Channel::Private(side))
    }

    /// Picks the side that resolves first this turn.
    ///
    /// A lone submitted move goes first. Otherwise higher priority wins, then
    /// higher SPD, then a coin flip.
    pub fn first_move(&mut self, moves: &PerSide<Option<Card>>) -> Side {
        let (Some(challenger), Some(challenged)) =
            (&moves[Side::Challenger], &moves[Side::Challenged])
        else {
            return if moves[Side::Challenger].is_none() {
                Side::Challenged
            } else {
                Side::Challenger
            };
        };

        if challenger.priority != challenged.priority {
            return if challenger.priority > challenged.priority {
                Side::Challenger
            } else {
                Side::Challenged
            };
        }

        let spd = self.characters.as_ref().map(|_, c| c.stats.spd);
        if spd[Side::Challenger] != spd[Side::Challenged] {
            return if spd[Side::Challenger] > spd[Side::Challenged] {
                Side::Challenger
            } else {
                Side::Challenged
            };
        }

        if self.dice.coin_flip() {
            Side::Challenger
        } else {
            Side::Challenged
        }
    }

    /// A side is defeated at 0 HP or below, unless its character manages its
    /// own death floor, or once it forfeited.
    pub fn is_defeated(&self, side: Side) -> bool {
        let character = &self.characters[side];
        let out_of_hp = character.stats.hp <= 0.0 && character.flags.death_floor.is_none();
        out_of_hp || self.sides[side].forfeited
    }

    /// Scans side 0 then side 1 and ends the match on the first defeat found.
    ///
    /// Returns the losing side when this call ended the match.
    pub fn check_game_over(&mut self) -> Option<Side> {
        if self.game_over {
            return None;
        }
        let loser = Side::BOTH.into_iter().find(|side| self.is_defeated(*side))?;
        self.messages
            .gameroom(format!("# {} has been defeated!", self.characters[loser].name));
        self.finish(Outcome::defeat(loser));
        Some(loser)
    }

    pub(crate) fn finish(&mut self, outcome: Outcome) {
        self.game_over = true;
        self.outcome = Some(outcome);
        info!(target: "duel::game", ?outcome, turn = self.turn_count, "match finished");
    }

    /// Board summary pushed to the game room at turn start and game over.
    pub fn announce_board(&mut self) {
        let lines: Vec<String> = Side::BOTH
            .iter()
            .map(|side| {
                let c = &self.characters[*side];
                format!(
                    "{} **{}**: HP {} | ATK {} | DEF {} | SPD {} | TrueDEF {} | {} {}",
                    c.emoji,
                    c.name,
                    c.hp_text(),
                    c.stats.atk,
                    c.stats.def,
                    c.stats.spd,
                    c.stats.true_def,
                    c.ability.name,
                    c.stats.ability
                )
            })
            .collect();
        self.messages.gameroom(lines.join("\n"));
    }

    pub(crate) fn next_effect_id(&mut self) -> u64 {
        self.next_effect_id += 1;
        self.next_effect_id
    }

    /// Runs a turn-style hook against `side`.
    pub(crate) fn run_turn_hook(
        &mut self,
        side: Side,
        hook: Option<crate::ability::TurnHook>,
    ) -> Result<()> {
        if let Some(hook) = hook {
            hook(&mut EffectContext::new(self, side))?;
        }
        Ok(())
    }

    pub(crate) fn log_move(&self, side: Side, card: &Card) {
        debug!(
            target: "duel::game",
            ?side,
            card = %card.title,
            empower = card.empower_level,
            nature = %card.nature,
            "resolving move"
        );
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("characters", &self.characters)
            .field("turn_count", &self.turn_count)
            .field("game_over", &self.game_over)
            .field("outcome", &self.outcome)
            .field("theories", &self.theories)
            .finish_non_exhaustive()
    }
}
