//! Turn phases: start, move offers, selection, resolution and turn end.
//!
//! The phases are synchronous. The runtime calls them one by one and awaits
//! the move providers between [`Game::offer_moves`] and
//! [`Game::resolve_moves`].

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use super::{Game, Outcome, Research, Theory, TieReason};
use crate::card::Card;
use crate::context::{CardContext, EffectContext};
use crate::defaults;
use crate::error::{BattleError, Result};
use crate::messages::{Channel, MessageSink};
use crate::side::{PerSide, Side};
use crate::stats::Stat;

const SEPARATOR: &str = "## ================================";

/// Identifies which stage of the turn loop is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnPhase {
    TurnStart,
    MoveOffer,
    MoveSelect,
    MoveResolve,
    EffectResolve,
    TurnEnd,
}

impl TurnPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnPhase::TurnStart => "turn_start",
            TurnPhase::MoveOffer => "move_offer",
            TurnPhase::MoveSelect => "move_select",
            TurnPhase::MoveResolve => "move_resolve",
            TurnPhase::EffectResolve => "effect_resolve",
            TurnPhase::TurnEnd => "turn_end",
        }
    }
}

/// Key of an offered move. Slots below 7 are hand indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveSlot(pub u8);

impl MoveSlot {
    pub const DISCARD: Self = Self(7);
    pub const WAIT: Self = Self(8);
    pub const DO_NOTHING: Self = Self(9);
    pub const FORFEIT: Self = Self(10);

    pub fn hand_index(self) -> Option<usize> {
        (self.0 < Self::DISCARD.0).then_some(usize::from(self.0))
    }
}

impl fmt::Display for MoveSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Moves offered to one side for the current turn.
#[derive(Clone, Debug)]
pub struct MoveOffer {
    pub side: Side,
    /// Offer dice in ascending order. Empty when the turn was skipped.
    pub rolls: Vec<u32>,
    pub slots: BTreeMap<MoveSlot, Card>,
    pub skipped: bool,
}

impl MoveOffer {
    pub fn card(&self, slot: MoveSlot) -> Option<&Card> {
        self.slots.get(&slot)
    }

    pub fn contains(&self, slot: MoveSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn available(&self) -> impl Iterator<Item = MoveSlot> + '_ {
        self.slots.keys().copied()
    }

    /// Listing in the `- slot: card` form shown to the side.
    pub fn render(&self) -> String {
        self.slots
            .iter()
            .map(|(slot, card)| format!("- {slot}: {}", card.summary()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Game {
    /// Opens a new turn: counts it, resets per-turn flags, fires start-of-turn
    /// hooks and announces the board. Reaching the turn limit ends the match
    /// in a tie before any move is offered.
    pub fn begin_turn(&mut self) -> Result<()> {
        if self.game_over {
            return Ok(());
        }
        let frozen = self.theories.contains(Theory::BALANCE)
            && self
                .sides
                .iter()
                .any(|(_, s)| s.research.contains(Research::THOUSAND_YEAR_SANCTUARY));
        if frozen {
            self.messages
                .gameroom(format!("# Turn {} (time stands still)", self.turn_count));
        } else {
            self.turn_count += 1;
            self.messages.gameroom(format!("# Turn {}", self.turn_count));
        }
        debug!(target: "duel::turn", turn = self.turn_count, frozen, "turn started");

        for side in Side::BOTH {
            let flags = &mut self.characters[side].flags;
            flags.attacked_this_turn = false;
            flags.timed_attacked_this_turn = false;
            let hook = self.characters[side].ability.start_of_turn();
            self.run_turn_hook(side, hook)?;
        }
        self.announce_board();

        if self.turn_count >= self.config.turn_limit {
            self.messages.gameroom(format!(
                "## {} Turn Limit Reached - Game Over!",
                self.config.turn_limit
            ));
            self.finish(Outcome::Tie(TieReason::TurnLimit));
        }
        Ok(())
    }

    /// Rolls the offer dice for `side` and builds its move offer.
    ///
    /// Each distinct roll below the hand size offers the hand card at that
    /// index, transformed if it is conditional. A repeated roll empowers the
    /// offered card. Default options follow the character's flags, and
    /// Forfeit is always offered. A pending skip offers defaults only and is
    /// consumed here.
    pub fn offer_moves(&mut self, side: Side) -> Result<MoveOffer> {
        let channel = Channel::Private(side);
        self.print_hand(side);

        let character = &self.characters[side];
        let skipped = character.skip_turn;
        let mut fallback = BTreeMap::new();
        if character.flags.default_options {
            fallback.insert(MoveSlot::DISCARD, defaults::discard());
            fallback.insert(MoveSlot::WAIT, defaults::wait());
        } else if skipped {
            fallback.insert(MoveSlot::DO_NOTHING, defaults::do_nothing());
        }
        fallback.insert(MoveSlot::FORFEIT, defaults::forfeit());

        if skipped {
            let line = format!("## {} skips this turn!", character.name);
            self.messages.push(channel, line);
            self.characters[side].skip_turn = false;
            return Ok(self.record_offer(side, Vec::new(), fallback, true));
        }

        let base_dice = self.config.dice_count;
        let extra = self.sides[side].research.contains(Research::TREE_OF_LIFE);
        let count = base_dice + usize::from(extra);
        let mut rolls: Vec<u32> = if self.theories.contains(Theory::PRESCIENCE) {
            (0..count)
                .map(|i| if i < base_dice { i as u32 } else { 5 })
                .collect()
        } else {
            let sides = self.config.dice_sides;
            (0..count).map(|_| self.dice.roll(sides)).collect()
        };
        rolls.sort_unstable();
        let listed: Vec<String> = rolls.iter().map(u32::to_string).collect();
        self.messages
            .push(channel, format!("### Draws: {}", listed.join(", ")));

        let mut slots: BTreeMap<MoveSlot, Card> = BTreeMap::new();
        let hand_len = self.characters[side].hand.len();
        for &roll in &rolls {
            let index = roll as usize;
            if index >= hand_len {
                continue;
            }
            let slot = MoveSlot(roll as u8);
            if let Some(offered) = slots.get_mut(&slot) {
                offered.empower_level += 1;
                let in_hand = &mut self.characters[side].hand[index];
                if !in_hand.has_conditional() {
                    in_hand.empower_level += 1;
                }
            } else {
                let card = self.characters[side].hand[index].resolve_conditional(self, side);
                slots.insert(slot, card);
            }
        }

        if self.theories.contains(Theory::BALANCE) {
            let level = self.turn_count as i32;
            for card in slots.values_mut() {
                card.empower_level = level;
            }
        }

        slots.extend(fallback);
        Ok(self.record_offer(side, rolls, slots, false))
    }

    fn record_offer(
        &mut self,
        side: Side,
        rolls: Vec<u32>,
        slots: BTreeMap<MoveSlot, Card>,
        skipped: bool,
    ) -> MoveOffer {
        let offer = MoveOffer {
            side,
            rolls,
            slots,
            skipped,
        };
        self.sides[side].current_draws = offer.available().collect();
        let name = self.characters[side].name.clone();
        let channel = Channel::Private(side);
        self.messages
            .push(channel, format!("## {name}'s Active Cards:"));
        self.messages.push(channel, offer.render());
        debug!(
            target: "duel::turn",
            ?side,
            rolls = ?offer.rolls,
            slots = offer.slots.len(),
            skipped,
            "moves offered"
        );
        offer
    }

    fn print_hand(&mut self, side: Side) {
        let character = &self.characters[side];
        let header = format!("# {} {}'s Hand:", character.emoji, character.name);
        let cards: Vec<String> = character
            .hand
            .iter()
            .enumerate()
            .map(|(i, card)| format!("- {i}: {}", card.summary()))
            .collect();
        let channel = Channel::Private(side);
        self.messages.push(channel, header);
        self.messages.push(channel, cards.join("\n"));
    }

    /// Commits `side` to the move in `slot`.
    ///
    /// A hand slot plays the card from hand: it is discarded, the rest of the
    /// hand is empowered and a replacement is drawn. Returns the offered card,
    /// which is what resolves.
    pub fn play_selection(
        &mut self,
        side: Side,
        slot: MoveSlot,
        offer: &MoveOffer,
    ) -> Result<Card> {
        let card = offer
            .card(slot)
            .cloned()
            .ok_or(BattleError::UnknownSlot(slot.0))?;
        if let Some(index) = slot.hand_index() {
            let Game {
                characters,
                dice,
                messages,
                ..
            } = self;
            characters[side].play_card(index, dice.as_mut(), messages, Channel::Private(side))?;
        }
        self.sides[side].selected = Some(card.clone());
        Ok(card)
    }

    /// Discards every hand card offered to `side` this turn, highest index
    /// first, drawing a replacement for each. Returns how many were recycled.
    pub fn recycle_offered(&mut self, side: Side) -> Result<usize> {
        let mut indices: Vec<usize> = self.sides[side]
            .current_draws
            .iter()
            .filter_map(|slot| slot.hand_index())
            .collect();
        indices.sort_unstable_by(|a, b| b.cmp(a));

        let Game {
            characters,
            dice,
            messages,
            ..
        } = self;
        let character = &mut characters[side];
        for &index in &indices {
            character.discard_card(index, messages, Channel::Private(side))?;
            character.draw_card(dice.as_mut())?;
        }
        Ok(indices.len())
    }

    /// Resolves the selected moves and returns the turn's move order.
    ///
    /// Sides resolve in order until the match ends. After a side's move the
    /// game-over check runs unless that side forfeited; both sides forfeiting
    /// ends the match in a tie.
    pub fn resolve_moves(&mut self, moves: &PerSide<Option<Card>>) -> Result<[Side; 2]> {
        for side in Side::BOTH {
            self.sides[side].selected = moves[side].clone();
        }
        for side in Side::BOTH {
            if let Some(hook) = self.characters[side].ability.selected_move_modifier() {
                hook(&mut EffectContext::new(self, side), moves[side].as_ref())?;
            }
        }

        let first = self.first_move(moves);
        let order = [first, first.other()];
        self.messages.gameroom(SEPARATOR);

        for side in order {
            if self.game_over {
                break;
            }
            if let Some(card) = &moves[side] {
                self.play_move(side, card)?;
            }
            if !self.sides[side].forfeited && self.check_game_over().is_some() {
                break;
            }
        }

        if Side::BOTH.iter().all(|side| self.sides[*side].forfeited) {
            self.messages
                .gameroom("# Both players forfeited! The game ended in a draw!");
            self.finish(Outcome::Tie(TieReason::DoubleForfeit));
        }
        Ok(order)
    }

    fn play_move(&mut self, side: Side, card: &Card) -> Result<()> {
        self.log_move(side, card);
        let character = &self.characters[side];
        let line = format!(
            "## {} {} used **{} {}**!",
            character.emoji,
            character.name,
            card.emoji,
            card.display_title()
        );
        self.messages.gameroom(line);

        if card.hp_cost > 0.0 {
            self.adjust_stat(side, -card.hp_cost, Stat::HP);
        }

        let actor = if self.sides[side].context_reversed {
            side.other()
        } else {
            side
        };
        let wrapper = self.characters[side].ability.own_card_wrapper();
        let mut ctx = CardContext::new(self, actor, card.clone());
        match wrapper {
            Some(wrapper) => wrapper(&mut ctx)?,
            None => ctx.play()?,
        }

        let opponent = side.other();
        if let Some(hook) = self.characters[opponent].ability.after_opponent_move() {
            hook(&mut EffectContext::new(self, opponent), card)?;
        }
        if let Some(hook) = self.characters[side].ability.after_own_card() {
            hook(&mut EffectContext::new(self, side), card)?;
        }
        Ok(())
    }

    /// Closes the turn: drops expired effects, fires end-of-turn hooks in
    /// move order and records the moves as last used.
    pub fn end_turn(&mut self, order: [Side; 2], moves: &PerSide<Option<Card>>) -> Result<()> {
        for side in order {
            if self.game_over {
                break;
            }
            self.characters[side].remove_expired_effects();
            let hook = self.characters[side].ability.end_of_turn();
            self.run_turn_hook(side, hook)?;
            if self.check_game_over().is_some() {
                break;
            }
        }

        for side in Side::BOTH {
            let state = &mut self.sides[side];
            state.last_used = moves[side].clone();
            state.selected = None;
        }

        if self.game_over {
            self.announce_board();
            self.messages.gameroom("# Game over!");
        }
        Ok(())
    }

    /// Plays one full turn, asking `select` for each side's move.
    ///
    /// A slot that is not part of the offer counts as no move.
    #[cfg(test)]
    pub(crate) fn run_turn(
        &mut self,
        mut select: impl FnMut(&Game, &MoveOffer) -> Option<MoveSlot>,
    ) -> Result<()> {
        self.begin_turn()?;
        if self.game_over {
            return Ok(());
        }

        let offers = [
            self.offer_moves(Side::Challenger)?,
            self.offer_moves(Side::Challenged)?,
        ];
        let mut moves: PerSide<Option<Card>> = PerSide::default();
        for offer in &offers {
            if let Some(slot) = select(self, offer).filter(|slot| offer.contains(*slot)) {
                moves[offer.side] = Some(self.play_selection(offer.side, slot, offer)?);
            }
        }

        let order = self.resolve_moves(&moves)?;
        self.resolve_timed_effects(order)?;
        self.end_turn(order, &moves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Nature;
    use crate::dice::ScriptedDice;
    use crate::test_support::{duel, plain_attack};

    fn pick(slot: MoveSlot) -> impl FnMut(&Game, &MoveOffer) -> Option<MoveSlot> {
        move |_, _| Some(slot)
    }

    #[test]
    fn offer_maps_distinct_rolls_and_empowers_repeats() {
        let mut game = duel();
        game.start().unwrap();
        game.dice = Box::new(ScriptedDice::new([3, 1, 3, 5]));

        let offer = game.offer_moves(Side::Challenger).unwrap();
        assert_eq!(offer.rolls, vec![1, 3, 3, 5]);
        let hand: Vec<MoveSlot> = offer.available().filter(|s| s.hand_index().is_some()).collect();
        assert_eq!(hand, vec![MoveSlot(1), MoveSlot(3), MoveSlot(5)]);
        assert_eq!(offer.card(MoveSlot(3)).unwrap().empower_level, 1);
        assert_eq!(offer.card(MoveSlot(1)).unwrap().empower_level, 0);
        assert!(offer.contains(MoveSlot::DISCARD));
        assert!(offer.contains(MoveSlot::WAIT));
        assert!(offer.contains(MoveSlot::FORFEIT));
        assert!(!offer.contains(MoveSlot::DO_NOTHING));
    }

    #[test]
    fn skipped_turn_offers_defaults_only_once() {
        let mut game = duel();
        game.start().unwrap();
        game.characters[Side::Challenged].skip_turn = true;
        game.characters[Side::Challenged].flags.default_options = false;

        let offer = game.offer_moves(Side::Challenged).unwrap();
        assert!(offer.skipped);
        assert_eq!(
            offer.available().collect::<Vec<_>>(),
            vec![MoveSlot::DO_NOTHING, MoveSlot::FORFEIT]
        );
        assert!(!game.characters[Side::Challenged].skip_turn);

        let next = game.offer_moves(Side::Challenged).unwrap();
        assert!(!next.skipped);
        assert_eq!(next.rolls.len(), 4);
    }

    #[test]
    fn prescience_fixes_rolls_and_tree_of_life_adds_five() {
        let mut game = duel();
        game.start().unwrap();
        game.theories |= Theory::PRESCIENCE;
        game.sides[Side::Challenger].research |= Research::TREE_OF_LIFE;
        let offer = game.offer_moves(Side::Challenger).unwrap();
        assert_eq!(offer.rolls, vec![0, 1, 2, 3, 5]);
        let other = game.offer_moves(Side::Challenged).unwrap();
        assert_eq!(other.rolls, vec![0, 1, 2, 3]);
    }

    #[test]
    fn end_to_end_attack_card_leaves_eighty_eight() {
        let mut game = duel();
        game.theories |= Theory::PRESCIENCE;
        game.start().unwrap();
        game.characters[Side::Challenger].hand[0] = plain_attack();

        game.run_turn(|_, offer| match offer.side {
            Side::Challenger => Some(MoveSlot(0)),
            Side::Challenged => None,
        })
        .unwrap();
        assert_eq!(game.characters[Side::Challenged].stats.hp, 88.0);
        assert_eq!(
            game.sides[Side::Challenger].last_used.as_ref().map(|c| c.title.as_str()),
            Some("Strike")
        );
        assert!(game.sides[Side::Challenged].last_used.is_none());
    }

    #[test]
    fn double_forfeit_is_a_tie() {
        let mut game = duel();
        game.start().unwrap();
        game.run_turn(pick(MoveSlot::FORFEIT)).unwrap();
        assert!(game.game_over);
        assert_eq!(game.outcome, Some(Outcome::Tie(TieReason::DoubleForfeit)));
        assert_eq!(game.outcome.and_then(|o| o.winner()), None);
        assert_eq!(game.outcome.and_then(|o| o.loser()), None);
    }

    #[test]
    fn single_forfeit_loses_when_opponent_moves_after() {
        let mut game = duel();
        game.start().unwrap();
        game.run_turn(|_, offer| match offer.side {
            Side::Challenger => Some(MoveSlot::FORFEIT),
            Side::Challenged => Some(MoveSlot::WAIT),
        })
        .unwrap();
        assert_eq!(
            game.outcome,
            Some(Outcome::Win {
                winner: Side::Challenged,
                loser: Side::Challenger
            })
        );
    }

    #[test]
    fn turn_limit_ends_in_a_tie_without_extra_turns() {
        let mut game = duel();
        game.start().unwrap();
        let mut offers_seen = 0;
        while !game.game_over {
            game.run_turn(|_, _| {
                offers_seen += 1;
                None
            })
            .unwrap();
        }
        assert_eq!(game.turn_count, 50);
        assert_eq!(game.outcome, Some(Outcome::Tie(TieReason::TurnLimit)));
        // Moves were offered on turns 1..=49 only.
        assert_eq!(offers_seen, 49 * 2);
    }

    #[test]
    fn balance_with_sanctuary_freezes_the_turn_count() {
        let mut game = duel();
        game.start().unwrap();
        game.begin_turn().unwrap();
        game.theories |= Theory::BALANCE;
        game.sides[Side::Challenged].research |= Research::THOUSAND_YEAR_SANCTUARY;
        game.begin_turn().unwrap();
        assert_eq!(game.turn_count, 1);
    }

    #[test]
    fn hp_cost_is_paid_before_the_action() {
        let mut game = duel();
        game.start().unwrap();
        let card = Card::new("Blood Pact", Nature::Util).hp_cost(6.0);
        let moves = PerSide::new(Some(card), None);
        let order = game.resolve_moves(&moves).unwrap();
        assert_eq!(order, [Side::Challenger, Side::Challenged]);
        assert_eq!(game.characters[Side::Challenger].stats.hp, 94.0);
    }

    #[test]
    fn unknown_slot_is_rejected() {
        let mut game = duel();
        game.start().unwrap();
        let offer = game.offer_moves(Side::Challenger).unwrap();
        let err = game
            .play_selection(Side::Challenger, MoveSlot(42), &offer)
            .unwrap_err();
        assert_eq!(err, BattleError::UnknownSlot(42));
    }
}
