//! Moves offered outside the hand: Discard, Wait, Do Nothing and Forfeit.

use crate::card::{Card, CardTraits, Nature};
use crate::config::BattleConfig;
use crate::stats::Stat;

pub fn discard() -> Card {
    Card::new("Discard", Nature::Default)
        .emoji("♻️")
        .traits(CardTraits::HIDE_EMPOWER)
        .describe(|_| {
            "ATK+1. DEF+1. SPD+1. Discards all of your current active cards. Draw the same \
             number of cards you discarded. Empower all cards in your hand afterwards."
                .to_string()
        })
        .action(|ctx| {
            for stat in [Stat::ATK, Stat::DEF, Stat::SPD] {
                ctx.flat_self_stat(1.0, stat);
            }
            let side = ctx.side();
            ctx.game_mut().recycle_offered(side)?;
            ctx.me_mut().empower_hand();
            let line = format!("All cards in {}'s hand are empowered!", ctx.name());
            ctx.send(line);
            Ok(())
        })
}

pub fn wait() -> Card {
    Card::new("Wait", Nature::Default)
        .emoji("⏳")
        .traits(CardTraits::HIDE_EMPOWER)
        .describe(|_| "Heals 10 HP. Empower all cards in your hand afterwards.".to_string())
        .action(|ctx| {
            ctx.me_mut().empower_hand();
            let name = ctx.name().to_string();
            ctx.send(format!(
                "{name} waited it out! All cards in {name}'s hand are empowered!"
            ));
            ctx.flat_self_stat(10.0, Stat::HP);
            Ok(())
        })
}

pub fn do_nothing() -> Card {
    Card::new("Do Nothing.", Nature::Default)
        .emoji("⏳")
        .traits(CardTraits::HIDE_EMPOWER)
        .describe(|_| "Does nothing. Empower all cards in your hand afterwards.".to_string())
        .action(|ctx| {
            ctx.me_mut().empower_hand();
            let name = ctx.name().to_string();
            ctx.send(format!(
                "{name} did nothing. All cards in {name}'s hand are empowered."
            ));
            Ok(())
        })
}

pub fn forfeit() -> Card {
    Card::new("Forfeit", Nature::Default)
        .emoji("🎲")
        .priority(BattleConfig::FORFEIT_PRIORITY)
        .traits(CardTraits::HIDE_EMPOWER)
        .describe(|_| "Forfeits the game.".to_string())
        .action(|ctx| {
            let line = format!("{} forfeited the game!", ctx.name());
            ctx.send(line);
            let side = ctx.side();
            ctx.game_mut().sides[side].forfeited = true;
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CardContext;
    use crate::game::MoveSlot;
    use crate::messages::Channel;
    use crate::side::Side;
    use crate::test_support::duel;

    #[test]
    fn discard_recycles_offered_hand_cards() {
        let mut game = duel();
        game.start().unwrap();
        game.sides[Side::Challenger].current_draws =
            vec![MoveSlot(1), MoveSlot(4), MoveSlot::DISCARD, MoveSlot::WAIT];
        let kept = game.characters[Side::Challenger].hand[0].clone();

        CardContext::new(&mut game, Side::Challenger, discard())
            .play()
            .unwrap();

        let me = &game.characters[Side::Challenger];
        assert_eq!(me.hand.len(), 6);
        assert_eq!(me.deck.discard_pile().len(), 2);
        assert!(me.hand.iter().all(|c| c.empower_level == 1));
        assert_eq!(me.hand[0].title, kept.title);
        assert_eq!((me.stats.atk, me.stats.def, me.stats.spd), (13.0, 11.0, 11.0));

        let private = game.messages.pending(Channel::Private(Side::Challenger));
        assert_eq!(private.len(), 2);
    }

    #[test]
    fn wait_heals_after_empowering() {
        let mut game = duel();
        game.start().unwrap();
        game.characters[Side::Challenged].stats.hp = 70.0;
        CardContext::new(&mut game, Side::Challenged, wait())
            .play()
            .unwrap();
        let me = &game.characters[Side::Challenged];
        assert_eq!(me.stats.hp, 80.0);
        assert!(me.hand.iter().all(|c| c.empower_level == 1));
        let lines = game.messages.pending(Channel::Gameroom);
        assert!(lines[0].contains("waited it out!"));
    }

    #[test]
    fn forfeit_marks_the_side_and_outranks_every_card() {
        let mut game = duel();
        let card = forfeit();
        assert_eq!(card.priority, BattleConfig::FORFEIT_PRIORITY);
        assert_eq!(card.display_title(), "Forfeit");
        CardContext::new(&mut game, Side::Challenger, card)
            .play()
            .unwrap();
        assert!(game.sides[Side::Challenger].forfeited);
        assert!(game.is_defeated(Side::Challenger));
    }

    #[test]
    fn default_moves_hide_empower() {
        for card in [discard(), wait(), do_nothing(), forfeit()] {
            assert_eq!(card.nature, Nature::Default);
            assert!(card.traits.contains(CardTraits::HIDE_EMPOWER));
            assert!(!card.description().is_empty());
        }
    }
}
