//! Flamme: researches theories that rewrite the rules for both sides, and
//! reaches the Pinnacle of Humanity's Magic after four of them.

use duel_core::{
    Ability, AbilityHook, Card, CardContext, CardTraits, CharacterFlags, CharacterTemplate,
    DeckEntry, EffectContext, Nature, Pronouns, Research, Result, Stat, Stats, Theory,
    TimedEffect,
};

use super::brace_true_def;

const EMOJI: &str = "🔥";
const CARD_EMOJI: &str = "📜";
const THEORIES_FOR_PINNACLE: f64 = 4.0;
/// Ability value once the Pinnacle was granted, so it is granted only once.
const PINNACLE_GRANTED: f64 = 99.0;

pub const NAME: &str = "Flamme";

pub fn template() -> CharacterTemplate {
    CharacterTemplate::new(NAME, Stats::new(100.0, 12.0, 12.0, 0.0, 12.0, 0.0), founder())
        .emoji(EMOJI)
        .pronouns(Pronouns::FEMININE)
        .flags(CharacterFlags {
            ignore_mana_suppressed: true,
            ..CharacterFlags::default()
        })
        .signature(field_of_flowers())
        .deck(vec![
            DeckEntry::new(foundation(), 6),
            DeckEntry::new(field_of_flowers(), 2),
            DeckEntry::new(millenium_barrier(), 1),
            DeckEntry::new(thousand_year_sanctuary(), 1),
            DeckEntry::new(tree_of_life(), 1),
            DeckEntry::new(flammes_note(), 3),
            DeckEntry::new(primitive_defensive_technique(), 2),
            DeckEntry::new(theory_of_irreversibility(), 1),
            DeckEntry::new(theory_of_balance(), 1),
            DeckEntry::new(theory_of_prescience(), 1),
            DeckEntry::new(theory_of_soul(), 1),
        ])
}

fn founder() -> Ability {
    Ability::new(
        "Founder of Humanity's Magic",
        "The Foundation of Humanity's Magic gets more developed for each Theory card you play. \
         After playing 4 Theory cards, add 1 \"Pinnacle of Humanity's Magic\" to your Discard \
         pile. This character can see past the opponent's Mana Suppression.",
    )
    .with(AbilityHook::after_own_card(|ctx, card| {
        if card.traits.contains(CardTraits::THEORY) {
            ctx.flat_self_stat(1.0, Stat::Ability);
        }
        Ok(())
    }))
    .with(AbilityHook::end_of_turn(grant_pinnacle))
}

fn grant_pinnacle(ctx: &mut EffectContext<'_>) -> Result<()> {
    if ctx.self_stats().ability != THEORIES_FOR_PINNACLE {
        return Ok(());
    }
    ctx.send("Flamme is close to a major discovery...");
    let side = ctx.side();
    ctx.game_mut()
        .set_stat(side, PINNACLE_GRANTED, Stat::Ability, false);
    let line = format!(
        "*Pinnacle of Humanity's Magic* has been added to {}'s Discard pile.",
        ctx.name()
    );
    ctx.send(line);
    ctx.me_mut().deck.discard(pinnacle());
    Ok(())
}

pub fn pinnacle() -> Card {
    Card::new("Pinnacle of Humanity's Magic", Nature::Attack)
        .emoji(CARD_EMOJI)
        .effects([100.0])
        .priority(100)
        .describe(|e| format!("ATK+{0} DEF+{0} SPD+{0}. Deal {0} DMG.", e[0]))
        .action(|ctx| {
            ctx.send("The Pinnacle of Humanity's Magic is on display.");
            ctx.flat_self_stat(1.0, Stat::Ability);
            ctx.self_stat(0, Stat::ATK, 1.0);
            ctx.self_stat(0, Stat::DEF, 1.0);
            ctx.self_stat(0, Stat::SPD, 1.0);
            ctx.basic_attack(0).map(|_| ())
        })
}

/// Stands in for the page matching the number of theories played.
pub fn foundation() -> Card {
    Card::new("Foundation of Humanity's Magic", Nature::Attack)
        .emoji(CARD_EMOJI)
        .describe(|_| {
            "This card's effect changes based on how many Theory cards you have played.".into()
        })
        .conditional(|card, game, side| {
            page(game.character(side).stats.ability).with_empower(card.empower_level)
        })
}

const NO_BOOST: &[Stat] = &[];
const FIRST_PAGE: &[Stat] = &[Stat::ATK];
const SECOND_PAGE: &[Stat] = &[Stat::ATK, Stat::DEF];
const FULL_PAGE: &[Stat] = &[Stat::ATK, Stat::DEF, Stat::SPD];

fn page(theories: f64) -> Card {
    // (title, damage, stat boost, stats boosted, heals)
    let (title, damage, boost, boosted, heals) = match theories as i32 {
        i32::MIN..=0 => ("Foundation of Humanity's Magic", 5.0, 0.0, NO_BOOST, false),
        1 => ("First Page of Humanity's Magic", 7.0, 1.0, FIRST_PAGE, false),
        2 => ("Second Page of Humanity's Magic", 9.0, 2.0, SECOND_PAGE, false),
        3 => ("Third Page of Humanity's Magic", 11.0, 3.0, FULL_PAGE, false),
        _ => ("Last Page of Humanity's Magic", 13.0, 4.0, FULL_PAGE, true),
    };

    Card::new(title, Nature::Attack)
        .emoji(CARD_EMOJI)
        .effects([damage, boost])
        .describe(move |e| {
            let mut text = String::new();
            for stat in boosted {
                text.push_str(&format!("{}+{} ", stat.label(), e[1]));
            }
            if heals {
                text.push_str(&format!("Heal {}HP. ", e[1]));
            }
            text.push_str(&format!("DMG {}.", e[0]));
            text
        })
        .action(move |ctx| {
            let line = format!("{} recites a page of humanity's magic.", ctx.name());
            ctx.send(line);
            for stat in boosted {
                ctx.self_stat(1, *stat, 1.0);
            }
            if heals {
                ctx.self_stat(1, Stat::HP, 1.0);
            }
            ctx.basic_attack(0).map(|_| ())
        })
}

pub fn field_of_flowers() -> Card {
    Card::new("Incantation: Field of Flowers", Nature::Util)
        .emoji(CARD_EMOJI)
        .effects([10.0, 3.0])
        .traits(CardTraits::SIGNATURE)
        .describe(|e| {
            format!(
                "Heal {}HP. Heal {}HP at the end of each of the next 3 turns.",
                e[0], e[1]
            )
        })
        .action(|ctx| {
            let line = format!("{} conjures a field of flowers.", ctx.name());
            ctx.send(line);
            ctx.self_stat(0, Stat::HP, 1.0);
            let heal = ctx.calc_effect(1);
            ctx.self_effect(
                TimedEffect::new("Field of Flowers", 3)
                    .description(format!("HP+{heal} at turn end."))
                    .removable(true)
                    .on_end_of_turn(move |ctx| {
                        ctx.flat_self_stat(heal, Stat::HP);
                        Ok(())
                    }),
            )?;
            Ok(())
        })
}

/// Effect that keeps a research flag raised while active and lowers it on expiry.
fn research_effect(
    name: &'static str,
    turns: u32,
    flag: Research,
    heal: f64,
    description: String,
    farewell: impl Fn(&mut EffectContext<'_>) -> Result<()> + Send + Sync + 'static,
) -> TimedEffect {
    TimedEffect::new(name, turns)
        .description(description)
        .priority(-2)
        .removable(true)
        .expire_on_removal()
        .on_end_of_turn(move |ctx| {
            if heal > 0.0 {
                ctx.flat_self_stat(heal, Stat::HP);
            }
            Ok(())
        })
        .on_expire(move |ctx| {
            farewell(ctx)?;
            let side = ctx.side();
            ctx.game_mut().sides[side].research.remove(flag);
            Ok(())
        })
}

fn start_research(ctx: &mut CardContext<'_>, flag: Research) {
    let side = ctx.side();
    ctx.game_mut().sides[side].research.insert(flag);
}

fn irreversible(ctx: &EffectContext<'_>) -> bool {
    ctx.game().theories.contains(Theory::IRREVERSIBILITY)
}

pub fn millenium_barrier() -> Card {
    Card::new("Millenium Barrier", Nature::Util)
        .emoji(CARD_EMOJI)
        .effects([5.0, 5.0, 3.0])
        .hp_cost(15.0)
        .describe(|e| {
            format!(
                "DEF+{} and SPD+{} for 5 turns. If Theory of Irreversibilty is active, all \
                 opponent's stat increases are set to 0. While active, heal {}HP at each \
                 turn's end.",
                e[0], e[1], e[2]
            )
        })
        .action(|ctx| {
            ctx.send("A barrier blankets the land.");
            let def = ctx.self_stat(0, Stat::DEF, 1.0);
            let spd = ctx.self_stat(1, Stat::SPD, 1.0);
            start_research(ctx, Research::MILLENIUM_BARRIER);
            let heal = ctx.calc_effect(2);
            ctx.self_effect(research_effect(
                "Millenium Barrier",
                5,
                Research::MILLENIUM_BARRIER,
                heal,
                format!("DEF+{def}. SPD+{spd}. HP+{heal} at turn end."),
                move |ctx| {
                    if irreversible(ctx) {
                        ctx.send("The legacy of someone long gone remains unbroken.");
                    } else {
                        ctx.send("The barrier crumbles. It is yet strong enough.");
                    }
                    ctx.flat_self_stat(-def, Stat::DEF);
                    ctx.flat_self_stat(-spd, Stat::SPD);
                    Ok(())
                },
            ))?;
            Ok(())
        })
}

pub fn thousand_year_sanctuary() -> Card {
    Card::new("Thousand Year Sanctuary", Nature::Util)
        .emoji(CARD_EMOJI)
        .effects([5.0, 5.0, 3.0])
        .hp_cost(15.0)
        .describe(|e| {
            format!(
                "Opp's ATK-{} and SPD-{}. If Theory of Balance is active, the turn count stops \
                 increasing. While active, heal {}HP at each turn's end.",
                e[0], e[1], e[2]
            )
        })
        .action(|ctx| {
            let line = format!("{} raises a towering sanctuary.", ctx.name());
            ctx.send(line);
            let atk = ctx.opponent_stat(0, Stat::ATK, -1.0);
            let spd = ctx.opponent_stat(1, Stat::SPD, -1.0);
            start_research(ctx, Research::THOUSAND_YEAR_SANCTUARY);
            let heal = ctx.calc_effect(2);
            ctx.self_effect(research_effect(
                "Thousand Year Sanctuary",
                5,
                Research::THOUSAND_YEAR_SANCTUARY,
                heal,
                format!("Opp's ATK{atk}. Opp's SPD{spd}. HP+{heal} at turn end."),
                move |ctx| {
                    if irreversible(ctx) {
                        ctx.send("The sanctuary watches quietly over the land.");
                    } else {
                        ctx.send("The sanctuary collapses. It is yet strong enough.");
                    }
                    ctx.flat_opponent_stat(-atk, Stat::ATK);
                    ctx.flat_opponent_stat(-spd, Stat::SPD);
                    Ok(())
                },
            ))?;
            Ok(())
        })
}

pub fn tree_of_life() -> Card {
    Card::new("Tree of Life", Nature::Util)
        .emoji(CARD_EMOJI)
        .effects([10.0])
        .describe(|e| {
            format!(
                "Heal {} HP. For the next 7 turns, roll an additional dice during card \
                 activation phase. If Theory of Prescience is active, this roll of dice will \
                 always be 5.",
                e[0]
            )
        })
        .action(|ctx| {
            let line = format!("{} plants a sapling for someone 1000 years from now.", ctx.name());
            ctx.send(line);
            ctx.self_stat(0, Stat::HP, 1.0);
            start_research(ctx, Research::TREE_OF_LIFE);
            ctx.self_effect(research_effect(
                "Tree of Life",
                7,
                Research::TREE_OF_LIFE,
                0.0,
                "Roll an additional dice during card activation phase.".into(),
                |ctx| {
                    ctx.send("The tree stands strong and unmoving.");
                    Ok(())
                },
            ))?;
            Ok(())
        })
}

pub fn flammes_note() -> Card {
    Card::new("Flamme's Note", Nature::Util)
        .emoji(CARD_EMOJI)
        .effects([6.0, 4.0])
        .describe(|e| {
            format!(
                "HP+{}. Heal an additional {}HP if Theory of Soul is active. Discard a random \
                 card. If there is no Theory card in your deck, draw 1 card. Otherwise, add a \
                 random Theory card to your hand.",
                e[0], e[1]
            )
        })
        .action(|ctx| {
            let name = ctx.name().to_string();
            if name == NAME {
                ctx.send("Flamme formulated a theory and notes down her research.");
            } else {
                ctx.send(format!("{name} shuffles through Flamme's notes."));
            }

            let side = ctx.side();
            let hand = ctx.me().hand.len();
            if hand > 0 {
                let index = ctx.game_mut().dice().roll(hand as u32) as usize;
                ctx.game_mut().discard_card(side, index)?;
            }
            ctx.self_stat(0, Stat::HP, 1.0);
            if ctx.game().theories.contains(Theory::SOUL) {
                ctx.send("The souls offer a guidance.");
                ctx.self_stat(1, Stat::HP, 1.0);
            }

            let deck = &ctx.me().deck;
            let theories: Vec<String> = deck
                .active()
                .chain(deck.discard_pile())
                .filter(|c| c.traits.contains(CardTraits::THEORY))
                .map(|c| c.title.clone())
                .collect();
            if theories.is_empty() {
                let line = format!(
                    "It doesn't seem like {0} found anything {0} doesn't already know. {1} draws \
                    1 card.",
                    ctx.pronouns().personal,
                    name
                );
                ctx.send(line);
                return ctx.game_mut().draw_card(side);
            }

            let pick = ctx.game_mut().dice().roll(theories.len() as u32) as usize;
            let title = &theories[pick];
            if let Some(theory) = ctx.me_mut().deck.remove(title) {
                ctx.send(format!("{name} formulated the **{title}**."));
                ctx.me_mut().hand.push(theory);
            }
            Ok(())
        })
}

pub fn primitive_defensive_technique() -> Card {
    Card::new("Primitive Defensive Technique", Nature::Defense)
        .emoji(CARD_EMOJI)
        .effects([20.0])
        .priority(2)
        .describe(|e| format!("TrueDEF+{} for 1 turn.", e[0]))
        .action(|ctx| {
            let line = format!("{} quickly put up a primitive emergency barrier.", ctx.name());
            ctx.send(line);
            brace_true_def(ctx, "Primitive Defensive Technique")
        })
}

fn theory(title: &'static str, flag: Theory, rule: &'static str) -> Card {
    Card::new(title, Nature::Util)
        .emoji(CARD_EMOJI)
        .traits(CardTraits::THEORY | CardTraits::REMOVE_ON_PLAY | CardTraits::HIDE_EMPOWER)
        .describe(move |_| format!("{rule} Remove this card from the deck once it is used."))
        .action(move |ctx| {
            let name = ctx.name().to_string();
            if ctx.game().theories.contains(flag) {
                ctx.send(format!(
                    "{name} attempted to discover the {title}. But seems like it's already been \
                     discovered by someone else..."
                ));
                return Ok(());
            }
            ctx.send(format!("{name} discovered the {title}. **{rule}**"));
            let game = ctx.game_mut();
            game.theories.insert(flag);
            if flag == Theory::SOUL {
                for (_, character) in game.characters.iter_mut() {
                    character.deck.swap_piles();
                }
            }
            Ok(())
        })
}

pub fn theory_of_irreversibility() -> Card {
    theory(
        "Theory of Irreversibility",
        Theory::IRREVERSIBILITY,
        "All ATK/DEF/SPD changes for both players are halved.",
    )
}

pub fn theory_of_balance() -> Card {
    theory(
        "Theory of Balance",
        Theory::BALANCE,
        "The Empower level for all card is now equal to the Turn Count.",
    )
}

pub fn theory_of_prescience() -> Card {
    theory(
        "Theory of Prescience",
        Theory::PRESCIENCE,
        "The roll of the first 4 dices for both players for which cards are active for any \
         given turn will always be 0, 1, 2, 3.",
    )
}

pub fn theory_of_soul() -> Card {
    theory(
        "Theory of Soul",
        Theory::SOUL,
        "Both players swap their own active and discard piles.",
    )
}

#[cfg(test)]
mod tests {
    use duel_core::{Channel, PerSide, ScriptedDice, Side};

    use super::*;
    use crate::test_support::{duel_of, sandbag};

    fn flamme_duel() -> duel_core::Game {
        duel_of(template(), sandbag(), ScriptedDice::new([]))
    }

    fn said(game: &duel_core::Game, line: &str) -> bool {
        game.messages
            .pending(Channel::Gameroom)
            .iter()
            .any(|l| l == line)
    }

    #[test]
    fn foundation_turns_the_page_per_theory() {
        let mut game = flamme_duel();
        let card = foundation().with_empower(3);
        assert_eq!(
            card.resolve_conditional(&game, Side::Challenger).title,
            "Foundation of Humanity's Magic"
        );

        game.character_mut(Side::Challenger).stats.ability = 2.0;
        let resolved = card.resolve_conditional(&game, Side::Challenger);
        assert_eq!(resolved.title, "Second Page of Humanity's Magic");
        assert_eq!(resolved.empower_level, 3);
        assert!(!resolved.has_conditional());

        game.character_mut(Side::Challenger).stats.ability = PINNACLE_GRANTED;
        assert_eq!(
            card.resolve_conditional(&game, Side::Challenger).title,
            "Last Page of Humanity's Magic"
        );
    }

    #[test]
    fn theories_are_discovered_once() {
        let mut game = flamme_duel();
        CardContext::new(&mut game, Side::Challenger, theory_of_irreversibility())
            .play()
            .unwrap();
        assert!(game.theories.contains(Theory::IRREVERSIBILITY));

        CardContext::new(&mut game, Side::Challenged, theory_of_irreversibility())
            .play()
            .unwrap();
        assert!(said(
            &game,
            "Sandbag attempted to discover the Theory of Irreversibility. But seems like it's \
             already been discovered by someone else..."
        ));
    }

    #[test]
    fn soul_swaps_both_sides_piles() {
        let mut game = flamme_duel();
        game.start().unwrap();
        let active = game.character(Side::Challenger).deck.active().count();
        CardContext::new(&mut game, Side::Challenger, theory_of_soul())
            .play()
            .unwrap();
        let deck = &game.character(Side::Challenger).deck;
        assert_eq!(deck.active().count(), 0);
        assert_eq!(deck.discard_pile().len(), active);
        assert_eq!(game.character(Side::Challenged).deck.active().count(), 0);
    }

    #[test]
    fn fourth_theory_grants_the_pinnacle_once() {
        let mut game = flamme_duel();
        game.character_mut(Side::Challenger).stats.ability = 3.0;
        let moves = PerSide::new(Some(theory_of_prescience()), None);
        let order = game.resolve_moves(&moves).unwrap();
        assert_eq!(game.character(Side::Challenger).stats.ability, 4.0);

        game.end_turn(order, &moves).unwrap();
        let flamme = game.character(Side::Challenger);
        assert_eq!(flamme.stats.ability, PINNACLE_GRANTED);
        assert_eq!(
            flamme.deck.discard_pile().last().map(|c| c.title.as_str()),
            Some("Pinnacle of Humanity's Magic")
        );

        game.end_turn(order, &moves).unwrap();
        assert_eq!(game.character(Side::Challenger).deck.discard_pile().len(), 1);
    }

    #[test]
    fn millenium_barrier_blocks_gains_under_irreversibility() {
        let mut game = flamme_duel();
        CardContext::new(&mut game, Side::Challenger, millenium_barrier())
            .play()
            .unwrap();
        assert_eq!(game.character(Side::Challenger).stats.def, 17.0);
        assert!(game.sides[Side::Challenger].research.contains(Research::MILLENIUM_BARRIER));

        game.theories |= Theory::IRREVERSIBILITY;
        game.adjust_stat(Side::Challenged, 10.0, Stat::ATK);
        assert_eq!(game.character(Side::Challenged).stats.atk, 12.0);

        game.remove_removable_effects(Side::Challenger).unwrap();
        assert!(game.sides[Side::Challenger].research.is_empty());
        assert!(said(&game, "The legacy of someone long gone remains unbroken."));
        // The refund is halved as well.
        assert_eq!(game.character(Side::Challenger).stats.def, 14.5);
    }

    #[test]
    fn note_pulls_a_theory_into_hand() {
        let mut game = flamme_duel();
        CardContext::new(&mut game, Side::Challenger, flammes_note())
            .play()
            .unwrap();
        let flamme = game.character(Side::Challenger);
        assert_eq!(flamme.hand.len(), 1);
        assert!(flamme.hand[0].traits.contains(CardTraits::THEORY));
        assert_eq!(flamme.deck.len(), 19);
    }
}
