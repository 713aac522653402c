//! Übel: reckless slashes that may whiff, speed stances and borrowed moves.

use duel_core::{
    Ability, AbilityHook, Card, CardContext, CardTraits, CharacterTemplate, DeckEntry,
    EffectContext, Nature, Pronouns, Result, Stat, Stats, TimedEffect,
};

use super::{brace_true_def, has_effect};

const EMOJI: &str = "✂️";
/// Rushdown and Slow Down replace each other.
const SPEED_GROUP: &str = "ubel_speed";
/// Empathy copies nothing before this turn.
const EMPATHY_TURN: u32 = 5;
/// Sorganeil fails when the target is at least this much faster.
const SORGANEIL_SPEED_GAP: f64 = 35.0;

pub const NAME: &str = "Übel";

pub fn template() -> CharacterTemplate {
    CharacterTemplate::new(NAME, Stats::new(100.0, 13.0, 10.0, 0.0, 30.0, 0.0), reckless())
        .emoji("🗡️")
        .pronouns(Pronouns::FEMININE)
        .signature(malevolent_shrine())
        .deck(vec![
            DeckEntry::new(shallow_slash(), 3),
            DeckEntry::new(cleave(), 2),
            DeckEntry::new(dismantle(), 2),
            DeckEntry::new(malevolent_shrine(), 1),
            DeckEntry::new(rushdown(), 2),
            DeckEntry::new(defend(), 2),
            DeckEntry::new(slow_down(), 2),
            DeckEntry::new(sorganeil(), 1),
            DeckEntry::new(empathy(), 1),
        ])
}

fn reckless() -> Ability {
    Ability::new(
        "Reckless",
        "Slash attacks may miss unless the opponent attacked first this turn. \
         A missed slash raises ATK and SPD instead.",
    )
    .with(AbilityHook::own_card_wrapper(reckless_slash))
}

/// Rolls the slash failure chance, then resolves the card.
fn reckless_slash(ctx: &mut CardContext<'_>) -> Result<()> {
    let borrowed = ctx.card().traits.contains(CardTraits::EMPATHIZED);
    let Some(rate) = ctx.card().failure_rate.filter(|_| !borrowed) else {
        return ctx.play();
    };

    let misses = if has_effect(ctx, "Rushdown") || has_effect(ctx, "Sorganeil") {
        false
    } else if has_effect(ctx, "Recompose") {
        true
    } else if ctx.opponent().flags.attacked_this_turn {
        false
    } else {
        ctx.roll_d100() <= rate
    };

    if misses {
        let side = ctx.side();
        ctx.game_mut().sides[side].attack_missed = true;
    }
    ctx.play()?;
    if misses {
        let bonus = ctx.calc_effect(1);
        ctx.flat_self_stat(bonus, Stat::ATK);
        ctx.flat_self_stat(bonus, Stat::SPD);
    }
    Ok(())
}

fn slash(title: &'static str, effects: [f64; 2], failure: u32, hp_cost: f64) -> Card {
    Card::new(title, Nature::Attack)
        .emoji(EMOJI)
        .effects(effects)
        .failure_rate(failure)
        .hp_cost(hp_cost)
        .describe(move |e| {
            format!(
                "DMG {}. If used by Übel, has a {failure}% chance of missing if the opponent \
                 didn't use an Attack card before this move is used. If the attack misses, \
                 ATK+{}, SPD+{}.",
                e[0], e[1], e[1]
            )
        })
}

pub fn shallow_slash() -> Card {
    slash("Shallow Slash", [8.0, 2.0], 20, 4.0).action(|ctx| {
        let line = format!("{} slashed at {}!", ctx.name(), ctx.opponent_name());
        ctx.send(line);
        ctx.basic_attack(0).map(|_| ())
    })
}

pub fn cleave() -> Card {
    slash("Cleave", [12.0, 3.0], 40, 6.0).action(|ctx| {
        ctx.send("A brutal slash!");
        ctx.basic_attack(0).map(|_| ())
    })
}

pub fn dismantle() -> Card {
    slash("Dismantle", [16.0, 4.0], 60, 8.0).action(|ctx| {
        let line = format!(
            "{} tries to cut {} into pieces!",
            ctx.name(),
            ctx.opponent_name()
        );
        ctx.send(line);
        ctx.basic_attack(0).map(|_| ())
    })
}

pub fn malevolent_shrine() -> Card {
    Card::new("Malevolent Shrine", Nature::Attack)
        .emoji(EMOJI)
        .effects([6.0])
        .hp_cost(10.0)
        .traits(CardTraits::SIGNATURE)
        .describe(|e| format!("Slash three times for DMG {} each.", e[0]))
        .action(|ctx| {
            let line = format!("{} carves the space around {}.", ctx.name(), ctx.opponent_name());
            ctx.send(line);
            for _ in 0..3 {
                ctx.basic_attack(0)?;
                if ctx.game().is_defeated(ctx.opponent_side()) {
                    break;
                }
            }
            Ok(())
        })
}

pub fn rushdown() -> Card {
    Card::new("Rushdown", Nature::Util)
        .emoji(EMOJI)
        .effects([10.0])
        .describe(|e| {
            format!(
                "Increases SPD by {} for 4 turns. Attacks will not miss during this period. \
                 At the end of every turn, HP-2.",
                e[0]
            )
        })
        .action(|ctx| {
            let line = format!("{} rushes towards the enemy!", ctx.name());
            ctx.send(line);
            let spd = ctx.calc_effect(0);
            ctx.flat_self_stat(spd, Stat::SPD);
            ctx.self_effect(
                TimedEffect::new("Rushdown", 4)
                    .description(format!(
                        "Increases SPD by {spd} for 4 turns. Attacks will not miss."
                    ))
                    .exclusive(SPEED_GROUP)
                    .removable(true)
                    .expire_on_removal()
                    .on_end_of_turn(|ctx| {
                        let line = format!("{} is being reckless.", ctx.name());
                        ctx.send(line);
                        ctx.flat_self_stat(-2.0, Stat::HP);
                        Ok(())
                    })
                    .on_expire(move |ctx| {
                        let line = format!("{} retreats.", ctx.name());
                        ctx.send(line);
                        ctx.flat_self_stat(-spd, Stat::SPD);
                        Ok(())
                    })
                    .on_replaced(move |ctx| {
                        ctx.flat_self_stat(-spd, Stat::SPD);
                        Ok(())
                    }),
            )?;
            Ok(())
        })
}

pub fn slow_down() -> Card {
    Card::new("Slow Down", Nature::Util)
        .emoji(EMOJI)
        .effects([5.0, 10.0, 5.0])
        .describe(|e| {
            format!(
                "SPD-10 and DEF+{} for 2 turns. Heal {}HP, then {} HP at the end of each \
                 turn. Attacks will not hit while this effect is active.",
                e[0], e[1], e[2]
            )
        })
        .action(|ctx| {
            let line = format!(
                "{} takes cover to ponder the fleeting nature of {} life.",
                ctx.name(),
                ctx.pronouns().possessive
            );
            ctx.send(line);
            ctx.flat_self_stat(-10.0, Stat::SPD);
            let def = ctx.self_stat(0, Stat::DEF, 1.0);
            ctx.self_stat(1, Stat::HP, 1.0);
            let heal = ctx.calc_effect(2);

            let restore = move |ctx: &mut EffectContext<'_>| {
                ctx.flat_self_stat(10.0, Stat::SPD);
                ctx.flat_self_stat(-def, Stat::DEF);
            };
            ctx.self_effect(
                TimedEffect::new("Recompose", 2)
                    .description(format!(
                        "Decreases SPD by 10 for 2 turns. Attacks will not hit. Heal {heal} at \
                        turn end."
                    ))
                    .exclusive(SPEED_GROUP)
                    .expire_on_removal()
                    .on_end_of_turn(move |ctx| {
                        let line = format!("{} took a break and recoups.", ctx.name());
                        ctx.send(line);
                        ctx.flat_self_stat(heal, Stat::HP);
                        Ok(())
                    })
                    .on_expire(move |ctx| {
                        let line = format!(
                            "{} has recomposed {}.",
                            ctx.name(),
                            ctx.pronouns().reflexive
                        );
                        ctx.send(line);
                        restore(ctx);
                        Ok(())
                    })
                    .on_replaced(move |ctx| {
                        restore(ctx);
                        Ok(())
                    }),
            )?;
            Ok(())
        })
}

pub fn defend() -> Card {
    Card::new("Defend", Nature::Defense)
        .emoji(EMOJI)
        .effects([20.0])
        .priority(2)
        .describe(|e| format!("Increases TrueDEF by {} until the end of the turn.", e[0]))
        .action(|ctx| {
            let line = format!("{} prepares to defend against an incoming attack!", ctx.name());
            ctx.send(line);
            brace_true_def(ctx, "Defend")
        })
}

pub fn sorganeil() -> Card {
    Card::new("Sorganeil", Nature::Util)
        .emoji(EMOJI)
        .priority(-2)
        .describe(|_| {
            format!(
                "Will fail if the opponent's SPD is higher than your SPD by {SORGANEIL_SPEED_GAP} \
                 or more. Set opponent's SPD to 1. Clear opponent's timed effects. Opponent can \
                 only use default actions next turn. Attacks will hit with 100% certainty."
            )
        })
        .action(|ctx| {
            let name = ctx.name().to_string();
            let opponent = ctx.opponent_name().to_string();
            if ctx.opponent_stats().spd - ctx.self_stats().spd >= SORGANEIL_SPEED_GAP {
                ctx.send(format!("{name}'s gaze cannot keep up with {opponent}'s speed!"));
                return Ok(());
            }

            ctx.opponent_mut().skip_turn = true;
            let possessive = ctx.pronouns().possessive;
            ctx.send(format!("{name} traps {opponent} in {possessive} gaze!"));

            let target = ctx.opponent_side();
            ctx.game_mut().remove_removable_effects(target)?;
            let slowed = ctx.opponent_stats().spd - 1.0;
            ctx.flat_opponent_stat(-slowed, Stat::SPD);

            ctx.self_effect(
                TimedEffect::new("Sorganeil", 2)
                    .description("Cannot miss next turn's attack")
                    .priority(-1)
                    .on_expire(move |ctx| {
                        let line = format!(
                            "{name} averted {possessive} gaze. {opponent} got free from {name}'s \
                            Sorganeil."
                        );
                        ctx.send(line);
                        ctx.flat_opponent_stat(slowed, Stat::SPD);
                        Ok(())
                    }),
            )?;
            Ok(())
        })
}

/// Stand-in for Empathy before it has had time to work.
fn stalking() -> Card {
    Card::new("Stalking", Nature::Default)
        .emoji(EMOJI)
        .traits(CardTraits::EMPATHIZED | CardTraits::HIDE_EMPOWER)
        .describe(|_| "Not enough time to empathize. This move will fail.".to_string())
        .action(|ctx| {
            let line = format!(
                "{} didn't get enough time to know {} well enough!",
                ctx.name(),
                ctx.opponent_name()
            );
            ctx.send(line);
            Ok(())
        })
}

pub fn empathy() -> Card {
    Card::new("Empathy", Nature::Util)
        .emoji(EMOJI)
        .describe(|_| {
            format!(
                "Will fail if used before turn {EMPATHY_TURN}. Use the opponent's signature \
                 move at this card's empower level -2."
            )
        })
        .conditional(|original, game, side| {
            let signature = &game.character(side.other()).signature;
            match signature {
                Some(signature) if game.turn_count >= EMPATHY_TURN => signature
                    .clone()
                    .with_empower(original.empower_level - 2)
                    .traits(CardTraits::EMPATHIZED),
                _ => stalking(),
            }
        })
}
