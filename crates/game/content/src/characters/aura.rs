//! Aura the Guillotine: commands an undead army and weighs souls on her scales.

use duel_core::{
    Ability, AbilityHook, Card, CardContext, CardTraits, Character, CharacterTemplate, DeckEntry,
    EffectContext, HookKind, Nature, Pronouns, Result, Stat, Stats, TimedEffect, round2,
};

const EMOJI: &str = "⚖️";
const CARD_EMOJI: &str = "🪦";

const SWORDSMEN: &str = "swordsmen";
const SHIELDBEARERS: &str = "shieldbearers";
const ARCHERS: &str = "archers";
const ROT_DAMAGE: &str = "rot_damage";
const RETREATING: &str = "retreating";
const LOYALTY_COUNTERED: &str = "loyalty_countered";

/// Stat each platoon lends while it serves.
const PLATOON_BOOST: f64 = 2.0;
/// Share of incoming move damage the army absorbs.
const ARMY_ABSORPTION: f64 = 0.5;
const SUMMON_STRENGTH: f64 = 10.0;
const SACRIFICE_STRENGTH: f64 = 30.0;
/// HP gap that decides the scales.
const SCALES_THRESHOLD: f64 = 50.0;

pub const NAME: &str = "Aura";

pub fn template() -> CharacterTemplate {
    CharacterTemplate::new(NAME, Stats::new(100.0, 10.0, 10.0, 0.0, 10.0, 0.0), army_of_the_dead())
        .emoji(EMOJI)
        .pronouns(Pronouns::FEMININE)
        .signature(auserlese())
        .deck(vec![
            DeckEntry::new(rusted_blades(), 2),
            DeckEntry::new(weathered_shields(), 2),
            DeckEntry::new(broken_arrows(), 2),
            DeckEntry::new(fallen_empire(), 1),
            DeckEntry::new(retreat(), 2),
            DeckEntry::new(rot(), 2),
            DeckEntry::new(loyalty(), 1),
            DeckEntry::new(decapitate(), 1),
            DeckEntry::new(stolen_valor(), 1),
            DeckEntry::new(heartbreaker(), 1),
            DeckEntry::new(auserlese(), 1),
        ])
}

fn army_of_the_dead() -> Ability {
    Ability::new(
        "Army of the Dead",
        format!(
            "Army Strength is tracked by this character's Ability. While any platoon serves, \
             the army absorbs {:.0}% of incoming DMG and loses that much Army Strength; at 0 \
             Army Strength the army is routed. At each turn end, every Swordsmen platoon \
             strikes for 2 DMG and every Archers platoon for 1 DMG.",
            ARMY_ABSORPTION * 100.0
        ),
    )
    .with(AbilityHook::defend(shield_wall))
    .with(AbilityHook::end_of_turn(march))
}

fn platoons(character: &Character) -> f64 {
    [SWORDSMEN, SHIELDBEARERS, ARCHERS]
        .iter()
        .map(|key| character.counter(key))
        .sum()
}

fn shield_wall(ctx: &mut EffectContext<'_>, damage: f64) -> Result<()> {
    if platoons(ctx.me()) <= 0.0 {
        ctx.me_mut().flags.defense_damage_reduction = 0.0;
        return Ok(());
    }
    let absorption = if ctx.me().counter(RETREATING) > 0.0 {
        1.0
    } else {
        ARMY_ABSORPTION
    };
    ctx.me_mut().flags.defense_damage_reduction = absorption;

    let strength = (ctx.self_stats().ability - round2(damage * absorption)).max(0.0);
    let side = ctx.side();
    ctx.game_mut().set_stat(side, strength, Stat::Ability, false);
    if strength <= 0.0 {
        let line = format!("{}'s army is routed!", ctx.name());
        ctx.send(line);
        disband(ctx, SWORDSMEN, Stat::ATK);
        disband(ctx, SHIELDBEARERS, Stat::DEF);
        disband(ctx, ARCHERS, Stat::SPD);
    }
    Ok(())
}

fn march(ctx: &mut EffectContext<'_>) -> Result<()> {
    let me = ctx.me();
    let (swordsmen, archers) = (me.counter(SWORDSMEN), me.counter(ARCHERS));
    let damage = swordsmen * 2.0 + archers + (swordsmen + archers) * me.counter(ROT_DAMAGE);
    if damage <= 0.0 {
        return Ok(());
    }
    let line = format!("{}'s army marches on {}.", ctx.name(), ctx.opponent_name());
    ctx.send(line);
    ctx.timed_attack(damage)?;
    Ok(())
}

/// Removes every platoon under `key` along with the stat it lent. Returns the platoon count.
fn disband(ctx: &mut EffectContext<'_>, key: &'static str, stat: Stat) -> f64 {
    let count = ctx.me().counter(key);
    if count > 0.0 {
        ctx.flat_self_stat(-count * PLATOON_BOOST, stat);
        ctx.me_mut().set_counter(key, 0.0);
    }
    count
}

fn army_strength(ctx: &mut EffectContext<'_>, delta: f64) {
    let current = ctx.self_stats().ability;
    let side = ctx.side();
    ctx.game_mut()
        .set_stat(side, (current + delta).max(0.0), Stat::Ability, false);
}

fn summon(ctx: &mut CardContext<'_>, platoon: &'static str, stat: Stat) {
    ctx.me_mut().add_counter(platoon, 1.0);
    ctx.self_stat(0, stat, 1.0);
}

fn summon_card(title: &'static str, platoon: &'static str, stat: Stat) -> Card {
    Card::new(title, Nature::Util)
        .emoji(CARD_EMOJI)
        .effects([PLATOON_BOOST])
        .hp_cost(2.0)
        .describe(move |e| {
            format!(
                "{}+{}. Army Strength+{SUMMON_STRENGTH}. Summon 1 {} platoon.",
                stat.label(),
                e[0],
                platoon
            )
        })
        .action(move |ctx| {
            let line = format!("{} called forth a {platoon} platoon.", ctx.name());
            ctx.send(line);
            summon(ctx, platoon, stat);
            army_strength(ctx, SUMMON_STRENGTH);
            Ok(())
        })
}

pub fn rusted_blades() -> Card {
    summon_card("Rusted Blades", SWORDSMEN, Stat::ATK)
}

pub fn weathered_shields() -> Card {
    summon_card("Weathered Shields", SHIELDBEARERS, Stat::DEF)
}

pub fn broken_arrows() -> Card {
    summon_card("Broken Arrows", ARCHERS, Stat::SPD)
}

pub fn fallen_empire() -> Card {
    Card::new("Fallen Empire", Nature::Util)
        .emoji(CARD_EMOJI)
        .effects([PLATOON_BOOST])
        .hp_cost(10.0)
        .describe(|e| {
            format!(
                "ATK+{0} DEF+{0} SPD+{0}. Army Strength+{1}. Summons 1 Swordsmen, 1 \
                 Shieldbearer and 1 Archer platoon.",
                e[0],
                SUMMON_STRENGTH * 3.0
            )
        })
        .action(|ctx| {
            let line = format!("Before {} stands an army rivaling that of an empire.", ctx.name());
            ctx.send(line);
            summon(ctx, SWORDSMEN, Stat::ATK);
            summon(ctx, SHIELDBEARERS, Stat::DEF);
            summon(ctx, ARCHERS, Stat::SPD);
            army_strength(ctx, SUMMON_STRENGTH * 3.0);
            Ok(())
        })
}

pub fn retreat() -> Card {
    Card::new("Retreat", Nature::Defense)
        .emoji(CARD_EMOJI)
        .priority(2)
        .traits(CardTraits::HIDE_EMPOWER)
        .describe(|_| {
            "Until the end of the turn, halve ATK. All damage taken that turn will be taken by \
             the Army instead. This move fails if you have no army."
                .into()
        })
        .action(|ctx| {
            let possessive = ctx.pronouns().possessive;
            let line = format!(
                "{} commanded the army to protect {possessive} retreat.",
                ctx.name()
            );
            ctx.send(line);
            if platoons(ctx.me()) <= 0.0 {
                ctx.send(format!("But there is no army to protect {possessive}."));
                return Ok(());
            }

            ctx.me_mut().set_counter(RETREATING, 1.0);
            let halved = round2(ctx.self_stats().atk / 2.0);
            ctx.flat_self_stat(-halved, Stat::ATK);
            ctx.self_effect(
                TimedEffect::new("Retreat", 1)
                    .description(
                        "Halve ATK. All damage taken this turn will be taken by the Army instead.",
                    )
                    .priority(-1)
                    .on_expire(move |ctx| {
                        let line = format!("{} returned from hiding.", ctx.name());
                        ctx.send(line);
                        ctx.me_mut().set_counter(RETREATING, 0.0);
                        ctx.flat_self_stat(halved, Stat::ATK);
                        Ok(())
                    }),
            )?;
            Ok(())
        })
}

/// HP lost at each turn end while Rot or Loyalty is active.
const UPKEEP: f64 = 3.0;

fn upkeep(ctx: &mut EffectContext<'_>) {
    let line = format!("{} expenses {} mana...", ctx.name(), ctx.pronouns().possessive);
    ctx.send(line);
    ctx.flat_self_stat(-UPKEEP, Stat::HP);
}

pub fn rot() -> Card {
    Card::new("Rot", Nature::Util)
        .emoji(CARD_EMOJI)
        .effects([2.0, 1.0])
        .describe(|e| {
            format!(
                "For the next 3 turns, ATK+{0} and SPD+{0}. Each hit by Swordsmen and Archers \
                 platoon deal an additional {1} flat damage. At each turn end, HP-3.",
                e[0], e[1]
            )
        })
        .action(|ctx| {
            let line = format!("{}'s army strikes with poisoned blades.", ctx.name());
            ctx.send(line);
            let stat = ctx.self_stat(0, Stat::ATK, 1.0);
            ctx.flat_self_stat(stat, Stat::SPD);
            let damage = ctx.calc_effect(1);
            ctx.me_mut().set_counter(ROT_DAMAGE, damage);

            ctx.self_effect(
                TimedEffect::new("Rot over Open Wound", 3)
                    .description(format!(
                        "ATK+{stat}. SPD+{stat}. Each Swordsmen and Archer attacks deal {damage} \
                        flat damage."
                    ))
                    .priority(-1)
                    .expire_on_removal()
                    .on_end_of_turn(|ctx| {
                        upkeep(ctx);
                        Ok(())
                    })
                    .on_expire(move |ctx| {
                        ctx.send("The wounds scab over.");
                        ctx.flat_self_stat(-stat, Stat::ATK);
                        ctx.flat_self_stat(-stat, Stat::SPD);
                        ctx.me_mut().set_counter(ROT_DAMAGE, 0.0);
                        Ok(())
                    }),
            )?;
            Ok(())
        })
}

pub fn loyalty() -> Card {
    Card::new("Loyalty", Nature::Util)
        .emoji(CARD_EMOJI)
        .effects([3.0, 4.0, 1.0])
        .describe(|e| {
            format!(
                "For the next 3 turns, DEF+{}. Once per turn, if hit, counter attack for {} + \
                 {}x #Shieldbearers. At each turn end, HP-3.",
                e[0], e[1], e[2]
            )
        })
        .action(|ctx| {
            let line = format!("{}'s army stands in formation.", ctx.name());
            ctx.send(line);
            let def = ctx.self_stat(0, Stat::DEF, 1.0);
            let (base, per_shield) = (ctx.calc_effect(1), ctx.calc_effect(2));
            ctx.me_mut().set_counter(LOYALTY_COUNTERED, 0.0);
            ctx.me_mut()
                .ability
                .install(AbilityHook::counter(move |ctx, _damage| {
                    if ctx.me().counter(LOYALTY_COUNTERED) > 0.0 {
                        return Ok(());
                    }
                    let line = format!("{}'s army countered the attack.", ctx.name());
                    ctx.send(line);
                    let damage = base + ctx.me().counter(SHIELDBEARERS) * per_shield;
                    ctx.me_mut().set_counter(LOYALTY_COUNTERED, 1.0);
                    ctx.flat_attack(damage)?;
                    Ok(())
                }));

            ctx.self_effect(
                TimedEffect::new("Loyalty", 3)
                    .description(format!(
                        "DEF+{def}. Once per turn, if hit, counter attack for {base} + \
                        {per_shield}x #Shieldbearers."
                    ))
                    .priority(-1)
                    .expire_on_removal()
                    .on_end_of_turn(|ctx| {
                        upkeep(ctx);
                        ctx.me_mut().set_counter(LOYALTY_COUNTERED, 0.0);
                        Ok(())
                    })
                    .on_expire(move |ctx| {
                        ctx.send("The army falls apart.");
                        ctx.flat_self_stat(-def, Stat::DEF);
                        ctx.me_mut().ability.clear(HookKind::Counter);
                        Ok(())
                    }),
            )?;
            Ok(())
        })
}

/// Sacrifices every platoon of one kind for a bigger move.
fn sacrifice(ctx: &mut CardContext<'_>, platoon: &'static str) -> f64 {
    let count = ctx.me().counter(platoon);
    let spent = ctx.self_stats().ability.min(SACRIFICE_STRENGTH);
    army_strength(ctx, -spent);
    count
}

pub fn decapitate() -> Card {
    Card::new("Decapitate", Nature::Attack)
        .emoji(CARD_EMOJI)
        .effects([14.0, 2.0])
        .hp_cost(8.0)
        .describe(|e| {
            format!(
                "Army Strength -30. DMG {} + {}x #Swordsmen. Remove all Swordsmen afterwards.",
                e[0], e[1]
            )
        })
        .action(|ctx| {
            let swordsmen = sacrifice(ctx, SWORDSMEN);
            let damage = ctx.calc_effect(0) + swordsmen * ctx.calc_effect(1);
            let line = format!("{} heaved {} blade.", ctx.name(), ctx.pronouns().possessive);
            ctx.send(line);
            ctx.flat_attack(damage)?;
            disband(ctx, SWORDSMEN, Stat::ATK);
            Ok(())
        })
}

pub fn stolen_valor() -> Card {
    Card::new("Stolen Valor", Nature::Util)
        .emoji(CARD_EMOJI)
        .effects([10.0, 2.0])
        .describe(|e| {
            format!(
                "Army Strength -30. Heal {}HP + {}x #Shieldsbearer. Remove all Shieldsbearer \
                afterwards.",
                e[0], e[1]
            )
        })
        .action(|ctx| {
            let shieldbearers = sacrifice(ctx, SHIELDBEARERS);
            let heal = ctx.calc_effect(0) + shieldbearers * ctx.calc_effect(1);
            let line = format!(
                "{} absorbed what remains of {} army's lifeforce.",
                ctx.name(),
                ctx.pronouns().possessive
            );
            ctx.send(line);
            ctx.flat_self_stat(heal, Stat::HP);
            disband(ctx, SHIELDBEARERS, Stat::DEF);
            Ok(())
        })
}

pub fn heartbreaker() -> Card {
    Card::new("Heartbreaker", Nature::Attack)
        .emoji(CARD_EMOJI)
        .effects([7.0, 2.0])
        .hp_cost(8.0)
        .describe(|e| {
            format!(
                "Army Strength -30. DMG {} + {}x #Archers with 50% Pierce. Remove all Archers \
                afterwards.",
                e[0], e[1]
            )
        })
        .action(|ctx| {
            let archers = sacrifice(ctx, ARCHERS);
            let damage = ctx.calc_effect(0) + archers * ctx.calc_effect(1);
            let line = format!("{} aims for the heart.", ctx.name());
            ctx.send(line);
            ctx.flat_attack_piercing(damage, 0.5)?;
            disband(ctx, ARCHERS, Stat::SPD);
            Ok(())
        })
}

pub fn auserlese() -> Card {
    Card::new("Scales of Obedience - Auserlese", Nature::Util)
        .emoji(CARD_EMOJI)
        .priority(13)
        .traits(CardTraits::SIGNATURE | CardTraits::HIDE_EMPOWER)
        .describe(|_| {
            format!(
                "Roll a D100. If the result of the role > Opp's HP - Your HP, HP-10, use your \
                 opponent's move as if it's your own. At this turn's end, if Your HP - Opp's HP \
                 >= {SCALES_THRESHOLD}, you win, and if Opp's HP - Your HP >= {SCALES_THRESHOLD}, \
                 you lose."
            )
        })
        .action(|ctx| {
            let line = format!("{} tried to manipulate the opponent's aims.", ctx.name());
            ctx.send(line);

            let roll = ctx.roll_d100();
            let gap = ctx.opponent_stats().hp - ctx.self_stats().hp;
            ctx.send(format!("## **HP diff**: {gap}"));
            ctx.send(format!("# Roll: {roll}"));

            let target = ctx.opponent_side();
            if f64::from(roll) > gap {
                let line = format!("{} forced a misdirection!", ctx.name());
                ctx.send(line);
                ctx.game_mut().sides[target].context_reversed = true;
                ctx.flat_self_stat(-10.0, Stat::HP);
            } else {
                ctx.send("The incantation was not strong enough.");
            }

            ctx.self_effect(
                TimedEffect::new("Scales of Obedience - Auserlese", 1)
                    .description(format!(
                        "If Your HP - Opp's HP >= {SCALES_THRESHOLD}, you win, and if Opp's HP - \
                        Your HP >= {SCALES_THRESHOLD}, you lose."
                    ))
                    .priority(-13)
                    .on_expire(weigh_souls),
            )?;
            Ok(())
        })
}

fn weigh_souls(ctx: &mut EffectContext<'_>) -> Result<()> {
    let (side, target) = (ctx.side(), ctx.opponent_side());
    ctx.game_mut().sides[target].context_reversed = false;

    ctx.send("The scale measures the oppositions' mana...");
    let gap = ctx.opponent_stats().hp - ctx.self_stats().hp;
    ctx.send(format!("## **HP diff**: {gap}"));

    if gap <= -SCALES_THRESHOLD {
        let line = format!("{} fell into {}'s control!", ctx.opponent_name(), ctx.name());
        ctx.send(line);
        ctx.game_mut().sides[target].forfeited = true;
    } else if gap >= SCALES_THRESHOLD {
        let line = format!("{} is shaken with fear...", ctx.name());
        ctx.send(line);
        ctx.game_mut().sides[side].forfeited = true;
    } else {
        ctx.send("The scale doesn't tip in any meaningful direction...");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use duel_core::{AttackRequest, PerSide, ScriptedDice, Side};

    use super::*;
    use crate::characters::denken;
    use crate::test_support::{duel_of, sandbag};

    const AURA: Side = Side::Challenger;
    const FOE: Side = Side::Challenged;

    fn aura_duel(rolls: impl IntoIterator<Item = u32>) -> duel_core::Game {
        duel_of(template(), sandbag(), ScriptedDice::new(rolls))
    }

    fn play(game: &mut duel_core::Game, card: Card) {
        CardContext::new(game, AURA, card).play().unwrap();
    }

    #[test]
    fn decapitate_spends_the_swordsmen() {
        let mut game = aura_duel([]);
        play(&mut game, rusted_blades());
        play(&mut game, rusted_blades());
        let aura = game.character(AURA);
        assert_eq!(aura.counter(SWORDSMEN), 2.0);
        assert_eq!(aura.stats.atk, 14.0);
        assert_eq!(aura.stats.ability, 20.0);

        play(&mut game, decapitate());
        // 14 + 2 * 2 move damage, ATK 14 against DEF 10.
        assert_eq!(game.character(FOE).stats.hp, 78.0);
        let aura = game.character(AURA);
        assert_eq!(aura.counter(SWORDSMEN), 0.0);
        assert_eq!(aura.stats.atk, 10.0);
        assert_eq!(aura.stats.ability, 0.0);
    }

    #[test]
    fn retreat_fails_without_an_army() {
        let mut game = aura_duel([]);
        play(&mut game, retreat());
        assert_eq!(game.character(AURA).stats.atk, 10.0);
        assert!(game.character(AURA).timed_effects.is_empty());
    }

    #[test]
    fn army_absorbs_damage_and_retreat_absorbs_all() {
        let mut game = aura_duel([]);
        play(&mut game, fallen_empire());
        play(&mut game, retreat());
        assert_eq!(game.character(AURA).stats.atk, 6.0);

        game.attack(AttackRequest::direct(FOE, 10.0)).unwrap();
        assert_eq!(game.character(AURA).stats.hp, 100.0);
        assert_eq!(game.character(AURA).stats.ability, 20.0);

        game.resolve_timed_effects([AURA, FOE]).unwrap();
        assert_eq!(game.character(AURA).stats.atk, 12.0);

        // max(1, 10 + 12 - 12) halved by the army.
        game.attack(AttackRequest::direct(FOE, 10.0)).unwrap();
        assert_eq!(game.character(AURA).stats.hp, 95.0);
        assert_eq!(game.character(AURA).stats.ability, 15.0);
    }

    #[test]
    fn routed_army_returns_its_stats() {
        let mut game = aura_duel([]);
        play(&mut game, weathered_shields());
        assert_eq!(game.character(AURA).stats.def, 12.0);
        game.attack(AttackRequest::direct(FOE, 30.0)).unwrap();
        let aura = game.character(AURA);
        assert_eq!(aura.stats.ability, 0.0);
        assert_eq!(aura.counter(SHIELDBEARERS), 0.0);
        assert_eq!(aura.stats.def, 10.0);
    }

    #[test]
    fn loyalty_counters_once_per_turn_until_it_expires() {
        let mut game = aura_duel([]);
        play(&mut game, fallen_empire());
        play(&mut game, loyalty());
        assert!(game.character(AURA).ability.has(HookKind::Counter));

        game.attack(AttackRequest::direct(FOE, 10.0)).unwrap();
        // Counter for 4 + 1 shieldbearer: max(1, 5 + 12 - 10).
        assert_eq!(game.character(FOE).stats.hp, 93.0);
        game.attack(AttackRequest::direct(FOE, 10.0)).unwrap();
        assert_eq!(game.character(FOE).stats.hp, 93.0);

        for _ in 0..3 {
            game.resolve_timed_effects([AURA, FOE]).unwrap();
        }
        assert!(!game.character(AURA).ability.has(HookKind::Counter));
        assert_eq!(game.character(AURA).stats.def, 12.0);
    }

    #[test]
    fn army_marches_at_turn_end() {
        let mut game = aura_duel([]);
        play(&mut game, fallen_empire());
        game.end_turn([AURA, FOE], &PerSide::default()).unwrap();
        // 1 swordsmen + 1 archers = 3 move damage, ATK 12 against DEF 10.
        assert_eq!(game.character(FOE).stats.hp, 95.0);
        assert!(game.character(AURA).flags.timed_attacked_this_turn);
    }

    #[test]
    fn auserlese_turns_the_opponents_move() {
        // First d100 reads 50 against an HP gap of 0.
        let mut game = aura_duel([49]);
        let moves = PerSide::new(Some(auserlese()), Some(denken::jab()));
        let order = game.resolve_moves(&moves).unwrap();
        assert_eq!(order, [AURA, FOE]);
        assert_eq!(game.character(AURA).stats.hp, 90.0);
        // The jab resolves with Aura as the attacker: max(1, 7 + 10 - 10).
        assert_eq!(game.character(FOE).stats.hp, 93.0);

        game.resolve_timed_effects(order).unwrap();
        assert!(!game.sides[FOE].context_reversed);
        assert!(!game.game_over);
    }

    #[test]
    fn scales_claim_a_far_weaker_opponent() {
        let mut game = aura_duel([99]);
        play(&mut game, auserlese());
        game.character_mut(FOE).stats.hp = 30.0;
        game.resolve_timed_effects([AURA, FOE]).unwrap();
        assert!(game.sides[FOE].forfeited);
        assert_eq!(game.outcome.and_then(|o| o.loser()), Some(FOE));
    }
}
