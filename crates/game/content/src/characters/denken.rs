//! Denken: an old mage who keeps fighting below 0 HP while his resolve holds.

use duel_core::{
    Ability, AbilityHook, Card, CardTraits, CharacterFlags, CharacterTemplate, DeckEntry,
    EffectContext, Nature, Pronouns, Result, Stat, Stats, TimedEffect,
};

use super::brace_true_def;

const EMOJI: &str = "🧓";
const DEATH_FLOOR: f64 = -40.0;
const DEEP_WOUND: f64 = -20.0;

pub const NAME: &str = "Denken";

pub fn template() -> CharacterTemplate {
    CharacterTemplate::new(NAME, Stats::new(100.0, 12.0, 10.0, 0.0, 10.0, 3.0), preserverance())
        .emoji(EMOJI)
        .pronouns(Pronouns::MASCULINE)
        .flags(CharacterFlags {
            death_floor: Some(DEATH_FLOOR),
            ..CharacterFlags::default()
        })
        .signature(catastravia())
        .deck(vec![
            DeckEntry::new(jab(), 3),
            DeckEntry::new(daosdorg(), 2),
            DeckEntry::new(waldgeist(), 2),
            DeckEntry::new(steel_resolve(), 2),
            DeckEntry::new(elemental_ward(), 2),
            DeckEntry::new(catastravia(), 1),
        ])
}

fn preserverance() -> Ability {
    Ability::new(
        "Preserverance",
        format!(
            "Denken can keep fighting at 0 HP or below. Each turn end at 0 HP or below costs \
             1 Preserverance, 2 at {DEEP_WOUND} HP or below. Denken is defeated when \
             Preserverance runs out or HP reaches {DEATH_FLOOR}."
        ),
    )
    .with(AbilityHook::end_of_turn(hold_on))
}

fn hold_on(ctx: &mut EffectContext<'_>) -> Result<()> {
    let hp = ctx.self_stats().hp;
    if hp > 0.0 {
        return Ok(());
    }

    let mut cost = 1.0;
    if hp <= DEEP_WOUND {
        cost += 1.0;
    }
    ctx.flat_self_stat(-cost, Stat::Ability);

    let side = ctx.side();
    if ctx.self_stats().ability > 0.0 && hp > DEATH_FLOOR {
        let line = format!("{} steels {}!", ctx.name(), ctx.pronouns().reflexive);
        ctx.send(line);
    } else {
        let line = format!("{}'s strength fades.", ctx.name());
        ctx.send(line);
        ctx.game_mut().sides[side].forfeited = true;
    }
    Ok(())
}

pub fn jab() -> Card {
    Card::new("Jab", Nature::Attack)
        .emoji("👊")
        .effects([7.0])
        .describe(|e| format!("DMG {}.", e[0]))
        .action(|ctx| {
            let line = format!("{} throws a quick jab.", ctx.name());
            ctx.send(line);
            ctx.basic_attack(0).map(|_| ())
        })
}

pub fn daosdorg() -> Card {
    Card::new("Daosdorg", Nature::Attack)
        .emoji("🔥")
        .effects([12.0])
        .hp_cost(6.0)
        .describe(|e| format!("Costs 6HP. DMG {}.", e[0]))
        .action(|ctx| {
            let line = format!("{} engulfs {} in hellfire.", ctx.name(), ctx.opponent_name());
            ctx.send(line);
            ctx.basic_attack(0).map(|_| ())
        })
}

pub fn waldgeist() -> Card {
    Card::new("Waldgeist", Nature::Attack)
        .emoji("🌲")
        .effects([5.0])
        .describe(|e| format!("DMG {} at the end of each of the next 3 turns.", e[0]))
        .action(|ctx| {
            let damage = ctx.calc_effect(0);
            let line = format!("{} summons the forest spirits.", ctx.name());
            ctx.send(line);
            ctx.self_effect(
                TimedEffect::new("Waldgeist", 3)
                    .description(format!("Deals {damage} DMG at the end of the turn."))
                    .on_end_of_turn(move |ctx| {
                        ctx.timed_attack(damage)?;
                        Ok(())
                    }),
            )?;
            Ok(())
        })
}

pub fn steel_resolve() -> Card {
    Card::new("Steel Resolve", Nature::Util)
        .emoji("🛡️")
        .effects([10.0, 2.0])
        .describe(|e| format!("Heal {}HP. DEF+{}.", e[0], e[1]))
        .action(|ctx| {
            let line = format!("{} catches his breath.", ctx.name());
            ctx.send(line);
            ctx.self_stat(0, Stat::HP, 1.0);
            ctx.self_stat(1, Stat::DEF, 1.0);
            Ok(())
        })
}

pub fn elemental_ward() -> Card {
    Card::new("Elemental Ward", Nature::Defense)
        .emoji("🛡️")
        .effects([15.0])
        .priority(2)
        .describe(|e| format!("Increases TrueDEF by {} until the end of the turn.", e[0]))
        .action(|ctx| brace_true_def(ctx, "Elemental Ward"))
}

pub fn catastravia() -> Card {
    Card::new("Catastravia", Nature::Attack)
        .emoji("🌠")
        .effects([6.0, 4.0])
        .traits(CardTraits::SIGNATURE)
        .describe(|e| {
            format!(
                "DMG {}. Deals {} DMG at the end of each of the next 3 turns.",
                e[0], e[1]
            )
        })
        .action(|ctx| {
            let line = format!("A rain of light falls on {}.", ctx.opponent_name());
            ctx.send(line);
            ctx.basic_attack(0)?;
            let damage = ctx.calc_effect(1);
            ctx.self_effect(
                TimedEffect::new("Catastravia", 3)
                    .description(format!("Deals {damage} DMG at the end of the turn."))
                    .on_end_of_turn(move |ctx| {
                        ctx.timed_attack(damage)?;
                        Ok(())
                    }),
            )?;
            Ok(())
        })
}
