//! Stille: a fragile bird that evades by speed and reflects what it dodges.

use duel_core::{
    Ability, AbilityHook, AttackRequest, Card, CharacterFlags, CharacterTemplate, DeckEntry,
    EffectContext, Nature, Pronouns, Result, Stat, Stats, TimedEffect,
};

const EMOJI: &str = "🐦";
/// Share of the attacker's ATK plus move damage reflected after an evasion.
const REFLECT_SCALE: f64 = 0.8;

pub const NAME: &str = "Stille";

pub fn template() -> CharacterTemplate {
    CharacterTemplate::new(NAME, Stats::new(20.0, 1.0, 20.0, 0.0, 80.0, 0.0), high_speed_escape())
        .emoji(EMOJI)
        .pronouns(Pronouns::IMPERSONAL)
        .flags(CharacterFlags {
            default_options: false,
            ..CharacterFlags::default()
        })
        .signature(take_flight())
        .deck(vec![
            DeckEntry::new(peck(), 4),
            DeckEntry::new(take_flight(), 3),
            DeckEntry::new(preen(), 3),
            DeckEntry::new(tuck_in(), 3),
        ])
}

fn high_speed_escape() -> Ability {
    Ability::new(
        "High-speed Escape",
        format!(
            "When the opponent attacks, roll a D100. If the result is less than the \
             character's SPD minus the opponent's SPD, ignore the attack. Afterwards, attack \
             the opponent with DMG equivalent to {:.0}% of (opponent's ATK + opponent's move \
             DMG). Both characters don't have access to default card options (Discard/Wait).",
            REFLECT_SCALE * 100.0
        ),
    )
    .with(AbilityHook::start_of_turn(birdwatching))
    .with(AbilityHook::defend(evade))
    .with(AbilityHook::counter(reflect))
}

fn speed_gap(ctx: &EffectContext<'_>) -> f64 {
    ctx.self_stats().spd - ctx.opponent_stats().spd
}

/// Keeps the evasion chance on the Ability counter and locks default options.
fn birdwatching(ctx: &mut EffectContext<'_>) -> Result<()> {
    let chance = 100.0 - speed_gap(ctx);
    let side = ctx.side();
    ctx.game_mut().set_stat(side, chance, Stat::Ability, false);
    ctx.me_mut().flags.default_options = false;
    ctx.opponent_mut().flags.default_options = false;
    Ok(())
}

fn evade(ctx: &mut EffectContext<'_>, _damage: f64) -> Result<()> {
    let roll = ctx.roll_d100();
    let gap = speed_gap(ctx);
    ctx.send(format!("## **SPD diff**: {gap}"));
    ctx.send(format!("# Roll: {roll}"));

    let evaded = f64::from(roll) < gap;
    if evaded {
        ctx.send("## Stille evaded the attack!");
    } else {
        ctx.send("## Stille failed to evade the attack!");
    }
    let attacker = ctx.opponent_side();
    ctx.game_mut().sides[attacker].attack_missed = evaded;
    Ok(())
}

fn reflect(ctx: &mut EffectContext<'_>, damage: f64) -> Result<()> {
    let attacker = ctx.opponent_side();
    if !ctx.game().sides[attacker].attack_missed {
        return Ok(());
    }
    ctx.send("## The Stille's high speed escape reflected the opponent's damage!");
    let reflected = REFLECT_SCALE * (ctx.opponent_stats().atk + damage);
    let side = ctx.side();
    ctx.game_mut()
        .attack(AttackRequest::direct(side, reflected))?;
    Ok(())
}

pub fn peck() -> Card {
    Card::new("Peck", Nature::Attack)
        .emoji(EMOJI)
        .effects([4.0])
        .describe(|e| format!("DMG {}.", e[0]))
        .action(|ctx| {
            let line = format!("{} pecks at {}.", ctx.name(), ctx.opponent_name());
            ctx.send(line);
            ctx.basic_attack(0).map(|_| ())
        })
}

pub fn take_flight() -> Card {
    Card::new("Take Flight", Nature::Util)
        .emoji(EMOJI)
        .effects([10.0])
        .traits(duel_core::CardTraits::SIGNATURE)
        .describe(|e| format!("SPD+{} for 2 turns.", e[0]))
        .action(|ctx| {
            let line = format!("{} takes to the sky.", ctx.name());
            ctx.send(line);
            let spd = ctx.self_stat(0, Stat::SPD, 1.0);
            ctx.self_effect(
                TimedEffect::new("Take Flight", 2)
                    .description(format!("SPD+{spd}."))
                    .removable(true)
                    .expire_on_removal()
                    .on_expire(move |ctx| {
                        let line = format!("{} lands.", ctx.name());
                        ctx.send(line);
                        ctx.flat_self_stat(-spd, Stat::SPD);
                        Ok(())
                    }),
            )?;
            Ok(())
        })
}

pub fn preen() -> Card {
    Card::new("Preen", Nature::Util)
        .emoji(EMOJI)
        .effects([4.0])
        .describe(|e| format!("Heal {}HP.", e[0]))
        .action(|ctx| {
            let line = format!("{} preens its feathers.", ctx.name());
            ctx.send(line);
            ctx.self_stat(0, Stat::HP, 1.0);
            Ok(())
        })
}

pub fn tuck_in() -> Card {
    Card::new("Tuck In", Nature::Defense)
        .emoji(EMOJI)
        .effects([6.0])
        .priority(1)
        .describe(|e| format!("DEF+{}.", e[0]))
        .action(|ctx| {
            let line = format!("{} tucks its head in.", ctx.name());
            ctx.send(line);
            ctx.self_stat(0, Stat::DEF, 1.0);
            Ok(())
        })
}
