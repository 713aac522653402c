//! The playable characters. Each module exposes `template()` plus the cards
//! other characters may reach through signatures.

pub mod aura;
pub mod denken;
pub mod flamme;
pub mod stille;
pub mod ubel;

use duel_core::{CardContext, Result, Stat, TimedEffect};

/// Raises TrueDEF by effect slot 0 until the end of the turn.
pub(crate) fn brace_true_def(ctx: &mut CardContext<'_>, effect_name: &'static str) -> Result<()> {
    let def = ctx.calc_effect(0);
    ctx.flat_self_stat(def, Stat::TrueDEF);
    ctx.self_effect(
        TimedEffect::new(effect_name, 1)
            .description(format!("Increases TrueDEF by {def} until the end of the turn."))
            .priority(-1)
            .on_expire(move |ctx| {
                ctx.flat_self_stat(-def, Stat::TrueDEF);
                Ok(())
            }),
    )?;
    Ok(())
}

/// Whether the character owning `ctx` carries an effect named `name`.
pub(crate) fn has_effect(ctx: &CardContext<'_>, name: &str) -> bool {
    ctx.me().timed_effects.iter().any(|e| e.name == name)
}
