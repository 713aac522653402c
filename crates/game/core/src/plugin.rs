//! Match-wide extension points.
//!
//! Plugins are registered on a [`Game`] before it starts and are invoked in
//! registration order. Every method has a no-op default so a plugin only
//! overrides the stages it cares about.

use crate::error::Result;
use crate::game::Game;
use crate::side::Side;

/// A rule extension applied to every match it is registered on.
pub trait GamePlugin: Send + Sync {
    /// Stable identifier used in logs.
    fn name(&self) -> &'static str;

    /// Runs after both hands are drawn.
    fn on_game_start(&self, _game: &mut Game) -> Result<()> {
        Ok(())
    }

    /// Runs before the starting hands are drawn.
    fn modify_initial_stats(&self, _game: &mut Game) -> Result<()> {
        Ok(())
    }

    /// Rewrites the damage of a landed attack. Each plugin receives the
    /// previous plugin's result.
    fn modify_damage(&self, _game: &Game, damage: f64, _attacker: Side, _defender: Side) -> f64 {
        damage
    }

    /// Runs once an attack step finished, including after misses.
    fn on_attack_complete(&self, _game: &mut Game, _attacker: Side, _dealt: f64) -> Result<()> {
        Ok(())
    }
}
