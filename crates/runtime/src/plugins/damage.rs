//! Plugin that traces completed attacks and keeps a per-side damage tally.

use std::sync::Mutex;

use duel_core::{Game, GamePlugin, PerSide, Side};
use tracing::debug;

/// Observes every finished attack step without changing it.
///
/// The engine ends an attack step early when the hit defeats the defender,
/// so the finishing blow is traced by the engine but not tallied here.
#[derive(Debug, Default)]
pub struct DamageLogPlugin {
    totals: Mutex<PerSide<f64>>,
}

impl DamageLogPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn totals(&self) -> PerSide<f64> {
        self.totals
            .lock()
            .map(|t| t.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl GamePlugin for DamageLogPlugin {
    fn name(&self) -> &'static str {
        "damage_log"
    }

    fn on_attack_complete(
        &self,
        game: &mut Game,
        attacker: Side,
        dealt: f64,
    ) -> duel_core::Result<()> {
        let mut totals = self.totals.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        totals[attacker] += dealt;
        debug!(
            target: "duel::damage",
            turn = game.turn_count,
            attacker = %game.character(attacker).name,
            dealt,
            total = totals[attacker],
            defender_hp = game.character(attacker.other()).stats.hp,
            "attack complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use duel_core::{
        Ability, AttackRequest, BattleConfig, CharacterTemplate, ScriptedDice, Stats,
    };

    use super::*;

    fn dummy(name: &str) -> CharacterTemplate {
        CharacterTemplate::new(
            name,
            Stats::new(100.0, 12.0, 10.0, 0.0, 10.0, 0.0),
            Ability::new("None", "No special rules."),
        )
    }

    #[test]
    fn tallies_landed_attacks_per_side() {
        let plugin = Arc::new(DamageLogPlugin::new());
        let mut game = Game::new(
            &dummy("Left"),
            &dummy("Right"),
            BattleConfig::new(),
            Box::new(ScriptedDice::new([])),
        )
        .with_plugins([plugin.clone() as Arc<dyn GamePlugin>]);

        game.attack(AttackRequest::direct(Side::Challenger, 10.0)).unwrap();
        game.attack(AttackRequest::direct(Side::Challenger, 3.0)).unwrap();
        game.attack(AttackRequest::direct(Side::Challenged, 8.0)).unwrap();

        let totals = plugin.totals();
        // (10 + 12 - 10) + (3 + 12 - 10) and (8 + 12 - 10).
        assert_eq!(totals[Side::Challenger], 17.0);
        assert_eq!(totals[Side::Challenged], 10.0);
    }
}
