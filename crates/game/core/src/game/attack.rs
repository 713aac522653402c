//! Attack resolution: hooks, damage arithmetic, counters and plugin chaining.

use tracing::debug;

use super::Game;
use crate::context::EffectContext;
use crate::error::Result;
use crate::side::Side;
use crate::stats::round2;

/// One call into [`Game::attack`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackRequest {
    pub attacker: Side,
    /// Raw move damage before modifiers, ATK and DEF.
    pub damage: f64,
    /// Fired by a timed effect rather than a card.
    pub timed: bool,
}

impl AttackRequest {
    pub fn direct(attacker: Side, damage: f64) -> Self {
        Self {
            attacker,
            damage,
            timed: false,
        }
    }

    pub fn timed(attacker: Side, damage: f64) -> Self {
        Self {
            attacker,
            damage,
            timed: true,
        }
    }
}

/// `max(1, move_damage + atk - def) * (1 - reduction)`.
pub fn calculate_damage(move_damage: f64, atk: f64, def: f64, reduction: f64) -> f64 {
    (move_damage + atk - def).max(1.0) * (1.0 - reduction)
}

impl Game {
    /// Resolves one attack and returns the damage dealt, 0 on a miss.
    ///
    /// The counter hook of the defender fires at most once per attack step,
    /// even when the counter itself attacks back. A defender defeated by the
    /// hit never counters.
    pub fn attack(&mut self, request: AttackRequest) -> Result<f64> {
        let attacker = request.attacker;
        let defender = attacker.other();

        let flags = &mut self.characters[attacker].flags;
        if request.timed {
            flags.timed_attacked_this_turn = true;
        } else {
            flags.attacked_this_turn = true;
        }

        if let Some(hook) = self.characters[attacker].ability.attack() {
            hook(&mut EffectContext::new(self, attacker))?;
        }
        if let Some(hook) = self.characters[defender].ability.defend() {
            hook(&mut EffectContext::new(self, defender), request.damage)?;
        }

        let mut actual = 0.0;
        if self.sides[attacker].attack_missed {
            let line = format!("# {} missed!", self.characters[attacker].name);
            self.messages.gameroom(line);
        } else {
            let base = request.damage * self.sides[attacker].attack_modifier;
            let (a, d) = (&self.characters[attacker], &self.characters[defender]);
            let mut damage = calculate_damage(
                base,
                a.stats.atk,
                d.stats.def,
                d.flags.defense_damage_reduction,
            );
            for plugin in self.plugins() {
                damage = plugin.modify_damage(self, damage, attacker, defender);
            }
            actual = damage;

            let remaining = round2(self.characters[defender].stats.hp - actual);
            self.characters[defender].stats.hp = remaining;

            let (a, d) = (&self.characters[attacker], &self.characters[defender]);
            let hp_left = if d.flags.mana_suppressed {
                String::new()
            } else {
                format!("{} has {} left!", d.name, d.stats.hp)
            };
            let line = format!(
                "# {} {} attacks {} {} for {:.2} damage! {}",
                a.emoji, a.name, d.emoji, d.name, actual, hp_left
            );
            self.messages.gameroom(line);
            debug!(
                target: "duel::attack",
                ?attacker,
                raw = request.damage,
                dealt = actual,
                remaining,
                timed = request.timed,
                "attack landed"
            );

            if remaining <= 0.0 && self.is_defeated(defender) {
                return Ok(actual);
            }
        }

        if !self.sides[attacker].attack_countered {
            if let Some(hook) = self.characters[defender].ability.counter() {
                self.sides[attacker].attack_countered = true;
                hook(&mut EffectContext::new(self, defender), request.damage)?;
            }
        }

        if !self.sides[attacker].attack_missed {
            let ability = &self.characters[attacker].ability;
            let follow_up = if request.timed {
                ability.after_timed_attack()
            } else {
                ability.after_direct_attack()
            };
            self.run_turn_hook(attacker, follow_up)?;
        }

        for plugin in self.plugins() {
            plugin.on_attack_complete(self, attacker, actual)?;
        }

        self.sides[attacker].attack_missed = false;
        self.sides[attacker].attack_countered = false;
        Ok(actual)
    }

    /// Card attack with TrueDEF mitigation.
    ///
    /// The attacker's pierce factor plus `additional_pierce` (clamped to
    /// 0..=1) decides how much of the defender's TrueDEF is ignored.
    pub fn common_attack(
        &mut self,
        attacker: Side,
        damage: f64,
        additional_pierce: f64,
        timed: bool,
    ) -> Result<f64> {
        let pierce =
            (self.characters[attacker].flags.pierce_factor + additional_pierce).clamp(0.0, 1.0);
        let true_def = self.characters[attacker.other()].stats.true_def;
        let move_damage = (damage - true_def * (1.0 - pierce)).max(0.0);
        self.attack(AttackRequest {
            attacker,
            damage: move_damage,
            timed,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::ability::AbilityHook;
    use crate::plugin::GamePlugin;
    use crate::test_support::duel;

    #[test]
    fn damage_formula_applies_floor_and_reduction() {
        assert_eq!(calculate_damage(8.0, 12.0, 10.0, 0.0), 10.0);
        assert_eq!(calculate_damage(8.0, 12.0, 10.0, 0.5), 5.0);
        assert_eq!(calculate_damage(1.0, 1.0, 30.0, 0.0), 1.0);
    }

    #[test]
    fn plain_attack_reduces_defender_hp() {
        let mut game = duel();
        let dealt = game
            .attack(AttackRequest::direct(Side::Challenger, 10.0))
            .unwrap();
        assert_eq!(dealt, 12.0);
        assert_eq!(game.characters[Side::Challenged].stats.hp, 88.0);
        assert!(game.characters[Side::Challenger].flags.attacked_this_turn);
        assert!(!game.characters[Side::Challenger].flags.timed_attacked_this_turn);
    }

    #[test]
    fn missed_attack_leaves_hp_untouched() {
        let mut game = duel();
        game.sides[Side::Challenger].attack_missed = true;
        let dealt = game
            .attack(AttackRequest::direct(Side::Challenger, 40.0))
            .unwrap();
        assert_eq!(dealt, 0.0);
        assert_eq!(game.characters[Side::Challenged].stats.hp, 100.0);
        assert!(!game.sides[Side::Challenger].attack_missed);
    }

    #[test]
    fn counter_fires_once_even_when_it_attacks_back() {
        let mut game = duel();
        let fired = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&fired);
        game.characters[Side::Challenged]
            .ability
            .install(AbilityHook::counter(move |ctx, _damage| {
                seen.fetch_add(1, Ordering::SeqCst);
                ctx.flat_attack(5.0)?;
                Ok(())
            }));
        // The attacker counters too, so the nested attack would recurse
        // without the per-step guard.
        let echo = Arc::new(AtomicUsize::new(0));
        let echo_seen = Arc::clone(&echo);
        game.characters[Side::Challenger]
            .ability
            .install(AbilityHook::counter(move |ctx, _damage| {
                echo_seen.fetch_add(1, Ordering::SeqCst);
                ctx.game_mut()
                    .attack(AttackRequest::direct(Side::Challenger, 1.0))?;
                Ok(())
            }));

        game.attack(AttackRequest::direct(Side::Challenger, 10.0))
            .unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(echo.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn defeated_defender_does_not_counter() {
        let mut game = duel();
        game.characters[Side::Challenged].stats.hp = 5.0;
        let fired = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&fired);
        game.characters[Side::Challenged]
            .ability
            .install(AbilityHook::counter(move |_, _| {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }));
        game.attack(AttackRequest::direct(Side::Challenger, 10.0))
            .unwrap();
        assert_eq!(game.characters[Side::Challenged].stats.hp, -7.0);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn true_def_is_pierced_proportionally() {
        let mut game = duel();
        game.characters[Side::Challenged].stats.true_def = 20.0;
        let blocked = game.common_attack(Side::Challenger, 10.0, 0.0, false).unwrap();
        // Move damage 0, ATK - DEF = 2.
        assert_eq!(blocked, 2.0);
        let pierced = game.common_attack(Side::Challenger, 30.0, 0.5, false).unwrap();
        assert_eq!(pierced, 22.0);
    }

    struct Double;
    struct Minus(f64);

    impl GamePlugin for Double {
        fn name(&self) -> &'static str {
            "double"
        }

        fn modify_damage(&self, _: &Game, damage: f64, _: Side, _: Side) -> f64 {
            damage * 2.0
        }
    }

    impl GamePlugin for Minus {
        fn name(&self) -> &'static str {
            "minus"
        }

        fn modify_damage(&self, _: &Game, damage: f64, _: Side, _: Side) -> f64 {
            damage - self.0
        }
    }

    #[test]
    fn plugins_chain_damage_in_registration_order() {
        let plugins: Vec<Arc<dyn GamePlugin>> = vec![Arc::new(Double), Arc::new(Minus(4.0))];
        let mut game = duel().with_plugins(plugins);
        let dealt = game
            .attack(AttackRequest::direct(Side::Challenger, 8.0))
            .unwrap();
        // (8 + 12 - 10) * 2 - 4
        assert_eq!(dealt, 16.0);
        assert_eq!(game.characters[Side::Challenged].stats.hp, 84.0);
    }
}
