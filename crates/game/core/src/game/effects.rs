//! Attaching, replacing, removing and ticking timed effects.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use tracing::trace;

use super::Game;
use crate::context::EffectContext;
use crate::effect::{EffectAction, EffectId, TimedEffect};
use crate::error::Result;
use crate::side::{PerSide, Side};

impl Game {
    /// Attaches `effect` to `side`.
    ///
    /// When the effect belongs to an exclusive group, the effect currently
    /// holding that group runs its replaced action and is removed first.
    pub fn add_effect(&mut self, side: Side, mut effect: TimedEffect) -> Result<EffectId> {
        if let Some(group) = effect.exclusive_group {
            let existing = self.characters[side]
                .timed_effects
                .iter()
                .find(|e| e.exclusive_group == Some(group))
                .map(|e| (e.id(), e.replaced_action()));
            if let Some((old, replaced)) = existing {
                trace!(target: "duel::effects", ?side, group, "replacing exclusive effect");
                self.run_effect_action(side, replaced)?;
                self.remove_effect(side, old);
            }
        }

        let id = EffectId(self.next_effect_id());
        effect.id = id;
        self.characters[side].timed_effects.push(effect);
        Ok(id)
    }

    pub fn remove_effect(&mut self, side: Side, id: EffectId) -> Option<TimedEffect> {
        let effects = &mut self.characters[side].timed_effects;
        let pos = effects.iter().position(|e| e.id() == id)?;
        Some(effects.remove(pos))
    }

    /// Strips every removable effect from `side`, running expiry actions
    /// for those flagged to expire on removal. Returns how many were removed.
    pub fn remove_removable_effects(&mut self, side: Side) -> Result<usize> {
        let effects = std::mem::take(&mut self.characters[side].timed_effects);
        let (removed, kept): (Vec<_>, Vec<_>) =
            effects.into_iter().partition(|e| e.removable);
        self.characters[side].timed_effects = kept;

        for effect in &removed {
            if effect.execute_expiry_on_removal {
                self.run_effect_action(side, effect.expiry_action())?;
            }
        }
        Ok(removed.len())
    }

    /// Advances one effect by a turn.
    ///
    /// While the remaining duration is positive the end-of-turn action fires
    /// and the duration drops by one. Reaching zero fires the expiry action
    /// and removes the effect.
    pub fn tick_effect(&mut self, side: Side, id: EffectId) -> Result<()> {
        let Some(effect) = self.find_effect(side, id) else {
            return Ok(());
        };
        if effect.turn_duration == 0 {
            return Ok(());
        }
        let end_of_turn = effect.end_of_turn_action();
        self.run_effect_action(side, end_of_turn)?;

        // The action may have removed its own effect.
        let Some(effect) = self.characters[side]
            .timed_effects
            .iter_mut()
            .find(|e| e.id() == id)
        else {
            return Ok(());
        };
        effect.turn_duration -= 1;
        if effect.turn_duration == 0 {
            let expiry = effect.expiry_action();
            trace!(target: "duel::effects", ?side, name = %effect.name, "effect expired");
            self.run_effect_action(side, expiry)?;
            self.remove_effect(side, id);
        }
        Ok(())
    }

    /// Ticks every active effect for the turn.
    ///
    /// Effects are grouped by priority, highest band first. Within a band the
    /// sides follow `order`, and the game-over check runs after each side
    /// that had effects in the band.
    pub fn resolve_timed_effects(&mut self, order: [Side; 2]) -> Result<()> {
        let mut bands: BTreeMap<Reverse<i32>, PerSide<Vec<EffectId>>> = BTreeMap::new();
        for (side, character) in self.characters.iter() {
            for effect in &character.timed_effects {
                bands.entry(Reverse(effect.priority)).or_default()[side].push(effect.id());
            }
        }

        for (Reverse(priority), band) in bands {
            for side in order {
                if self.game_over {
                    return Ok(());
                }
                let ids = &band[side];
                if ids.is_empty() {
                    continue;
                }
                trace!(target: "duel::effects", priority, ?side, count = ids.len(), "ticking band");
                for id in ids {
                    self.tick_effect(side, *id)?;
                }
                self.check_game_over();
            }
        }
        Ok(())
    }

    fn find_effect(&self, side: Side, id: EffectId) -> Option<&TimedEffect> {
        self.characters[side]
            .timed_effects
            .iter()
            .find(|e| e.id() == id)
    }

    fn run_effect_action(&mut self, side: Side, action: Option<EffectAction>) -> Result<()> {
        if let Some(action) = action {
            action(&mut EffectContext::new(self, side))?;
        }
        Ok(())
    }
}
