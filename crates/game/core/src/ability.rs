//! Character abilities as a bag of optional hooks.
//!
//! A hook is enabled exactly when it is installed. Cards and timed effects
//! install and clear hooks during a match (a temporary counter stance, for
//! instance), so there is no separate "active" flag to keep in sync.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::card::Card;
use crate::context::{CardContext, EffectContext};
use crate::error::Result;

pub type TurnHook = Arc<dyn Fn(&mut EffectContext<'_>) -> Result<()> + Send + Sync>;
/// Receives the raw damage of the attack being defended or countered.
pub type DamageHook = Arc<dyn Fn(&mut EffectContext<'_>, f64) -> Result<()> + Send + Sync>;
pub type CardHook = Arc<dyn Fn(&mut EffectContext<'_>, &Card) -> Result<()> + Send + Sync>;
pub type SelectionHook =
    Arc<dyn Fn(&mut EffectContext<'_>, Option<&Card>) -> Result<()> + Send + Sync>;
/// Replaces the plain card action; call [`CardContext::play`] to run it.
pub type CardWrapper = Arc<dyn Fn(&mut CardContext<'_>) -> Result<()> + Send + Sync>;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::EnumIter,
)]
pub enum HookKind {
    StartOfTurn,
    EndOfTurn,
    Attack,
    Defend,
    Counter,
    AfterDirectAttack,
    AfterTimedAttack,
    AfterOwnCard,
    AfterOpponentMove,
    SelectedMoveModifier,
    OwnCardWrapper,
}

#[derive(Clone)]
pub enum AbilityHook {
    StartOfTurn(TurnHook),
    EndOfTurn(TurnHook),
    Attack(TurnHook),
    Defend(DamageHook),
    Counter(DamageHook),
    AfterDirectAttack(TurnHook),
    AfterTimedAttack(TurnHook),
    AfterOwnCard(CardHook),
    AfterOpponentMove(CardHook),
    SelectedMoveModifier(SelectionHook),
    OwnCardWrapper(CardWrapper),
}

impl AbilityHook {
    pub fn kind(&self) -> HookKind {
        match self {
            Self::StartOfTurn(_) => HookKind::StartOfTurn,
            Self::EndOfTurn(_) => HookKind::EndOfTurn,
            Self::Attack(_) => HookKind::Attack,
            Self::Defend(_) => HookKind::Defend,
            Self::Counter(_) => HookKind::Counter,
            Self::AfterDirectAttack(_) => HookKind::AfterDirectAttack,
            Self::AfterTimedAttack(_) => HookKind::AfterTimedAttack,
            Self::AfterOwnCard(_) => HookKind::AfterOwnCard,
            Self::AfterOpponentMove(_) => HookKind::AfterOpponentMove,
            Self::SelectedMoveModifier(_) => HookKind::SelectedMoveModifier,
            Self::OwnCardWrapper(_) => HookKind::OwnCardWrapper,
        }
    }

    pub fn start_of_turn(
        f: impl Fn(&mut EffectContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::StartOfTurn(Arc::new(f))
    }

    pub fn end_of_turn(
        f: impl Fn(&mut EffectContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::EndOfTurn(Arc::new(f))
    }

    pub fn attack(
        f: impl Fn(&mut EffectContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::Attack(Arc::new(f))
    }

    pub fn defend(
        f: impl Fn(&mut EffectContext<'_>, f64) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::Defend(Arc::new(f))
    }

    pub fn counter(
        f: impl Fn(&mut EffectContext<'_>, f64) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::Counter(Arc::new(f))
    }

    pub fn after_direct_attack(
        f: impl Fn(&mut EffectContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::AfterDirectAttack(Arc::new(f))
    }

    pub fn after_timed_attack(
        f: impl Fn(&mut EffectContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::AfterTimedAttack(Arc::new(f))
    }

    pub fn after_own_card(
        f: impl Fn(&mut EffectContext<'_>, &Card) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::AfterOwnCard(Arc::new(f))
    }

    pub fn after_opponent_move(
        f: impl Fn(&mut EffectContext<'_>, &Card) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::AfterOpponentMove(Arc::new(f))
    }

    pub fn selected_move_modifier(
        f: impl Fn(&mut EffectContext<'_>, Option<&Card>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::SelectedMoveModifier(Arc::new(f))
    }

    pub fn own_card_wrapper(
        f: impl Fn(&mut CardContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::OwnCardWrapper(Arc::new(f))
    }
}

macro_rules! hook_getter {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self) -> Option<$ty> {
            match self.hooks.get(&HookKind::$variant) {
                Some(AbilityHook::$variant(f)) => Some(Arc::clone(f)),
                _ => None,
            }
        }
    };
}

#[derive(Clone, Default)]
pub struct Ability {
    pub name: String,
    pub description: String,
    hooks: BTreeMap<HookKind, AbilityHook>,
}

impl Ability {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            hooks: BTreeMap::new(),
        }
    }

    /// Builder form of [`Ability::install`].
    pub fn with(mut self, hook: AbilityHook) -> Self {
        self.install(hook);
        self
    }

    /// Installs a hook, returning the one it replaced.
    pub fn install(&mut self, hook: AbilityHook) -> Option<AbilityHook> {
        self.hooks.insert(hook.kind(), hook)
    }

    pub fn clear(&mut self, kind: HookKind) -> Option<AbilityHook> {
        self.hooks.remove(&kind)
    }

    pub fn has(&self, kind: HookKind) -> bool {
        self.hooks.contains_key(&kind)
    }

    pub fn installed(&self) -> impl Iterator<Item = HookKind> + '_ {
        self.hooks.keys().copied()
    }

    hook_getter!(start_of_turn, StartOfTurn, TurnHook);
    hook_getter!(end_of_turn, EndOfTurn, TurnHook);
    hook_getter!(attack, Attack, TurnHook);
    hook_getter!(defend, Defend, DamageHook);
    hook_getter!(counter, Counter, DamageHook);
    hook_getter!(after_direct_attack, AfterDirectAttack, TurnHook);
    hook_getter!(after_timed_attack, AfterTimedAttack, TurnHook);
    hook_getter!(after_own_card, AfterOwnCard, CardHook);
    hook_getter!(after_opponent_move, AfterOpponentMove, CardHook);
    hook_getter!(selected_move_modifier, SelectedMoveModifier, SelectionHook);
    hook_getter!(own_card_wrapper, OwnCardWrapper, CardWrapper);
}

impl fmt::Debug for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ability")
            .field("name", &self.name)
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}
