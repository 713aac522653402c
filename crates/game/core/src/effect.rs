//! Duration-bounded modifiers attached to a character.
//!
//! A timed effect ticks once per turn end: its end-of-turn action fires while
//! the remaining duration is positive, the duration drops by one, and on
//! reaching zero the expiry action fires and the effect is removed. Ticking is
//! driven by [`Game`](crate::game::Game) so the actions can touch both sides.

use std::fmt;
use std::sync::Arc;

use crate::context::EffectContext;
use crate::error::Result;

/// Callback run against the owner of the effect.
pub type EffectAction = Arc<dyn Fn(&mut EffectContext<'_>) -> Result<()> + Send + Sync>;

/// Match-unique handle assigned when the effect is attached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectId(pub u64);

#[derive(Clone)]
pub struct TimedEffect {
    pub(crate) id: EffectId,
    pub name: String,
    pub description: String,
    pub turn_duration: u32,
    /// Tick order among all active effects, higher first.
    pub priority: i32,
    /// Can be stripped by effect-clearing cards.
    pub removable: bool,
    /// Run the expiry action when stripped early.
    pub execute_expiry_on_removal: bool,
    /// At most one effect per group is active on a character.
    pub exclusive_group: Option<&'static str>,
    end_of_turn: Option<EffectAction>,
    on_expire: Option<EffectAction>,
    on_replaced: Option<EffectAction>,
}

impl TimedEffect {
    pub fn new(name: impl Into<String>, turn_duration: u32) -> Self {
        Self {
            id: EffectId::default(),
            name: name.into(),
            description: String::new(),
            turn_duration,
            priority: 0,
            removable: false,
            execute_expiry_on_removal: false,
            exclusive_group: None,
            end_of_turn: None,
            on_expire: None,
            on_replaced: None,
        }
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn removable(mut self, removable: bool) -> Self {
        self.removable = removable;
        self
    }

    pub fn expire_on_removal(mut self) -> Self {
        self.execute_expiry_on_removal = true;
        self
    }

    pub fn exclusive(mut self, group: &'static str) -> Self {
        self.exclusive_group = Some(group);
        self
    }

    pub fn on_end_of_turn(
        mut self,
        f: impl Fn(&mut EffectContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.end_of_turn = Some(Arc::new(f));
        self
    }

    pub fn on_expire(
        mut self,
        f: impl Fn(&mut EffectContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_expire = Some(Arc::new(f));
        self
    }

    pub fn on_replaced(
        mut self,
        f: impl Fn(&mut EffectContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_replaced = Some(Arc::new(f));
        self
    }

    pub fn is_expired(&self) -> bool {
        self.turn_duration == 0
    }

    pub(crate) fn end_of_turn_action(&self) -> Option<EffectAction> {
        self.end_of_turn.clone()
    }

    pub(crate) fn expiry_action(&self) -> Option<EffectAction> {
        self.on_expire.clone()
    }

    pub(crate) fn replaced_action(&self) -> Option<EffectAction> {
        self.on_replaced.clone()
    }
}

impl fmt::Debug for TimedEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedEffect")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("turn_duration", &self.turn_duration)
            .field("priority", &self.priority)
            .field("removable", &self.removable)
            .field("exclusive_group", &self.exclusive_group)
            .finish_non_exhaustive()
    }
}
