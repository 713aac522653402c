//! Engine plugins the runtime registers on every match.

mod damage;

pub use damage::DamageLogPlugin;
