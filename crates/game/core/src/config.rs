/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Reaching this turn count ends the match in a tie.
    pub turn_limit: u32,
    /// Cards drawn into each hand when the match starts.
    pub starting_hand: usize,
    /// Dice rolled per side when offering moves.
    pub dice_count: usize,
    /// Faces on each offer die. Rolls are zero-based hand indices.
    pub dice_sides: u32,
}

impl BattleConfig {
    // ===== compile-time constants =====
    /// Fraction of the base magnitude added per empower level.
    pub const EMPOWER_BOOST: f64 = 0.1;
    /// Lowest HP a character with a death spiral may reach before the clamp.
    pub const DEFAULT_DEATH_FLOOR: f64 = -40.0;
    /// Priority of the forfeit move; resolves ahead of any card.
    pub const FORFEIT_PRIORITY: i32 = 999;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_TURN_LIMIT: u32 = 50;
    pub const DEFAULT_STARTING_HAND: usize = 6;
    pub const DEFAULT_DICE_COUNT: usize = 4;
    pub const DEFAULT_DICE_SIDES: u32 = 6;

    pub fn new() -> Self {
        Self {
            turn_limit: Self::DEFAULT_TURN_LIMIT,
            starting_hand: Self::DEFAULT_STARTING_HAND,
            dice_count: Self::DEFAULT_DICE_COUNT,
            dice_sides: Self::DEFAULT_DICE_SIDES,
        }
    }

    pub fn with_turn_limit(turn_limit: u32) -> Self {
        Self {
            turn_limit,
            ..Self::new()
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
