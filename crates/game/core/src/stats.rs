//! Character stat block and the clamping rules applied on every write.
//!
//! Stats are plain `f64` values rounded to two decimals. ATK, DEF and SPD
//! never drop below 1. HP normally floors at 1 and caps at the starting value;
//! once a character is already at or below 0 HP it may keep sinking down to
//! its death floor. TrueDEF and Ability are unbounded.

use crate::config::BattleConfig;

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The six named stats.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stat {
    HP,
    ATK,
    DEF,
    TrueDEF,
    SPD,
    Ability,
}

impl Stat {
    /// Label used in battle log lines.
    pub const fn label(self) -> &'static str {
        match self {
            Stat::HP => "HP",
            Stat::ATK => "ATK",
            Stat::DEF => "DEF",
            Stat::TrueDEF => "TrueDEF",
            Stat::SPD => "SPD",
            Stat::Ability => "Ability Counter",
        }
    }

    /// ATK, DEF and SPD share the floor of 1.
    pub const fn is_combat_stat(self) -> bool {
        matches!(self, Stat::ATK | Stat::DEF | Stat::SPD)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub hp: f64,
    pub atk: f64,
    pub def: f64,
    pub true_def: f64,
    pub spd: f64,
    pub ability: f64,
}

impl Stats {
    pub const fn new(hp: f64, atk: f64, def: f64, true_def: f64, spd: f64, ability: f64) -> Self {
        Self {
            hp,
            atk,
            def,
            true_def,
            spd,
            ability,
        }
    }

    pub const fn get(&self, stat: Stat) -> f64 {
        match stat {
            Stat::HP => self.hp,
            Stat::ATK => self.atk,
            Stat::DEF => self.def,
            Stat::TrueDEF => self.true_def,
            Stat::SPD => self.spd,
            Stat::Ability => self.ability,
        }
    }

    /// Raw write without clamping. Use [`StatBounds::clamp`] first.
    pub fn set(&mut self, stat: Stat, value: f64) {
        let slot = match stat {
            Stat::HP => &mut self.hp,
            Stat::ATK => &mut self.atk,
            Stat::DEF => &mut self.def,
            Stat::TrueDEF => &mut self.true_def,
            Stat::SPD => &mut self.spd,
            Stat::Ability => &mut self.ability,
        };
        *slot = value;
    }
}

/// Per-character limits consulted when a stat is written.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatBounds {
    /// HP ceiling, the character's starting HP.
    pub max_hp: f64,
    pub overheal: bool,
    /// Lowest HP reachable once already at or below 0.
    pub death_floor: Option<f64>,
}

impl StatBounds {
    /// Returns the value actually stored when `stat` moves from `current` to `proposed`.
    pub fn clamp(&self, stat: Stat, current: f64, proposed: f64) -> f64 {
        match stat {
            Stat::HP => {
                if proposed <= 1.0 {
                    if current <= 0.0 {
                        let floor =
                            self.death_floor.unwrap_or(BattleConfig::DEFAULT_DEATH_FLOOR) + 1.0;
                        proposed.max(floor)
                    } else {
                        1.0
                    }
                } else if proposed > self.max_hp && !self.overheal {
                    self.max_hp
                } else {
                    proposed
                }
            }
            Stat::ATK | Stat::DEF | Stat::SPD => proposed.max(1.0),
            Stat::TrueDEF | Stat::Ability => proposed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn bounds() -> StatBounds {
        StatBounds {
            max_hp: 100.0,
            overheal: false,
            death_floor: None,
        }
    }

    #[test]
    fn combat_stats_never_drop_below_one() {
        for stat in Stat::iter().filter(|s| s.is_combat_stat()) {
            assert_eq!(bounds().clamp(stat, 10.0, -25.0), 1.0);
            assert_eq!(bounds().clamp(stat, 10.0, 0.5), 1.0);
            assert_eq!(bounds().clamp(stat, 10.0, 14.5), 14.5);
        }
    }

    #[test]
    fn hp_caps_at_starting_value_unless_overheal() {
        assert_eq!(bounds().clamp(Stat::HP, 95.0, 130.0), 100.0);
        let overheal = StatBounds {
            overheal: true,
            ..bounds()
        };
        assert_eq!(overheal.clamp(Stat::HP, 95.0, 130.0), 130.0);
    }

    #[test]
    fn hp_floors_at_one_while_alive() {
        assert_eq!(bounds().clamp(Stat::HP, 5.0, -20.0), 1.0);
    }

    #[test]
    fn hp_death_spiral_stops_above_floor() {
        let denken = StatBounds {
            death_floor: Some(-40.0),
            ..bounds()
        };
        assert_eq!(denken.clamp(Stat::HP, -5.0, -12.0), -12.0);
        assert_eq!(denken.clamp(Stat::HP, -30.0, -55.0), -39.0);
        // Alive characters still snap to 1 even with a death floor.
        assert_eq!(denken.clamp(Stat::HP, 3.0, -10.0), 1.0);
    }

    #[test]
    fn true_def_and_ability_are_unbounded() {
        assert_eq!(bounds().clamp(Stat::TrueDEF, 0.0, -20.0), -20.0);
        assert_eq!(bounds().clamp(Stat::Ability, 0.0, 250.0), 250.0);
    }

    #[test]
    fn round2_matches_two_decimal_display() {
        assert_eq!(round2(10.0 * 1.1), 11.0);
        assert_eq!(round2(-3.456), -3.46);
    }
}
