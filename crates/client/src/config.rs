//! Client configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use duel_core::{BattleConfig, PerSide, Side};
use duel_runtime::MatchConfig;

/// Settings for one simulated match.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Character names per side. `None` rolls for one.
    pub characters: PerSide<Option<String>>,
    pub players: PerSide<String>,
    pub seed: Option<u64>,
    pub turn_limit: u32,
    pub turn_duration: Duration,
    pub text_delay: Duration,
    pub reveal_hand: bool,
    pub reveal_draw: bool,
    /// Print both private channels next to the game room.
    pub show_private: bool,
    /// Also write diagnostics to `duel.log` in this directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let defaults = MatchConfig::default();
        Self {
            characters: PerSide::default(),
            players: defaults.players,
            seed: None,
            turn_limit: BattleConfig::DEFAULT_TURN_LIMIT,
            turn_duration: defaults.turn_duration,
            text_delay: defaults.text_delay,
            reveal_hand: false,
            reveal_draw: false,
            show_private: false,
            log_dir: None,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DUEL_CHALLENGER` / `DUEL_CHALLENGED` - Character names (default: random)
    /// - `DUEL_CHALLENGER_NAME` / `DUEL_CHALLENGED_NAME` - Player names for announcements
    /// - `DUEL_SEED` - Seed for dice, character rolls and bots (default: entropy)
    /// - `DUEL_TURN_LIMIT` - Turn that ends the match in a tie (default: 50)
    /// - `DUEL_TURN_DURATION_MS` - Move selection budget per side (default: 60000)
    /// - `DUEL_TEXT_DELAY_MS` - Pause between battle log batches (default: 0)
    /// - `DUEL_REVEAL_HAND` / `DUEL_REVEAL_DRAW` - Copy hands or offers to the game room
    /// - `DUEL_SHOW_PRIVATE` - Print private channels too (default: false)
    /// - `DUEL_LOG_DIR` - Directory for a diagnostics log file (default: none)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        config.characters = PerSide::new(read("DUEL_CHALLENGER"), read("DUEL_CHALLENGED"));
        for (side, key) in [
            (Side::Challenger, "DUEL_CHALLENGER_NAME"),
            (Side::Challenged, "DUEL_CHALLENGED_NAME"),
        ] {
            if let Some(name) = read(key) {
                config.players[side] = name;
            }
        }

        config.seed = parse(read("DUEL_SEED"));
        if let Some(limit) = parse::<u32>(read("DUEL_TURN_LIMIT")) {
            config.turn_limit = limit.max(1);
        }
        if let Some(ms) = parse::<u64>(read("DUEL_TURN_DURATION_MS")) {
            config.turn_duration = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = parse::<u64>(read("DUEL_TEXT_DELAY_MS")) {
            config.text_delay = Duration::from_millis(ms);
        }

        // Setting a flag without a value also turns it on.
        let flag = |key: &str| match lookup(key) {
            Some(value) if value.trim().is_empty() => true,
            value => parse::<bool>(value).unwrap_or(false),
        };
        config.reveal_hand = flag("DUEL_REVEAL_HAND");
        config.reveal_draw = flag("DUEL_REVEAL_DRAW");
        config.show_private = flag("DUEL_SHOW_PRIVATE");

        config.log_dir = read("DUEL_LOG_DIR").map(PathBuf::from);
        config
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            battle: BattleConfig::with_turn_limit(self.turn_limit),
            turn_duration: self.turn_duration,
            text_delay: self.text_delay,
            seed: self.seed,
            reveal_hand: self.reveal_hand,
            reveal_draw: self.reveal_draw,
            players: self.players.clone(),
            event_buffer_size: 1024,
            ..MatchConfig::default()
        }
    }
}

fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value?.trim().parse().ok()
}
