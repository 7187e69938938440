//! Server settings read from the environment.
use std::env;
use std::path::PathBuf;

use battle_core::BattleId;
use battle_core::env::mix_seed;

/// Channel sizes, content location, and battle seeding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Capacity of each event bus topic.
    pub event_buffer: usize,
    /// Capacity of each player's command channel.
    pub command_buffer: usize,
    /// Directory holding the content pack. `None` uses the bundled pack.
    pub content_dir: Option<PathBuf>,
    /// Fixed seed for reproducible battles. Each battle mixes in its id.
    pub rng_seed: Option<u64>,
}

impl ServerConfig {
    pub const DEFAULT_EVENT_BUFFER: usize = 256;
    pub const DEFAULT_COMMAND_BUFFER: usize = 32;

    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("BATTLE_EVENT_BUFFER") {
            config.event_buffer = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("BATTLE_COMMAND_BUFFER") {
            config.command_buffer = capacity.max(1);
        }
        if let Some(dir) = read_env::<PathBuf>("BATTLE_CONTENT_DIR") {
            config.content_dir = Some(dir);
        }
        if let Some(seed) = read_env::<u64>("BATTLE_RNG_SEED") {
            config.rng_seed = Some(seed);
        }

        config
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Seed for one battle's roll stream.
    pub fn seed_for(&self, battle: BattleId) -> u64 {
        match self.rng_seed {
            Some(seed) => mix_seed(seed, battle.0),
            None => rand::random(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            event_buffer: Self::DEFAULT_EVENT_BUFFER,
            command_buffer: Self::DEFAULT_COMMAND_BUFFER,
            content_dir: None,
            rng_seed: None,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_seed_is_stable_per_battle() {
        let config = ServerConfig::default().with_rng_seed(42);
        assert_eq!(config.seed_for(BattleId(1)), config.seed_for(BattleId(1)));
        assert_ne!(config.seed_for(BattleId(1)), config.seed_for(BattleId(2)));
    }
}
