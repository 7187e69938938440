//! Battle rule tuning loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`BattleConfig`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load rule tuning from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.damage_roll_min_pct > 100 {
            anyhow::bail!(
                "damage_roll_min_pct must be at most 100, got {}",
                config.damage_roll_min_pct
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse("stab_pct = 125\n").expect("valid config");
        assert_eq!(config.stab_pct, 125);
        assert_eq!(config.crit_base_bp, BattleConfig::DEFAULT_CRIT_BASE_BP);
    }

    #[test]
    fn rejects_roll_floor_above_hundred() {
        assert!(ConfigLoader::parse("damage_roll_min_pct = 120\n").is_err());
    }
}
