//! Boss template loader.

use std::path::Path;

use battle_core::BossTemplate;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, parse_ron, read_file};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossCatalog {
    pub bosses: Vec<BossTemplate>,
}

pub struct BossLoader;

impl BossLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<BossTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<BossTemplate>> {
        let catalog: BossCatalog = parse_ron(content, "boss catalog")?;
        for boss in &catalog.bosses {
            if boss.skills.is_empty() {
                anyhow::bail!("boss {} ({}) has no skills", boss.name, boss.id);
            }
            if let Some(entry) = boss.drops.iter().find(|d| d.chance > 100) {
                anyhow::bail!(
                    "boss {} drops {} with chance {} above 100",
                    boss.name,
                    entry.item,
                    entry.chance
                );
            }
        }
        Ok(catalog.bosses)
    }
}
