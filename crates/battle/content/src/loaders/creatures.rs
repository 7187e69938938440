//! Creature species loader.

use std::path::Path;

use battle_core::CreatureTemplate;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, parse_ron, read_file};

/// Species catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatureCatalog {
    pub creatures: Vec<CreatureTemplate>,
}

pub struct CreatureLoader;

impl CreatureLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<CreatureTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<CreatureTemplate>> {
        let catalog: CreatureCatalog = parse_ron(content, "creature catalog")?;
        for creature in &catalog.creatures {
            if !(1..=255).contains(&creature.catch_rate) {
                anyhow::bail!(
                    "{} ({}) has catch_rate {} outside 1..=255",
                    creature.name,
                    creature.id,
                    creature.catch_rate
                );
            }
        }
        Ok(catalog.creatures)
    }
}
