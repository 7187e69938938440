//! NPC encounter slot loader.

use std::path::Path;

use battle_core::EncounterSlot;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, parse_ron, read_file};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterCatalog {
    pub encounters: Vec<EncounterSlot>,
}

/// Loader for NPC encounter slots keyed by map slot.
pub struct EncounterLoader;

impl EncounterLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<EncounterSlot>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<EncounterSlot>> {
        let catalog: EncounterCatalog = parse_ron(content, "encounter catalog")?;
        if let Some(empty) = catalog.encounters.iter().find(|e| e.party.is_empty()) {
            anyhow::bail!("encounter slot {} ({}) has an empty party", empty.slot, empty.name);
        }
        Ok(catalog.encounters)
    }
}
