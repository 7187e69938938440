//! Skill catalog loader.

use std::path::Path;

use battle_core::SkillData;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, parse_ron, read_file};

/// Skill catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCatalog {
    pub skills: Vec<SkillData>,
}

/// Loader for the skill catalog.
pub struct SkillLoader;

impl SkillLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<SkillData>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<SkillData>> {
        let catalog: SkillCatalog = parse_ron(content, "skill catalog")?;
        for skill in &catalog.skills {
            if skill.max_uses == 0 {
                anyhow::bail!("skill {} ({}) has no uses", skill.name, skill.id);
            }
            if skill.accuracy > 100 {
                anyhow::bail!(
                    "skill {} ({}) has accuracy {} above 100",
                    skill.name,
                    skill.id,
                    skill.accuracy
                );
            }
        }
        Ok(catalog.skills)
    }
}
