//! Content factory for building a catalog from data files.

use std::path::{Path, PathBuf};

use battle_core::{BattleConfig, BossTemplate, CreatureTemplate, EncounterSlot, ItemData, SkillData};
use tracing::info;

use crate::catalog::{Catalog, TypeChart};
use crate::loaders::{
    BossLoader, ConfigLoader, CreatureLoader, EncounterLoader, ItemLoader, LoadResult, SkillLoader,
    TypeChartLoader,
};

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── creatures.ron
/// ├── skills.ron
/// ├── bosses.ron
/// ├── encounters.ron
/// ├── items.ron
/// └── type_chart.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load rule tuning from `config.toml`.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    pub fn load_creatures(&self) -> LoadResult<Vec<CreatureTemplate>> {
        CreatureLoader::load(&self.data_dir.join("creatures.ron"))
    }

    pub fn load_skills(&self) -> LoadResult<Vec<SkillData>> {
        SkillLoader::load(&self.data_dir.join("skills.ron"))
    }

    pub fn load_bosses(&self) -> LoadResult<Vec<BossTemplate>> {
        BossLoader::load(&self.data_dir.join("bosses.ron"))
    }

    pub fn load_encounters(&self) -> LoadResult<Vec<EncounterSlot>> {
        EncounterLoader::load(&self.data_dir.join("encounters.ron"))
    }

    /// Load item catalog from `items.ron`.
    pub fn load_items(&self) -> LoadResult<Vec<ItemData>> {
        ItemLoader::load(&self.data_dir.join("items.ron"))
    }

    pub fn load_type_chart(&self) -> LoadResult<TypeChart> {
        TypeChartLoader::load(&self.data_dir.join("type_chart.ron"))
    }

    /// Loads every file and checks cross references.
    pub fn load_catalog(&self) -> LoadResult<Catalog> {
        let mut catalog = Catalog::new();
        catalog.set_rules(self.load_config()?);
        catalog.set_type_chart(self.load_type_chart()?);
        for creature in self.load_creatures()? {
            catalog.add_creature(creature);
        }
        for skill in self.load_skills()? {
            catalog.add_skill(skill);
        }
        for boss in self.load_bosses()? {
            catalog.add_boss(boss);
        }
        for encounter in self.load_encounters()? {
            catalog.add_encounter(encounter);
        }
        for item in self.load_items()? {
            catalog.add_item(item);
        }
        catalog.check_references()?;

        info!(
            target: "battle::content",
            dir = %self.data_dir.display(),
            creatures = catalog.creatures().count(),
            skills = catalog.skills().count(),
            bosses = catalog.bosses().count(),
            "content loaded"
        );
        Ok(catalog)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_directory_names_the_file() {
        let factory = ContentFactory::new("/nonexistent/battle-data");
        let err = factory.load_catalog().expect_err("no files");
        assert!(err.to_string().contains("config.toml"));
    }
}
