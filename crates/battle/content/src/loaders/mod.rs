//! Content loaders for reading battle data from files.
//!
//! Each loader turns one RON or TOML file into plain `battle-core` records.
//! [`ContentFactory`] ties them together for a data directory.

pub mod bosses;
pub mod config;
pub mod creatures;
pub mod encounters;
pub mod factory;
pub mod items;
pub mod skills;
pub mod type_chart;

pub use bosses::BossLoader;
pub use config::ConfigLoader;
pub use creatures::CreatureLoader;
pub use encounters::EncounterLoader;
pub use factory::ContentFactory;
pub use items::ItemLoader;
pub use skills::SkillLoader;
pub use type_chart::TypeChartLoader;

use std::path::Path;

use serde::de::DeserializeOwned;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Parses RON text, naming `what` in the error.
pub(crate) fn parse_ron<T: DeserializeOwned>(content: &str, what: &str) -> LoadResult<T> {
    ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse {} RON: {}", what, e))
}
