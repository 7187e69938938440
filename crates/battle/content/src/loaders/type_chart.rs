//! Type chart loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{TypeChart, TypeChartEntry};
use crate::loaders::{LoadResult, parse_ron, read_file};

/// Type chart structure for RON files. Only non-neutral matchups are listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeChartFile {
    pub matchups: Vec<TypeChartEntry>,
}

pub struct TypeChartLoader;

impl TypeChartLoader {
    pub fn load(path: &Path) -> LoadResult<TypeChart> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<TypeChart> {
        let file: TypeChartFile = parse_ron(content, "type chart")?;
        let mut chart = TypeChart::default();
        for entry in file.matchups {
            if chart.insert(entry).is_some() {
                anyhow::bail!(
                    "duplicate matchup {} -> {}",
                    entry.attack,
                    entry.defend
                );
            }
        }
        Ok(chart)
    }
}
