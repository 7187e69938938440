//! Data-driven battle content and loaders.
//!
//! This crate provides the read-only configuration the battle engine consults:
//! - Creature species (RON)
//! - Skills with embedded effect descriptors (RON)
//! - Bosses and NPC encounter slots (RON)
//! - Items (RON)
//! - The elemental type chart (RON)
//! - Rule tuning (`config.toml`)
//!
//! Everything is collected into a [`Catalog`], which implements every oracle
//! trait from `battle-core` and never appears in battle state.

pub mod catalog;
pub mod loaders;

pub use catalog::{Catalog, TypeChart, TypeChartEntry};
pub use loaders::{
    BossLoader, ConfigLoader, ContentFactory, CreatureLoader, EncounterLoader, ItemLoader,
    LoadResult, SkillLoader, TypeChartLoader,
};
