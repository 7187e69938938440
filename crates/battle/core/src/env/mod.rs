//! Read-only content the engine consults while resolving turns.
//!
//! Oracles expose creature templates, skills, bosses, encounters, items, the
//! type chart, and rule tuning. The [`BattleEnv`] handle bundles them so the
//! resolver reaches everything through one borrowed reference without knowing
//! where the data came from.
mod data;
mod error;
mod oracles;
mod rng;

pub use data::{
    BossTemplate, CreatureTemplate, DropEntry, EffectDescriptor, EncounterMember, EncounterSlot,
    ItemData, ItemKind, LearnEntry, SkillCategory, SkillData,
};
pub use error::OracleError;
pub use oracles::{
    BossOracle, ContentCatalog, CreatureOracle, EncounterOracle, ItemOracle, RulesOracle,
    SkillOracle, TypeChartOracle,
};
pub use rng::{BattleRng, PcgRng, mix_seed};

use crate::config::BattleConfig;
use crate::state::{BossId, CreatureId, Element, ItemId, SkillId};

/// Borrowed view over a content catalog.
#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    catalog: &'a dyn ContentCatalog,
}

impl<'a> BattleEnv<'a> {
    pub fn new(catalog: &'a dyn ContentCatalog) -> Self {
        Self { catalog }
    }

    pub fn creature(&self, id: CreatureId) -> Result<&'a CreatureTemplate, OracleError> {
        self.catalog
            .creature(id)
            .ok_or(OracleError::CreatureNotFound(id))
    }

    pub fn skill(&self, id: SkillId) -> Result<&'a SkillData, OracleError> {
        self.catalog.skill(id).ok_or(OracleError::SkillNotFound(id))
    }

    pub fn boss(&self, id: BossId) -> Result<&'a BossTemplate, OracleError> {
        self.catalog.boss(id).ok_or(OracleError::BossNotFound(id))
    }

    pub fn encounter(&self, slot: u32) -> Result<&'a EncounterSlot, OracleError> {
        self.catalog
            .encounter(slot)
            .ok_or(OracleError::EncounterNotFound(slot))
    }

    pub fn item(&self, id: ItemId) -> Result<&'a ItemData, OracleError> {
        self.catalog.item(id).ok_or(OracleError::ItemNotFound(id))
    }

    /// Effectiveness of `attack` against `defend`, in percent.
    pub fn effectiveness(&self, attack: Element, defend: Element) -> u32 {
        self.catalog.effectiveness(attack, defend)
    }

    pub fn rules(&self) -> &'a BattleConfig {
        self.catalog.rules()
    }
}

impl core::fmt::Debug for BattleEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BattleEnv").finish_non_exhaustive()
    }
}
