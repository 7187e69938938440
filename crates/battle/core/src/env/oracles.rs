use super::data::{BossTemplate, CreatureTemplate, EncounterSlot, ItemData, SkillData};
use crate::config::BattleConfig;
use crate::state::{BossId, CreatureId, Element, ItemId, SkillId};

pub trait CreatureOracle: Send + Sync {
    fn creature(&self, id: CreatureId) -> Option<&CreatureTemplate>;
}

pub trait SkillOracle: Send + Sync {
    fn skill(&self, id: SkillId) -> Option<&SkillData>;
}

pub trait BossOracle: Send + Sync {
    fn boss(&self, id: BossId) -> Option<&BossTemplate>;
}

/// NPC encounters keyed by map slot.
pub trait EncounterOracle: Send + Sync {
    fn encounter(&self, slot: u32) -> Option<&EncounterSlot>;
}

pub trait ItemOracle: Send + Sync {
    fn item(&self, id: ItemId) -> Option<&ItemData>;
}

/// Elemental matchups.
pub trait TypeChartOracle: Send + Sync {
    /// Damage multiplier in percent. Unlisted matchups are neutral (100).
    fn effectiveness(&self, attack: Element, defend: Element) -> u32;
}

pub trait RulesOracle: Send + Sync {
    fn rules(&self) -> &BattleConfig;
}

/// Everything the engine reads from content, as a single object.
pub trait ContentCatalog:
    CreatureOracle
    + SkillOracle
    + BossOracle
    + EncounterOracle
    + ItemOracle
    + TypeChartOracle
    + RulesOracle
{
}

impl<T> ContentCatalog for T where
    T: CreatureOracle
        + SkillOracle
        + BossOracle
        + EncounterOracle
        + ItemOracle
        + TypeChartOracle
        + RulesOracle
{
}
