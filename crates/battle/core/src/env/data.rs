//! Content records served by the oracles.

use strum::{Display, FromRepr, IntoStaticStr};

use crate::state::{BaseStats, BossId, CreatureId, EffectId, Element, ItemId, SkillId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, FromRepr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SkillCategory {
    Physical = 0,
    Special = 1,
    /// Deals no direct damage.
    Status = 2,
}

/// Reference to a registry effect plus its integer arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDescriptor {
    pub id: EffectId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub args: Vec<i32>,
}

impl EffectDescriptor {
    pub fn new(id: u32, args: &[i32]) -> Self {
        Self {
            id: EffectId(id),
            args: args.to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillData {
    pub id: SkillId,
    pub name: String,
    pub element: Element,
    pub category: SkillCategory,
    pub power: u32,
    /// Base hit chance in percent.
    pub accuracy: u32,
    pub max_uses: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: i8,
    /// Skips the hit roll entirely.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sure_hit: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effect: Option<EffectDescriptor>,
}

impl SkillData {
    pub fn is_damaging(&self) -> bool {
        self.category != SkillCategory::Status && self.power > 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LearnEntry {
    pub level: u8,
    pub skill: SkillId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureTemplate {
    pub id: CreatureId,
    pub name: String,
    pub element: Element,
    pub base_hp: u32,
    pub base: BaseStats,
    /// Capture rate in `[1, 255]`.
    pub catch_rate: u32,
    pub base_exp: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub learnset: Vec<LearnEntry>,
    /// Passive effects attached at battle start.
    #[cfg_attr(feature = "serde", serde(default))]
    pub abilities: Vec<EffectDescriptor>,
}

impl CreatureTemplate {
    /// The four most recently learned skills available at `level`.
    pub fn skills_at(&self, level: u8) -> Vec<SkillId> {
        let mut known: Vec<&LearnEntry> =
            self.learnset.iter().filter(|e| e.level <= level).collect();
        known.sort_by_key(|e| e.level);
        let skip = known.len().saturating_sub(crate::BattleConfig::MAX_SKILLS);
        known.into_iter().skip(skip).map(|e| e.skill).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropEntry {
    pub item: ItemId,
    /// Drop chance in percent.
    pub chance: u32,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossTemplate {
    pub id: BossId,
    pub name: String,
    pub species: CreatureId,
    pub level: u8,
    /// Individual value applied to every stat.
    #[cfg_attr(feature = "serde", serde(default))]
    pub iv: u8,
    /// Overrides the computed max HP.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_hp: Option<u32>,
    pub skills: Vec<SkillId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub abilities: Vec<EffectDescriptor>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub drops: Vec<DropEntry>,
    pub exp: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterMember {
    pub species: CreatureId,
    pub level: u8,
    /// Empty means "use the learnset".
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<SkillId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterSlot {
    pub slot: u32,
    pub name: String,
    pub party: Vec<EncounterMember>,
    /// Wild encounters may be captured; trainer parties may not.
    #[cfg_attr(feature = "serde", serde(default))]
    pub wild: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    /// Capture device with a multiplier in percent.
    Capture { bonus_pct: u32 },
    Heal { amount: u32 },
    RestoreUses { amount: u8 },
    Cure,
    /// Revives a fainted party member with a percentage of max HP.
    Revive { percent: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemData {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
}
