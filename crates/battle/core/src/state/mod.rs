//! Battle state: combatants, sides, and the session-level battle record.
mod ailment;
mod battle;
mod combatant;
mod element;
mod flags;
mod ids;
mod scratch;
mod stats;

pub use ailment::{Ailment, AilmentSet, AilmentState};
pub use battle::{
    Arena, BattleMode, BattleOutcome, BattlePhase, BattleSide, BattleState, SideOwner,
};
pub use combatant::{AttachedEffect, Combatant, EffectLifetime, LastHit, SkillSlot};
pub use element::Element;
pub use flags::{Guards, VolatileFlags};
pub use ids::{
    BattleId, BossId, CatchTime, CreatureId, EffectId, ItemId, PlayerId, Side, SkillId,
};
pub use scratch::{ScratchKey, ScratchMap, ScratchValue};
pub use stats::{BaseStats, StatKind, StatStages, apply_accuracy_stage, apply_stage};
