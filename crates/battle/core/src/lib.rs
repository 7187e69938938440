//! Deterministic creature-battle rules shared by content loaders and the server.
//!
//! `battle-core` defines the combat data model ([`state`]), the atomic effect
//! library and its dispatch pipeline ([`effect`]), and the turn resolver
//! ([`combat`]). It performs no I/O: balance data arrives through the oracle
//! traits in [`env`], and every externally visible consequence of a turn is
//! recorded as a [`Notice`] in the returned [`TurnReport`].
pub mod combat;
pub mod config;
pub mod effect;
pub mod env;
pub mod error;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use combat::{
    AttackReport, BattleAction, CommandError, CreatureSpec, TurnIntent, TurnReport, TurnResolver,
    capture_chance, spawn_boss, spawn_creature,
};
pub use config::BattleConfig;
pub use effect::{
    ActionContext, Applied, DamageCause, Effect, EffectArgs, EffectBuildError, EffectFactory,
    EffectPipeline, EffectRegistry, Notice, PreventReason, Role, Timing,
};
pub use env::{
    BattleEnv, BattleRng, BossTemplate, ContentCatalog, CreatureTemplate, DropEntry,
    EffectDescriptor, EncounterSlot, ItemData, ItemKind, OracleError, SkillCategory, SkillData,
};
pub use error::{ErrorSeverity, GameError};
pub use state::{
    AilmentState, BattleMode, BattleOutcome, BattlePhase, BattleSide, BattleState, BaseStats,
    CatchTime, Combatant, CreatureId, EffectId, Element, ItemId, PlayerId, ScratchMap, Side,
    SideOwner, SkillId, StatKind, StatStages, BossId, BattleId, Ailment,
};
