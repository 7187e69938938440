//! Content lookup errors.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{BossId, CreatureId, ItemId, SkillId};

/// A required catalog entry is missing.
///
/// The engine cannot build a combatant or resolve an action without its
/// content, so these are configuration failures rather than bad input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("creature {0} not found")]
    CreatureNotFound(CreatureId),

    #[error("skill {0} not found")]
    SkillNotFound(SkillId),

    #[error("boss {0} not found")]
    BossNotFound(BossId),

    #[error("encounter slot {0} not found")]
    EncounterNotFound(u32),

    #[error("item {0} not found")]
    ItemNotFound(ItemId),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Configuration
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            CreatureNotFound(_) => "ORACLE_CREATURE_NOT_FOUND",
            SkillNotFound(_) => "ORACLE_SKILL_NOT_FOUND",
            BossNotFound(_) => "ORACLE_BOSS_NOT_FOUND",
            EncounterNotFound(_) => "ORACLE_ENCOUNTER_NOT_FOUND",
            ItemNotFound(_) => "ORACLE_ITEM_NOT_FOUND",
        }
    }
}
