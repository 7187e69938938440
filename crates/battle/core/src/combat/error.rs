//! Command validation errors.
//!
//! Returned before any state is touched: a rejected command leaves the battle
//! exactly as it was.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{BossId, CatchTime, ItemId, SkillId};

/// Why a switch target was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetIssue {
    NotOwned,
    AlreadyActive,
    Fainted,
}

impl TargetIssue {
    pub const fn as_str(self) -> &'static str {
        match self {
            TargetIssue::NotOwned => "not in party",
            TargetIssue::AlreadyActive => "already active",
            TargetIssue::Fainted => "fainted",
        }
    }
}

// ============================================================================
// Command Errors
// ============================================================================

/// Errors produced while validating a battle command.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandError {
    /// The owner has no creature able to fight.
    #[error("no healthy combatant")]
    NoHealthyCombatant,

    /// The skill is not equipped or has no uses left.
    #[error("skill {0} unavailable")]
    SkillUnavailable(SkillId),

    #[error("cannot switch to {0}: {issue}", issue = .1.as_str())]
    InvalidTarget(CatchTime, TargetIssue),

    /// The active combatant is bound and cannot leave the field.
    #[error("active combatant is trapped")]
    Trapped,

    /// The command does not apply to this kind of battle.
    #[error("command not applicable in this battle")]
    NotApplicable,

    #[error("item {0} unavailable")]
    ItemUnavailable(ItemId),

    #[error("no active battle")]
    NoActiveBattle,

    #[error("battle already finished")]
    BattleFinished,

    /// This side already has an action queued for the turn.
    #[error("action already submitted")]
    AlreadySubmitted,

    /// A fainted combatant must be replaced before anything else.
    #[error("a replacement must be sent first")]
    AwaitingSwitch,

    /// Only the side that must replace a fainted combatant may act.
    #[error("waiting for the opponent to send a replacement")]
    OpponentSwitching,

    /// The player is already fighting.
    #[error("already in battle")]
    AlreadyInBattle,

    #[error("unknown boss {0}")]
    UnknownBoss(BossId),

    #[error("unknown encounter slot {0}")]
    UnknownEncounter(u32),
}

impl GameError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        use CommandError::*;
        match self {
            NoHealthyCombatant | SkillUnavailable(_) | InvalidTarget(..) | NotApplicable => {
                ErrorSeverity::Validation
            }
            ItemUnavailable(_) | UnknownBoss(_) | UnknownEncounter(_) => ErrorSeverity::Validation,
            Trapped | AlreadySubmitted | AwaitingSwitch | OpponentSwitching => {
                ErrorSeverity::Recoverable
            }
            NoActiveBattle | BattleFinished | AlreadyInBattle => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        use CommandError::*;
        match self {
            NoHealthyCombatant => "BATTLE_NO_HEALTHY_COMBATANT",
            SkillUnavailable(_) => "BATTLE_SKILL_UNAVAILABLE",
            InvalidTarget(..) => "BATTLE_INVALID_TARGET",
            Trapped => "BATTLE_TRAPPED",
            NotApplicable => "BATTLE_NOT_APPLICABLE",
            ItemUnavailable(_) => "BATTLE_ITEM_UNAVAILABLE",
            NoActiveBattle => "BATTLE_NO_ACTIVE_BATTLE",
            BattleFinished => "BATTLE_FINISHED",
            AlreadySubmitted => "BATTLE_ALREADY_SUBMITTED",
            AwaitingSwitch => "BATTLE_AWAITING_SWITCH",
            OpponentSwitching => "BATTLE_OPPONENT_SWITCHING",
            AlreadyInBattle => "BATTLE_ALREADY_IN_BATTLE",
            UnknownBoss(_) => "BATTLE_UNKNOWN_BOSS",
            UnknownEncounter(_) => "BATTLE_UNKNOWN_ENCOUNTER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            CommandError::SkillUnavailable(SkillId(3)).error_code(),
            "BATTLE_SKILL_UNAVAILABLE"
        );
        assert_eq!(
            CommandError::InvalidTarget(CatchTime(9), TargetIssue::Fainted).to_string(),
            "cannot switch to CatchTime#9: fainted"
        );
        assert!(CommandError::AlreadySubmitted.severity().is_recoverable());
    }
}
