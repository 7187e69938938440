//! Event types for each topic.

use battle_core::{
    Ailment, AttackReport, BattleId, BattleMode, BattleOutcome, BattlePhase, CatchTime, Combatant,
    CreatureId, DamageCause, ItemId, PlayerId, PreventReason, Side, StatKind,
};
use serde::Serialize;

use crate::rewards::RewardPayload;

/// Public view of a combatant for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatantView {
    pub catch_time: CatchTime,
    pub species: CreatureId,
    pub name: String,
    pub level: u8,
    pub hp: u32,
    pub max_hp: u32,
}

impl From<&Combatant> for CombatantView {
    fn from(combatant: &Combatant) -> Self {
        Self {
            catch_time: combatant.catch_time,
            species: combatant.species,
            name: combatant.name.clone(),
            level: combatant.level,
            hp: combatant.hp(),
            max_hp: combatant.max_hp(),
        }
    }
}

/// Round-level events for clients rendering a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BattleEvent {
    BattleStarted {
        battle: BattleId,
        mode: BattleMode,
        home: CombatantView,
        away: CombatantView,
    },
    RoundStarted {
        battle: BattleId,
        turn: u32,
    },
    AttackResolved {
        battle: BattleId,
        turn: u32,
        attack: AttackReport,
    },
    Damaged {
        battle: BattleId,
        side: Side,
        amount: u32,
        cause: DamageCause,
    },
    Healed {
        battle: BattleId,
        side: Side,
        amount: u32,
    },
    Prevented {
        battle: BattleId,
        side: Side,
        reason: PreventReason,
    },
    AilmentApplied {
        battle: BattleId,
        side: Side,
        ailment: Ailment,
    },
    AilmentCleared {
        battle: BattleId,
        side: Side,
        ailment: Ailment,
    },
    StageChanged {
        battle: BattleId,
        side: Side,
        stat: StatKind,
        delta: i8,
    },
    Switched {
        battle: BattleId,
        side: Side,
        catch_time: CatchTime,
    },
    Fainted {
        battle: BattleId,
        side: Side,
        catch_time: CatchTime,
    },
    ItemUsed {
        battle: BattleId,
        side: Side,
        item: ItemId,
    },
    /// `chance` is in percent.
    CaptureAttempted {
        battle: BattleId,
        side: Side,
        chance: u32,
        success: bool,
    },
    RoundEnded {
        battle: BattleId,
        turn: u32,
        phase: BattlePhase,
        /// Set once the battle is decided.
        winner: Option<Side>,
    },
}

impl BattleEvent {
    pub fn battle(&self) -> BattleId {
        match self {
            BattleEvent::BattleStarted { battle, .. }
            | BattleEvent::RoundStarted { battle, .. }
            | BattleEvent::AttackResolved { battle, .. }
            | BattleEvent::Damaged { battle, .. }
            | BattleEvent::Healed { battle, .. }
            | BattleEvent::Prevented { battle, .. }
            | BattleEvent::AilmentApplied { battle, .. }
            | BattleEvent::AilmentCleared { battle, .. }
            | BattleEvent::StageChanged { battle, .. }
            | BattleEvent::Switched { battle, .. }
            | BattleEvent::Fainted { battle, .. }
            | BattleEvent::ItemUsed { battle, .. }
            | BattleEvent::CaptureAttempted { battle, .. }
            | BattleEvent::RoundEnded { battle, .. } => *battle,
        }
    }
}

/// Battle lifecycle for reward and achievement subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OutcomeEvent {
    BattleStarted {
        battle: BattleId,
        mode: BattleMode,
        players: Vec<PlayerId>,
    },
    BattleEnded {
        battle: BattleId,
        outcome: BattleOutcome,
        /// Rounds resolved before the battle ended.
        rounds: u32,
        /// Payout for the home player; empty on a loss or in PvP.
        rewards: RewardPayload,
    },
}

/// Invite traffic between players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LobbyEvent {
    InviteSent { from: PlayerId, to: PlayerId },
    InviteAccepted { from: PlayerId, to: PlayerId, battle: BattleId },
    InviteDeclined { from: PlayerId, to: PlayerId },
    InviteCancelled { from: PlayerId, to: PlayerId },
}
