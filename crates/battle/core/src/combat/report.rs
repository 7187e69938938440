use crate::effect::{AttackFlags, Notice};
use crate::state::{BattleOutcome, BattlePhase, CatchTime, Side, SkillId};

/// Summary of one attack.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AttackReport {
    pub side: Side,
    pub skill: SkillId,
    pub flags: AttackFlags,
    /// HP the attack removed from the defender.
    pub damage: u32,
    /// Type effectiveness in percent.
    pub effectiveness: u32,
    /// The attacker acted before its opponent this turn.
    pub moved_first: bool,
}

impl AttackReport {
    pub fn is_crit(&self) -> bool {
        self.flags.contains(AttackFlags::CRIT)
    }

    pub fn missed(&self) -> bool {
        self.flags.contains(AttackFlags::MISS)
    }
}

/// Everything that happened in one resolved turn.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TurnReport {
    pub turn: u32,
    /// Attacks in the order they were resolved.
    pub attacks: Vec<AttackReport>,
    pub notices: Vec<Notice>,
    /// Phase after the turn settled.
    pub phase: BattlePhase,
}

impl TurnReport {
    pub fn new(turn: u32) -> Self {
        Self {
            turn,
            attacks: Vec::new(),
            notices: Vec::new(),
            phase: BattlePhase::Ongoing,
        }
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.phase {
            BattlePhase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Creatures that fainted this turn, in order.
    pub fn fainted(&self) -> impl Iterator<Item = (Side, CatchTime)> + '_ {
        self.notices.iter().filter_map(|notice| match notice {
            Notice::Fainted { side, catch_time } => Some((*side, *catch_time)),
            _ => None,
        })
    }

    /// Side order in which attacks resolved.
    pub fn order(&self) -> Vec<Side> {
        self.attacks.iter().map(|attack| attack.side).collect()
    }
}
