use crate::state::{CatchTime, ItemId, SkillId};

/// What a side submits for a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleAction {
    Skill(SkillId),
    Switch(CatchTime),
    Capture(ItemId),
    UseItem(ItemId),
    Flee,
}

impl BattleAction {
    /// Actions applied before attacks resolve, leaving the side idle.
    pub const fn is_pre_turn(&self) -> bool {
        matches!(self, BattleAction::Switch(_) | BattleAction::UseItem(_))
    }
}

/// What a side does once pre-turn actions have been applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TurnIntent {
    Attack(SkillId),
    #[default]
    Idle,
}

impl TurnIntent {
    pub const fn skill(&self) -> Option<SkillId> {
        match self {
            TurnIntent::Attack(skill) => Some(*skill),
            TurnIntent::Idle => None,
        }
    }
}

impl From<BattleAction> for TurnIntent {
    fn from(action: BattleAction) -> Self {
        match action {
            BattleAction::Skill(skill) => TurnIntent::Attack(skill),
            _ => TurnIntent::Idle,
        }
    }
}
