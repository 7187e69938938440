use crate::state::{Ailment, CatchTime, ItemId, Side, StatKind};

/// Source of HP loss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageCause {
    Attack,
    Recoil,
    Reflected,
    Residual(Ailment),
    Confusion,
    /// Damage dealt directly by an effect (bind, curse, perish...).
    Effect,
}

/// Why an attacker did not act.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PreventReason {
    Ailment(Ailment),
    Flinch,
    Recharge,
    Charging,
    /// The skill was sealed by an effect (taunt, disable).
    Sealed,
    NoUses,
}

/// Externally visible result of something that happened during a turn.
///
/// Notices are append-only; the session turns them into outbound events.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Notice {
    EffectTriggered { side: Side, effect: &'static str },
    Damaged { side: Side, amount: u32, cause: DamageCause },
    Healed { side: Side, amount: u32 },
    StageChanged { side: Side, stat: StatKind, delta: i8 },
    StagesReset { side: Side },
    AilmentApplied { side: Side, ailment: Ailment },
    AilmentCleared { side: Side, ailment: Ailment },
    Prevented { side: Side, reason: PreventReason },
    Missed { side: Side },
    Blocked { side: Side },
    Critical { side: Side },
    Fainted { side: Side, catch_time: CatchTime },
    /// A new combatant took the field.
    Switched { side: Side, catch_time: CatchTime },
    Revived { side: Side, hp: u32 },
    UsesChanged { side: Side, delta: i32 },
    ItemUsed { side: Side, item: ItemId },
    /// `chance` is in percent.
    CaptureAttempted { side: Side, chance: u32, success: bool },
    Fled { side: Side },
}

impl Notice {
    /// The side the notice is about.
    pub fn side(&self) -> Side {
        match self {
            Notice::EffectTriggered { side, .. }
            | Notice::Damaged { side, .. }
            | Notice::Healed { side, .. }
            | Notice::StageChanged { side, .. }
            | Notice::StagesReset { side }
            | Notice::AilmentApplied { side, .. }
            | Notice::AilmentCleared { side, .. }
            | Notice::Prevented { side, .. }
            | Notice::Missed { side }
            | Notice::Blocked { side }
            | Notice::Critical { side }
            | Notice::Fainted { side, .. }
            | Notice::Switched { side, .. }
            | Notice::Revived { side, .. }
            | Notice::UsesChanged { side, .. }
            | Notice::ItemUsed { side, .. }
            | Notice::CaptureAttempted { side, .. }
            | Notice::Fled { side } => *side,
        }
    }
}
