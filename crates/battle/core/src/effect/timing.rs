use strum::{Display, EnumIter, IntoStaticStr};

/// Fixed points in a turn where attached effects may run, in firing order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Timing {
    /// Once per combatant, the first time it takes the field.
    BattleStart,
    TurnStart,
    BeforeSpeedCheck,
    BeforeHitCheck,
    AfterHitCheck,
    BeforeCritCheck,
    AfterCritCheck,
    BeforeDamageCalc,
    AfterDamageCalc,
    AfterDamageApply,
    TurnEnd,
}

impl Timing {
    /// Phases that run inside one attacker's action, where attacker and
    /// defender roles are meaningful.
    pub const fn is_attack_phase(self) -> bool {
        !matches!(
            self,
            Timing::BattleStart | Timing::TurnStart | Timing::TurnEnd
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn eleven_phases_in_declared_order() {
        let phases: Vec<Timing> = Timing::iter().collect();
        assert_eq!(phases.len(), 11);
        assert!(phases.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(phases[0], Timing::BattleStart);
        assert_eq!(phases[10], Timing::TurnEnd);
    }
}
