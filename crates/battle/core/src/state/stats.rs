use strum::{Display, EnumIter, FromRepr, IntoStaticStr};

use crate::config::BattleConfig;

/// Stat axes that carry a battle stage.
///
/// Hit points are not staged and are tracked on the combatant directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, FromRepr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum StatKind {
    Attack = 0,
    Defense = 1,
    SpAttack = 2,
    SpDefense = 3,
    Speed = 4,
    Accuracy = 5,
}

impl StatKind {
    pub const ALL: [StatKind; 6] = [
        StatKind::Attack,
        StatKind::Defense,
        StatKind::SpAttack,
        StatKind::SpDefense,
        StatKind::Speed,
        StatKind::Accuracy,
    ];

    const fn slot(self) -> usize {
        self as usize
    }
}

/// Non-HP stats computed from species base values, level, and individual values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseStats {
    pub attack: u32,
    pub defense: u32,
    pub sp_attack: u32,
    pub sp_defense: u32,
    pub speed: u32,
}

impl BaseStats {
    pub const fn new(attack: u32, defense: u32, sp_attack: u32, sp_defense: u32, speed: u32) -> Self {
        Self {
            attack,
            defense,
            sp_attack,
            sp_defense,
            speed,
        }
    }

    /// Returns the raw value for `kind`. Accuracy has no raw value and reads as 100.
    pub const fn get(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::SpAttack => self.sp_attack,
            StatKind::SpDefense => self.sp_defense,
            StatKind::Speed => self.speed,
            StatKind::Accuracy => 100,
        }
    }
}

/// Stage adjustments in `[-6, +6]` for each staged stat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatStages([i8; 6]);

impl StatStages {
    pub fn get(&self, kind: StatKind) -> i8 {
        self.0[kind.slot()]
    }

    /// Sets a stage, clamping into the legal range. Returns the stored value.
    pub fn set(&mut self, kind: StatKind, value: i8) -> i8 {
        let clamped = value.clamp(BattleConfig::MIN_STAGE, BattleConfig::MAX_STAGE);
        self.0[kind.slot()] = clamped;
        clamped
    }

    /// Shifts a stage by `delta` and returns the change actually applied.
    pub fn shift(&mut self, kind: StatKind, delta: i8) -> i8 {
        let before = self.get(kind);
        let after = self.set(kind, before.saturating_add(delta));
        after - before
    }

    pub fn reset(&mut self) {
        self.0 = [0; 6];
    }

    pub fn is_neutral(&self) -> bool {
        self.0.iter().all(|stage| *stage == 0)
    }

    pub fn has_positive(&self) -> bool {
        self.0.iter().any(|stage| *stage > 0)
    }

    pub fn has_negative(&self) -> bool {
        self.0.iter().any(|stage| *stage < 0)
    }

    /// Sum of all positive stages.
    pub fn positive_total(&self) -> u32 {
        self.0.iter().filter(|s| **s > 0).map(|s| *s as u32).sum()
    }

    pub fn clear_positive(&mut self) {
        for stage in &mut self.0 {
            if *stage > 0 {
                *stage = 0;
            }
        }
    }

    pub fn clear_negative(&mut self) {
        for stage in &mut self.0 {
            if *stage < 0 {
                *stage = 0;
            }
        }
    }

    pub fn invert(&mut self) {
        for stage in &mut self.0 {
            *stage = -*stage;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKind, i8)> + '_ {
        StatKind::ALL.iter().map(|kind| (*kind, self.get(*kind)))
    }
}

/// Applies a stat stage: `(2 + s) / 2` when raised, `2 / (2 - s)` when lowered.
pub fn apply_stage(value: u32, stage: i8) -> u32 {
    let s = stage.clamp(BattleConfig::MIN_STAGE, BattleConfig::MAX_STAGE) as i64;
    let value = value as i64;
    let scaled = if s >= 0 {
        value * (2 + s) / 2
    } else {
        value * 2 / (2 - s)
    };
    scaled as u32
}

/// Applies an accuracy stage: `(3 + s) / 3` when raised, `3 / (3 - s)` when lowered.
pub fn apply_accuracy_stage(value: u32, stage: i8) -> u32 {
    let s = stage.clamp(BattleConfig::MIN_STAGE, BattleConfig::MAX_STAGE) as i64;
    let value = value as i64;
    let scaled = if s >= 0 {
        value * (3 + s) / 3
    } else {
        value * 3 / (3 - s)
    };
    scaled as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_clamps_and_reports_applied_delta() {
        let mut stages = StatStages::default();
        assert_eq!(stages.shift(StatKind::Attack, 4), 4);
        assert_eq!(stages.shift(StatKind::Attack, 4), 2);
        assert_eq!(stages.get(StatKind::Attack), 6);
        assert_eq!(stages.shift(StatKind::Attack, 1), 0);

        assert_eq!(stages.shift(StatKind::Speed, -10), -6);
        assert_eq!(stages.get(StatKind::Speed), -6);
    }

    #[test]
    fn stage_multipliers() {
        assert_eq!(apply_stage(100, 0), 100);
        assert_eq!(apply_stage(100, 2), 200);
        assert_eq!(apply_stage(100, 6), 400);
        assert_eq!(apply_stage(100, -2), 50);
        assert_eq!(apply_stage(100, -6), 25);
        assert_eq!(apply_accuracy_stage(90, -3), 45);
    }

    #[test]
    fn clear_and_invert() {
        let mut stages = StatStages::default();
        stages.set(StatKind::Attack, 2);
        stages.set(StatKind::Defense, -3);
        assert_eq!(stages.positive_total(), 2);

        stages.invert();
        assert_eq!(stages.get(StatKind::Attack), -2);
        assert_eq!(stages.get(StatKind::Defense), 3);

        stages.clear_negative();
        assert_eq!(stages.get(StatKind::Attack), 0);
        assert!(stages.has_positive());
        assert!(!stages.has_negative());
    }
}
