//! Damage, accuracy and critical-hit arithmetic.
//!
//! All functions are integer-only and saturate instead of overflowing.

use crate::config::BattleConfig;
use crate::state::apply_accuracy_stage;

/// `((2L/5 + 2) * P * A / D) / 50 + 2`. Zero power deals no damage.
pub fn base_damage(level: u8, power: u32, attack: u32, defense: u32) -> u32 {
    if power == 0 {
        return 0;
    }
    let level_factor = 2 * u64::from(level) / 5 + 2;
    let raw = level_factor * u64::from(power) * u64::from(attack.max(1)) / u64::from(defense.max(1));
    (raw / 50 + 2).min(u64::from(u32::MAX)) as u32
}

/// Multipliers applied on top of [`base_damage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRolls {
    pub same_element: bool,
    pub effectiveness: u32,
    pub critical: bool,
    /// Random roll in percent, `damage_roll_min_pct..=100`.
    pub roll: u32,
}

/// Applies STAB, effectiveness, critical and the random roll in that order.
///
/// Anything that connects for non-zero effectiveness deals at least 1.
pub fn final_damage(base: u32, rolls: DamageRolls, rules: &BattleConfig) -> u32 {
    if base == 0 || rolls.effectiveness == 0 {
        return 0;
    }
    let mut damage = u64::from(base);
    if rolls.same_element {
        damage = damage * u64::from(rules.stab_pct) / 100;
    }
    damage = damage * u64::from(rolls.effectiveness) / 100;
    if rolls.critical {
        damage = damage * u64::from(rules.crit_multiplier_pct) / 100;
    }
    damage = damage * u64::from(rolls.roll) / 100;
    damage.clamp(1, u64::from(u32::MAX)) as u32
}

/// Stage-adjusted accuracy plus `delta`, clamped to 0..=100.
pub fn hit_chance(accuracy: u32, stage: i8, delta: i32) -> u32 {
    let adjusted = i64::from(apply_accuracy_stage(accuracy, stage)) + i64::from(delta);
    adjusted.clamp(0, 100) as u32
}

/// Critical chance in basis points: base plus delta, never negative.
pub fn crit_chance_bp(base_bp: u32, delta: i32) -> u32 {
    (i64::from(base_bp) + i64::from(delta)).clamp(0, 10_000) as u32
}
