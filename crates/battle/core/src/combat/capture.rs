//! Capture odds.

use crate::state::Combatant;

/// Capture chance in percent.
///
/// `(3 * max - 2 * hp) / (3 * max) * catch_rate / 255`, scaled by the item
/// bonus and the target's ailment bonus (both in percent).
pub fn capture_chance(target: &Combatant, catch_rate: u32, item_bonus_pct: u32) -> u32 {
    if target.is_fainted() {
        return 0;
    }
    let max = u64::from(target.max_hp());
    let hp = u64::from(target.hp());
    let ailment_pct = target
        .ailment()
        .map_or(100, |state| state.kind.capture_bonus_pct());

    let odds = (3 * max - 2 * hp)
        * u64::from(catch_rate.min(255))
        * u64::from(item_bonus_pct)
        * u64::from(ailment_pct)
        * 100;
    let scale = 3 * max * 255 * 100 * 100;
    (odds / scale).min(100) as u32
}
