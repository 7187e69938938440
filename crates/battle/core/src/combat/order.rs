//! Who acts first.

use std::cmp::Ordering;

use crate::env::BattleRng;
use crate::state::{CatchTime, CreatureId, Side};

/// Everything ordering looks at for one planned attacker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contender {
    pub side: Side,
    pub always_first: bool,
    /// Skill priority plus before-speed-check deltas.
    pub priority: i32,
    pub speed: u32,
    /// Side-independent identity used for the final tie-break.
    pub key: (CreatureId, CatchTime, u8),
}

/// Orders two contenders.
///
/// Always-first beats everything unless both have it. Then higher priority,
/// then higher effective speed. A full tie draws one roll between the
/// contenders sorted by `key`, so which side each sits on never matters.
pub fn order(a: Contender, b: Contender, rng: &mut BattleRng) -> [Side; 2] {
    let decided = match (a.always_first, b.always_first) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => a
            .priority
            .cmp(&b.priority)
            .then_with(|| a.speed.cmp(&b.speed)),
    };
    match decided {
        Ordering::Greater => [a.side, b.side],
        Ordering::Less => [b.side, a.side],
        Ordering::Equal => {
            let (low, high) = if a.key <= b.key { (a, b) } else { (b, a) };
            if rng.chance(50) {
                [low.side, high.side]
            } else {
                [high.side, low.side]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contender(side: Side, priority: i32, speed: u32, species: u32) -> Contender {
        Contender {
            side,
            always_first: false,
            priority,
            speed,
            key: (CreatureId(species), CatchTime(u64::from(species)), 50),
        }
    }

    #[test]
    fn priority_beats_speed() {
        let mut rng = BattleRng::new(1);
        let slow = contender(Side::Home, 1, 10, 1);
        let fast = contender(Side::Away, 0, 200, 2);
        assert_eq!(order(slow, fast, &mut rng), [Side::Home, Side::Away]);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn always_first_on_both_falls_back_to_priority() {
        let mut rng = BattleRng::new(1);
        let mut a = contender(Side::Home, 0, 10, 1);
        let mut b = contender(Side::Away, 2, 10, 2);
        a.always_first = true;
        assert_eq!(order(a, b, &mut rng), [Side::Home, Side::Away]);
        b.always_first = true;
        assert_eq!(order(a, b, &mut rng), [Side::Away, Side::Home]);
    }

    #[test]
    fn tie_break_ignores_sides() {
        for seed in 0..64 {
            let home = contender(Side::Home, 0, 50, 1);
            let away = contender(Side::Away, 0, 50, 2);
            let first = order(home, away, &mut BattleRng::new(seed))[0];

            let swapped_home = Contender {
                side: Side::Home,
                ..away
            };
            let swapped_away = Contender {
                side: Side::Away,
                ..home
            };
            let swapped = order(swapped_home, swapped_away, &mut BattleRng::new(seed))[0];

            // The creature with key 1 wins in both layouts or in neither.
            assert_eq!(first == Side::Home, swapped == Side::Away, "seed {seed}");
        }
    }
}
