//! Deterministic randomness for battle rolls.
//!
//! Every roll in a battle draws from one [`BattleRng`] owned by the battle
//! state. The stream is a pure function of `(seed, draw index)`, so a battle
//! replayed with the same seed and the same commands produces the same log.

/// PCG-XSH-RR output over a 64-bit LCG step.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    pub fn next_u32(state: u64) -> u32 {
        let state = state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

/// Mixes the battle seed with a draw index into an independent PCG state.
pub fn mix_seed(seed: u64, draw: u64) -> u64 {
    let mut hash = seed ^ draw.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xc4ceb9fe1a85ec53);
    hash ^= hash >> 33;
    hash
}

/// Seeded roll source for one battle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleRng {
    seed: u64,
    draws: u64,
}

impl BattleRng {
    pub fn new(seed: u64) -> Self {
        Self { seed, draws: 0 }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn next_u32(&mut self) -> u32 {
        let value = PcgRng::next_u32(mix_seed(self.seed, self.draws));
        self.draws += 1;
        value
    }

    /// Uniform value in `[min, max]`.
    pub fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let span = (max - min) as u64 + 1;
        min + (self.next_u32() as u64 % span) as u32
    }

    /// 1..=100 inclusive.
    pub fn roll_d100(&mut self) -> u32 {
        self.range(1, 100)
    }

    /// True with probability `pct`/100. Certain outcomes draw nothing.
    pub fn chance(&mut self, pct: u32) -> bool {
        match pct {
            0 => false,
            100.. => true,
            _ => self.roll_d100() <= pct,
        }
    }

    /// True with probability `bp`/10000.
    pub fn chance_bp(&mut self, bp: u32) -> bool {
        match bp {
            0 => false,
            10_000.. => true,
            _ => self.range(1, 10_000) <= bp,
        }
    }

    /// Picks one element uniformly.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.range(0, items.len() as u32 - 1) as usize;
        items.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = BattleRng::new(42);
        let mut b = BattleRng::new(42);
        let xs: Vec<u32> = (0..32).map(|_| a.next_u32()).collect();
        let ys: Vec<u32> = (0..32).map(|_| b.next_u32()).collect();
        assert_eq!(xs, ys);
        assert_eq!(a.draws(), 32);

        let mut c = BattleRng::new(43);
        let zs: Vec<u32> = (0..32).map(|_| c.next_u32()).collect();
        assert_ne!(xs, zs);
    }

    #[test]
    fn range_stays_in_bounds() {
        let mut rng = BattleRng::new(7);
        for _ in 0..1_000 {
            let v = rng.range(85, 100);
            assert!((85..=100).contains(&v));
        }
        assert_eq!(rng.range(5, 5), 5);
        assert_eq!(rng.range(9, 3), 9);
    }

    #[test]
    fn certain_chances_do_not_draw() {
        let mut rng = BattleRng::new(1);
        assert!(rng.chance(100));
        assert!(!rng.chance(0));
        assert!(rng.chance_bp(10_000));
        assert_eq!(rng.draws(), 0);
    }
}
