//! Seeded random stream shared by one mission build

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG service (one per mission)
#[derive(Debug, Clone)]
pub struct MissionRng {
    rng: ChaCha8Rng,
}

impl MissionRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Real number in [min, max)
    pub fn real(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Integer in [min, max] (inclusive)
    pub fn integer(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// True with probability `p`
    pub fn bool(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = MissionRng::new(42);
        let mut b = MissionRng::new(42);
        for _ in 0..20 {
            assert_eq!(a.real(0.0, 100.0), b.real(0.0, 100.0));
            assert_eq!(a.integer(0, 9), b.integer(0, 9));
        }
    }

    #[test]
    fn test_ranges_respected() {
        let mut rng = MissionRng::new(7);
        for _ in 0..200 {
            let r = rng.real(2.0, 3.0);
            assert!((2.0..3.0).contains(&r));
            let i = rng.integer(8, 30);
            assert!((8..=30).contains(&i));
        }
    }

    #[test]
    fn test_degenerate_ranges() {
        let mut rng = MissionRng::new(1);
        assert_eq!(rng.real(5.0, 5.0), 5.0);
        assert_eq!(rng.integer(3, 3), 3);
        assert!(rng.pick::<u8>(&[]).is_none());
    }
}
