//! Random helpers over any seeded `Rng`
//!
//! Ranges come straight from level data and may be reversed (`[0.2, 0.0]`)
//! or empty (`[50, 50]`); none of these helpers panic on that.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Uniform float in `[min, max)` (or `(max, min]` when reversed)
pub fn random_float_between<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    rng.random::<f32>() * (max - min) + min
}

/// Uniform integer in `[min, max]` (either order)
pub fn random_int_between<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(lo..=hi)
}

/// Pick one item uniformly, `None` for an empty slice
pub fn random_item<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

/// Fair coin flip
pub fn coin_flip<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.random_bool(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_float_between_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..1000 {
            let v = random_float_between(&mut rng, 10.0, 20.0);
            assert!((10.0..=20.0).contains(&v));
        }
    }

    #[test]
    fn test_float_between_reversed_range() {
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..100 {
            let v = random_float_between(&mut rng, 0.2, 0.0);
            assert!((0.0..=0.2).contains(&v));
        }
    }

    #[test]
    fn test_int_between_hits_both_ends() {
        let mut rng = Pcg32::seed_from_u64(3);
        let values: Vec<i32> = (0..500).map(|_| random_int_between(&mut rng, 3, 4)).collect();
        assert!(values.iter().all(|v| *v == 3 || *v == 4));
        assert!(values.contains(&3));
        assert!(values.contains(&4));
    }

    /// Always yields the largest value below 1.0 from `random::<f32>()`
    struct TopRng;

    impl rand::RngCore for TopRng {
        fn next_u32(&mut self) -> u32 {
            u32::MAX
        }

        fn next_u64(&mut self) -> u64 {
            u64::MAX
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0xff);
        }
    }

    #[test]
    fn test_int_between_never_exceeds_max() {
        let mut rng = TopRng;
        assert!(rng.random::<f32>() < 1.0);
        assert!((1..=2).contains(&random_int_between(&mut rng, 1, 2)));
        assert!((-5..=5).contains(&random_int_between(&mut rng, -5, 5)));
    }

    #[test]
    fn test_int_between_reversed_and_empty() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..100 {
            let v = random_int_between(&mut rng, 8, 5);
            assert!((5..=8).contains(&v));
        }
        assert_eq!(random_int_between(&mut rng, 4, 4), 4);
    }

    #[test]
    fn test_random_item_empty() {
        let mut rng = Pcg32::seed_from_u64(4);
        let empty: [u8; 0] = [];
        assert!(random_item(&mut rng, &empty).is_none());
        assert_eq!(random_item(&mut rng, &[7]), Some(&7));
    }
}
