//! Stochastic melee resolution
//!
//! Both sides of an exchange roll from their own generators, and both kill
//! counts are computed before either side's strength is touched, so the
//! result is independent of evaluation order.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::battle::constants::MAX_KILLS_PER_SOLDIER;

/// One side's kill count for a single exchange
///
/// `kills = round(u * MAX_KILLS_PER_SOLDIER * hit * (1 - block) * (1 - fumble))`
/// with `u` uniform in [0, 1).
pub fn kill_roll(
    rng: &mut ChaCha8Rng,
    hit_chance: f64,
    block_chance: f64,
    fumble_chance: f64,
) -> u32 {
    let total = rng.gen::<f64>()
        * MAX_KILLS_PER_SOLDIER as f64
        * hit_chance
        * (1.0 - block_chance)
        * (1.0 - fumble_chance);
    total.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    #[test]
    fn test_roll_is_reproducible() {
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..50 {
            assert_eq!(kill_roll(&mut a, 0.5, 0.5, 0.0), kill_roll(&mut b, 0.5, 0.5, 0.0));
        }
    }

    #[test]
    fn test_sides_roll_independently() {
        // With per-side generators, swapping evaluation order must not change
        // either side's result.
        let mut a1 = ChaCha8Rng::seed_from_u64(7);
        let mut b1 = ChaCha8Rng::seed_from_u64(8);
        let a_first = (kill_roll(&mut a1, 0.5, 0.5, 0.0), kill_roll(&mut b1, 0.5, 0.5, 0.0));

        let mut a2 = ChaCha8Rng::seed_from_u64(7);
        let mut b2 = ChaCha8Rng::seed_from_u64(8);
        let b_kills = kill_roll(&mut b2, 0.5, 0.5, 0.0);
        let a_kills = kill_roll(&mut a2, 0.5, 0.5, 0.0);
        assert_eq!(a_first, (a_kills, b_kills));
    }

    #[test]
    fn test_full_block_means_no_kills() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(kill_roll(&mut rng, 1.0, 1.0, 0.0), 0);
        }
    }

    #[test]
    fn test_fumble_scales_down() {
        let mut a = ChaCha8Rng::seed_from_u64(5);
        let mut b = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            let clean = kill_roll(&mut a, 1.0, 0.0, 0.0);
            let fumbling = kill_roll(&mut b, 1.0, 0.0, 1.0);
            assert!(fumbling <= clean);
            assert_eq!(fumbling, 0);
        }
    }

    proptest! {
        #[test]
        fn prop_roll_bounded_by_max_kills(
            seed in any::<u64>(),
            hit in 0.0f64..=1.0,
            block in 0.0f64..=1.0,
            fumble in 0.0f64..=1.0,
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let kills = kill_roll(&mut rng, hit, block, fumble);
            prop_assert!(kills <= crate::battle::constants::MAX_KILLS_PER_SOLDIER);
        }
    }
}
