//! Particle decay: partitioning a charge triple into fragments

use chamber_physics::{Charges, MAX_SPLIT_ATTEMPTS, STABLE_MASS};
use rand::Rng;

/// Partition `charges` into fragment charge triples.
///
/// Each round draws an independent random fraction of every remaining charge
/// count and rounds it to the nearest unit. A draw is rejected if it takes
/// nothing, or if it would take the whole pool as the very first fragment.
/// The loop runs while more than one unit remains; a last single unit becomes
/// the final fragment.
///
/// Guarantees, for a parent of mass `M`:
/// - the fragments sum to `charges` for every charge type
/// - every fragment has mass >= 1
/// - `M <= 1` yields no fragments, otherwise between 2 and `M` of them
///
/// After [`MAX_SPLIT_ATTEMPTS`] rejected draws in a row one unit is peeled off
/// without sampling, which bounds the loop regardless of the random source.
pub fn split_charges<R: Rng + ?Sized>(charges: Charges, rng: &mut R) -> Vec<Charges> {
    let mut fragments = Vec::new();
    if charges.mass() <= STABLE_MASS {
        return fragments;
    }

    let mut remaining = charges;
    let mut rejected = 0;
    while remaining.mass() > STABLE_MASS {
        let draw = if rejected >= MAX_SPLIT_ATTEMPTS {
            single_unit(remaining)
        } else {
            draw_fraction(remaining, rng)
        };

        let taken = draw.mass();
        if taken == 0 || (taken == remaining.mass() && fragments.is_empty()) {
            rejected += 1;
            continue;
        }
        let Some(rest) = remaining.checked_sub(draw) else {
            rejected += 1;
            continue;
        };

        rejected = 0;
        remaining = rest;
        fragments.push(draw);
    }

    if !remaining.is_empty() {
        fragments.push(remaining);
    }
    fragments
}

fn draw_fraction<R: Rng + ?Sized>(pool: Charges, rng: &mut R) -> Charges {
    let mut take = |count: u32| (rng.random::<f64>() * count as f64).round() as u32;
    Charges::new(take(pool.positive), take(pool.neutral), take(pool.negative))
}

/// One unit of the first non-empty charge type
fn single_unit(pool: Charges) -> Charges {
    if pool.positive > 0 {
        Charges::new(1, 0, 0)
    } else if pool.neutral > 0 {
        Charges::new(0, 1, 0)
    } else {
        Charges::new(0, 0, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    /// Always yields zero bits, so every uniform sample is 0.0
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    fn check_split(charges: Charges, fragments: &[Charges]) {
        let total: Charges = fragments.iter().sum();
        assert_eq!(total, charges, "fragments {fragments:?} do not sum to {charges}");
        assert!(fragments.iter().all(|f| f.mass() >= 1), "zero-mass fragment in {fragments:?}");
        assert!(fragments.len() >= 2);
        assert!(fragments.len() as u32 <= charges.mass());
    }

    #[test]
    fn test_stable_charges_do_not_split() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(split_charges(Charges::new(1, 0, 0), &mut rng).is_empty());
        assert!(split_charges(Charges::new(0, 0, 1), &mut rng).is_empty());
        assert!(split_charges(Charges::ZERO, &mut rng).is_empty());
    }

    #[test]
    fn test_mass_two_splits_in_two() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            let fragments = split_charges(Charges::new(1, 1, 0), &mut rng);
            assert_eq!(fragments.len(), 2);
            check_split(Charges::new(1, 1, 0), &fragments);
        }
    }

    #[test]
    fn test_conservation_across_many_triples() {
        let mut rng = StdRng::seed_from_u64(3);
        for positive in 0..6 {
            for neutral in 0..6 {
                for negative in 0..6 {
                    let charges = Charges::new(positive, neutral, negative);
                    let fragments = split_charges(charges, &mut rng);
                    if charges.mass() <= 1 {
                        assert!(fragments.is_empty());
                    } else {
                        check_split(charges, &fragments);
                    }
                }
            }
        }
    }

    #[test]
    fn test_large_particle_terminates() {
        let mut rng = StdRng::seed_from_u64(4);
        let charges = Charges::new(400, 250, 333);
        let fragments = split_charges(charges, &mut rng);
        check_split(charges, &fragments);
    }

    #[test]
    fn test_degenerate_random_source_still_terminates() {
        let mut rng = ZeroRng;
        let charges = Charges::new(2, 1, 3);
        let fragments = split_charges(charges, &mut rng);
        check_split(charges, &fragments);
        assert_eq!(fragments.len(), 6);
    }
}
