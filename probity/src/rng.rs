//! Random source helpers.
//!
//! Generators never reach for hidden global randomness: every call receives an
//! explicit `&mut dyn RngCore`. The helpers here create seeded sources and derive
//! independent ones from an existing source.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Create an entropy-seeded RNG
pub fn create_rng() -> StdRng {
    StdRng::from_entropy()
}

/// Create an RNG with a specific seed
pub fn create_seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Draw a seed from `rng` and build an independent source from it.
///
/// The parent source advances by exactly one `u64` no matter how much the
/// derived source is used afterwards.
pub fn derive_rng(rng: &mut dyn rand::RngCore) -> StdRng {
    create_seeded_rng(rng.next_u64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut first = create_seeded_rng(42);
        let mut second = create_seeded_rng(42);
        for _ in 0..10 {
            assert_eq!(first.next_u64(), second.next_u64());
        }
    }

    #[test]
    fn test_derive_rng_consumes_one_value() {
        let mut parent = create_seeded_rng(7);
        let mut reference = create_seeded_rng(7);

        let mut derived = derive_rng(&mut parent);
        for _ in 0..100 {
            derived.next_u64();
        }
        reference.next_u64();

        assert_eq!(parent.next_u64(), reference.next_u64());
    }
}
