//! Weighted selection by positive integer frequencies.

use rand::{Rng, RngCore};

use crate::error::{ArbitraryError, Result};

/// A set of entries chosen with probability proportional to their weight.
///
/// Entries with weight 0 are kept (so indices stay stable) but never chosen.
#[derive(Debug, Clone)]
pub struct Frequency<T> {
    entries: Vec<(u32, T)>,
    total_weight: u64,
}

impl<T> Frequency<T> {
    /// Create a frequency set; at least one entry needs a positive weight
    pub fn new(entries: Vec<(u32, T)>) -> Result<Self> {
        let total_weight: u64 = entries.iter().map(|(weight, _)| u64::from(*weight)).sum();
        if total_weight == 0 {
            return Err(ArbitraryError::empty_choices(
                "frequency set has no entry with a positive weight",
            ));
        }
        Ok(Self {
            entries,
            total_weight,
        })
    }

    /// Choose the index of an entry
    pub fn choose_index(&self, rng: &mut dyn RngCore) -> usize {
        let mut choice = rng.gen_range(0..self.total_weight);
        for (index, (weight, _)) in self.entries.iter().enumerate() {
            let weight = u64::from(*weight);
            if choice < weight {
                return index;
            }
            choice -= weight;
        }
        // Unreachable while total_weight is the sum of all weights
        self.entries.len() - 1
    }

    pub fn choose(&self, rng: &mut dyn RngCore) -> &T {
        &self.entries[self.choose_index(rng)].1
    }

    /// Choose among the entries accepted by `accept`, weighted as usual.
    ///
    /// Returns `None` when no accepted entry has a positive weight.
    pub fn choose_index_where(
        &self,
        rng: &mut dyn RngCore,
        accept: impl Fn(usize, &T) -> bool,
    ) -> Option<usize> {
        let accepted: Vec<(usize, u64)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(index, (weight, value))| *weight > 0 && accept(*index, value))
            .map(|(index, (weight, _))| (index, u64::from(*weight)))
            .collect();
        let total: u64 = accepted.iter().map(|(_, weight)| weight).sum();
        if total == 0 {
            return None;
        }
        let mut choice = rng.gen_range(0..total);
        for (index, weight) in accepted {
            if choice < weight {
                return Some(index);
            }
            choice -= weight;
        }
        None
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|(_, value)| value)
    }

    pub fn weight_at(&self, index: usize) -> Option<u32> {
        self.entries.get(index).map(|(weight, _)| *weight)
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in declaration order, including those with weight 0
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    /// Entries with a positive weight, in declaration order
    pub fn selectable(&self) -> impl Iterator<Item = &T> {
        self.entries
            .iter()
            .filter(|(weight, _)| *weight > 0)
            .map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_weighted_distribution() {
        let frequency = Frequency::new(vec![(5, 'h'), (3, 'm'), (1, 'l')]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let count = 10_000;
        let mut counts = [0usize; 3];
        for _ in 0..count {
            counts[frequency.choose_index(&mut rng)] += 1;
        }

        // Total weights: 5 + 3 + 1 = 9
        let heavy = counts[0] as f64 / count as f64;
        let medium = counts[1] as f64 / count as f64;
        let light = counts[2] as f64 / count as f64;
        assert!((heavy - 0.555).abs() < 0.05, "Heavy: {}", heavy);
        assert!((medium - 0.333).abs() < 0.05, "Medium: {}", medium);
        assert!((light - 0.111).abs() < 0.05, "Light: {}", light);
    }

    #[test]
    fn test_zero_weight_never_chosen() {
        let frequency = Frequency::new(vec![(0, "never"), (1, "always")]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert_eq!(*frequency.choose(&mut rng), "always");
        }
        assert_eq!(frequency.selectable().count(), 1);
    }

    #[test]
    fn test_empty_or_all_zero_is_rejected() {
        assert!(Frequency::<u8>::new(Vec::new()).is_err());
        assert!(Frequency::new(vec![(0, 1u8), (0, 2u8)]).is_err());
    }

    #[test]
    fn test_choose_where() {
        let frequency = Frequency::new(vec![(1, 10), (1, 20), (1, 30)]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let index = frequency
                .choose_index_where(&mut rng, |_, value| *value > 15)
                .unwrap();
            assert!(index > 0);
        }
        assert_eq!(frequency.choose_index_where(&mut rng, |_, _| false), None);
    }
}
