//! Shrinking distance: the magnitude used to rank shrink candidates.

use std::cmp::Ordering;
use std::fmt;

/// Ordered magnitude describing how complex a generated value is.
///
/// A distance is a vector of non-negative components, one per independent
/// generation dimension. Distances are ordered by the sum of their components
/// first and by lexicographic comparison of the components second. The all-zero
/// vector (including the empty vector) marks a fully minimal value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShrinkingDistance {
    dimensions: Vec<u64>,
}

impl ShrinkingDistance {
    /// Create a distance from its components
    pub fn of(dimensions: &[u64]) -> Self {
        Self {
            dimensions: dimensions.to_vec(),
        }
    }

    /// The distance of a fully minimal, single-dimension value
    pub fn min() -> Self {
        Self::of(&[0])
    }

    /// Distance of a collection: its length followed by the summed distances of
    /// its elements
    pub fn for_collection<'a, I>(elements: I) -> Self
    where
        I: IntoIterator<Item = &'a ShrinkingDistance>,
    {
        let mut length = 0u64;
        let mut summed = ShrinkingDistance::default();
        for element in elements {
            length += 1;
            summed = summed.plus(element);
        }
        Self::of(&[length]).append(&summed)
    }

    /// Combine per-dimension: the result has one component per component of the
    /// longer operand, with the shorter one padded with zeros
    pub fn plus(&self, other: &ShrinkingDistance) -> Self {
        let len = self.dimensions.len().max(other.dimensions.len());
        let dimensions = (0..len)
            .map(|i| {
                let left = self.dimensions.get(i).copied().unwrap_or(0);
                let right = other.dimensions.get(i).copied().unwrap_or(0);
                left.saturating_add(right)
            })
            .collect();
        Self { dimensions }
    }

    /// Combine structurally by concatenating the components
    pub fn append(&self, other: &ShrinkingDistance) -> Self {
        let mut dimensions = self.dimensions.clone();
        dimensions.extend_from_slice(&other.dimensions);
        Self { dimensions }
    }

    /// The scalar used as the primary ordering key
    pub fn total(&self) -> u128 {
        self.dimensions.iter().map(|&d| d as u128).sum()
    }

    /// Components of this distance
    pub fn dimensions(&self) -> &[u64] {
        &self.dimensions
    }

    /// Whether every component is zero
    pub fn is_minimal(&self) -> bool {
        self.dimensions.iter().all(|&d| d == 0)
    }
}

impl Ord for ShrinkingDistance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total()
            .cmp(&other.total())
            .then_with(|| self.dimensions.cmp(&other.dimensions))
    }
}

impl PartialOrd for ShrinkingDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ShrinkingDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShrinkingDistance{:?}", self.dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_uses_sum_first() {
        let small = ShrinkingDistance::of(&[5, 0]);
        let large = ShrinkingDistance::of(&[1, 6]);
        assert!(small < large);
    }

    #[test]
    fn test_ties_broken_lexicographically() {
        let first = ShrinkingDistance::of(&[1, 3]);
        let second = ShrinkingDistance::of(&[3, 1]);
        assert!(first < second);
        assert_eq!(first.cmp(&first.clone()), Ordering::Equal);
    }

    #[test]
    fn test_plus_pads_shorter_operand() {
        let left = ShrinkingDistance::of(&[1, 2, 3]);
        let right = ShrinkingDistance::of(&[10]);
        assert_eq!(left.plus(&right).dimensions(), &[11, 2, 3]);
    }

    #[test]
    fn test_append_concatenates() {
        let left = ShrinkingDistance::of(&[1]);
        let right = ShrinkingDistance::of(&[2, 3]);
        assert_eq!(left.append(&right).dimensions(), &[1, 2, 3]);
    }

    #[test]
    fn test_for_collection() {
        let elements = [ShrinkingDistance::of(&[3]), ShrinkingDistance::of(&[4])];
        let distance = ShrinkingDistance::for_collection(elements.iter());
        assert_eq!(distance.dimensions(), &[2, 7]);

        let empty = ShrinkingDistance::for_collection(std::iter::empty());
        assert!(empty.is_minimal());
    }

    #[test]
    fn test_minimal() {
        assert!(ShrinkingDistance::min().is_minimal());
        assert!(ShrinkingDistance::of(&[0, 0, 0]).is_minimal());
        assert!(!ShrinkingDistance::of(&[0, 1]).is_minimal());
    }

    #[test]
    fn test_saturating_components() {
        let big = ShrinkingDistance::of(&[u64::MAX]);
        assert_eq!(big.plus(&big).dimensions(), &[u64::MAX]);
        assert_eq!(big.append(&big).total(), 2 * u64::MAX as u128);
    }
}
