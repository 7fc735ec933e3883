//! Generation capabilities produced by arbitraries: random generators, edge
//! case sets and exhaustive enumerators.

use std::sync::Arc;

use rand::{Rng, RngCore};
use tracing::trace;

use crate::arbitrary::ArbitraryValue;
use crate::error::Result;
use crate::shrinkable::Shrinkable;

type NextFn<T> = Box<dyn FnMut(&mut dyn RngCore) -> Result<Shrinkable<T>> + Send>;

/// Produces one shrinkable per call from an explicit random source.
///
/// A generator may keep per-generator state (for example the store used by
/// `unique`), so it is owned by a single trial and never shared.
pub struct RandomGenerator<T> {
    next: NextFn<T>,
}

impl<T: ArbitraryValue> RandomGenerator<T> {
    pub fn new<F>(next: F) -> Self
    where
        F: FnMut(&mut dyn RngCore) -> Result<Shrinkable<T>> + Send + 'static,
    {
        Self {
            next: Box::new(next),
        }
    }

    /// Generate the next shrinkable
    pub fn next(&mut self, rng: &mut dyn RngCore) -> Result<Shrinkable<T>> {
        (self.next)(rng)
    }

    /// Generate the next value, discarding its shrinking information
    pub fn sample(&mut self, rng: &mut dyn RngCore) -> Result<T> {
        Ok(self.next(rng)?.value())
    }

    /// Generate `count` values
    pub fn samples(&mut self, rng: &mut dyn RngCore, count: usize) -> Result<Vec<T>> {
        (0..count).map(|_| self.sample(rng)).collect()
    }

    pub fn map<U: ArbitraryValue>(
        mut self,
        mapper: Arc<dyn Fn(T) -> U + Send + Sync>,
    ) -> RandomGenerator<U> {
        RandomGenerator::new(move |rng| Ok(self.next(rng)?.map_shared(Arc::clone(&mapper))))
    }

    /// Draw one of `edge_cases` with `probability` instead of a random value
    pub fn with_edge_cases(mut self, edge_cases: EdgeCases<T>, probability: f64) -> Self {
        if edge_cases.is_empty() || probability <= 0.0 {
            return self;
        }
        let cases = edge_cases.into_vec();
        let probability = probability.min(1.0);
        RandomGenerator::new(move |rng| {
            if rng.gen_bool(probability) {
                let index = rng.gen_range(0..cases.len());
                return Ok(cases[index].clone());
            }
            self.next(rng)
        })
    }
}

/// A finite, deterministic set of boundary-representative shrinkables
pub struct EdgeCases<T> {
    cases: Vec<Shrinkable<T>>,
}

impl<T> Clone for EdgeCases<T> {
    fn clone(&self) -> Self {
        Self {
            cases: self.cases.clone(),
        }
    }
}

impl<T: ArbitraryValue> EdgeCases<T> {
    pub fn none() -> Self {
        Self { cases: Vec::new() }
    }

    pub fn from_shrinkables(cases: Vec<Shrinkable<T>>) -> Self {
        Self { cases }
    }

    /// Keep the first occurrence of every produced value, at most `max` of them
    pub fn distinct(cases: impl IntoIterator<Item = Shrinkable<T>>, max: usize) -> Self
    where
        T: PartialEq,
    {
        let mut kept: Vec<Shrinkable<T>> = Vec::new();
        let mut values: Vec<T> = Vec::new();
        for case in cases {
            if kept.len() >= max {
                break;
            }
            let value = case.value();
            if !values.contains(&value) {
                values.push(value);
                kept.push(case);
            }
        }
        Self { cases: kept }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Shrinkable<T>> {
        self.cases.iter()
    }

    /// The produced values, in order
    pub fn values(&self) -> Vec<T> {
        self.cases.iter().map(Shrinkable::value).collect()
    }

    pub fn into_vec(self) -> Vec<Shrinkable<T>> {
        self.cases
    }

    pub fn truncated(mut self, max: usize) -> Self {
        self.cases.truncate(max);
        self
    }

    pub fn map<U: ArbitraryValue>(&self, mapper: Arc<dyn Fn(T) -> U + Send + Sync>) -> EdgeCases<U> {
        EdgeCases {
            cases: self
                .cases
                .iter()
                .map(|case| case.map_shared(Arc::clone(&mapper)))
                .collect(),
        }
    }

    pub fn filter(&self, predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>) -> Self {
        Self {
            cases: self
                .cases
                .iter()
                .filter(|case| predicate(&case.value()))
                .map(|case| case.filter_shared(Arc::clone(&predicate)))
                .collect(),
        }
    }
}

impl<T> IntoIterator for EdgeCases<T> {
    type Item = Shrinkable<T>;
    type IntoIter = std::vec::IntoIter<Shrinkable<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a EdgeCases<T> {
    type Item = &'a Shrinkable<T>;
    type IntoIter = std::slice::Iter<'a, Shrinkable<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

/// Odometer over a list of value pools; the first pool varies slowest
pub(crate) struct ProductIter<E> {
    pools: Vec<Vec<E>>,
    indices: Vec<usize>,
    done: bool,
}

impl<E> ProductIter<E> {
    pub(crate) fn new(pools: Vec<Vec<E>>) -> Self {
        let done = pools.iter().any(Vec::is_empty);
        let indices = vec![0; pools.len()];
        Self {
            pools,
            indices,
            done,
        }
    }
}

impl<E: Clone> Iterator for ProductIter<E> {
    type Item = Vec<E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self
            .indices
            .iter()
            .zip(&self.pools)
            .map(|(&index, pool)| pool[index].clone())
            .collect();

        self.done = true;
        for position in (0..self.pools.len()).rev() {
            self.indices[position] += 1;
            if self.indices[position] < self.pools[position].len() {
                self.done = false;
                break;
            }
            self.indices[position] = 0;
        }
        Some(item)
    }
}

type EnumerateFn<T> = Arc<dyn Fn() -> Box<dyn Iterator<Item = T> + Send> + Send + Sync>;

/// Enumerates every value of a finite domain exactly once, in a stable order.
///
/// `max_count` is the exact number of values produced; iterating again yields
/// the same sequence.
pub struct ExhaustiveGenerator<T> {
    max_count: u64,
    enumerate: EnumerateFn<T>,
}

impl<T> Clone for ExhaustiveGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            max_count: self.max_count,
            enumerate: Arc::clone(&self.enumerate),
        }
    }
}

impl<T: ArbitraryValue> ExhaustiveGenerator<T> {
    pub fn new<F, I>(max_count: u64, enumerate: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: Iterator<Item = T> + Send + 'static,
    {
        Self {
            max_count,
            enumerate: Arc::new(move || {
                Box::new(enumerate()) as Box<dyn Iterator<Item = T> + Send>
            }),
        }
    }

    pub fn from_values(values: Vec<T>) -> Self {
        let values = Arc::new(values);
        let max_count = values.len() as u64;
        Self::new(max_count, move || {
            let values = Arc::clone(&values);
            (0..values.len()).map(move |index| values[index].clone())
        })
    }

    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = T> + Send> {
        (self.enumerate)()
    }

    pub fn map<U: ArbitraryValue>(
        &self,
        mapper: Arc<dyn Fn(T) -> U + Send + Sync>,
    ) -> ExhaustiveGenerator<U> {
        let source = self.clone();
        ExhaustiveGenerator::new(self.max_count, move || {
            let mapper = Arc::clone(&mapper);
            source.iter().map(move |value| mapper(value))
        })
    }

    /// Materialize the values matching `predicate`
    pub fn filter(&self, predicate: &dyn Fn(&T) -> bool) -> Self {
        Self::from_values(self.iter().filter(|value| predicate(value)).collect())
    }

    /// Materialize the first occurrence of every value
    pub fn distinct(&self) -> Self
    where
        T: PartialEq,
    {
        let mut values: Vec<T> = Vec::new();
        for value in self.iter() {
            if !values.contains(&value) {
                values.push(value);
            }
        }
        if values.len() as u64 != self.max_count {
            trace!(
                before = self.max_count,
                after = values.len(),
                "dropped repeated exhaustive values"
            );
        }
        Self::from_values(values)
    }

    /// Every sequence of `min_len..=max_len` values, shortest first, each
    /// length in product order.
    ///
    /// Returns `None` as soon as the running total exceeds `ceiling`.
    pub fn sequences(&self, min_len: usize, max_len: usize, ceiling: u64) -> Option<ExhaustiveGenerator<Vec<T>>> {
        if min_len > max_len {
            return Some(ExhaustiveGenerator::from_values(Vec::new()));
        }
        let base = self.max_count;
        let max_len = match base {
            0 if min_len == 0 => 0,
            0 => return Some(ExhaustiveGenerator::from_values(Vec::new())),
            _ => max_len,
        };
        let lengths = ((max_len - min_len) as u64).checked_add(1);
        if base >= 1 && lengths.is_none_or(|lengths| lengths > ceiling) {
            trace!(ceiling, min_len, max_len, "too many sequence lengths for exhaustive generation");
            return None;
        }

        let mut total = 0u64;
        for length in min_len..=max_len {
            let count = u32::try_from(length)
                .ok()
                .and_then(|length| base.checked_pow(length))
                .and_then(|count| total.checked_add(count))
                .filter(|count| *count <= ceiling);
            let Some(count) = count else {
                trace!(ceiling, length, "exhaustive sequences exceed ceiling");
                return None;
            };
            total = count;
        }

        let source = self.clone();
        Some(ExhaustiveGenerator::new(total, move || {
            let pool: Vec<T> = source.iter().collect();
            (min_len..=max_len).flat_map(move |length| ProductIter::new(vec![pool.clone(); length]))
        }))
    }

    /// Cartesian product of `parts`, first part varying slowest.
    ///
    /// Returns `None` when the product exceeds `ceiling`.
    pub fn product(parts: Vec<ExhaustiveGenerator<T>>, ceiling: u64) -> Option<ExhaustiveGenerator<Vec<T>>> {
        let max_count = parts
            .iter()
            .try_fold(1u64, |count, part| count.checked_mul(part.max_count))
            .filter(|count| *count <= ceiling);
        let Some(max_count) = max_count else {
            trace!(ceiling, "exhaustive product exceeds ceiling");
            return None;
        };
        Some(ExhaustiveGenerator::new(max_count, move || {
            let pools: Vec<Vec<T>> = parts.iter().map(|part| part.iter().collect()).collect();
            ProductIter::new(pools)
        }))
    }

    /// All values of `parts` one after another.
    ///
    /// Returns `None` when the total exceeds `ceiling`.
    pub fn concat(parts: Vec<ExhaustiveGenerator<T>>, ceiling: u64) -> Option<Self> {
        let max_count = parts
            .iter()
            .try_fold(0u64, |count, part| count.checked_add(part.max_count))
            .filter(|count| *count <= ceiling);
        let Some(max_count) = max_count else {
            trace!(ceiling, "exhaustive concatenation exceeds ceiling");
            return None;
        };
        let parts = Arc::new(parts);
        Some(Self::new(max_count, move || {
            let parts = Arc::clone(&parts);
            (0..parts.len()).flat_map(move |index| parts[index].iter())
        }))
    }
}

impl<T: ArbitraryValue> IntoIterator for &ExhaustiveGenerator<T> {
    type Item = T;
    type IntoIter = Box<dyn Iterator<Item = T> + Send>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_product_order_first_pool_slowest() {
        let pools = vec![vec![1, 2], vec![10, 20, 30]];
        let combinations: Vec<Vec<i32>> = ProductIter::new(pools).collect();
        assert_eq!(combinations.len(), 6);
        assert_eq!(combinations[0], vec![1, 10]);
        assert_eq!(combinations[1], vec![1, 20]);
        assert_eq!(combinations[3], vec![2, 10]);
    }

    #[test]
    fn test_product_with_empty_pool() {
        let pools: Vec<Vec<i32>> = vec![vec![1], vec![]];
        assert_eq!(ProductIter::new(pools).count(), 0);
        assert_eq!(ProductIter::<i32>::new(Vec::new()).collect::<Vec<_>>(), vec![Vec::<i32>::new()]);
    }

    #[test]
    fn test_exhaustive_product_and_ceiling() {
        let digits = ExhaustiveGenerator::from_values(vec![0, 1, 2]);
        let pairs = ExhaustiveGenerator::product(vec![digits.clone(), digits.clone()], 100)
            .expect("9 combinations fit");
        assert_eq!(pairs.max_count(), 9);
        assert_eq!(pairs.iter().count(), 9);
        assert_eq!(pairs.iter().collect::<Vec<_>>(), pairs.iter().collect::<Vec<_>>());

        assert!(ExhaustiveGenerator::product(vec![digits.clone(), digits], 8).is_none());
    }

    #[test]
    fn test_exhaustive_concat() {
        let first = ExhaustiveGenerator::from_values(vec!['a', 'b']);
        let second = ExhaustiveGenerator::from_values(vec!['c']);
        let joined = ExhaustiveGenerator::concat(vec![first, second], 10).expect("fits");
        assert_eq!(joined.max_count(), 3);
        assert_eq!(joined.iter().collect::<String>(), "abc");
    }

    #[test]
    fn test_with_edge_cases_always_injects_at_probability_one() {
        let generator = RandomGenerator::new(|_rng| Ok(Shrinkable::terminal(5)));
        let edge_cases = EdgeCases::from_shrinkables(vec![Shrinkable::terminal(0)]);
        let mut generator = generator.with_edge_cases(edge_cases, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(generator.samples(&mut rng, 20).unwrap(), vec![0; 20]);
    }

    #[test]
    fn test_exhaustive_distinct_keeps_first_occurrences() {
        let halves = ExhaustiveGenerator::from_values(vec![0, 1, 2, 3]).map(Arc::new(|v: i32| v / 2));
        let distinct = halves.distinct();
        assert_eq!(distinct.max_count(), 2);
        assert_eq!(distinct.iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_sequences_counts_and_order() {
        let bits = ExhaustiveGenerator::from_values(vec![0u8, 1]);
        let sequences = bits.sequences(0, 2, 100).expect("7 sequences fit");
        assert_eq!(sequences.max_count(), 7);
        let values: Vec<Vec<u8>> = sequences.iter().collect();
        assert_eq!(values.len(), 7);
        assert_eq!(values[0], Vec::<u8>::new());
        assert_eq!(values[1], vec![0]);
        assert_eq!(values[3], vec![0, 0]);
        assert_eq!(values[6], vec![1, 1]);

        assert!(bits.sequences(0, 2, 6).is_none());
        assert_eq!(bits.sequences(3, 2, 6).expect("empty").max_count(), 0);
    }

    #[test]
    fn test_sequences_fail_fast_on_huge_length_ranges() {
        let single = ExhaustiveGenerator::from_values(vec!['a']);
        assert!(single.sequences(0, usize::MAX, 1000).is_none());
        assert_eq!(single.sequences(0, 999, 1000).expect("fits").max_count(), 1000);

        let empty = ExhaustiveGenerator::<char>::from_values(Vec::new());
        assert_eq!(empty.sequences(0, usize::MAX, 10).expect("only empty").max_count(), 1);
        assert_eq!(empty.sequences(1, usize::MAX, 10).expect("nothing").max_count(), 0);
    }

    #[test]
    fn test_edge_cases_distinct() {
        let cases = [1, 2, 1, 3, 2].map(Shrinkable::terminal);
        let distinct = EdgeCases::distinct(cases, 10);
        assert_eq!(distinct.values(), vec![1, 2, 3]);
        let capped = EdgeCases::distinct([1, 2, 3].map(Shrinkable::terminal), 2);
        assert_eq!(capped.len(), 2);
    }
}
