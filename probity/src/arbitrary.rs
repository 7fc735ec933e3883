//! The `Arbitrary` capability: the user-facing, combinable description of
//! generated values.

use std::fmt;
use std::sync::Arc;

use crate::combinators::{Filter, FlatMap, Map, Optional, Unique, Zip};
use crate::config::{DEFAULT_MAX_EXHAUSTIVE_COUNT, GenerationConfig};
use crate::error::{ArbitraryError, Result};
use crate::generator::{EdgeCases, ExhaustiveGenerator, RandomGenerator};

/// Bounds every generated value type satisfies
pub trait ArbitraryValue: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> ArbitraryValue for T {}

/// A description of how to generate, edge-case sample, and enumerate values.
///
/// Arbitraries are immutable once built and can be shared between threads;
/// every configuration method returns a new arbitrary.
pub trait Arbitrary: Send + Sync {
    /// The type of generated values
    type Value: ArbitraryValue;

    /// Create a random generator for the given size hint
    fn generator(&self, size: usize) -> RandomGenerator<Self::Value>;

    /// Deterministic boundary values, at most `max_edge_cases` of them
    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<Self::Value>;

    /// Enumerate the whole domain if it has at most `max_count` values
    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<Self::Value>>;

    /// Enumerate the whole domain if it fits the global ceiling
    fn exhaustive(&self) -> Option<ExhaustiveGenerator<Self::Value>> {
        self.exhaustive_with_max(DEFAULT_MAX_EXHAUSTIVE_COUNT)
    }

    /// Enumerate the whole domain if it fits `config.max_exhaustive_count`
    fn exhaustive_with_config(&self, config: &GenerationConfig) -> Option<ExhaustiveGenerator<Self::Value>> {
        self.exhaustive_with_max(config.max_exhaustive_count)
    }

    /// A random generator that mixes in up to `config.max_edge_cases` of this
    /// arbitrary's own edge cases with `config.edge_case_probability`
    fn generator_with_embedded_edge_cases(
        &self,
        size: usize,
        config: &GenerationConfig,
    ) -> RandomGenerator<Self::Value> {
        let edge_cases = self.edge_cases(config.max_edge_cases);
        self.generator(size)
            .with_edge_cases(edge_cases, config.edge_case_probability)
    }

    /// Transform every value; repeated mapped values count once
    fn map<U, F>(self, mapper: F) -> Map<Self, U>
    where
        Self: Sized,
        U: ArbitraryValue + PartialEq,
        F: Fn(Self::Value) -> U + Send + Sync + 'static,
    {
        Map::new(self, Arc::new(mapper))
    }

    fn filter<P>(self, predicate: P) -> Filter<Self>
    where
        Self: Sized,
        P: Fn(&Self::Value) -> bool + Send + Sync + 'static,
    {
        Filter::new(self, Arc::new(predicate))
    }

    fn flat_map<U, F>(self, mapper: F) -> FlatMap<Self, U>
    where
        Self: Sized,
        U: ArbitraryValue + PartialEq,
        F: Fn(Self::Value) -> BoxedArbitrary<U> + Send + Sync + 'static,
    {
        FlatMap::new(self, Arc::new(mapper))
    }

    /// Never generate the same value twice from one generator
    fn unique(self) -> Unique<Self>
    where
        Self: Sized,
        Self::Value: PartialEq,
    {
        Unique::new(self)
    }

    fn zip<B: Arbitrary>(self, other: B) -> Zip<Self, B>
    where
        Self: Sized,
        Self::Value: PartialEq,
        B::Value: PartialEq,
    {
        Zip::new(self, other)
    }

    /// Generate `None` with probability `1 - presence`
    fn optional(self, presence: f64) -> Result<Optional<Self>>
    where
        Self: Sized,
    {
        Optional::new(self, ArbitraryError::check_probability(presence)?)
    }

    fn boxed(self) -> BoxedArbitrary<Self::Value>
    where
        Self: Sized + 'static,
    {
        BoxedArbitrary::new(self)
    }
}

/// A shared, type-erased arbitrary
pub struct BoxedArbitrary<T> {
    inner: Arc<dyn Arbitrary<Value = T>>,
}

impl<T: ArbitraryValue> BoxedArbitrary<T> {
    pub fn new<A: Arbitrary<Value = T> + 'static>(arbitrary: A) -> Self {
        Self {
            inner: Arc::new(arbitrary),
        }
    }
}

impl<T> Clone for BoxedArbitrary<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for BoxedArbitrary<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedArbitrary")
            .field("value", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: ArbitraryValue> Arbitrary for BoxedArbitrary<T> {
    type Value = T;

    fn generator(&self, size: usize) -> RandomGenerator<T> {
        self.inner.generator(size)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        self.inner.edge_cases(max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        self.inner.exhaustive_with_max(max_count)
    }

    fn boxed(self) -> BoxedArbitrary<T> {
        self
    }
}
