//! Combinators deriving new arbitraries from existing ones.
//!
//! Derived arbitraries never invent edge cases: they map, filter, or combine
//! the edge cases of their inputs. Exhaustive enumeration is available only
//! when every input is enumerable and the derived count fits the ceiling.
//!
//! Derivations that may repeat values (non-injective mappers, overlapping
//! alternatives) keep the first occurrence of every value, so edge cases
//! stay a set and exhaustive counts stay exact.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::Rng;
use tracing::{debug, trace};

use crate::arbitrary::{Arbitrary, ArbitraryValue, BoxedArbitrary};
use crate::config::{DEFAULT_FILTER_MAX_MISSES, DEFAULT_GENERATION_SIZE};
use crate::error::{ArbitraryError, Result};
use crate::frequency::Frequency;
use crate::generator::{EdgeCases, ExhaustiveGenerator, ProductIter, RandomGenerator};
use crate::shrinkable::{FlatMapper, Shrinkable};

/// Arbitrary transforming every value of its source
pub struct Map<A: Arbitrary, U> {
    source: A,
    mapper: Arc<dyn Fn(A::Value) -> U + Send + Sync>,
}

impl<A: Arbitrary, U> Map<A, U> {
    pub(crate) fn new(source: A, mapper: Arc<dyn Fn(A::Value) -> U + Send + Sync>) -> Self {
        Self { source, mapper }
    }
}

impl<A: Arbitrary + Clone, U> Clone for Map<A, U> {
    fn clone(&self) -> Self {
        Self::new(self.source.clone(), Arc::clone(&self.mapper))
    }
}

impl<A: Arbitrary, U: ArbitraryValue + PartialEq> Arbitrary for Map<A, U> {
    type Value = U;

    fn generator(&self, size: usize) -> RandomGenerator<U> {
        self.source.generator(size).map(Arc::clone(&self.mapper))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<U> {
        let mapped = self
            .source
            .edge_cases(max_edge_cases)
            .map(Arc::clone(&self.mapper));
        EdgeCases::distinct(mapped, max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<U>> {
        Some(
            self.source
                .exhaustive_with_max(max_count)?
                .map(Arc::clone(&self.mapper))
                .distinct(),
        )
    }
}

/// Arbitrary keeping only the values of its source that satisfy a predicate
pub struct Filter<A: Arbitrary> {
    source: A,
    predicate: Arc<dyn Fn(&A::Value) -> bool + Send + Sync>,
    max_misses: usize,
}

impl<A: Arbitrary> Filter<A> {
    pub(crate) fn new(source: A, predicate: Arc<dyn Fn(&A::Value) -> bool + Send + Sync>) -> Self {
        Self {
            source,
            predicate,
            max_misses: DEFAULT_FILTER_MAX_MISSES,
        }
    }

    /// Copy failing after `max_misses` consecutive rejected values
    pub fn with_max_misses(mut self, max_misses: usize) -> Self {
        self.max_misses = max_misses.max(1);
        self
    }
}

impl<A: Arbitrary + Clone> Clone for Filter<A> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            predicate: Arc::clone(&self.predicate),
            max_misses: self.max_misses,
        }
    }
}

impl<A: Arbitrary> Arbitrary for Filter<A> {
    type Value = A::Value;

    fn generator(&self, size: usize) -> RandomGenerator<A::Value> {
        let mut source = self.source.generator(size);
        let predicate = Arc::clone(&self.predicate);
        let max_misses = self.max_misses;
        RandomGenerator::new(move |rng| {
            for _ in 0..max_misses {
                let candidate = source.next(rng)?;
                if predicate(&candidate.value()) {
                    return Ok(candidate.filter_shared(Arc::clone(&predicate)));
                }
            }
            debug!(max_misses, "filter exhausted its miss budget");
            Err(ArbitraryError::TooManyFilterMisses { misses: max_misses })
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<A::Value> {
        self.source
            .edge_cases(max_edge_cases)
            .filter(Arc::clone(&self.predicate))
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        let source = self.source.exhaustive_with_max(max_count)?;
        Some(source.filter(&*self.predicate))
    }
}

/// Arbitrary whose value type depends on a value of its source
pub struct FlatMap<A: Arbitrary, U> {
    source: A,
    mapper: FlatMapper<A::Value, U>,
}

impl<A: Arbitrary, U> FlatMap<A, U> {
    pub(crate) fn new(source: A, mapper: FlatMapper<A::Value, U>) -> Self {
        Self { source, mapper }
    }
}

impl<A: Arbitrary + Clone, U> Clone for FlatMap<A, U> {
    fn clone(&self) -> Self {
        Self::new(self.source.clone(), Arc::clone(&self.mapper))
    }
}

impl<A: Arbitrary, U: ArbitraryValue + PartialEq> Arbitrary for FlatMap<A, U> {
    type Value = U;

    fn generator(&self, size: usize) -> RandomGenerator<U> {
        let mut source = self.source.generator(size);
        let mapper = Arc::clone(&self.mapper);
        RandomGenerator::new(move |rng| {
            let outer = source.next(rng)?;
            let seed = rng.next_u64();
            outer.flat_map(Arc::clone(&mapper), size, seed)
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<U> {
        let cases = self.source.edge_cases(max_edge_cases).into_iter().flat_map(|outer| {
            let inner_cases = (self.mapper)(outer.value()).edge_cases(max_edge_cases);
            inner_cases.into_iter().map(move |inner| {
                outer.flat_mapped(inner, Arc::clone(&self.mapper), DEFAULT_GENERATION_SIZE, 0)
            })
        });
        EdgeCases::distinct(cases, max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<U>> {
        let source = self.source.exhaustive_with_max(max_count)?;
        let inner = source
            .iter()
            .map(|value| (self.mapper)(value).exhaustive_with_max(max_count))
            .collect::<Option<Vec<_>>>()?;
        Some(ExhaustiveGenerator::concat(inner, max_count)?.distinct())
    }
}

fn lock<T>(store: &Mutex<Vec<T>>) -> MutexGuard<'_, Vec<T>> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Arbitrary rejecting values its generator has already produced
pub struct Unique<A: Arbitrary> {
    source: A,
    max_misses: usize,
}

impl<A: Arbitrary> Unique<A> {
    pub(crate) fn new(source: A) -> Self {
        Self {
            source,
            max_misses: DEFAULT_FILTER_MAX_MISSES,
        }
    }

    pub fn with_max_misses(mut self, max_misses: usize) -> Self {
        self.max_misses = max_misses.max(1);
        self
    }
}

impl<A: Arbitrary + Clone> Clone for Unique<A> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            max_misses: self.max_misses,
        }
    }
}

impl<A> Arbitrary for Unique<A>
where
    A: Arbitrary,
    A::Value: PartialEq,
{
    type Value = A::Value;

    fn generator(&self, size: usize) -> RandomGenerator<A::Value> {
        let mut source = self.source.generator(size);
        let max_misses = self.max_misses;
        let store: Arc<Mutex<Vec<A::Value>>> = Arc::default();
        RandomGenerator::new(move |rng| {
            for _ in 0..max_misses {
                let candidate = source.next(rng)?;
                let value = candidate.value();
                {
                    let mut used = lock(&store);
                    if used.contains(&value) {
                        continue;
                    }
                    used.push(value);
                }
                let store = Arc::clone(&store);
                return Ok(candidate.filter(move |value| !lock(&store).contains(value)));
            }
            debug!(max_misses, "unique exhausted its miss budget");
            Err(ArbitraryError::TooManyFilterMisses { misses: max_misses })
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<A::Value> {
        EdgeCases::distinct(self.source.edge_cases(max_edge_cases), max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        Some(self.source.exhaustive_with_max(max_count)?.distinct())
    }
}

/// Arbitrary of pairs; the left value is shrunk first
pub struct Zip<A, B> {
    left: A,
    right: B,
}

impl<A: Arbitrary, B: Arbitrary> Zip<A, B> {
    pub(crate) fn new(left: A, right: B) -> Self {
        Self { left, right }
    }
}

impl<A: Arbitrary + Clone, B: Arbitrary + Clone> Clone for Zip<A, B> {
    fn clone(&self) -> Self {
        Self::new(self.left.clone(), self.right.clone())
    }
}

impl<A, B> Arbitrary for Zip<A, B>
where
    A: Arbitrary,
    B: Arbitrary,
    A::Value: PartialEq,
    B::Value: PartialEq,
{
    type Value = (A::Value, B::Value);

    fn generator(&self, size: usize) -> RandomGenerator<Self::Value> {
        let mut left = self.left.generator(size);
        let mut right = self.right.generator(size);
        RandomGenerator::new(move |rng| {
            let first = left.next(rng)?;
            let second = right.next(rng)?;
            Ok(first.zip(&second))
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<Self::Value> {
        let right = self.right.edge_cases(max_edge_cases);
        let cases = self
            .left
            .edge_cases(max_edge_cases)
            .into_iter()
            .flat_map(|first| right.iter().map(move |second| first.zip(second)));
        EdgeCases::distinct(cases, max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<Self::Value>> {
        let left = self.left.exhaustive_with_max(max_count)?;
        let right = self.right.exhaustive_with_max(max_count)?;
        let count = left
            .max_count()
            .checked_mul(right.max_count())
            .filter(|count| *count <= max_count);
        let Some(count) = count else {
            trace!(max_count, "zipped domain exceeds exhaustive ceiling");
            return None;
        };
        Some(ExhaustiveGenerator::new(count, move || {
            let seconds: Vec<B::Value> = right.iter().collect();
            left.iter().flat_map(move |first| {
                seconds
                    .clone()
                    .into_iter()
                    .map(move |second| (first.clone(), second))
            })
        }))
    }
}

/// Arbitrary combining a fixed list of same-typed parts
pub struct Combine<E, R> {
    parts: Vec<BoxedArbitrary<E>>,
    combinator: Arc<dyn Fn(Vec<E>) -> R + Send + Sync>,
}

impl<E, R> Clone for Combine<E, R> {
    fn clone(&self) -> Self {
        Self {
            parts: self.parts.clone(),
            combinator: Arc::clone(&self.combinator),
        }
    }
}

/// Combine the values of `parts` with `combinator`
pub fn combine<E, R, F>(parts: Vec<BoxedArbitrary<E>>, combinator: F) -> Combine<E, R>
where
    E: ArbitraryValue,
    R: ArbitraryValue + PartialEq,
    F: Fn(Vec<E>) -> R + Send + Sync + 'static,
{
    Combine {
        parts,
        combinator: Arc::new(combinator),
    }
}

impl<E: ArbitraryValue, R: ArbitraryValue + PartialEq> Arbitrary for Combine<E, R> {
    type Value = R;

    fn generator(&self, size: usize) -> RandomGenerator<R> {
        let mut generators: Vec<_> = self.parts.iter().map(|part| part.generator(size)).collect();
        let combinator = Arc::clone(&self.combinator);
        RandomGenerator::new(move |rng| {
            let parts = generators
                .iter_mut()
                .map(|generator| generator.next(rng))
                .collect::<Result<Vec<_>>>()?;
            Ok(Shrinkable::combine(parts, Arc::clone(&combinator)))
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<R> {
        let pools: Vec<Vec<Shrinkable<E>>> = self
            .parts
            .iter()
            .map(|part| part.edge_cases(max_edge_cases).into_vec())
            .collect();
        let cases = ProductIter::new(pools)
            .map(|parts| Shrinkable::combine(parts, Arc::clone(&self.combinator)));
        EdgeCases::distinct(cases, max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<R>> {
        let parts = self
            .parts
            .iter()
            .map(|part| part.exhaustive_with_max(max_count))
            .collect::<Option<Vec<_>>>()?;
        let combinator = Arc::clone(&self.combinator);
        Some(
            ExhaustiveGenerator::product(parts, max_count)?
                .map(combinator)
                .distinct(),
        )
    }
}

/// Arbitrary choosing uniformly between alternatives
#[derive(Clone)]
pub struct OneOf<T> {
    choices: Vec<BoxedArbitrary<T>>,
}

/// Choose uniformly between `choices`; an empty list is rejected
pub fn one_of<T: ArbitraryValue + PartialEq>(choices: Vec<BoxedArbitrary<T>>) -> Result<OneOf<T>> {
    if choices.is_empty() {
        return Err(ArbitraryError::empty_choices("one_of needs at least one arbitrary"));
    }
    Ok(OneOf { choices })
}

fn concat_edge_cases<'a, T: ArbitraryValue + PartialEq>(
    sources: impl Iterator<Item = &'a BoxedArbitrary<T>>,
    max_edge_cases: usize,
) -> EdgeCases<T> {
    let cases = sources.flat_map(|source| source.edge_cases(max_edge_cases));
    EdgeCases::distinct(cases, max_edge_cases)
}

fn concat_exhaustive<'a, T: ArbitraryValue + PartialEq>(
    sources: impl Iterator<Item = &'a BoxedArbitrary<T>>,
    max_count: u64,
) -> Option<ExhaustiveGenerator<T>> {
    let parts = sources
        .map(|source| source.exhaustive_with_max(max_count))
        .collect::<Option<Vec<_>>>()?;
    Some(ExhaustiveGenerator::concat(parts, max_count)?.distinct())
}

impl<T: ArbitraryValue + PartialEq> Arbitrary for OneOf<T> {
    type Value = T;

    fn generator(&self, size: usize) -> RandomGenerator<T> {
        let mut generators: Vec<_> = self
            .choices
            .iter()
            .map(|choice| choice.generator(size))
            .collect();
        RandomGenerator::new(move |rng| {
            let index = rng.gen_range(0..generators.len());
            generators[index].next(rng)
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        concat_edge_cases(self.choices.iter(), max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        concat_exhaustive(self.choices.iter(), max_count)
    }
}

/// Arbitrary choosing between alternatives by weight
#[derive(Clone)]
pub struct FrequencyOf<T> {
    choices: Frequency<BoxedArbitrary<T>>,
}

/// Choose between weighted alternatives; weight 0 alternatives are never chosen
pub fn frequency_of<T: ArbitraryValue + PartialEq>(
    choices: Vec<(u32, BoxedArbitrary<T>)>,
) -> Result<FrequencyOf<T>> {
    Ok(FrequencyOf {
        choices: Frequency::new(choices)?,
    })
}

impl<T: ArbitraryValue + PartialEq> Arbitrary for FrequencyOf<T> {
    type Value = T;

    fn generator(&self, size: usize) -> RandomGenerator<T> {
        let choices = self.choices.clone();
        let mut generators: Vec<_> = choices.iter().map(|choice| choice.generator(size)).collect();
        RandomGenerator::new(move |rng| {
            let index = choices.choose_index(rng);
            generators[index].next(rng)
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        concat_edge_cases(self.choices.selectable(), max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        concat_exhaustive(self.choices.selectable(), max_count)
    }
}

/// Arbitrary of optional values; `None` is the simplest value
pub struct Optional<A> {
    source: A,
    presence: f64,
}

impl<A: Arbitrary> Optional<A> {
    pub(crate) fn new(source: A, presence: f64) -> Result<Self> {
        Ok(Self { source, presence })
    }
}

impl<A: Arbitrary + Clone> Clone for Optional<A> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            presence: self.presence,
        }
    }
}

impl<A: Arbitrary> Arbitrary for Optional<A> {
    type Value = Option<A::Value>;

    fn generator(&self, size: usize) -> RandomGenerator<Self::Value> {
        let mut source = self.source.generator(size);
        let presence = self.presence;
        RandomGenerator::new(move |rng| {
            if presence <= 0.0 {
                return Ok(Shrinkable::absent());
            }
            if presence >= 1.0 {
                return Ok(source.next(rng)?.map(Some));
            }
            if rng.gen_bool(presence) {
                Ok(Shrinkable::present(&source.next(rng)?))
            } else {
                Ok(Shrinkable::absent())
            }
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<Self::Value> {
        let mut cases = Vec::new();
        if self.presence < 1.0 {
            cases.push(Shrinkable::absent());
        }
        if self.presence > 0.0 {
            let always = self.presence >= 1.0;
            cases.extend(self.source.edge_cases(max_edge_cases).iter().map(|case| {
                if always {
                    case.map(Some)
                } else {
                    Shrinkable::present(case)
                }
            }));
        }
        EdgeCases::from_shrinkables(cases).truncated(max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<Self::Value>> {
        let absent = ExhaustiveGenerator::from_values(vec![None]);
        if self.presence <= 0.0 {
            return Some(absent);
        }
        let present = self
            .source
            .exhaustive_with_max(max_count)?
            .map::<Option<A::Value>>(Arc::new(Some));
        if self.presence >= 1.0 {
            return Some(present);
        }
        ExhaustiveGenerator::concat(vec![absent, present], max_count)
    }
}
