//! Shrinkable values: a lazily produced value, its distance, and its candidates.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::trace;

use crate::arbitrary::{Arbitrary, ArbitraryValue, BoxedArbitrary};
use crate::distance::ShrinkingDistance;
use crate::error::Result;
use crate::falsifier::Falsifier;
use crate::rng::create_seeded_rng;
use crate::shrink::ShrinkingSequence;

type ValueFn<T> = Arc<dyn Fn() -> T + Send + Sync>;
type CandidatesFn<T> = Arc<dyn Fn() -> Vec<Shrinkable<T>> + Send + Sync>;

/// Function from an outer value to the arbitrary its inner value is drawn from
pub type FlatMapper<T, U> = Arc<dyn Fn(T) -> BoxedArbitrary<U> + Send + Sync>;

enum Shrinking<T> {
    Terminal,
    Exploring(CandidatesFn<T>),
}

impl<T> Clone for Shrinking<T> {
    fn clone(&self) -> Self {
        match self {
            Shrinking::Terminal => Shrinking::Terminal,
            Shrinking::Exploring(candidates) => Shrinking::Exploring(Arc::clone(candidates)),
        }
    }
}

/// A generated value together with its shrinking distance and shrink candidates.
///
/// The value is produced on demand and may be produced many times; producers
/// must be deterministic for a given instance. Candidates are produced lazily,
/// always in the same order, and are expected to carry smaller distances than
/// their parent. Terminal shrinkables have no candidates at all.
///
/// Equality and hashing compare produced values, not identity.
pub struct Shrinkable<T> {
    value: ValueFn<T>,
    distance: ShrinkingDistance,
    shrinking: Shrinking<T>,
}

impl<T> Clone for Shrinkable<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            distance: self.distance.clone(),
            shrinking: self.shrinking.clone(),
        }
    }
}

impl<T: ArbitraryValue> Shrinkable<T> {
    /// Create an exploring shrinkable from a value producer and a candidate producer
    pub fn new<V, C>(value: V, distance: ShrinkingDistance, candidates: C) -> Self
    where
        V: Fn() -> T + Send + Sync + 'static,
        C: Fn() -> Vec<Shrinkable<T>> + Send + Sync + 'static,
    {
        Self {
            value: Arc::new(value),
            distance,
            shrinking: Shrinking::Exploring(Arc::new(candidates)),
        }
    }

    /// Create a terminal shrinkable from a value producer
    pub fn unshrinkable<V>(value: V, distance: ShrinkingDistance) -> Self
    where
        V: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            value: Arc::new(value),
            distance,
            shrinking: Shrinking::Terminal,
        }
    }

    /// Create a terminal shrinkable holding a fixed value
    pub fn terminal(value: T) -> Self {
        Self::unshrinkable(move || value.clone(), ShrinkingDistance::min())
    }

    /// Produce the represented value
    pub fn value(&self) -> T {
        (self.value)()
    }

    pub fn distance(&self) -> &ShrinkingDistance {
        &self.distance
    }

    /// Whether this shrinkable declares that it cannot be simplified
    pub fn is_terminal(&self) -> bool {
        matches!(self.shrinking, Shrinking::Terminal)
    }

    /// The direct shrink candidates, in their stable order
    pub fn candidates(&self) -> Vec<Shrinkable<T>> {
        match &self.shrinking {
            Shrinking::Terminal => Vec::new(),
            Shrinking::Exploring(candidates) => candidates(),
        }
    }

    /// Start a shrink search driven by `falsifier`
    pub fn shrink<F: Falsifier<T>>(&self, falsifier: F) -> ShrinkingSequence<T, F> {
        match self.shrinking {
            Shrinking::Terminal => ShrinkingSequence::dont_shrink(self.clone(), falsifier),
            Shrinking::Exploring(_) => ShrinkingSequence::new(self.clone(), falsifier),
        }
    }

    /// Transform the value, keeping the distance and the candidate structure
    pub fn map<U, F>(&self, mapper: F) -> Shrinkable<U>
    where
        U: ArbitraryValue,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.map_shared(Arc::new(mapper))
    }

    pub(crate) fn map_shared<U: ArbitraryValue>(
        &self,
        mapper: Arc<dyn Fn(T) -> U + Send + Sync>,
    ) -> Shrinkable<U> {
        let source = Arc::clone(&self.value);
        let value_mapper = Arc::clone(&mapper);
        let value = move || value_mapper(source());
        match &self.shrinking {
            Shrinking::Terminal => Shrinkable::unshrinkable(value, self.distance.clone()),
            Shrinking::Exploring(candidates) => {
                let candidates = Arc::clone(candidates);
                Shrinkable::new(value, self.distance.clone(), move || {
                    candidates()
                        .iter()
                        .map(|candidate| candidate.map_shared(Arc::clone(&mapper)))
                        .collect()
                })
            }
        }
    }

    /// Keep only candidates whose value satisfies `predicate`
    pub fn filter<P>(&self, predicate: P) -> Shrinkable<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter_shared(Arc::new(predicate))
    }

    pub(crate) fn filter_shared(&self, predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>) -> Self {
        match &self.shrinking {
            Shrinking::Terminal => self.clone(),
            Shrinking::Exploring(candidates) => {
                let candidates = Arc::clone(candidates);
                Self {
                    value: Arc::clone(&self.value),
                    distance: self.distance.clone(),
                    shrinking: Shrinking::Exploring(Arc::new(move || {
                        candidates()
                            .into_iter()
                            .filter(|candidate| predicate(&candidate.value()))
                            .map(|candidate| candidate.filter_shared(Arc::clone(&predicate)))
                            .collect()
                    })),
                }
            }
        }
    }

    /// Derive an inner shrinkable from this one's value.
    ///
    /// The inner value is drawn from a source seeded with `seed`, so every outer
    /// candidate regenerates its inner value reproducibly.
    pub fn flat_map<U: ArbitraryValue>(
        &self,
        mapper: FlatMapper<T, U>,
        size: usize,
        seed: u64,
    ) -> Result<Shrinkable<U>> {
        let inner = mapper(self.value())
            .generator(size)
            .next(&mut create_seeded_rng(seed))?;
        Ok(self.flat_mapped(inner, mapper, size, seed))
    }

    pub(crate) fn flat_mapped<U: ArbitraryValue>(
        &self,
        inner: Shrinkable<U>,
        mapper: FlatMapper<T, U>,
        size: usize,
        seed: u64,
    ) -> Shrinkable<U> {
        let outer = self.clone();
        let distance = outer.distance.append(inner.distance());
        let source = inner.clone();
        Shrinkable::new(move || source.value(), distance, move || {
            let mut result = Vec::new();
            for candidate in outer.candidates() {
                match candidate.flat_map(Arc::clone(&mapper), size, seed) {
                    Ok(shrunk) => result.push(shrunk),
                    Err(error) => trace!(%error, "skipping flat-mapped candidate"),
                }
            }
            for candidate in inner.candidates() {
                result.push(outer.flat_mapped(candidate, Arc::clone(&mapper), size, seed));
            }
            result
        })
    }

    /// Pair with another shrinkable; the left side is shrunk first
    pub fn zip<U: ArbitraryValue>(&self, other: &Shrinkable<U>) -> Shrinkable<(T, U)> {
        let left = self.clone();
        let right = other.clone();
        let distance = left.distance.append(&right.distance);
        let (first, second) = (left.clone(), right.clone());
        Shrinkable::new(
            move || (first.value(), second.value()),
            distance,
            move || {
                let mut result: Vec<_> = left
                    .candidates()
                    .iter()
                    .map(|candidate| candidate.zip(&right))
                    .collect();
                result.extend(right.candidates().iter().map(|candidate| left.zip(candidate)));
                result
            },
        )
    }

    /// Combine a fixed number of parts, shrinking them one at a time in order
    pub fn combine<R: ArbitraryValue>(
        parts: Vec<Shrinkable<T>>,
        combinator: Arc<dyn Fn(Vec<T>) -> R + Send + Sync>,
    ) -> Shrinkable<R> {
        let distance = parts
            .iter()
            .fold(ShrinkingDistance::default(), |distance, part| {
                distance.append(part.distance())
            });
        let sources = parts.clone();
        let value_combinator = Arc::clone(&combinator);
        Shrinkable::new(
            move || value_combinator(sources.iter().map(Shrinkable::value).collect()),
            distance,
            move || {
                let mut result = Vec::new();
                for (index, part) in parts.iter().enumerate() {
                    for candidate in part.candidates() {
                        let mut replaced = parts.clone();
                        replaced[index] = candidate;
                        result.push(Shrinkable::combine(replaced, Arc::clone(&combinator)));
                    }
                }
                result
            },
        )
    }

    /// A collection of elements that never shrinks below `min_size` elements.
    ///
    /// Candidates remove elements first (shortest prefix, half prefix, then each
    /// single element) and shrink individual elements afterwards.
    pub fn collection(elements: Vec<Shrinkable<T>>, min_size: usize) -> Shrinkable<Vec<T>> {
        let distance = ShrinkingDistance::for_collection(elements.iter().map(Shrinkable::distance));
        let sources = elements.clone();
        Shrinkable::new(
            move || sources.iter().map(Shrinkable::value).collect(),
            distance,
            move || {
                let len = elements.len();
                let mut result = Vec::new();
                if len > min_size {
                    result.push(Shrinkable::collection(
                        elements[..min_size].to_vec(),
                        min_size,
                    ));
                    let half = len / 2;
                    if half > min_size {
                        result.push(Shrinkable::collection(elements[..half].to_vec(), min_size));
                    }
                    for index in 0..len {
                        let mut removed = elements.clone();
                        removed.remove(index);
                        result.push(Shrinkable::collection(removed, min_size));
                    }
                }
                for (index, element) in elements.iter().enumerate() {
                    for candidate in element.candidates() {
                        let mut replaced = elements.clone();
                        replaced[index] = candidate;
                        result.push(Shrinkable::collection(replaced, min_size));
                    }
                }
                result
            },
        )
    }
}

impl<T: ArbitraryValue> Shrinkable<Option<T>> {
    /// The minimal optional value
    pub fn absent() -> Self {
        Shrinkable::unshrinkable(|| None, ShrinkingDistance::min())
    }

    /// Wrap `inner` as present; its first candidate is always the absent value
    pub fn present(inner: &Shrinkable<T>) -> Self {
        let distance = ShrinkingDistance::of(&[1]).append(inner.distance());
        let source = inner.clone();
        let inner = inner.clone();
        Shrinkable::new(
            move || Some(source.value()),
            distance,
            move || {
                let mut result = vec![Shrinkable::absent()];
                result.extend(inner.candidates().iter().map(Shrinkable::present));
                result
            },
        )
    }
}

impl<T: ArbitraryValue + PartialEq> PartialEq for Shrinkable<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl<T: ArbitraryValue + Eq> Eq for Shrinkable<T> {}

impl<T: ArbitraryValue + Hash> Hash for Shrinkable<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value().hash(state);
    }
}

impl<T: ArbitraryValue + fmt::Debug> fmt::Debug for Shrinkable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shrinkable")
            .field("value", &self.value())
            .field("distance", &self.distance)
            .field("terminal", &self.is_terminal())
            .finish()
    }
}
