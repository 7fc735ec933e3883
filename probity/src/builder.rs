//! The builder combinator: an initial state threaded through an ordered list
//! of optionally applied mutation steps, then finalized.
//!
//! ```
//! use probity::{Arbitrary, Builders, integers, strings};
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u8,
//! }
//!
//! let people = Builders::with_builder(Person::default)
//!     .using(strings().alpha().of_length(5))
//!     .in_setter(|person, name| person.name = name)
//!     .maybe_using(integers::<u8>().between(0, 99), 0.5)
//!     .in_setter(|person, age| person.age = age)
//!     .build()
//!     .unwrap();
//!
//! assert!(people.edge_cases(20).len() > 0);
//! ```

use std::sync::Arc;

use rand::Rng;
use tracing::trace;

use crate::arbitrary::{Arbitrary, ArbitraryValue, BoxedArbitrary};
use crate::config::DEFAULT_MAX_EXHAUSTIVE_COUNT;
use crate::error::{ArbitraryError, Result};
use crate::generator::{EdgeCases, ExhaustiveGenerator, ProductIter, RandomGenerator};
use crate::primitives::create;
use crate::shrinkable::Shrinkable;

type Effect<B> = Arc<dyn Fn(B) -> B + Send + Sync>;

/// What a single step does to the state; `None` when the step was skipped
type StepEffect<B> = Option<Effect<B>>;

type Finalizer<B, T> = Arc<dyn Fn(B) -> T + Send + Sync>;

/// How a step changes the builder state
pub enum Mutator<B, T> {
    /// Consumes the state and returns the next one
    Returning(Arc<dyn Fn(B, T) -> B + Send + Sync>),
    /// Changes the state in place
    InPlace(Arc<dyn Fn(&mut B, T) + Send + Sync>),
}

impl<B, T> Clone for Mutator<B, T> {
    fn clone(&self) -> Self {
        match self {
            Mutator::Returning(mutator) => Mutator::Returning(Arc::clone(mutator)),
            Mutator::InPlace(setter) => Mutator::InPlace(Arc::clone(setter)),
        }
    }
}

impl<B, T> Mutator<B, T> {
    pub fn apply(&self, state: B, input: T) -> B {
        match self {
            Mutator::Returning(mutator) => mutator(state, input),
            Mutator::InPlace(setter) => {
                let mut state = state;
                setter(&mut state, input);
                state
            }
        }
    }
}

fn effect_of<B, T>(mutator: Mutator<B, T>) -> Arc<dyn Fn(Option<T>) -> StepEffect<B> + Send + Sync>
where
    B: ArbitraryValue,
    T: ArbitraryValue,
{
    Arc::new(move |input: Option<T>| {
        input.map(|input| {
            let mutator = mutator.clone();
            Arc::new(move |state: B| mutator.apply(state, input.clone())) as Effect<B>
        })
    })
}

/// One step: an input arbitrary, a mutator, and an inclusion probability
struct BuilderStep<B, T> {
    input: BoxedArbitrary<T>,
    mutator: Mutator<B, T>,
    probability: f64,
}

impl<B: ArbitraryValue, T: ArbitraryValue> BuilderStep<B, T> {
    fn skipped(&self) -> Shrinkable<StepEffect<B>> {
        Shrinkable::<Option<T>>::absent().map_shared(effect_of(self.mutator.clone()))
    }

    fn included(&self, input: &Shrinkable<T>) -> Shrinkable<StepEffect<B>> {
        let effect = effect_of(self.mutator.clone());
        if self.probability >= 1.0 {
            input.map(Some).map_shared(effect)
        } else {
            Shrinkable::present(input).map_shared(effect)
        }
    }
}

impl<B: ArbitraryValue, T: ArbitraryValue> Arbitrary for BuilderStep<B, T> {
    type Value = StepEffect<B>;

    fn generator(&self, size: usize) -> RandomGenerator<StepEffect<B>> {
        let mut input = self.input.generator(size);
        let step = BuilderStep {
            input: self.input.clone(),
            mutator: self.mutator.clone(),
            probability: self.probability,
        };
        RandomGenerator::new(move |rng| {
            if step.probability <= 0.0 {
                return Ok(step.skipped());
            }
            let sampled = input.next(rng)?;
            if step.probability >= 1.0 || rng.gen_bool(step.probability) {
                Ok(step.included(&sampled))
            } else {
                Ok(step.skipped())
            }
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<StepEffect<B>> {
        let mut cases = Vec::new();
        if self.probability < 1.0 {
            cases.push(self.skipped());
        }
        if self.probability > 0.0 {
            for input in self.input.edge_cases(max_edge_cases) {
                cases.push(self.included(&input));
            }
        }
        EdgeCases::from_shrinkables(cases).truncated(max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<StepEffect<B>>> {
        let effect = effect_of(self.mutator.clone());
        if self.probability <= 0.0 {
            return Some(ExhaustiveGenerator::from_values(vec![None]).map(effect));
        }
        if self.probability < 1.0 {
            trace!(
                probability = self.probability,
                "no exhaustive generation for partially applied builder steps"
            );
            return None;
        }
        let inputs = self.input.exhaustive_with_max(max_count)?;
        Some(inputs.map::<Option<T>>(Arc::new(Some)).map(effect))
    }
}

fn fold_steps<B, T>(state: B, effects: &[StepEffect<B>], finalizer: &Finalizer<B, T>) -> T {
    let state = effects
        .iter()
        .flatten()
        .fold(state, |state, effect| effect(state));
    finalizer(state)
}

/// The shrinkable of one built value.
///
/// Candidates skip optional steps first, then shrink step inputs in
/// declaration order, then shrink the initial state.
fn built<B, T>(
    initial: Shrinkable<B>,
    steps: Vec<Shrinkable<StepEffect<B>>>,
    finalizer: Finalizer<B, T>,
) -> Shrinkable<T>
where
    B: ArbitraryValue,
    T: ArbitraryValue,
{
    let distance = steps
        .iter()
        .fold(initial.distance().clone(), |distance, step| {
            distance.append(step.distance())
        });
    let (source, sources, value_finalizer) = (initial.clone(), steps.clone(), Arc::clone(&finalizer));
    Shrinkable::new(
        move || {
            let effects: Vec<StepEffect<B>> = sources.iter().map(Shrinkable::value).collect();
            fold_steps(source.value(), &effects, &value_finalizer)
        },
        distance,
        move || {
            let mut skips = Vec::new();
            let mut shrunk = Vec::new();
            for (index, step) in steps.iter().enumerate() {
                for candidate in step.candidates() {
                    let skipped = candidate.value().is_none();
                    let mut replaced = steps.clone();
                    replaced[index] = candidate;
                    let rebuilt = built(initial.clone(), replaced, Arc::clone(&finalizer));
                    if skipped {
                        skips.push(rebuilt);
                    } else {
                        shrunk.push(rebuilt);
                    }
                }
            }
            skips.extend(shrunk);
            for candidate in initial.candidates() {
                skips.push(built(candidate, steps.clone(), Arc::clone(&finalizer)));
            }
            skips
        },
    )
}

/// Entry point of the builder combinator
pub struct Builders;

impl Builders {
    /// Start from a fresh state created by `supplier` for every sample
    pub fn with_builder<B, F>(supplier: F) -> BuilderCombinator<B>
    where
        B: ArbitraryValue,
        F: Fn() -> B + Send + Sync + 'static,
    {
        Self::with_builder_from(create(supplier))
    }

    /// Start from a state sampled from `initial`
    pub fn with_builder_from<A: Arbitrary + 'static>(initial: A) -> BuilderCombinator<A::Value> {
        BuilderCombinator {
            initial: initial.boxed(),
            steps: Vec::new(),
            error: None,
        }
    }
}

/// A builder under construction
pub struct BuilderCombinator<B> {
    initial: BoxedArbitrary<B>,
    steps: Vec<BoxedArbitrary<StepEffect<B>>>,
    error: Option<ArbitraryError>,
}

impl<B: ArbitraryValue> Clone for BuilderCombinator<B> {
    fn clone(&self) -> Self {
        Self {
            initial: self.initial.clone(),
            steps: self.steps.clone(),
            error: self.error.clone(),
        }
    }
}

impl<B: ArbitraryValue> BuilderCombinator<B> {
    /// Always apply the next step with a value from `input`
    pub fn using<A: Arbitrary + 'static>(self, input: A) -> CombinableBuilder<B, A::Value> {
        CombinableBuilder {
            builder: self,
            input: input.boxed(),
            probability: 1.0,
        }
    }

    /// Apply the next step with the given probability.
    ///
    /// A probability outside `[0.0, 1.0]` makes `build` fail.
    pub fn maybe_using<A: Arbitrary + 'static>(
        mut self,
        input: A,
        probability: f64,
    ) -> CombinableBuilder<B, A::Value> {
        let probability = match ArbitraryError::check_probability(probability) {
            Ok(probability) => probability,
            Err(error) => {
                self.error.get_or_insert(error);
                0.0
            }
        };
        CombinableBuilder {
            builder: self,
            input: input.boxed(),
            probability,
        }
    }

    /// Finish with the final state as the generated value
    pub fn build(self) -> Result<BuilderArbitrary<B, B>> {
        self.build_with(|state| state)
    }

    /// Finish by converting the final state with `finalizer`
    pub fn build_with<T, F>(self, finalizer: F) -> Result<BuilderArbitrary<B, T>>
    where
        T: ArbitraryValue,
        F: Fn(B) -> T + Send + Sync + 'static,
    {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(BuilderArbitrary {
            initial: self.initial,
            steps: self.steps,
            finalizer: Arc::new(finalizer),
        })
    }
}

/// A builder waiting for the mutator of its latest step
pub struct CombinableBuilder<B, T> {
    builder: BuilderCombinator<B>,
    input: BoxedArbitrary<T>,
    probability: f64,
}

impl<B: ArbitraryValue, T: ArbitraryValue> CombinableBuilder<B, T> {
    /// Mutate by consuming the state and returning the next one
    pub fn apply<F>(self, mutator: F) -> BuilderCombinator<B>
    where
        F: Fn(B, T) -> B + Send + Sync + 'static,
    {
        self.step(Mutator::Returning(Arc::new(mutator)))
    }

    /// Mutate the state in place
    pub fn in_setter<F>(self, setter: F) -> BuilderCombinator<B>
    where
        F: Fn(&mut B, T) + Send + Sync + 'static,
    {
        self.step(Mutator::InPlace(Arc::new(setter)))
    }

    fn step(self, mutator: Mutator<B, T>) -> BuilderCombinator<B> {
        let mut builder = self.builder;
        builder.steps.push(
            BuilderStep {
                input: self.input,
                mutator,
                probability: self.probability,
            }
            .boxed(),
        );
        builder
    }
}

/// The arbitrary produced by a finished builder
pub struct BuilderArbitrary<B, T> {
    initial: BoxedArbitrary<B>,
    steps: Vec<BoxedArbitrary<StepEffect<B>>>,
    finalizer: Finalizer<B, T>,
}

impl<B, T> Clone for BuilderArbitrary<B, T> {
    fn clone(&self) -> Self {
        Self {
            initial: self.initial.clone(),
            steps: self.steps.clone(),
            finalizer: Arc::clone(&self.finalizer),
        }
    }
}

impl<B: ArbitraryValue, T: ArbitraryValue> BuilderArbitrary<B, T> {
    /// Number of declared steps
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

impl<B, T> Arbitrary for BuilderArbitrary<B, T>
where
    B: ArbitraryValue,
    T: ArbitraryValue + PartialEq,
{
    type Value = T;

    fn generator(&self, size: usize) -> RandomGenerator<T> {
        let mut initial = self.initial.generator(size);
        let mut steps: Vec<_> = self.steps.iter().map(|step| step.generator(size)).collect();
        let finalizer = Arc::clone(&self.finalizer);
        RandomGenerator::new(move |rng| {
            let state = initial.next(rng)?;
            let effects = steps
                .iter_mut()
                .map(|step| step.next(rng))
                .collect::<Result<Vec<_>>>()?;
            Ok(built(state, effects, Arc::clone(&finalizer)))
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        let pools: Vec<Vec<Shrinkable<StepEffect<B>>>> = self
            .steps
            .iter()
            .map(|step| step.edge_cases(max_edge_cases).into_vec())
            .collect();
        let candidates = self
            .initial
            .edge_cases(max_edge_cases)
            .into_iter()
            .flat_map(|initial| {
                let finalizer = Arc::clone(&self.finalizer);
                ProductIter::new(pools.clone())
                    .map(move |effects| built(initial.clone(), effects, Arc::clone(&finalizer)))
            })
            .take(DEFAULT_MAX_EXHAUSTIVE_COUNT as usize);
        EdgeCases::distinct(candidates, max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        let initial = self.initial.exhaustive_with_max(max_count)?;
        let steps = self
            .steps
            .iter()
            .map(|step| step.exhaustive_with_max(max_count))
            .collect::<Option<Vec<_>>>()?;
        let count = steps
            .iter()
            .try_fold(initial.max_count(), |count, step| {
                count.checked_mul(step.max_count())
            })
            .filter(|count| *count <= max_count);
        let Some(count) = count else {
            trace!(max_count, "builder domain exceeds exhaustive ceiling");
            return None;
        };
        let finalizer = Arc::clone(&self.finalizer);
        let built = ExhaustiveGenerator::new(count, move || {
            let pools: Vec<Vec<StepEffect<B>>> = steps.iter().map(|step| step.iter().collect()).collect();
            let finalizer = Arc::clone(&finalizer);
            initial.iter().flat_map(move |state| {
                let finalizer = Arc::clone(&finalizer);
                ProductIter::new(pools.clone())
                    .map(move |effects| fold_steps(state.clone(), &effects, &finalizer))
            })
        });
        Some(built.distinct())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{integers, of};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_mutator_variants() {
        let returning: Mutator<Vec<i32>, i32> = Mutator::Returning(Arc::new(|mut state: Vec<i32>, value: i32| {
            state.push(value);
            state
        }));
        let in_place: Mutator<Vec<i32>, i32> =
            Mutator::InPlace(Arc::new(|state: &mut Vec<i32>, value: i32| state.push(value * 10)));
        let state = in_place.apply(returning.apply(Vec::new(), 1), 2);
        assert_eq!(state, vec![1, 20]);
    }

    #[test]
    fn test_invalid_probability_fails_build() {
        let result = Builders::with_builder(String::new)
            .maybe_using(of(vec!['a']).unwrap(), 1.5)
            .in_setter(|state, c| state.push(c))
            .build();
        assert_eq!(
            result.err(),
            Some(ArbitraryError::InvalidProbability { probability: 1.5 })
        );
    }

    #[test]
    fn test_shrinking_skips_optional_steps_first() {
        let arbitrary = Builders::with_builder(Vec::<u32>::new)
            .maybe_using(integers::<u32>().between(1, 100), 0.99)
            .in_setter(|state, value| state.push(value))
            .using(integers::<u32>().between(1, 100))
            .in_setter(|state, value| state.push(value))
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let mut generator = arbitrary.generator(100);
        let shrinkable = (0..100)
            .map(|_| generator.next(&mut rng).unwrap())
            .find(|shrinkable| shrinkable.value().len() == 2)
            .expect("both steps applied at least once");
        let first = shrinkable.candidates().remove(0).value();
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_partial_probability_disables_exhaustive() {
        let arbitrary = Builders::with_builder(|| 0u8)
            .maybe_using(integers::<u8>().between(0, 2), 0.5)
            .apply(|state, value| state + value)
            .build()
            .unwrap();
        assert!(arbitrary.exhaustive().is_none());
    }

    #[test]
    fn test_zero_probability_counts_once() {
        let arbitrary = Builders::with_builder(|| 0u8)
            .maybe_using(integers::<u8>().between(0, 2), 0.0)
            .apply(|state, value| state + value)
            .using(integers::<u8>().between(0, 2))
            .apply(|state, value| state + value)
            .build()
            .unwrap();
        let exhaustive = arbitrary.exhaustive().unwrap();
        assert_eq!(exhaustive.max_count(), 3);
        assert_eq!(exhaustive.iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
