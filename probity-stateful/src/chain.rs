//! Chains: bounded sequences of transformations applied to an evolving state.
//!
//! A chain records which provider was chosen at every step and the seed its
//! transformer was drawn from. Shrinking replays those records against a
//! freshly created initial state, so removing a step regenerates every later
//! transformer from the state it now sees.

use std::fmt;
use std::sync::Arc;

use probity::{
    Arbitrary, ArbitraryValue, EdgeCases, ExhaustiveGenerator, Frequency,
    RandomGenerator, Shrinkable, ShrinkingDistance, create_seeded_rng, derive_rng,
};
use rand::RngCore;
use tracing::{debug, trace};

use crate::error::{ChainError, Result};
use crate::transformer::{Transformer, TransformerProvider};

/// Lower bound of the chain length derived from the generation size
pub const DEFAULT_CHAIN_MIN_SIZE: usize = 10;

type Supplier<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// The states visited by one generated chain and the transformers between them
pub struct Chain<T> {
    states: Vec<T>,
    transformers: Vec<Transformer<T>>,
    max_size: usize,
}

impl<T: Clone> Clone for Chain<T> {
    fn clone(&self) -> Self {
        Self {
            states: self.states.clone(),
            transformers: self.transformers.clone(),
            max_size: self.max_size,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("transformations", &self.transformations())
            .field("states", &self.states)
            .field("max_size", &self.max_size)
            .finish()
    }
}

impl<T> Chain<T> {
    /// The initial state followed by the state after every step
    pub fn states(&self) -> &[T] {
        &self.states
    }

    pub fn transformers(&self) -> &[Transformer<T>] {
        &self.transformers
    }

    /// Descriptions of the applied transformers, in order
    pub fn transformations(&self) -> Vec<&str> {
        self.transformers
            .iter()
            .map(|transformer| transformer.description())
            .collect()
    }

    pub fn final_state(&self) -> &T {
        // never empty: the initial state is always recorded
        &self.states[self.states.len() - 1]
    }

    /// Number of applied steps
    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    /// The length this chain was allowed to reach
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

/// A recorded step: the chosen provider, the transformer seed, and the
/// transformer a shrink replaced it with
struct Step<T> {
    provider: usize,
    seed: u64,
    shrunk: Option<Shrinkable<Transformer<T>>>,
}

impl<T> Clone for Step<T> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider,
            seed: self.seed,
            shrunk: self.shrunk.clone(),
        }
    }
}

impl<T> Step<T> {
    fn regenerated(&self) -> Self {
        Self {
            provider: self.provider,
            seed: self.seed,
            shrunk: None,
        }
    }
}

struct ChainSetup<T> {
    initial: Supplier<T>,
    providers: Frequency<TransformerProvider<T>>,
    max_size: usize,
    size: usize,
}

/// A chain in the making
struct Run<T> {
    states: Vec<T>,
    steps: Vec<Step<T>>,
    transformers: Vec<Shrinkable<Transformer<T>>>,
}

impl<T: ArbitraryValue> Run<T> {
    fn start(setup: &ChainSetup<T>) -> Self {
        Self {
            states: vec![(setup.initial)()],
            steps: Vec::new(),
            transformers: Vec::new(),
        }
    }

    fn current(&self) -> &T {
        &self.states[self.states.len() - 1]
    }

    /// Apply `step`; steps whose provider does not accept the current state are dropped
    fn push(&mut self, setup: &ChainSetup<T>, step: Step<T>) -> probity::Result<()> {
        let state = self.current();
        let Some(provider) = setup.providers.get(step.provider) else {
            return Ok(());
        };
        if !provider.is_applicable(state) {
            return Ok(());
        }
        let transformer = match &step.shrunk {
            Some(shrunk) => shrunk.clone(),
            None => provider
                .transformers(state)
                .generator(setup.size)
                .next(&mut create_seeded_rng(step.seed))?,
        };
        let next = transformer.value().transform(state.clone());
        self.states.push(next);
        self.steps.push(step);
        self.transformers.push(transformer);
        Ok(())
    }

    fn into_shrinkable(self, setup: Arc<ChainSetup<T>>) -> Shrinkable<Chain<T>> {
        let transformed: u128 = self
            .transformers
            .iter()
            .map(|transformer| transformer.distance().total())
            .sum();
        let distance = ShrinkingDistance::of(&[
            self.steps.len() as u64,
            u64::try_from(transformed).unwrap_or(u64::MAX),
        ]);
        let chain = Chain {
            states: self.states,
            transformers: self.transformers.iter().map(Shrinkable::value).collect(),
            max_size: setup.max_size,
        };
        let (steps, transformers) = (self.steps, self.transformers);
        Shrinkable::new(move || chain.clone(), distance, move || {
            setup.candidates(&steps, &transformers)
        })
    }
}

impl<T: ArbitraryValue> ChainSetup<T> {
    fn generate(self: &Arc<Self>, rng: &mut dyn RngCore) -> probity::Result<Shrinkable<Chain<T>>> {
        let mut rng = derive_rng(rng);
        let mut run = Run::start(self);
        for _ in 0..self.max_size {
            let state = run.current();
            let Some(provider) = self
                .providers
                .choose_index_where(&mut rng, |_, provider| provider.is_applicable(state))
            else {
                trace!(steps = run.steps.len(), "no applicable transformer provider, chain stops");
                break;
            };
            let seed = rng.next_u64();
            run.push(
                self,
                Step {
                    provider,
                    seed,
                    shrunk: None,
                },
            )?;
        }
        debug!(steps = run.steps.len(), max_size = self.max_size, "generated chain");
        Ok(run.into_shrinkable(Arc::clone(self)))
    }

    fn replay(&self, plan: Vec<Step<T>>) -> probity::Result<Run<T>> {
        let mut run = Run::start(self);
        for step in plan {
            run.push(self, step)?;
        }
        Ok(run)
    }

    /// Shorter prefixes, then single step removals, then shrunk transformers
    fn candidates(
        self: &Arc<Self>,
        steps: &[Step<T>],
        transformers: &[Shrinkable<Transformer<T>>],
    ) -> Vec<Shrinkable<Chain<T>>> {
        let len = steps.len();
        let mut plans: Vec<Vec<Step<T>>> = Vec::new();

        let mut prefixes = vec![0, len / 2];
        prefixes.dedup();
        prefixes.retain(|prefix| *prefix < len);
        for prefix in &prefixes {
            plans.push(steps[..*prefix].to_vec());
        }

        for removed in 0..len {
            if removed + 1 == len && prefixes.contains(&removed) {
                continue;
            }
            let mut plan = steps[..removed].to_vec();
            plan.extend(steps[removed + 1..].iter().map(Step::regenerated));
            plans.push(plan);
        }

        for (index, transformer) in transformers.iter().enumerate() {
            for candidate in transformer.candidates() {
                let mut plan = steps[..index].to_vec();
                plan.push(Step {
                    shrunk: Some(candidate),
                    ..steps[index].regenerated()
                });
                plan.extend(steps[index + 1..].iter().map(Step::regenerated));
                plans.push(plan);
            }
        }

        plans
            .into_iter()
            .filter_map(|plan| match self.replay(plan) {
                Ok(run) => Some(run.into_shrinkable(Arc::clone(self))),
                Err(error) => {
                    trace!(%error, "dropping chain candidate that failed to replay");
                    None
                }
            })
            .collect()
    }
}

/// Arbitrary of chains starting from a fresh initial state.
///
/// Chains report no edge cases and cannot be enumerated exhaustively.
pub struct ChainArbitrary<T> {
    initial: Supplier<T>,
    providers: Vec<(u32, TransformerProvider<T>)>,
    max_size: Option<usize>,
}

impl<T> Clone for ChainArbitrary<T> {
    fn clone(&self) -> Self {
        Self {
            initial: Arc::clone(&self.initial),
            providers: self.providers.clone(),
            max_size: self.max_size,
        }
    }
}

impl<T: ArbitraryValue> ChainArbitrary<T> {
    /// Create a chain arbitrary from weighted providers; at least one weight must be positive
    pub fn new<F>(initial: F, providers: Vec<(u32, TransformerProvider<T>)>) -> Result<Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        if providers.iter().all(|(frequency, _)| *frequency == 0) {
            return Err(ChainError::EmptyProviderSet);
        }
        Ok(Self {
            initial: Arc::new(initial),
            providers,
            max_size: None,
        })
    }

    /// Add another weighted provider
    pub fn with_transformation(mut self, frequency: u32, provider: TransformerProvider<T>) -> Self {
        self.providers.push((frequency, provider));
        self
    }

    /// Fix the chain length instead of deriving it from the generation size
    pub fn of_max_size(mut self, max_size: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(ChainError::InvalidSize {
                message: "maximum chain size must be positive".to_string(),
            });
        }
        self.max_size = Some(max_size);
        Ok(self)
    }

    /// The number of steps a chain generated for `size` attempts
    pub fn effective_size(&self, size: usize) -> usize {
        self.max_size.unwrap_or_else(|| {
            ((size as f64).sqrt().round() as usize).max(DEFAULT_CHAIN_MIN_SIZE)
        })
    }

    fn setup(&self, size: usize) -> probity::Result<ChainSetup<T>> {
        Ok(ChainSetup {
            initial: Arc::clone(&self.initial),
            providers: Frequency::new(self.providers.clone())?,
            max_size: self.effective_size(size),
            size,
        })
    }
}

impl<T: ArbitraryValue> Arbitrary for ChainArbitrary<T> {
    type Value = Chain<T>;

    fn generator(&self, size: usize) -> RandomGenerator<Chain<T>> {
        match self.setup(size) {
            Ok(setup) => {
                let setup = Arc::new(setup);
                RandomGenerator::new(move |rng| setup.generate(rng))
            }
            Err(error) => RandomGenerator::new(move |_| Err(error.clone())),
        }
    }

    fn edge_cases(&self, _max_edge_cases: usize) -> EdgeCases<Chain<T>> {
        EdgeCases::none()
    }

    fn exhaustive_with_max(&self, _max_count: u64) -> Option<ExhaustiveGenerator<Chain<T>>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn counting() -> ChainArbitrary<i32> {
        ChainArbitrary::new(
            || 0,
            vec![(
                1,
                TransformerProvider::from_fn(|_: &i32| Transformer::new("inc", |value: i32| value + 1)),
            )],
        )
        .unwrap()
    }

    #[test]
    fn test_effective_size() {
        let chains = counting();
        assert_eq!(chains.effective_size(1), 10);
        assert_eq!(chains.effective_size(100), 10);
        assert_eq!(chains.effective_size(400), 20);
        assert_eq!(chains.of_max_size(3).unwrap().effective_size(10_000), 3);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            counting().of_max_size(0),
            Err(ChainError::InvalidSize { .. })
        ));
        let empty = ChainArbitrary::<i32>::new(|| 0, Vec::new());
        assert_eq!(empty.err().map(|e| e.to_string()), Some(ChainError::EmptyProviderSet.to_string()));
        let zero = ChainArbitrary::new(
            || 0,
            vec![(0, TransformerProvider::from_fn(|_: &i32| Transformer::noop()))],
        );
        assert!(zero.is_err());
    }

    #[test]
    fn test_states_follow_transformers() {
        let mut rng = StdRng::seed_from_u64(1);
        let chain = counting().of_max_size(4).unwrap().generator(10).sample(&mut rng).unwrap();
        assert_eq!(chain.states(), &[0, 1, 2, 3, 4]);
        assert_eq!(chain.transformations(), vec!["inc"; 4]);
        assert_eq!(*chain.final_state(), 4);
        assert_eq!(chain.max_size(), 4);
    }

    #[test]
    fn test_precondition_stops_chain() {
        let bounded = ChainArbitrary::new(
            || 0,
            vec![(
                1,
                TransformerProvider::from_fn(|_: &i32| Transformer::new("inc", |value: i32| value + 1))
                    .when(|value| *value < 3),
            )],
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let chain = bounded.generator(100).sample(&mut rng).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(*chain.final_state(), 3);
    }

    #[test]
    fn test_no_edge_cases_or_exhaustive() {
        let chains = counting();
        assert!(chains.edge_cases(100).is_empty());
        assert!(chains.exhaustive().is_none());
    }

    #[test]
    fn test_removal_candidates_are_shorter() {
        let mut rng = StdRng::seed_from_u64(3);
        let shrinkable = counting().of_max_size(4).unwrap().generator(10).next(&mut rng).unwrap();
        let lengths: Vec<usize> = shrinkable
            .candidates()
            .iter()
            .map(|candidate| candidate.value().len())
            .collect();
        // prefixes of 0 and 2, then every single removal
        assert_eq!(lengths, vec![0, 2, 3, 3, 3, 3]);
    }

    #[test]
    fn test_replay_drops_steps_whose_precondition_fails() {
        let doubling = ChainArbitrary::new(
            || 0,
            vec![
                (
                    1,
                    TransformerProvider::from_fn(|_: &i32| Transformer::new("inc", |value: i32| value + 1))
                        .when(|value| *value == 0),
                ),
                (
                    1,
                    TransformerProvider::from_fn(|_: &i32| Transformer::new("double", |value: i32| value * 2))
                        .when(|value| *value > 0),
                ),
            ],
        )
        .unwrap()
        .of_max_size(3)
        .unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let shrinkable = doubling.generator(10).next(&mut rng).unwrap();
        assert_eq!(shrinkable.value().transformations(), vec!["inc", "double", "double"]);
        assert_eq!(shrinkable.value().states(), &[0, 1, 2, 4]);

        let candidates: Vec<Chain<i32>> = shrinkable
            .candidates()
            .iter()
            .map(Shrinkable::value)
            .collect();
        let lengths: Vec<usize> = candidates.iter().map(Chain::len).collect();
        // prefixes of 0 and 1, then removing each of the three steps
        assert_eq!(lengths, vec![0, 1, 0, 2, 2]);
        // without the leading inc neither double applies to the initial state
        assert!(candidates[2].is_empty());
        assert_eq!(candidates[2].states(), &[0]);
        assert_eq!(candidates[3].states(), &[0, 1, 2]);
    }
}
