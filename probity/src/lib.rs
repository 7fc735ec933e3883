#![allow(clippy::result_large_err)]
#![allow(clippy::type_complexity)]

//! # Probity - Generation and Shrinking for Property-Based Testing
//!
//! Probity provides the value side of property-based testing: composable
//! arbitraries that generate random values, report deterministic edge cases
//! and enumerate small domains exhaustively, together with shrinkable values
//! and a bounded shrinking search that reduces a failing value to a simpler
//! one that still fails.
//!
//! ## Quick Start
//!
//! ```rust
//! use probity::{Arbitrary, ShrinkConfig, create_seeded_rng, falsify_unless, integers};
//!
//! let arbitrary = integers::<i32>().between(10, 1000);
//! let mut rng = create_seeded_rng(42);
//! let shrinkable = arbitrary.generator(100).next(&mut rng).unwrap();
//!
//! // A property that fails for every value shrinks to the simplest one
//! let result = shrinkable
//!     .shrink(falsify_unless(|value: &i32| *value < 10))
//!     .run(&ShrinkConfig::default());
//! assert_eq!(result.minimal, 10);
//! ```

pub mod arbitrary;
pub mod builder;
pub mod combinators;
pub mod config;
pub mod distance;
pub mod error;
pub mod falsifier;
pub mod frequency;
pub mod generator;
pub mod primitives;
pub mod resolution;
pub mod rng;
pub mod shrink;
pub mod shrinkable;

pub use arbitrary::{Arbitrary, ArbitraryValue, BoxedArbitrary};
pub use builder::{BuilderArbitrary, BuilderCombinator, Builders, CombinableBuilder, Mutator};
pub use combinators::{combine, frequency_of, one_of};
pub use config::{
    DEFAULT_EDGE_CASE_PROBABILITY, DEFAULT_FILTER_MAX_MISSES, DEFAULT_GENERATION_SIZE,
    DEFAULT_MAX_EDGE_CASES, DEFAULT_MAX_EXHAUSTIVE_COUNT, GenerationConfig,
};
pub use distance::ShrinkingDistance;
pub use error::{ArbitraryError, Result};
pub use falsifier::{Falsification, Falsifier, falsify_unless, falsify_unless_assuming};
pub use frequency::Frequency;
pub use generator::{EdgeCases, ExhaustiveGenerator, RandomGenerator};
pub use primitives::*;
pub use resolution::{
    AnyValue, ArbitraryResolver, Arguments, Creator, CreatorDiscovery, CreatorFilter, CreatorKind,
    CreatorSignature, ErasedArbitrary, ProviderRegistry, TypeArbitrary, TypeDescriptor,
    Visibility, erase,
};
pub use rng::{create_rng, create_seeded_rng, derive_rng};
pub use shrink::{ShrinkConfig, ShrinkResult, ShrinkStep, ShrinkingSequence};
pub use shrinkable::{FlatMapper, Shrinkable};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_shrink_config_defaults() {
        let config = ShrinkConfig::default();
        assert_eq!(config.max_attempts, 10_000);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(!config.verbose);
    }

    #[test]
    fn test_generation_config_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.max_exhaustive_count, DEFAULT_MAX_EXHAUSTIVE_COUNT);
        assert_eq!(config.max_edge_cases, DEFAULT_MAX_EDGE_CASES);
    }
}
