//! Configuration types for controlling generation parameters.

use crate::error::{ArbitraryError, Result};

/// Global ceiling for exhaustive enumeration
pub const DEFAULT_MAX_EXHAUSTIVE_COUNT: u64 = 1_000_000;

/// Default number of edge cases requested when no explicit maximum is given
pub const DEFAULT_MAX_EDGE_CASES: usize = 20;

/// Default number of consecutive rejections `filter` and `unique` tolerate;
/// override per arbitrary with `with_max_misses`
pub const DEFAULT_FILTER_MAX_MISSES: usize = 10_000;

/// Size hint used when a value has to be regenerated outside of a sized generator
pub const DEFAULT_GENERATION_SIZE: usize = 1000;

/// Default probability of injecting an edge case into random generation
pub const DEFAULT_EDGE_CASE_PROBABILITY: f64 = 0.05;

/// Configuration for generation
///
/// All `with_*` methods return a modified copy; a config that passed
/// [`GenerationConfig::new`] or [`GenerationConfig::validate`] stays valid.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Exhaustive generation is disabled when the domain exceeds this count
    pub max_exhaustive_count: u64,
    /// Upper bound for edge cases mixed into embedded-edge-case generators
    pub max_edge_cases: usize,
    /// Probability of drawing an edge case instead of a random value
    pub edge_case_probability: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_exhaustive_count: DEFAULT_MAX_EXHAUSTIVE_COUNT,
            max_edge_cases: DEFAULT_MAX_EDGE_CASES,
            edge_case_probability: DEFAULT_EDGE_CASE_PROBABILITY,
        }
    }
}

impl GenerationConfig {
    /// Create a new generation configuration with validation
    pub fn new(
        max_exhaustive_count: u64,
        max_edge_cases: usize,
        edge_case_probability: f64,
    ) -> Result<Self> {
        let config = Self {
            max_exhaustive_count,
            max_edge_cases,
            edge_case_probability,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the generation configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_exhaustive_count == 0 {
            return Err(ArbitraryError::config_error_with_field(
                "exhaustive ceiling must be > 0",
                "max_exhaustive_count",
            ));
        }
        ArbitraryError::check_probability(self.edge_case_probability)?;
        Ok(())
    }

    /// Copy with a different exhaustive ceiling
    pub fn with_max_exhaustive_count(mut self, count: u64) -> Self {
        self.max_exhaustive_count = count;
        self
    }

    /// Copy with a different edge case maximum
    pub fn with_max_edge_cases(mut self, count: usize) -> Self {
        self.max_edge_cases = count;
        self
    }

    /// Copy with a different edge case injection probability
    pub fn with_edge_case_probability(mut self, probability: f64) -> Self {
        self.edge_case_probability = probability;
        self
    }
}
