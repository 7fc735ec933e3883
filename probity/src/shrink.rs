//! Shrinking search for minimizing falsifying values.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::arbitrary::ArbitraryValue;
use crate::error::{ArbitraryError, Result};
use crate::falsifier::{Falsification, Falsifier};
use crate::shrinkable::Shrinkable;

/// Result of a shrinking run
#[derive(Debug, Clone)]
pub struct ShrinkResult<T> {
    /// Original value that failed
    pub original: T,
    /// Minimal value that still fails
    pub minimal: T,
    /// Number of successful shrinking steps
    pub steps: usize,
    /// Number of falsifier evaluations that did not discard the candidate
    pub attempts: usize,
    /// Number of discarded candidates
    pub discards: usize,
    /// Time spent shrinking
    pub duration: Duration,
    /// Whether the search ran to completion rather than hitting its budget
    pub completed: bool,
}

impl<T: Clone> ShrinkResult<T> {
    /// Create a shrink result for when no shrinking was performed
    pub fn no_shrinking(original: T) -> Self {
        Self {
            minimal: original.clone(),
            original,
            steps: 0,
            attempts: 0,
            discards: 0,
            duration: Duration::from_secs(0),
            completed: true,
        }
    }
}

/// Configuration for shrinking behavior
#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkConfig {
    /// Maximum number of non-discarded falsifier evaluations
    pub max_attempts: usize,
    /// Timeout for the shrinking process
    pub timeout: Duration,
    /// Emit a debug event for every successful step
    pub verbose: bool,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10_000,
            timeout: Duration::from_secs(10),
            verbose: false,
        }
    }
}

impl ShrinkConfig {
    /// Create a new shrink configuration with validation
    pub fn new(max_attempts: usize, timeout: Duration, verbose: bool) -> Result<Self> {
        let config = Self {
            max_attempts,
            timeout,
            verbose,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(ArbitraryError::config_error_with_field(
                "max_attempts must be > 0",
                "max_attempts",
            ));
        }
        if self.timeout.is_zero() {
            return Err(ArbitraryError::config_error_with_field(
                "timeout must be > 0",
                "timeout",
            ));
        }
        Ok(())
    }

    /// Copy with a custom timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Copy with a custom attempt budget
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

/// Outcome of a single search step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShrinkStep {
    /// A smaller falsifying candidate replaced the current best
    Improved,
    /// The evaluated candidate does not falsify
    Rejected,
    /// The evaluated candidate was discarded
    Discarded,
    /// No candidate is left to evaluate
    Exhausted,
}

/// Search cursor over the shrink space of one falsifying value.
///
/// The frontier only ever yields candidates strictly smaller than the current
/// best, which bounds the search even when candidate sources are unbounded in
/// breadth. Stepping is deterministic: the same shrinkable and falsifier always
/// walk the same path.
pub struct ShrinkingSequence<T, F> {
    falsifier: F,
    original: Shrinkable<T>,
    current: Shrinkable<T>,
    frontier: VecDeque<Shrinkable<T>>,
    steps: usize,
    attempts: usize,
    discards: usize,
}

impl<T: ArbitraryValue, F: Falsifier<T>> ShrinkingSequence<T, F> {
    pub(crate) fn new(start: Shrinkable<T>, falsifier: F) -> Self {
        let frontier = start.candidates().into();
        Self {
            falsifier,
            original: start.clone(),
            current: start,
            frontier,
            steps: 0,
            attempts: 0,
            discards: 0,
        }
    }

    /// A sequence that ends immediately at `start`
    pub(crate) fn dont_shrink(start: Shrinkable<T>, falsifier: F) -> Self {
        Self {
            falsifier,
            original: start.clone(),
            current: start,
            frontier: VecDeque::new(),
            steps: 0,
            attempts: 0,
            discards: 0,
        }
    }

    /// Evaluate the next candidate smaller than the current best
    pub fn next(&mut self) -> ShrinkStep {
        while let Some(candidate) = self.frontier.pop_front() {
            if candidate.distance() >= self.current.distance() {
                continue;
            }
            return match self.falsifier.test(&candidate.value()) {
                Falsification::StillFalsifies => {
                    self.attempts += 1;
                    self.steps += 1;
                    trace!(
                        step = self.steps,
                        distance = %candidate.distance(),
                        "shrink step improved"
                    );
                    self.frontier = candidate.candidates().into();
                    self.current = candidate;
                    ShrinkStep::Improved
                }
                Falsification::DoesNotFalsify => {
                    self.attempts += 1;
                    ShrinkStep::Rejected
                }
                Falsification::Discard => {
                    self.discards += 1;
                    ShrinkStep::Discarded
                }
            };
        }
        ShrinkStep::Exhausted
    }

    /// The smallest known falsifying shrinkable
    pub fn current(&self) -> &Shrinkable<T> {
        &self.current
    }

    /// Alias for [`ShrinkingSequence::current`]
    pub fn result(&self) -> &Shrinkable<T> {
        &self.current
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn discards(&self) -> usize {
        self.discards
    }

    /// Drive the search to exhaustion or until the budget runs out.
    ///
    /// Running out of budget is not an error: the best candidate found so far is
    /// reported with `completed` set to `false`.
    pub fn run(mut self, config: &ShrinkConfig) -> ShrinkResult<T> {
        let start_time = Instant::now();
        let mut completed = true;

        loop {
            if self.attempts >= config.max_attempts {
                debug!(attempts = self.attempts, "shrink attempt budget exhausted");
                completed = false;
                break;
            }
            if start_time.elapsed() >= config.timeout {
                debug!(elapsed = ?start_time.elapsed(), "shrink timeout reached");
                completed = false;
                break;
            }
            match self.next() {
                ShrinkStep::Exhausted => break,
                ShrinkStep::Improved if config.verbose => {
                    debug!(
                        step = self.steps,
                        distance = %self.current.distance(),
                        "shrunk to smaller falsifying value"
                    );
                }
                _ => {}
            }
        }

        let duration = start_time.elapsed();
        debug!(
            steps = self.steps,
            attempts = self.attempts,
            discards = self.discards,
            completed,
            "shrinking finished"
        );
        ShrinkResult {
            original: self.original.value(),
            minimal: self.current.value(),
            steps: self.steps,
            attempts: self.attempts,
            discards: self.discards,
            duration,
            completed,
        }
    }
}
