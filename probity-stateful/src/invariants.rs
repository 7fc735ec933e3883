//! Invariants over chain states

use std::marker::PhantomData;

use probity::Falsification;
use thiserror::Error;

use crate::chain::Chain;

/// A named predicate every visited state must satisfy
pub trait Invariant<State> {
    fn check(&self, state: &State) -> bool;

    fn description(&self) -> &str;

    /// The index of the first state in `chain` breaking this invariant
    fn first_violation(&self, chain: &Chain<State>) -> Option<usize> {
        chain.states().iter().position(|state| !self.check(state))
    }

    /// Still falsifies while any visited state breaks this invariant
    fn check_chain(&self, chain: &Chain<State>) -> Falsification {
        Falsification::from_holds(self.first_violation(chain).is_none())
    }
}

/// A function-based invariant
pub struct FnInvariant<State, F>
where
    F: Fn(&State) -> bool,
{
    name: String,
    check_fn: F,
    _phantom: PhantomData<fn(&State)>,
}

impl<State, F> FnInvariant<State, F>
where
    F: Fn(&State) -> bool,
{
    pub fn new(name: impl Into<String>, check_fn: F) -> Self {
        Self {
            name: name.into(),
            check_fn,
            _phantom: PhantomData,
        }
    }
}

impl<State, F> Invariant<State> for FnInvariant<State, F>
where
    F: Fn(&State) -> bool,
{
    fn check(&self, state: &State) -> bool {
        (self.check_fn)(state)
    }

    fn description(&self) -> &str {
        &self.name
    }
}

/// Invariants checked together, in registration order
pub struct InvariantSet<State: 'static> {
    invariants: Vec<Box<dyn Invariant<State>>>,
}

impl<State: 'static> InvariantSet<State> {
    pub fn new() -> Self {
        Self {
            invariants: Vec::new(),
        }
    }

    pub fn add<I: Invariant<State> + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    pub fn add_fn<F>(&mut self, name: impl Into<String>, check_fn: F)
    where
        F: Fn(&State) -> bool + 'static,
    {
        self.add(FnInvariant::new(name, check_fn));
    }

    /// Check one state against every invariant
    pub fn check_all(&self, state: &State) -> Result<(), InvariantViolation> {
        match self.invariants.iter().find(|invariant| !invariant.check(state)) {
            Some(invariant) => Err(InvariantViolation {
                description: invariant.description().to_string(),
                state_index: None,
            }),
            None => Ok(()),
        }
    }

    /// Check every state of `chain`, reporting the earliest violation
    pub fn check_states(&self, chain: &Chain<State>) -> Result<(), InvariantViolation> {
        for (index, state) in chain.states().iter().enumerate() {
            self.check_all(state).map_err(|violation| InvariantViolation {
                state_index: Some(index),
                ..violation
            })?;
        }
        Ok(())
    }

    pub fn check_chain(&self, chain: &Chain<State>) -> Falsification {
        Falsification::from_holds(self.check_states(chain).is_ok())
    }

    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

impl<State: 'static> Default for InvariantSet<State> {
    fn default() -> Self {
        Self::new()
    }
}

/// A violated invariant and, for chains, the index of the offending state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invariant violated: {description}")]
pub struct InvariantViolation {
    pub description: String,
    pub state_index: Option<usize>,
}
