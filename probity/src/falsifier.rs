//! The falsifier boundary used to drive shrinking.

/// Outcome of evaluating a shrink candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Falsification {
    /// The candidate still reproduces the failure; shrinking continues from it
    StillFalsifies,
    /// The candidate does not reproduce the failure and is rejected
    DoesNotFalsify,
    /// The candidate is outside the precondition space and is skipped
    Discard,
}

impl Falsification {
    /// Map a property outcome (`true` when the property holds) to a falsification
    pub fn from_holds(holds: bool) -> Self {
        if holds {
            Falsification::DoesNotFalsify
        } else {
            Falsification::StillFalsifies
        }
    }

    /// Whether this outcome keeps the candidate
    pub fn is_falsified(&self) -> bool {
        matches!(self, Falsification::StillFalsifies)
    }
}

/// A predicate deciding whether a candidate still falsifies a property
pub trait Falsifier<T> {
    /// Evaluate a candidate value
    fn test(&self, value: &T) -> Falsification;
}

impl<T, F> Falsifier<T> for F
where
    F: Fn(&T) -> Falsification,
{
    fn test(&self, value: &T) -> Falsification {
        self(value)
    }
}

/// Build a falsifier from a property predicate returning `true` when it holds
pub fn falsify_unless<T, P>(property: P) -> impl Falsifier<T>
where
    P: Fn(&T) -> bool,
{
    move |value: &T| Falsification::from_holds(property(value))
}

/// Build a falsifier from a property predicate and a precondition.
///
/// Values that fail the precondition are discarded.
pub fn falsify_unless_assuming<T, A, P>(assumption: A, property: P) -> impl Falsifier<T>
where
    A: Fn(&T) -> bool,
    P: Fn(&T) -> bool,
{
    move |value: &T| {
        if !assumption(value) {
            Falsification::Discard
        } else {
            Falsification::from_holds(property(value))
        }
    }
}
