//! Transformers and the providers that offer them.

use std::fmt;
use std::sync::Arc;

use probity::{Arbitrary, ArbitraryValue, BoxedArbitrary, just};

/// One described transition from a state to the next
pub struct Transformer<T> {
    description: String,
    transform: Arc<dyn Fn(T) -> T + Send + Sync>,
}

impl<T> Clone for Transformer<T> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            transform: Arc::clone(&self.transform),
        }
    }
}

impl<T> fmt::Debug for Transformer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transformer").field(&self.description).finish()
    }
}

/// Transformers compare by description
impl<T> PartialEq for Transformer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
    }
}

impl<T> fmt::Display for Transformer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl<T: 'static> Transformer<T> {
    pub fn new<F>(description: impl Into<String>, transform: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            transform: Arc::new(transform),
        }
    }

    /// A transformer changing the state in place
    pub fn mutate<F>(description: impl Into<String>, mutate: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        Self::new(description, move |mut state| {
            mutate(&mut state);
            state
        })
    }

    /// A transformer leaving the state unchanged
    pub fn noop() -> Self {
        Self::new("noop", |state| state)
    }
}

impl<T> Transformer<T> {
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn transform(&self, state: T) -> T {
        (self.transform)(state)
    }
}

type Provide<T> = Arc<dyn Fn(&T) -> BoxedArbitrary<Transformer<T>> + Send + Sync>;
type Precondition<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Offers an arbitrary of transformers for the current state
pub struct TransformerProvider<T> {
    provide: Provide<T>,
    precondition: Option<Precondition<T>>,
}

impl<T> Clone for TransformerProvider<T> {
    fn clone(&self) -> Self {
        Self {
            provide: Arc::clone(&self.provide),
            precondition: self.precondition.clone(),
        }
    }
}

impl<T: ArbitraryValue> TransformerProvider<T> {
    pub fn new<F>(provide: F) -> Self
    where
        F: Fn(&T) -> BoxedArbitrary<Transformer<T>> + Send + Sync + 'static,
    {
        Self {
            provide: Arc::new(provide),
            precondition: None,
        }
    }

    /// A provider always offering the single transformer built by `transformer`
    pub fn from_fn<F>(transformer: F) -> Self
    where
        F: Fn(&T) -> Transformer<T> + Send + Sync + 'static,
    {
        Self::new(move |state| just(transformer(state)).boxed())
    }

    /// Only offer transformers for states satisfying `precondition`
    pub fn when<P>(mut self, precondition: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.precondition = Some(Arc::new(precondition));
        self
    }

    pub fn is_applicable(&self, state: &T) -> bool {
        self.precondition
            .as_ref()
            .is_none_or(|precondition| precondition(state))
    }

    pub fn transformers(&self, state: &T) -> BoxedArbitrary<Transformer<T>> {
        (self.provide)(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probity::{create_seeded_rng, integers};

    #[test]
    fn test_mutate_and_noop() {
        let push = Transformer::mutate("push 1", |state: &mut Vec<i32>| state.push(1));
        assert_eq!(push.transform(vec![0]), vec![0, 1]);
        assert_eq!(Transformer::<Vec<i32>>::noop().transform(vec![3]), vec![3]);
        assert_eq!(push.to_string(), "push 1");
    }

    #[test]
    fn test_transformers_compare_by_description() {
        let double = Transformer::new("double", |value: i32| value * 2);
        assert_eq!(double, Transformer::new("double", |value: i32| value + value));
        assert_ne!(double, Transformer::noop());

        let steps = probity::of(vec![double.clone(), double, Transformer::noop()]).unwrap();
        assert_eq!(steps.exhaustive().unwrap().max_count(), 2);
    }

    #[test]
    fn test_precondition() {
        let pop = TransformerProvider::from_fn(|_: &Vec<i32>| {
            Transformer::mutate("pop", |state: &mut Vec<i32>| {
                state.pop();
            })
        })
        .when(|state| !state.is_empty());
        assert!(!pop.is_applicable(&Vec::new()));
        assert!(pop.is_applicable(&vec![1]));
    }

    #[test]
    fn test_provider_uses_state() {
        let add = TransformerProvider::new(|state: &i64| {
            let limit = (*state).max(1);
            integers::<i64>()
                .between(1, limit)
                .map(|delta| Transformer::new(format!("add {delta}"), move |s: i64| s + delta))
                .boxed()
        });
        let mut rng = create_seeded_rng(5);
        let transformer = add.transformers(&10).generator(10).sample(&mut rng).unwrap();
        let next = transformer.transform(10);
        assert!((11..=20).contains(&next));
    }
}
