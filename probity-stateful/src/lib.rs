//! # Probity Stateful
//!
//! Chain generation for stateful property testing: random, bounded sequences
//! of state transformations that shrink as a whole.
//!
//! ## Quick Example
//!
//! ```rust
//! use probity::{Arbitrary, ShrinkConfig, create_seeded_rng};
//! use probity_stateful::prelude::*;
//!
//! let chains = ChainArbitrary::new(
//!     Vec::<i32>::new,
//!     vec![
//!         (3, TransformerProvider::from_fn(|_: &Vec<i32>| {
//!             Transformer::mutate("push", |stack: &mut Vec<i32>| stack.push(1))
//!         })),
//!         (1, TransformerProvider::from_fn(|_: &Vec<i32>| {
//!             Transformer::mutate("pop", |stack: &mut Vec<i32>| {
//!                 stack.pop();
//!             })
//!         })
//!         .when(|stack| !stack.is_empty())),
//!     ],
//! )
//! .unwrap();
//!
//! let mut invariants = InvariantSet::new();
//! invariants.add_fn("at_most_three", |stack: &Vec<i32>| stack.len() <= 3);
//!
//! let mut rng = create_seeded_rng(7);
//! let mut generator = chains.generator(100);
//! let failing = (0..100)
//!     .map(|_| generator.next(&mut rng).unwrap())
//!     .find(|chain| invariants.check_chain(&chain.value()).is_falsified())
//!     .unwrap();
//!
//! let result = failing
//!     .shrink(|chain: &Chain<Vec<i32>>| invariants.check_chain(chain))
//!     .run(&ShrinkConfig::default());
//! assert_eq!(result.minimal.transformations(), vec!["push"; 4]);
//! ```

pub mod chain;
pub mod error;
pub mod invariants;
pub mod transformer;

pub use chain::{Chain, ChainArbitrary, DEFAULT_CHAIN_MIN_SIZE};
pub use error::{ChainError, Result};
pub use invariants::{FnInvariant, Invariant, InvariantSet, InvariantViolation};
pub use transformer::{Transformer, TransformerProvider};

/// Re-exports for convenient imports
pub mod prelude {
    pub use crate::chain::{Chain, ChainArbitrary};
    pub use crate::invariants::{FnInvariant, Invariant, InvariantSet};
    pub use crate::transformer::{Transformer, TransformerProvider};
}
