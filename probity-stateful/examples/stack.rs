//! Stack chain example
//!
//! Generates chains of push and pop transformations over a bounded stack
//! and shrinks a chain that breaks the capacity invariant.

use probity::{Arbitrary, ShrinkConfig, create_seeded_rng, integers};
use probity_stateful::prelude::*;

const CAPACITY: usize = 4;

fn main() {
    let chains = ChainArbitrary::new(
        Vec::<i32>::new,
        vec![
            (
                3,
                TransformerProvider::new(|_: &Vec<i32>| {
                    integers::<i32>()
                        .between(0, 99)
                        .map(|value| {
                            Transformer::mutate(
                                format!("push {}", value),
                                move |stack: &mut Vec<i32>| stack.push(value),
                            )
                        })
                        .boxed()
                }),
            ),
            (
                1,
                TransformerProvider::from_fn(|_: &Vec<i32>| {
                    Transformer::mutate("pop", |stack: &mut Vec<i32>| {
                        stack.pop();
                    })
                })
                .when(|stack| !stack.is_empty()),
            ),
        ],
    );

    let chains = match chains {
        Ok(chains) => chains.with_transformation(
            1,
            TransformerProvider::from_fn(|_: &Vec<i32>| Transformer::noop()),
        ),
        Err(error) => {
            println!("invalid chain configuration: {}", error);
            return;
        }
    };

    let mut invariants = InvariantSet::new();
    invariants.add_fn("within_capacity", |stack: &Vec<i32>| stack.len() <= CAPACITY);

    let mut rng = create_seeded_rng(11);
    let mut generator = chains.generator(100);
    let failing = (0..200)
        .filter_map(|_| generator.next(&mut rng).ok())
        .find(|chain| invariants.check_chain(&chain.value()).is_falsified());

    let Some(failing) = failing else {
        println!("no chain broke the invariant");
        return;
    };

    println!("failing chain: {:?}", failing.value().transformations());
    let result = failing
        .shrink(|chain: &Chain<Vec<i32>>| invariants.check_chain(chain))
        .run(&ShrinkConfig::default());
    println!("shrunk chain: {:?}", result.minimal.transformations());
    println!("final state: {:?}", result.minimal.final_state());
}
