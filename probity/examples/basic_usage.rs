//! Basic usage examples demonstrating the core Probity API
//!
//! Generates values from combined arbitraries, lists edge cases and
//! exhaustive domains, and shrinks a failing value.

use probity::{
    Arbitrary, Builders, ShrinkConfig, create_seeded_rng, falsify_unless, integers, of, strings,
};

#[derive(Debug, Clone, Default, PartialEq)]
struct Account {
    owner: String,
    balance: i64,
}

fn example_1_sampling() {
    println!("=== Example 1: Sampling ===");

    let amounts = integers::<i64>().between(-500, 500);
    let mut rng = create_seeded_rng(42);
    let samples = amounts.generator(100).samples(&mut rng, 5);
    match samples {
        Ok(values) => println!("samples: {:?}", values),
        Err(error) => println!("generation failed: {}", error),
    }

    println!("edge cases: {:?}", amounts.edge_cases(10).values());
}

fn example_2_builder() {
    println!("\n=== Example 2: Builder ===");

    let accounts = Builders::with_builder(Account::default)
        .using(of(vec!["ann".to_string(), "bob".to_string()]).unwrap())
        .in_setter(|account, owner| account.owner = owner)
        .using(of(vec![0i64, 100]).unwrap())
        .in_setter(|account, balance| account.balance = balance)
        .build()
        .unwrap();

    if let Some(exhaustive) = accounts.exhaustive() {
        println!("{} accounts in the domain", exhaustive.max_count());
        for account in exhaustive.iter() {
            println!("  {:?}", account);
        }
    }
}

fn example_3_shrinking() {
    println!("\n=== Example 3: Shrinking ===");

    let owners = strings().alpha().of_max_length(8);
    let mut rng = create_seeded_rng(7);
    let mut generator = owners.generator(100);

    let failing = (0..1000)
        .filter_map(|_| generator.next(&mut rng).ok())
        .find(|shrinkable| shrinkable.value().len() >= 3);

    let Some(failing) = failing else {
        println!("no failing value found");
        return;
    };

    let result = failing
        .shrink(falsify_unless(|owner: &String| owner.len() < 3))
        .run(&ShrinkConfig::default());
    println!(
        "{:?} shrank to {:?} in {} steps ({} attempts)",
        result.original, result.minimal, result.steps, result.attempts
    );
}

fn main() {
    example_1_sampling();
    example_2_builder();
    example_3_shrinking();
}
