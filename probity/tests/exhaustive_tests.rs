//! Exhaustive enumeration reports the exact number of values it produces

use std::fmt::Debug;

use probity::{
    Arbitrary, Builders, booleans, chars, combine, integers, of, one_of, strings, vecs,
};

fn assert_exact<A>(arbitrary: &A, expected: u64)
where
    A: Arbitrary,
    A::Value: PartialEq + Debug,
{
    let exhaustive = arbitrary.exhaustive().expect("domain is enumerable");
    assert_eq!(exhaustive.max_count(), expected);

    let first: Vec<A::Value> = exhaustive.iter().collect();
    assert_eq!(first.len() as u64, expected);
    let mut distinct: Vec<&A::Value> = Vec::new();
    for value in &first {
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }
    assert_eq!(distinct.len(), first.len(), "values repeat: {:?}", first);

    let second: Vec<A::Value> = exhaustive.iter().collect();
    assert_eq!(first, second);
}

#[test]
fn test_primitive_domains() {
    assert_exact(&integers::<i8>().between(-3, 3), 7);
    assert_exact(&integers::<u8>(), 256);
    assert_exact(&booleans(), 2);
    assert_exact(&of(vec!['x', 'y', 'z']).unwrap(), 3);
    assert_exact(&strings().with_chars("ab").of_max_length(2), 7);
}

#[test]
fn test_combined_domains() {
    assert_exact(&integers::<u8>().between(0, 4).zip(booleans()), 10);
    assert_exact(&vecs(booleans()).of_max_size(2), 7);
    assert_exact(
        &combine(
            vec![
                integers::<u8>().between(0, 2).boxed(),
                integers::<u8>().between(5, 6).boxed(),
            ],
            |parts| parts,
        ),
        6,
    );
    assert_exact(
        &one_of(vec![
            integers::<u8>().between(0, 2).boxed(),
            integers::<u8>().between(5, 6).boxed(),
        ])
        .unwrap(),
        5,
    );
    assert_exact(&integers::<u8>().between(0, 9).filter(|value| value % 3 == 0), 4);
    assert_exact(&integers::<u8>().between(0, 3).optional(0.5).unwrap(), 5);
}

#[test]
fn test_builder_domain() {
    let pairs = Builders::with_builder(|| (0u8, false))
        .using(integers::<u8>().between(1, 3))
        .in_setter(|pair, value| pair.0 = value)
        .using(booleans())
        .in_setter(|pair, flag| pair.1 = flag)
        .build()
        .unwrap();
    assert_exact(&pairs, 6);
}

#[test]
fn test_unbounded_domains_are_not_enumerable() {
    assert!(integers::<u64>().exhaustive().is_none());
    assert!(strings().exhaustive().is_none());
    assert!(integers::<u32>().between(0, 1_000_000).exhaustive().is_none());
    assert!(integers::<u32>().between(0, 999_999).exhaustive().is_some());
}

#[test]
fn test_derived_domains_with_repeated_values() {
    assert_exact(&integers::<i8>().between(-3, 3).map(|value| value.abs()), 4);
    assert_exact(
        &one_of(vec![
            integers::<u8>().between(0, 3).boxed(),
            integers::<u8>().between(2, 5).boxed(),
        ])
        .unwrap(),
        6,
    );
    assert_exact(
        &combine(
            vec![
                integers::<u8>().between(0, 2).boxed(),
                integers::<u8>().between(0, 2).boxed(),
            ],
            |parts: Vec<u8>| parts.iter().sum::<u8>(),
        ),
        5,
    );
    assert_exact(&chars().alpha().with_range('m', 'p'), 52);
}

#[test]
fn test_length_ranges_fail_fast_past_the_ceiling() {
    assert!(vecs(booleans()).of_max_size(usize::MAX).exhaustive().is_none());
    assert!(strings().with_chars("a").of_max_length(usize::MAX).exhaustive().is_none());
    assert_exact(&strings().with_chars("a").of_min_length(3).of_max_length(10), 8);
}
