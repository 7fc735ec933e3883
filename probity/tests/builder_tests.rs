//! Integration tests for the builder combinator

use probity::{
    Arbitrary, Builders, ShrinkConfig, create_seeded_rng, falsify_unless, integers, of, strings,
};

#[derive(Debug, Clone, Default, PartialEq)]
struct Person {
    name: String,
    age: u32,
}

impl Person {
    fn with_name(self, name: String) -> Self {
        Self { name, ..self }
    }
}

fn names() -> probity::StringArbitrary {
    strings().with_char_range('a', 'z').of_length(10)
}

#[test]
fn test_plain_builder() {
    let people = Builders::with_builder(Person::default)
        .using(names())
        .apply(Person::with_name)
        .using(integers::<u32>().between(0, 15))
        .in_setter(|person, age| person.age = age)
        .build()
        .unwrap();

    let mut rng = create_seeded_rng(42);
    let mut generator = people.generator(1000);
    for _ in 0..100 {
        let person = generator.sample(&mut rng).unwrap();
        assert_eq!(person.name.len(), 10);
        assert!(person.name.chars().all(|c| c.is_ascii_lowercase()));
        assert!(person.age <= 15);
    }
}

#[test]
fn test_build_with_finalizer() {
    let labels = Builders::with_builder(Person::default)
        .using(of(vec!["John".to_string(), "Lisa".to_string()]).unwrap())
        .apply(Person::with_name)
        .build_with(|person| format!("{} ({})", person.name, person.age))
        .unwrap();

    let values: Vec<String> = labels.exhaustive().unwrap().iter().collect();
    assert_eq!(values, vec!["John (0)", "Lisa (0)"]);
}

#[test]
fn test_probability_zero_never_applies() {
    let people = Builders::with_builder(Person::default)
        .maybe_using(integers::<u32>().between(1, 100), 0.0)
        .in_setter(|person, age| person.age = age)
        .build()
        .unwrap();

    let mut rng = create_seeded_rng(1);
    let mut generator = people.generator(1000);
    for _ in 0..1000 {
        assert_eq!(generator.sample(&mut rng).unwrap().age, 0);
    }
}

#[test]
fn test_probability_one_always_applies() {
    let people = Builders::with_builder(Person::default)
        .maybe_using(integers::<u32>().between(1, 100), 1.0)
        .in_setter(|person, age| person.age = age)
        .build()
        .unwrap();

    let mut rng = create_seeded_rng(2);
    let mut generator = people.generator(1000);
    for _ in 0..1000 {
        assert!(generator.sample(&mut rng).unwrap().age > 0);
    }
}

#[test]
fn test_probability_half_sometimes_applies() {
    let people = Builders::with_builder(Person::default)
        .maybe_using(integers::<u32>().between(1, 100), 0.5)
        .in_setter(|person, age| person.age = age)
        .build()
        .unwrap();

    let mut rng = create_seeded_rng(3);
    let ages = people.generator(1000).samples(&mut rng, 1000).unwrap();
    assert!(ages.iter().any(|person| person.age == 0));
    assert!(ages.iter().any(|person| person.age > 0));
}

#[test]
fn test_every_sample_starts_from_fresh_state() {
    let lists = Builders::with_builder(Vec::<u8>::new)
        .using(integers::<u8>().between(0, 9))
        .in_setter(|list, value| list.push(value))
        .using(integers::<u8>().between(0, 9))
        .apply(|mut list, value| {
            list.push(value);
            list
        })
        .build()
        .unwrap();

    let mut rng = create_seeded_rng(4);
    let mut generator = lists.generator(1000);
    for _ in 0..200 {
        assert_eq!(generator.sample(&mut rng).unwrap().len(), 2);
    }
}

#[test]
fn test_exhaustive_name_major_order() {
    let people = Builders::with_builder(Person::default)
        .using(of(vec!["John".to_string(), "Lisa".to_string(), "Kay".to_string()]).unwrap())
        .apply(Person::with_name)
        .using(of(vec![17u32, 18, 19]).unwrap())
        .in_setter(|person, age| person.age = age)
        .build()
        .unwrap();

    let exhaustive = people.exhaustive().unwrap();
    assert_eq!(exhaustive.max_count(), 9);

    let values: Vec<(String, u32)> = exhaustive
        .iter()
        .map(|person| (person.name, person.age))
        .collect();
    let expected: Vec<(String, u32)> = ["John", "Lisa", "Kay"]
        .iter()
        .flat_map(|name| [17, 18, 19].map(|age| (name.to_string(), age)))
        .collect();
    assert_eq!(values, expected);
}

#[test]
fn test_edge_cases_are_product_of_step_edge_cases() {
    let people = Builders::with_builder(Person::default)
        .using(names())
        .apply(Person::with_name)
        .using(integers::<u32>().between(0, 15))
        .in_setter(|person, age| person.age = age)
        .build()
        .unwrap();

    let edge_cases = people.edge_cases(20).values();
    assert_eq!(edge_cases.len(), 10);
    for name in ["aaaaaaaaaa", "zzzzzzzzzz"] {
        for age in [0, 1, 2, 14, 15] {
            assert!(edge_cases.contains(&Person {
                name: name.to_string(),
                age,
            }));
        }
    }
    assert_eq!(people.edge_cases(20).values(), edge_cases);
}

#[test]
fn test_shrinking_built_values() {
    let people = Builders::with_builder(Person::default)
        .using(strings().alpha().of_max_length(5))
        .apply(Person::with_name)
        .using(integers::<u32>().between(0, 100))
        .in_setter(|person, age| person.age = age)
        .build()
        .unwrap();

    let mut rng = create_seeded_rng(5);
    let mut generator = people.generator(1000);
    let failing = (0..1000)
        .map(|_| generator.next(&mut rng).unwrap())
        .find(|person| person.value().age >= 50)
        .unwrap();

    let result = failing
        .shrink(falsify_unless(|person: &Person| person.age < 50))
        .run(&ShrinkConfig::default());
    assert_eq!(
        result.minimal,
        Person {
            name: String::new(),
            age: 50
        }
    );
    assert!(result.completed);
}
