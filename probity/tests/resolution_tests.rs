//! Type-driven generation through creators and registered providers

use probity::{
    Arbitrary, ArbitraryError, Creator, CreatorFilter, ProviderRegistry, TypeArbitrary,
    TypeDescriptor, booleans, create_seeded_rng, integers, strings,
};

#[derive(Debug, Clone, PartialEq)]
struct User {
    name: String,
    age: u8,
    admin: bool,
}

fn creators() -> Vec<Creator<User>> {
    vec![
        Creator::constructor(
            "User::new",
            vec![TypeDescriptor::of::<String>(), TypeDescriptor::of::<u8>()],
            |args| {
                Ok(User {
                    name: args.get(0)?,
                    age: args.get(1)?,
                    admin: false,
                })
            },
        ),
        Creator::factory_method("User::admin", vec![TypeDescriptor::of::<String>()], |args| {
            Ok(User {
                name: args.get(0)?,
                age: 40,
                admin: true,
            })
        }),
        Creator::constructor("User::guest", Vec::new(), |_| {
            Ok(User {
                name: "guest".to_string(),
                age: 0,
                admin: false,
            })
        })
        .private(),
    ]
}

fn registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register("names", strings().alpha().of_min_length(1).of_max_length(6));
    registry.register("ages", integers::<u8>().between(18, 99));
    registry.register("flags", booleans());
    registry
}

#[test]
fn test_generates_through_public_creators() {
    let users = TypeArbitrary::new(creators(), registry());
    let mut rng = create_seeded_rng(11);
    let samples = users.generator(100).samples(&mut rng, 500).unwrap();

    assert!(samples.iter().any(|user| user.admin));
    assert!(samples.iter().any(|user| !user.admin));
    assert!(samples.iter().all(|user| user.name != "guest"));
    assert!(samples
        .iter()
        .filter(|user| !user.admin)
        .all(|user| (18..=99).contains(&user.age)));
}

#[test]
fn test_custom_filter_replaces_defaults() {
    let guests = TypeArbitrary::new(creators(), registry())
        .use_creators(CreatorFilter::custom(|signature| signature.parameters.is_empty()));
    let mut rng = create_seeded_rng(12);
    let samples = guests.generator(100).samples(&mut rng, 20).unwrap();
    assert!(samples.iter().all(|user| user.name == "guest"));
}

#[test]
fn test_explicit_creator() {
    let named = TypeArbitrary::new(Vec::<Creator<User>>::new(), registry()).use_creator(Creator::constructor(
        "User::named",
        vec![TypeDescriptor::of::<String>()],
        |args| {
            Ok(User {
                name: args.get(0)?,
                age: 1,
                admin: false,
            })
        },
    ));
    let mut rng = create_seeded_rng(13);
    let user = named.generator(100).sample(&mut rng).unwrap();
    assert_eq!(user.age, 1);
}

#[test]
fn test_resolution_errors_surface_on_first_use() {
    let mut registry = ProviderRegistry::new();
    registry.register("ages", integers::<u8>().between(18, 99));
    let users = TypeArbitrary::new(creators(), registry);

    assert!(matches!(
        users.resolve(),
        Err(ArbitraryError::CannotFindArbitrary { .. })
    ));
    let mut rng = create_seeded_rng(14);
    assert!(users.generator(100).next(&mut rng).is_err());
    assert!(users.edge_cases(10).is_empty());
}

#[test]
fn test_shrinking_through_creator() {
    let users = TypeArbitrary::new(creators(), registry()).use_public_constructors();
    let mut rng = create_seeded_rng(15);
    let mut generator = users.generator(100);
    let failing = (0..1000)
        .map(|_| generator.next(&mut rng).unwrap())
        .find(|user| user.value().age >= 30)
        .unwrap();
    let result = failing
        .shrink(probity::falsify_unless(|user: &User| user.age < 30))
        .run(&probity::ShrinkConfig::default());
    assert_eq!(result.minimal.age, 30);
    assert_eq!(result.minimal.name.len(), 1);
}
