//! Type-driven generation through externally discovered creators.
//!
//! The core never inspects types itself. A [`CreatorDiscovery`] lists the
//! constructors and factory methods of a target type, and an
//! [`ArbitraryResolver`] maps every parameter type to candidate arbitraries.
//! [`TypeArbitrary`] combines both into an ordinary arbitrary.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::arbitrary::{Arbitrary, ArbitraryValue, BoxedArbitrary};
use crate::combinators::{combine, one_of};
use crate::error::{ArbitraryError, Result};
use crate::generator::{EdgeCases, ExhaustiveGenerator, RandomGenerator};
use crate::shrinkable::Shrinkable;

type ErasedEq = fn(&(dyn Any + Send + Sync), &(dyn Any + Send + Sync)) -> bool;

fn same_value<T: PartialEq + 'static>(left: &(dyn Any + Send + Sync), right: &(dyn Any + Send + Sync)) -> bool {
    match (left.downcast_ref::<T>(), right.downcast_ref::<T>()) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

/// A type-erased generated value.
///
/// Two values are equal when they hold equal values of the same type.
#[derive(Clone)]
pub struct AnyValue {
    value: Arc<dyn Any + Send + Sync>,
    eq: ErasedEq,
    type_name: &'static str,
}

impl AnyValue {
    pub fn new<T: ArbitraryValue + PartialEq>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            eq: same_value::<T>,
            type_name: type_name::<T>(),
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Name of the erased type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for AnyValue {
    fn eq(&self, other: &Self) -> bool {
        (self.eq)(&*self.value, &*other.value)
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyValue").field(&self.type_name).finish()
    }
}

/// An arbitrary producing type-erased values, as handed out by resolvers
pub type ErasedArbitrary = BoxedArbitrary<AnyValue>;

/// Erase the value type of `arbitrary`
pub fn erase<A>(arbitrary: A) -> ErasedArbitrary
where
    A: Arbitrary + 'static,
    A::Value: PartialEq,
{
    arbitrary.map(AnyValue::new).boxed()
}

/// Name and identity of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: &'static str,
    id: TypeId,
}

impl TypeDescriptor {
    pub fn of<T: 'static>() -> Self {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn id(&self) -> TypeId {
        self.id
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreatorKind {
    Constructor,
    FactoryMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

/// Everything filters can see about a creator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorSignature {
    pub name: String,
    pub kind: CreatorKind,
    pub visibility: Visibility,
    pub parameters: Vec<TypeDescriptor>,
}

/// The arguments a creator is invoked with, one per declared parameter
pub struct Arguments<'a> {
    creator: &'a str,
    values: &'a [AnyValue],
}

impl Arguments<'_> {
    /// The argument at `index`, downcast to its declared type
    pub fn get<P: Clone + 'static>(&self, index: usize) -> Result<P> {
        let value = self
            .values
            .get(index)
            .ok_or_else(|| self.rejected(format!("missing argument {index}")))?;
        value.downcast_ref::<P>().cloned().ok_or_else(|| {
            self.rejected(format!(
                "argument {index} is not a {}",
                type_name::<P>()
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn rejected(&self, message: String) -> ArbitraryError {
        ArbitraryError::CreatorInvocationFailed {
            creator: self.creator.to_string(),
            message,
        }
    }
}

type Invoker<T> = Arc<dyn Fn(&Arguments<'_>) -> Result<T> + Send + Sync>;

/// A constructor or factory function of `T`
pub struct Creator<T> {
    signature: CreatorSignature,
    invoker: Invoker<T>,
}

impl<T> Clone for Creator<T> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            invoker: Arc::clone(&self.invoker),
        }
    }
}

impl<T> fmt::Debug for Creator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Creator")
            .field("signature", &self.signature)
            .finish()
    }
}

impl<T> Creator<T> {
    pub fn new<F>(signature: CreatorSignature, invoker: F) -> Self
    where
        F: Fn(&Arguments<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            signature,
            invoker: Arc::new(invoker),
        }
    }

    /// A public constructor
    pub fn constructor<F>(name: impl Into<String>, parameters: Vec<TypeDescriptor>, invoker: F) -> Self
    where
        F: Fn(&Arguments<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Self::new(
            CreatorSignature {
                name: name.into(),
                kind: CreatorKind::Constructor,
                visibility: Visibility::Public,
                parameters,
            },
            invoker,
        )
    }

    /// A public factory method
    pub fn factory_method<F>(
        name: impl Into<String>,
        parameters: Vec<TypeDescriptor>,
        invoker: F,
    ) -> Self
    where
        F: Fn(&Arguments<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Self::new(
            CreatorSignature {
                name: name.into(),
                kind: CreatorKind::FactoryMethod,
                visibility: Visibility::Public,
                parameters,
            },
            invoker,
        )
    }

    pub fn private(mut self) -> Self {
        self.signature.visibility = Visibility::Private;
        self
    }

    pub fn signature(&self) -> &CreatorSignature {
        &self.signature
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn invoke(&self, values: &[AnyValue]) -> Result<T> {
        (self.invoker)(&Arguments {
            creator: &self.signature.name,
            values,
        })
    }
}

/// Selects the creators a [`TypeArbitrary`] may use
#[derive(Clone)]
pub enum CreatorFilter {
    PublicConstructors,
    AllConstructors,
    PublicFactoryMethods,
    AllFactoryMethods,
    Custom(Arc<dyn Fn(&CreatorSignature) -> bool + Send + Sync>),
}

impl CreatorFilter {
    pub fn custom<P>(predicate: P) -> Self
    where
        P: Fn(&CreatorSignature) -> bool + Send + Sync + 'static,
    {
        CreatorFilter::Custom(Arc::new(predicate))
    }

    pub fn accepts(&self, signature: &CreatorSignature) -> bool {
        let public = signature.visibility == Visibility::Public;
        match self {
            CreatorFilter::PublicConstructors => {
                signature.kind == CreatorKind::Constructor && public
            }
            CreatorFilter::AllConstructors => signature.kind == CreatorKind::Constructor,
            CreatorFilter::PublicFactoryMethods => {
                signature.kind == CreatorKind::FactoryMethod && public
            }
            CreatorFilter::AllFactoryMethods => signature.kind == CreatorKind::FactoryMethod,
            CreatorFilter::Custom(predicate) => predicate(signature),
        }
    }
}

impl fmt::Debug for CreatorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreatorFilter::PublicConstructors => f.write_str("PublicConstructors"),
            CreatorFilter::AllConstructors => f.write_str("AllConstructors"),
            CreatorFilter::PublicFactoryMethods => f.write_str("PublicFactoryMethods"),
            CreatorFilter::AllFactoryMethods => f.write_str("AllFactoryMethods"),
            CreatorFilter::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Lists the creators available for `T`
pub trait CreatorDiscovery<T>: Send + Sync {
    fn creators(&self) -> Vec<Creator<T>>;
}

impl<T: Send + Sync> CreatorDiscovery<T> for Vec<Creator<T>> {
    fn creators(&self) -> Vec<Creator<T>> {
        self.clone()
    }
}

/// Maps a parameter type to the arbitraries that can produce it
pub trait ArbitraryResolver: Send + Sync {
    fn resolve(&self, parameter: &TypeDescriptor) -> Vec<ErasedArbitrary>;
}

/// Arbitraries registered per value type.
///
/// Registering under a name that is already present replaces the old
/// provider; the most recently registered provider of a type comes first.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<TypeId, Vec<(String, ErasedArbitrary)>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider for the value type of `arbitrary`
    pub fn register<A>(&mut self, name: impl Into<String>, arbitrary: A)
    where
        A: Arbitrary + 'static,
        A::Value: PartialEq,
    {
        let name = name.into();
        let entries = self
            .providers
            .entry(TypeId::of::<A::Value>())
            .or_default();
        entries.retain(|(existing, _)| *existing != name);
        entries.insert(0, (name, erase(arbitrary)));
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.providers.contains_key(&TypeId::of::<T>())
    }

    /// Remove every provider of `T`
    pub fn remove<T: 'static>(&mut self) -> bool {
        self.providers.remove(&TypeId::of::<T>()).is_some()
    }

    /// Provider names for `T`, newest first
    pub fn names<T: 'static>(&self) -> Vec<&str> {
        self.providers
            .get(&TypeId::of::<T>())
            .map(|entries| entries.iter().map(|(name, _)| name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Number of types with at least one provider
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ArbitraryResolver for ProviderRegistry {
    fn resolve(&self, parameter: &TypeDescriptor) -> Vec<ErasedArbitrary> {
        self.providers
            .get(&parameter.id())
            .map(|entries| entries.iter().map(|(_, arbitrary)| arbitrary.clone()).collect())
            .unwrap_or_default()
    }
}

fn default_filters() -> Vec<CreatorFilter> {
    vec![
        CreatorFilter::PublicConstructors,
        CreatorFilter::PublicFactoryMethods,
    ]
}

/// Arbitrary generating `T` through one of its creators.
///
/// Starts with public constructors and public factory methods. The first
/// explicit `use_*` call replaces that default selection.
pub struct TypeArbitrary<T> {
    target: TypeDescriptor,
    discovery: Arc<dyn CreatorDiscovery<T>>,
    resolver: Arc<dyn ArbitraryResolver>,
    explicit: Vec<Creator<T>>,
    filters: Vec<CreatorFilter>,
    defaults: bool,
}

impl<T> Clone for TypeArbitrary<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target,
            discovery: Arc::clone(&self.discovery),
            resolver: Arc::clone(&self.resolver),
            explicit: self.explicit.clone(),
            filters: self.filters.clone(),
            defaults: self.defaults,
        }
    }
}

impl<T: ArbitraryValue + PartialEq> TypeArbitrary<T> {
    pub fn new<D, R>(discovery: D, resolver: R) -> Self
    where
        D: CreatorDiscovery<T> + 'static,
        R: ArbitraryResolver + 'static,
    {
        Self {
            target: TypeDescriptor::of::<T>(),
            discovery: Arc::new(discovery),
            resolver: Arc::new(resolver),
            explicit: Vec::new(),
            filters: default_filters(),
            defaults: true,
        }
    }

    fn configured(mut self) -> Self {
        if self.defaults {
            self.filters.clear();
            self.defaults = false;
        }
        self
    }

    /// Use `creator` in addition to the other selected creators
    pub fn use_creator(self, creator: Creator<T>) -> Self {
        let mut configured = self.configured();
        configured.explicit.push(creator);
        configured
    }

    /// Use the discovered creators accepted by `filter`
    pub fn use_creators(self, filter: CreatorFilter) -> Self {
        let mut configured = self.configured();
        configured.filters.push(filter);
        configured
    }

    pub fn use_public_constructors(self) -> Self {
        self.use_creators(CreatorFilter::PublicConstructors)
    }

    pub fn use_all_constructors(self) -> Self {
        self.use_creators(CreatorFilter::AllConstructors)
    }

    pub fn use_public_factory_methods(self) -> Self {
        self.use_creators(CreatorFilter::PublicFactoryMethods)
    }

    pub fn use_all_factory_methods(self) -> Self {
        self.use_creators(CreatorFilter::AllFactoryMethods)
    }

    /// The creators currently selected, explicit ones first, without duplicates
    pub fn creators(&self) -> Vec<Creator<T>> {
        let mut selected = self.explicit.clone();
        for creator in self.discovery.creators() {
            let accepted = self
                .filters
                .iter()
                .any(|filter| filter.accepts(creator.signature()));
            let known = selected
                .iter()
                .any(|existing| existing.signature() == creator.signature());
            if accepted && !known {
                selected.push(creator);
            }
        }
        selected
    }

    /// Build the arbitrary choosing between all selected creators
    pub fn resolve(&self) -> Result<BoxedArbitrary<T>> {
        let creators = self.creators();
        if creators.is_empty() {
            return Err(ArbitraryError::NoCreatorsFound {
                target: self.target.name().to_string(),
            });
        }
        let mut choices = creators
            .into_iter()
            .map(|creator| self.creator_arbitrary(creator))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            target_type = self.target.name(),
            creators = choices.len(),
            "resolved type arbitrary"
        );
        if choices.len() == 1 {
            return Ok(choices.remove(0));
        }
        Ok(one_of(choices)?.boxed())
    }

    fn creator_arbitrary(&self, creator: Creator<T>) -> Result<BoxedArbitrary<T>> {
        let parameters = creator
            .signature()
            .parameters
            .iter()
            .map(|parameter| {
                let mut candidates = self.resolver.resolve(parameter);
                match candidates.len() {
                    0 => Err(ArbitraryError::CannotFindArbitrary {
                        parameter: parameter.name().to_string(),
                        creator: creator.name().to_string(),
                    }),
                    1 => Ok(candidates.remove(0)),
                    _ => Ok(one_of(candidates)?.boxed()),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CreatorArbitrary {
            creator,
            arguments: combine(parameters, |values| values).boxed(),
        }
        .boxed())
    }
}

/// Resolution failures surface as errors from the generator only. Edge cases
/// come back empty and exhaustive generation is unavailable; call
/// [`TypeArbitrary::resolve`] to see why.
impl<T: ArbitraryValue + PartialEq> Arbitrary for TypeArbitrary<T> {
    type Value = T;

    fn generator(&self, size: usize) -> RandomGenerator<T> {
        match self.resolve() {
            Ok(arbitrary) => arbitrary.generator(size),
            Err(error) => RandomGenerator::new(move |_| Err(error.clone())),
        }
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        match self.resolve() {
            Ok(arbitrary) => arbitrary.edge_cases(max_edge_cases),
            Err(error) => {
                debug!(target_type = self.target.name(), %error, "no edge cases for unresolvable type");
                EdgeCases::none()
            }
        }
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        match self.resolve() {
            Ok(arbitrary) => arbitrary.exhaustive_with_max(max_count),
            Err(error) => {
                debug!(target_type = self.target.name(), %error, "no exhaustive generation for unresolvable type");
                None
            }
        }
    }
}

/// Arguments drawn from the parameter arbitraries, fed through one creator
struct CreatorArbitrary<T> {
    creator: Creator<T>,
    arguments: BoxedArbitrary<Vec<AnyValue>>,
}

impl<T: ArbitraryValue> CreatorArbitrary<T> {
    /// Turn generated arguments into a created value; candidates the creator
    /// rejects are dropped
    fn instantiate(&self, arguments: Shrinkable<Vec<AnyValue>>) -> Result<Shrinkable<T>> {
        let created = self.creator.invoke(&arguments.value())?;
        let (accepting, creating) = (self.creator.clone(), self.creator.clone());
        Ok(arguments
            .filter(move |values| accepting.invoke(values).is_ok())
            .map(move |values| {
                creating
                    .invoke(&values)
                    .unwrap_or_else(|_| created.clone())
            }))
    }
}

impl<T: ArbitraryValue + PartialEq> Arbitrary for CreatorArbitrary<T> {
    type Value = T;

    fn generator(&self, size: usize) -> RandomGenerator<T> {
        let mut arguments = self.arguments.generator(size);
        let this = CreatorArbitrary {
            creator: self.creator.clone(),
            arguments: self.arguments.clone(),
        };
        RandomGenerator::new(move |rng| this.instantiate(arguments.next(rng)?))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        let cases = self
            .arguments
            .edge_cases(max_edge_cases)
            .into_iter()
            .filter_map(|arguments| self.instantiate(arguments).ok());
        EdgeCases::distinct(cases, max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        let arguments = self.arguments.exhaustive_with_max(max_count)?;
        let values = arguments
            .iter()
            .filter_map(|values| self.creator.invoke(&values).ok())
            .collect();
        Some(ExhaustiveGenerator::from_values(values).distinct())
    }
}
