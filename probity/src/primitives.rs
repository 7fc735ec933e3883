//! Arbitraries for primitive types and basic collections.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use num_traits::PrimInt;
use rand::{Rng, RngCore};

use crate::arbitrary::{Arbitrary, ArbitraryValue, BoxedArbitrary};
use crate::distance::ShrinkingDistance;
use crate::error::{ArbitraryError, Result};
use crate::generator::{EdgeCases, ExhaustiveGenerator, RandomGenerator};
use crate::shrinkable::Shrinkable;

/// Upper bound on how far generated collection lengths exceed their minimum
/// when no maximum is configured
const DEFAULT_MAX_LENGTH_SPAN: usize = 255;

/// Candidates for shrinking `value` toward `target`, closest to the target first
pub(crate) fn shrink_candidates(value: i128, target: i128) -> Vec<i128> {
    if value == target {
        return Vec::new();
    }
    let mut candidates = vec![target];
    let mut delta = (value - target) / 2;
    while delta != 0 {
        let candidate = value - delta;
        if candidates.last() != Some(&candidate) {
            candidates.push(candidate);
        }
        delta /= 2;
    }
    let step = if value > target { value - 1 } else { value + 1 };
    if !candidates.contains(&step) {
        candidates.push(step);
    }
    candidates
}

fn distance_between(value: i128, target: i128) -> u64 {
    u64::try_from(value.abs_diff(target)).unwrap_or(u64::MAX)
}

fn length_bound(min: usize, max: Option<usize>, size: usize) -> usize {
    max.unwrap_or_else(|| min.saturating_add(size.clamp(1, DEFAULT_MAX_LENGTH_SPAN)))
        .max(min)
}

/// Arbitrary that always produces the same value
#[derive(Debug, Clone)]
pub struct Just<T> {
    value: T,
}

pub fn just<T: ArbitraryValue>(value: T) -> Just<T> {
    Just { value }
}

impl<T: ArbitraryValue> Arbitrary for Just<T> {
    type Value = T;

    fn generator(&self, _size: usize) -> RandomGenerator<T> {
        let value = self.value.clone();
        RandomGenerator::new(move |_rng| Ok(Shrinkable::terminal(value.clone())))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        EdgeCases::from_shrinkables(vec![Shrinkable::terminal(self.value.clone())])
            .truncated(max_edge_cases)
    }

    fn exhaustive_with_max(&self, _max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        Some(ExhaustiveGenerator::from_values(vec![self.value.clone()]))
    }
}

/// Arbitrary that calls a supplier for every value it produces
pub struct Create<T> {
    supplier: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T> Clone for Create<T> {
    fn clone(&self) -> Self {
        Self {
            supplier: Arc::clone(&self.supplier),
        }
    }
}

/// Produce a fresh value from `supplier` every time one is needed
pub fn create<T, F>(supplier: F) -> Create<T>
where
    T: ArbitraryValue,
    F: Fn() -> T + Send + Sync + 'static,
{
    Create {
        supplier: Arc::new(supplier),
    }
}

impl<T: ArbitraryValue> Create<T> {
    fn shrinkable(&self) -> Shrinkable<T> {
        let supplier = Arc::clone(&self.supplier);
        Shrinkable::unshrinkable(move || supplier(), ShrinkingDistance::min())
    }
}

impl<T: ArbitraryValue> Arbitrary for Create<T> {
    type Value = T;

    fn generator(&self, _size: usize) -> RandomGenerator<T> {
        let shrinkable = self.shrinkable();
        RandomGenerator::new(move |_rng| Ok(shrinkable.clone()))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        EdgeCases::from_shrinkables(vec![self.shrinkable()]).truncated(max_edge_cases)
    }

    fn exhaustive_with_max(&self, _max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        let supplier = Arc::clone(&self.supplier);
        Some(ExhaustiveGenerator::new(1, move || {
            std::iter::once_with({
                let supplier = Arc::clone(&supplier);
                move || supplier()
            })
        }))
    }
}

/// Arbitrary choosing between fixed values; earlier values are simpler
#[derive(Debug, Clone)]
pub struct Of<T> {
    values: Arc<Vec<T>>,
}

/// Choose between `values`; an empty list is rejected and repeated values
/// keep their first position
pub fn of<T: ArbitraryValue + PartialEq>(values: Vec<T>) -> Result<Of<T>> {
    if values.is_empty() {
        return Err(ArbitraryError::empty_choices("of needs at least one value"));
    }
    let mut distinct: Vec<T> = Vec::with_capacity(values.len());
    for value in values {
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }
    Ok(Of {
        values: Arc::new(distinct),
    })
}

/// `false` and `true`, shrinking toward `false`
pub fn booleans() -> Of<bool> {
    Of {
        values: Arc::new(vec![false, true]),
    }
}

fn choice_shrinkable<T: ArbitraryValue>(values: Arc<Vec<T>>, index: usize) -> Shrinkable<T> {
    let value = values[index].clone();
    Shrinkable::new(
        move || value.clone(),
        ShrinkingDistance::of(&[index as u64]),
        move || {
            shrink_candidates(index as i128, 0)
                .into_iter()
                .map(|candidate| choice_shrinkable(Arc::clone(&values), candidate as usize))
                .collect()
        },
    )
}

impl<T: ArbitraryValue> Arbitrary for Of<T> {
    type Value = T;

    fn generator(&self, _size: usize) -> RandomGenerator<T> {
        let values = Arc::clone(&self.values);
        RandomGenerator::new(move |rng| {
            let index = rng.gen_range(0..values.len());
            Ok(choice_shrinkable(Arc::clone(&values), index))
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        let last = self.values.len() - 1;
        let mut indices = vec![0];
        if last > 0 {
            indices.push(last);
        }
        EdgeCases::from_shrinkables(
            indices
                .into_iter()
                .map(|index| choice_shrinkable(Arc::clone(&self.values), index))
                .collect(),
        )
        .truncated(max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        if self.values.len() as u64 > max_count {
            return None;
        }
        Some(ExhaustiveGenerator::from_values(self.values.to_vec()))
    }
}

/// Integer types supported by [`integers`]
pub trait IntegerValue: PrimInt + ArbitraryValue + fmt::Debug {}

macro_rules! impl_integer_value {
    ($($t:ty),*) => {
        $(impl IntegerValue for $t {})*
    };
}

impl_integer_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

fn widen<T: IntegerValue>(value: T) -> i128 {
    // every IntegerValue fits into i128
    value.to_i128().unwrap_or(0)
}

fn narrow<T: IntegerValue>(value: i128) -> Option<T> {
    num_traits::cast(value)
}

fn integer_shrinkable<T: IntegerValue>(value: i128, target: i128) -> Option<Shrinkable<T>> {
    let typed: T = narrow(value)?;
    Some(Shrinkable::new(
        move || typed,
        ShrinkingDistance::of(&[distance_between(value, target)]),
        move || {
            shrink_candidates(value, target)
                .into_iter()
                .filter_map(|candidate| integer_shrinkable(candidate, target))
                .collect()
        },
    ))
}

/// Arbitrary of integers within an inclusive range.
///
/// Values shrink toward zero, or toward the range bound closest to zero when
/// zero is outside the range.
pub struct IntegerArbitrary<T> {
    min: i128,
    max: i128,
    shrink_target: Option<i128>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for IntegerArbitrary<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for IntegerArbitrary<T> {}

impl<T> fmt::Debug for IntegerArbitrary<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegerArbitrary")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("shrink_target", &self.shrink_target)
            .finish()
    }
}

/// Integers over the full range of `T`
pub fn integers<T: IntegerValue>() -> IntegerArbitrary<T> {
    IntegerArbitrary {
        min: widen(T::min_value()),
        max: widen(T::max_value()),
        shrink_target: None,
        _marker: PhantomData,
    }
}

impl<T: IntegerValue> IntegerArbitrary<T> {
    /// Copy restricted to `[min, max]`; reversed bounds are swapped
    pub fn between(mut self, min: T, max: T) -> Self {
        let (min, max) = (widen(min), widen(max));
        self.min = min.min(max);
        self.max = min.max(max);
        self
    }

    pub fn greater_or_equal(mut self, min: T) -> Self {
        self.min = widen(min);
        self.max = self.max.max(self.min);
        self
    }

    pub fn less_or_equal(mut self, max: T) -> Self {
        self.max = widen(max);
        self.min = self.min.min(self.max);
        self
    }

    /// Copy shrinking toward `target`, clamped into the range
    pub fn shrink_towards(mut self, target: T) -> Self {
        self.shrink_target = Some(widen(target));
        self
    }

    fn target(&self) -> i128 {
        self.shrink_target.unwrap_or(0).clamp(self.min, self.max)
    }
}

impl<T: IntegerValue> Arbitrary for IntegerArbitrary<T> {
    type Value = T;

    fn generator(&self, size: usize) -> RandomGenerator<T> {
        let (min, max, target) = (self.min, self.max, self.target());
        let span = size.max(1) as i128;
        RandomGenerator::new(move |rng| {
            // half of the values stay within `size` of the shrink target
            let value = if rng.gen_bool(0.5) {
                rng.gen_range((target - span).max(min)..=(target + span).min(max))
            } else {
                rng.gen_range(min..=max)
            };
            integer_shrinkable(value, target).ok_or_else(|| {
                ArbitraryError::invalid_size(format!("{value} does not fit the integer type"))
            })
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        let (min, max, target) = (self.min, self.max, self.target());
        let mut values: Vec<i128> = Vec::new();
        for value in [min, min + 1, -2, -1, 0, 1, 2, max - 1, max] {
            if (min..=max).contains(&value) && !values.contains(&value) {
                values.push(value);
            }
        }
        EdgeCases::from_shrinkables(
            values
                .into_iter()
                .filter_map(|value| integer_shrinkable(value, target))
                .collect(),
        )
        .truncated(max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<T>> {
        let count = u64::try_from(self.max - self.min + 1).ok()?;
        if count > max_count {
            return None;
        }
        let (min, max) = (self.min, self.max);
        Some(ExhaustiveGenerator::new(count, move || {
            (min..=max).filter_map(narrow::<T>)
        }))
    }
}

const SURROGATES: u32 = 0xE000 - 0xD800;

/// Position of `c` among the Unicode scalar values
fn scalar_offset(c: char) -> u32 {
    let code = c as u32;
    if code >= 0xE000 { code - SURROGATES } else { code }
}

fn scalar_at(offset: u32) -> Option<char> {
    let code = if offset >= 0xD800 { offset + SURROGATES } else { offset };
    char::from_u32(code)
}

/// The parts of `low..=high` outside of `start..=end`, as scalar offsets
fn uncovered(low: u32, high: u32, start: u32, end: u32) -> Vec<(u32, u32)> {
    if end < low || start > high {
        return vec![(low, high)];
    }
    let mut parts = Vec::new();
    if low < start {
        parts.push((low, start - 1));
    }
    if end < high {
        parts.push((end + 1, high));
    }
    parts
}

/// Disjoint character ranges, addressable by index
#[derive(Debug, Clone, PartialEq)]
struct Alphabet {
    ranges: Vec<(char, char)>,
    explicit: bool,
}

impl Alphabet {
    fn printable() -> Self {
        Self {
            ranges: vec![(' ', '~')],
            explicit: false,
        }
    }

    /// The first explicit range replaces the default one; characters already
    /// covered keep their position
    fn with_range(mut self, min: char, max: char) -> Self {
        if !self.explicit {
            self.ranges.clear();
            self.explicit = true;
        }
        let mut parts = vec![(scalar_offset(min.min(max)), scalar_offset(min.max(max)))];
        for &(start, end) in &self.ranges {
            let (start, end) = (scalar_offset(start), scalar_offset(end));
            parts = parts
                .into_iter()
                .flat_map(|(low, high)| uncovered(low, high, start, end))
                .collect();
        }
        self.ranges.extend(
            parts
                .into_iter()
                .filter_map(|(low, high)| Some((scalar_at(low)?, scalar_at(high)?))),
        );
        self
    }

    fn range_width(min: char, max: char) -> u64 {
        u64::from(scalar_offset(max) - scalar_offset(min)) + 1
    }

    fn width(&self) -> u64 {
        self.ranges
            .iter()
            .map(|&(min, max)| Self::range_width(min, max))
            .sum()
    }

    fn char_at(&self, mut index: u64) -> char {
        for &(min, max) in &self.ranges {
            let width = Self::range_width(min, max);
            if index < width {
                let offset = u32::try_from(index)
                    .ok()
                    .and_then(|index| scalar_offset(min).checked_add(index));
                return offset.and_then(scalar_at).unwrap_or(min);
            }
            index -= width;
        }
        self.ranges.first().map_or(' ', |&(min, _)| min)
    }

    fn chars(&self) -> impl Iterator<Item = char> + Send + use<> {
        let ranges = self.ranges.clone();
        ranges.into_iter().flat_map(|(min, max)| min..=max)
    }
}

fn char_shrinkable(alphabet: Arc<Alphabet>, index: u64) -> Shrinkable<char> {
    let value = alphabet.char_at(index);
    Shrinkable::new(
        move || value,
        ShrinkingDistance::of(&[index]),
        move || {
            shrink_candidates(index as i128, 0)
                .into_iter()
                .map(|candidate| char_shrinkable(Arc::clone(&alphabet), candidate as u64))
                .collect()
        },
    )
}

fn alphabet_edge_indices(alphabet: &Alphabet) -> Vec<u64> {
    let last = alphabet.width() - 1;
    if last == 0 { vec![0] } else { vec![0, last] }
}

fn alphabet_exhaustive(alphabet: &Alphabet, max_count: u64) -> Option<ExhaustiveGenerator<char>> {
    let count = alphabet.width();
    if count > max_count {
        return None;
    }
    let alphabet = alphabet.clone();
    Some(ExhaustiveGenerator::new(count, move || alphabet.chars()))
}

/// Arbitrary of characters; shrinks toward the first character of its ranges
#[derive(Debug, Clone, PartialEq)]
pub struct CharArbitrary {
    alphabet: Alphabet,
}

/// Printable ASCII characters
pub fn chars() -> CharArbitrary {
    CharArbitrary {
        alphabet: Alphabet::printable(),
    }
}

impl CharArbitrary {
    /// Copy restricted to the single range `[min, max]`
    pub fn range(self, min: char, max: char) -> Self {
        Self {
            alphabet: Alphabet::printable().with_range(min, max),
        }
    }

    /// Copy with an additional range; the first one replaces the default
    pub fn with_range(self, min: char, max: char) -> Self {
        Self {
            alphabet: self.alphabet.with_range(min, max),
        }
    }

    pub fn alpha(self) -> Self {
        self.with_range('A', 'Z').with_range('a', 'z')
    }

    pub fn numeric(self) -> Self {
        self.with_range('0', '9')
    }
}

impl Arbitrary for CharArbitrary {
    type Value = char;

    fn generator(&self, _size: usize) -> RandomGenerator<char> {
        let alphabet = Arc::new(self.alphabet.clone());
        let width = alphabet.width();
        RandomGenerator::new(move |rng| {
            Ok(char_shrinkable(
                Arc::clone(&alphabet),
                rng.gen_range(0..width),
            ))
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<char> {
        let alphabet = Arc::new(self.alphabet.clone());
        EdgeCases::from_shrinkables(
            alphabet_edge_indices(&alphabet)
                .into_iter()
                .map(|index| char_shrinkable(Arc::clone(&alphabet), index))
                .collect(),
        )
        .truncated(max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<char>> {
        alphabet_exhaustive(&self.alphabet, max_count)
    }
}

fn random_elements<T: ArbitraryValue>(
    rng: &mut dyn RngCore,
    min_length: usize,
    max_length: usize,
    mut element: impl FnMut(&mut dyn RngCore) -> Result<Shrinkable<T>>,
) -> Result<Vec<Shrinkable<T>>> {
    let length = rng.gen_range(min_length..=max_length);
    (0..length).map(|_| element(rng)).collect()
}

fn collect_string(chars: Vec<char>) -> String {
    chars.into_iter().collect()
}

/// Arbitrary of strings over an alphabet
#[derive(Debug, Clone, PartialEq)]
pub struct StringArbitrary {
    alphabet: Alphabet,
    min_length: usize,
    max_length: Option<usize>,
}

/// Strings of printable ASCII characters
pub fn strings() -> StringArbitrary {
    StringArbitrary {
        alphabet: Alphabet::printable(),
        min_length: 0,
        max_length: None,
    }
}

impl StringArbitrary {
    /// Copy with an additional character range; the first one replaces the default
    pub fn with_char_range(mut self, min: char, max: char) -> Self {
        self.alphabet = self.alphabet.with_range(min, max);
        self
    }

    /// Copy with each character of `chars` added to the alphabet
    pub fn with_chars(self, chars: &str) -> Self {
        chars
            .chars()
            .fold(self, |arbitrary, c| arbitrary.with_char_range(c, c))
    }

    pub fn alpha(self) -> Self {
        self.with_char_range('A', 'Z').with_char_range('a', 'z')
    }

    pub fn numeric(self) -> Self {
        self.with_char_range('0', '9')
    }

    pub fn of_length(mut self, length: usize) -> Self {
        self.min_length = length;
        self.max_length = Some(length);
        self
    }

    pub fn of_min_length(mut self, length: usize) -> Self {
        self.min_length = length;
        self
    }

    pub fn of_max_length(mut self, length: usize) -> Self {
        self.max_length = Some(length);
        self
    }

    fn string_shrinkable(&self, chars: Vec<Shrinkable<char>>) -> Shrinkable<String> {
        Shrinkable::collection(chars, self.min_length).map(collect_string)
    }
}

impl Arbitrary for StringArbitrary {
    type Value = String;

    fn generator(&self, size: usize) -> RandomGenerator<String> {
        let alphabet = Arc::new(self.alphabet.clone());
        let width = alphabet.width();
        let min_length = self.min_length;
        let max_length = length_bound(self.min_length, self.max_length, size);
        let arbitrary = self.clone();
        RandomGenerator::new(move |rng| {
            let chars = random_elements(rng, min_length, max_length, |rng| {
                Ok(char_shrinkable(Arc::clone(&alphabet), rng.gen_range(0..width)))
            })?;
            Ok(arbitrary.string_shrinkable(chars))
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<String> {
        let alphabet = Arc::new(self.alphabet.clone());
        let mut cases = Vec::new();
        if self.min_length == 0 {
            cases.push(self.string_shrinkable(Vec::new()));
        }
        let length = self.min_length.max(1);
        if self.max_length.is_none_or(|max| max >= length) {
            for index in alphabet_edge_indices(&alphabet) {
                let chars = vec![char_shrinkable(Arc::clone(&alphabet), index); length];
                cases.push(self.string_shrinkable(chars));
            }
        }
        EdgeCases::from_shrinkables(cases).truncated(max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<String>> {
        let max_length = self.max_length?;
        let chars = alphabet_exhaustive(&self.alphabet, max_count)?;
        let sequences = chars.sequences(self.min_length, max_length, max_count)?;
        Some(sequences.map(Arc::new(collect_string)))
    }
}

/// Arbitrary of vectors whose elements come from another arbitrary
#[derive(Debug)]
pub struct VecArbitrary<T> {
    element: BoxedArbitrary<T>,
    min_size: usize,
    max_size: Option<usize>,
}

impl<T> Clone for VecArbitrary<T> {
    fn clone(&self) -> Self {
        Self {
            element: self.element.clone(),
            min_size: self.min_size,
            max_size: self.max_size,
        }
    }
}

/// Vectors of values drawn from `element`
pub fn vecs<A>(element: A) -> VecArbitrary<A::Value>
where
    A: Arbitrary + 'static,
    A::Value: PartialEq,
{
    VecArbitrary {
        element: element.boxed(),
        min_size: 0,
        max_size: None,
    }
}

impl<T: ArbitraryValue> VecArbitrary<T> {
    pub fn of_size(mut self, size: usize) -> Self {
        self.min_size = size;
        self.max_size = Some(size);
        self
    }

    pub fn of_min_size(mut self, size: usize) -> Self {
        self.min_size = size;
        self
    }

    pub fn of_max_size(mut self, size: usize) -> Self {
        self.max_size = Some(size);
        self
    }
}

impl<T: ArbitraryValue + PartialEq> Arbitrary for VecArbitrary<T> {
    type Value = Vec<T>;

    fn generator(&self, size: usize) -> RandomGenerator<Vec<T>> {
        let mut element = self.element.generator(size);
        let min_size = self.min_size;
        let max_size = length_bound(self.min_size, self.max_size, size);
        RandomGenerator::new(move |rng| {
            let elements = random_elements(rng, min_size, max_size, |rng| element.next(rng))?;
            Ok(Shrinkable::collection(elements, min_size))
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<Vec<T>> {
        let mut cases = Vec::new();
        if self.min_size == 0 {
            cases.push(Shrinkable::collection(Vec::new(), 0));
        }
        let length = self.min_size.max(1);
        if self.max_size.is_none_or(|max| max >= length) {
            for element in self.element.edge_cases(max_edge_cases) {
                cases.push(Shrinkable::collection(vec![element; length], self.min_size));
            }
        }
        EdgeCases::distinct(cases, max_edge_cases)
    }

    fn exhaustive_with_max(&self, max_count: u64) -> Option<ExhaustiveGenerator<Vec<T>>> {
        let max_size = self.max_size?;
        let element = self.element.exhaustive_with_max(max_count)?;
        element.sequences(self.min_size, max_size, max_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::falsifier::Falsification;
    use crate::shrink::ShrinkConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_shrink_candidates() {
        assert_eq!(shrink_candidates(10, 0), vec![0, 5, 8, 9]);
        assert_eq!(shrink_candidates(-3, 0), vec![0, -2]);
        assert_eq!(shrink_candidates(1, 0), vec![0]);
        assert!(shrink_candidates(4, 4).is_empty());
    }

    #[test]
    fn test_integer_edge_cases() {
        let ages = integers::<i32>().between(0, 15);
        assert_eq!(ages.edge_cases(20).values(), vec![0, 1, 2, 14, 15]);

        let bytes = integers::<u8>();
        assert_eq!(bytes.edge_cases(20).values(), vec![0, 1, 2, 254, 255]);
        assert_eq!(bytes.edge_cases(2).len(), 2);
    }

    #[test]
    fn test_integer_generation_within_range() {
        let arbitrary = integers::<i64>().between(-50, 50);
        let mut rng = StdRng::seed_from_u64(42);
        let mut generator = arbitrary.generator(10);
        for value in generator.samples(&mut rng, 500).unwrap() {
            assert!((-50..=50).contains(&value));
        }
    }

    #[test]
    fn test_integer_shrinks_toward_zero_or_nearest_bound() {
        let mut rng = StdRng::seed_from_u64(3);
        let value = integers::<i32>().between(-1000, 1000).generator(1000).next(&mut rng).unwrap();
        let result = value
            .shrink(|_: &i32| Falsification::StillFalsifies)
            .run(&ShrinkConfig::default());
        assert_eq!(result.minimal, 0);

        let positive = integers::<u16>().between(10, 500).generator(100).next(&mut rng).unwrap();
        let result = positive
            .shrink(|value: &u16| Falsification::from_holds(*value < 42))
            .run(&ShrinkConfig::default());
        assert!(result.minimal == 42 || positive.value() < 42);
    }

    #[test]
    fn test_integer_exhaustive() {
        let exhaustive = integers::<i8>().between(-2, 2).exhaustive().unwrap();
        assert_eq!(exhaustive.max_count(), 5);
        assert_eq!(exhaustive.iter().collect::<Vec<i8>>(), vec![-2, -1, 0, 1, 2]);
        assert!(integers::<u64>().exhaustive().is_none());
        assert_eq!(integers::<u8>().exhaustive().unwrap().iter().count(), 256);
    }

    #[test]
    fn test_between_swaps_reversed_bounds() {
        let arbitrary = integers::<i32>().between(10, 1);
        assert_eq!(arbitrary.exhaustive().unwrap().max_count(), 10);
    }

    #[test]
    fn test_of_shrinks_toward_first_value() {
        let names = of(vec!["John", "Lisa", "Kay"]).unwrap();
        assert_eq!(names.edge_cases(10).values(), vec!["John", "Kay"]);
        let shrinkable = choice_shrinkable(Arc::clone(&names.values), 2);
        let result = shrinkable
            .shrink(|_: &&str| Falsification::StillFalsifies)
            .run(&ShrinkConfig::default());
        assert_eq!(result.minimal, "John");
        assert!(of::<i32>(Vec::new()).is_err());
    }

    #[test]
    fn test_string_edge_cases_of_fixed_length() {
        let names = strings().with_char_range('a', 'z').of_length(10);
        assert_eq!(
            names.edge_cases(20).values(),
            vec!["aaaaaaaaaa".to_string(), "zzzzzzzzzz".to_string()]
        );
    }

    #[test]
    fn test_string_generation_respects_configuration() {
        let arbitrary = strings().alpha().of_min_length(2).of_max_length(6);
        let mut rng = StdRng::seed_from_u64(11);
        let mut generator = arbitrary.generator(100);
        for value in generator.samples(&mut rng, 200).unwrap() {
            assert!((2..=6).contains(&value.chars().count()));
            assert!(value.chars().all(|c| c.is_ascii_alphabetic()));
        }
    }

    #[test]
    fn test_string_shrinks_to_minimal_length() {
        let mut rng = StdRng::seed_from_u64(8);
        let value = strings()
            .with_char_range('a', 'z')
            .of_min_length(1)
            .generator(50)
            .next(&mut rng)
            .unwrap();
        let result = value
            .shrink(|_: &String| Falsification::StillFalsifies)
            .run(&ShrinkConfig::default());
        assert_eq!(result.minimal, "a");
    }

    #[test]
    fn test_string_exhaustive_counts_all_lengths() {
        let arbitrary = strings().with_chars("ab").of_max_length(2);
        let exhaustive = arbitrary.exhaustive().unwrap();
        // "", 2 of length one, 4 of length two
        assert_eq!(exhaustive.max_count(), 7);
        assert_eq!(exhaustive.iter().count(), 7);
        assert!(strings().exhaustive().is_none());
    }

    #[test]
    fn test_chars() {
        let letters = chars().range('a', 'c');
        assert_eq!(letters.exhaustive().unwrap().iter().collect::<String>(), "abc");
        assert_eq!(letters.edge_cases(10).values(), vec!['a', 'c']);
        assert_eq!(chars().numeric().exhaustive().unwrap().max_count(), 10);
    }

    #[test]
    fn test_vecs() {
        let arbitrary = vecs(integers::<u8>().between(0, 3)).of_min_size(1).of_max_size(4);
        let mut rng = StdRng::seed_from_u64(17);
        let mut generator = arbitrary.generator(10);
        for value in generator.samples(&mut rng, 100).unwrap() {
            assert!((1..=4).contains(&value.len()));
        }

        let edge_cases = arbitrary.edge_cases(20).values();
        assert_eq!(edge_cases, vec![vec![0], vec![1], vec![2], vec![3]]);

        let small = vecs(booleans()).of_max_size(2);
        assert_eq!(small.exhaustive().unwrap().max_count(), 7);
    }

    #[test]
    fn test_overlapping_ranges_count_each_char_once() {
        let letters = chars().alpha().with_range('a', 'c');
        let exhaustive = letters.exhaustive().unwrap();
        assert_eq!(exhaustive.max_count(), 52);
        let values: Vec<char> = exhaustive.iter().collect();
        assert_eq!(values.len(), 52);
        assert!(values.iter().enumerate().all(|(i, c)| !values[..i].contains(c)));

        let bridged = chars().range('x', 'z').with_range('a', 'y');
        let values: String = bridged.exhaustive().unwrap().iter().collect();
        assert_eq!(values, "xyzabcdefghijklmnopqrstuvw");

        let repeated = strings().with_chars("aa").of_length(3);
        assert_eq!(repeated.alphabet.width(), 1);
        assert_eq!(repeated.exhaustive().unwrap().max_count(), 1);
    }

    #[test]
    fn test_ranges_skip_surrogates() {
        let around = chars().range('\u{D7FF}', '\u{E000}');
        assert_eq!(around.alphabet.width(), 2);
        let values: Vec<char> = around.exhaustive().unwrap().iter().collect();
        assert_eq!(values, vec!['\u{D7FF}', '\u{E000}']);
        assert_eq!(around.alphabet.char_at(1), '\u{E000}');
    }

    #[test]
    fn test_unbounded_length_ranges_are_not_enumerated() {
        assert!(vecs(just(1u8)).of_max_size(usize::MAX).exhaustive().is_none());
        assert!(strings().with_chars("a").of_max_length(usize::MAX).exhaustive().is_none());

        let ones = vecs(just(1u8)).of_min_size(2).of_max_size(5).exhaustive().unwrap();
        assert_eq!(ones.max_count(), 4);
        assert_eq!(ones.iter().last(), Some(vec![1u8; 5]));
    }

    #[test]
    fn test_of_drops_repeated_values() {
        let repeated = of(vec![3, 1, 3, 1]).unwrap();
        assert_eq!(repeated.exhaustive().unwrap().iter().collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(of(vec![5, 5]).unwrap().edge_cases(10).values(), vec![5]);
    }

    #[test]
    fn test_booleans_and_just() {
        assert_eq!(booleans().exhaustive().unwrap().iter().collect::<Vec<_>>(), vec![false, true]);
        assert_eq!(just(7).edge_cases(5).values(), vec![7]);
    }

    #[test]
    fn test_create_calls_supplier_every_time() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let arbitrary = create(move || counter.fetch_add(1, Ordering::SeqCst));
        let mut rng = StdRng::seed_from_u64(1);
        let shrinkable = arbitrary.generator(10).next(&mut rng).unwrap();
        assert_eq!(shrinkable.value(), 0);
        assert_eq!(shrinkable.value(), 1);
        assert_eq!(arbitrary.exhaustive().unwrap().max_count(), 1);
    }
}
