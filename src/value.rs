//! Per-case values and the numeric/semantic duality.
//!
//! Every case of a variable carries two parallel representations: the
//! semantic value ([`Datum`]: a number, boolean, or category label) and the
//! numeric code statistics are computed on. [`Mapping`] is the one place
//! that converts between them: either identity for numeric data or a lookup
//! through a [`CategoryMap`].
//!
//! Values may be scalars, vectors, or matrices ([`Payload`]). Mapping is
//! applied element-wise.

use std::collections::{BTreeMap, BTreeSet};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::distributions::Distribution;
use crate::error::{McError, Result};

// ============================================================================
// Datum
// ============================================================================

/// A single semantic element.
///
/// Ordering is total: numbers (by value, `-0.0 == 0.0`) sort before booleans,
/// which sort before text. Booleans are numeric and code to `0`/`1`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Datum {
    Num(f64),
    Bool(bool),
    Text(String),
}

fn normalize_zero(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x
    }
}

impl Datum {
    fn rank(&self) -> u8 {
        match self {
            Datum::Num(_) => 0,
            Datum::Bool(_) => 1,
            Datum::Text(_) => 2,
        }
    }

    /// Numeric reading of the datum, `None` for text.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Datum::Num(x) => Some(*x),
            Datum::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Datum::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Datum::Text(_))
    }
}

impl Ord for Datum {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Datum::Num(a), Datum::Num(b)) => normalize_zero(*a).total_cmp(&normalize_zero(*b)),
            (Datum::Bool(a), Datum::Bool(b)) => a.cmp(b),
            (Datum::Text(a), Datum::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Datum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Datum {}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Num(x) => write!(f, "{x}"),
            Datum::Bool(b) => write!(f, "{b}"),
            Datum::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Datum {
    fn from(x: f64) -> Self {
        Datum::Num(x)
    }
}

impl From<i32> for Datum {
    fn from(x: i32) -> Self {
        Datum::Num(f64::from(x))
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Bool(b)
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::Text(s.to_owned())
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::Text(s)
    }
}

// ============================================================================
// Payload / Shape
// ============================================================================

/// Shape classification of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    Scalar,
    /// 1-D with the given length.
    Vector(usize),
    /// 2-D with (rows, columns).
    Matrix(usize, usize),
}

/// A scalar, vector, or matrix of elements.
///
/// Vectors of different cases may have different lengths; matrix rows are
/// expected to share a length and the column count is read from the first row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Payload<T> {
    Scalar(T),
    Vector(Vec<T>),
    Matrix(Vec<Vec<T>>),
}

impl<T> Payload<T> {
    pub fn shape(&self) -> Shape {
        match self {
            Payload::Scalar(_) => Shape::Scalar,
            Payload::Vector(v) => Shape::Vector(v.len()),
            Payload::Matrix(rows) => Shape::Matrix(rows.len(), rows.first().map_or(0, Vec::len)),
        }
    }

    /// Length along the leading axis, `None` for scalars.
    pub fn leading_len(&self) -> Option<usize> {
        match self {
            Payload::Scalar(_) => None,
            Payload::Vector(v) => Some(v.len()),
            Payload::Matrix(rows) => Some(rows.len()),
        }
    }

    pub fn as_scalar(&self) -> Option<&T> {
        match self {
            Payload::Scalar(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[T]> {
        match self {
            Payload::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// All elements in row-major order.
    pub fn elements(&self) -> Vec<&T> {
        match self {
            Payload::Scalar(x) => vec![x],
            Payload::Vector(v) => v.iter().collect(),
            Payload::Matrix(rows) => rows.iter().flatten().collect(),
        }
    }

    /// Applies `f` element-wise, keeping the shape.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Payload<U> {
        match self {
            Payload::Scalar(x) => Payload::Scalar(f(x)),
            Payload::Vector(v) => Payload::Vector(v.iter().map(&mut f).collect()),
            Payload::Matrix(rows) => Payload::Matrix(
                rows.iter()
                    .map(|row| row.iter().map(&mut f).collect())
                    .collect(),
            ),
        }
    }

    /// Fallible element-wise map; the first error aborts.
    pub fn try_map<U, E>(&self, mut f: impl FnMut(&T) -> std::result::Result<U, E>) -> std::result::Result<Payload<U>, E> {
        Ok(match self {
            Payload::Scalar(x) => Payload::Scalar(f(x)?),
            Payload::Vector(v) => Payload::Vector(v.iter().map(&mut f).collect::<std::result::Result<_, _>>()?),
            Payload::Matrix(rows) => Payload::Matrix(
                rows.iter()
                    .map(|row| row.iter().map(&mut f).collect::<std::result::Result<Vec<_>, _>>())
                    .collect::<std::result::Result<_, _>>()?,
            ),
        })
    }
}

impl<T: Clone> Payload<T> {
    /// Element or row at position `i` of the leading axis, one rank lower.
    pub fn at(&self, i: usize) -> Option<Payload<T>> {
        match self {
            Payload::Scalar(_) => None,
            Payload::Vector(v) => v.get(i).cloned().map(Payload::Scalar),
            Payload::Matrix(rows) => rows.get(i).cloned().map(Payload::Vector),
        }
    }
}

// ============================================================================
// CategoryMap
// ============================================================================

/// Where a category map came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapSource {
    /// Extracted from observed non-numeric values.
    Auto,
    /// Passed in by the caller.
    Supplied,
}

#[derive(Debug, Clone, Copy)]
struct CodeKey(f64);

impl Ord for CodeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        normalize_zero(self.0).total_cmp(&normalize_zero(other.0))
    }
}

impl PartialOrd for CodeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CodeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CodeKey {}

/// Bijection between semantic values and numeric codes.
///
/// # Examples
/// ```
/// use u_montecarlo::value::{CategoryMap, Datum};
/// let values = [Datum::from("b"), Datum::from("a"), Datum::from("b")];
/// let map = CategoryMap::from_values(&values);
/// assert_eq!(map.code(&Datum::from("a")), Some(0.0));
/// assert_eq!(map.value(1.0), Some(&Datum::from("b")));
/// ```
#[derive(Debug, Clone)]
pub struct CategoryMap {
    to_code: BTreeMap<Datum, f64>,
    to_value: BTreeMap<CodeKey, Datum>,
    source: MapSource,
}

impl CategoryMap {
    /// Assigns codes `0, 1, 2, …` to the unique values in ascending order.
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a Datum>) -> Self {
        let unique: BTreeSet<&Datum> = values.into_iter().collect();
        let mut to_code = BTreeMap::new();
        let mut to_value = BTreeMap::new();
        for (i, v) in unique.into_iter().enumerate() {
            to_code.insert(v.clone(), i as f64);
            to_value.insert(CodeKey(i as f64), v.clone());
        }
        Self {
            to_code,
            to_value,
            source: MapSource::Auto,
        }
    }

    /// Builds a caller-supplied map from `(value, code)` pairs.
    ///
    /// # Errors
    /// [`McError::InvalidParameter`] if a code is not finite or either side
    /// repeats.
    pub fn from_value_codes(pairs: impl IntoIterator<Item = (Datum, f64)>) -> Result<Self> {
        let mut to_code = BTreeMap::new();
        let mut to_value = BTreeMap::new();
        for (value, code) in pairs {
            if !code.is_finite() {
                return Err(McError::InvalidParameter(format!(
                    "category code for '{value}' must be finite, got {code}"
                )));
            }
            if to_value.insert(CodeKey(code), value.clone()).is_some() {
                return Err(McError::InvalidParameter(format!(
                    "category code {code} is assigned more than once"
                )));
            }
            if to_code.insert(value.clone(), code).is_some() {
                return Err(McError::InvalidParameter(format!(
                    "category value '{value}' is assigned more than once"
                )));
            }
        }
        Ok(Self {
            to_code,
            to_value,
            source: MapSource::Supplied,
        })
    }

    /// Builds a caller-supplied map from `(code, value)` pairs.
    pub fn from_code_values(pairs: impl IntoIterator<Item = (f64, Datum)>) -> Result<Self> {
        Self::from_value_codes(pairs.into_iter().map(|(c, v)| (v, c)))
    }

    pub fn code(&self, value: &Datum) -> Option<f64> {
        self.to_code.get(value).copied()
    }

    pub fn value(&self, code: f64) -> Option<&Datum> {
        self.to_value.get(&CodeKey(code))
    }

    pub fn source(&self) -> MapSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.to_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_code.is_empty()
    }

    /// `(value, code)` pairs in value order.
    pub fn iter(&self) -> impl Iterator<Item = (&Datum, f64)> {
        self.to_code.iter().map(|(v, c)| (v, *c))
    }
}

/// Whether a payload needs a category map to be coded.
pub fn needs_category_map(val: &Payload<Datum>) -> bool {
    val.elements().into_iter().any(|d| !d.is_numeric())
}

// ============================================================================
// Mapping
// ============================================================================

/// How a value converts between semantic and numeric form.
#[derive(Debug, Clone, Default)]
pub enum Mapping {
    /// Numeric data: the code is the value.
    #[default]
    Identity,
    /// Categorical data coded through a shared map.
    Lookup(Arc<CategoryMap>),
}

impl Mapping {
    pub fn from_map(map: Option<Arc<CategoryMap>>) -> Self {
        map.map_or(Mapping::Identity, Mapping::Lookup)
    }

    pub fn category_map(&self) -> Option<&Arc<CategoryMap>> {
        match self {
            Mapping::Identity => None,
            Mapping::Lookup(map) => Some(map),
        }
    }

    /// # Errors
    /// [`McError::CategoryLookup`] if the value is absent from the map, or is
    /// text under identity mapping.
    pub fn to_code(&self, value: &Datum) -> Result<f64> {
        match self {
            Mapping::Identity => value.as_num().ok_or_else(|| {
                McError::CategoryLookup(format!("'{value}' is not numeric and no category map is set"))
            }),
            Mapping::Lookup(map) => map
                .code(value)
                .ok_or_else(|| McError::CategoryLookup(format!("value '{value}' is not in the category map"))),
        }
    }

    /// # Errors
    /// [`McError::CategoryLookup`] if the code is absent from the map.
    pub fn to_value(&self, code: f64) -> Result<Datum> {
        match self {
            Mapping::Identity => Ok(Datum::Num(code)),
            Mapping::Lookup(map) => map
                .value(code)
                .cloned()
                .ok_or_else(|| McError::CategoryLookup(format!("code {code} is not in the category map"))),
        }
    }

    pub fn encode(&self, val: &Payload<Datum>) -> Result<Payload<f64>> {
        val.try_map(|d| self.to_code(d))
    }

    pub fn decode(&self, num: &Payload<f64>) -> Result<Payload<Datum>> {
        num.try_map(|&c| self.to_value(c))
    }
}

// ============================================================================
// Values
// ============================================================================

/// Fields shared by every value kind, fixed at construction.
#[derive(Debug, Clone)]
pub struct ValueCore {
    name: String,
    case: usize,
    is_nominal: bool,
    val: Payload<Datum>,
    num: Payload<f64>,
    mapping: Mapping,
}

/// One case's realization of one variable.
pub trait Value {
    fn core(&self) -> &ValueCore;

    fn name(&self) -> &str {
        &self.core().name
    }

    fn case(&self) -> usize {
        self.core().case
    }

    fn is_nominal(&self) -> bool {
        self.core().is_nominal
    }

    /// Semantic value.
    fn val(&self) -> &Payload<Datum> {
        &self.core().val
    }

    /// Numeric code, same shape as [`val`](Value::val).
    fn num(&self) -> &Payload<f64> {
        &self.core().num
    }

    fn shape(&self) -> Shape {
        self.core().num.shape()
    }

    fn mapping(&self) -> &Mapping {
        &self.core().mapping
    }
}

/// A drawn input value: the numeric code is primary and the semantic value
/// is decoded through the optional map.
#[derive(Debug, Clone)]
pub struct InputValue {
    core: ValueCore,
    dist: Arc<dyn Distribution>,
}

impl InputValue {
    /// # Errors
    /// [`McError::CategoryLookup`] if a code is missing from `num_map`.
    pub fn new(
        name: impl Into<String>,
        case: usize,
        num: Payload<f64>,
        dist: Arc<dyn Distribution>,
        num_map: Option<Arc<CategoryMap>>,
        is_nominal: bool,
    ) -> Result<Self> {
        let mapping = Mapping::from_map(num_map);
        let val = mapping.decode(&num)?;
        Ok(Self {
            core: ValueCore {
                name: name.into(),
                case,
                is_nominal,
                val,
                num,
                mapping,
            },
            dist,
        })
    }

    pub fn dist(&self) -> &dyn Distribution {
        self.dist.as_ref()
    }
}

impl Value for InputValue {
    fn core(&self) -> &ValueCore {
        &self.core
    }
}

/// An externally supplied output value: the semantic value is primary and
/// the code is derived from it.
///
/// # Examples
/// ```
/// use u_montecarlo::value::{Datum, MapSource, OutputValue, Payload, Value};
/// let v = OutputValue::new("color", 0, Payload::Vector(vec!["red".into(), "blue".into()]), None, false).unwrap();
/// assert_eq!(v.num(), &Payload::Vector(vec![1.0, 0.0]));
/// assert_eq!(v.mapping().category_map().unwrap().source(), MapSource::Auto);
/// ```
#[derive(Debug, Clone)]
pub struct OutputValue {
    core: ValueCore,
}

impl OutputValue {
    /// Without `value_map`, a map is auto-extracted when any element is text.
    ///
    /// # Errors
    /// [`McError::CategoryLookup`] if an element is missing from `value_map`.
    pub fn new(
        name: impl Into<String>,
        case: usize,
        val: Payload<Datum>,
        value_map: Option<Arc<CategoryMap>>,
        is_nominal: bool,
    ) -> Result<Self> {
        let mapping = match value_map {
            Some(map) => Mapping::Lookup(map),
            None if needs_category_map(&val) => {
                Mapping::Lookup(Arc::new(CategoryMap::from_values(val.elements())))
            }
            None => Mapping::Identity,
        };
        let num = mapping.encode(&val)?;
        Ok(Self {
            core: ValueCore {
                name: name.into(),
                case,
                is_nominal,
                val,
                num,
                mapping,
            },
        })
    }

    /// Splits a matrix value into one vector value per row, named
    /// `"<name> [<row>]"` and sharing this value's mapping. Other shapes
    /// yield no children.
    pub fn split(&self) -> Vec<OutputValue> {
        let (Payload::Matrix(val_rows), Payload::Matrix(num_rows)) = (&self.core.val, &self.core.num) else {
            return Vec::new();
        };
        val_rows
            .iter()
            .zip(num_rows)
            .enumerate()
            .map(|(i, (val, num))| OutputValue {
                core: ValueCore {
                    name: format!("{} [{}]", self.core.name, i),
                    case: self.core.case,
                    is_nominal: self.core.is_nominal,
                    val: Payload::Vector(val.clone()),
                    num: Payload::Vector(num.clone()),
                    mapping: self.core.mapping.clone(),
                },
            })
            .collect()
    }
}

impl Value for OutputValue {
    fn core(&self) -> &ValueCore {
        &self.core
    }
}

// ============================================================================
// Tests
// ============================================================================
