//! Variables: the full ensemble of values for one named quantity.
//!
//! An [`InputVariable`] draws its numeric codes from a [`Distribution`] with
//! an explicit seed. An [`OutputVariable`] is built from externally supplied
//! semantic values and derives its codes, extracting a category map when any
//! value is non-numeric.
//!
//! Both share a [`VarCore`] holding the per-case arrays and the attached
//! [`VarStat`]s, and expose the common [`Variable`] capability set.
//!
//! # Examples
//! ```
//! use u_montecarlo::value::{Datum, Payload, Value};
//! use u_montecarlo::variable::{OutputOptions, OutputVariable, Variable};
//! use u_montecarlo::var_stat::{StatKind, StatSpec};
//!
//! let vals = [1.0, 0.0, 2.0, 2.0].map(|x| Payload::Scalar(Datum::Num(x))).to_vec();
//! let mut v = OutputVariable::new("y", vals, OutputOptions::default()).unwrap();
//! assert_eq!(v.ndraws(), 3);
//! assert_eq!(v.get_value(1).unwrap().val(), &Payload::Scalar(Datum::Num(0.0)));
//! let mean = v.add_var_stat(StatSpec::new(StatKind::Mean)).unwrap();
//! assert_eq!(mean.nums(), Some(&Payload::Scalar(1.25)));
//! ```

use std::sync::Arc;

use crate::distributions::Distribution;
use crate::error::{McError, Result};
use crate::random::create_rng;
use crate::stats::{self, WelfordAccumulator};
use crate::value::{
    needs_category_map, CategoryMap, Datum, InputValue, Mapping, OutputValue, Payload, Shape, Value,
};
use crate::var_stat::{StatSpec, VarStat};

// ============================================================================
// Shared state
// ============================================================================

/// Per-case data and attached statistics shared by every variable kind.
///
/// `nums` and `vals` always hold `ncases` entries; the shape is classified
/// from the first case.
#[derive(Debug, Clone)]
pub struct VarCore {
    name: String,
    ndraws: usize,
    first_case_is_nominal: bool,
    nums: Vec<Payload<f64>>,
    vals: Vec<Payload<Datum>>,
    shape: Shape,
    mapping: Mapping,
    boolean: bool,
    stats: Vec<VarStat>,
}

impl VarCore {
    fn new(
        name: String,
        ndraws: usize,
        first_case_is_nominal: bool,
        nums: Vec<Payload<f64>>,
        vals: Vec<Payload<Datum>>,
        mapping: Mapping,
    ) -> Self {
        let shape = nums.first().map_or(Shape::Scalar, Payload::shape);
        let boolean = all_bool(&vals);
        Self {
            name,
            ndraws,
            first_case_is_nominal,
            nums,
            vals,
            shape,
            mapping,
            boolean,
            stats: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ndraws(&self) -> usize {
        self.ndraws
    }

    /// `ndraws`, plus one when case 0 is the nominal case.
    pub fn ncases(&self) -> usize {
        self.ndraws + usize::from(self.first_case_is_nominal)
    }

    pub fn first_case_is_nominal(&self) -> bool {
        self.first_case_is_nominal
    }

    pub fn nums(&self) -> &[Payload<f64>] {
        &self.nums
    }

    pub fn vals(&self) -> &[Payload<Datum>] {
        &self.vals
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn stats(&self) -> &[VarStat] {
        &self.stats
    }

    /// Whether every value element is a boolean.
    pub fn is_boolean(&self) -> bool {
        self.boolean
    }

    /// Decodes a statistic's numeric result into semantic values.
    ///
    /// Boolean variables decode codes `0` and `1` back to `false` and `true`;
    /// any other code (a mean, say) stays numeric. Otherwise decoding goes
    /// through the mapping.
    pub(crate) fn decode(&self, num: &Payload<f64>) -> Result<Payload<Datum>> {
        if self.boolean && self.mapping.category_map().is_none() {
            return Ok(num.map(|&x| {
                if x == 0.0 {
                    Datum::Bool(false)
                } else if x == 1.0 {
                    Datum::Bool(true)
                } else {
                    Datum::Num(x)
                }
            }));
        }
        self.mapping.decode(num)
    }

    fn is_nominal_case(&self, case: usize) -> bool {
        self.first_case_is_nominal && case == 0
    }

    fn check_case(&self, case: usize) -> Result<()> {
        if case < self.nums.len() {
            Ok(())
        } else {
            Err(McError::CaseOutOfRange {
                case,
                ncases: self.nums.len(),
            })
        }
    }
}

fn all_bool(vals: &[Payload<Datum>]) -> bool {
    let mut elements = vals.iter().flat_map(Payload::elements).peekable();
    elements.peek().is_some() && elements.all(|d| matches!(d, Datum::Bool(_)))
}

/// Summary of a scalar variable's numeric stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Describe {
    pub nobs: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample variance, `None` for a single observation.
    pub variance: Option<f64>,
    /// Population skewness `m₃ / m₂^1.5`, central moments over `n`.
    pub skewness: Option<f64>,
    /// Population excess kurtosis `m₄ / m₂² − 3`.
    pub kurtosis: Option<f64>,
}

// ============================================================================
// Variable trait
// ============================================================================

/// Capabilities common to input and output variables.
pub trait Variable {
    type Value: Value;

    fn core(&self) -> &VarCore;

    fn core_mut(&mut self) -> &mut VarCore;

    /// Materializes the value of one case.
    ///
    /// # Errors
    /// [`McError::CaseOutOfRange`] if `case >= ncases()`.
    fn get_value(&self, case: usize) -> Result<Self::Value>;

    fn name(&self) -> &str {
        self.core().name()
    }

    fn ndraws(&self) -> usize {
        self.core().ndraws()
    }

    fn ncases(&self) -> usize {
        self.core().ncases()
    }

    fn first_case_is_nominal(&self) -> bool {
        self.core().first_case_is_nominal()
    }

    /// Numeric codes, one per case.
    fn nums(&self) -> &[Payload<f64>] {
        self.core().nums()
    }

    /// Semantic values, one per case.
    fn vals(&self) -> &[Payload<Datum>] {
        self.core().vals()
    }

    fn shape(&self) -> Shape {
        self.core().shape()
    }

    fn mapping(&self) -> &Mapping {
        self.core().mapping()
    }

    /// Semantic value of the nominal case, if there is one.
    fn nominal_value(&self) -> Option<&Payload<Datum>> {
        let core = self.core();
        if core.first_case_is_nominal {
            core.vals.first()
        } else {
            None
        }
    }

    fn var_stats(&self) -> &[VarStat] {
        self.core().stats()
    }

    /// Computes a statistic and attaches it.
    ///
    /// # Errors
    /// Any error from resolving or computing the statistic; nothing is
    /// attached on failure.
    fn add_var_stat(&mut self, spec: StatSpec) -> Result<&VarStat> {
        let stat = VarStat::new(self.core(), spec)?;
        let stats = &mut self.core_mut().stats;
        stats.push(stat);
        let last = stats.len() - 1;
        Ok(&stats[last])
    }

    fn clear_var_stats(&mut self) {
        self.core_mut().stats.clear();
    }

    /// Recomputes every attached statistic from its definition against the
    /// current data.
    ///
    /// # Errors
    /// The first failing statistic's error; the previous results are then
    /// kept unchanged.
    fn refresh_var_stats(&mut self) -> Result<()> {
        let core = self.core();
        let fresh = core
            .stats
            .iter()
            .map(|s| VarStat::new(core, s.spec().clone()))
            .collect::<Result<Vec<_>>>()?;
        self.core_mut().stats = fresh;
        Ok(())
    }

    /// Summary of the numeric stream. `None` unless the variable is scalar
    /// and its data is finite.
    fn describe(&self) -> Option<Describe> {
        if self.shape() != Shape::Scalar {
            return None;
        }
        let data: Vec<f64> = self.nums().iter().filter_map(|x| x.as_scalar().copied()).collect();
        let mut acc = WelfordAccumulator::new();
        for &x in &data {
            acc.update(x);
        }
        Some(Describe {
            nobs: data.len(),
            min: stats::min(&data)?,
            max: stats::max(&data)?,
            mean: stats::mean(&data)?,
            variance: acc.sample_variance(),
            skewness: acc.population_skewness(),
            kurtosis: acc.population_kurtosis(),
        })
    }
}

// ============================================================================
// InputVariable
// ============================================================================

/// Construction options for [`InputVariable`].
#[derive(Debug, Clone)]
pub struct InputOptions {
    /// Decodes drawn codes into categorical values.
    pub num_map: Option<Arc<CategoryMap>>,
    pub first_case_is_nominal: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            num_map: None,
            first_case_is_nominal: true,
        }
    }
}

/// A variable drawn from a distribution.
///
/// Draws happen eagerly in [`new`](Self::new) and again on
/// [`set_ndraws`](Self::set_ndraws). Attached statistics are not recomputed
/// by a redraw.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use u_montecarlo::distributions::Normal;
/// use u_montecarlo::variable::{InputOptions, InputVariable, Variable};
///
/// let dist = Arc::new(Normal::new(10.0, 2.0).unwrap());
/// let x = InputVariable::new("x", dist, 100, 42, InputOptions::default()).unwrap();
/// assert_eq!(x.ncases(), 101);
/// assert_eq!(x.nums()[0].as_scalar(), Some(&10.0));
/// ```
#[derive(Debug, Clone)]
pub struct InputVariable {
    core: VarCore,
    dist: Arc<dyn Distribution>,
    seed: u64,
    num_map: Option<Arc<CategoryMap>>,
}

impl InputVariable {
    /// Draws `ndraws` samples from `dist` with `seed`, preceded by the
    /// nominal value when `opts.first_case_is_nominal`.
    ///
    /// # Errors
    /// - [`McError::InvalidDraw`] if a drawn value is NaN.
    /// - [`McError::CategoryLookup`] if a drawn code is missing from
    ///   `opts.num_map`.
    pub fn new(
        name: impl Into<String>,
        dist: Arc<dyn Distribution>,
        ndraws: usize,
        seed: u64,
        opts: InputOptions,
    ) -> Result<Self> {
        let name = name.into();
        let mapping = Mapping::from_map(opts.num_map.clone());
        let (nums, vals) = draw(&name, dist.as_ref(), ndraws, seed, opts.first_case_is_nominal, &mapping)?;
        Ok(Self {
            core: VarCore::new(name, ndraws, opts.first_case_is_nominal, nums, vals, mapping),
            dist,
            seed,
            num_map: opts.num_map,
        })
    }

    /// Changes the draw count and redraws with the same seed.
    ///
    /// Attached statistics keep their old results until
    /// [`refresh_var_stats`](Variable::refresh_var_stats) is called.
    ///
    /// # Errors
    /// As for [`new`](Self::new); the variable is unchanged on failure.
    pub fn set_ndraws(&mut self, ndraws: usize) -> Result<()> {
        let core = &self.core;
        let (nums, vals) = draw(
            &core.name,
            self.dist.as_ref(),
            ndraws,
            self.seed,
            core.first_case_is_nominal,
            &core.mapping,
        )?;
        let core = &mut self.core;
        core.ndraws = ndraws;
        core.shape = nums.first().map_or(Shape::Scalar, Payload::shape);
        core.nums = nums;
        core.boolean = all_bool(&vals);
        core.vals = vals;
        Ok(())
    }

    pub fn dist(&self) -> &dyn Distribution {
        self.dist.as_ref()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Nominal point of a distribution: the expectation, snapped to the closest
/// support point for discrete distributions.
fn nominal_draw(dist: &dyn Distribution) -> f64 {
    let ev = dist.mean();
    if !dist.is_discrete() {
        return ev;
    }
    let pc = dist.cdf(ev);
    [pc - f64::EPSILON, pc, pc + f64::EPSILON]
        .into_iter()
        .filter_map(|p| dist.quantile(p.clamp(0.0, 1.0)))
        .min_by(|a, b| (a - ev).abs().total_cmp(&(b - ev).abs()))
        .unwrap_or(ev)
}

fn draw(
    name: &str,
    dist: &dyn Distribution,
    ndraws: usize,
    seed: u64,
    first_case_is_nominal: bool,
    mapping: &Mapping,
) -> Result<(Vec<Payload<f64>>, Vec<Payload<Datum>>)> {
    let mut rng = create_rng(seed);
    let mut raw = Vec::with_capacity(ndraws + 1);
    if first_case_is_nominal {
        raw.push(nominal_draw(dist));
    }
    raw.extend((0..ndraws).map(|_| dist.sample(&mut rng)));

    if let Some(case) = raw.iter().position(|x| x.is_nan()) {
        return Err(McError::InvalidDraw {
            name: name.to_string(),
            detail: format!("case {case} of {dist:?} is NaN"),
        });
    }

    let nums: Vec<Payload<f64>> = raw.into_iter().map(Payload::Scalar).collect();
    let vals = nums.iter().map(|x| mapping.decode(x)).collect::<Result<Vec<_>>>()?;
    tracing::debug!(
        "drew input variable '{}': ndraws={} seed={} nominal={:?}",
        name,
        ndraws,
        seed,
        first_case_is_nominal.then(|| vals.first()).flatten()
    );
    Ok((nums, vals))
}

impl Variable for InputVariable {
    type Value = InputValue;

    fn core(&self) -> &VarCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut VarCore {
        &mut self.core
    }

    fn get_value(&self, case: usize) -> Result<InputValue> {
        self.core.check_case(case)?;
        InputValue::new(
            self.core.name.clone(),
            case,
            self.core.nums[case].clone(),
            Arc::clone(&self.dist),
            self.num_map.clone(),
            self.core.is_nominal_case(case),
        )
    }
}

// ============================================================================
// OutputVariable
// ============================================================================

/// Construction options for [`OutputVariable`].
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Codes categorical values. Without it a map is extracted when any
    /// value is non-numeric.
    pub value_map: Option<Arc<CategoryMap>>,
    /// Expected draw count; inferred from the case count when `None`.
    pub ndraws: Option<usize>,
    pub first_case_is_nominal: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            value_map: None,
            ndraws: None,
            first_case_is_nominal: true,
        }
    }
}

/// A variable built from externally collected results.
#[derive(Debug, Clone)]
pub struct OutputVariable {
    core: VarCore,
}

impl OutputVariable {
    /// Builds the variable from one semantic value per case.
    ///
    /// # Errors
    /// - [`McError::InvalidParameter`] if `vals` is empty or its length
    ///   disagrees with `opts.ndraws`.
    /// - [`McError::CategoryLookup`] if a value is missing from
    ///   `opts.value_map`.
    pub fn new(name: impl Into<String>, vals: Vec<Payload<Datum>>, opts: OutputOptions) -> Result<Self> {
        let name = name.into();
        let ncases = vals.len();
        if ncases == 0 {
            return Err(McError::InvalidParameter(format!(
                "output variable '{name}' needs at least one case"
            )));
        }
        let ndraws = ncases - usize::from(opts.first_case_is_nominal);
        if let Some(expected) = opts.ndraws {
            if expected != ndraws {
                return Err(McError::InvalidParameter(format!(
                    "output variable '{name}' has {ncases} cases but ndraws={expected}"
                )));
            }
        }

        let mapping = match opts.value_map {
            Some(map) => Mapping::Lookup(map),
            None if vals.iter().any(needs_category_map) => {
                let map = CategoryMap::from_values(vals.iter().flat_map(Payload::elements));
                Mapping::Lookup(Arc::new(map))
            }
            None => Mapping::Identity,
        };
        let nums = vals.iter().map(|v| mapping.encode(v)).collect::<Result<Vec<_>>>()?;

        let core = VarCore::new(name, ndraws, opts.first_case_is_nominal, nums, vals, mapping);
        tracing::debug!(
            "built output variable '{}': ncases={} shape={:?} mapped={}",
            core.name,
            ncases,
            core.shape,
            core.mapping.category_map().is_some()
        );
        Ok(Self { core })
    }

    /// Splits a vector or matrix variable along its leading axis into one
    /// variable per position, named `"<name> [<i>]"`.
    ///
    /// Each child keeps the draw count, category map, and nominal flag, and
    /// has every statistic definition of this variable re-attached. Vector
    /// variables yield scalar children; matrix variables yield vector
    /// children. Positions not covered by every case are dropped. Scalar
    /// variables yield no children.
    ///
    /// # Errors
    /// Any error from re-attaching a statistic to a child.
    pub fn split(&self) -> Result<Vec<OutputVariable>> {
        let core = &self.core;
        let Some(npos) = core.vals.iter().map(Payload::leading_len).collect::<Option<Vec<_>>>() else {
            return Ok(Vec::new());
        };
        let shortest = npos.iter().copied().min().unwrap_or(0);
        let longest = npos.iter().copied().max().unwrap_or(0);
        if longest > shortest {
            tracing::warn!(
                "splitting ragged variable '{}' drops positions {}..{} not present in every case",
                core.name,
                shortest,
                longest
            );
        }

        let mut children = Vec::with_capacity(shortest);
        for i in 0..shortest {
            let Some(vals) = core.vals.iter().map(|v| v.at(i)).collect::<Option<Vec<_>>>() else {
                continue;
            };
            let opts = OutputOptions {
                value_map: core.mapping.category_map().cloned(),
                ndraws: Some(core.ndraws),
                first_case_is_nominal: core.first_case_is_nominal,
            };
            let mut child = OutputVariable::new(format!("{} [{}]", core.name, i), vals, opts)?;
            for stat in &core.stats {
                child.add_var_stat(stat.spec().clone())?;
            }
            children.push(child);
        }
        tracing::debug!("split '{}' into {} variables", core.name, children.len());
        Ok(children)
    }
}

impl Variable for OutputVariable {
    type Value = OutputValue;

    fn core(&self) -> &VarCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut VarCore {
        &mut self.core
    }

    fn get_value(&self, case: usize) -> Result<OutputValue> {
        self.core.check_case(case)?;
        OutputValue::new(
            self.core.name.clone(),
            case,
            self.core.vals[case].clone(),
            self.core.mapping.category_map().cloned(),
            self.core.is_nominal_case(case),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{Discrete, Normal, UniformInt};
    use crate::value::MapSource;
    use crate::var_stat::StatKind;
    use tracing_test::traced_test;

    fn scalars(xs: &[f64]) -> Vec<Payload<Datum>> {
        xs.iter().map(|&x| Payload::Scalar(Datum::Num(x))).collect()
    }

    fn text(s: &str) -> Payload<Datum> {
        Payload::Scalar(Datum::from(s))
    }

    #[derive(Debug)]
    struct Undefined;

    impl Distribution for Undefined {
        fn mean(&self) -> f64 {
            0.0
        }
        fn variance(&self) -> f64 {
            0.0
        }
        fn cdf(&self, _x: f64) -> f64 {
            0.0
        }
        fn quantile(&self, _p: f64) -> Option<f64> {
            None
        }
    }

    // --- InputVariable ---

    #[test]
    fn test_input_case_counts() {
        let dist = Arc::new(Normal::new(0.0, 1.0).unwrap());
        let x = InputVariable::new("x", dist.clone(), 50, 7, InputOptions::default()).unwrap();
        assert_eq!(x.ndraws(), 50);
        assert_eq!(x.ncases(), 51);
        assert_eq!(x.nums().len(), 51);
        assert_eq!(x.vals().len(), 51);
        assert_eq!(x.nums()[0], Payload::Scalar(0.0));

        let opts = InputOptions {
            first_case_is_nominal: false,
            ..InputOptions::default()
        };
        let y = InputVariable::new("y", dist, 50, 7, opts).unwrap();
        assert_eq!(y.ncases(), 50);
        assert!(y.nominal_value().is_none());
    }

    #[test]
    fn test_input_same_seed_same_draws() {
        let dist: Arc<dyn Distribution> = Arc::new(Normal::new(0.0, 1.0).unwrap());
        let a = InputVariable::new("a", dist.clone(), 20, 99, InputOptions::default()).unwrap();
        let b = InputVariable::new("b", dist.clone(), 20, 99, InputOptions::default()).unwrap();
        let c = InputVariable::new("c", dist, 20, 100, InputOptions::default()).unwrap();
        assert_eq!(a.nums(), b.nums());
        assert_ne!(a.nums(), c.nums());
        assert_eq!(a.seed(), 99);
    }

    #[test]
    fn test_input_discrete_nominal_snaps_to_support() {
        let dist = Arc::new(Discrete::new(&[1.0, 5.0, 6.0], &[1.0, 1.0, 1.0]).unwrap());
        let x = InputVariable::new("d", dist, 10, 1, InputOptions::default()).unwrap();
        assert_eq!(x.nominal_value(), Some(&Payload::Scalar(Datum::Num(5.0))));

        let dist = Arc::new(UniformInt::new(1, 5).unwrap());
        let x = InputVariable::new("u", dist, 10, 1, InputOptions::default()).unwrap();
        assert_eq!(x.nums()[0], Payload::Scalar(2.0));
    }

    #[test]
    fn test_input_nominal_case_flag() {
        let dist = Arc::new(Normal::new(3.0, 1.0).unwrap());
        let x = InputVariable::new("x", dist, 5, 3, InputOptions::default()).unwrap();
        assert!(x.get_value(0).unwrap().is_nominal());
        for case in 1..x.ncases() {
            assert!(!x.get_value(case).unwrap().is_nominal());
        }
        assert_eq!(
            x.get_value(6).unwrap_err(),
            McError::CaseOutOfRange { case: 6, ncases: 6 }
        );
    }

    #[test]
    fn test_input_categorical_map() {
        let map = Arc::new(
            CategoryMap::from_code_values([(0.0, Datum::from("heads")), (1.0, Datum::from("tails"))]).unwrap(),
        );
        let dist = Arc::new(UniformInt::new(0, 2).unwrap());
        let opts = InputOptions {
            num_map: Some(map),
            first_case_is_nominal: false,
        };
        let x = InputVariable::new("coin", dist, 40, 5, opts).unwrap();
        for (num, val) in x.nums().iter().zip(x.vals()) {
            let expected = if num == &Payload::Scalar(0.0) { "heads" } else { "tails" };
            assert_eq!(val, &text(expected));
        }
        let v = x.get_value(3).unwrap();
        assert_eq!(v.val(), &x.vals()[3]);
    }

    #[test]
    fn test_input_nan_draw_is_invalid() {
        let err = InputVariable::new("bad", Arc::new(Undefined), 3, 0, InputOptions::default()).unwrap_err();
        assert!(matches!(err, McError::InvalidDraw { ref name, .. } if name == "bad"));
    }

    #[test]
    fn test_set_ndraws_leaves_stats_stale() {
        let dist = Arc::new(Normal::new(0.0, 1.0).unwrap());
        let mut x = InputVariable::new("x", dist, 10, 11, InputOptions::default()).unwrap();
        let before = x.add_var_stat(StatSpec::new(StatKind::Max)).unwrap().nums().cloned();

        x.set_ndraws(200).unwrap();
        assert_eq!(x.ncases(), 201);
        assert_eq!(x.var_stats()[0].nums().cloned(), before);

        x.refresh_var_stats().unwrap();
        let data: Vec<f64> = x.nums().iter().filter_map(|p| p.as_scalar().copied()).collect();
        let max = stats::max(&data).unwrap();
        assert_eq!(x.var_stats()[0].nums(), Some(&Payload::Scalar(max)));
    }

    #[test]
    fn test_set_ndraws_prefix_is_stable() {
        let dist = Arc::new(Normal::new(0.0, 1.0).unwrap());
        let mut x = InputVariable::new("x", dist, 10, 11, InputOptions::default()).unwrap();
        let first = x.nums().to_vec();
        x.set_ndraws(20).unwrap();
        assert_eq!(&x.nums()[..11], first.as_slice());
    }

    // --- OutputVariable ---

    #[test]
    fn test_output_scalar_scenario() {
        let mut v = OutputVariable::new("y", scalars(&[1.0, 0.0, 2.0, 2.0]), OutputOptions::default()).unwrap();
        assert_eq!(v.ndraws(), 3);
        assert_eq!(v.ncases(), 4);
        assert_eq!(v.get_value(1).unwrap().val(), &Payload::Scalar(Datum::Num(0.0)));
        assert!(v.get_value(0).unwrap().is_nominal());
        assert_eq!(v.nominal_value(), Some(&Payload::Scalar(Datum::Num(1.0))));
        let s = v.add_var_stat(StatSpec::new(StatKind::Mean)).unwrap();
        assert_eq!(s.nums(), Some(&Payload::Scalar(1.25)));
    }

    #[test]
    fn test_output_rejects_bad_case_counts() {
        let err = OutputVariable::new("e", Vec::new(), OutputOptions::default()).unwrap_err();
        assert!(matches!(err, McError::InvalidParameter(_)));

        let opts = OutputOptions {
            ndraws: Some(5),
            ..OutputOptions::default()
        };
        let err = OutputVariable::new("e", scalars(&[1.0, 2.0]), opts).unwrap_err();
        assert!(matches!(err, McError::InvalidParameter(_)));
    }

    #[test]
    fn test_output_union_category_map() {
        let vals = vec![
            Payload::Vector(vec![Datum::from("b"), Datum::from("a")]),
            Payload::Vector(vec![Datum::from("c")]),
            Payload::Vector(vec![Datum::from("a"), Datum::from("a"), Datum::from("b")]),
        ];
        let v = OutputVariable::new("cats", vals, OutputOptions::default()).unwrap();
        let map = v.mapping().category_map().unwrap();
        assert_eq!(map.source(), MapSource::Auto);
        assert_eq!(map.len(), 3);
        assert_eq!(v.nums()[1], Payload::Vector(vec![2.0]));
        assert_eq!(v.shape(), Shape::Vector(2));
        for (num, val) in v.nums().iter().zip(v.vals()) {
            assert_eq!(&v.mapping().decode(num).unwrap(), val);
        }
    }

    #[test]
    fn test_output_supplied_map_is_used() {
        let map = Arc::new(CategoryMap::from_value_codes([(Datum::from("lo"), 10.0), (Datum::from("hi"), 20.0)]).unwrap());
        let opts = OutputOptions {
            value_map: Some(map),
            ..OutputOptions::default()
        };
        let v = OutputVariable::new("lvl", vec![text("lo"), text("hi"), text("hi")], opts).unwrap();
        assert_eq!(v.nums(), &[Payload::Scalar(10.0), Payload::Scalar(20.0), Payload::Scalar(20.0)]);
        assert_eq!(v.mapping().category_map().unwrap().source(), MapSource::Supplied);
        let value = v.get_value(2).unwrap();
        assert_eq!(value.num(), &Payload::Scalar(20.0));
    }

    #[test]
    fn test_describe() {
        let v = OutputVariable::new("y", scalars(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), OutputOptions::default())
            .unwrap();
        let d = v.describe().unwrap();
        assert_eq!(d.nobs, 8);
        assert_eq!(d.min, 2.0);
        assert_eq!(d.max, 9.0);
        assert!((d.mean - 5.0).abs() < 1e-12);
        assert!((d.variance.unwrap() - 4.571428571428571).abs() < 1e-10);
        assert!(d.skewness.is_some());

        let vec_var = OutputVariable::new("v", vec![Payload::Vector(vec![Datum::Num(1.0)])], OutputOptions::default())
            .unwrap();
        assert!(vec_var.describe().is_none());
    }

    #[test]
    fn test_describe_uses_population_moments() {
        let v = OutputVariable::new("y", scalars(&[1.0, 0.0, 2.0, 2.0]), OutputOptions::default()).unwrap();
        let d = v.describe().unwrap();
        assert_eq!(d.nobs, 4);
        assert!((d.mean - 1.25).abs() < 1e-12);
        assert!((d.variance.unwrap() - 0.9166666666666666).abs() < 1e-12);
        assert!((d.skewness.unwrap() + 0.49338220021815865).abs() < 1e-12);
        assert!((d.kurtosis.unwrap() + 1.371900826446281).abs() < 1e-12);
    }

    #[test]
    fn test_boolean_flag() {
        let flags = vec![Payload::Scalar(Datum::Bool(true)), Payload::Scalar(Datum::Bool(false))];
        let v = OutputVariable::new("b", flags, OutputOptions::default()).unwrap();
        assert!(v.core().is_boolean());
        let mixed = vec![Payload::Scalar(Datum::Bool(true)), Payload::Scalar(Datum::Num(2.0))];
        let v = OutputVariable::new("m", mixed, OutputOptions::default()).unwrap();
        assert!(!v.core().is_boolean());
    }

    #[test]
    fn test_clear_var_stats() {
        let mut v = OutputVariable::new("y", scalars(&[1.0, 2.0, 3.0]), OutputOptions::default()).unwrap();
        v.add_var_stat(StatSpec::new(StatKind::Min)).unwrap();
        v.add_var_stat(StatSpec::new(StatKind::Max)).unwrap();
        assert_eq!(v.var_stats().len(), 2);
        v.clear_var_stats();
        assert!(v.var_stats().is_empty());
    }

    // --- split ---

    #[test]
    fn test_split_identical_matrices() {
        let m = Payload::Matrix(vec![
            vec![Datum::Num(1.0), Datum::Num(2.0)],
            vec![Datum::Num(3.0), Datum::Num(4.0)],
            vec![Datum::Num(5.0), Datum::Num(6.0)],
        ]);
        let mut v = OutputVariable::new("m", vec![m; 5], OutputOptions::default()).unwrap();
        assert_eq!(v.shape(), Shape::Matrix(3, 2));
        let parent = v
            .add_var_stat(StatSpec::new(StatKind::OrderStatTI).p(0.33).c(0.5))
            .unwrap();
        assert!(parent.nums().is_none());

        let children = v.split().unwrap();
        assert_eq!(children.len(), 3);
        for (i, child) in children.iter().enumerate() {
            assert_eq!(child.name(), format!("m [{i}]"));
            assert_eq!(child.ndraws(), 4);
            assert_eq!(child.shape(), Shape::Vector(2));
            let stat = &child.var_stats()[0];
            assert_eq!(stat.k(), Some(1));
            let lo = (2 * i + 1) as f64;
            let hi = (2 * i + 2) as f64;
            assert_eq!(stat.nums(), Some(&Payload::Matrix(vec![vec![lo, lo], vec![hi, hi]])));
            for case in 0..child.ncases() {
                let Payload::Matrix(rows) = &v.vals()[case] else { unreachable!() };
                assert_eq!(child.vals()[case], Payload::Vector(rows[i].clone()));
            }
        }
    }

    #[test]
    fn test_split_vector_gives_scalars() {
        let vals = vec![
            Payload::Vector(vec![Datum::Num(1.0), Datum::Num(10.0)]),
            Payload::Vector(vec![Datum::Num(2.0), Datum::Num(20.0)]),
            Payload::Vector(vec![Datum::Num(3.0), Datum::Num(30.0)]),
        ];
        let mut v = OutputVariable::new("v", vals, OutputOptions::default()).unwrap();
        v.add_var_stat(StatSpec::new(StatKind::Median)).unwrap();
        let children = v.split().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].shape(), Shape::Scalar);
        assert_eq!(children[1].var_stats()[0].nums(), Some(&Payload::Scalar(20.0)));
    }

    #[test]
    #[traced_test]
    fn test_split_ragged_drops_tail() {
        let vals = vec![
            Payload::Vector(vec![Datum::Num(1.0), Datum::Num(2.0), Datum::Num(3.0)]),
            Payload::Vector(vec![Datum::Num(4.0)]),
        ];
        let v = OutputVariable::new("r", vals, OutputOptions::default()).unwrap();
        let children = v.split().unwrap();
        assert_eq!(children.len(), 1);
        assert!(logs_contain("drops positions 1..3"));
    }

    #[test]
    fn test_split_scalar_is_empty() {
        let v = OutputVariable::new("s", scalars(&[1.0, 2.0]), OutputOptions::default()).unwrap();
        assert!(v.split().unwrap().is_empty());
    }

    #[test]
    fn test_split_keeps_category_map() {
        let vals = vec![
            Payload::Vector(vec![Datum::from("x"), Datum::from("y")]),
            Payload::Vector(vec![Datum::from("y"), Datum::from("y")]),
        ];
        let v = OutputVariable::new("c", vals, OutputOptions::default()).unwrap();
        let children = v.split().unwrap();
        let parent_map = v.mapping().category_map().unwrap();
        for child in &children {
            assert!(Arc::ptr_eq(child.mapping().category_map().unwrap(), parent_map));
        }
        assert_eq!(children[0].nums(), &[Payload::Scalar(0.0), Payload::Scalar(1.0)]);
    }
}
