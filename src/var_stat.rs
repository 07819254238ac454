//! Named statistics attached to a variable.
//!
//! A [`StatSpec`] describes what to compute; attaching it to a variable
//! (see [`Variable::add_var_stat`](crate::variable::Variable::add_var_stat))
//! resolves its parameters and computes a [`VarStat`] eagerly. Results are
//! never recomputed automatically: after a variable is redrawn its stats are
//! stale until [`refresh_var_stats`](crate::variable::Variable::refresh_var_stats)
//! is called.
//!
//! # Result shapes
//!
//! | Variable | Point statistic | Two-sided bound | `all` bound |
//! |---|---|---|---|
//! | scalar | `Scalar` | `Vector` of 2 | `Vector` of 3 |
//! | vector (possibly ragged) | `Vector`, one per index | `Matrix` of `[lo, hi]` rows | `Matrix` of `[lo, mid, hi]` rows |
//! | matrix | no result | no result | no result |
//!
//! Each index position of a vector variable uses only the cases long enough
//! to cover it, and order-statistic ranks are resolved for that subset size.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::bound::{Sidedness, StatBound};
use crate::error::{McError, Result};
use crate::gaussian::{pct_to_sig, sig_to_pct};
use crate::order_stats::{anchor_indices, order_stat_p_rank, order_stat_ti_rank};
use crate::stats;
use crate::value::{Datum, Payload, Shape};
use crate::variable::VarCore;

const DEFAULT_CONFIDENCE: f64 = 0.95;

// ============================================================================
// Statistic definitions
// ============================================================================

/// Kind of statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatKind {
    Max,
    Min,
    Median,
    Mean,
    GeoMean,
    Mode,
    /// `mean + sig·σ` for a given sigma level.
    SigmaP,
    /// `mean + sig·σ` with `sig` derived from a percentile.
    GaussianP,
    /// Order-statistic tolerance interval.
    OrderStatTI,
    /// Order-statistic confidence bound on a percentile.
    OrderStatP,
}

impl StatKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatKind::Max => "max",
            StatKind::Min => "min",
            StatKind::Median => "median",
            StatKind::Mean => "mean",
            StatKind::GeoMean => "geomean",
            StatKind::Mode => "mode",
            StatKind::SigmaP => "sigmaP",
            StatKind::GaussianP => "gaussianP",
            StatKind::OrderStatTI => "orderstatTI",
            StatKind::OrderStatP => "orderstatP",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatKind {
    type Err = McError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "max" => StatKind::Max,
            "min" => StatKind::Min,
            "median" => StatKind::Median,
            "mean" => StatKind::Mean,
            "geomean" => StatKind::GeoMean,
            "mode" => StatKind::Mode,
            "sigmaP" => StatKind::SigmaP,
            "gaussianP" => StatKind::GaussianP,
            "orderstatTI" => StatKind::OrderStatTI,
            "orderstatP" => StatKind::OrderStatP,
            other => {
                return Err(McError::InvalidParameter(format!(
                    "unrecognized statistic '{other}'"
                )))
            }
        })
    }
}

/// Kind-specific parameters. Unset fields take per-kind defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatParams {
    pub sig: Option<f64>,
    pub p: Option<f64>,
    pub c: Option<f64>,
    pub bound: Option<StatBound>,
}

/// Definition of a statistic, kept by the variable so it can be recomputed.
///
/// # Examples
/// ```
/// use u_montecarlo::bound::StatBound;
/// use u_montecarlo::var_stat::{StatKind, StatSpec};
/// let spec = StatSpec::new(StatKind::OrderStatTI)
///     .p(0.9)
///     .c(0.95)
///     .bound(StatBound::TwoSided);
/// assert_eq!(spec.params.p, Some(0.9));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatSpec {
    pub kind: StatKind,
    pub params: StatParams,
    /// Overrides the generated name.
    pub name: Option<String>,
}

impl StatSpec {
    pub fn new(kind: StatKind) -> Self {
        Self {
            kind,
            params: StatParams::default(),
            name: None,
        }
    }

    pub fn sig(mut self, sig: f64) -> Self {
        self.params.sig = Some(sig);
        self
    }

    pub fn p(mut self, p: f64) -> Self {
        self.params.p = Some(p);
        self
    }

    pub fn c(mut self, c: f64) -> Self {
        self.params.c = Some(c);
        self
    }

    pub fn bound(mut self, bound: StatBound) -> Self {
        self.params.bound = Some(bound);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn require_p(&self) -> Result<f64> {
        self.params.p.ok_or_else(|| McError::MissingParameter {
            stat: self.kind.to_string(),
            param: "p".into(),
        })
    }
}

/// Which end(s) of the sorted sample a tolerance interval reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiSide {
    Low,
    High,
    Both,
}

impl TiSide {
    fn sidedness(self) -> Sidedness {
        match self {
            TiSide::Both => Sidedness::TwoSided,
            TiSide::Low | TiSide::High => Sidedness::OneSided,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Reducer {
    Point(fn(&[f64]) -> Option<f64>),
    Sigma(f64),
    Tolerance { p: f64, c: f64, side: TiSide },
    Percentile { p: f64, c: f64, bound: StatBound },
}

impl Reducer {
    fn width(self) -> usize {
        match self {
            Reducer::Tolerance { side: TiSide::Both, .. } => 2,
            Reducer::Percentile { bound: StatBound::TwoSided, .. } => 2,
            Reducer::Percentile { bound: StatBound::All, .. } => 3,
            _ => 1,
        }
    }

    fn rank(self, n: usize) -> Result<usize> {
        match self {
            Reducer::Tolerance { p, c, side } => order_stat_ti_rank(n, p, c, side.sidedness()),
            Reducer::Percentile { p, c, bound } => order_stat_p_rank(n, p, c, bound),
            Reducer::Point(_) | Reducer::Sigma(_) => Ok(0),
        }
    }
}

/// `x` as a percentage, rounded so `0.9` prints as `90` in stat names.
fn percent(x: f64) -> f64 {
    (x * 100.0 * 1e9).round() / 1e9
}

fn sigma_p(data: &[f64], sig: f64) -> Option<f64> {
    Some(stats::mean(data)? + sig * stats::population_std_dev(data)?)
}

// ============================================================================
// VarStat
// ============================================================================

/// Ranks resolved during one computation, memoized per subset size.
#[derive(Default)]
struct RankMemo {
    by_size: HashMap<usize, usize>,
    used: Vec<usize>,
}

/// A computed statistic of one variable.
#[derive(Debug, Clone)]
pub struct VarStat {
    spec: StatSpec,
    var_name: String,
    name: String,
    reducer: Reducer,
    p: Option<f64>,
    sig: Option<f64>,
    c: Option<f64>,
    bound: Option<StatBound>,
    side: Option<TiSide>,
    k: Option<usize>,
    ranks: Vec<usize>,
    nums: Option<Payload<f64>>,
    vals: Option<Payload<Datum>>,
}

impl VarStat {
    /// Resolves `spec` against `var` and computes the result.
    ///
    /// # Errors
    /// Missing or invalid parameters, insufficient sample size for order
    /// statistics, undefined statistic values, and codes that do not decode
    /// through the variable's category map.
    pub(crate) fn new(var: &VarCore, spec: StatSpec) -> Result<Self> {
        let mut stat = Self::resolve(var, spec)?;
        stat.compute(var)?;
        tracing::debug!(
            "variable '{}' stat '{}': p={:?} sig={:?} c={:?} k={:?}",
            stat.var_name,
            stat.name,
            stat.p,
            stat.sig,
            stat.c,
            stat.k
        );
        Ok(stat)
    }

    fn resolve(var: &VarCore, spec: StatSpec) -> Result<Self> {
        let params = spec.params;
        let bound = params.bound.unwrap_or_default();
        let mut p = None;
        let mut sig = None;
        let mut c = None;
        let mut side = None;
        let mut k = None;

        let (reducer, default_name) = match spec.kind {
            StatKind::Max => (Reducer::Point(stats::max), "Max".to_string()),
            StatKind::Min => (Reducer::Point(stats::min), "Min".to_string()),
            StatKind::Median => (Reducer::Point(stats::median), "Median".to_string()),
            StatKind::Mean => (Reducer::Point(stats::mean), "Mean".to_string()),
            StatKind::GeoMean => (Reducer::Point(stats::geometric_mean), "Geometric Mean".to_string()),
            StatKind::Mode => (Reducer::Point(stats::mode), "Mode".to_string()),
            StatKind::SigmaP => {
                let s = params.sig.ok_or_else(|| McError::MissingParameter {
                    stat: spec.kind.to_string(),
                    param: "sig".into(),
                })?;
                if !s.is_finite() {
                    return Err(McError::InvalidParameter(format!("sig must be finite, got {s}")));
                }
                p = Some(sig_to_pct(s, bound.sidedness()?));
                sig = Some(s);
                (Reducer::Sigma(s), format!("{s} Sigma"))
            }
            StatKind::GaussianP => {
                let pv = spec.require_p()?;
                let s = pct_to_sig(pv, bound.sidedness()?);
                if !s.is_finite() {
                    return Err(McError::InvalidParameter(format!(
                        "p={pv} has no finite '{bound}' sigma level"
                    )));
                }
                p = Some(pv);
                sig = Some(s);
                (Reducer::Sigma(s), format!("Gaussian {}%", percent(pv)))
            }
            StatKind::OrderStatTI => {
                let pv = spec.require_p()?;
                let cv = params.c.unwrap_or(DEFAULT_CONFIDENCE);
                let ti_side = match bound {
                    StatBound::OneSided if pv >= 0.5 => TiSide::High,
                    StatBound::OneSided => TiSide::Low,
                    StatBound::TwoSided => TiSide::Both,
                    other => {
                        return Err(McError::InvalidParameter(format!(
                            "'{other}' is not a valid bound for {}",
                            spec.kind
                        )))
                    }
                };
                let reducer = Reducer::Tolerance { p: pv, c: cv, side: ti_side };
                k = Some(reducer.rank(var.ncases())?);
                p = Some(pv);
                c = Some(cv);
                side = Some(ti_side);
                (
                    reducer,
                    format!("{bound} P{}/{}% Confidence Interval", percent(pv), percent(cv)),
                )
            }
            StatKind::OrderStatP => {
                let pv = spec.require_p()?;
                let cv = params.c.unwrap_or(DEFAULT_CONFIDENCE);
                let reducer = Reducer::Percentile { p: pv, c: cv, bound };
                k = Some(reducer.rank(var.ncases())?);
                p = Some(pv);
                c = Some(cv);
                (
                    reducer,
                    format!(
                        "{bound} {}% Confidence Bound around {}th Percentile",
                        percent(cv),
                        percent(pv)
                    ),
                )
            }
        };

        let uses_bound = matches!(
            spec.kind,
            StatKind::SigmaP | StatKind::GaussianP | StatKind::OrderStatTI | StatKind::OrderStatP
        );
        Ok(Self {
            var_name: var.name().to_string(),
            name: spec.name.clone().unwrap_or(default_name),
            spec,
            reducer,
            p,
            sig,
            c,
            bound: uses_bound.then_some(bound),
            side,
            k,
            ranks: Vec::new(),
            nums: None,
            vals: None,
        })
    }

    fn compute(&mut self, var: &VarCore) -> Result<()> {
        let mut ranks = RankMemo::default();
        let nums = match var.shape() {
            Shape::Scalar => {
                let data: Vec<f64> = var
                    .nums()
                    .iter()
                    .filter_map(|x| x.as_scalar().copied())
                    .collect();
                let out = self.reduce(&data, &mut ranks)?;
                if out.len() == 1 {
                    Payload::Scalar(out[0])
                } else {
                    Payload::Vector(out)
                }
            }
            Shape::Vector(_) => {
                let npoints = var
                    .nums()
                    .iter()
                    .filter_map(|x| x.as_vector().map(<[f64]>::len))
                    .max()
                    .unwrap_or(0);
                let rows = (0..npoints)
                    .map(|i| {
                        let data: Vec<f64> = var
                            .nums()
                            .iter()
                            .filter_map(|x| x.as_vector().and_then(|v| v.get(i)).copied())
                            .collect();
                        self.reduce(&data, &mut ranks)
                    })
                    .collect::<Result<Vec<_>>>()?;
                if self.reducer.width() == 1 {
                    Payload::Vector(rows.into_iter().flatten().collect())
                } else {
                    Payload::Matrix(rows)
                }
            }
            Shape::Matrix(..) => {
                tracing::warn!(
                    "stat '{}' on matrix variable '{}' has no result until the variable is split",
                    self.name,
                    self.var_name
                );
                return Ok(());
            }
        };
        self.vals = Some(var.decode(&nums)?);
        self.nums = Some(nums);
        self.ranks = ranks.used;
        Ok(())
    }

    fn undefined(&self, n: usize) -> McError {
        McError::UndefinedStatistic {
            stat: self.name.clone(),
            reason: format!("no value for {n} numeric cases"),
        }
    }

    fn reduce(&self, data: &[f64], ranks: &mut RankMemo) -> Result<Vec<f64>> {
        let point = |v: Option<f64>| v.map(|x| vec![x]).ok_or_else(|| self.undefined(data.len()));
        match self.reducer {
            Reducer::Point(f) => point(f(data)),
            Reducer::Sigma(sig) => point(sigma_p(data, sig)),
            Reducer::Tolerance { side, .. } => {
                let sorted = stats::sorted_copy(data).ok_or_else(|| self.undefined(data.len()))?;
                let n = sorted.len();
                let k = self.cached_rank(n, ranks)?;
                Ok(match side {
                    TiSide::Low => vec![sorted[k - 1]],
                    TiSide::High => vec![sorted[n - k]],
                    TiSide::Both => vec![sorted[k - 1], sorted[n - k]],
                })
            }
            Reducer::Percentile { p, bound, .. } => {
                let sorted = stats::sorted_copy(data).ok_or_else(|| self.undefined(data.len()))?;
                let n = sorted.len();
                let k = self.cached_rank(n, ranks)?;
                let a = anchor_indices(n, p)?;
                Ok(match bound {
                    StatBound::OneSidedLow => vec![sorted[a.low - k]],
                    StatBound::OneSidedHigh => vec![sorted[a.high + k]],
                    StatBound::Nearest => vec![sorted[a.nearest]],
                    StatBound::TwoSided => vec![sorted[a.low - k], sorted[a.high + k]],
                    StatBound::All => vec![sorted[a.low - k], sorted[a.nearest], sorted[a.high + k]],
                    StatBound::OneSided => {
                        return Err(McError::InvalidParameter(format!(
                            "'{bound}' is not a valid bound for {}",
                            StatKind::OrderStatP
                        )))
                    }
                })
            }
        }
    }

    fn cached_rank(&self, n: usize, ranks: &mut RankMemo) -> Result<usize> {
        let k = match ranks.by_size.get(&n) {
            Some(&k) => k,
            None => {
                let k = self.reducer.rank(n)?;
                ranks.by_size.insert(n, k);
                k
            }
        };
        ranks.used.push(k);
        Ok(k)
    }

    /// The definition this statistic was computed from.
    pub fn spec(&self) -> &StatSpec {
        &self.spec
    }

    pub fn kind(&self) -> StatKind {
        self.spec.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    /// Percentile, given or derived from `sig`.
    pub fn p(&self) -> Option<f64> {
        self.p
    }

    /// Sigma level, given or derived from `p`.
    pub fn sig(&self) -> Option<f64> {
        self.sig
    }

    pub fn c(&self) -> Option<f64> {
        self.c
    }

    pub fn bound(&self) -> Option<StatBound> {
        self.bound
    }

    pub fn side(&self) -> Option<TiSide> {
        self.side
    }

    /// Order-statistic rank (tolerance) or offset (percentile) for the full
    /// case count.
    pub fn k(&self) -> Option<usize> {
        self.k
    }

    /// Rank or offset actually used for each result position, resolved for
    /// the number of cases covering it. One entry for a scalar variable, one
    /// per index for a vector variable; empty for point and sigma statistics
    /// and for matrix variables.
    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    /// Numeric result, `None` for matrix variables.
    pub fn nums(&self) -> Option<&Payload<f64>> {
        self.nums.as_ref()
    }

    /// Semantic result decoded through the variable's mapping.
    pub fn vals(&self) -> Option<&Payload<Datum>> {
        self.vals.as_ref()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::{OutputOptions, OutputVariable, Variable};
    use tracing_test::traced_test;

    fn scalar_var(xs: &[f64]) -> OutputVariable {
        let vals = xs.iter().map(|&x| Payload::Scalar(Datum::Num(x))).collect();
        let opts = OutputOptions {
            first_case_is_nominal: false,
            ..OutputOptions::default()
        };
        OutputVariable::new("x", vals, opts).unwrap()
    }

    fn one_to_hundred() -> OutputVariable {
        let xs: Vec<f64> = (1..=100).map(f64::from).collect();
        scalar_var(&xs)
    }

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in [
            StatKind::Max,
            StatKind::Min,
            StatKind::Median,
            StatKind::Mean,
            StatKind::GeoMean,
            StatKind::Mode,
            StatKind::SigmaP,
            StatKind::GaussianP,
            StatKind::OrderStatTI,
            StatKind::OrderStatP,
        ] {
            assert_eq!(kind.as_str().parse::<StatKind>().unwrap(), kind);
        }
        assert!(matches!(
            "variance".parse::<StatKind>(),
            Err(McError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_point_stats_scalar() {
        let mut v = scalar_var(&[1.0, 0.0, 2.0, 2.0]);
        let cases = [
            (StatKind::Max, 2.0, "Max"),
            (StatKind::Min, 0.0, "Min"),
            (StatKind::Median, 1.5, "Median"),
            (StatKind::Mean, 1.25, "Mean"),
            (StatKind::Mode, 2.0, "Mode"),
        ];
        for (kind, expected, name) in cases {
            let s = v.add_var_stat(StatSpec::new(kind)).unwrap();
            assert_eq!(s.nums(), Some(&Payload::Scalar(expected)));
            assert_eq!(s.vals(), Some(&Payload::Scalar(Datum::Num(expected))));
            assert_eq!(s.name(), name);
            assert_eq!(s.var_name(), "x");
        }
        assert_eq!(v.var_stats().len(), 5);
    }

    #[test]
    fn test_geomean_undefined_for_zero() {
        let mut v = scalar_var(&[1.0, 0.0, 2.0]);
        let err = v.add_var_stat(StatSpec::new(StatKind::GeoMean)).unwrap_err();
        assert!(matches!(err, McError::UndefinedStatistic { .. }));
        assert!(v.var_stats().is_empty());
    }

    #[test]
    fn test_sigma_p() {
        let mut v = scalar_var(&[1.0, 0.0, 2.0, 2.0]);
        let s = v.add_var_stat(StatSpec::new(StatKind::SigmaP).sig(1.0)).unwrap();
        let expected = 1.25 + 0.6875_f64.sqrt();
        let got = *s.nums().unwrap().as_scalar().unwrap();
        assert!((got - expected).abs() < 1e-12);
        assert!((s.p().unwrap() - 0.682_689_492_137_085_9).abs() < 1e-12);
        assert_eq!(s.bound(), Some(StatBound::TwoSided));
        assert_eq!(s.name(), "1 Sigma");
    }

    #[test]
    fn test_gaussian_p_matches_sigma_p() {
        let mut v = one_to_hundred();
        let g = v
            .add_var_stat(StatSpec::new(StatKind::GaussianP).p(0.975).bound(StatBound::OneSided))
            .unwrap()
            .clone();
        let sig = g.sig().unwrap();
        assert!((sig - 1.959963984540054).abs() < 1e-9);
        let s = v
            .add_var_stat(StatSpec::new(StatKind::SigmaP).sig(sig).bound(StatBound::OneSided))
            .unwrap();
        assert_eq!(g.nums(), s.nums());
        assert_eq!(g.name(), "Gaussian 97.5%");
    }

    #[test]
    fn test_missing_parameters() {
        let mut v = one_to_hundred();
        for kind in [StatKind::GaussianP, StatKind::OrderStatTI, StatKind::OrderStatP] {
            let err = v.add_var_stat(StatSpec::new(kind)).unwrap_err();
            assert_eq!(
                err,
                McError::MissingParameter {
                    stat: kind.to_string(),
                    param: "p".into()
                }
            );
        }
        let err = v.add_var_stat(StatSpec::new(StatKind::SigmaP)).unwrap_err();
        assert!(matches!(err, McError::MissingParameter { ref param, .. } if param == "sig"));
    }

    #[test]
    fn test_order_stat_ti_two_sided() {
        let mut v = one_to_hundred();
        let s = v
            .add_var_stat(StatSpec::new(StatKind::OrderStatTI).p(0.9))
            .unwrap();
        assert_eq!(s.k(), Some(2));
        assert_eq!(s.c(), Some(0.95));
        assert_eq!(s.side(), Some(TiSide::Both));
        assert_eq!(s.nums(), Some(&Payload::Vector(vec![2.0, 99.0])));
        assert_eq!(s.name(), "2-sided P90/95% Confidence Interval");
    }

    #[test]
    fn test_order_stat_ti_one_sided_sides() {
        let mut v = one_to_hundred();
        let high = v
            .add_var_stat(StatSpec::new(StatKind::OrderStatTI).p(0.95).bound(StatBound::OneSided))
            .unwrap();
        assert_eq!(high.side(), Some(TiSide::High));
        assert_eq!(high.nums(), Some(&Payload::Scalar(99.0)));
        let low = v
            .add_var_stat(StatSpec::new(StatKind::OrderStatTI).p(0.05).bound(StatBound::OneSided))
            .unwrap();
        assert_eq!(low.side(), Some(TiSide::Low));
        assert_eq!(low.nums(), Some(&Payload::Scalar(2.0)));
    }

    #[test]
    fn test_order_stat_ti_rejects_percentile_bounds() {
        let mut v = one_to_hundred();
        let err = v
            .add_var_stat(StatSpec::new(StatKind::OrderStatTI).p(0.9).bound(StatBound::All))
            .unwrap_err();
        assert!(matches!(err, McError::InvalidParameter(_)));
    }

    #[test]
    fn test_order_stat_ti_insufficient() {
        let mut v = scalar_var(&[1.0, 2.0, 3.0]);
        let err = v
            .add_var_stat(StatSpec::new(StatKind::OrderStatTI).p(0.99).c(0.99))
            .unwrap_err();
        assert_eq!(
            err,
            McError::InsufficientSampleSize {
                n: 3,
                p: 0.99,
                c: 0.99
            }
        );
    }

    #[test]
    fn test_order_stat_p_all() {
        let mut v = one_to_hundred();
        let s = v
            .add_var_stat(StatSpec::new(StatKind::OrderStatP).p(0.5).bound(StatBound::All))
            .unwrap();
        assert_eq!(s.k(), Some(10));
        assert_eq!(s.nums(), Some(&Payload::Vector(vec![40.0, 51.0, 61.0])));
        assert_eq!(s.name(), "all 95% Confidence Bound around 50th Percentile");
    }

    #[test]
    fn test_order_stat_p_single_sides() {
        let mut v = one_to_hundred();
        let nearest = v
            .add_var_stat(StatSpec::new(StatKind::OrderStatP).p(0.5).bound(StatBound::Nearest))
            .unwrap();
        assert_eq!(nearest.nums(), Some(&Payload::Scalar(51.0)));
        let low = v
            .add_var_stat(StatSpec::new(StatKind::OrderStatP).p(0.5).bound(StatBound::OneSidedLow))
            .unwrap();
        let lo = *low.nums().unwrap().as_scalar().unwrap();
        assert!(lo < 50.0);
        let err = v
            .add_var_stat(StatSpec::new(StatKind::OrderStatP).p(0.5).bound(StatBound::OneSided))
            .unwrap_err();
        assert!(matches!(err, McError::InvalidParameter(_)));
    }

    #[test]
    fn test_custom_name_overrides() {
        let mut v = one_to_hundred();
        let s = v
            .add_var_stat(StatSpec::new(StatKind::Mean).name("Average"))
            .unwrap();
        assert_eq!(s.name(), "Average");
    }

    #[test]
    fn test_ragged_vector_uses_covering_cases() {
        let vals = vec![
            Payload::Vector(vec![Datum::Num(1.0), Datum::Num(2.0), Datum::Num(3.0)]),
            Payload::Vector(vec![Datum::Num(4.0), Datum::Num(5.0)]),
            Payload::Vector(vec![Datum::Num(6.0)]),
        ];
        let opts = OutputOptions {
            first_case_is_nominal: false,
            ..OutputOptions::default()
        };
        let mut v = OutputVariable::new("r", vals, opts).unwrap();
        let s = v.add_var_stat(StatSpec::new(StatKind::Max)).unwrap();
        assert_eq!(s.nums(), Some(&Payload::Vector(vec![6.0, 5.0, 3.0])));
        let s = v.add_var_stat(StatSpec::new(StatKind::Mean)).unwrap();
        assert_eq!(s.nums(), Some(&Payload::Vector(vec![11.0 / 3.0, 3.5, 3.0])));
    }

    #[test]
    fn test_ragged_vector_ranks_per_position() {
        // Position 0 is covered by 40 cases, position 1 by 20.
        let vals: Vec<Payload<Datum>> = (0..40)
            .map(|i| {
                let x = f64::from(i);
                if i < 20 {
                    Payload::Vector(vec![Datum::Num(x), Datum::Num(-x)])
                } else {
                    Payload::Vector(vec![Datum::Num(x)])
                }
            })
            .collect();
        let opts = OutputOptions {
            first_case_is_nominal: false,
            ..OutputOptions::default()
        };
        let mut v = OutputVariable::new("r", vals, opts).unwrap();
        let s = v
            .add_var_stat(StatSpec::new(StatKind::OrderStatTI).p(0.5).c(0.5))
            .unwrap();
        let k40 = order_stat_ti_rank(40, 0.5, 0.5, Sidedness::TwoSided).unwrap();
        let k20 = order_stat_ti_rank(20, 0.5, 0.5, Sidedness::TwoSided).unwrap();
        assert_ne!(k40, k20);
        assert_eq!(s.k(), Some(k40));
        assert_eq!(s.ranks(), &[k40, k20]);

        let s = v.add_var_stat(StatSpec::new(StatKind::Max)).unwrap();
        assert!(s.ranks().is_empty());
    }

    #[test]
    fn test_bool_variable_decodes_codes_to_bools() {
        let vals = [true, false, true, true]
            .iter()
            .map(|&b| Payload::Scalar(Datum::Bool(b)))
            .collect();
        let opts = OutputOptions {
            first_case_is_nominal: false,
            ..OutputOptions::default()
        };
        let mut v = OutputVariable::new("flag", vals, opts).unwrap();
        let s = v.add_var_stat(StatSpec::new(StatKind::Mode)).unwrap();
        assert_eq!(s.nums(), Some(&Payload::Scalar(1.0)));
        assert_eq!(s.vals(), Some(&Payload::Scalar(Datum::Bool(true))));
        let s = v.add_var_stat(StatSpec::new(StatKind::Mean)).unwrap();
        assert_eq!(s.vals(), Some(&Payload::Scalar(Datum::Num(0.75))));
        let s = v.add_var_stat(StatSpec::new(StatKind::Min)).unwrap();
        assert_eq!(s.vals(), Some(&Payload::Scalar(Datum::Bool(false))));
    }

    #[test]
    fn test_vector_bounds_give_rows() {
        let vals: Vec<Payload<Datum>> = (1..=100)
            .map(|i| Payload::Vector(vec![Datum::Num(f64::from(i)), Datum::Num(f64::from(-i))]))
            .collect();
        let opts = OutputOptions {
            first_case_is_nominal: false,
            ..OutputOptions::default()
        };
        let mut v = OutputVariable::new("pair", vals, opts).unwrap();
        let s = v
            .add_var_stat(StatSpec::new(StatKind::OrderStatTI).p(0.9))
            .unwrap();
        assert_eq!(
            s.nums(),
            Some(&Payload::Matrix(vec![vec![2.0, 99.0], vec![-99.0, -2.0]]))
        );
    }

    #[test]
    #[traced_test]
    fn test_matrix_variable_has_no_result() {
        let m = Payload::Matrix(vec![vec![Datum::Num(1.0)], vec![Datum::Num(2.0)]]);
        let mut v = OutputVariable::new("m", vec![m.clone(), m], OutputOptions::default()).unwrap();
        let s = v.add_var_stat(StatSpec::new(StatKind::Mean)).unwrap();
        assert!(s.nums().is_none());
        assert!(s.vals().is_none());
        assert!(logs_contain("has no result until the variable is split"));
    }

    #[test]
    fn test_categorical_mode_decodes() {
        let vals = ["a", "b", "b", "c"]
            .iter()
            .map(|&s| Payload::Scalar(Datum::from(s)))
            .collect();
        let opts = OutputOptions {
            first_case_is_nominal: false,
            ..OutputOptions::default()
        };
        let mut v = OutputVariable::new("cat", vals, opts).unwrap();
        let s = v.add_var_stat(StatSpec::new(StatKind::Mode)).unwrap();
        assert_eq!(s.nums(), Some(&Payload::Scalar(1.0)));
        assert_eq!(s.vals(), Some(&Payload::Scalar(Datum::from("b"))));
    }

    #[test]
    fn test_categorical_mean_is_lookup_failure() {
        let vals = ["a", "b", "b", "b"]
            .iter()
            .map(|&s| Payload::Scalar(Datum::from(s)))
            .collect();
        let mut v = OutputVariable::new("cat", vals, OutputOptions::default()).unwrap();
        let err = v.add_var_stat(StatSpec::new(StatKind::Mean)).unwrap_err();
        assert!(matches!(err, McError::CategoryLookup(_)));
    }
}
