//! Distribution descriptors consumed by input variables.
//!
//! An [`InputVariable`](crate::variable::InputVariable) only needs four things
//! from a distribution: its expectation (for the nominal case), its CDF and
//! quantile (for snapping the nominal case onto a discrete support), and a way
//! to draw from an explicitly passed RNG. The [`Distribution`] trait captures
//! exactly that so it can be held as `Arc<dyn Distribution>`.
//!
//! # Supported Distributions
//!
//! | Distribution | Parameters | Mean | Discrete |
//! |---|---|---|---|
//! | [`Uniform`] | min, max | (a+b)/2 | no |
//! | [`Triangular`] | min, mode, max | (a+b+c)/3 | no |
//! | [`Normal`] | μ, σ | μ | no |
//! | [`LogNormal`] | μ, σ | exp(μ+σ²/2) | no |
//! | [`UniformInt`] | low, high (exclusive) | (low+high−1)/2 | yes |
//! | [`Discrete`] | values, weights | Σ pᵢxᵢ | yes |
//!
//! Continuous draws use inverse-transform sampling on an open-interval
//! uniform, so `quantile` is never asked for `p = 0` or `p = 1`.

use std::fmt;

use rand::distr::{Distribution as _, Open01};
use rand::RngCore;
use thiserror::Error;

use crate::random::WeightedSampler;
use crate::special;

/// Error type for invalid distribution parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    /// Parameters violate distribution constraints.
    #[error("invalid distribution parameters: {0}")]
    InvalidParameters(String),
}

/// A univariate probability distribution that input variables can draw from.
pub trait Distribution: fmt::Debug + Send + Sync {
    /// Expectation E[X].
    fn mean(&self) -> f64;

    /// Variance Var[X].
    fn variance(&self) -> f64;

    /// Cumulative distribution function P[X ≤ x].
    fn cdf(&self, x: f64) -> f64;

    /// Inverse CDF. Returns `None` if `p` is outside the supported range.
    ///
    /// Discrete distributions return the smallest support point `x` with
    /// `cdf(x) ≥ p`.
    fn quantile(&self, p: f64) -> Option<f64>;

    /// Whether the support is a discrete set of points.
    fn is_discrete(&self) -> bool {
        false
    }

    /// Draws one value by inverse-transform sampling.
    ///
    /// Returns NaN if the quantile is undefined for the drawn probability.
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        let u: f64 = Open01.sample(rng);
        self.quantile(u).unwrap_or(f64::NAN)
    }
}

fn check_probability(p: f64) -> Option<f64> {
    (0.0..=1.0).contains(&p).then_some(p)
}

// ============================================================================
// Uniform Distribution
// ============================================================================

/// Continuous uniform distribution on `[min, max]`.
///
/// - CDF: F(x) = (x−min)/(max−min)
/// - Variance: (max−min)²/12
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    min: f64,
    max: f64,
}

impl Uniform {
    /// Creates a new uniform distribution on `[min, max]`.
    ///
    /// # Errors
    /// Returns `Err` if `min >= max` or either parameter is not finite.
    pub fn new(min: f64, max: f64) -> Result<Self, DistributionError> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(DistributionError::InvalidParameters(format!(
                "Uniform requires min < max, got min={min}, max={max}"
            )));
        }
        Ok(Self { min, max })
    }
}

impl Distribution for Uniform {
    fn mean(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    fn variance(&self) -> f64 {
        let range = self.max - self.min;
        range * range / 12.0
    }

    fn cdf(&self, x: f64) -> f64 {
        if x <= self.min {
            0.0
        } else if x >= self.max {
            1.0
        } else {
            (x - self.min) / (self.max - self.min)
        }
    }

    fn quantile(&self, p: f64) -> Option<f64> {
        let p = check_probability(p)?;
        Some(self.min + p * (self.max - self.min))
    }
}

// ============================================================================
// Triangular Distribution
// ============================================================================

/// Triangular distribution with parameters `[min, mode, max]`.
///
/// Reference: Johnson, Kotz & Balakrishnan (1995), *Continuous Univariate
/// Distributions*, Vol. 2, Chapter 26.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangular {
    min: f64,
    mode: f64,
    max: f64,
}

impl Triangular {
    /// Creates a new triangular distribution.
    ///
    /// # Errors
    /// Returns `Err` if `min >= max` or `mode` is outside `[min, max]`.
    pub fn new(min: f64, mode: f64, max: f64) -> Result<Self, DistributionError> {
        if !min.is_finite() || !mode.is_finite() || !max.is_finite() {
            return Err(DistributionError::InvalidParameters(
                "Triangular parameters must be finite".into(),
            ));
        }
        if min > mode || mode > max || min >= max {
            return Err(DistributionError::InvalidParameters(format!(
                "Triangular requires min ≤ mode ≤ max and min < max, got {min}, {mode}, {max}"
            )));
        }
        Ok(Self { min, mode, max })
    }
}

impl Distribution for Triangular {
    fn mean(&self) -> f64 {
        (self.min + self.mode + self.max) / 3.0
    }

    /// Variance = (a² + b² + c² − ab − ac − bc) / 18.
    fn variance(&self) -> f64 {
        let (a, b, c) = (self.min, self.mode, self.max);
        (a * a + b * b + c * c - a * b - a * c - b * c) / 18.0
    }

    /// ```text
    /// F(x) = (x−a)² / ((c−a)(b−a))       for a ≤ x ≤ b
    ///      = 1 − (c−x)² / ((c−a)(c−b))   for b < x ≤ c
    /// ```
    fn cdf(&self, x: f64) -> f64 {
        let (a, b, c) = (self.min, self.mode, self.max);
        if x <= a {
            0.0
        } else if x <= b {
            (x - a) * (x - a) / ((c - a) * (b - a).max(f64::MIN_POSITIVE))
        } else if x < c {
            1.0 - (c - x) * (c - x) / ((c - a) * (c - b).max(f64::MIN_POSITIVE))
        } else {
            1.0
        }
    }

    /// ```text
    /// F⁻¹(p) = a + √(p·(c−a)·(b−a))       if p < F(b)
    ///        = c − √((1−p)·(c−a)·(c−b))   if p ≥ F(b)
    /// ```
    fn quantile(&self, p: f64) -> Option<f64> {
        let p = check_probability(p)?;
        let (a, b, c) = (self.min, self.mode, self.max);
        let fc = (b - a) / (c - a); // CDF at the mode
        if p < fc {
            Some(a + ((c - a) * (b - a) * p).sqrt())
        } else {
            Some(c - ((c - a) * (c - b) * (1.0 - p)).sqrt())
        }
    }
}

// ============================================================================
// Normal Distribution
// ============================================================================

/// Normal (Gaussian) distribution N(μ, σ²).
#[derive(Debug, Clone, PartialEq)]
pub struct Normal {
    mu: f64,
    sigma: f64,
}

impl Normal {
    /// Creates a new normal distribution N(μ, σ).
    ///
    /// # Errors
    /// Returns `Err` if `sigma ≤ 0` or parameters are not finite.
    pub fn new(mu: f64, sigma: f64) -> Result<Self, DistributionError> {
        if !mu.is_finite() || !sigma.is_finite() || sigma <= 0.0 {
            return Err(DistributionError::InvalidParameters(format!(
                "Normal requires finite μ and σ > 0, got μ={mu}, σ={sigma}"
            )));
        }
        Ok(Self { mu, sigma })
    }
}

impl Distribution for Normal {
    fn mean(&self) -> f64 {
        self.mu
    }

    fn variance(&self) -> f64 {
        self.sigma * self.sigma
    }

    fn cdf(&self, x: f64) -> f64 {
        special::standard_normal_cdf((x - self.mu) / self.sigma)
    }

    /// μ + σ·Φ⁻¹(p), `None` outside `(0, 1)`.
    fn quantile(&self, p: f64) -> Option<f64> {
        if p <= 0.0 || p >= 1.0 {
            return None;
        }
        Some(self.mu + self.sigma * special::inverse_normal_cdf(p))
    }
}

// ============================================================================
// LogNormal Distribution
// ============================================================================

/// Log-normal distribution: if X ~ LogNormal(μ, σ), then ln(X) ~ N(μ, σ²).
///
/// Reference: Johnson, Kotz & Balakrishnan (1994), *Continuous Univariate
/// Distributions*, Vol. 1, Chapter 14.
#[derive(Debug, Clone, PartialEq)]
pub struct LogNormal {
    mu: f64,
    sigma: f64,
}

impl LogNormal {
    /// Creates a new log-normal distribution.
    ///
    /// Parameters `mu` and `sigma` are the mean and std dev of ln(X).
    ///
    /// # Errors
    /// Returns `Err` if `sigma ≤ 0` or parameters are not finite.
    pub fn new(mu: f64, sigma: f64) -> Result<Self, DistributionError> {
        if !mu.is_finite() || !sigma.is_finite() || sigma <= 0.0 {
            return Err(DistributionError::InvalidParameters(format!(
                "LogNormal requires finite μ and σ > 0, got μ={mu}, σ={sigma}"
            )));
        }
        Ok(Self { mu, sigma })
    }
}

impl Distribution for LogNormal {
    /// exp(μ + σ²/2).
    fn mean(&self) -> f64 {
        (self.mu + self.sigma * self.sigma / 2.0).exp()
    }

    /// (exp(σ²) − 1) · exp(2μ + σ²).
    fn variance(&self) -> f64 {
        let s2 = self.sigma * self.sigma;
        (s2.exp() - 1.0) * (2.0 * self.mu + s2).exp()
    }

    fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        special::standard_normal_cdf((x.ln() - self.mu) / self.sigma)
    }

    fn quantile(&self, p: f64) -> Option<f64> {
        if p <= 0.0 || p >= 1.0 {
            return None;
        }
        Some((self.mu + self.sigma * special::inverse_normal_cdf(p)).exp())
    }
}

// ============================================================================
// Discrete uniform on integers
// ============================================================================

/// Discrete uniform distribution on the integers `low, low+1, …, high−1`.
///
/// # Examples
/// ```
/// use u_montecarlo::distributions::{Distribution, UniformInt};
/// let d = UniformInt::new(1, 5).unwrap();
/// assert_eq!(d.mean(), 2.5);
/// assert_eq!(d.quantile(0.5), Some(2.0));
/// assert!(d.is_discrete());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UniformInt {
    low: i64,
    high: i64,
}

impl UniformInt {
    /// Creates a discrete uniform on `[low, high)`.
    ///
    /// # Errors
    /// Returns `Err` if `low >= high`.
    pub fn new(low: i64, high: i64) -> Result<Self, DistributionError> {
        if low >= high {
            return Err(DistributionError::InvalidParameters(format!(
                "UniformInt requires low < high, got low={low}, high={high}"
            )));
        }
        Ok(Self { low, high })
    }

    fn count(&self) -> f64 {
        (self.high - self.low) as f64
    }
}

impl Distribution for UniformInt {
    fn mean(&self) -> f64 {
        (self.low + self.high - 1) as f64 / 2.0
    }

    /// (N² − 1)/12 with N the number of support points.
    fn variance(&self) -> f64 {
        let n = self.count();
        (n * n - 1.0) / 12.0
    }

    fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let k = x.floor();
        if k < self.low as f64 {
            0.0
        } else if k >= (self.high - 1) as f64 {
            1.0
        } else {
            (k - self.low as f64 + 1.0) / self.count()
        }
    }

    fn quantile(&self, p: f64) -> Option<f64> {
        let p = check_probability(p)?;
        let last = (self.high - 1) as f64;
        let mut k = (self.low as f64 + (p * self.count()).ceil() - 1.0).clamp(self.low as f64, last);
        // correct for rounding in p·N so that k is the smallest point with F(k) ≥ p
        while k < last && self.cdf(k) < p {
            k += 1.0;
        }
        while k > self.low as f64 && self.cdf(k - 1.0) >= p {
            k -= 1.0;
        }
        Some(k)
    }

    fn is_discrete(&self) -> bool {
        true
    }
}

// ============================================================================
// Discrete distribution over custom support points
// ============================================================================

/// Discrete distribution over a finite set of weighted support points.
///
/// Support points are sorted on construction; duplicate points keep separate
/// weights. Sampling uses a [`WeightedSampler`].
///
/// # Examples
/// ```
/// use u_montecarlo::distributions::{Discrete, Distribution};
/// let d = Discrete::new(&[1.0, 5.0, 6.0], &[1.0, 1.0, 1.0]).unwrap();
/// assert_eq!(d.mean(), 4.0);
/// assert_eq!(d.quantile(0.5), Some(5.0));
/// ```
#[derive(Debug, Clone)]
pub struct Discrete {
    values: Vec<f64>,
    probs: Vec<f64>,
    cumulative: Vec<f64>,
    sampler: WeightedSampler,
}

impl Discrete {
    /// Creates a discrete distribution from support points and weights.
    ///
    /// Weights are normalized to sum to one.
    ///
    /// # Errors
    /// Returns `Err` if lengths differ, the support is empty, any value is not
    /// finite, or any weight is negative / not finite / all zero.
    pub fn new(values: &[f64], weights: &[f64]) -> Result<Self, DistributionError> {
        if values.is_empty() || values.len() != weights.len() {
            return Err(DistributionError::InvalidParameters(format!(
                "Discrete requires equal, non-zero numbers of values and weights, got {} and {}",
                values.len(),
                weights.len()
            )));
        }
        if !values.iter().all(|v| v.is_finite()) {
            return Err(DistributionError::InvalidParameters(
                "Discrete support points must be finite".into(),
            ));
        }
        if !weights.iter().all(|w| w.is_finite() && *w >= 0.0) {
            return Err(DistributionError::InvalidParameters(
                "Discrete weights must be finite and non-negative".into(),
            ));
        }

        let mut pairs: Vec<(f64, f64)> = values.iter().copied().zip(weights.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (values, weights): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();

        let sampler = WeightedSampler::new(&weights).ok_or_else(|| {
            DistributionError::InvalidParameters("Discrete weights must not all be zero".into())
        })?;
        let total = sampler.total_weight();
        let probs: Vec<f64> = weights.iter().map(|w| w / total).collect();
        let cumulative = sampler.cumulative_probabilities();

        Ok(Self {
            values,
            probs,
            cumulative,
            sampler,
        })
    }

    /// Sorted support points.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Normalized probabilities, aligned with [`values`](Self::values).
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }
}

impl Distribution for Discrete {
    fn mean(&self) -> f64 {
        self.values.iter().zip(&self.probs).map(|(v, p)| v * p).sum()
    }

    fn variance(&self) -> f64 {
        let m = self.mean();
        self.values
            .iter()
            .zip(&self.probs)
            .map(|(v, p)| p * (v - m) * (v - m))
            .sum()
    }

    fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        // number of support points ≤ x
        let idx = self.values.partition_point(|&v| v <= x);
        if idx == 0 {
            0.0
        } else {
            self.cumulative[idx - 1]
        }
    }

    fn quantile(&self, p: f64) -> Option<f64> {
        let p = check_probability(p)?;
        let idx = self
            .cumulative
            .partition_point(|&c| c < p)
            .min(self.values.len() - 1);
        Some(self.values[idx])
    }

    fn is_discrete(&self) -> bool {
        true
    }

    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        self.values[self.sampler.sample(rng)]
    }
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn uniform_quantile_roundtrip(
            min in -100.0_f64..0.0,
            max in 1.0_f64..100.0,
            p in 0.0_f64..=1.0,
        ) {
            let u = Uniform::new(min, max).unwrap();
            let x = u.quantile(p).unwrap();
            prop_assert!((u.cdf(x) - p).abs() < 1e-12);
        }

        #[test]
        fn triangular_quantile_roundtrip(
            min in -50.0_f64..0.0,
            mode_frac in 0.01_f64..0.99,
            range in 1.0_f64..50.0,
            p in 0.001_f64..0.999,
        ) {
            let max = min + range;
            let mode = min + mode_frac * range;
            let t = Triangular::new(min, mode, max).unwrap();
            let x = t.quantile(p).unwrap();
            prop_assert!((t.cdf(x) - p).abs() < 1e-8, "p={p} -> x={x}");
        }

        #[test]
        fn uniform_int_quantile_is_generalized_inverse(
            low in -20_i64..20,
            width in 1_i64..30,
            p in 0.0_f64..=1.0,
        ) {
            let d = UniformInt::new(low, low + width).unwrap();
            let k = d.quantile(p).unwrap();
            prop_assert!(d.cdf(k) >= p);
            if k > low as f64 {
                prop_assert!(d.cdf(k - 1.0) < p);
            }
        }

        #[test]
        fn discrete_cdf_monotonic(
            values in proptest::collection::vec(-100.0_f64..100.0, 1..10),
            x in -150.0_f64..150.0,
            dx in 0.0_f64..50.0,
        ) {
            let weights = vec![1.0; values.len()];
            let d = Discrete::new(&values, &weights).unwrap();
            prop_assert!(d.cdf(x) <= d.cdf(x + dx));
        }
    }
}
