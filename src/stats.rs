//! Descriptive statistics over one numeric stream.
//!
//! These are the point statistics a [`VarStat`](crate::var_stat::VarStat)
//! applies to a variable's numeric codes, plus the moment accumulator used
//! by [`Describe`](crate::variable::Describe).
//!
//! All functions return `None` instead of a meaningless number when the
//! input is empty or contains non-finite values.
//!
//! # Algorithms
//!
//! - **Mean**: Neumaier compensated summation for O(ε) error independent of n.
//! - **Variance/StdDev**: Welford's online algorithm.
//!   Reference: Welford (1962), "Note on a Method for Calculating
//!   Corrected Sums of Squares and Products", *Technometrics* 4(3).

use std::collections::HashMap;

/// Computes the arithmetic mean using compensated summation.
///
/// # Returns
/// - `None` if `data` is empty or contains any NaN/Inf.
///
/// # Examples
/// ```
/// use u_montecarlo::stats::mean;
/// assert_eq!(mean(&[1.0, 0.0, 2.0, 2.0]), Some(1.25));
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    if !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    Some(kahan_sum(data) / data.len() as f64)
}

/// Computes the sample variance (denominator `n − 1`) using Welford's
/// online algorithm.
///
/// # Returns
/// - `None` if `data.len() < 2` or contains NaN/Inf.
///
/// # Examples
/// ```
/// use u_montecarlo::stats::variance;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((variance(&v).unwrap() - 4.571428571428571).abs() < 1e-10);
/// ```
pub fn variance(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    accumulate(data)?.sample_variance()
}

/// Computes the population variance (denominator `n`).
///
/// # Returns
/// - `None` if `data` is empty or contains NaN/Inf.
pub fn population_variance(data: &[f64]) -> Option<f64> {
    accumulate(data)?.population_variance()
}

/// Computes the sample standard deviation, `sqrt(variance(data))`.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

/// Computes the population standard deviation, `sqrt(population_variance(data))`.
///
/// This is the spread used by the sigma-percentile statistics.
///
/// # Examples
/// ```
/// use u_montecarlo::stats::population_std_dev;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((population_std_dev(&v).unwrap() - 2.0).abs() < 1e-12);
/// ```
pub fn population_std_dev(data: &[f64]) -> Option<f64> {
    population_variance(data).map(f64::sqrt)
}

fn accumulate(data: &[f64]) -> Option<WelfordAccumulator> {
    if data.is_empty() || !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    let mut acc = WelfordAccumulator::new();
    for &x in data {
        acc.update(x);
    }
    Some(acc)
}

/// Returns the minimum value in the slice.
///
/// # Returns
/// - `None` if `data` is empty or contains NaN.
pub fn min(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    data.iter().copied().try_fold(f64::INFINITY, |acc, x| {
        if x.is_nan() {
            None
        } else {
            Some(acc.min(x))
        }
    })
}

/// Returns the maximum value in the slice.
///
/// # Returns
/// - `None` if `data` is empty or contains NaN.
pub fn max(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    data.iter().copied().try_fold(f64::NEG_INFINITY, |acc, x| {
        if x.is_nan() {
            None
        } else {
            Some(acc.max(x))
        }
    })
}

/// Computes the median of `data` without mutating the input.
///
/// Returns the middle element, or the average of the two middle elements
/// for even-length data.
///
/// # Examples
/// ```
/// use u_montecarlo::stats::median;
/// assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
/// ```
pub fn median(data: &[f64]) -> Option<f64> {
    let sorted = sorted_copy(data)?;
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Computes the geometric mean `exp(mean(ln x))`.
///
/// # Returns
/// - `None` if `data` is empty, contains NaN/Inf, or any value is ≤ 0.
///
/// # Examples
/// ```
/// use u_montecarlo::stats::geometric_mean;
/// assert!((geometric_mean(&[1.0, 4.0, 16.0]).unwrap() - 4.0).abs() < 1e-12);
/// assert_eq!(geometric_mean(&[1.0, 0.0]), None);
/// ```
pub fn geometric_mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    if !data.iter().all(|x| x.is_finite() && *x > 0.0) {
        return None;
    }
    let logs: Vec<f64> = data.iter().map(|x| x.ln()).collect();
    Some((kahan_sum(&logs) / data.len() as f64).exp())
}

/// Returns the most frequent value.
///
/// Ties resolve to the value that occurs first in `data`, so the result is
/// stable for a given case order. `0.0` and `-0.0` count as the same value.
///
/// # Returns
/// - `None` if `data` is empty or contains NaN.
///
/// # Examples
/// ```
/// use u_montecarlo::stats::mode;
/// assert_eq!(mode(&[1.0, 3.0, 3.0, 2.0]), Some(3.0));
/// assert_eq!(mode(&[5.0, 4.0, 4.0, 5.0]), Some(5.0));
/// ```
pub fn mode(data: &[f64]) -> Option<f64> {
    if data.is_empty() || data.iter().any(|x| x.is_nan()) {
        return None;
    }
    // bits -> (count, first index)
    let mut counts: HashMap<u64, (usize, usize)> = HashMap::new();
    for (i, &x) in data.iter().enumerate() {
        let key = if x == 0.0 { 0.0_f64.to_bits() } else { x.to_bits() };
        counts.entry(key).or_insert((0, i)).0 += 1;
    }
    counts
        .into_values()
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .map(|(_, first)| data[first])
}

/// Sorted copy of `data` in ascending order, `None` if empty or any NaN.
pub(crate) fn sorted_copy(data: &[f64]) -> Option<Vec<f64>> {
    if data.is_empty() || data.iter().any(|x| x.is_nan()) {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    Some(sorted)
}

// ---------------------------------------------------------------------------
// Kahan compensated summation
// ---------------------------------------------------------------------------

/// Neumaier compensated summation for O(ε) error independent of `n`.
///
/// Reference: Neumaier (1974), "Rundungsfehleranalyse einiger Verfahren
/// zur Summation endlicher Summen", *ZAMM* 54(1), pp. 39–51.
pub fn kahan_sum(data: &[f64]) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for &x in data {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

// ---------------------------------------------------------------------------
// Welford online accumulator
// ---------------------------------------------------------------------------

/// Streaming accumulator for mean, variance, skewness, and kurtosis.
///
/// Maintains central moment sums M₂, M₃, M₄ incrementally. The update
/// order (M₄ → M₃ → M₂) matters since each uses the *previous* values of
/// lower moments.
///
/// References:
/// - Welford (1962), *Technometrics* 4(3), pp. 419–420.
/// - Pébay (2008), Sandia Report SAND2008-6212.
///
/// # Examples
/// ```
/// use u_montecarlo::stats::WelfordAccumulator;
/// let mut acc = WelfordAccumulator::new();
/// for &x in &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
///     acc.update(x);
/// }
/// assert!((acc.mean().unwrap() - 5.0).abs() < 1e-15);
/// assert!((acc.sample_variance().unwrap() - 4.571428571428571).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct WelfordAccumulator {
    count: u64,
    mean_acc: f64,
    m2: f64,
    m3: f64,
    m4: f64,
}

impl WelfordAccumulator {
    /// Creates a new empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            mean_acc: 0.0,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
        }
    }

    /// Feeds a new sample into the accumulator.
    pub fn update(&mut self, value: f64) {
        let n1 = self.count;
        self.count += 1;

        if n1 == 0 {
            self.mean_acc = value;
            return;
        }

        let n = self.count as f64;
        let delta = value - self.mean_acc;
        let delta_n = delta / n;
        let delta_n2 = delta_n * delta_n;
        let term1 = delta * delta_n * n1 as f64;

        self.m4 += term1 * delta_n2 * (n * n - 3.0 * n + 3.0) + 6.0 * delta_n2 * self.m2
            - 4.0 * delta_n * self.m3;
        self.m3 += term1 * delta_n * (n - 2.0) - 3.0 * delta_n * self.m2;
        self.m2 += term1;
        self.mean_acc += delta_n;
    }

    /// Returns the number of samples seen so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the running mean, or `None` if no samples have been added.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.mean_acc)
        }
    }

    /// Sample variance (n − 1 denominator), `None` below 2 samples.
    pub fn sample_variance(&self) -> Option<f64> {
        if self.count < 2 {
            None
        } else {
            Some(self.m2 / (self.count - 1) as f64)
        }
    }

    /// Population variance (n denominator), `None` if empty.
    pub fn population_variance(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.m2 / self.count as f64)
        }
    }

    /// Fisher's adjusted sample skewness (G₁), or `None` if fewer than 3
    /// samples have been added or variance is zero.
    pub fn skewness(&self) -> Option<f64> {
        if self.count < 3 || self.m2 == 0.0 {
            return None;
        }
        let n = self.count as f64;
        let g1 = n.sqrt() * self.m3 / self.m2.powf(1.5);
        let correction = (n * (n - 1.0)).sqrt() / (n - 2.0);
        Some(correction * g1)
    }

    /// Fisher's excess kurtosis (G₂) with bias correction, or `None` if
    /// fewer than 4 samples have been added or variance is zero.
    pub fn kurtosis(&self) -> Option<f64> {
        if self.count < 4 || self.m2 == 0.0 {
            return None;
        }
        let n = self.count as f64;
        let g2 = n * self.m4 / (self.m2 * self.m2) - 3.0;
        let correction = (n - 1.0) / ((n - 2.0) * (n - 3.0));
        Some(correction * ((n + 1.0) * g2 + 6.0))
    }

    /// Population skewness `g₁ = m₃ / m₂^1.5` with central moments over `n`,
    /// or `None` if fewer than 2 samples have been added or variance is zero.
    pub fn population_skewness(&self) -> Option<f64> {
        if self.count < 2 || self.m2 == 0.0 {
            return None;
        }
        let n = self.count as f64;
        Some(n.sqrt() * self.m3 / self.m2.powf(1.5))
    }

    /// Population excess kurtosis `g₂ = m₄ / m₂² − 3` with central moments
    /// over `n`, or `None` if fewer than 2 samples have been added or
    /// variance is zero.
    pub fn population_kurtosis(&self) -> Option<f64> {
        if self.count < 2 || self.m2 == 0.0 {
            return None;
        }
        let n = self.count as f64;
        Some(n * self.m4 / (self.m2 * self.m2) - 3.0)
    }
}

impl Default for WelfordAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
