//! Error estimates for Monte Carlo integration by hit-or-miss sampling.
//!
//! Each sample contributes an indicator: `1` if the sampled point fell under
//! the curve, `0` otherwise. The integral estimate is `volume · mean`, and
//! its standard error shrinks as `1/√n`.

use crate::bound::Sidedness;
use crate::error::{McError, Result};
use crate::gaussian::pct_to_sig;
use crate::stats::{self, WelfordAccumulator};

fn check_indicators(is_under_curve: &[f64]) -> Result<()> {
    if is_under_curve.is_empty() {
        return Err(McError::InvalidParameter(
            "integration error needs at least one sample".into(),
        ));
    }
    if let Some(x) = is_under_curve.iter().find(|&&x| x != 0.0 && x != 1.0) {
        return Err(McError::InvalidParameter(format!(
            "integration indicators must be 0 or 1, got {x}"
        )));
    }
    Ok(())
}

fn two_sided_sigma(conf: f64) -> Result<f64> {
    let sig = pct_to_sig(conf, Sidedness::TwoSided);
    if sig.is_finite() {
        Ok(sig)
    } else {
        Err(McError::InvalidParameter(format!(
            "confidence must be in [0, 1), got {conf}"
        )))
    }
}

/// Half-width of the two-sided `conf` confidence interval on the integral.
///
/// `volume · s / √n · z`, with `s` the sample standard deviation of the
/// indicators and `z` the two-sided sigma level of `conf`. A single sample
/// uses `s = 1`.
///
/// # Errors
/// [`McError::InvalidParameter`] if the input is empty, contains values
/// other than 0 and 1, or `conf` has no finite sigma level.
///
/// # Examples
/// ```
/// use u_montecarlo::integration::integration_error;
/// let err = integration_error(&[1.0, 0.0, 1.0, 1.0], 1.0, 0.95).unwrap();
/// assert!((err - 0.4899909).abs() < 1e-6);
/// ```
pub fn integration_error(is_under_curve: &[f64], volume: f64, conf: f64) -> Result<f64> {
    check_indicators(is_under_curve)?;
    let z = two_sided_sigma(conf)?;
    let n = is_under_curve.len() as f64;
    let s = stats::std_dev(is_under_curve).unwrap_or(1.0);
    Ok(volume * s / n.sqrt() * z)
}

/// [`integration_error`] after each successive sample.
///
/// The first entry, where the sample deviation is undefined, repeats the
/// full-sample estimate.
///
/// # Errors
/// As for [`integration_error`].
pub fn integration_error_running(is_under_curve: &[f64], volume: f64, conf: f64) -> Result<Vec<f64>> {
    let total = integration_error(is_under_curve, volume, conf)?;
    let z = two_sided_sigma(conf)?;
    let mut acc = WelfordAccumulator::new();
    Ok(is_under_curve
        .iter()
        .map(|&x| {
            acc.update(x);
            match acc.sample_variance() {
                Some(var) => volume * var.sqrt() / (acc.count() as f64).sqrt() * z,
                None => total,
            }
        })
        .collect())
}

/// Number of samples needed for a two-sided `conf` error of at most
/// `error`, given an indicator standard deviation `stdev`.
///
/// Pass [`max_stdev`]`(0.0, 1.0)` or a pilot-run estimate as `stdev`.
///
/// # Errors
/// [`McError::InvalidParameter`] if `error` is not positive or `conf` has
/// no finite sigma level.
///
/// # Examples
/// ```
/// use u_montecarlo::integration::integration_n_from_err;
/// assert_eq!(integration_n_from_err(0.01, 1.0, 0.95, 1.0).unwrap(), 38415);
/// ```
pub fn integration_n_from_err(error: f64, volume: f64, conf: f64, stdev: f64) -> Result<u64> {
    if error.is_nan() || error <= 0.0 {
        return Err(McError::InvalidParameter(format!(
            "target error must be positive, got {error}"
        )));
    }
    let z = two_sided_sigma(conf)?;
    let n = (volume * stdev * z / error).powi(2).ceil();
    Ok(n as u64)
}

/// Largest possible variance of a quantity bounded by `[low, high]`.
pub fn max_variance(low: f64, high: f64) -> f64 {
    (high - low).powi(2) / 4.0
}

/// Largest possible standard deviation of a quantity bounded by `[low, high]`.
pub fn max_stdev(low: f64, high: f64) -> f64 {
    (high - low).abs() / 2.0
}
