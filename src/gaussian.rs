//! Conversions between Gaussian sigma levels and cumulative probabilities.
//!
//! Two-sided levels carry a sign that selects the tail: `+3σ` two-sided is
//! `+0.9973`, `−3σ` two-sided is `−0.9973`. The confidence-ellipsoid pair is
//! the multivariate analogue, where the squared Mahalanobis radius of a
//! `df`-dimensional Gaussian is χ²-distributed with `df` degrees of freedom.
//!
//! Invalid inputs yield `f64::NAN`, as in [`special`](crate::special).

use crate::bound::Sidedness;
use crate::special;

/// Maps a sigma level to a cumulative probability.
///
/// - One-sided: `Φ(sig)`.
/// - Two-sided: `sign(sig) · (2Φ(|sig|) − 1)`.
///
/// # Examples
/// ```
/// use u_montecarlo::bound::Sidedness;
/// use u_montecarlo::gaussian::sig_to_pct;
/// assert!((sig_to_pct(3.0, Sidedness::OneSided) - 0.9986501).abs() < 1e-7);
/// assert!((sig_to_pct(-3.0, Sidedness::TwoSided) + 0.9973002).abs() < 1e-7);
/// ```
pub fn sig_to_pct(sig: f64, side: Sidedness) -> f64 {
    if sig.is_nan() {
        return f64::NAN;
    }
    match side {
        Sidedness::OneSided => special::standard_normal_cdf(sig),
        Sidedness::TwoSided => {
            sig.signum() * (2.0 * special::standard_normal_cdf(sig.abs()) - 1.0)
        }
    }
}

/// Inverse of [`sig_to_pct`].
///
/// # Returns
/// - `f64::NAN` if `p` is outside `[0, 1]` (one-sided) or `[−1, 1]`
///   (two-sided).
///
/// # Examples
/// ```
/// use u_montecarlo::bound::Sidedness;
/// use u_montecarlo::gaussian::pct_to_sig;
/// assert!((pct_to_sig(0.95, Sidedness::TwoSided) - 1.959963984540054).abs() < 1e-12);
/// ```
pub fn pct_to_sig(p: f64, side: Sidedness) -> f64 {
    match side {
        Sidedness::OneSided => special::inverse_normal_cdf(p),
        Sidedness::TwoSided => {
            if p.is_nan() || !(-1.0..=1.0).contains(&p) {
                return f64::NAN;
            }
            p.signum() * special::inverse_normal_cdf((1.0 + p.abs()) / 2.0)
        }
    }
}

/// Probability mass inside a `df`-dimensional Gaussian confidence ellipsoid
/// of radius `sig` standard deviations: `χ²_df CDF(sig²)`.
///
/// For `df = 1` this equals `sig_to_pct(sig, TwoSided)` for `sig ≥ 0`.
///
/// # Examples
/// ```
/// use u_montecarlo::gaussian::conf_ellipsoid_sig_to_pct;
/// assert!((conf_ellipsoid_sig_to_pct(3.0, 2) - 0.9888910).abs() < 1e-7);
/// ```
pub fn conf_ellipsoid_sig_to_pct(sig: f64, df: u32) -> f64 {
    if df == 0 {
        return f64::NAN;
    }
    special::chi_squared_cdf(sig * sig, f64::from(df))
}

/// Inverse of [`conf_ellipsoid_sig_to_pct`]: `sqrt(χ²_df quantile(p))`.
pub fn conf_ellipsoid_pct_to_sig(p: f64, df: u32) -> f64 {
    if df == 0 {
        return f64::NAN;
    }
    special::chi_squared_quantile(p, f64::from(df)).sqrt()
}
