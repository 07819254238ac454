//! Distribution-free rank selection for order statistics.
//!
//! Two questions are answered here, both without assuming anything about the
//! distribution the sample came from:
//!
//! - **Tolerance interval** ([`order_stat_ti_rank`]): which order statistic(s)
//!   bound at least a proportion `p` of the population with confidence `c`?
//! - **Percentile confidence bound** ([`order_stat_p_rank`]): which order
//!   statistic(s) bound the location of the true `p`-quantile with
//!   confidence `c`?
//!
//! Both reduce to binomial tail probabilities, since the number of sample
//! points below any fixed population quantile `q_p` is `Binom(n, p)`.
//!
//! Ranks are 1-based for tolerance intervals (`k = 1` is the extreme) and
//! offsets from 0-based anchor indices for percentile bounds.
//!
//! Reference: Hahn & Meeker (1991), *Statistical Intervals*, §5.3 and §7.

use crate::bound::{Sidedness, StatBound};
use crate::error::{McError, Result};
use crate::special::binomial_cdf;

fn check_unit_interval(name: &str, v: f64) -> Result<()> {
    if v > 0.0 && v < 1.0 {
        Ok(())
    } else {
        Err(McError::InvalidParameter(format!(
            "{name} must be in (0, 1), got {v}"
        )))
    }
}

// ============================================================================
// Tolerance intervals
// ============================================================================

/// Confidence that order statistic(s) at rank `k` cover a proportion `p`.
///
/// # Algorithm
/// Two-sided, the interval `[X₍ₖ₎, X₍ₙ₋ₖ₊₁₎]` covers `p` exactly when fewer
/// than `n − 2k + 1` points fall inside the central `p` mass, giving
/// `P[Binom(n, 1−p) ≥ 2k]`. One-sided, `p` is first normalized to
/// `max(p, 1−p)` and the `k`-th point from the relevant end gives
/// `P[Binom(n, 1−p) ≥ k]`.
///
/// # Returns
/// `0.0` for `k = 0`; decreasing in `k`.
pub fn order_stat_ti_conf(n: usize, k: usize, p: f64, side: Sidedness) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let (l, p) = match side {
        Sidedness::TwoSided => (2, p),
        Sidedness::OneSided => (1, p.max(1.0 - p)),
    };
    1.0 - binomial_cdf((l * k) as i64 - 1, n as u64, 1.0 - p)
}

/// Rank `k` of the order statistic(s) forming a tolerance interval.
///
/// Walks `k = 1, 2, …` and returns the largest `k` whose confidence still
/// meets `c`, capped at `⌊n/2⌋` two-sided and `n` one-sided. This is the
/// tightest interval that still has the requested coverage and confidence.
///
/// # Errors
/// - [`McError::InvalidParameter`] if `p` or `c` is outside `(0, 1)`.
/// - [`McError::InsufficientSampleSize`] if even the sample extremes fall
///   short of `c`.
///
/// # Examples
/// ```
/// use u_montecarlo::bound::Sidedness;
/// use u_montecarlo::order_stats::order_stat_ti_rank;
/// // Wilks: 59 samples give a one-sided 95/95 bound at the sample maximum
/// assert_eq!(order_stat_ti_rank(59, 0.95, 0.95, Sidedness::OneSided).unwrap(), 1);
/// assert!(order_stat_ti_rank(58, 0.95, 0.95, Sidedness::OneSided).is_err());
/// ```
pub fn order_stat_ti_rank(n: usize, p: f64, c: f64, side: Sidedness) -> Result<usize> {
    check_unit_interval("p", p)?;
    check_unit_interval("c", c)?;

    let kmax = match side {
        Sidedness::TwoSided => n / 2,
        Sidedness::OneSided => n,
    };
    if kmax == 0 || order_stat_ti_conf(n, 1, p, side) < c {
        return Err(McError::InsufficientSampleSize { n, p, c });
    }

    let mut k = 1;
    while k < kmax && order_stat_ti_conf(n, k + 1, p, side) >= c {
        k += 1;
    }
    tracing::trace!("tolerance rank n={} p={} c={} {:?} -> k={}", n, p, c, side, k);
    Ok(k)
}

// ============================================================================
// Percentile confidence bounds
// ============================================================================

/// 0-based sample indices bracketing the `p`-quantile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorIndices {
    pub low: usize,
    pub nearest: usize,
    pub high: usize,
}

/// Anchor indices of the `p`-quantile in a sorted sample of size `n`.
///
/// Uses the linear-interpolation position `h = p·(n−1)` and returns
/// `(⌊h⌋, round(h), ⌈h⌉)`.
///
/// # Errors
/// [`McError::InvalidParameter`] if `n = 0` or `p` is outside `[0, 1]`.
///
/// # Examples
/// ```
/// use u_montecarlo::order_stats::anchor_indices;
/// let a = anchor_indices(100, 0.5).unwrap();
/// assert_eq!((a.low, a.nearest, a.high), (49, 50, 50));
/// ```
pub fn anchor_indices(n: usize, p: f64) -> Result<AnchorIndices> {
    if n == 0 {
        return Err(McError::InvalidParameter(
            "anchor indices need a non-empty sample".into(),
        ));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(McError::InvalidParameter(format!(
            "p must be in [0, 1], got {p}"
        )));
    }
    let h = p * (n - 1) as f64;
    Ok(AnchorIndices {
        low: h.floor() as usize,
        nearest: h.round() as usize,
        high: h.ceil() as usize,
    })
}

/// Confidence that the order statistics at offset `k` around the anchors
/// bound the true `p`-quantile.
///
/// With `F` the `Binom(n, p)` CDF:
///
/// | bound | indices | confidence |
/// |---|---|---|
/// | `1-sided low` | `low−k` | `1 − F(low−k)` |
/// | `1-sided high` | `high+k` | `F(high+k)` |
/// | `2-sided` / `all` | both | `F(high+k) − F(low−k)` |
/// | `nearest` | `nearest` | `0` |
///
/// Offsets that leave the sample yield `0.0`.
pub fn order_stat_p_conf(n: usize, k: usize, anchors: AnchorIndices, p: f64, bound: StatBound) -> f64 {
    let f = |j: usize| binomial_cdf(j as i64, n as u64, p);
    let low = anchors.low.checked_sub(k);
    let high = Some(anchors.high + k).filter(|&j| j < n);
    match (bound, low, high) {
        (StatBound::OneSidedLow, Some(lo), _) => 1.0 - f(lo),
        (StatBound::OneSidedHigh, _, Some(hi)) => f(hi),
        (StatBound::TwoSided | StatBound::All, Some(lo), Some(hi)) => f(hi) - f(lo),
        _ => 0.0,
    }
}

/// Offset `k` from the anchor indices needed for a `c`-confidence bound on
/// the `p`-quantile.
///
/// Returns the smallest `k ≥ 0` meeting `c`. `nearest` always returns `0`;
/// `all` uses the two-sided offset.
///
/// # Errors
/// - [`McError::InvalidParameter`] if `p` or `c` is outside `(0, 1)` or the
///   bound is the ambiguous `1-sided`.
/// - [`McError::InsufficientSampleSize`] if no offset inside the sample
///   meets `c`.
///
/// # Examples
/// ```
/// use u_montecarlo::bound::StatBound;
/// use u_montecarlo::order_stats::order_stat_p_rank;
/// // 95% interval for the median of 100 samples: 40th to 61st order statistic
/// assert_eq!(order_stat_p_rank(100, 0.5, 0.95, StatBound::TwoSided).unwrap(), 10);
/// ```
pub fn order_stat_p_rank(n: usize, p: f64, c: f64, bound: StatBound) -> Result<usize> {
    check_unit_interval("p", p)?;
    check_unit_interval("c", c)?;
    if bound == StatBound::OneSided {
        return Err(McError::InvalidParameter(
            "percentile bounds need '1-sided low' or '1-sided high', not '1-sided'".into(),
        ));
    }
    if n == 0 {
        return Err(McError::InsufficientSampleSize { n, p, c });
    }
    if bound == StatBound::Nearest {
        return Ok(0);
    }

    let anchors = anchor_indices(n, p)?;
    for k in 0..n {
        if order_stat_p_conf(n, k, anchors, p, bound) >= c {
            tracing::trace!("percentile offset n={} p={} c={} {} -> k={}", n, p, c, bound, k);
            return Ok(k);
        }
    }
    Err(McError::InsufficientSampleSize { n, p, c })
}
