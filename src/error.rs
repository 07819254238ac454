//! Error types raised while drawing variables and computing statistics.

use thiserror::Error;

use crate::distributions::DistributionError;

/// Errors surfaced by variables, values, and statistics.
///
/// None of these are retried internally. A failed computation produces no
/// result object.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum McError {
    #[error("invalid draw for variable '{name}': {detail}")]
    InvalidDraw { name: String, detail: String },

    #[error("statistic '{stat}' requires parameter '{param}'")]
    MissingParameter { stat: String, param: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("insufficient sample size n={n} for p={p}, c={c}")]
    InsufficientSampleSize { n: usize, p: f64, c: f64 },

    #[error("category lookup failed: {0}")]
    CategoryLookup(String),

    #[error("case {case} out of range for {ncases} cases")]
    CaseOutOfRange { case: usize, ncases: usize },

    #[error("statistic '{stat}' is undefined: {reason}")]
    UndefinedStatistic { stat: String, reason: String },

    #[error(transparent)]
    Distribution(#[from] DistributionError),
}

pub type Result<T> = std::result::Result<T, McError>;
