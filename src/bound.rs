//! Bound modes for sigma conversions and order-statistic statistics.

use std::fmt;
use std::str::FromStr;

use crate::error::{McError, Result};

/// One- or two-sided interpretation of a sigma level or coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sidedness {
    OneSided,
    TwoSided,
}

/// Bound mode of an order-statistic statistic.
///
/// `OneSidedLow`, `OneSidedHigh`, `Nearest`, and `All` only make sense for
/// percentile confidence bounds.
///
/// # Examples
/// ```
/// use u_montecarlo::bound::StatBound;
/// let b: StatBound = "1-sided high".parse().unwrap();
/// assert_eq!(b, StatBound::OneSidedHigh);
/// assert_eq!(b.to_string(), "1-sided high");
/// assert!("3-sided".parse::<StatBound>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatBound {
    OneSided,
    #[default]
    TwoSided,
    OneSidedLow,
    OneSidedHigh,
    Nearest,
    All,
}

impl StatBound {
    pub fn as_str(self) -> &'static str {
        match self {
            StatBound::OneSided => "1-sided",
            StatBound::TwoSided => "2-sided",
            StatBound::OneSidedLow => "1-sided low",
            StatBound::OneSidedHigh => "1-sided high",
            StatBound::Nearest => "nearest",
            StatBound::All => "all",
        }
    }

    /// Sidedness for tolerance intervals and sigma conversions.
    ///
    /// # Errors
    /// [`McError::InvalidParameter`] for the percentile-only modes.
    pub fn sidedness(self) -> Result<Sidedness> {
        match self {
            StatBound::OneSided => Ok(Sidedness::OneSided),
            StatBound::TwoSided => Ok(Sidedness::TwoSided),
            other => Err(McError::InvalidParameter(format!(
                "bound '{other}' is not valid here, expected '1-sided' or '2-sided'"
            ))),
        }
    }
}

impl fmt::Display for StatBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatBound {
    type Err = McError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1-sided" => Ok(StatBound::OneSided),
            "2-sided" => Ok(StatBound::TwoSided),
            "1-sided low" => Ok(StatBound::OneSidedLow),
            "1-sided high" => Ok(StatBound::OneSidedHigh),
            "nearest" => Ok(StatBound::Nearest),
            "all" => Ok(StatBound::All),
            other => Err(McError::InvalidParameter(format!(
                "unrecognized bound '{other}'"
            ))),
        }
    }
}

impl From<Sidedness> for StatBound {
    fn from(side: Sidedness) -> Self {
        match side {
            Sidedness::OneSided => StatBound::OneSided,
            Sidedness::TwoSided => StatBound::TwoSided,
        }
    }
}
