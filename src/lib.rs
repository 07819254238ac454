//! # u-montecarlo
//!
//! Variable/value data model and statistics engine for Monte Carlo runs.
//!
//! Input variables are drawn from parametric distributions with an explicit
//! seed; output variables are assembled from collected per-case results.
//! Either kind can carry named statistics, including distribution-free
//! order-statistic tolerance intervals and percentile confidence bounds.
//!
//! ## Modules
//!
//! - [`variable`] — Input and output variables, splitting, describe
//! - [`var_stat`] — Statistics attached to a variable
//! - [`value`] — Per-case values, payload shapes, category maps
//! - [`order_stats`] — Rank selection for tolerance intervals and percentile bounds
//! - [`gaussian`] — Sigma level ↔ percentile conversions, confidence ellipsoids
//! - [`integration`] — Monte Carlo integration error estimates
//! - [`distributions`] — Distributions input variables draw from
//! - [`stats`] — Descriptive statistics with numerical stability guarantees
//! - [`special`] — Normal, gamma, beta, chi-squared, and binomial functions
//! - [`random`] — Seeded RNG and weighted sampling
//! - [`bound`] — Bound modes
//! - [`error`] — Crate error type
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: Welford's algorithm for variance,
//!   Kahan summation for accumulation
//! - **Explicit seeds**: no global RNG state; equal seeds give equal draws
//! - **Eager statistics**: results are computed on attach and recomputed
//!   only on request
//! - **Property-based testing**: Mathematical invariants verified via proptest

pub mod bound;
pub mod distributions;
pub mod error;
pub mod gaussian;
pub mod integration;
pub mod order_stats;
pub mod random;
pub mod special;
pub mod stats;
pub mod value;
pub mod var_stat;
pub mod variable;

pub use error::{McError, Result};
