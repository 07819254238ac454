//! Seeded random number generation and weighted sampling.
//!
//! # Reproducibility
//!
//! Every input variable is drawn from an RNG built by [`create_rng`] from an
//! explicit seed. The underlying algorithm (SmallRng) is deterministic for a
//! given seed on the same platform.

use rand::Rng;

/// Creates a fast, seeded random number generator.
///
/// Uses `SmallRng` (Xoshiro256++) for high performance.
///
/// # Examples
/// ```
/// use u_montecarlo::random::create_rng;
/// use rand::Rng;
/// let mut rng = create_rng(42);
/// let x: f64 = rng.random();
/// assert!(x >= 0.0 && x < 1.0);
/// ```
pub fn create_rng(seed: u64) -> rand::rngs::SmallRng {
    use rand::SeedableRng;
    rand::rngs::SmallRng::seed_from_u64(seed)
}

/// Pre-computed weighted sampler for O(log n) repeated sampling.
///
/// Builds a cumulative distribution table from weights, then uses
/// binary search for each sample. Zero weights are allowed and are never
/// selected.
///
/// # Complexity
/// - Construction: O(n)
/// - Sampling: O(log n)
///
/// # Examples
/// ```
/// use u_montecarlo::random::{create_rng, WeightedSampler};
/// let sampler = WeightedSampler::new(&[1.0, 2.0, 3.0, 4.0]).unwrap();
/// let mut rng = create_rng(42);
/// assert!(sampler.sample(&mut rng) < 4);
/// ```
#[derive(Debug, Clone)]
pub struct WeightedSampler {
    cumulative: Vec<f64>,
    total: f64,
}

impl WeightedSampler {
    /// Creates a new weighted sampler from the given weights.
    ///
    /// # Returns
    /// - `None` if `weights` is empty or all weights are zero/negative.
    pub fn new(weights: &[f64]) -> Option<Self> {
        if weights.is_empty() {
            return None;
        }

        let mut cumulative = Vec::with_capacity(weights.len());
        let mut total = 0.0;
        for &w in weights {
            if w > 0.0 {
                total += w;
            }
            cumulative.push(total);
        }

        if !(total > 0.0 && total.is_finite()) {
            return None;
        }

        Some(Self { cumulative, total })
    }

    /// Samples a random index according to the weights.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let threshold = rng.random_range(0.0..self.total);
        // first entry strictly above the threshold, so zero-weight slots are skipped
        self.cumulative
            .partition_point(|&c| c <= threshold)
            .min(self.cumulative.len() - 1)
    }

    /// Cumulative probabilities `F(i) = Σ_{j≤i} w_j / Σ w`, with the last
    /// entry exactly `1.0`.
    pub fn cumulative_probabilities(&self) -> Vec<f64> {
        let mut probs: Vec<f64> = self.cumulative.iter().map(|c| c / self.total).collect();
        if let Some(last) = probs.last_mut() {
            *last = 1.0;
        }
        probs
    }

    /// Returns the number of categories.
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    /// Returns true if there are no categories.
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Returns the total weight.
    pub fn total_weight(&self) -> f64 {
        self.total
    }
}

// ============================================================================
// Tests
// ============================================================================
