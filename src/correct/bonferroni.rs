//! Bonferroni family-wise error correction.

use serde::{Deserialize, Serialize};

/// Bonferroni-adjusted p-values of one family of tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonferroniCorrected {
    /// Original p-values.
    pub p_values: Vec<f64>,
    /// Adjusted p-values, each capped at 1.
    pub adjusted: Vec<f64>,
    /// Family size the p-values were multiplied by.
    pub n_tests: usize,
}

impl BonferroniCorrected {
    /// Adjust p-values by an explicit family size.
    ///
    /// The family can be larger than the slice, e.g. when only some members of
    /// the family were testable.
    pub fn with_family_size(p_values: &[f64], n_tests: usize) -> Self {
        Self {
            p_values: p_values.to_vec(),
            adjusted: p_values
                .iter()
                .map(|&p| correct_bonferroni(p, n_tests))
                .collect(),
            n_tests,
        }
    }

    /// Count adjusted p-values at or below `alpha`.
    pub fn n_significant(&self, alpha: f64) -> usize {
        self.adjusted.iter().filter(|&&p| p <= alpha).count()
    }
}

/// Bonferroni-adjust one p-value for a family of `n_tests`.
pub fn correct_bonferroni(p_value: f64, n_tests: usize) -> f64 {
    (p_value * n_tests.max(1) as f64).min(1.0)
}
