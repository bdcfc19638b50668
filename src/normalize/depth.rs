//! Depth correction by downsampling every replicate to the shallowest one.
//!
//! Replicates differ in sequencing depth. Each replicate column is scaled by
//! `global_min / replicate_total`, where `global_min` is the smallest of the
//! nine replicate totals, so that every replicate represents the same depth.
//!
//! # Formula
//! For replicate j: corrected(x_ij) = x_ij * min_k(total_k) / total_j

use crate::data::{FeatureTable, Zone, ZoneCounts, N_REPLICATES};
use crate::error::{Result, ZonalError};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Per-replicate scale factors for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionFactors {
    /// Replicate totals the factors were derived from, in count-table order.
    pub replicate_totals: [f64; 9],
    /// Smallest replicate total.
    pub global_min: f64,
    /// Factor per replicate, each in (0, 1].
    pub factors: [f64; 9],
}

impl CorrectionFactors {
    /// Derive factors from replicate totals.
    ///
    /// Fails with [`ZonalError::ZeroDepthReplicate`] if any replicate is empty.
    pub fn from_totals(totals: &ZoneCounts) -> Result<Self> {
        for zone in Zone::ALL {
            for replicate in 0..N_REPLICATES {
                if totals.get(zone, replicate) <= 0.0 {
                    return Err(ZonalError::ZeroDepthReplicate {
                        zone: zone.name().to_string(),
                        replicate: replicate + 1,
                    });
                }
            }
        }

        let replicate_totals = totals.to_columns();
        let global_min = replicate_totals
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let factors = replicate_totals.map(|total| global_min / total);

        Ok(Self {
            replicate_totals,
            global_min,
            factors,
        })
    }

    /// Derive factors from the replicate depths of a feature table.
    pub fn from_feature_table(table: &FeatureTable) -> Result<Self> {
        Self::from_totals(&table.replicate_totals())
    }

    /// Factors as a zone × replicate matrix.
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::from_row_slice(&self.factors)
    }

    /// Scale raw counts to the common depth.
    pub fn apply(&self, raw: &ZoneCounts) -> ZoneCounts {
        raw.scaled(&self.matrix())
    }
}

impl std::fmt::Display for CorrectionFactors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Depth Correction")?;
        writeln!(f, "  Global minimum depth: {:.0}", self.global_min)?;
        for zone in Zone::ALL {
            for replicate in 0..N_REPLICATES {
                let i = zone.index() * N_REPLICATES + replicate;
                writeln!(
                    f,
                    "  {}{}: total {:>12.0}  factor {:.6}",
                    zone.name(),
                    replicate + 1,
                    self.replicate_totals[i],
                    self.factors[i]
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn create_test_table() -> FeatureTable {
        FeatureTable::from_rows(vec![
            ("a".to_string(), [100.0, 50.0, 20.0, 10.0, 40.0, 10.0, 5.0, 5.0, 200.0]),
            ("b".to_string(), [100.0, 150.0, 20.0, 30.0, 60.0, 40.0, 15.0, 45.0, 0.0]),
            ("c".to_string(), [0.0, 0.0, 10.0, 0.0, 0.0, 50.0, 30.0, 0.0, 100.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_factors_bounded() {
        let factors = CorrectionFactors::from_feature_table(&create_test_table()).unwrap();
        assert_eq!(factors.global_min, 40.0);
        for f in factors.factors {
            assert!(f > 0.0 && f <= 1.0);
        }
        // Sub1 totals 200 and Inter1 is the limiting replicate
        assert_relative_eq!(factors.factors[0], 0.2);
        assert_relative_eq!(factors.factors[3], 1.0);
    }

    #[test]
    fn test_limiting_replicate_keeps_global_min() {
        let table = create_test_table();
        let factors = CorrectionFactors::from_feature_table(&table).unwrap();

        let mut corrected_total = ZoneCounts::zeros();
        for id in table.feature_ids() {
            corrected_total += factors.apply(&table.counts(id).unwrap());
        }

        // Every replicate lands on the global minimum, including the limiting one.
        let min_corrected = corrected_total
            .to_columns()
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        assert_relative_eq!(min_corrected, factors.global_min, epsilon = 1e-9);
        for total in corrected_total.to_columns() {
            assert_relative_eq!(total, factors.global_min, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_depth_replicate() {
        let table = FeatureTable::from_rows(vec![(
            "a".to_string(),
            [1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0],
        )])
        .unwrap();

        match CorrectionFactors::from_feature_table(&table) {
            Err(ZonalError::ZeroDepthReplicate { zone, replicate }) => {
                assert_eq!(zone, "Inter");
                assert_eq!(replicate, 2);
            }
            other => panic!("expected ZeroDepthReplicate, got {:?}", other),
        }
    }

    #[test]
    fn test_apply_nonnegative() {
        let factors = CorrectionFactors::from_feature_table(&create_test_table()).unwrap();
        let corrected = factors.apply(&ZoneCounts::from_columns(&[3.0; 9]));
        assert!(corrected.to_columns().iter().all(|&v| v >= 0.0));
    }
}
