//! Zone abundance tables with per-zone binomial tests.
//!
//! Each zone sum is tested against an even split of the taxon's total over the
//! three zones. P-values are Bonferroni-adjusted by the number of taxa in the
//! table.

use crate::aggregate::TaxonCountTable;
use crate::correct::BonferroniCorrected;
use crate::error::Result;
use crate::test::{binomial_test, CountBasis, SignificanceConfig, NOMINAL_ALPHA};
use serde::{Deserialize, Serialize};

/// Expected share of a taxon's total in each zone under no zonal preference.
pub const EXPECTED_ZONE_SHARE: f64 = 0.333;

/// One taxon of an abundance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbundanceRow {
    /// Taxon key.
    pub taxon: String,
    /// Zone sums in Sub, Inter, Supra order.
    pub zone_sums: [f64; 3],
    /// Adjusted binomial p-values per zone, `None` when the taxon was too
    /// sparse to test.
    pub binomial: Option<[f64; 3]>,
    /// Smallest adjusted p-value if more than one zone is significant, else 1.
    pub min_pval: f64,
}

/// Abundance table of one rank over raw or corrected counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbundanceTable {
    /// Counts the table was built from.
    pub basis: CountBasis,
    /// Rows in taxon order.
    pub rows: Vec<AbundanceRow>,
}

impl AbundanceTable {
    /// Build the table for every taxon of a rank.
    pub fn build(
        table: &TaxonCountTable,
        basis: CountBasis,
        config: &SignificanceConfig,
    ) -> Result<Self> {
        let n_tests = table.len();
        let mut rows = Vec::with_capacity(n_tests);

        for taxon in table.iter() {
            let counts = match basis {
                CountBasis::Raw => &taxon.raw,
                CountBasis::Corrected => &taxon.corrected,
            };
            let zone_sums = counts.zone_sums();
            let total: f64 = zone_sums.iter().sum();
            let max_share = if total > 0.0 {
                zone_sums.iter().copied().fold(0.0, f64::max) / total
            } else {
                0.0
            };

            let binomial = if total >= config.min_total_observations
                && total > 0.0
                && max_share >= config.min_max_share
            {
                let mut raw_p = [1.0; 3];
                for (p_zone, &sum) in raw_p.iter_mut().zip(&zone_sums) {
                    *p_zone = binomial_test(sum, total, EXPECTED_ZONE_SHARE)?;
                }
                Some(BonferroniCorrected::with_family_size(&raw_p, n_tests))
            } else {
                None
            };

            let min_pval = binomial.as_ref().map_or(1.0, min_significant);
            let binomial = binomial.map(|c| [c.adjusted[0], c.adjusted[1], c.adjusted[2]]);

            rows.push(AbundanceRow {
                taxon: taxon.taxon.clone(),
                zone_sums,
                binomial,
                min_pval,
            });
        }

        Ok(Self { basis, rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn min_significant(corrected: &BonferroniCorrected) -> f64 {
    if corrected.n_significant(NOMINAL_ALPHA) > 1 {
        corrected.adjusted.iter().copied().fold(f64::INFINITY, f64::min)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::TaxonCounts;
    use crate::data::ZoneCounts;
    use crate::lineage::TaxRank;

    fn table(rows: &[(&str, [f64; 9])]) -> TaxonCountTable {
        TaxonCountTable {
            rank: TaxRank::Genus,
            taxa: rows
                .iter()
                .map(|(name, values)| {
                    let raw = ZoneCounts::from_columns(values);
                    TaxonCounts {
                        taxon: name.to_string(),
                        raw,
                        corrected: raw.scaled(&nalgebra::Matrix3::repeat(0.5)),
                    }
                })
                .collect(),
            missing_features: 0,
        }
    }

    #[test]
    fn test_skewed_taxon_is_tested() {
        let t = table(&[
            ("skewed", [300.0, 300.0, 300.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0]),
            ("sparse", [10.0, 0.0, 0.0, 10.0, 0.0, 0.0, 10.0, 0.0, 0.0]),
        ]);
        let abundance = AbundanceTable::build(&t, CountBasis::Raw, &SignificanceConfig::default())
            .unwrap();

        let skewed = &abundance.rows[0];
        assert_eq!(skewed.zone_sums, [900.0, 15.0, 15.0]);
        let p = skewed.binomial.unwrap();
        assert!(p.iter().all(|&v| v <= 0.05));
        assert!(skewed.min_pval <= 0.05);

        let sparse = &abundance.rows[1];
        assert!(sparse.binomial.is_none());
        assert_eq!(sparse.min_pval, 1.0);
    }

    #[test]
    fn test_adjusted_values_capped() {
        let t = table(&[
            ("even", [100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0]),
            ("other", [1.0; 9]),
        ]);
        let abundance = AbundanceTable::build(&t, CountBasis::Raw, &SignificanceConfig::default())
            .unwrap();
        let p = abundance.rows[0].binomial.unwrap();
        assert!(p.iter().all(|&v| v <= 1.0));
        assert_eq!(abundance.rows[0].min_pval, 1.0);
    }

    #[test]
    fn test_corrected_basis_uses_corrected_sums() {
        let t = table(&[("x", [100.0; 9])]);
        let abundance =
            AbundanceTable::build(&t, CountBasis::Corrected, &SignificanceConfig::default())
                .unwrap();
        assert_eq!(abundance.rows[0].zone_sums, [150.0, 150.0, 150.0]);
    }

    #[test]
    fn test_min_significant() {
        let one = BonferroniCorrected::with_family_size(&[0.01, 0.5, 0.9], 1);
        assert_eq!(min_significant(&one), 1.0);
        let two = BonferroniCorrected::with_family_size(&[0.01, 0.02, 0.9], 1);
        assert_eq!(min_significant(&two), 0.01);
        // Adjusted for a family of three, only the first stays under 0.05
        let family = BonferroniCorrected::with_family_size(&[0.01, 0.02, 0.9], 3);
        assert_eq!(min_significant(&family), 1.0);
    }
}
