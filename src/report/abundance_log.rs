//! Summed log10 abundances of the more abundant taxa.

use crate::aggregate::TaxonCountTable;
use crate::data::{log10_floor_fraction, Zone};
use crate::test::CountBasis;
use serde::{Deserialize, Serialize};

/// One taxon of an abundance log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbundanceLogRow {
    /// Taxon key.
    pub taxon: String,
    /// Sum of replicate log10 values per zone, values below 1 counted as 0.
    pub log10_sums: [f64; 3],
}

/// Abundance log of one rank over raw or corrected counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbundanceLog {
    /// Counts the log was built from.
    pub basis: CountBasis,
    /// Fraction of a zone total a taxon must reach in some zone.
    pub pct_threshold: f64,
    /// Rows sorted by taxon name, descending.
    pub rows: Vec<AbundanceLogRow>,
}

impl AbundanceLog {
    /// Build the log.
    ///
    /// A taxon is listed when its largest zone sum reaches the smallest of the
    /// three `zone_total * pct_threshold` cut-offs.
    pub fn build(table: &TaxonCountTable, basis: CountBasis, pct_threshold: f64) -> Self {
        let zone_totals = match basis {
            CountBasis::Raw => table.raw_zone_totals(),
            CountBasis::Corrected => table.corrected_zone_totals(),
        };
        let cutoff = zone_totals
            .iter()
            .map(|t| t * pct_threshold)
            .fold(f64::INFINITY, f64::min);

        let mut rows: Vec<AbundanceLogRow> = table
            .iter()
            .filter_map(|taxon| {
                let counts = match basis {
                    CountBasis::Raw => &taxon.raw,
                    CountBasis::Corrected => &taxon.corrected,
                };
                let max_sum = counts.zone_sums().into_iter().fold(0.0, f64::max);
                if max_sum < cutoff {
                    return None;
                }
                let log10_sums = Zone::ALL.map(|zone| {
                    counts
                        .zone(zone)
                        .iter()
                        .map(|&v| log10_floor_fraction(v))
                        .sum()
                });
                Some(AbundanceLogRow {
                    taxon: taxon.taxon.clone(),
                    log10_sums,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.taxon.cmp(&a.taxon));

        Self {
            basis,
            pct_threshold,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::TaxonCounts;
    use crate::data::ZoneCounts;
    use crate::lineage::TaxRank;
    use approx::assert_relative_eq;

    fn table() -> TaxonCountTable {
        let rows = [
            ("Bacteria_A", [1000.0, 100.0, 0.5, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0]),
            ("Bacteria_C", [0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            ("Bacteria_B", [10.0, 10.0, 10.0, 1000.0, 1000.0, 1000.0, 10.0, 10.0, 10.0]),
        ];
        TaxonCountTable {
            rank: TaxRank::Phylum,
            taxa: rows
                .iter()
                .map(|(name, v)| {
                    let c = ZoneCounts::from_columns(v);
                    TaxonCounts {
                        taxon: name.to_string(),
                        raw: c,
                        corrected: c,
                    }
                })
                .collect(),
            missing_features: 0,
        }
    }

    #[test]
    fn test_filters_and_sorts() {
        let log = AbundanceLog::build(&table(), CountBasis::Raw, 0.01);
        let names: Vec<&str> = log.rows.iter().map(|r| r.taxon.as_str()).collect();
        assert_eq!(names, ["Bacteria_B", "Bacteria_A"]);
    }

    #[test]
    fn test_fractions_count_as_zero() {
        let log = AbundanceLog::build(&table(), CountBasis::Raw, 0.01);
        let a = log.rows.iter().find(|r| r.taxon == "Bacteria_A").unwrap();
        // log10(1000) + log10(100) + 0
        assert_relative_eq!(a.log10_sums[0], 5.0);
        assert_relative_eq!(a.log10_sums[1], 3.0);
    }
}
