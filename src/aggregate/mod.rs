//! Aggregation of feature counts into taxon counts.

use crate::data::{FeatureTable, Zone, ZoneCounts};
use crate::lineage::{TaxRank, TaxonMembership};
use crate::normalize::CorrectionFactors;

/// Raw and depth-corrected counts of one taxon.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonCounts {
    /// Taxon key.
    pub taxon: String,
    /// Summed counts of member features.
    pub raw: ZoneCounts,
    /// `raw` scaled by the run's correction factors.
    pub corrected: ZoneCounts,
}

/// All taxon counts of a rank, in membership order.
#[derive(Debug, Clone)]
pub struct TaxonCountTable {
    /// Rank the taxa were cut at.
    pub rank: TaxRank,
    /// Per-taxon counts.
    pub taxa: Vec<TaxonCounts>,
    /// Members referenced by the taxonomy but absent from the count table.
    pub missing_features: usize,
}

impl TaxonCountTable {
    /// Number of taxa.
    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }

    /// Counts for a taxon key.
    pub fn get(&self, taxon: &str) -> Option<&TaxonCounts> {
        self.taxa.iter().find(|t| t.taxon == taxon)
    }

    /// Iterate over taxa.
    pub fn iter(&self) -> impl Iterator<Item = &TaxonCounts> {
        self.taxa.iter()
    }

    /// Zone totals of the raw counts over all taxa.
    pub fn raw_zone_totals(&self) -> [f64; 3] {
        self.zone_totals(|t| &t.raw)
    }

    /// Zone totals of the corrected counts over all taxa.
    pub fn corrected_zone_totals(&self) -> [f64; 3] {
        self.zone_totals(|t| &t.corrected)
    }

    fn zone_totals<F>(&self, select: F) -> [f64; 3]
    where
        F: Fn(&TaxonCounts) -> &ZoneCounts,
    {
        let mut totals = [0.0; 3];
        for taxon in &self.taxa {
            let counts = select(taxon);
            for zone in Zone::ALL {
                totals[zone.index()] += counts.zone_sum(zone);
            }
        }
        totals
    }
}

/// Sum the counts of each taxon's member features.
///
/// Members missing from the count table contribute nothing. Taxa without any
/// counted member end up with all-zero vectors.
pub fn aggregate_counts(
    membership: &TaxonMembership,
    features: &FeatureTable,
    factors: &CorrectionFactors,
) -> TaxonCountTable {
    let mut missing_features = 0usize;

    let taxa = membership
        .iter()
        .map(|(taxon, members)| {
            let mut raw = ZoneCounts::zeros();
            for feature_id in members {
                match features.counts(feature_id) {
                    Some(counts) => raw += counts,
                    None => {
                        log::debug!(
                            "Feature '{}' of taxon '{}' has no counts, skipping",
                            feature_id,
                            taxon
                        );
                        missing_features += 1;
                    }
                }
            }
            TaxonCounts {
                taxon: taxon.to_string(),
                raw,
                corrected: factors.apply(&raw),
            }
        })
        .collect();

    TaxonCountTable {
        rank: membership.rank(),
        taxa,
        missing_features,
    }
}
