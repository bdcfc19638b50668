//! Taxa found in one zone and absent from another.

use crate::aggregate::TaxonCounts;
use crate::data::{log10_or_zero, Zone};
use serde::{Deserialize, Serialize};

/// Minimum raw zone sum for a zone to hold a unique taxon.
pub const UNIQUE_MIN_ZONE_SUM: f64 = 20.0;

/// Raw replicate count that counts as a solid observation.
pub const UNIQUE_MIN_REPLICATE: f64 = 10.0;

/// Replicates that must reach [`UNIQUE_MIN_REPLICATE`].
pub const UNIQUE_MIN_REPLICATES: usize = 2;

/// A taxon unique to one or more zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueTaxon {
    /// Taxon key.
    pub taxon: String,
    /// Zones the taxon is unique to.
    pub zones: Vec<Zone>,
    /// Mean log10 corrected abundance per zone.
    pub mean_log10: [f64; 3],
}

/// Check whether a taxon is unique to any zone.
///
/// A zone qualifies when its raw sum is at least 20, another zone has no raw
/// counts at all, and two of its raw replicates reach 10. The observation gate
/// is applied by the caller.
pub fn find_unique(taxon: &TaxonCounts) -> Option<UniqueTaxon> {
    let sums = taxon.raw.zone_sums();

    let zones: Vec<Zone> = Zone::ALL
        .into_iter()
        .filter(|&zone| {
            let own = sums[zone.index()];
            let other_empty = Zone::ALL
                .iter()
                .any(|&other| other != zone && sums[other.index()] == 0.0);
            let solid = taxon
                .raw
                .zone(zone)
                .iter()
                .filter(|&&v| v >= UNIQUE_MIN_REPLICATE)
                .count();
            own >= UNIQUE_MIN_ZONE_SUM && other_empty && solid >= UNIQUE_MIN_REPLICATES
        })
        .collect();

    if zones.is_empty() {
        return None;
    }

    let mean_log10 = Zone::ALL.map(|zone| {
        let values = taxon.corrected.zone(zone);
        values.iter().map(|&v| log10_or_zero(v)).sum::<f64>() / values.len() as f64
    });

    Some(UniqueTaxon {
        taxon: taxon.taxon.clone(),
        zones,
        mean_log10,
    })
}

/// Sort unique taxa by name, descending.
pub fn sort_unique(taxa: &mut [UniqueTaxon]) {
    taxa.sort_by(|a, b| b.taxon.cmp(&a.taxon));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ZoneCounts;
    use approx::assert_relative_eq;

    fn taxon(values: [f64; 9]) -> TaxonCounts {
        let c = ZoneCounts::from_columns(&values);
        TaxonCounts {
            taxon: "t".to_string(),
            raw: c,
            corrected: c,
        }
    }

    #[test]
    fn test_unique_to_sub() {
        let t = taxon([100.0, 10.0, 0.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0]);
        let unique = find_unique(&t).unwrap();
        assert_eq!(unique.zones, vec![Zone::Sub]);
        assert_relative_eq!(unique.mean_log10[0], 1.0);
        assert_relative_eq!(unique.mean_log10[1], 0.0);
    }

    #[test]
    fn test_needs_two_solid_replicates() {
        let t = taxon([100.0, 9.0, 0.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0]);
        assert!(find_unique(&t).is_none());
    }

    #[test]
    fn test_needs_an_empty_zone() {
        let t = taxon([100.0, 100.0, 0.0, 1.0, 0.0, 0.0, 5.0, 0.0, 0.0]);
        assert!(find_unique(&t).is_none());
    }

    #[test]
    fn test_two_zones() {
        let t = taxon([50.0, 50.0, 0.0, 20.0, 20.0, 20.0, 0.0, 0.0, 0.0]);
        assert_eq!(find_unique(&t).unwrap().zones, vec![Zone::Sub, Zone::Inter]);
    }

    #[test]
    fn test_sorted_descending() {
        let mut taxa: Vec<UniqueTaxon> = ["b", "c", "a"]
            .iter()
            .map(|n| UniqueTaxon {
                taxon: n.to_string(),
                zones: vec![Zone::Sub],
                mean_log10: [0.0; 3],
            })
            .collect();
        sort_unique(&mut taxa);
        let names: Vec<&str> = taxa.iter().map(|t| t.taxon.as_str()).collect();
        assert_eq!(names, ["c", "b", "a"]);
    }
}
