//! Enrichment-direction labels for significant taxa.
//!
//! A taxon is labelled from its three pairwise p-values and the median log10
//! corrected abundance of each zone. When every pair is significant the zone
//! with the strictly largest median is `<zone>_high`. Otherwise a zone is
//! labelled when both pairs touching it are significant and its median is
//! strictly above (`_high`) or below (`_low`) the other two.

use crate::data::{Zone, ZonePair};
use crate::test::PairwisePValues;
use serde::{Deserialize, Serialize};

/// Significance level used by the classifier.
pub const CLASSIFY_ALPHA: f64 = 0.05;

/// Enrichment direction of a taxon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnrichmentLabel {
    SubHigh,
    SubLow,
    InterHigh,
    InterLow,
    SupraHigh,
    SupraLow,
    /// Significant, but no single direction.
    Complex,
    /// Not significant.
    Unclassified,
}

impl EnrichmentLabel {
    /// Label as written in reports.
    pub const fn name(self) -> &'static str {
        match self {
            EnrichmentLabel::SubHigh => "Sub_high",
            EnrichmentLabel::SubLow => "Sub_low",
            EnrichmentLabel::InterHigh => "Inter_high",
            EnrichmentLabel::InterLow => "Inter_low",
            EnrichmentLabel::SupraHigh => "Supra_high",
            EnrichmentLabel::SupraLow => "Supra_low",
            EnrichmentLabel::Complex => "complex",
            EnrichmentLabel::Unclassified => "none",
        }
    }

    /// `_high` label of a zone.
    pub const fn high(zone: Zone) -> Self {
        match zone {
            Zone::Sub => EnrichmentLabel::SubHigh,
            Zone::Inter => EnrichmentLabel::InterHigh,
            Zone::Supra => EnrichmentLabel::SupraHigh,
        }
    }

    /// `_low` label of a zone.
    pub const fn low(zone: Zone) -> Self {
        match zone {
            Zone::Sub => EnrichmentLabel::SubLow,
            Zone::Inter => EnrichmentLabel::InterLow,
            Zone::Supra => EnrichmentLabel::SupraLow,
        }
    }

    /// Whether the label names a direction and belongs in the enrichment report.
    pub fn is_directional(self) -> bool {
        !matches!(self, EnrichmentLabel::Complex | EnrichmentLabel::Unclassified)
    }
}

impl std::fmt::Display for EnrichmentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One pairwise rule: if both pairs are significant, label `zone`.
struct ZoneRule {
    zone: Zone,
    pairs: [ZonePair; 2],
}

/// Evaluated in order. A later match overwrites an earlier one.
const ZONE_RULES: [ZoneRule; 3] = [
    ZoneRule {
        zone: Zone::Sub,
        pairs: [ZonePair::SubInter, ZonePair::SubSupra],
    },
    ZoneRule {
        zone: Zone::Inter,
        pairs: [ZonePair::SubInter, ZonePair::InterSupra],
    },
    ZoneRule {
        zone: Zone::Supra,
        pairs: [ZonePair::SubSupra, ZonePair::InterSupra],
    },
];

/// Label a significant taxon.
///
/// `medians` are indexed by [`Zone::index`]. Never returns
/// [`EnrichmentLabel::Unclassified`].
pub fn classify(pairwise: &PairwisePValues, medians: [f64; 3]) -> EnrichmentLabel {
    if pairwise.max() <= CLASSIFY_ALPHA {
        return strict_max(&medians)
            .map(EnrichmentLabel::high)
            .unwrap_or(EnrichmentLabel::Complex);
    }

    let mut label = EnrichmentLabel::Complex;
    for rule in &ZONE_RULES {
        if rule.pairs.iter().all(|&p| pairwise.get(p) <= CLASSIFY_ALPHA) {
            match direction(rule.zone, &medians) {
                Some(Direction::High) => label = EnrichmentLabel::high(rule.zone),
                Some(Direction::Low) => label = EnrichmentLabel::low(rule.zone),
                None => {}
            }
        }
    }
    label
}

enum Direction {
    High,
    Low,
}

fn direction(zone: Zone, medians: &[f64; 3]) -> Option<Direction> {
    let own = medians[zone.index()];
    let others = Zone::ALL
        .iter()
        .filter(|&&z| z != zone)
        .map(|z| medians[z.index()]);
    let (mut above, mut below) = (true, true);
    for other in others {
        above &= own > other;
        below &= own < other;
    }
    if above {
        Some(Direction::High)
    } else if below {
        Some(Direction::Low)
    } else {
        None
    }
}

fn strict_max(medians: &[f64; 3]) -> Option<Zone> {
    Zone::ALL
        .into_iter()
        .find(|&z| matches!(direction(z, medians), Some(Direction::High)))
}
