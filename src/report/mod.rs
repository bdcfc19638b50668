//! Per-rank reports and the sinks that write them.
//!
//! A [`RankReport`] is built completely in memory by the pipeline and handed
//! to a [`ReportSink`]. [`TsvReportWriter`] writes the tab-separated files;
//! `Vec<RankReport>` collects reports for inspection.

mod abundance;
mod abundance_log;
mod unique;
mod writer;

pub use abundance::{AbundanceRow, AbundanceTable, EXPECTED_ZONE_SHARE};
pub use abundance_log::{AbundanceLog, AbundanceLogRow};
pub use unique::{find_unique, sort_unique, UniqueTaxon};
pub use writer::{OutputLayout, TsvReportWriter};

use crate::aggregate::TaxonCountTable;
use crate::classify::EnrichmentLabel;
use crate::error::Result;
use crate::lineage::TaxRank;
use crate::test::{PairwisePValues, PassCounters, SignificanceResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One classified taxon of the enrichment report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRow {
    /// Taxon key.
    pub taxon: String,
    /// Sequence number among passed taxa, counting unlisted ones.
    pub uid: usize,
    /// Omnibus p-value.
    pub pval: f64,
    /// Median log10 corrected abundance per zone.
    pub medians: [f64; 3],
    /// Pairwise p-values.
    pub pairwise: PairwisePValues,
    /// Direction label.
    pub label: EnrichmentLabel,
}

/// Significance result and label of one taxon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonOutcome {
    pub result: SignificanceResult,
    pub label: EnrichmentLabel,
}

/// Everything reported for one rank.
#[derive(Debug, Clone)]
pub struct RankReport {
    /// Rank the report covers.
    pub rank: TaxRank,
    /// Aggregated raw and corrected counts.
    pub counts: TaxonCountTable,
    /// Abundance table over raw counts.
    pub raw_abundance: AbundanceTable,
    /// Abundance table over corrected counts.
    pub normalized_abundance: AbundanceTable,
    /// Abundance log over raw counts.
    pub raw_log: AbundanceLog,
    /// Abundance log over corrected counts.
    pub normalized_log: AbundanceLog,
    /// Outcome of every taxon, in taxon order.
    pub outcomes: Vec<TaxonOutcome>,
    /// Directionally labelled taxa.
    pub enrichment: Vec<EnrichmentRow>,
    /// Zone-unique taxa, sorted by name descending.
    pub unique: Vec<UniqueTaxon>,
    /// Criteria counters.
    pub counters: PassCounters,
}

impl RankReport {
    /// Number of taxa that passed significance.
    pub fn n_passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.passed()).count()
    }

    /// Label of a taxon.
    pub fn label(&self, taxon: &str) -> Option<EnrichmentLabel> {
        self.outcomes
            .iter()
            .find(|o| o.result.taxon == taxon)
            .map(|o| o.label)
    }
}

impl std::fmt::Display for RankReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Rank: {}", self.rank)?;
        writeln!(f, "  Taxa: {}", self.counts.len())?;
        writeln!(f, "  Passed: {}", self.n_passed())?;
        writeln!(f, "  Enriched: {}", self.enrichment.len())?;
        writeln!(f, "  Unique: {}", self.unique.len())?;
        write!(f, "  Counters: {}", self.counters)
    }
}

/// Destination of finished rank reports.
pub trait ReportSink {
    /// Consume one rank report. Returns the paths written, if any.
    fn write_rank(&mut self, report: &RankReport) -> Result<Vec<PathBuf>>;
}

impl ReportSink for Vec<RankReport> {
    fn write_rank(&mut self, report: &RankReport) -> Result<Vec<PathBuf>> {
        self.push(report.clone());
        Ok(Vec::new())
    }
}
