//! Zone-wise differential abundance analysis of microbial taxa.
//!
//! Feature counts from three replicates in each of three sampling zones (Sub,
//! Inter, Supra) are aggregated to taxa at each taxonomic rank, corrected for
//! sequencing depth, tested for an uneven spread over the zones and labelled
//! with the direction of enrichment.
//!
//! # Overview
//!
//! - **data**: Feature count table, taxonomy table and the 3 × 3 zone layout
//! - **lineage**: Lineage normalization, ranks and rank-level taxon membership
//! - **aggregate**: Summing feature counts into taxon counts
//! - **normalize**: Depth correction to the shallowest replicate
//! - **test**: Chi-square, Kruskal-Wallis and binomial tests, significance engine
//! - **correct**: Multiple testing correction (Bonferroni)
//! - **classify**: Enrichment-direction labels
//! - **report**: Per-rank reports and TSV output
//! - **profile**: Replicate depth profiling
//! - **pipeline**: Configuration and per-rank execution
//!
//! # Example
//!
//! ```no_run
//! use zonal_daa::prelude::*;
//!
//! let features = FeatureTable::from_tsv("feature-table.tsv").unwrap();
//! let normalizer = LineageNormalizer::new(TaxaSource::Silva).unwrap();
//! let taxonomy = TaxonomyTable::from_tsv("taxonomy.tsv", &normalizer).unwrap();
//!
//! let mut writer = TsvReportWriter::new(OutputLayout::from_stem("results/shore").unwrap());
//! let summary = Pipeline::new()
//!     .ranks(&[TaxRank::Genus, TaxRank::Family])
//!     .pval_threshold(0.05)
//!     .run(&features, &taxonomy, &mut writer)
//!     .unwrap();
//! println!("{}", summary);
//! ```

pub mod aggregate;
pub mod classify;
pub mod correct;
pub mod data;
pub mod error;
pub mod lineage;
pub mod normalize;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod test;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::aggregate::{aggregate_counts, TaxonCountTable, TaxonCounts};
    pub use crate::classify::{classify, EnrichmentLabel};
    pub use crate::correct::{correct_bonferroni, BonferroniCorrected};
    pub use crate::data::{FeatureTable, TaxonomyTable, Zone, ZoneCounts, ZonePair};
    pub use crate::error::{Result, ZonalError};
    pub use crate::lineage::{taxon_key, LineageNormalizer, TaxRank, TaxaSource, TaxonMembership};
    pub use crate::normalize::CorrectionFactors;
    pub use crate::pipeline::{run_files, AnalysisConfig, Pipeline, RankContext, RunSummary};
    pub use crate::profile::{profile_depth, DepthProfile};
    pub use crate::report::{
        AbundanceLog, AbundanceTable, EnrichmentRow, OutputLayout, RankReport, ReportSink,
        TsvReportWriter, UniqueTaxon,
    };
    pub use crate::test::{
        binomial_test, chi2_contingency, kruskal_wallis, CountBasis, PairwisePValues,
        SignificanceConfig, SignificanceEngine, SignificanceResult, StatsMode, TaxonState,
        NOMINAL_ALPHA,
    };
}
