//! Pipeline runner: per-rank aggregation, testing, classification and reports.

use super::config::AnalysisConfig;
use crate::aggregate::{aggregate_counts, TaxonCountTable};
use crate::classify::{classify, EnrichmentLabel};
use crate::data::{median_log10, FeatureTable, TaxonomyTable, Zone};
use crate::error::Result;
use crate::lineage::{LineageNormalizer, TaxRank, TaxaSource};
use crate::normalize::CorrectionFactors;
use crate::report::{
    find_unique, sort_unique, AbundanceLog, AbundanceTable, EnrichmentRow, OutputLayout,
    RankReport, ReportSink, TaxonOutcome, TsvReportWriter,
};
use crate::test::{
    CountBasis, PassCounters, SignificanceConfig, SignificanceEngine, StatsMode, TaxonState,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Mutable state of one rank evaluation.
#[derive(Debug, Clone)]
pub struct RankContext {
    /// Rank being evaluated.
    pub rank: TaxRank,
    /// Criteria counters.
    pub counters: PassCounters,
    next_uid: usize,
}

impl RankContext {
    /// Fresh context for a rank.
    pub fn new(rank: TaxRank) -> Self {
        Self {
            rank,
            counters: PassCounters::default(),
            next_uid: 0,
        }
    }

    /// Take the next sequence number for a passed taxon.
    pub fn next_uid(&mut self) -> usize {
        let uid = self.next_uid;
        self.next_uid += 1;
        uid
    }
}

/// Summary of one rank of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankSummary {
    pub rank: TaxRank,
    pub n_taxa: usize,
    pub n_passed: usize,
    pub n_enriched: usize,
    pub n_unique: usize,
    pub counters: PassCounters,
    /// Files written for the rank.
    pub files: Vec<PathBuf>,
}

/// Summary of a full run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Depth correction shared by all ranks.
    pub factors: CorrectionFactors,
    /// One entry per evaluated rank.
    pub ranks: Vec<RankSummary>,
}

impl RunSummary {
    /// Total number of files written.
    pub fn n_files(&self) -> usize {
        self.ranks.iter().map(|r| r.files.len()).sum()
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Run Summary")?;
        writeln!(f, "  Global minimum depth: {:.0}", self.factors.global_min)?;
        writeln!(
            f,
            "  {:<10} {:>8} {:>8} {:>8} {:>8}",
            "rank", "taxa", "passed", "enriched", "unique"
        )?;
        for r in &self.ranks {
            writeln!(
                f,
                "  {:<10} {:>8} {:>8} {:>8} {:>8}",
                r.rank.name(),
                r.n_taxa,
                r.n_passed,
                r.n_enriched,
                r.n_unique
            )?;
        }
        write!(f, "  Files written: {}", self.n_files())
    }
}

/// Builder for configuring and running a zonal analysis.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: AnalysisConfig,
}

impl Pipeline {
    /// Create a pipeline with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a config.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Convert to config for serialization.
    pub fn to_config(&self) -> AnalysisConfig {
        self.config.clone()
    }

    /// Set the run name.
    pub fn name(mut self, name: &str) -> Self {
        self.config.name = name.to_string();
        self
    }

    /// Set the taxonomy vocabulary.
    pub fn taxa_source(mut self, source: TaxaSource) -> Self {
        self.config.taxa_source = source;
        self
    }

    /// Replace all significance thresholds.
    pub fn significance(mut self, significance: SignificanceConfig) -> Self {
        self.config.significance = significance;
        self
    }

    /// Test with Kruskal-Wallis instead of chi-square.
    pub fn kruskal_wallis(mut self) -> Self {
        self.config.significance.mode = StatsMode::KruskalWallis;
        self
    }

    /// Set the p-value threshold.
    pub fn pval_threshold(mut self, threshold: f64) -> Self {
        self.config.significance.pval_threshold = threshold;
        self
    }

    /// Set the minimum relative fold change.
    pub fn pct_effect_size(mut self, pct: f64) -> Self {
        self.config.significance.pct_effect_size = pct;
        self
    }

    /// Restrict the ranks evaluated.
    pub fn ranks(mut self, ranks: &[TaxRank]) -> Self {
        self.config.ranks = ranks.to_vec();
        self
    }

    /// Set the abundance log threshold.
    pub fn abundance_pct_threshold(mut self, pct: f64) -> Self {
        self.config.abundance_pct_threshold = pct;
        self
    }

    /// Normalizer for the configured taxonomy vocabulary.
    pub fn normalizer(&self) -> Result<LineageNormalizer> {
        LineageNormalizer::new(self.config.taxa_source)
    }

    /// Run every selected rank and hand each report to `sink`.
    ///
    /// Depth correction is derived once. A replicate without counts fails the
    /// run before any report is produced.
    pub fn run<S>(
        &self,
        features: &FeatureTable,
        taxonomy: &TaxonomyTable,
        sink: &mut S,
    ) -> Result<RunSummary>
    where
        S: ReportSink + ?Sized,
    {
        self.config.validate()?;
        let engine = SignificanceEngine::new(self.config.significance.clone())?;
        let factors = CorrectionFactors::from_feature_table(features)?;
        log::info!(
            "Depth correction: global minimum {:.0} ({} mode)",
            factors.global_min,
            engine.config().mode
        );

        let mut ranks = Vec::new();
        for rank in self.config.ordered_ranks() {
            let report = self.run_rank(rank, features, taxonomy, &factors, &engine)?;
            let files = sink.write_rank(&report)?;
            ranks.push(RankSummary {
                rank,
                n_taxa: report.counts.len(),
                n_passed: report.n_passed(),
                n_enriched: report.enrichment.len(),
                n_unique: report.unique.len(),
                counters: report.counters,
                files,
            });
        }

        Ok(RunSummary { factors, ranks })
    }

    /// Build the complete report of one rank in memory.
    pub fn run_rank(
        &self,
        rank: TaxRank,
        features: &FeatureTable,
        taxonomy: &TaxonomyTable,
        factors: &CorrectionFactors,
        engine: &SignificanceEngine,
    ) -> Result<RankReport> {
        let membership = taxonomy.membership_at(rank);
        log::info!(
            "Rank {}: {} taxa from {} features",
            rank,
            membership.len(),
            membership.n_memberships()
        );

        let counts = aggregate_counts(&membership, features, factors);
        if counts.missing_features > 0 {
            log::info!(
                "Rank {}: {} taxonomy members have no counts",
                rank,
                counts.missing_features
            );
        }

        let mut ctx = RankContext::new(rank);
        let (outcomes, enrichment, unique) = evaluate_taxa(&counts, engine, &mut ctx)?;

        let significance = engine.config();
        let pct = self.config.abundance_pct_threshold;
        let report = RankReport {
            rank,
            raw_abundance: AbundanceTable::build(&counts, CountBasis::Raw, significance)?,
            normalized_abundance: AbundanceTable::build(
                &counts,
                CountBasis::Corrected,
                significance,
            )?,
            raw_log: AbundanceLog::build(&counts, CountBasis::Raw, pct),
            normalized_log: AbundanceLog::build(&counts, CountBasis::Corrected, pct),
            counts,
            outcomes,
            enrichment,
            unique,
            counters: ctx.counters,
        };

        log::info!(
            "Rank {} done: {} passed, {} enriched, {} unique [{}]",
            rank,
            report.n_passed(),
            report.enrichment.len(),
            report.unique.len(),
            report.counters
        );
        Ok(report)
    }
}

type Evaluated = (
    Vec<TaxonOutcome>,
    Vec<EnrichmentRow>,
    Vec<crate::report::UniqueTaxon>,
);

/// Test, classify and screen every taxon of a rank, in taxon order.
fn evaluate_taxa(
    counts: &TaxonCountTable,
    engine: &SignificanceEngine,
    ctx: &mut RankContext,
) -> Result<Evaluated> {
    let zone_totals = counts.corrected_zone_totals();
    let mut outcomes = Vec::with_capacity(counts.len());
    let mut enrichment = Vec::new();
    let mut unique = Vec::new();

    for taxon in counts.iter() {
        let result = engine.evaluate(taxon, zone_totals, &mut ctx.counters)?;

        if result.state != TaxonState::Skipped {
            unique.extend(find_unique(taxon));
        }

        let label = if result.passed() {
            ctx.counters.figure += 1;
            let medians = Zone::ALL.map(|z| median_log10(&taxon.corrected.zone(z)));
            let label = classify(&result.pairwise, medians);
            // Every passed taxon consumes a uid, listed or not
            let uid = ctx.next_uid();
            if label.is_directional() {
                enrichment.push(EnrichmentRow {
                    taxon: taxon.taxon.clone(),
                    uid,
                    pval: result.omnibus_p,
                    medians,
                    pairwise: result.pairwise,
                    label,
                });
            }
            label
        } else {
            EnrichmentLabel::Unclassified
        };

        outcomes.push(TaxonOutcome { result, label });
    }

    sort_unique(&mut unique);
    Ok((outcomes, enrichment, unique))
}

/// Parse both inputs and run the analysis, writing TSV reports next to `output`.
///
/// Both files are parsed before any rank runs.
pub fn run_files(
    feature_table: &Path,
    taxonomy: &Path,
    output: &Path,
    config: &AnalysisConfig,
) -> Result<RunSummary> {
    config.validate()?;
    let layout = OutputLayout::from_stem(output)?;
    let pipeline = Pipeline::from_config(config);

    let features = FeatureTable::from_tsv(feature_table)?;
    let normalizer = pipeline.normalizer()?;
    let lineages = TaxonomyTable::from_tsv(taxonomy, &normalizer)?;
    if !lineages.duplicates().is_empty() {
        log::warn!(
            "{} duplicate feature ids in {}, last entry kept",
            lineages.duplicates().len(),
            taxonomy.display()
        );
    }

    let mut writer = TsvReportWriter::new(layout);
    pipeline.run(&features, &lineages, &mut writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every replicate totals 1000, so depth correction is the identity
    fn features() -> FeatureTable {
        FeatureTable::from_rows(vec![
            (
                "skew".to_string(),
                [400.0, 300.0, 300.0, 4.0, 3.0, 3.0, 3.0, 4.0, 3.0],
            ),
            ("flat".to_string(), [150.0; 9]),
            (
                "unassigned".to_string(),
                [450.0, 550.0, 550.0, 846.0, 847.0, 847.0, 847.0, 846.0, 847.0],
            ),
        ])
        .unwrap()
    }

    fn taxonomy() -> TaxonomyTable {
        let mut table = TaxonomyTable::new();
        table.insert("skew".to_string(), "Bacteria_Skewed".to_string());
        table.insert("flat".to_string(), "Bacteria_Flat".to_string());
        table
    }

    #[test]
    fn test_rank_context_uid() {
        let mut ctx = RankContext::new(TaxRank::Genus);
        assert_eq!(ctx.next_uid(), 0);
        assert_eq!(ctx.next_uid(), 1);
        assert_eq!(ctx.counters, PassCounters::default());
    }

    #[test]
    fn test_pipeline_builder() {
        let pipeline = Pipeline::new()
            .name("shore")
            .taxa_source(TaxaSource::Greengenes)
            .kruskal_wallis()
            .pval_threshold(0.01)
            .ranks(&[TaxRank::Phylum]);
        let config = pipeline.to_config();
        assert_eq!(config.name, "shore");
        assert_eq!(config.significance.mode, StatsMode::KruskalWallis);
        assert_eq!(config.significance.pval_threshold, 0.01);
        assert_eq!(config.ranks, vec![TaxRank::Phylum]);
    }

    #[test]
    fn test_run_collects_reports() {
        let mut reports: Vec<RankReport> = Vec::new();
        let summary = Pipeline::new()
            .ranks(&[TaxRank::Kingdom, TaxRank::Phylum])
            .run(&features(), &taxonomy(), &mut reports)
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].rank, TaxRank::Phylum);
        assert_eq!(reports[1].rank, TaxRank::Kingdom);
        assert_eq!(summary.n_files(), 0);

        let phylum = &reports[0];
        assert_eq!(phylum.counts.len(), 2);
        assert_eq!(phylum.label("Bacteria_Skewed"), Some(EnrichmentLabel::SubHigh));
        assert_eq!(phylum.label("Bacteria_Flat"), Some(EnrichmentLabel::Unclassified));
        assert_eq!(phylum.enrichment.len(), 1);
        assert_eq!(phylum.enrichment[0].uid, 0);
        assert_eq!(phylum.counters.figure, phylum.n_passed());
    }

    #[test]
    fn test_zero_depth_fails_before_reports() {
        let broken = FeatureTable::from_rows(vec![(
            "skew".to_string(),
            [400.0, 300.0, 300.0, 4.0, 3.0, 3.0, 0.0, 0.0, 0.0],
        )])
        .unwrap();
        let mut reports: Vec<RankReport> = Vec::new();
        let result = Pipeline::new().run(&broken, &taxonomy(), &mut reports);
        assert!(matches!(
            result,
            Err(crate::error::ZonalError::ZeroDepthReplicate { .. })
        ));
        assert!(reports.is_empty());
    }
}
