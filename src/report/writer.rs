//! Tab-separated report files.

use super::{AbundanceLog, AbundanceTable, RankReport, ReportSink};
use crate::error::{Result, ZonalError};
use crate::lineage::TaxRank;
use crate::test::CountBasis;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File names of a run, derived from the output stem.
///
/// The counts file carries the stem. All other files are named by rank and go
/// into the stem's parent directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    dir: PathBuf,
    stem: String,
}

impl OutputLayout {
    /// Layout for an output stem such as `results/run1`.
    pub fn from_stem<P: AsRef<Path>>(stem: P) -> Result<Self> {
        let stem = stem.as_ref();
        let name = stem
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                ZonalError::InvalidParameter(format!(
                    "Output stem '{}' has no file name",
                    stem.display()
                ))
            })?;
        let dir = match stem.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self {
            dir,
            stem: name.to_string(),
        })
    }

    /// Directory the files are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<stem>_<rank>_counts.tsv`
    pub fn counts(&self, rank: TaxRank) -> PathBuf {
        self.dir.join(format!("{}_{}_counts.tsv", self.stem, rank))
    }

    /// `all_{unnormalized,normalized}_taxa_abundance_<rank>.tab`
    pub fn abundance(&self, basis: CountBasis, rank: TaxRank) -> PathBuf {
        let kind = match basis {
            CountBasis::Raw => "unnormalized",
            CountBasis::Corrected => "normalized",
        };
        self.dir
            .join(format!("all_{}_taxa_abundance_{}.tab", kind, rank))
    }

    /// `site_specific_<rank>_enrichment.tab`
    pub fn enrichment(&self, rank: TaxRank) -> PathBuf {
        self.dir
            .join(format!("site_specific_{}_enrichment.tab", rank))
    }

    /// `unique_<rank>.tab`
    pub fn unique(&self, rank: TaxRank) -> PathBuf {
        self.dir.join(format!("unique_{}.tab", rank))
    }

    /// `taxonomic_abundance_{un_normalized,normalized}_<pct>_<rank>.log`
    pub fn abundance_log(&self, basis: CountBasis, pct: f64, rank: TaxRank) -> PathBuf {
        let kind = match basis {
            CountBasis::Raw => "un_normalized",
            CountBasis::Corrected => "normalized",
        };
        self.dir
            .join(format!("taxonomic_abundance_{}_{}_{}.log", kind, pct, rank))
    }

    /// Every file written for a rank.
    pub fn rank_files(&self, rank: TaxRank, pct: f64) -> Vec<PathBuf> {
        vec![
            self.counts(rank),
            self.abundance(CountBasis::Raw, rank),
            self.abundance(CountBasis::Corrected, rank),
            self.enrichment(rank),
            self.unique(rank),
            self.abundance_log(CountBasis::Corrected, pct, rank),
            self.abundance_log(CountBasis::Raw, pct, rank),
        ]
    }
}

/// Writes rank reports as tab-separated files.
#[derive(Debug, Clone)]
pub struct TsvReportWriter {
    layout: OutputLayout,
}

impl TsvReportWriter {
    /// Create a writer for a layout.
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout }
    }

    fn write_counts(&self, report: &RankReport) -> Result<PathBuf> {
        let path = self.layout.counts(report.rank);
        let mut w = BufWriter::new(File::create(&path)?);
        writeln!(
            w,
            "#taxa\tsub1\tsub2\tsub3\tint1\tint2\tint3\tsup1\tsup2\tsup3"
        )?;
        for taxon in report.counts.iter() {
            write!(w, "{}", taxon.taxon)?;
            for value in taxon.raw.to_columns() {
                write!(w, "\t{}", value)?;
            }
            writeln!(w)?;
        }
        w.flush()?;
        Ok(path)
    }

    fn write_abundance(&self, rank: TaxRank, table: &AbundanceTable) -> Result<PathBuf> {
        let path = self.layout.abundance(table.basis, rank);
        let mut w = BufWriter::new(File::create(&path)?);
        writeln!(w, "taxa\tsub\tinter\tsup\tsub_bet\tint_bet\tsup_bet\tmin_pval")?;
        for row in &table.rows {
            let [sub, inter, sup] = row.zone_sums;
            write!(w, "{}\t{}\t{}\t{}", row.taxon, sub, inter, sup)?;
            match row.binomial {
                Some(p) => write!(w, "\t{}\t{}\t{}", p[0], p[1], p[2])?,
                None => write!(w, "\tNA\tNA\tNA")?,
            }
            writeln!(w, "\t{}", row.min_pval)?;
        }
        w.flush()?;
        Ok(path)
    }

    fn write_enrichment(&self, report: &RankReport) -> Result<PathBuf> {
        let path = self.layout.enrichment(report.rank);
        let mut w = BufWriter::new(File::create(&path)?);
        writeln!(
            w,
            "#taxa\tuid\tpval\tmedian_log_10_sub\tmedian_log_10_inter\tmedian_log_10_supra\tpval_sub_inter\tpval_sub_supra\tpval_inter_supra\tishow"
        )?;
        for row in &report.enrichment {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                row.taxon,
                row.uid,
                row.pval,
                row.medians[0],
                row.medians[1],
                row.medians[2],
                row.pairwise.sub_inter,
                row.pairwise.sub_supra,
                row.pairwise.inter_supra,
                row.label
            )?;
        }
        w.flush()?;
        Ok(path)
    }

    fn write_unique(&self, report: &RankReport) -> Result<PathBuf> {
        let path = self.layout.unique(report.rank);
        let mut w = BufWriter::new(File::create(&path)?);
        writeln!(
            w,
            "#taxa\tzones\tmean_log10_sub\tmean_log10_inter\tmean_log10_supra"
        )?;
        for taxon in &report.unique {
            let zones: Vec<&str> = taxon.zones.iter().map(|z| z.name()).collect();
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}",
                taxon.taxon,
                zones.join(","),
                taxon.mean_log10[0],
                taxon.mean_log10[1],
                taxon.mean_log10[2]
            )?;
        }
        w.flush()?;
        Ok(path)
    }

    fn write_log(&self, rank: TaxRank, log: &AbundanceLog) -> Result<PathBuf> {
        let path = self
            .layout
            .abundance_log(log.basis, log.pct_threshold, rank);
        let mut w = BufWriter::new(File::create(&path)?);
        writeln!(
            w,
            "taxa\tsub_log10_abundance\tint_log10_abundance\tsup_log10_abundance"
        )?;
        for row in &log.rows {
            let [sub, inter, sup] = row.log10_sums;
            writeln!(w, "{}\t{}\t{}\t{}", row.taxon, sub, inter, sup)?;
        }
        w.flush()?;
        Ok(path)
    }
}

impl ReportSink for TsvReportWriter {
    fn write_rank(&mut self, report: &RankReport) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(self.layout.dir())?;

        let written = vec![
            self.write_counts(report)?,
            self.write_abundance(report.rank, &report.raw_abundance)?,
            self.write_abundance(report.rank, &report.normalized_abundance)?,
            self.write_enrichment(report)?,
            self.write_unique(report)?,
            self.write_log(report.rank, &report.normalized_log)?,
            self.write_log(report.rank, &report.raw_log)?,
        ];
        for path in &written {
            log::info!("Wrote {}", path.display());
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_stem() {
        let layout = OutputLayout::from_stem("results/run1").unwrap();
        assert_eq!(layout.dir(), Path::new("results"));
        assert_eq!(
            layout.counts(TaxRank::Genus),
            PathBuf::from("results/run1_genus_counts.tsv")
        );
        assert_eq!(
            layout.abundance(CountBasis::Raw, TaxRank::Family),
            PathBuf::from("results/all_unnormalized_taxa_abundance_family.tab")
        );
        assert_eq!(
            layout.abundance_log(CountBasis::Corrected, 0.01, TaxRank::Class),
            PathBuf::from("results/taxonomic_abundance_normalized_0.01_class.log")
        );
    }

    #[test]
    fn test_bare_stem_uses_current_dir() {
        let layout = OutputLayout::from_stem("run1").unwrap();
        assert_eq!(layout.dir(), Path::new("."));
        assert_eq!(
            layout.enrichment(TaxRank::Species),
            PathBuf::from("./site_specific_species_enrichment.tab")
        );
    }

    #[test]
    fn test_empty_stem_rejected() {
        assert!(OutputLayout::from_stem("").is_err());
        assert!(OutputLayout::from_stem("results/..").is_err());
    }

    #[test]
    fn test_rank_files_distinct() {
        let layout = OutputLayout::from_stem("out/x").unwrap();
        let mut files = layout.rank_files(TaxRank::Order, 0.01);
        files.extend(layout.rank_files(TaxRank::Class, 0.01));
        let n = files.len();
        files.sort();
        files.dedup();
        assert_eq!(files.len(), n);
    }
}
