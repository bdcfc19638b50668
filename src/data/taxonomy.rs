//! Taxonomy assignments: one normalized lineage per feature.

use super::feature_table::open_input;
use crate::error::{Result, ZonalError};
use crate::lineage::{taxon_key, LineageNormalizer, TaxRank, TaxonMembership};
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A feature's normalized lineage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageEntry {
    /// Feature identifier.
    pub feature_id: String,
    /// Normalized lineage (labels joined by `_`).
    pub lineage: String,
}

/// Parsed taxonomy file.
///
/// Lineages are normalized once at load time; each rank evaluation then takes
/// a view through [`TaxonomyTable::membership_at`].
#[derive(Debug, Clone, Default)]
pub struct TaxonomyTable {
    entries: Vec<LineageEntry>,
    index: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl TaxonomyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a feature's lineage.
    ///
    /// A repeated feature keeps its original position but takes the new
    /// lineage; the identifier is recorded in [`duplicates`](Self::duplicates).
    pub fn insert(&mut self, feature_id: String, lineage: String) {
        match self.index.get(&feature_id) {
            Some(&pos) => {
                log::warn!(
                    "Duplicate feature '{}' in taxonomy, keeping the last assignment",
                    feature_id
                );
                self.duplicates.push(feature_id);
                self.entries[pos].lineage = lineage;
            }
            None => {
                self.index.insert(feature_id.clone(), self.entries.len());
                self.entries.push(LineageEntry {
                    feature_id,
                    lineage,
                });
            }
        }
    }

    /// Load a QIIME-style taxonomy TSV (`feature_id<TAB>lineage[<TAB>confidence]`).
    pub fn from_tsv<P: AsRef<Path>>(path: P, normalizer: &LineageNormalizer) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(open_input(path)?);
        let mut table = Self::new();

        for (line_idx, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let line = line.replace('"', "");
            let fields: Vec<&str> = line.trim().split('\t').collect();
            if fields.len() < 2 {
                return Err(ZonalError::MalformedRow {
                    file: path.to_path_buf(),
                    row: line_idx + 1,
                    reason: "expected a feature ID and a lineage".to_string(),
                });
            }
            if fields[0] == "Feature ID" {
                continue;
            }
            table.insert(fields[0].trim().to_string(), normalizer.normalize(fields[1]));
        }

        log::info!(
            "Loaded {} lineages from {} ({} duplicate feature IDs)",
            table.len(),
            path.display(),
            table.duplicates.len()
        );
        Ok(table)
    }

    /// Number of distinct features with a lineage.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Feature identifiers that appeared more than once.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Taxon-to-feature membership at a rank.
    ///
    /// Features whose lineage is too shallow for the rank are left out.
    pub fn membership_at(&self, rank: TaxRank) -> TaxonMembership {
        let mut membership = TaxonMembership::new(rank);
        for entry in &self.entries {
            if let Some(key) = taxon_key(&entry.lineage, rank) {
                membership.add(key, entry.feature_id.clone());
            }
        }
        membership
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::TaxaSource;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn normalizer() -> LineageNormalizer {
        LineageNormalizer::new(TaxaSource::Silva).unwrap()
    }

    fn create_taxonomy_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Feature ID\tTaxon\tConfidence").unwrap();
        writeln!(file, "otu_1\tD_0__Bacteria;D_1__Firmicutes;D_2__Bacilli\t0.99").unwrap();
        writeln!(file, "otu_2\tD_0__Bacteria;D_1__Firmicutes;D_2__Clostridia\t0.95").unwrap();
        writeln!(file, "otu_3\t\"D_0__Bacteria;D_1__Bacteroidetes\"\t0.90").unwrap();
        writeln!(file, "otu_4\tD_0__Archaea\t0.80").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_taxonomy() {
        let file = create_taxonomy_file();
        let table = TaxonomyTable::from_tsv(file.path(), &normalizer()).unwrap();
        assert_eq!(table.len(), 4);
        let phylum = table.membership_at(TaxRank::Phylum);
        assert_eq!(phylum.members("Bacteria_Bacteroidetes"), Some(&["otu_3".to_string()][..]));
        assert!(table.duplicates().is_empty());
    }

    #[test]
    fn test_membership_at_ranks() {
        let file = create_taxonomy_file();
        let table = TaxonomyTable::from_tsv(file.path(), &normalizer()).unwrap();

        let phylum = table.membership_at(TaxRank::Phylum);
        assert_eq!(
            phylum.taxa().collect::<Vec<_>>(),
            vec!["Bacteria_Firmicutes", "Bacteria_Bacteroidetes"]
        );
        assert_eq!(
            phylum.members("Bacteria_Firmicutes"),
            Some(&["otu_1".to_string(), "otu_2".to_string()][..])
        );

        let kingdom = table.membership_at(TaxRank::Kingdom);
        assert_eq!(kingdom.len(), 2);
        assert_eq!(kingdom.members("Bacteria").map(|m| m.len()), Some(3));

        // Nothing reaches species depth.
        assert!(table.membership_at(TaxRank::Species).is_empty());
    }

    #[test]
    fn test_duplicate_feature_last_write_wins() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "otu_1\tD_0__Bacteria;D_1__Firmicutes").unwrap();
        writeln!(file, "otu_2\tD_0__Bacteria;D_1__Chloroflexi").unwrap();
        writeln!(file, "otu_1\tD_0__Bacteria;D_1__Actinobacteria").unwrap();
        file.flush().unwrap();

        let table = TaxonomyTable::from_tsv(file.path(), &normalizer()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.duplicates(), &["otu_1".to_string()]);

        let phylum = table.membership_at(TaxRank::Phylum);
        assert_eq!(phylum.members("Bacteria_Actinobacteria"), Some(&["otu_1".to_string()][..]));
        assert!(phylum.members("Bacteria_Firmicutes").is_none());
        assert_eq!(phylum.n_memberships(), 2);
    }

    #[test]
    fn test_malformed_row() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "otu_1\tD_0__Bacteria").unwrap();
        writeln!(file, "otu_2").unwrap();
        file.flush().unwrap();

        match TaxonomyTable::from_tsv(file.path(), &normalizer()) {
            Err(ZonalError::MalformedRow { row, file: f, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(f, file.path());
            }
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }
}
