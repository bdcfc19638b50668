//! Feature count table with sparse storage.

use super::zone::{ZoneCounts, N_COUNT_COLUMNS};
use crate::error::{Result, ZonalError};
use sprs::{CsMat, TriMat};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A sparse table of feature counts across the nine zone replicates.
///
/// Rows are features (OTUs/ASVs), columns are Sub1..3, Inter1..3, Supra1..3.
/// Stored as CSR since most features are absent from most replicates.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    /// Sparse matrix in CSR format (features × 9).
    data: CsMat<f64>,
    /// Feature identifiers (row names).
    feature_ids: Vec<String>,
    /// Row lookup by feature identifier.
    index: HashMap<String, usize>,
}

impl FeatureTable {
    /// Create a table from a sparse matrix and identifiers.
    ///
    /// Duplicate identifiers resolve to the last row carrying them.
    pub fn new(data: CsMat<f64>, feature_ids: Vec<String>) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if ncols != N_COUNT_COLUMNS {
            return Err(ZonalError::InvalidParameter(format!(
                "Feature table must have {} count columns, got {}",
                N_COUNT_COLUMNS, ncols
            )));
        }
        if nrows != feature_ids.len() {
            return Err(ZonalError::InvalidParameter(format!(
                "{} rows but {} feature identifiers",
                nrows,
                feature_ids.len()
            )));
        }

        let mut index = HashMap::with_capacity(feature_ids.len());
        for (row, id) in feature_ids.iter().enumerate() {
            if index.insert(id.clone(), row).is_some() {
                log::warn!("Feature '{}' appears more than once in the count table", id);
            }
        }

        Ok(Self {
            data,
            feature_ids,
            index,
        })
    }

    /// Build a table from dense per-feature rows.
    pub fn from_rows(rows: Vec<(String, [f64; N_COUNT_COLUMNS])>) -> Result<Self> {
        let mut tri_mat = TriMat::new((rows.len(), N_COUNT_COLUMNS));
        let mut feature_ids = Vec::with_capacity(rows.len());
        for (row, (id, values)) in rows.into_iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if value != 0.0 {
                    tri_mat.add_triplet(row, col, value);
                }
            }
            feature_ids.push(id);
        }
        Self::new(tri_mat.to_csr(), feature_ids)
    }

    /// Load a count table from a tab-separated file.
    ///
    /// Expected format:
    /// - Comment lines (`#...`) and the `Feature ID` header are skipped
    /// - Data rows: feature ID followed by nine counts
    ///   (Sub1, Sub2, Sub3, Inter1, Inter2, Inter3, Supra1, Supra2, Supra3)
    /// - Columns past the ninth count are ignored
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = open_input(path)?;
        let reader = BufReader::new(file);

        let mut triplets: Vec<(usize, usize, f64)> = Vec::new();
        let mut feature_ids: Vec<String> = Vec::new();

        for (line_idx, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let row_number = line_idx + 1;
            if line.starts_with('#') || line.contains("Feature ID") || line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
            if fields.len() < N_COUNT_COLUMNS + 1 {
                return Err(ZonalError::MalformedRow {
                    file: path.to_path_buf(),
                    row: row_number,
                    reason: format!(
                        "expected a feature ID and {} counts, found {} fields",
                        N_COUNT_COLUMNS,
                        fields.len()
                    ),
                });
            }

            let row_idx = feature_ids.len();
            feature_ids.push(fields[0].trim().to_string());

            for (col_idx, value_str) in fields[1..=N_COUNT_COLUMNS].iter().enumerate() {
                let value: f64 = value_str.trim().parse().map_err(|_| ZonalError::InvalidCount {
                    file: path.to_path_buf(),
                    value: value_str.to_string(),
                    row: row_number,
                    col: col_idx + 1,
                })?;
                if !value.is_finite() || value < 0.0 {
                    return Err(ZonalError::InvalidCount {
                        file: path.to_path_buf(),
                        value: value_str.to_string(),
                        row: row_number,
                        col: col_idx + 1,
                    });
                }
                if value > 0.0 {
                    triplets.push((row_idx, col_idx, value));
                }
            }
        }

        let n_features = feature_ids.len();
        if n_features == 0 {
            return Err(ZonalError::EmptyData(format!(
                "No features in count table {}",
                path.display()
            )));
        }

        let mut tri_mat = TriMat::new((n_features, N_COUNT_COLUMNS));
        for (row, col, val) in triplets {
            tri_mat.add_triplet(row, col, val);
        }

        log::info!("Loaded {} features from {}", n_features, path.display());
        Self::new(tri_mat.to_csr(), feature_ids)
    }

    /// Get the value at (row, col), returning 0 for missing entries.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data.get(row, col).copied().unwrap_or(0.0)
    }

    /// Number of features (rows).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.data.rows()
    }

    /// Feature identifiers in file order.
    #[inline]
    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    /// Whether a feature is present.
    pub fn contains(&self, feature_id: &str) -> bool {
        self.index.contains_key(feature_id)
    }

    /// Dense counts for a row.
    pub fn row_dense(&self, row: usize) -> [f64; N_COUNT_COLUMNS] {
        let mut dense = [0.0; N_COUNT_COLUMNS];
        if let Some(row_vec) = self.data.outer_view(row) {
            for (col, &val) in row_vec.iter() {
                dense[col] = val;
            }
        }
        dense
    }

    /// Zone counts of a feature by identifier.
    pub fn counts(&self, feature_id: &str) -> Option<ZoneCounts> {
        self.index
            .get(feature_id)
            .map(|&row| ZoneCounts::from_columns(&self.row_dense(row)))
    }

    /// Total counts per replicate column (sequencing depth).
    ///
    /// Only the row that wins a duplicated identifier contributes.
    pub fn replicate_totals(&self) -> ZoneCounts {
        let mut sums = [0.0; N_COUNT_COLUMNS];
        for (row, row_vec) in self.data.outer_iterator().enumerate() {
            if self.index.get(&self.feature_ids[row]) != Some(&row) {
                continue;
            }
            for (col, &val) in row_vec.iter() {
                sums[col] += val;
            }
        }
        ZoneCounts::from_columns(&sums)
    }
}

/// Open an input file, mapping a missing file to [`ZonalError::MissingInput`].
pub(crate) fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ZonalError::MissingInput {
            path: PathBuf::from(path),
        },
        _ => ZonalError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Zone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_table() -> FeatureTable {
        FeatureTable::from_rows(vec![
            ("otu_a".to_string(), [10.0, 20.0, 0.0, 5.0, 5.0, 5.0, 1.0, 0.0, 0.0]),
            ("otu_b".to_string(), [100.0, 200.0, 150.0, 0.0, 0.0, 0.0, 2.0, 2.0, 2.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_dimensions_and_lookup() {
        let table = create_test_table();
        assert_eq!(table.n_features(), 2);
        assert!(table.contains("otu_b"));
        assert!(!table.contains("otu_z"));
        assert_eq!(table.get(0, 2), 0.0);
        assert_eq!(table.get(1, 1), 200.0);

        let counts = table.counts("otu_a").unwrap();
        assert_eq!(counts.zone_sum(Zone::Sub), 30.0);
        assert_eq!(counts.zone_sum(Zone::Supra), 1.0);
    }

    #[test]
    fn test_replicate_totals() {
        let table = create_test_table();
        let totals = table.replicate_totals();
        assert_eq!(
            totals.to_columns(),
            [110.0, 220.0, 150.0, 5.0, 5.0, 5.0, 3.0, 2.0, 2.0]
        );
    }

    #[test]
    fn test_load_biom_tsv() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# Constructed from biom file").unwrap();
        writeln!(file, "#OTU ID\ts1\ts2\ts3\ti1\ti2\ti3\tu1\tu2\tu3").unwrap();
        writeln!(file, "otu_1\t1.0\t2.0\t3.0\t4.0\t5.0\t6.0\t7.0\t8.0\t9.0").unwrap();
        writeln!(file, "otu_2\t0\t0\t0\t1\t1\t1\t0\t0\t0\textra").unwrap();
        file.flush().unwrap();

        let table = FeatureTable::from_tsv(file.path()).unwrap();
        assert_eq!(table.n_features(), 2);
        assert_eq!(table.feature_ids(), &["otu_1", "otu_2"]);
        assert_eq!(table.counts("otu_1").unwrap().total(), 45.0);
        assert_eq!(table.counts("otu_2").unwrap().zone_sum(Zone::Inter), 3.0);
    }

    #[test]
    fn test_short_row_is_malformed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "otu_1\t1\t2\t3").unwrap();
        file.flush().unwrap();

        match FeatureTable::from_tsv(file.path()) {
            Err(ZonalError::MalformedRow { row, .. }) => assert_eq!(row, 1),
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_count() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "#header").unwrap();
        writeln!(file, "otu_1\t1\t2\t3\t4\tfive\t6\t7\t8\t9").unwrap();
        file.flush().unwrap();

        match FeatureTable::from_tsv(file.path()) {
            Err(ZonalError::InvalidCount { row, col, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(col, 5);
                assert_eq!(value, "five");
            }
            other => panic!("expected InvalidCount, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = FeatureTable::from_tsv("/nonexistent/feature-table.tsv");
        assert!(matches!(result, Err(ZonalError::MissingInput { .. })));
    }
}
