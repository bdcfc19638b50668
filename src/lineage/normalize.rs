//! Lineage string normalization.
//!
//! Raw lineages from QIIME-style taxonomy files look like
//! `D_0__Bacteria;D_1__Proteobacteria;D_2__Gammaproteobacteria` (SILVA) or
//! `k__Bacteria; p__Proteobacteria; c__Gammaproteobacteria` (Greengenes).
//! Normalization strips the rank prefixes of the configured source and joins
//! the labels with [`JOIN`], giving keys such as
//! `Bacteria_Proteobacteria_Gammaproteobacteria`.

use super::rank::TaxRank;
use crate::error::{Result, ZonalError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Separator between ranks in raw lineage strings.
pub const SEPARATOR: char = ';';

/// Joining character of normalized taxon keys.
pub const JOIN: char = '_';

/// Taxonomy vocabulary that decides which rank prefixes get stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxaSource {
    /// SILVA, prefixes `D_0__` through `D_14__`.
    #[default]
    Silva,
    /// Greengenes, prefixes `k__` through `s__`.
    Greengenes,
}

impl TaxaSource {
    /// Rank-prefix tokens of this vocabulary.
    pub fn prefixes(self) -> Vec<String> {
        match self {
            TaxaSource::Silva => (0..=14).map(|i| format!("D_{}__", i)).collect(),
            TaxaSource::Greengenes => ["k__", "p__", "c__", "o__", "f__", "g__", "s__"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl FromStr for TaxaSource {
    type Err = ZonalError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        if lower == "silva" || lower == "s" {
            Ok(TaxaSource::Silva)
        } else if lower.contains("green") || lower == "gg" {
            Ok(TaxaSource::Greengenes)
        } else {
            Err(ZonalError::InvalidParameter(format!(
                "Unknown taxa source '{}', expected 'silva' or 'greengenes'",
                s
            )))
        }
    }
}

impl std::fmt::Display for TaxaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaxaSource::Silva => f.write_str("silva"),
            TaxaSource::Greengenes => f.write_str("greengenes"),
        }
    }
}

/// Strips rank prefixes and joins lineage labels into canonical keys.
#[derive(Debug, Clone)]
pub struct LineageNormalizer {
    source: TaxaSource,
    prefix_pattern: Regex,
    leftover_pattern: Regex,
}

impl LineageNormalizer {
    /// Build a normalizer for a taxonomy source.
    pub fn new(source: TaxaSource) -> Result<Self> {
        let alternation = source
            .prefixes()
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let prefix_pattern = Regex::new(&alternation).map_err(|e| {
            ZonalError::InvalidParameter(format!("Bad prefix pattern for {}: {}", source, e))
        })?;
        // Any SILVA or Greengenes style prefix at the start of a label
        let leftover_pattern = Regex::new(r"^(?:D_\d+__|[kpcofgs]__)").map_err(|e| {
            ZonalError::InvalidParameter(format!("Bad leftover prefix pattern: {}", e))
        })?;
        Ok(Self {
            source,
            prefix_pattern,
            leftover_pattern,
        })
    }

    /// Normalize a raw lineage string.
    ///
    /// Returns an empty string when nothing but prefixes and separators remain.
    pub fn normalize(&self, raw: &str) -> String {
        let unquoted = raw.replace('"', "");
        let stripped = self.prefix_pattern.replace_all(unquoted.trim(), "");
        let labels = stripped
            .split(SEPARATOR)
            .map(str::trim)
            .collect::<Vec<_>>();
        if let Some(label) = self.leftover_prefix(&labels) {
            log::warn!(
                "Lineage '{}' has label '{}' with a prefix not stripped for {}",
                raw.trim(),
                label,
                self.source
            );
        }
        labels.join(&JOIN.to_string()).trim_matches(JOIN).to_string()
    }

    /// First label that still starts with a rank prefix after stripping.
    fn leftover_prefix<'a>(&self, labels: &[&'a str]) -> Option<&'a str> {
        labels
            .iter()
            .copied()
            .find(|label| self.leftover_pattern.is_match(label))
    }
}

/// Number of joining characters in a normalized lineage.
#[inline]
pub fn lineage_depth(normalized: &str) -> usize {
    normalized.matches(JOIN).count()
}

/// Taxon key of a normalized lineage at `rank`.
///
/// `None` when the lineage is empty or too shallow for the rank. Deeper
/// lineages are cut to `rank.depth() + 1` labels.
pub fn taxon_key(normalized: &str, rank: TaxRank) -> Option<String> {
    if normalized.is_empty() {
        return None;
    }
    let depth = lineage_depth(normalized);
    let target = rank.depth();
    if depth < target {
        return None;
    }
    if depth == target {
        return Some(normalized.to_string());
    }

    let truncated = normalized
        .split(JOIN)
        .take(target + 1)
        .collect::<Vec<_>>()
        .join(&JOIN.to_string());
    let key = truncated.trim_end_matches(JOIN);
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}
