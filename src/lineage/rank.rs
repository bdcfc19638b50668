//! Taxonomic ranks.

use crate::error::{Result, ZonalError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Taxonomic ranks from kingdom down to species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxRank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl TaxRank {
    /// Evaluation order of a full run: species first, kingdom last.
    pub const DESCENDING: [TaxRank; 7] = [
        TaxRank::Species,
        TaxRank::Genus,
        TaxRank::Family,
        TaxRank::Order,
        TaxRank::Class,
        TaxRank::Phylum,
        TaxRank::Kingdom,
    ];

    /// Zero-based depth (Kingdom=0, Species=6).
    ///
    /// A lineage qualifies at this rank when it has at least `depth()` joining
    /// characters, i.e. `depth() + 1` labels.
    pub const fn depth(self) -> usize {
        match self {
            TaxRank::Kingdom => 0,
            TaxRank::Phylum => 1,
            TaxRank::Class => 2,
            TaxRank::Order => 3,
            TaxRank::Family => 4,
            TaxRank::Genus => 5,
            TaxRank::Species => 6,
        }
    }

    /// Lowercase name used in output file names.
    pub const fn name(self) -> &'static str {
        match self {
            TaxRank::Kingdom => "kingdom",
            TaxRank::Phylum => "phylum",
            TaxRank::Class => "class",
            TaxRank::Order => "order",
            TaxRank::Family => "family",
            TaxRank::Genus => "genus",
            TaxRank::Species => "species",
        }
    }
}

impl std::fmt::Display for TaxRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaxRank {
    type Err = ZonalError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        TaxRank::DESCENDING
            .iter()
            .copied()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| ZonalError::InvalidParameter(format!("Unknown taxonomic rank '{}'", s)))
    }
}

/// Parse a comma-separated rank list such as `"genus,family"`.
pub fn parse_rank_list(s: &str) -> Result<Vec<TaxRank>> {
    s.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(TaxRank::from_str)
        .collect()
}
