//! Analysis configuration.

use crate::error::{Result, ZonalError};
use crate::lineage::{TaxRank, TaxaSource};
use crate::test::SignificanceConfig;
use serde::{Deserialize, Serialize};

/// Configuration of a full analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Name of the run.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Taxonomy vocabulary of the lineage file.
    pub taxa_source: TaxaSource,
    /// Significance engine thresholds.
    pub significance: SignificanceConfig,
    /// Ranks to evaluate. Always run from species to kingdom.
    pub ranks: Vec<TaxRank>,
    /// Fraction of a zone total a taxon must reach to enter the abundance logs.
    pub abundance_pct_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            name: "zonal".to_string(),
            description: None,
            taxa_source: TaxaSource::Silva,
            significance: SignificanceConfig::default(),
            ranks: TaxRank::DESCENDING.to_vec(),
            abundance_pct_threshold: 0.01,
        }
    }
}

impl AnalysisConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(ZonalError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ZonalError::from)
    }

    /// Check parameters before a run.
    pub fn validate(&self) -> Result<()> {
        self.significance.validate()?;
        if self.ranks.is_empty() {
            return Err(ZonalError::InvalidParameter(
                "At least one rank must be selected".to_string(),
            ));
        }
        if !(self.abundance_pct_threshold > 0.0 && self.abundance_pct_threshold <= 1.0) {
            return Err(ZonalError::InvalidParameter(format!(
                "abundance_pct_threshold must be in (0, 1], got {}",
                self.abundance_pct_threshold
            )));
        }
        Ok(())
    }

    /// Selected ranks in evaluation order, without repeats.
    pub fn ordered_ranks(&self) -> Vec<TaxRank> {
        TaxRank::DESCENDING
            .into_iter()
            .filter(|r| self.ranks.contains(r))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::StatsMode;

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = AnalysisConfig::default();
        config.taxa_source = TaxaSource::Greengenes;
        config.significance.mode = StatsMode::KruskalWallis;
        config.ranks = vec![TaxRank::Genus, TaxRank::Phylum];

        let yaml = config.to_yaml().unwrap();
        let loaded = AnalysisConfig::from_yaml(&yaml).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "taxa_source: greengenes\nsignificance:\n  pval_threshold: 0.01\n";
        let config = AnalysisConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.taxa_source, TaxaSource::Greengenes);
        assert_eq!(config.significance.pval_threshold, 0.01);
        assert_eq!(config.significance.pct_effect_size, 0.05);
        assert_eq!(config.ranks.len(), 7);
    }

    #[test]
    fn test_ordered_ranks() {
        let config = AnalysisConfig {
            ranks: vec![TaxRank::Kingdom, TaxRank::Genus, TaxRank::Kingdom],
            ..Default::default()
        };
        assert_eq!(config.ordered_ranks(), vec![TaxRank::Genus, TaxRank::Kingdom]);
    }

    #[test]
    fn test_validate() {
        assert!(AnalysisConfig::default().validate().is_ok());
        let no_ranks = AnalysisConfig {
            ranks: vec![],
            ..Default::default()
        };
        assert!(no_ranks.validate().is_err());
        let bad_pct = AnalysisConfig {
            abundance_pct_threshold: 0.0,
            ..Default::default()
        };
        assert!(bad_pct.validate().is_err());
    }
}
