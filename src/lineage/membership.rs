//! Taxon-to-feature membership at a single rank.

use super::rank::TaxRank;
use std::collections::HashMap;

/// Features grouped by taxon key, in order of first appearance.
#[derive(Debug, Clone)]
pub struct TaxonMembership {
    rank: TaxRank,
    taxa: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl TaxonMembership {
    /// Create an empty membership for a rank.
    pub fn new(rank: TaxRank) -> Self {
        Self {
            rank,
            taxa: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Rank the keys were cut at.
    pub fn rank(&self) -> TaxRank {
        self.rank
    }

    /// Register a feature under a taxon key.
    pub fn add(&mut self, taxon: String, feature_id: String) {
        match self.index.get(&taxon) {
            Some(&pos) => self.taxa[pos].1.push(feature_id),
            None => {
                self.index.insert(taxon.clone(), self.taxa.len());
                self.taxa.push((taxon, vec![feature_id]));
            }
        }
    }

    /// Number of taxa.
    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }

    /// Total number of feature memberships across taxa.
    pub fn n_memberships(&self) -> usize {
        self.taxa.iter().map(|(_, members)| members.len()).sum()
    }

    /// Taxon keys in order of first appearance.
    pub fn taxa(&self) -> impl Iterator<Item = &str> {
        self.taxa.iter().map(|(taxon, _)| taxon.as_str())
    }

    /// Member features of a taxon.
    pub fn members(&self, taxon: &str) -> Option<&[String]> {
        self.index.get(taxon).map(|&pos| self.taxa[pos].1.as_slice())
    }

    /// Iterate over (taxon, members) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.taxa
            .iter()
            .map(|(taxon, members)| (taxon.as_str(), members.as_slice()))
    }
}
