//! Lineage normalization and rank-indexed taxon membership.

mod membership;
pub mod normalize;
pub mod rank;

pub use membership::TaxonMembership;
pub use normalize::{lineage_depth, taxon_key, LineageNormalizer, TaxaSource, JOIN, SEPARATOR};
pub use rank::{parse_rank_list, TaxRank};
