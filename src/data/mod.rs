//! Data structures for zone-wise differential abundance analysis.

mod feature_table;
mod taxonomy;
pub mod zone;

pub use feature_table::FeatureTable;
pub use taxonomy::{LineageEntry, TaxonomyTable};
pub use zone::{
    log10_floor_fraction, log10_or_zero, median_log10, Zone, ZoneCounts, ZonePair, N_COUNT_COLUMNS,
    N_REPLICATES,
};
