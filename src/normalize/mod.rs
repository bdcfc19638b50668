//! Depth normalization of zone replicate counts.

pub mod depth;

pub use depth::CorrectionFactors;
