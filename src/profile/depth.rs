//! Sequencing depth profiling of the nine zone replicates.

use crate::data::{FeatureTable, Zone, N_REPLICATES};
use crate::normalize::CorrectionFactors;
use serde::{Deserialize, Serialize};

/// A zone replicate, 1-based as in the count table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicateId {
    pub zone: Zone,
    pub replicate: usize,
}

impl std::fmt::Display for ReplicateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.zone, self.replicate)
    }
}

/// Depth characteristics of a feature table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthProfile {
    /// Number of features.
    pub n_features: usize,
    /// Total count per replicate, in count-table column order.
    pub replicate_totals: [f64; 9],
    /// Mean replicate total.
    pub mean: f64,
    /// Smallest replicate total.
    pub min: f64,
    /// Largest replicate total.
    pub max: f64,
    /// Coefficient of variation (std_dev / mean).
    pub cv: f64,
    /// Log2 fold change between max and min.
    pub log2_fold_range: f64,
    /// Replicate with the smallest total.
    pub limiting: ReplicateId,
    /// Replicates without any counts.
    pub empty_replicates: Vec<ReplicateId>,
    /// Depth correction factors, absent when a replicate is empty.
    pub factors: Option<CorrectionFactors>,
}

impl DepthProfile {
    /// Whether depth correction can be applied.
    pub fn is_correctable(&self) -> bool {
        self.factors.is_some()
    }
}

impl std::fmt::Display for DepthProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Depth Profile")?;
        writeln!(f, "  Features: {}", self.n_features)?;
        writeln!(f, "  Mean:     {:.0}", self.mean)?;
        writeln!(f, "  Min:      {:.0} ({})", self.min, self.limiting)?;
        writeln!(f, "  Max:      {:.0}", self.max)?;
        writeln!(f, "  CV:       {:.2}", self.cv)?;
        writeln!(f, "  Log2 fold range: {:.2}", self.log2_fold_range)?;
        if !self.empty_replicates.is_empty() {
            let empty: Vec<String> = self.empty_replicates.iter().map(|r| r.to_string()).collect();
            writeln!(f, "  Empty replicates: {}", empty.join(", "))?;
        }
        match &self.factors {
            Some(factors) => write!(f, "{}", factors),
            None => writeln!(f, "  Depth correction not possible"),
        }
    }
}

/// Profile replicate depths of a feature table.
pub fn profile_depth(table: &FeatureTable) -> DepthProfile {
    let totals = table.replicate_totals();
    let replicate_totals = totals.to_columns();

    let ids: Vec<ReplicateId> = Zone::ALL
        .iter()
        .flat_map(|&zone| {
            (1..=N_REPLICATES).map(move |replicate| ReplicateId { zone, replicate })
        })
        .collect();

    let n = replicate_totals.len() as f64;
    let mean = replicate_totals.iter().sum::<f64>() / n;
    let variance = replicate_totals
        .iter()
        .map(|&x| (x - mean) * (x - mean))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    let (min_idx, min) = replicate_totals
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::INFINITY), |acc, (i, v)| if v < acc.1 { (i, v) } else { acc });
    let max = replicate_totals
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let cv = if mean > 0.0 { std_dev / mean } else { 0.0 };
    let log2_fold_range = if min > 0.0 { (max / min).log2() } else { 0.0 };

    let empty_replicates = ids
        .iter()
        .zip(&replicate_totals)
        .filter(|(_, &t)| t <= 0.0)
        .map(|(&id, _)| id)
        .collect();

    DepthProfile {
        n_features: table.n_features(),
        replicate_totals,
        mean,
        min,
        max,
        cv,
        log2_fold_range,
        limiting: ids[min_idx],
        empty_replicates,
        factors: CorrectionFactors::from_totals(&totals).ok(),
    }
}
