//! Sampling zones and the 3 × 3 zone-by-replicate count layout.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Number of replicates collected per zone.
pub const N_REPLICATES: usize = 3;

/// Number of count columns per feature (zones × replicates).
pub const N_COUNT_COLUMNS: usize = 9;

/// One of the three sampling zones along the shore gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    /// Sublittoral.
    Sub,
    /// Intertidal.
    Inter,
    /// Supralittoral.
    Supra,
}

impl Zone {
    /// All zones in column order of the count table.
    pub const ALL: [Zone; 3] = [Zone::Sub, Zone::Inter, Zone::Supra];

    /// Row index of this zone in a [`ZoneCounts`] matrix.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Zone::Sub => 0,
            Zone::Inter => 1,
            Zone::Supra => 2,
        }
    }

    /// Label used in enrichment labels and diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Zone::Sub => "Sub",
            Zone::Inter => "Inter",
            Zone::Supra => "Supra",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A pair of zones compared by a pairwise test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZonePair {
    SubInter,
    SubSupra,
    InterSupra,
}

impl ZonePair {
    /// All pairs in report column order.
    pub const ALL: [ZonePair; 3] = [ZonePair::SubInter, ZonePair::SubSupra, ZonePair::InterSupra];

    /// The two zones of this pair, first zone is the numerator of fold changes.
    pub const fn zones(self) -> (Zone, Zone) {
        match self {
            ZonePair::SubInter => (Zone::Sub, Zone::Inter),
            ZonePair::SubSupra => (Zone::Sub, Zone::Supra),
            ZonePair::InterSupra => (Zone::Inter, Zone::Supra),
        }
    }
}

/// Counts for one feature or taxon laid out as zones (rows) × replicates (columns).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneCounts(Matrix3<f64>);

impl Default for ZoneCounts {
    fn default() -> Self {
        Self::zeros()
    }
}

impl ZoneCounts {
    /// All-zero counts.
    pub fn zeros() -> Self {
        Self(Matrix3::zeros())
    }

    /// Build from the nine count-table columns (Sub1..3, Inter1..3, Supra1..3).
    pub fn from_columns(values: &[f64; N_COUNT_COLUMNS]) -> Self {
        Self(Matrix3::from_row_slice(values))
    }

    /// The nine values in count-table column order.
    pub fn to_columns(&self) -> [f64; N_COUNT_COLUMNS] {
        let mut out = [0.0; N_COUNT_COLUMNS];
        for (i, value) in out.iter_mut().enumerate() {
            *value = self.0[(i / N_REPLICATES, i % N_REPLICATES)];
        }
        out
    }

    /// Value for a zone and replicate (0-based).
    #[inline]
    pub fn get(&self, zone: Zone, replicate: usize) -> f64 {
        self.0[(zone.index(), replicate)]
    }

    /// Replicate values of a zone.
    pub fn zone(&self, zone: Zone) -> [f64; N_REPLICATES] {
        let row = self.0.row(zone.index());
        [row[0], row[1], row[2]]
    }

    /// Sum over the replicates of a zone.
    pub fn zone_sum(&self, zone: Zone) -> f64 {
        self.0.row(zone.index()).sum()
    }

    /// Zone sums in [`Zone::ALL`] order.
    pub fn zone_sums(&self) -> [f64; 3] {
        Zone::ALL.map(|z| self.zone_sum(z))
    }

    /// Mean replicate value of a zone.
    pub fn zone_mean(&self, zone: Zone) -> f64 {
        self.zone_sum(zone) / N_REPLICATES as f64
    }

    /// Sum of all nine entries.
    pub fn total(&self) -> f64 {
        self.0.sum()
    }

    /// Underlying matrix.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }

    /// Element-wise product with a matrix of per-replicate factors.
    pub fn scaled(&self, factors: &Matrix3<f64>) -> Self {
        Self(self.0.component_mul(factors))
    }
}

impl std::ops::AddAssign for ZoneCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::Add for ZoneCounts {
    type Output = ZoneCounts;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

/// Median of log10-transformed values, mapping zero to zero.
pub fn median_log10(values: &[f64]) -> f64 {
    let mut logs: Vec<f64> = values.iter().map(|&v| log10_or_zero(v)).collect();
    if logs.is_empty() {
        return 0.0;
    }
    logs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = logs.len();
    if n % 2 == 1 {
        logs[n / 2]
    } else {
        (logs[n / 2 - 1] + logs[n / 2]) / 2.0
    }
}

/// log10 of a count, zero for zero counts.
#[inline]
pub fn log10_or_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value.log10()
    }
}

/// log10 of a count, zero for fractional counts below one.
#[inline]
pub fn log10_floor_fraction(value: f64) -> f64 {
    if value < 1.0 {
        0.0
    } else {
        value.log10()
    }
}
