//! Statistical tests for zone-wise differential abundance.


pub use binomial::binomial_test;
pub use chi2::{chi2_contingency, chi2_sf, ChiSquareTest, ContingencyRow};
pub use engine::{
    CountBasis, PairwisePValues, PassCounters, SignificanceConfig, SignificanceEngine,
    NOMINAL_ALPHA,
    SignificanceResult, StatsMode, TaxonState,
};
pub use kruskal::{kruskal_wallis, KruskalWallisTest};
