//! Orchestration of a zonal analysis over taxonomic ranks.

mod config;
mod runner;

pub use config::AnalysisConfig;
pub use runner::{run_files, Pipeline, RankContext, RankSummary, RunSummary};
