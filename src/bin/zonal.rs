//! zonal - zone-wise differential abundance CLI
//!
//! Runs the per-rank enrichment analysis of taxa across the Sub, Inter and
//! Supra sampling zones.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use zonal_daa::data::FeatureTable;
use zonal_daa::error::Result;
use zonal_daa::lineage::{parse_rank_list, TaxaSource};
use zonal_daa::pipeline::{run_files, AnalysisConfig, Pipeline};
use zonal_daa::profile::profile_depth;
use zonal_daa::test::StatsMode;

/// Output format of the profile command.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Zone-wise differential abundance of microbial taxa
#[derive(Parser)]
#[command(name = "zonal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the enrichment analysis at every selected rank
    Run {
        /// Path to the feature count table TSV
        #[arg(short, long)]
        feature_table: PathBuf,

        /// Path to the taxonomy TSV
        #[arg(short, long)]
        taxonomy: PathBuf,

        /// Output stem; rank reports are written to its directory
        #[arg(short, long)]
        output: PathBuf,

        /// Taxonomy vocabulary: silva or greengenes
        #[arg(short = 's', long)]
        taxa_source: Option<String>,

        /// P-value threshold
        #[arg(long)]
        pval_threshold: Option<f64>,

        /// Minimum relative fold change between zone means
        #[arg(long)]
        pct_effect_size: Option<f64>,

        /// Use the Kruskal-Wallis test instead of chi-square
        #[arg(long)]
        kruskal_wallis: bool,

        /// Comma-separated ranks, e.g. "genus,family"
        #[arg(long)]
        ranks: Option<String>,

        /// YAML configuration; command-line flags take precedence
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write an example configuration file
    Example {
        /// Output path for the YAML configuration
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Profile replicate depths of a feature table
    Profile {
        /// Path to the feature count table TSV
        #[arg(short, long)]
        feature_table: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            feature_table,
            taxonomy,
            output,
            taxa_source,
            pval_threshold,
            pct_effect_size,
            kruskal_wallis,
            ranks,
            config,
        } => load_config(config.as_deref())
            .and_then(|base| {
                apply_overrides(
                    base,
                    taxa_source.as_deref(),
                    pval_threshold,
                    pct_effect_size,
                    kruskal_wallis,
                    ranks.as_deref(),
                )
            })
            .and_then(|config| cmd_run(&feature_table, &taxonomy, &output, &config)),

        Commands::Example { output } => cmd_example(&output),

        Commands::Profile {
            feature_table,
            format,
        } => cmd_profile(&feature_table, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            let yaml = std::fs::read_to_string(path)?;
            AnalysisConfig::from_yaml(&yaml)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn apply_overrides(
    mut config: AnalysisConfig,
    taxa_source: Option<&str>,
    pval_threshold: Option<f64>,
    pct_effect_size: Option<f64>,
    kruskal_wallis: bool,
    ranks: Option<&str>,
) -> Result<AnalysisConfig> {
    if let Some(source) = taxa_source {
        config.taxa_source = source.parse::<TaxaSource>()?;
    }
    if let Some(p) = pval_threshold {
        config.significance.pval_threshold = p;
    }
    if let Some(pct) = pct_effect_size {
        config.significance.pct_effect_size = pct;
    }
    if kruskal_wallis {
        config.significance.mode = StatsMode::KruskalWallis;
    }
    if let Some(ranks) = ranks {
        config.ranks = parse_rank_list(ranks)?;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_run(
    feature_table: &Path,
    taxonomy: &Path,
    output: &Path,
    config: &AnalysisConfig,
) -> Result<()> {
    log::info!(
        "Running '{}' ({}, {} taxonomy)",
        config.name,
        config.significance.mode,
        config.taxa_source
    );
    let summary = run_files(feature_table, taxonomy, output, config)?;
    println!("{}", summary);
    Ok(())
}

fn cmd_example(output: &Path) -> Result<()> {
    let pipeline = Pipeline::new()
        .name("example-zonal")
        .taxa_source(TaxaSource::Silva)
        .pval_threshold(0.05)
        .pct_effect_size(0.05)
        .abundance_pct_threshold(0.01);

    let mut config = pipeline.to_config();
    config.description =
        Some("Chi-square enrichment of taxa across Sub, Inter and Supra zones".to_string());
    let yaml = config.to_yaml()?;

    std::fs::write(output, &yaml)?;
    log::info!("Wrote example configuration to {}", output.display());
    println!("{}", yaml);
    Ok(())
}

fn cmd_profile(feature_table: &Path, format: OutputFormat) -> Result<()> {
    let features = FeatureTable::from_tsv(feature_table)?;
    let profile = profile_depth(&features);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profile)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&profile)?),
        OutputFormat::Text => print!("{}", profile),
    }
    Ok(())
}
