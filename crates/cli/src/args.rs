//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

/// Check deployed oracles against reference oracles
#[derive(Debug, Clone, Parser)]
#[command(name = "feedcheck", version, about)]
pub struct Cli {
    /// Configuration file (TOML/JSON/YAML)
    #[arg(long, env = "FEEDCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Network hosting the oracles under validation
    #[arg(long)]
    pub network: Option<String>,

    /// Deviation threshold in percent
    #[arg(long, alias = "threshold")]
    pub deviation: Option<f64>,

    /// Feed registry document
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Deployed-address manifest for the target network
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Write the JSON report here
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Feeds evaluated concurrently (1 = sequential)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Exit non-zero when any feed is NOT OK or errored
    #[arg(long)]
    pub strict: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json: bool,
}
