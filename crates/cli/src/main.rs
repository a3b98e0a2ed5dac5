//! feedcheck - deployed price feed validation
//!
//! Main entry point for a validation run

use std::env;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use feedcheck_cli::{build_readers, write_report, Cli, Settings, API_KEY_VAR, RPC_URL_VAR};
use feedcheck_core::{DeploymentManifest, FeedRegistry};
use feedcheck_detector::FeedValidator;

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.json);

    info!("Starting feedcheck v{}", env!("CARGO_PKG_VERSION"));

    // Configuration and credentials, fatal before any read
    let mut settings = Settings::load(cli.config.as_deref()).context("loading configuration")?;
    settings.apply_cli(&cli);
    settings.apply_target_endpoint(env::var(RPC_URL_VAR).ok());

    let api_key = env::var(API_KEY_VAR).ok();
    let readers = build_readers(&settings, api_key.as_deref()).context("configuring readers")?;
    let validator = FeedValidator::new(settings.validation_config(), readers)
        .context("invalid validation settings")?;

    // Registry, fatal before any symbol is processed
    let mut registry = FeedRegistry::load(&settings.registry_path)
        .with_context(|| format!("loading registry {}", settings.registry_path.display()))?;

    if let Some(path) = &settings.manifest_path {
        let manifest = DeploymentManifest::load(path)
            .with_context(|| format!("loading manifest {}", path.display()))?;
        info!("Applying manifest with {} deployed feeds", manifest.len());
        registry.apply_manifest(&manifest);
    }

    let report = validator.run(&registry).await;
    report.emit();

    if let Some(path) = &settings.report_path {
        write_report(&report, path)?;
        info!("Report written to {}", path.display());
    }

    if cli.strict && !report.summary.is_clean() {
        error!(
            "{} feeds not ok, {} errored",
            report.summary.not_ok_count, report.summary.error_count
        );
        anyhow::bail!("validation failed");
    }

    Ok(())
}
