use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use presubmit::config::{load_config, load_config_from};
use presubmit::{
    create_client, document_report, logger, process_document, retry_failed_pages, BatchSubmitter,
    PageImage,
};

/// Send scanned pages to the annotation service and print where each mistake is.
#[derive(Debug, Parser)]
#[command(name = "presubmit", version)]
struct Cli {
    /// Page images, in page order
    #[arg(required = true)]
    pages: Vec<PathBuf>,

    /// Bearer token from the sign-in flow
    #[arg(long, env = "PRESUBMIT_TOKEN", hide_env_values = true)]
    token: String,

    /// Document name; defaults to a timestamped name
    #[arg(long, default_value = "")]
    name: String,

    /// Symbol the service should look for in the page corner (repeatable)
    #[arg(long = "symbol")]
    symbols: Vec<String>,

    /// Config file to use instead of the per-user one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the service base URL from the config
    #[arg(long)]
    base_url: Option<String>,

    /// Override the in-flight request cap from the config
    #[arg(long)]
    max_in_flight: Option<usize>,

    /// Width the pages are displayed at, for overlay positions
    #[arg(long, default_value_t = 390.0)]
    viewport_width: f64,

    /// Re-submit failed pages once before reporting
    #[arg(long)]
    retry_failed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("Failed to load configuration")?;
    logger::init_logging(&config.log_level);
    tracing::info!("Presubmit starting...");

    if let Some(base_url) = cli.base_url {
        config.service_base_url = base_url;
    }
    if cli.max_in_flight.is_some() {
        config.max_concurrent_requests = cli.max_in_flight;
    }

    let images = cli
        .pages
        .iter()
        .map(|path| {
            PageImage::open(path).with_context(|| format!("Failed to read page {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let symbols = if cli.symbols.is_empty() {
        config.symbol_hints.clone()
    } else {
        cli.symbols
    };

    let client = create_client(&config, &cli.token)?;
    let submitter = BatchSubmitter::new(client).with_max_in_flight(config.max_concurrent_requests);

    let mut document = process_document(&submitter, &cli.name, images, &symbols).await?;
    if cli.retry_failed {
        let recovered = retry_failed_pages(&submitter, &mut document, &symbols).await;
        tracing::info!("Recovered {} page(s) on retry", recovered.len());
    }

    if document
        .pages()
        .iter()
        .filter_map(|page| page.error())
        .any(|e| e.requires_reauthentication())
    {
        tracing::warn!("The annotation service rejected the token; sign in again");
    }

    let report = document_report(&document, &config, cli.viewport_width)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
