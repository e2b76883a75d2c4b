//! Classifieds crawler CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use classifieds_crawler::{
    error::Result,
    models::{Config, TraversalMode},
    pipeline,
    renderer::{HttpRenderer, Renderer},
};

/// Classifieds crawler - discover, enrich and filter marketplace listings
#[derive(Parser, Debug)]
#[command(
    name = "classifieds-crawler",
    version,
    about = "Crawl, cache, enrich and filter classifieds listings"
)]
struct Cli {
    /// Path to the settings file (.toml or .json)
    #[arg(short, long, default_value = "settings.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover listing URLs and keep listings matching a filter keyword
    Scrape,

    /// Enrich every cached URL list
    Enrich,

    /// Move accepted raw results into the cleaned store
    Filter,

    /// Run full pipeline: Discover → Enrich → Filter
    Pipeline,

    /// Validate the settings file
    Validate,

    /// Show effective settings and store status
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn http_renderer(config: &Config) -> Result<Arc<dyn Renderer>> {
    Ok(Arc::new(HttpRenderer::new(config)?))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Scrape => {
            pipeline::run_scrape(&config, http_renderer(&config)?).await?;
        }

        Command::Enrich => {
            pipeline::run_enrich(&config, http_renderer(&config)?).await?;
        }

        Command::Filter => {
            let summary = pipeline::run_filter(&config).await?;
            log::info!(
                "Cleaned and saved: {} records in {}",
                summary.cleaned_total,
                config.output_cleaned_json.display()
            );
        }

        Command::Pipeline => {
            let (stats, filtered) =
                pipeline::run_pipeline(&config, http_renderer(&config)?).await?;
            stats.log_summary("Pipeline");
            log::info!(
                "{} new records in the cleaned store ({} total)",
                filtered.accepted,
                filtered.cleaned_total
            );
        }

        Command::Validate => {
            let partitions = TraversalMode::from_config(&config).partitions().len();
            log::info!(
                "✓ Config OK ({} partitions planned, concurrency {})",
                partitions,
                config.concurrency()
            );
        }

        Command::Info => {
            pipeline::run_info(&config).await?;
        }
    }

    log::info!("Done!");

    Ok(())
}
