//! Sumi-Sift main entry point
//!
//! Serves the keyword search API for the configured base URL.

use anyhow::Context;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use sumi_sift::config::{resolve_config, Config, ConfigOverrides};
use sumi_sift::crawler::{CrawlEngine, HttpFetcher};
use sumi_sift::job::JobRegistry;
use sumi_sift::service::SearchService;
use tracing_subscriber::EnvFilter;

/// Sumi-Sift: a keyword search crawler
///
/// Accepts keyword searches over HTTP, crawls every page of the configured
/// site in the background, and reports which pages contain the keyword.
#[derive(Parser, Debug)]
#[command(name = "sumi-sift")]
#[command(version)]
#[command(about = "A keyword search crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Site to crawl (overrides BASE_URL and the config file)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let overrides = ConfigOverrides {
        base_url: cli.base_url.clone(),
        port: cli.port,
    }
    .with_env();

    let (config, config_hash) =
        resolve_config(cli.config.as_deref(), &overrides).context("Invalid configuration")?;
    match (&cli.config, &config_hash) {
        (Some(path), Some(hash)) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            hash
        ),
        _ => tracing::info!("Using built-in configuration defaults"),
    }

    serve(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sift=info,tower_http=info,warn"),
            1 => EnvFilter::new("sumi_sift=debug,tower_http=debug,info"),
            2 => EnvFilter::new("sumi_sift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Wires fetcher, engine, registry and router, then serves until Ctrl-C
async fn serve(config: Config) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config.user_agent, config.crawler.fetch_timeout())
        .context("Failed to build HTTP client")?;
    let engine = CrawlEngine::from_config(&config.crawler, Arc::new(fetcher))
        .context("Failed to build crawl engine")?;

    tracing::info!(
        "Crawling {} with {} workers per search ({} fetches max overall)",
        engine.site().seed(),
        engine.settings().workers,
        engine.settings().max_total_fetches
    );

    let service = SearchService::new(Arc::new(JobRegistry::new()), Arc::new(engine));
    let app = sumi_sift::api::router(service);

    let ip: IpAddr = config
        .server
        .bind_address
        .parse()
        .context("Invalid listen address")?;
    let addr = SocketAddr::new(ip, config.server.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
