//! fortid — FortiGate probe exporter daemon.
//!
//! Serves Prometheus expositions for the FortiGate targets named in its
//! configuration file. Each `/probe?target=<name>` request discovers the
//! target's firmware (unless configured), runs its probes and renders the
//! result.
//!
//! # Usage
//!
//! ```text
//! fortid serve --config /etc/fortid/fortid.toml
//! fortid probe --config /etc/fortid/fortid.toml --target fw-edge-01
//! ```

mod http_fetcher;
mod targets;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use forti_api::{build_router, ExporterState};
use forti_core::ExporterConfig;
use forti_metrics::{discovery_failure, render_prometheus, scrape};
use forti_probe::metadata::discover;
use tokio::runtime::Handle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fortid", about = "FortiGate probe exporter")]
struct Cli {
    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve `/probe` and `/healthz` over HTTP.
    Serve {
        /// Configuration file.
        #[arg(long, default_value = "fortid.toml")]
        config: PathBuf,

        /// Listen address, overriding `server.listen`.
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
    /// Scrape one target and print the exposition to stdout.
    Probe {
        /// Configuration file.
        #[arg(long, default_value = "fortid.toml")]
        config: PathBuf,

        /// Target name from the configuration.
        #[arg(long)]
        target: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    match cli.command {
        Command::Serve { config, listen } => serve(&config, listen).await,
        Command::Probe { config, target } => probe_once(&config, &target).await,
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,fortid=debug"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: &Path) -> anyhow::Result<ExporterConfig> {
    ExporterConfig::from_file(path)
        .with_context(|| format!("loading configuration from {}", path.display()))
}

async fn serve(config_path: &Path, listen: Option<SocketAddr>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let addr = match listen {
        Some(addr) => addr,
        None => config
            .server
            .listen
            .parse()
            .with_context(|| format!("invalid listen address {:?}", config.server.listen))?,
    };

    let targets = targets::build_targets(&config.targets, &Handle::current())?;
    let state = ExporterState::new(targets);
    info!(targets = ?state.target_names(), "targets loaded");

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "exporter listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("exporter stopped");
    Ok(())
}

async fn probe_once(config_path: &Path, name: &str) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let target_config = config
        .target(name)
        .with_context(|| format!("no target named {name:?} in configuration"))?;
    let target = targets::build_target(target_config, &Handle::current())?;

    let meta = match target.version {
        Some(version) => Some(version.into()),
        None => {
            let fetcher = Arc::clone(&target.fetcher);
            match tokio::task::spawn_blocking(move || discover(&*fetcher)).await? {
                Ok(meta) => Some(meta),
                Err(e) => {
                    warn!(target = %target.name, error = %e, "firmware discovery failed");
                    None
                }
            }
        }
    };

    let samples = match meta {
        Some(meta) => scrape(Arc::clone(&target.fetcher), meta, &target.probes)
            .await
            .samples()?,
        None => discovery_failure()?,
    };
    print!("{}", render_prometheus(&samples));
    Ok(())
}
