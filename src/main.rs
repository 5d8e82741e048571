//! rrdserver
//!
//! Serves the round-robin archives under a directory to dashboards.
//!
//! Run with: cargo run -- -r ./sample/ -p 9000
//!
//! Settings are layered: built-in defaults, then the config file
//! (`--config` or the default locations), then `RRDSERVER_*` environment
//! variables, then the flags below. `RUST_LOG` overrides the log level.

use anyhow::Context;
use clap::Parser;
use rrdserver::api::{serve, AppState};
use rrdserver::archive::RrdtoolStore;
use rrdserver::config::{generate_default_config, Config, LoggingConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rrdserver")]
#[command(about = "JSON data source for round-robin archives", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(short = 'i', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding the archives
    #[arg(short, long = "rrd-path")]
    rrd_path: Option<PathBuf>,

    /// Sampling step in seconds
    #[arg(short, long)]
    step: Option<u64>,

    /// Search cache time to live in seconds
    #[arg(short = 'c', long = "search-cache")]
    search_cache: Option<u64>,

    /// CSV file with annotations
    #[arg(short = 'a', long = "annotation-file")]
    annotation_file: Option<PathBuf>,

    /// Factor applied to every value
    #[arg(short, long)]
    multiplier: Option<f64>,

    /// Config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Apply flags on top of the loaded configuration
    fn apply(self, config: &mut Config) {
        let server = &mut config.server;
        if let Some(host) = self.host {
            server.host = host;
        }
        if let Some(port) = self.port {
            server.port = port;
        }
        if let Some(path) = self.rrd_path {
            server.rrd_path = path;
        }
        if let Some(step) = self.step {
            server.step_secs = step;
        }
        if let Some(ttl) = self.search_cache {
            server.search_cache_secs = ttl;
        }
        if let Some(file) = self.annotation_file {
            server.annotation_file = Some(file);
        }
        if let Some(m) = self.multiplier {
            server.multiplier = m;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load_default(),
    };
    cli.apply(&mut config);

    init_logging(&config.logging);

    let server = &config.server;
    tracing::info!("Starting rrdserver v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        rrd_path = %server.rrd_path.display(),
        step_secs = server.step_secs,
        search_cache_secs = server.search_cache_secs,
        multiplier = server.multiplier,
        annotation_file = ?server.annotation_file,
        "Configuration loaded"
    );

    if !server.rrd_path.is_dir() {
        tracing::warn!("Archive root {:?} is not a directory", server.rrd_path);
    }

    let store = Arc::new(RrdtoolStore::new(&server.rrdtool_bin));
    let state = AppState::new(server, store);

    serve(state, &server.addr())
        .await
        .context("running HTTP server")?;

    tracing::info!("rrdserver stopped");
    Ok(())
}

/// Install the global tracing subscriber
fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("rrdserver={},tower_http=info", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
