use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dracor_api::{router, AppState};
use dracor_core::config::DashboardConfig;
use dracor_core::network::DracorClient;
use dracor_core::CorpusMetricsPipeline;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Serve the small-world metrics of the DraCor corpora as JSON
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file (falls back to DRACOR_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Metrics CSV, overriding the configured path
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Address to listen on, overriding the configured one
    #[arg(long)]
    bind: Option<String>,
    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn load_config(&self) -> Result<DashboardConfig> {
        let mut config = DashboardConfig::load(self.config.as_deref())?;
        if let Some(csv) = &self.csv {
            config.metrics_csv = csv.clone();
        }
        if let Some(bind) = &self.bind {
            config.bind_address = bind.clone();
        }
        config.log_json |= self.log_json;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Cli::parse().load_config()?;

    let builder = tracing_subscriber::fmt().with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    let pipeline = CorpusMetricsPipeline::from_csv(&config.metrics_csv, config.pipeline_config())
        .with_context(|| format!("failed to load metrics from {}", config.metrics_csv.display()))?;
    info!(
        plays = pipeline.table().height(),
        path = %config.metrics_csv.display(),
        "metrics table loaded"
    );

    let client = DracorClient::new(config.api_base.clone(), config.request_timeout())
        .context("failed to build HTTP client")?;

    let app_state = Arc::new(AppState {
        pipeline,
        source: Arc::new(client),
    });

    let listener = TcpListener::bind(config.bind_address.as_str())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(app_state).into_make_service()).await?;

    Ok(())
}
