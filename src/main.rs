//! ML Prediction App - Main Entry Point
//!
//! Loads the model bundle once, then serves the prediction page until
//! interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use ml_prediction_app::{
    cli::Args,
    config::{AppConfig, AppVariant, LoggingConfig},
    form,
    metrics::{AppMetrics, MetricsReporter},
    models::loader::{ArtifactLoader, SchemaContract},
    page::PageShell,
    server::{self, AppContext},
    types::segment::ClusterInfo,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = AppConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config))?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_logging(&config.logging)?;

    info!("Starting ML Prediction App");
    info!(
        config = %args.config,
        variant = config.app.variant.as_str(),
        artifacts = %config.artifacts.dir.display(),
        format = ?config.artifacts.format,
        "Configuration loaded"
    );

    // Column contract between the form and the artifact
    let fields = form::fields_for(config.app.variant);
    let contract = SchemaContract {
        columns: form::column_names(fields),
        max_clusters: match config.app.variant {
            AppVariant::Cluster => Some(ClusterInfo::count()),
            AppVariant::Scalar => None,
        },
    };
    info!(
        features = fields.len(),
        action = form::action_label(config.app.variant),
        "Input form initialized"
    );

    // Load the model bundle up front; without it nothing can be served
    let loader = Arc::new(ArtifactLoader::new(&config.artifacts, contract));
    let metrics = Arc::new(AppMetrics::new());
    let ctx = AppContext::new(PageShell::new(&config.app), loader, metrics.clone())
        .context("Model artifacts could not be loaded")?;
    let ctx = Arc::new(ctx);

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let routes = server::routes(ctx);
    let (addr, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(config.server.socket_addr(), async {
            tokio::signal::ctrl_c().await.ok();
        })
        .with_context(|| format!("Failed to bind {}", config.server.socket_addr()))?;

    info!("Serving on http://{}", addr);
    server.await;

    info!("Server shutting down...");
    metrics.print_summary();

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!("ml_prediction_app={},warp=info", logging.level))
    })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
