//! Medicast API Gateway
//!
//! Binary entry point. Wires the Firecrawl, Groq, ElevenLabs and S3 clients
//! into the router and serves it until SIGINT/SIGTERM.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use medicast_common::{
    config::{AppConfig, ObservabilityConfig},
    extraction::FirecrawlExtractor,
    llm::GroqClient,
    metrics::{self, EXTERNAL_CALL_BUCKETS},
    speech::ElevenLabsClient,
    storage::S3Store,
    PodcastStudio, Summarizer,
};
use medicast_gateway::{create_router, AppState};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use tokio::{signal, sync::Notify};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting Medicast API Gateway v{}",
        medicast_common::VERSION
    );

    init_metrics(&config.observability)?;

    let config = Arc::new(config);
    let state = build_state(config.clone()).await?;
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    let shutdown = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.notify_one();
        }
    });

    let grace = config.shutdown_timeout();
    tokio::select! {
        result = server.into_future() => result?,
        _ = async {
            shutdown.notified().await;
            tokio::time::sleep(grace).await;
        } => warn!(timeout_secs = grace.as_secs(), "In-flight requests did not drain in time"),
    }

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&observability.log_level));

    if observability.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Install the Prometheus recorder; port 0 leaves metrics unexported
fn init_metrics(observability: &ObservabilityConfig) -> anyhow::Result<()> {
    if observability.metrics_port == 0 {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], observability.metrics_port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            EXTERNAL_CALL_BUCKETS,
        )?
        .install()
        .context("Failed to install Prometheus exporter")?;

    metrics::register_metrics();
    info!("Metrics exported on {}", addr);
    Ok(())
}

async fn build_state(config: Arc<AppConfig>) -> anyhow::Result<AppState> {
    let extractor = FirecrawlExtractor::new(config.extraction.clone())?;
    let completion = GroqClient::new(config.llm.clone())?;
    let speech = ElevenLabsClient::new(config.speech.clone())?;
    let store = S3Store::new(&config.storage).await;

    if config.storage.bucket.is_none() {
        warn!("S3_BUCKET_NAME not set; podcast generation will fail");
    }

    Ok(AppState {
        extractor: Arc::new(extractor),
        summarizer: Summarizer::new(Arc::new(completion), config.llm.model.clone()),
        studio: PodcastStudio::new(Arc::new(speech), Arc::new(store)),
        config,
    })
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
