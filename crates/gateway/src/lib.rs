//! Medicast API Gateway
//!
//! HTTP surface over the paper-to-podcast pipeline. Every endpoint is a thin
//! composition of the stages in `medicast_common`; collaborators are
//! injected through `AppState` so the router can be driven with substitutes.

pub mod handlers;
pub mod middleware;

use axum::{
    routing::{get, post},
    Router,
};
use medicast_common::{
    config::AppConfig, Extractor, PodcastStudio, Summarizer,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub extractor: Arc<dyn Extractor>,
    pub summarizer: Summarizer,
    pub studio: PodcastStudio,
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    Router::new()
        // Health endpoints
        .route("/", get(handlers::health::home))
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Paper endpoints
        .route("/papers", get(handlers::papers::list_papers))
        .route("/paper-full-text", get(handlers::papers::first_paper_full_text))
        .route("/paper/{index}", get(handlers::papers::paper_with_full_text))

        // Summary endpoints
        .route("/analyze-paper/{index}", get(handlers::analysis::analyze_paper))
        .route("/podcast-summaries", get(handlers::analysis::podcast_summaries))

        // Local file endpoints
        .route("/local-paper-text", get(handlers::local::local_paper_text))
        .route("/summarize-local-papers", get(handlers::local::summarize_local_papers))

        // Podcast endpoints
        .route("/generate-podcast", post(handlers::podcasts::generate_podcast))
        .route("/podcast/{podcast_id}", get(handlers::podcasts::get_podcast))

        .route_layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}
