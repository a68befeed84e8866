//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: CredentialChecks,
}

/// Which collaborators have credentials configured. Nothing is contacted.
#[derive(Serialize)]
pub struct CredentialChecks {
    pub extraction: bool,
    pub completion: bool,
    pub speech: bool,
    pub storage: bool,
}

pub async fn home() -> &'static str {
    "Welcome to medicast."
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: medicast_common::VERSION,
    })
}

/// Readiness probe - reports missing credentials
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let config = &state.config;
    let checks = CredentialChecks {
        extraction: config.extraction.api_key.is_some(),
        completion: config.llm.api_key.is_some(),
        speech: config.speech.api_key.is_some(),
        storage: config.storage.bucket.is_some() && config.storage.region.is_some(),
    };

    let all_configured = checks.extraction && checks.completion && checks.speech && checks.storage;

    Json(ReadyResponse {
        status: if all_configured { "ready" } else { "degraded" }.to_string(),
        checks,
    })
}
