//! Podcast generation and lookup handlers
//!
//! Unlike the other endpoints these use HTTP status codes: 400 for missing
//! parameters, 404 for unknown episodes, 500 when generation fails.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use super::recent_papers;
use crate::AppState;
use medicast_common::{
    errors::{AppError, Result},
    models::PodcastAudio,
    transcript, Outcome,
};

/// Request to generate a new episode
#[derive(Debug, Deserialize, Validate)]
pub struct GeneratePodcastRequest {
    #[validate(length(min = 1, max = 200))]
    pub specialty: Option<String>,

    /// Target length in minutes, as a number or a string
    pub duration: Option<Value>,

    /// Publishing cadence requested by the client; recorded only
    pub frequency: Option<String>,
}

/// Response after generating an episode
#[derive(Serialize)]
pub struct GeneratedPodcast {
    #[serde(rename = "podcastId")]
    pub podcast_id: Uuid,
    #[serde(rename = "audioUrl")]
    pub audio_url: String,
    pub transcript: String,
}

fn missing_parameters() -> AppError {
    AppError::MissingParameters {
        message: "Missing required parameters".to_string(),
    }
}

/// Render a duration parameter as minutes for the script prompt.
///
/// Accepts a positive number or a non-blank string. Zero, negative,
/// blank and non-scalar values count as missing.
fn duration_minutes(duration: &Value) -> Option<String> {
    match duration {
        Value::Number(n) if n.as_f64().is_some_and(|minutes| minutes > 0.0) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Generate an episode for a specialty and upload its audio
pub async fn generate_podcast(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GeneratePodcastRequest>, JsonRejection>,
) -> Result<Json<Outcome<GeneratedPodcast>>> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Unreadable podcast request");
        missing_parameters()
    })?;

    let specialty = request
        .specialty
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(missing_parameters)?
        .to_string();
    let duration = request
        .duration
        .as_ref()
        .and_then(duration_minutes)
        .ok_or_else(missing_parameters)?;

    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("specialty".to_string()),
    })?;

    tracing::info!(
        specialty = %specialty,
        duration = %duration,
        frequency = ?request.frequency,
        "Generating podcast"
    );

    // The listing is only checked for availability; the episode is
    // scripted from the specialty and duration.
    recent_papers(&state).await.map_err(|e| {
        tracing::warn!(error = %e, "Paper listing unavailable");
        AppError::GenerationFailed {
            message: "Failed to fetch papers".to_string(),
        }
    })?;

    let prompt = transcript::build_specialty_prompt(&specialty, &duration);
    let summary = match state.summarizer.summarize(&prompt, "").await {
        Outcome::Success(summary) => summary,
        Outcome::Failure { message, .. } => {
            tracing::warn!(error = %message, "Transcript generation failed");
            return Err(AppError::GenerationFailed {
                message: "Failed to generate transcript".to_string(),
            });
        }
    };

    let audio = state
        .studio
        .synthesize_and_store(&summary.analysis)
        .await
        .map_err(|e| AppError::GenerationFailed {
            message: format!("Error generating audio: {}", e),
        })?;

    tracing::info!(podcast_id = %audio.podcast_id, url = %audio.audio_url, "Podcast generated");

    Ok(Json(Outcome::Success(GeneratedPodcast {
        podcast_id: audio.podcast_id,
        audio_url: audio.audio_url,
        transcript: summary.analysis,
    })))
}

/// Public URL of a stored episode
pub async fn get_podcast(
    State(state): State<AppState>,
    Path(podcast_id): Path<String>,
) -> Result<Json<Outcome<PodcastAudio>>> {
    let audio = state.studio.lookup(&podcast_id).await?;
    Ok(Json(Outcome::Success(audio)))
}
