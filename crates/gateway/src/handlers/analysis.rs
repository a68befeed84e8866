//! Summary and transcript handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use super::{parse_index, recent_paper_full_text, recent_papers};
use crate::AppState;
use medicast_common::{
    errors::Result,
    fulltext,
    models::{Paper, Summary},
    transcript::{self, TranscriptEntry, PAPER_SUMMARY_INSTRUCTION, PHYSICIAN_SUMMARY_INSTRUCTION},
    Outcome,
};

/// Per-paper result inside a batch. A paper whose text could not be
/// fetched carries `error` instead of `summary`.
#[derive(Serialize)]
pub struct PaperSummary {
    pub paper: Paper,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Outcome<Summary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct PodcastSummariesResponse {
    pub individual_summaries: Vec<PaperSummary>,
    pub podcast_transcript: Outcome<Summary>,
}

/// Physician-facing summary of the paper at `index`
pub async fn analyze_paper(
    State(state): State<AppState>,
    Path(index): Path<String>,
) -> Json<Outcome<Summary>> {
    let index = match parse_index(&index) {
        Ok(index) => index,
        Err(e) => return Json(e.into()),
    };

    let full_text = match recent_paper_full_text(&state, index).await {
        Ok(full_text) => full_text,
        Err(e) => return Json(e.into()),
    };

    Json(
        state
            .summarizer
            .summarize(&full_text.extracted_text, PHYSICIAN_SUMMARY_INSTRUCTION)
            .await,
    )
}

/// Summaries of every recent paper plus a podcast transcript built from them
pub async fn podcast_summaries(State(state): State<AppState>) -> Json<Outcome<PodcastSummariesResponse>> {
    Json(build_podcast_summaries(&state).await.into())
}

async fn build_podcast_summaries(state: &AppState) -> Result<PodcastSummariesResponse> {
    let listing = recent_papers(state).await?;
    let mut summaries = Vec::with_capacity(listing.papers.len());

    for (index, paper) in listing.papers.into_iter().enumerate() {
        match fulltext::fetch_full_text(state.extractor.as_ref(), &paper).await {
            Ok(full_text) => {
                let summary = state
                    .summarizer
                    .summarize(&full_text.extracted_text, PAPER_SUMMARY_INSTRUCTION)
                    .await;
                summaries.push(PaperSummary {
                    paper,
                    summary: Some(summary),
                    error: None,
                });
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping paper without text");
                summaries.push(PaperSummary {
                    paper,
                    summary: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let entries: Vec<TranscriptEntry<'_>> = summaries
        .iter()
        .map(|s| TranscriptEntry {
            title: s.paper.display_title().to_string(),
            authors: s.paper.authors_line(),
            summary: s.summary.as_ref(),
        })
        .collect();

    let podcast_transcript = transcript::assemble(&state.summarizer, &entries).await;

    Ok(PodcastSummariesResponse {
        individual_summaries: summaries,
        podcast_transcript,
    })
}
