//! Paper listing and full-text handlers
//!
//! Failures are reported in the body with status 200.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{parse_index, recent_paper_full_text, recent_papers};
use crate::AppState;
use medicast_common::{
    errors::Result,
    fulltext,
    models::{Paper, PaperFullText, PaperListing},
    papers as paper_source,
    Outcome,
};

/// Optional overrides for the listing source
#[derive(Debug, Default, Deserialize)]
pub struct PapersQuery {
    pub url: Option<String>,
    pub count: Option<u32>,
}

/// A paper's metadata next to its full-text result
#[derive(Serialize)]
pub struct PaperWithText {
    pub metadata: Paper,
    pub full_text: Outcome<PaperFullText>,
}

/// List recent papers
pub async fn list_papers(
    State(state): State<AppState>,
    Query(query): Query<PapersQuery>,
) -> Json<Outcome<PaperListing>> {
    let sources = &state.config.sources;
    let url = query.url.as_deref().unwrap_or(&sources.listing_url);
    let count = query.count.unwrap_or(sources.paper_count);

    let result = paper_source::fetch_recent(state.extractor.as_ref(), url, count).await;
    Json(result.into())
}

/// Full text of the most recent paper
pub async fn first_paper_full_text(State(state): State<AppState>) -> Json<Outcome<PaperFullText>> {
    Json(recent_paper_full_text(&state, 0).await.into())
}

/// Metadata and full text of the paper at `index`
pub async fn paper_with_full_text(
    State(state): State<AppState>,
    Path(index): Path<String>,
) -> Json<Outcome<PaperWithText>> {
    Json(load_paper_with_text(&state, &index).await.into())
}

async fn load_paper_with_text(state: &AppState, index: &str) -> Result<PaperWithText> {
    let index = parse_index(index)?;
    let listing = recent_papers(state).await?;
    let paper = listing.get(index)?.clone();

    let full_text = fulltext::fetch_full_text(state.extractor.as_ref(), &paper).await;

    tracing::info!(index, title = %paper.display_title(), success = full_text.is_ok(), "Paper loaded");

    Ok(PaperWithText {
        metadata: paper,
        full_text: full_text.into(),
    })
}
