//! API handlers module

pub mod analysis;
pub mod health;
pub mod local;
pub mod papers;
pub mod podcasts;

use crate::AppState;
use medicast_common::{
    errors::{AppError, Result},
    fulltext,
    models::{PaperFullText, PaperListing},
    papers as paper_source,
};

/// Recent papers from the configured listing page
pub(crate) async fn recent_papers(state: &AppState) -> Result<PaperListing> {
    paper_source::fetch_recent(
        state.extractor.as_ref(),
        &state.config.sources.listing_url,
        state.config.sources.paper_count,
    )
    .await
}

/// Parse a paper index taken from the path. Anything but a non-negative
/// integer is a validation failure reported in the body.
pub(crate) fn parse_index(raw: &str) -> Result<usize> {
    raw.trim().parse().map_err(|_| AppError::Validation {
        message: format!("Invalid paper index '{}'", raw),
        field: Some("index".to_string()),
    })
}

/// Full text of the recent paper at `index`
pub(crate) async fn recent_paper_full_text(state: &AppState, index: usize) -> Result<PaperFullText> {
    let listing = recent_papers(state).await?;
    let paper = listing.get(index)?;
    fulltext::fetch_full_text(state.extractor.as_ref(), paper).await
}
