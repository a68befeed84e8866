//! Paper source adapter
//!
//! Recent papers come either from the extraction service, pointed at a
//! journal listing page, or from a pre-fetched listing on disk. Both paths
//! produce the same `PaperListing`.

use crate::errors::{AppError, Result};
use crate::extraction::{ExtractRequest, Extractor};
use crate::models::PaperListing;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;

/// Instruction sent with the listing page
pub fn listing_prompt(count: u32) -> String {
    format!("Extract the title and doi for the {} most recent papers.", count)
}

/// Schema the extractor must fill for a listing page
pub fn listing_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "papers": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": {"type": "string"},
                        "doi": {"type": "string"},
                        "authors": {"type": "string"}
                    },
                    "required": ["title", "doi"]
                }
            }
        },
        "required": ["papers"]
    })
}

/// Fetch the most recent papers listed at `source_url`.
///
/// `count` is only a hint to the extractor; the listing is returned as the
/// service produced it. A payload without papers is `NoPapersFound`.
pub async fn fetch_recent(
    extractor: &dyn Extractor,
    source_url: &str,
    count: u32,
) -> Result<PaperListing> {
    let request = ExtractRequest::new(source_url, listing_prompt(count)).with_schema(listing_schema());
    let data = extractor.extract(&request).await?;

    let listing: PaperListing = serde_json::from_value(data).map_err(|e| {
        tracing::warn!(source_url, error = %e, "Listing payload did not match schema");
        AppError::NoPapersFound { source_name: None }
    })?;

    if listing.papers.is_empty() {
        return Err(AppError::NoPapersFound { source_name: None });
    }

    tracing::info!(source_url, requested = count, found = listing.papers.len(), "Fetched recent papers");
    Ok(listing)
}

/// On-disk listing: the extraction response saved verbatim
#[derive(Deserialize)]
struct StoredListing {
    #[serde(default)]
    success: bool,
    data: Option<PaperListing>,
}

/// Read a pre-fetched paper listing from disk
pub async fn load_paper_list(path: &Path) -> Result<PaperListing> {
    let file = file_label(path);

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::LocalFile {
            file: file.clone(),
            reason: e.to_string(),
        })?;

    if content.trim().is_empty() {
        return Err(AppError::EmptyFile { file });
    }

    let stored: StoredListing = serde_json::from_str(&content).map_err(|e| AppError::LocalFile {
        file: file.clone(),
        reason: e.to_string(),
    })?;

    match stored.data {
        Some(listing) if stored.success && !listing.papers.is_empty() => Ok(listing),
        _ => Err(AppError::NoPapersFound { source_name: Some(file) }),
    }
}

pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
