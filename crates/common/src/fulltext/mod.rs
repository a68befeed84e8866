//! Full-text fetcher
//!
//! medRxiv serves every preprint PDF at a path derived from its DOI, so the
//! fetcher only needs the bare DOI to point the extractor at the paper.

use crate::errors::{AppError, Result};
use crate::extraction::{ExtractRequest, Extractor};
use crate::models::{Paper, PaperFullText};
use serde_json::{json, Value};

/// Resolver prefixes stripped from DOIs
const DOI_RESOLVER_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
];

const CONTENT_BASE: &str = "https://www.medrxiv.org/content";

/// Instruction for full-text extraction. The token limit is advisory.
pub const FULL_TEXT_PROMPT: &str = "Extract the full text of this research paper. \
Exclude URL links and author names. Limit the extracted text to approximately 5500 tokens \
to ensure the total response is under 6000 tokens.";

/// Key of the extracted text in the extraction payload
pub const EXTRACTED_TEXT_KEY: &str = "extractedText";

/// Strip resolver prefixes and whitespace from a DOI
pub fn bare_doi(doi: &str) -> &str {
    let doi = doi.trim();
    DOI_RESOLVER_PREFIXES
        .iter()
        .find_map(|prefix| doi.strip_prefix(prefix))
        .unwrap_or(doi)
}

/// PDF location for a DOI, bare or resolver form
pub fn content_url(doi: &str) -> String {
    format!("{}/{}.full.pdf", CONTENT_BASE, bare_doi(doi))
}

pub fn full_text_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "extractedText": {"type": "string"}
        },
        "required": ["extractedText"]
    })
}

/// Fetch the full text of one paper.
///
/// A paper without a DOI fails with `MissingDoi` before anything is sent.
pub async fn fetch_full_text(extractor: &dyn Extractor, paper: &Paper) -> Result<PaperFullText> {
    let doi = paper
        .doi
        .as_deref()
        .map(bare_doi)
        .filter(|doi| !doi.is_empty())
        .ok_or_else(|| AppError::MissingDoi {
            title: paper.display_title().to_string(),
        })?;

    let source_url = content_url(doi);
    let request = ExtractRequest::new(source_url.clone(), FULL_TEXT_PROMPT).with_schema(full_text_schema());
    let data = extractor.extract(&request).await?;

    let extracted_text = read_extracted_text(&data)?;

    tracing::info!(
        doi,
        chars = extracted_text.len(),
        "Extracted paper full text"
    );

    Ok(PaperFullText {
        paper: paper.clone(),
        doi: doi.to_string(),
        source_url,
        extracted_text,
    })
}

fn read_extracted_text(data: &Value) -> Result<String> {
    match data.get(EXTRACTED_TEXT_KEY).and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => {
            let keys: Vec<&str> = data
                .as_object()
                .map(|fields| fields.keys().map(String::as_str).collect())
                .unwrap_or_default();
            Err(AppError::MalformedResponse {
                service: "extraction",
                message: format!("Could not find paper text. Available keys: {:?}", keys),
            })
        }
    }
}
