use async_trait::async_trait;
use medicast_common::{
    errors::{AppError, Result},
    extraction::{ExtractRequest, Extractor},
    fulltext::bare_doi,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Serves a listing page and per-DOI paper texts
#[derive(Clone)]
pub struct MockExtractor {
    pub listing_url: String,
    pub papers: Vec<Value>,
    pub texts: HashMap<String, String>,
    pub calls: Arc<Mutex<Vec<ExtractRequest>>>,
    pub fail_listing: bool,
}

impl MockExtractor {
    pub fn new(listing_url: &str) -> Self {
        Self {
            listing_url: listing_url.to_string(),
            papers: Vec::new(),
            texts: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_listing: false,
        }
    }

    /// Add a listed paper whose PDF yields `text`
    pub fn with_paper(mut self, title: &str, doi: &str, text: &str) -> Self {
        self.papers.push(json!({ "title": title, "doi": doi, "authors": "A. Author, B. Author" }));
        self.texts.insert(bare_doi(doi).to_string(), text.to_string());
        self
    }

    /// Add a listed paper without a DOI
    pub fn with_paper_without_doi(mut self, title: &str) -> Self {
        self.papers.push(json!({ "title": title }));
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .flat_map(|request| request.urls.clone())
            .collect()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, request: &ExtractRequest) -> Result<Value> {
        self.calls.lock().unwrap().push(request.clone());
        let url = request.urls.first().cloned().unwrap_or_default();

        if url == self.listing_url {
            if self.fail_listing {
                return Err(AppError::Extraction {
                    message: "listing unavailable".to_string(),
                });
            }
            return Ok(json!({ "papers": self.papers }));
        }

        let text = self
            .texts
            .iter()
            .find(|(doi, _)| url.contains(doi.as_str()))
            .map(|(_, text)| text.clone());

        match text {
            Some(text) => Ok(json!({ "extractedText": text })),
            None => Err(AppError::Extraction {
                message: format!("unexpected url {}", url),
            }),
        }
    }
}
