//! Domain models passed between pipeline stages

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Paper metadata as returned by the extraction service or the local listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    #[serde(default)]
    pub title: String,

    /// Bare DOI or a resolver URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Authors>,
}

impl Paper {
    pub fn new(title: impl Into<String>, doi: Option<&str>) -> Self {
        Self {
            title: title.into(),
            doi: doi.map(str::to_string),
            authors: None,
        }
    }

    /// Title for display, with a fallback for untitled entries
    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            "Unknown Title"
        } else {
            title
        }
    }

    /// Authors rendered as one line, if the source provided any
    pub fn authors_line(&self) -> Option<String> {
        self.authors
            .as_ref()
            .map(|a| a.to_string())
            .filter(|line| !line.trim().is_empty())
    }
}

/// Extractors return authors either as one string or as a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Authors {
    List(Vec<String>),
    Text(String),
}

impl fmt::Display for Authors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authors::List(names) => write!(f, "{}", names.join(", ")),
            Authors::Text(text) => write!(f, "{}", text),
        }
    }
}

/// The `data` payload of a paper listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaperListing {
    #[serde(default)]
    pub papers: Vec<Paper>,
}

impl PaperListing {
    /// Look up a paper by position, reporting the listing size on a miss
    pub fn get(&self, index: usize) -> crate::Result<&Paper> {
        self.papers.get(index).ok_or(crate::AppError::IndexOutOfRange {
            index,
            len: self.papers.len(),
        })
    }
}

/// Extracted full text of one paper
#[derive(Debug, Clone, Serialize)]
pub struct PaperFullText {
    pub paper: Paper,

    /// DOI with any resolver prefix removed
    pub doi: String,

    /// URL the text was extracted from
    pub source_url: String,

    #[serde(rename = "extractedText")]
    pub extracted_text: String,
}

/// Successful completion of a summarization request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub analysis: String,
    pub model_used: String,
}

/// Stored podcast episode
#[derive(Debug, Clone, Serialize)]
pub struct PodcastAudio {
    #[serde(rename = "podcastId")]
    pub podcast_id: Uuid,

    #[serde(skip)]
    pub object_key: String,

    #[serde(rename = "audioUrl")]
    pub audio_url: String,
}
