//! Local paper batch and the summaries written for it
//!
//! The batch is a fixed list of files in one directory. Each file is
//! summarized as-is; if it holds JSON with a `metadata` object, that object
//! describes the paper. One summary file per paper is written to the
//! summaries directory, overwriting any earlier run.

use crate::errors::{AppError, Result};
use crate::models::Summary;
use crate::outcome::Outcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// One file of the local batch
#[derive(Debug, Clone, Serialize)]
pub struct LocalPaper {
    pub paper_file: String,
    pub metadata: Value,
    #[serde(skip)]
    pub content: String,
}

impl LocalPaper {
    /// Title from metadata, else the position-based fallback
    pub fn title(&self, position: usize) -> String {
        self.metadata
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Paper {}", position + 1))
    }

    pub fn authors(&self) -> Option<String> {
        let line = match self.metadata.get("authors")? {
            Value::String(text) => text.clone(),
            Value::Array(names) => names
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            _ => return None,
        };
        Some(line).filter(|line| !line.trim().is_empty())
    }
}

/// Read one batch file. Missing and empty files stop the batch.
pub async fn read_local_paper(dir: &Path, file_name: &str) -> Result<LocalPaper> {
    let path = dir.join(file_name);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content.trim().to_string(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::LocalFile {
                file: file_name.to_string(),
                reason: format!("not found in {}", dir.display()),
            });
        }
        Err(e) => {
            return Err(AppError::LocalFile {
                file: file_name.to_string(),
                reason: e.to_string(),
            });
        }
    };

    if content.is_empty() {
        return Err(AppError::EmptyFile {
            file: file_name.to_string(),
        });
    }

    let metadata = match serde_json::from_str::<Value>(&content) {
        Ok(parsed) => parsed.get("metadata").cloned().unwrap_or_else(|| json!({})),
        Err(_) => json!({ "title": file_name }),
    };

    Ok(LocalPaper {
        paper_file: file_name.to_string(),
        metadata,
        content,
    })
}

/// Persisted summary of one local paper
#[derive(Debug, Serialize)]
pub struct StoredSummary<'a> {
    pub filename: &'a str,
    pub success: bool,
    pub summary: &'a Outcome<Summary>,
    pub generated_at: DateTime<Utc>,
}

/// Writes summaries into a directory
pub struct SummaryArchive {
    dir: PathBuf,
}

impl SummaryArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write one summary file named after its source file
    pub async fn store(&self, filename: &str, summary: &Outcome<Summary>) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let record = StoredSummary {
            filename,
            success: summary.is_success(),
            summary,
            generated_at: Utc::now(),
        };
        let path = self.dir.join(filename);
        tokio::fs::write(&path, serde_json::to_vec_pretty(&record)?).await?;

        tracing::debug!(path = %path.display(), "Summary written");
        Ok(path)
    }
}
