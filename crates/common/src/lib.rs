//! Medicast Common Library
//!
//! Shared code for the Medicast gateway including:
//! - Configuration management
//! - Error types and the `Outcome` result shape
//! - Clients for the extraction, completion, speech and storage services
//! - The pipeline stages that turn recent papers into a podcast episode
//! - Metrics and observability

pub mod archive;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod fulltext;
pub mod llm;
pub mod metrics;
pub mod models;
pub mod outcome;
pub mod papers;
pub mod podcast;
pub mod speech;
pub mod storage;
pub mod transcript;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, ErrorCode, Result};
pub use extraction::Extractor;
pub use llm::{CompletionModel, Summarizer};
pub use models::{Paper, PaperFullText, PaperListing, PodcastAudio, Summary};
pub use outcome::Outcome;
pub use podcast::PodcastStudio;
pub use speech::SpeechSynthesizer;
pub use storage::ObjectStore;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default completion model
pub const DEFAULT_COMPLETION_MODEL: &str = "llama-3.3-70b-versatile";
