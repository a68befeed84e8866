//! Configuration management for Medicast services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - The service credentials the collaborators document
//!   (FIRECRAWL_API_KEY, GROQ_API_KEY, ELEVENLABS_API_KEY, AWS_REGION, S3_BUCKET_NAME)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values
//!
//! Credentials are optional at load time. Their absence is reported by the
//! client that needs them, at first use.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Extraction service (Firecrawl)
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// LLM completion service (Groq)
    #[serde(default)]
    pub llm: LlmConfig,

    /// Speech synthesis service (ElevenLabs)
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Object storage (S3)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Paper sources and local file locations
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds. A podcast generation chains four remote
    /// services, so this is generous.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// API key (FIRECRAWL_API_KEY)
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_extraction_base")]
    pub api_base: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_extraction_timeout")]
    pub timeout_secs: u64,

    /// Delay between status polls of an extraction job
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Maximum number of status polls before giving up on a job
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// API key (GROQ_API_KEY)
    pub api_key: Option<String>,

    /// Chat completions endpoint
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Default model
    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpeechConfig {
    /// API key (ELEVENLABS_API_KEY)
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_speech_base")]
    pub api_base: String,

    /// Voice identifier
    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    /// Synthesis model
    #[serde(default = "default_speech_model")]
    pub model_id: String,

    /// Request timeout in seconds
    #[serde(default = "default_speech_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Bucket name (S3_BUCKET_NAME)
    pub bucket: Option<String>,

    /// Region (AWS_REGION); falls back to the AWS default provider chain
    pub region: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    /// Journal listing page the recent papers are extracted from
    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    /// Number of papers requested from the extractor (advisory)
    #[serde(default = "default_paper_count")]
    pub paper_count: u32,

    /// Pre-fetched paper listing
    #[serde(default = "default_paper_list_path")]
    pub paper_list_path: PathBuf,

    /// Directory holding the local paper batch
    #[serde(default = "default_papers_dir")]
    pub papers_dir: PathBuf,

    /// File names of the local paper batch, in processing order
    #[serde(default = "default_local_paper_files")]
    pub local_paper_files: Vec<String>,

    /// Output directory for per-paper summaries
    #[serde(default = "default_summaries_dir")]
    pub summaries_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error) or a full EnvFilter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5000 }
fn default_request_timeout() -> u64 { 600 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_extraction_base() -> String { "https://api.firecrawl.dev".to_string() }
fn default_extraction_timeout() -> u64 { 60 }
fn default_poll_interval() -> u64 { 2000 }
fn default_max_polls() -> u32 { 90 }
fn default_llm_endpoint() -> String { "https://api.groq.com/openai/v1/chat/completions".to_string() }
fn default_llm_model() -> String { crate::DEFAULT_COMPLETION_MODEL.to_string() }
fn default_temperature() -> f32 { 0.3 }
fn default_max_tokens() -> u32 { 2048 }
fn default_llm_timeout() -> u64 { 120 }
fn default_speech_base() -> String { "https://api.elevenlabs.io".to_string() }
fn default_voice_id() -> String { "ErXwobaYiN019PkySvjV".to_string() }
fn default_speech_model() -> String { "eleven_turbo_v2".to_string() }
fn default_speech_timeout() -> u64 { 300 }
fn default_listing_url() -> String { "https://medrxiv.org/collection/cardiovascular-medicine".to_string() }
fn default_paper_count() -> u32 { 3 }
fn default_paper_list_path() -> PathBuf { PathBuf::from("paper_list.json") }
fn default_papers_dir() -> PathBuf { PathBuf::from("papers") }
fn default_local_paper_files() -> Vec<String> {
    vec!["paper1.json".to_string(), "paper2.json".to_string(), "paper3.json".to_string()]
}
fn default_summaries_dir() -> PathBuf { PathBuf::from("summaries") }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "medicast".to_string() }

/// Service credentials read from their conventional variable names,
/// mapped onto config keys.
const CREDENTIAL_ENV_KEYS: &[(&str, &str)] = &[
    ("FIRECRAWL_API_KEY", "extraction.api_key"),
    ("GROQ_API_KEY", "llm.api_key"),
    ("ELEVENLABS_API_KEY", "speech.api_key"),
    ("S3_BUCKET_NAME", "storage.bucket"),
    ("AWS_REGION", "storage.region"),
];

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let mut builder = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            );

        for (var, key) in CREDENTIAL_ENV_KEYS {
            let value = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(*key, value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Load from a specific config file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_extraction_base(),
            timeout_secs: default_extraction_timeout(),
            poll_interval_ms: default_poll_interval(),
            max_polls: default_max_polls(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_speech_base(),
            voice_id: default_voice_id(),
            model_id: default_speech_model(),
            timeout_secs: default_speech_timeout(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            paper_count: default_paper_count(),
            paper_list_path: default_paper_list_path(),
            papers_dir: default_papers_dir(),
            local_paper_files: default_local_paper_files(),
            summaries_dir: default_summaries_dir(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            extraction: ExtractionConfig::default(),
            llm: LlmConfig::default(),
            speech: SpeechConfig::default(),
            storage: StorageConfig::default(),
            sources: SourcesConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}
