//! Speech synthesis
//!
//! The synthesizer yields audio as an ordered stream of chunks; the caller
//! decides how to consume it.

use crate::config::SpeechConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use serde::Serialize;
use std::time::Duration;

/// Ordered audio chunks; an `Err` item ends the stream
pub type AudioStream = BoxStream<'static, Result<Vec<u8>>>;

/// Trait for text-to-speech providers
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Start synthesis of `text` and return the chunk stream
    async fn synthesize(&self, text: &str) -> Result<AudioStream>;
}

/// Drain a chunk stream into one payload, in order.
///
/// A failing chunk aborts collection; nothing partial is returned.
pub async fn collect_audio(mut stream: AudioStream) -> Result<Vec<u8>> {
    let mut audio = Vec::new();
    while let Some(chunk) = stream.next().await {
        audio.extend_from_slice(&chunk?);
    }
    Ok(audio)
}

/// ElevenLabs streaming text-to-speech client
pub struct ElevenLabsClient {
    client: reqwest::Client,
    config: SpeechConfig,
}

#[derive(Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

impl ElevenLabsClient {
    pub fn new(config: SpeechConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}/stream",
            self.config.api_base.trim_end_matches('/'),
            self.config.voice_id
        )
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, text: &str) -> Result<AudioStream> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AppError::MissingCredential { name: "ELEVENLABS_API_KEY" })?;

        let response = self.client
            .post(self.stream_url())
            .header("xi-api-key", api_key)
            .header("Accept", "audio/mpeg")
            .json(&TtsRequest {
                text,
                model_id: &self.config.model_id,
            })
            .send()
            .await
            .map_err(|e| AppError::Synthesis {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Synthesis {
                message: format!("API error {}: {}", status, body),
            });
        }

        tracing::debug!(
            voice_id = %self.config.voice_id,
            model_id = %self.config.model_id,
            chars = text.len(),
            "Speech stream opened"
        );

        Ok(response
            .bytes_stream()
            .map_ok(|chunk| chunk.to_vec())
            .map_err(|e| AppError::Synthesis {
                message: format!("Audio stream interrupted: {}", e),
            })
            .boxed())
    }
}
