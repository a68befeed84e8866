//! Speech synthesis and storage pipeline
//!
//! Every generation gets a fresh identifier and therefore a fresh object
//! key; an episode is never regenerated in place.

use crate::errors::{AppError, Result};
use crate::metrics::{self, ExternalCall, Service};
use crate::models::PodcastAudio;
use crate::speech::{collect_audio, SpeechSynthesizer};
use crate::storage::ObjectStore;
use std::sync::Arc;
use uuid::Uuid;

pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Object key for an episode
pub fn podcast_key(podcast_id: &Uuid) -> String {
    format!("podcasts/{}.mp3", podcast_id)
}

/// Turns transcripts into stored episodes and finds them again
#[derive(Clone)]
pub struct PodcastStudio {
    speech: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn ObjectStore>,
}

impl PodcastStudio {
    pub fn new(speech: Arc<dyn SpeechSynthesizer>, store: Arc<dyn ObjectStore>) -> Self {
        Self { speech, store }
    }

    /// Synthesize `transcript`, upload the audio and return its public URL.
    ///
    /// The whole payload is collected before upload, so a stream failure
    /// leaves nothing in storage.
    pub async fn synthesize_and_store(&self, transcript: &str) -> Result<PodcastAudio> {
        let podcast_id = Uuid::new_v4();
        let object_key = podcast_key(&podcast_id);

        let call = ExternalCall::start(Service::Speech);
        let audio = match self.speech.synthesize(transcript).await {
            Ok(stream) => collect_audio(stream).await,
            Err(e) => Err(e),
        };
        let latency_ms = call.finish(audio.is_ok());
        let audio = audio?;

        tracing::info!(
            podcast_id = %podcast_id,
            bytes = audio.len(),
            latency_ms,
            "Audio synthesized"
        );

        let size = audio.len();
        self.store.put(&object_key, audio, AUDIO_CONTENT_TYPE).await?;
        let audio_url = self.store.public_url(&object_key)?;

        metrics::record_podcast(size);

        Ok(PodcastAudio {
            podcast_id,
            object_key,
            audio_url,
        })
    }

    /// Find a stored episode.
    ///
    /// Identifiers that are not UUIDs were never issued and are reported
    /// as not found without a storage round trip.
    pub async fn lookup(&self, podcast_id: &str) -> Result<PodcastAudio> {
        let not_found = || AppError::PodcastNotFound {
            id: podcast_id.to_string(),
        };

        let id = Uuid::parse_str(podcast_id).map_err(|_| not_found())?;
        let object_key = podcast_key(&id);

        if !self.store.exists(&object_key).await? {
            return Err(not_found());
        }

        let audio_url = self.store.public_url(&object_key)?;
        Ok(PodcastAudio {
            podcast_id: id,
            object_key,
            audio_url,
        })
    }
}
