use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use medicast_common::{
    errors::{AppError, Result},
    speech::AudioStream,
    SpeechSynthesizer,
};
use std::sync::{Arc, Mutex};

/// Streams fixed audio chunks
#[derive(Clone)]
pub struct MockSpeech {
    pub chunks: Vec<Vec<u8>>,
    pub texts: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

impl MockSpeech {
    pub fn new(chunks: &[&[u8]]) -> Self {
        Self {
            chunks: chunks.iter().map(|chunk| chunk.to_vec()).collect(),
            texts: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    async fn synthesize(&self, text: &str) -> Result<AudioStream> {
        self.texts.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(AppError::Synthesis {
                message: "quota exceeded".to_string(),
            });
        }
        Ok(stream::iter(self.chunks.clone().into_iter().map(Ok)).boxed())
    }
}
