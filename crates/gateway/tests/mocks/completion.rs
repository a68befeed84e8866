use async_trait::async_trait;
use medicast_common::{
    errors::{AppError, Result},
    CompletionModel,
};
use std::sync::{Arc, Mutex};

/// Replies with a fixed text; fails any prompt containing `fail_on`
#[derive(Clone)]
pub struct MockModel {
    pub reply: String,
    pub fail_on: Option<String>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl MockModel {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail_on: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_on = Some(marker.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionModel for MockModel {
    async fn complete(&self, prompt: &str, _model: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(marker) = &self.fail_on {
            if prompt.contains(marker.as_str()) {
                return Err(AppError::Completion {
                    message: "model overloaded".to_string(),
                });
            }
        }
        Ok(self.reply.clone())
    }
}
