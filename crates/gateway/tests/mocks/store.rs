use async_trait::async_trait;
use medicast_common::{errors::Result, ObjectStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const PUBLIC_BASE: &str = "https://podcasts.test";

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// In-memory bucket
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    pub lookups: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.lookups.lock().unwrap().push(key.to_string());
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    fn public_url(&self, key: &str) -> Result<String> {
        Ok(format!("{}/{}", PUBLIC_BASE, key))
    }
}
