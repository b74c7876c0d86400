use async_trait::async_trait;
use sentiment_web::{
    Error, Result,
    assets::ObjectStore,
    model::{Sentiment, SentimentModel},
};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory bucket. Keys registered with `with_failure` fail like a dropped connection.
#[derive(Debug, Default)]
pub struct MockObjectStore {
    objects: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, key: &str, bytes: Vec<u8>) -> Self {
        self.objects.insert(key.to_string(), bytes);
        self
    }

    pub fn with_failure(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    pub fn requested_keys(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    fn describe(&self) -> String {
        "mock://test-bucket".to_string()
    }

    async fn download(&self, key: &str, destination: &Path) -> Result<u64> {
        self.requests.lock().unwrap().push(key.to_string());

        if self.failing.contains(key) {
            return Err(Error::storage(format!("connection reset while fetching {key}")));
        }

        let bytes = self
            .objects
            .get(key)
            .ok_or_else(|| Error::storage(format!("NoSuchKey: {key}")))?;
        tokio::fs::write(destination, bytes).await?;
        Ok(bytes.len() as u64)
    }
}

/// Returns a fixed label, or fails every call when built with `failing()`.
#[derive(Debug)]
pub struct MockSentimentModel {
    response: Option<Sentiment>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl MockSentimentModel {
    pub fn new(response: Sentiment) -> Self {
        Self {
            response: Some(response),
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl SentimentModel for MockSentimentModel {
    fn classify(&self, text: &str) -> Result<Sentiment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(text.to_string());

        self.response
            .ok_or_else(|| Error::model("mock inference failure"))
    }
}
