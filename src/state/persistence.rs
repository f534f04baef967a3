use crate::document::{Document, DocumentError};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during document persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend failed: {0}")]
    Store(String),

    #[error("Stored document is invalid: {0}")]
    InvalidDocument(#[from] DocumentError),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Asynchronous string key-value storage the document is saved into.
pub trait KeyValueStore: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, PersistenceResult<Option<String>>>;

    fn set<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, PersistenceResult<()>>;
}

/// In-process store, used by tests and as the wasm fallback.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, PersistenceResult<Option<String>>> {
        Box::pin(async move { Ok(self.values.lock().get(key).cloned()) })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, PersistenceResult<()>> {
        Box::pin(async move {
            self.values.lock().insert(key.to_owned(), value);
            Ok(())
        })
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, PersistenceResult<Option<String>>> {
        Box::pin(async move {
            match fs::read_to_string(self.path_for(key)) {
                Ok(value) => Ok(Some(value)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            }
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, PersistenceResult<()>> {
        Box::pin(async move {
            fs::create_dir_all(&self.dir)?;
            // Overlapping saves each write their own temp file; the last rename wins.
            let tmp = self
                .dir
                .join(format!("{key}.{}.tmp", uuid::Uuid::new_v4().simple()));
            fs::write(&tmp, value)?;
            fs::rename(&tmp, self.path_for(key))?;
            Ok(())
        })
    }
}

pub fn encode_document(document: &Document) -> PersistenceResult<String> {
    Ok(serde_json::to_string(document)?)
}

/// Parses and validates a stored document.
pub fn decode_document(json: &str) -> PersistenceResult<Document> {
    let document: Document = serde_json::from_str(json)?;
    document.validate()?;
    Ok(document)
}

/// Loads and saves the document under one fixed key. The logging entry points
/// never fail; the `try_` variants report errors to the caller.
#[derive(Clone)]
pub struct PersistenceAdapter {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl PersistenceAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>, key: &str) -> Self {
        Self {
            store,
            key: key.to_owned(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn try_load(&self) -> PersistenceResult<Option<Document>> {
        match self.store.get(&self.key).await? {
            Some(json) => decode_document(&json).map(Some),
            None => Ok(None),
        }
    }

    /// Returns the stored document, or `None` when nothing usable is stored.
    pub async fn load(&self) -> Option<Document> {
        match self.try_load().await {
            Ok(Some(document)) => {
                log::info!(
                    "Loaded {}x{} document with {} layers and {} frames",
                    document.width(),
                    document.height(),
                    document.layers().len(),
                    document.frame_count()
                );
                Some(document)
            }
            Ok(None) => None,
            Err(err) => {
                log::error!("Failed to load document '{}': {}", self.key, err);
                None
            }
        }
    }

    pub async fn try_save(&self, document: &Document) -> PersistenceResult<()> {
        let json = encode_document(document)?;
        self.store.set(&self.key, json).await
    }

    /// Best-effort save; failures are logged.
    pub async fn save(&self, document: &Document) {
        if let Err(err) = self.try_save(document).await {
            log::error!("Failed to save document '{}': {}", self.key, err);
        }
    }
}

/// Debounces autosave requests into a single deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveScheduler {
    debounce: f64,
    deadline: Option<f64>,
    requests: u64,
}

impl SaveScheduler {
    pub fn new(debounce_secs: f64) -> Self {
        Self {
            debounce: debounce_secs.max(0.0),
            deadline: None,
            requests: 0,
        }
    }

    /// Requests a save `debounce` seconds from `now`, replacing any pending one.
    pub fn schedule(&mut self, now: f64) {
        self.deadline = Some(now + self.debounce);
        self.requests += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the pending deadline has passed.
    pub fn take_due(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// How many times a save has been scheduled.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}
