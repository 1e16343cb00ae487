//! Knowledge entries and the stores that hold them.
//!
//! A [`KnowledgeEntry`] is a canned question/answer pair. The matcher never
//! edits an answer; whatever text is stored is exactly what the visitor sees.
//!
//! Stores are read once per request. There is no cache, so an administrative
//! edit is visible on the very next message.
//!
//! # Implementations
//!
//! - `PostgresKnowledgeStore` (in `dudu-hub-postgres`): production table
//! - [`JsonFileKnowledgeStore`]: a JSON file on disk, handy for small deployments
//! - `InMemoryKnowledgeStore` (in `dudu-hub-testing`): deterministic tests

use crate::BoxFuture;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// A stored question/answer pair used for keyword matching.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Trigger phrase the visitor's message is scored against.
    pub question: String,
    /// Reply returned verbatim when this entry wins.
    pub answer: String,
}

impl KnowledgeEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Errors that can occur while reading or writing knowledge entries.
#[derive(Error, Debug)]
pub enum KnowledgeStoreError {
    /// Database connection or query failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// File could not be read or written.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Stored data could not be decoded or encoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Read access to the knowledge snapshot plus administrative appends.
///
/// # Ordering
///
/// `load_entries` must return entries in a stable storage order. The matcher
/// breaks score ties in favour of the earlier entry, so a store that shuffles
/// its output makes matching non-deterministic.
pub trait KnowledgeStore: Send + Sync {
    /// Load every entry, in storage order.
    ///
    /// # Errors
    ///
    /// Returns a [`KnowledgeStoreError`] if the backing store cannot be read.
    fn load_entries(&self) -> BoxFuture<'_, Result<Vec<KnowledgeEntry>, KnowledgeStoreError>>;

    /// Append an entry at the end of the storage order.
    ///
    /// # Errors
    ///
    /// Returns a [`KnowledgeStoreError`] if the entry cannot be persisted.
    fn add_entry(&self, entry: KnowledgeEntry) -> BoxFuture<'_, Result<(), KnowledgeStoreError>>;
}

/// Knowledge store backed by a JSON array of `{ "question", "answer" }` objects.
///
/// The file is re-read on every [`KnowledgeStore::load_entries`] call. A
/// missing file is treated as an empty knowledge base.
///
/// Writes go to a sibling `.tmp` file that is then renamed over the original,
/// so readers see either the old or the new array, never a partial one.
/// Appends through clones of one store are serialized; separate processes
/// writing the same file are not coordinated.
///
/// ```json
/// [
///   { "question": "how to book", "answer": "Step 1: open the Industrial's page..." },
///   { "question": "pricing", "answer": "Packages start at ₹1500." }
/// ]
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileKnowledgeStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileKnowledgeStore {
    /// Create a store reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(path: &Path) -> Result<Vec<KnowledgeEntry>, KnowledgeStoreError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(KnowledgeStoreError::IoError(e.to_string())),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|e| KnowledgeStoreError::SerializationError(e.to_string()))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl KnowledgeStore for JsonFileKnowledgeStore {
    fn load_entries(&self) -> BoxFuture<'_, Result<Vec<KnowledgeEntry>, KnowledgeStoreError>> {
        Box::pin(async move {
            let entries = Self::read_file(&self.path).await?;
            tracing::debug!(path = %self.path.display(), count = entries.len(), "Loaded knowledge file");
            Ok(entries)
        })
    }

    fn add_entry(&self, entry: KnowledgeEntry) -> BoxFuture<'_, Result<(), KnowledgeStoreError>> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;

            let mut entries = Self::read_file(&self.path).await?;
            entries.push(entry);

            let encoded = serde_json::to_string_pretty(&entries)
                .map_err(|e| KnowledgeStoreError::SerializationError(e.to_string()))?;

            let temp = self.temp_path();
            tokio::fs::write(&temp, encoded)
                .await
                .map_err(|e| KnowledgeStoreError::IoError(e.to_string()))?;
            tokio::fs::rename(&temp, &self.path)
                .await
                .map_err(|e| KnowledgeStoreError::IoError(e.to_string()))?;

            tracing::info!(path = %self.path.display(), count = entries.len(), "Knowledge entry added");
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn test_entry_serialization() {
        let entry = KnowledgeEntry::new("pricing", "Starts at 1500");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"question":"pricing","answer":"Starts at 1500"}"#);
    }

    #[tokio::test]
    async fn test_json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileKnowledgeStore::new(dir.path().join("missing.json"));

        let entries = store.load_entries().await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_json_store_preserves_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge.json");
        std::fs::write(
            &path,
            r#"[{"question":"how to book","answer":"Step 1..."},{"question":"pricing","answer":"Starts at 1500"}]"#,
        )
        .unwrap();

        let store = JsonFileKnowledgeStore::new(&path);
        let entries = store.load_entries().await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].question, "how to book");
        assert_eq!(entries[1].question, "pricing");
    }

    #[tokio::test]
    async fn test_json_store_add_entry_appends() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileKnowledgeStore::new(dir.path().join("knowledge.json"));

        store.add_entry(KnowledgeEntry::new("first", "one")).await.unwrap();
        store.add_entry(KnowledgeEntry::new("second", "two")).await.unwrap();

        let entries = store.load_entries().await.unwrap();
        assert_eq!(
            entries,
            vec![KnowledgeEntry::new("first", "one"), KnowledgeEntry::new("second", "two")]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_json_store_concurrent_adds_and_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge.json");
        let store = JsonFileKnowledgeStore::new(&path);

        let writers: Vec<_> = (0..10)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .add_entry(KnowledgeEntry::new(format!("question {i}"), "answer"))
                        .await
                })
            })
            .collect();

        let reader = {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    store.load_entries().await?;
                    tokio::task::yield_now().await;
                }
                Ok::<_, KnowledgeStoreError>(())
            })
        };

        for writer in writers {
            writer.await.unwrap().unwrap();
        }
        reader.await.unwrap().unwrap();

        assert_eq!(store.load_entries().await.unwrap().len(), 10);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_json_store_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileKnowledgeStore::new(&path);
        let result = store.load_entries().await;

        assert!(matches!(result, Err(KnowledgeStoreError::SerializationError(_))));
    }
}
