//! Layout storage keyed by session.
//!
//! A [`LayoutStore`] keeps one [`LayoutDocument`] per session in memory and,
//! when created with a data directory, mirrors every save to
//! `{data_dir}/{session}.json`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{DeckError, DeckScene, LayoutDocument};

/// Default session identifier.
pub const DEFAULT_SESSION: &str = "default";

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested session does not exist.
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    /// The store has no data directory.
    #[error("No data directory configured")]
    NoDataDir,
    /// The layout could not be snapshotted or rebuilt.
    #[error("Layout error: {0}")]
    Layout(#[from] DeckError),
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Thread-safe layout storage.
#[derive(Debug, Clone, Default)]
pub struct LayoutStore {
    documents: Arc<RwLock<HashMap<String, LayoutDocument>>>,
    /// Optional data directory for filesystem persistence.
    data_dir: Option<PathBuf>,
}

impl LayoutStore {
    /// Create an in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with filesystem persistence.
    ///
    /// The directory is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            documents: Arc::default(),
            data_dir: Some(data_dir),
        })
    }

    /// The data directory, if any.
    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Snapshot a scene into a session and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Layout`] if the scene has no deck, or an I/O or
    /// serialization error if writing to disk fails.
    pub fn save(&self, session_id: &str, scene: &DeckScene) -> Result<LayoutDocument, StoreError> {
        let doc = LayoutDocument::from_scene(session_id, scene, current_timestamp_ms())?;
        self.persist(&doc)?;
        {
            let mut documents = self
                .documents
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            documents.insert(session_id.to_string(), doc.clone());
        }
        tracing::info!("Saved session {session_id} ({} resources)", doc.layout.count());
        Ok(doc)
    }

    /// Get a session's document.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<LayoutDocument> {
        let documents = self
            .documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        documents.get(session_id).cloned()
    }

    /// Rebuild a session's scene.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SessionNotFound`] or [`StoreError::Layout`].
    pub fn open(&self, session_id: &str) -> Result<DeckScene, StoreError> {
        let doc = self
            .get(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        Ok(doc.to_scene()?)
    }

    /// All session IDs held in memory, sorted.
    #[must_use]
    pub fn session_ids(&self) -> Vec<String> {
        let documents = self
            .documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut ids: Vec<_> = documents.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Remove a session from memory and disk. Returns whether it existed in memory.
    pub fn delete(&self, session_id: &str) -> bool {
        let existed = {
            let mut documents = self
                .documents
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            documents.remove(session_id).is_some()
        };
        self.delete_session_file(session_id);
        existed
    }

    /// Drop every session from memory. Files on disk are kept.
    pub fn clear(&self) {
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        documents.clear();
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn persist(&self, doc: &LayoutDocument) -> Result<(), StoreError> {
        let Some(ref data_dir) = self.data_dir else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let path = session_path(data_dir, &doc.session_id);
        std::fs::write(&path, json)?;
        tracing::debug!("Persisted session {} to {}", doc.session_id, path.display());
        Ok(())
    }

    /// Load a single session from disk into memory.
    ///
    /// The document is stored under the session ID it was saved with.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no data directory or the file doesn't
    /// exist or can't be parsed.
    pub fn load_session_from_disk(&self, session_id: &str) -> Result<(), StoreError> {
        let data_dir = self.data_dir.as_ref().ok_or(StoreError::NoDataDir)?;
        self.load_file(&session_path(data_dir, session_id))?;
        Ok(())
    }

    /// Discover and load all persisted sessions from the data directory.
    ///
    /// Files that fail to parse are logged and skipped. Returns the IDs that
    /// were loaded, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory can't be read.
    pub fn load_all_sessions(&self) -> Result<Vec<String>, StoreError> {
        let data_dir = self.data_dir.as_ref().ok_or(StoreError::NoDataDir)?;
        let mut session_ids = Vec::new();
        for entry in std::fs::read_dir(data_dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            match self.load_file(&path) {
                Ok(session_id) => session_ids.push(session_id),
                Err(e) => tracing::warn!("Skipping {}: {e}", path.display()),
            }
        }
        session_ids.sort();
        Ok(session_ids)
    }

    fn load_file(&self, path: &Path) -> Result<String, StoreError> {
        let contents = std::fs::read_to_string(path)?;
        let doc: LayoutDocument = serde_json::from_str(&contents)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let session_id = doc.session_id.clone();

        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        documents.insert(session_id.clone(), doc);
        Ok(session_id)
    }

    /// Remove a session's persisted file from disk.
    ///
    /// No-op if the store has no data directory or the file doesn't exist.
    fn delete_session_file(&self, session_id: &str) {
        let Some(ref data_dir) = self.data_dir else {
            return;
        };
        let path = session_path(data_dir, session_id);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!("Failed to delete session file {}: {e}", path.display());
            }
        }
    }
}

fn session_path(data_dir: &Path, session_id: &str) -> PathBuf {
    data_dir.join(format!("{}.json", sanitize_filename(session_id)))
}

/// Sanitize a session ID for use as a filename.
///
/// Replaces any character that is not alphanumeric, `-`, or `_` with `_`.
fn sanitize_filename(session_id: &str) -> String {
    session_id
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Get the current Unix timestamp in milliseconds.
fn current_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        // Timestamp will not exceed u64 max for millennia
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}
