//! Autosave snapshots of an editing session
//!
//! A snapshot holds everything needed to rebuild a session: the edited
//! document, the change log with its cursor, and the original container bytes
//! (so export can still project edits onto the source parts).

use crate::{Result, StoreError};
use chrono::{DateTime, Utc};
use doc_model::{ChangeRecord, Document};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File name used by [`FileSnapshotStore`]
pub const AUTOSAVE_KEY: &str = "deck-autosave.json";

/// Serialized session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutosaveSnapshot {
    pub document: Document,
    /// Number of applied records in `changes`
    pub history_position: usize,
    pub changes: Vec<ChangeRecord>,
    /// Original container bytes, base64 in the serialized form
    #[serde(with = "base64_bytes")]
    pub source: Vec<u8>,
    pub saved_at: DateTime<Utc>,
}

impl AutosaveSnapshot {
    pub fn new(
        document: Document,
        history_position: usize,
        changes: Vec<ChangeRecord>,
        source: Vec<u8>,
    ) -> Self {
        Self {
            document,
            history_position,
            changes,
            source,
            saved_at: Utc::now(),
        }
    }
}

/// Where autosave snapshots are kept
pub trait SnapshotStore {
    fn save(&self, snapshot: &AutosaveSnapshot) -> Result<()>;

    /// The last saved snapshot, if any
    fn load(&self) -> Result<Option<AutosaveSnapshot>>;

    fn clear(&self) -> Result<()>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<S> {
    fn save(&self, snapshot: &AutosaveSnapshot) -> Result<()> {
        (**self).save(snapshot)
    }

    fn load(&self) -> Result<Option<AutosaveSnapshot>> {
        (**self).load()
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// Snapshot store backed by a JSON file under a directory
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(AUTOSAVE_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, snapshot: &AutosaveSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write then rename so a crash mid-write leaves the previous snapshot
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec(snapshot)?)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::debug!("Autosaved {} changes to {}", snapshot.changes.len(), self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<AutosaveSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read(&self.path)?;
        Ok(Some(serde_json::from_slice(&content)?))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

/// In-memory snapshot store
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshot: Mutex<Option<AutosaveSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&self, snapshot: &AutosaveSnapshot) -> Result<()> {
        *self.lock()? = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<AutosaveSnapshot>> {
        Ok(self.lock()?.clone())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

impl MemorySnapshotStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<AutosaveSnapshot>>> {
        self.snapshot
            .lock()
            .map_err(|_| StoreError::InvalidFormat("autosave snapshot lock poisoned".to_string()))
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
