//! In-memory snapshot repository for testing.
//!
//! This adapter provides a pure in-memory implementation of SnapshotRepository,
//! enabling fast tests without any file system I/O.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{Result, error::Error, ports::SnapshotRepository, q_learning::TableSnapshot};

/// In-memory repository for testing.
///
/// Snapshots are encoded with MessagePack exactly as on disk, so encoding
/// failures still surface. Clones share the same storage, which lets a test
/// keep a handle while the training loop owns another.
///
/// # Examples
///
/// ```
/// use flappy_q::adapters::InMemoryRepository;
/// use flappy_q::ports::SnapshotRepository;
/// use flappy_q::q_learning::QTable;
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let table = QTable::new([6, 6, 6, 2], 0.7, 0.8);
///
/// repo.save(&table.to_snapshot(), Path::new("snapshot"))?;
/// let loaded = repo.load(Path::new("snapshot"))?;
/// assert_eq!(loaded.values.len(), 432);
/// # Ok::<(), flappy_q::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<BTreeMap<PathBuf, Vec<u8>>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<u8>>> {
        self.storage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get the number of snapshots currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Paths of all stored snapshots, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.storage().keys().cloned().collect()
    }

    /// Clear all stored snapshots.
    pub fn clear(&self) {
        self.storage().clear();
    }

    /// Check if a snapshot exists at the given path.
    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(path)
    }
}

impl SnapshotRepository for InMemoryRepository {
    fn save(&self, snapshot: &TableSnapshot, path: &Path) -> Result<()> {
        let bytes = rmp_serde::to_vec(snapshot).map_err(|e| Error::SerializationContext {
            operation: "serialize q-table for in-memory storage".to_string(),
            message: e.to_string(),
        })?;

        self.storage().insert(path.to_path_buf(), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<TableSnapshot> {
        let storage = self.storage();

        let bytes = storage.get(path).ok_or_else(|| Error::Io {
            operation: format!("load q-table from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;

        rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
            operation: "deserialize q-table from in-memory storage".to_string(),
            message: e.to_string(),
        })
    }
}
