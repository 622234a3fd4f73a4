//! MessagePack implementation of the snapshot repository.
//!
//! This adapter implements the SnapshotRepository port using rmp_serde for
//! compact binary serialization.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::{Result, error::Error, ports::SnapshotRepository, q_learning::TableSnapshot};

/// File extension used for snapshots written by [`MsgPackRepository`].
pub const SNAPSHOT_EXTENSION: &str = "msgpack";

/// MessagePack-based snapshot repository.
///
/// # Examples
///
/// ```no_run
/// use flappy_q::adapters::MsgPackRepository;
/// use flappy_q::ports::SnapshotRepository;
/// use flappy_q::q_learning::QTable;
/// use std::path::Path;
///
/// let repo = MsgPackRepository;
/// let table = QTable::new([6, 6, 6, 2], 0.7, 0.8);
///
/// repo.save(&table.to_snapshot(), Path::new("301_42.msgpack"))?;
/// let loaded = repo.load(Path::new("301_42.msgpack"))?;
/// # Ok::<(), flappy_q::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    /// Create a new MessagePack repository.
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotRepository for MsgPackRepository {
    fn save(&self, snapshot: &TableSnapshot, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, snapshot).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize q-table to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;
        writer.flush().map_err(|source| Error::Io {
            operation: format!("write file {path:?}"),
            source,
        })?;

        Ok(())
    }

    fn load(&self, path: &Path) -> Result<TableSnapshot> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        rmp_serde::decode::from_read(BufReader::new(file)).map_err(|e| {
            Error::SerializationContext {
                operation: "deserialize q-table from MessagePack".to_string(),
                message: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        q_learning::QTable,
        types::{Action, DiscreteState},
    };

    #[test]
    fn test_msgpack_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("table.msgpack");

        let mut table = QTable::new([6, 6, 6, 2], 0.7, 0.8);
        table.set(&DiscreteState::new(3, 1, 4), Action::Flap, -700.0);

        let repo = MsgPackRepository::new();
        repo.save(&table.to_snapshot(), &file_path)
            .expect("Failed to save");
        let loaded = repo.load(&file_path).expect("Failed to load");

        assert_eq!(loaded, table.to_snapshot());
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let repo = MsgPackRepository::new();
        let result = repo.load(Path::new("/tmp/nonexistent_12345.msgpack"));
        assert!(result.is_err());
    }

    #[test]
    fn test_save_to_invalid_path_returns_error() {
        let repo = MsgPackRepository::new();
        let table = QTable::new([2, 2, 2, 2], 0.7, 0.8);
        let result = repo.save(
            &table.to_snapshot(),
            Path::new("/invalid_dir_12345/file.msgpack"),
        );
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
