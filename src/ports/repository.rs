//! Repository port for Q-table persistence.
//!
//! This module defines the trait boundary between the training loop and the
//! storage used for milestone snapshots.

use std::path::Path;

use crate::{Result, q_learning::TableSnapshot};

/// Port for persisting and loading Q-table snapshots.
///
/// # Examples
///
/// ```no_run
/// use flappy_q::ports::SnapshotRepository;
/// use flappy_q::q_learning::TableSnapshot;
/// use std::path::Path;
///
/// fn save_snapshot<R: SnapshotRepository>(
///     repo: &R,
///     snapshot: &TableSnapshot,
///     path: &Path,
/// ) -> flappy_q::Result<()> {
///     repo.save(snapshot, path)
/// }
/// ```
pub trait SnapshotRepository {
    /// Save a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be written or encoding fails.
    fn save(&self, snapshot: &TableSnapshot, path: &Path) -> Result<()>;

    /// Load a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the location does not exist or decoding fails.
    fn load(&self, path: &Path) -> Result<TableSnapshot>;
}

impl<R: SnapshotRepository + ?Sized> SnapshotRepository for std::sync::Arc<R> {
    fn save(&self, snapshot: &TableSnapshot, path: &Path) -> Result<()> {
        (**self).save(snapshot, path)
    }

    fn load(&self, path: &Path) -> Result<TableSnapshot> {
        (**self).load(path)
    }
}
