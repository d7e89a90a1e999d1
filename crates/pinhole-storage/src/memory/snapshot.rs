use pinhole_core::error::{Result, StorageError};
use pinhole_core::ShortId;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A JSON file holding the forward index (`short id -> original URL`).
///
/// The whole map is rewritten on every save. This keeps the format trivial
/// but makes each insertion cost a full serialization of the store.
#[derive(Debug, Clone)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    /// Creates a snapshot backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the forward index.
    ///
    /// A missing or unreadable file is not fatal: a warning is logged and an
    /// empty map is returned.
    pub fn load(&self) -> HashMap<ShortId, String> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "snapshot could not be read, starting empty"
                );
                return HashMap::new();
            }
        };

        match serde_json::from_slice::<HashMap<ShortId, String>>(&bytes) {
            Ok(forward) => {
                info!(path = %self.path.display(), records = forward.len(), "loaded snapshot");
                forward
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "snapshot is corrupted, starting empty"
                );
                HashMap::new()
            }
        }
    }

    /// Overwrites the file with the given forward index.
    pub fn save(&self, forward: &HashMap<ShortId, String>) -> Result<()> {
        let bytes = serde_json::to_vec(forward).map_err(|e| {
            StorageError::Persistence(format!("failed to serialize snapshot: {e}"))
        })?;

        std::fs::write(&self.path, bytes).map_err(|e| {
            StorageError::Persistence(format!(
                "failed to write snapshot '{}': {e}",
                self.path.display()
            ))
        })?;

        debug!(path = %self.path.display(), records = forward.len(), "snapshot written");
        Ok(())
    }
}
