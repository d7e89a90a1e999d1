use async_trait::async_trait;
use parking_lot::RwLock;
use pinhole_core::error::Result;
use pinhole_core::{ArchiveRepository, Ownership, ShortId};
use std::collections::HashMap;
use tracing::{debug, trace};

/// In-memory user archive.
///
/// Maps a user token to the ids it created, each with a liveness flag.
/// Entries are never removed; deleting only clears the flag.
#[derive(Debug, Default)]
pub struct UserArchive {
    entries: RwLock<HashMap<String, HashMap<ShortId, bool>>>,
}

impl UserArchive {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArchiveRepository for UserArchive {
    async fn record_ownership(&self, user_token: &str, id: &ShortId) -> Result<()> {
        if user_token.is_empty() {
            return Ok(());
        }

        self.entries
            .write()
            .entry(user_token.to_owned())
            .or_default()
            .insert(id.clone(), true);
        trace!(id = %id, "recorded ownership");
        Ok(())
    }

    async fn list_live(&self, user_token: &str) -> Result<Option<Vec<ShortId>>> {
        let entries = self.entries.read();
        let Some(owned) = entries.get(user_token) else {
            return Ok(None);
        };

        let mut live: Vec<ShortId> = owned
            .iter()
            .filter(|(_, is_live)| **is_live)
            .map(|(id, _)| id.clone())
            .collect();
        live.sort_by_key(ShortId::sequence);
        Ok(Some(live))
    }

    async fn liveness(&self, user_token: &str, id: &ShortId) -> Result<Ownership> {
        let entries = self.entries.read();
        let ownership = match entries.get(user_token).and_then(|owned| owned.get(id)) {
            None => Ownership::Unowned,
            Some(true) => Ownership::Live,
            Some(false) => Ownership::Tombstoned,
        };
        Ok(ownership)
    }

    async fn tombstone(&self, user_token: &str, ids: &[ShortId]) -> Result<()> {
        let mut entries = self.entries.write();
        let Some(owned) = entries.get_mut(user_token) else {
            return Ok(());
        };

        let mut tombstoned = 0usize;
        for id in ids {
            if let Some(is_live) = owned.get_mut(id) {
                *is_live = false;
                tombstoned += 1;
            }
        }
        debug!(requested = ids.len(), tombstoned, "tombstoned user urls");
        Ok(())
    }
}
