use crate::memory::snapshot::Snapshot;
use async_trait::async_trait;
use parking_lot::RwLock;
use pinhole_core::error::Result;
use pinhole_core::{Allocation, SequentialAllocator, ShortId, UrlRecord, UrlRepository};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct Indices {
    forward: HashMap<ShortId, String>,
    reverse: HashMap<String, ShortId>,
}

impl Indices {
    fn from_forward(forward: HashMap<ShortId, String>) -> Self {
        let mut reverse: HashMap<String, ShortId> = HashMap::with_capacity(forward.len());
        for (id, url) in &forward {
            // A hand-edited snapshot may map one URL twice; keep the oldest id.
            let keep_existing = reverse
                .get(url)
                .is_some_and(|existing| existing.sequence() <= id.sequence());
            if !keep_existing {
                reverse.insert(url.clone(), id.clone());
            }
        }
        Self { forward, reverse }
    }
}

/// In-memory URL store.
///
/// Both indices live behind one `RwLock`, so allocation, insertion and the
/// optional snapshot write form a single critical section. The snapshot is
/// written synchronously while the write lock is held.
#[derive(Debug, Default)]
pub struct UrlStore {
    indices: RwLock<Indices>,
    allocator: SequentialAllocator,
    snapshot: Option<Snapshot>,
}

impl UrlStore {
    /// Creates an empty store without persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store persisted to the JSON file at `path`, loading any
    /// records already saved there.
    pub fn with_snapshot(path: impl Into<PathBuf>) -> Self {
        let snapshot = Snapshot::new(path);
        let indices = Indices::from_forward(snapshot.load());
        Self {
            indices: RwLock::new(indices),
            allocator: SequentialAllocator::new(),
            snapshot: Some(snapshot),
        }
    }

    /// Returns the number of distinct URLs stored.
    pub fn len(&self) -> usize {
        self.indices.read().forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UrlRepository for UrlStore {
    async fn shorten(&self, original_url: &str) -> Result<Allocation> {
        let mut guard = self.indices.write();
        let Indices { forward, reverse } = &mut *guard;

        if let Some(id) = reverse.get(original_url) {
            trace!(id = %id, "url already shortened");
            return Ok(Allocation {
                id: id.clone(),
                already_existed: true,
            });
        }

        let id = self
            .allocator
            .allocate(forward.len(), |candidate| forward.contains_key(candidate));
        forward.insert(id.clone(), original_url.to_owned());
        reverse.insert(original_url.to_owned(), id.clone());

        if let Some(snapshot) = &self.snapshot {
            if let Err(err) = snapshot.save(forward) {
                // Nothing was persisted, so the store must not remember it either.
                forward.remove(&id);
                reverse.remove(original_url);
                return Err(err);
            }
        }
        debug!(id = %id, url = %original_url, "stored new url");

        Ok(Allocation {
            id,
            already_existed: false,
        })
    }

    async fn resolve(&self, id: &ShortId) -> Result<Option<String>> {
        Ok(self.indices.read().forward.get(id).cloned())
    }

    async fn resolve_many(&self, ids: &[ShortId]) -> Result<Vec<UrlRecord>> {
        let indices = self.indices.read();
        Ok(ids
            .iter()
            .filter_map(|id| {
                indices.forward.get(id).map(|url| UrlRecord {
                    id: id.clone(),
                    original_url: url.clone(),
                })
            })
            .collect())
    }
}
