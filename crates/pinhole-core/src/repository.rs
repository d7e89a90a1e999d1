use crate::error::Result;
use crate::short_id::ShortId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A stored URL record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The identifier allocated for the URL.
    pub id: ShortId,
    /// The original URL that was shortened.
    pub original_url: String,
}

/// Outcome of storing an original URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// The identifier the URL maps to.
    pub id: ShortId,
    /// `true` when the URL was stored before and the existing id was reused.
    pub already_existed: bool,
}

/// Relationship between a user token and a short id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The user never shortened this id.
    Unowned,
    /// The user shortened this id and has not deleted it.
    Live,
    /// The user shortened this id and later deleted it.
    Tombstoned,
}

/// Bidirectional mapping between original URLs and short ids.
#[async_trait]
pub trait UrlRepository: Send + Sync + 'static {
    /// Returns the id for `original_url`, allocating a new one when the URL
    /// has never been seen. URLs are compared verbatim.
    async fn shorten(&self, original_url: &str) -> Result<Allocation>;

    /// Retrieves the original URL for a given id.
    /// Returns `None` if the id was never allocated.
    async fn resolve(&self, id: &ShortId) -> Result<Option<String>>;

    /// Resolves several ids at once, skipping unknown ones.
    async fn resolve_many(&self, ids: &[ShortId]) -> Result<Vec<UrlRecord>>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Per-user record of created short ids, with soft delete.
///
/// An empty user token means "anonymous": nothing is recorded for it.
#[async_trait]
pub trait ArchiveRepository: Send + Sync + 'static {
    /// Records that `user_token` created `id`. Idempotent; revives a
    /// tombstoned entry.
    async fn record_ownership(&self, user_token: &str, id: &ShortId) -> Result<()>;

    /// Lists the live ids of a user.
    ///
    /// Returns `None` when the user never created anything, and an empty list
    /// when everything the user created has been deleted.
    async fn list_live(&self, user_token: &str) -> Result<Option<Vec<ShortId>>>;

    /// Reports whether `user_token` owns `id` and whether it is still live.
    async fn liveness(&self, user_token: &str, id: &ShortId) -> Result<Ownership>;

    /// Marks the given ids as deleted for `user_token`.
    /// Ids the user does not own are ignored.
    async fn tombstone(&self, user_token: &str, ids: &[ShortId]) -> Result<()>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
