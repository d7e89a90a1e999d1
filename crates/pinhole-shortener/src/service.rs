use async_trait::async_trait;
use pinhole_core::error::StorageError;
use pinhole_core::{
    ArchiveRepository, BatchItem, BatchShortened, Ownership, ShortId, Shortened, Shortener,
    ShortenerError, UrlRepository, UserUrl,
};
use pinhole_storage::{PgArchiveRepository, PgUrlRepository, UrlStore, UserArchive};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, trace};

/// Shortener backed by the in-memory store.
pub type InMemoryShortener = ShortenerService<UrlStore, UserArchive>;

/// Shortener backed by PostgreSQL.
pub type PostgresShortener = ShortenerService<PgUrlRepository, PgArchiveRepository>;

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a [`UrlRepository`] and an [`ArchiveRepository`] to
/// handle:
/// - Idempotent shortening with per-user ownership
/// - Ownership checks when resolving
/// - Archive listing, batch shortening and soft deletion
///
/// Note: the two repositories are not updated atomically. A failure after the
/// URL is stored leaves a record without an owner.
#[derive(Debug, Clone)]
pub struct ShortenerService<U, A> {
    urls: Arc<U>,
    archive: Arc<A>,
    base_url: String,
}

impl<U: UrlRepository, A: ArchiveRepository> ShortenerService<U, A> {
    /// Creates a new `ShortenerService` publishing short URLs under `base_url`.
    pub fn new(urls: U, archive: A, base_url: impl Into<String>) -> Self {
        Self {
            urls: Arc::new(urls),
            archive: Arc::new(archive),
            base_url: base_url.into(),
        }
    }

    /// Returns the base URL short ids are published under.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a reference to the URL repository.
    pub fn urls(&self) -> &U {
        &self.urls
    }

    /// Returns a reference to the user archive.
    pub fn archive(&self) -> &A {
        &self.archive
    }

    fn short_url(&self, id: &ShortId) -> String {
        id.to_url(&self.base_url)
    }
}

impl InMemoryShortener {
    /// Creates an in-memory shortener, persisted to `snapshot` when given.
    pub fn in_memory(base_url: impl Into<String>, snapshot: Option<PathBuf>) -> Self {
        let urls = match snapshot {
            Some(path) => UrlStore::with_snapshot(path),
            None => UrlStore::new(),
        };
        Self::new(urls, UserArchive::new(), base_url)
    }
}

impl PostgresShortener {
    /// Connects to PostgreSQL, creating the schema if needed.
    pub async fn postgres(
        base_url: impl Into<String>,
        database_url: &str,
    ) -> Result<Self, StorageError> {
        let pool = pinhole_storage::postgres::connect(database_url).await?;
        Ok(Self::new(
            PgUrlRepository::new(pool.clone()),
            PgArchiveRepository::new(pool),
            base_url,
        ))
    }
}

#[async_trait]
impl<U: UrlRepository, A: ArchiveRepository> Shortener for ShortenerService<U, A> {
    async fn shorten_url(
        &self,
        original_url: &str,
        user_token: &str,
    ) -> Result<Shortened, ShortenerError> {
        let allocation = self.urls.shorten(original_url).await?;

        // Ownership is recorded even for URLs someone else shortened first.
        self.archive
            .record_ownership(user_token, &allocation.id)
            .await?;

        let short_url = self.short_url(&allocation.id);
        debug!(id = %allocation.id, already_existed = allocation.already_existed, "shortened url");

        Ok(if allocation.already_existed {
            Shortened::AlreadyExists(short_url)
        } else {
            Shortened::Created(short_url)
        })
    }

    async fn get_original_url(
        &self,
        id: &ShortId,
        user_token: &str,
    ) -> Result<String, ShortenerError> {
        if !user_token.is_empty() {
            match self.archive.liveness(user_token, id).await? {
                Ownership::Live => {}
                Ownership::Unowned => {
                    trace!(id = %id, "short id not owned by user");
                    return Err(ShortenerError::NotFound(id.to_string()));
                }
                Ownership::Tombstoned => {
                    trace!(id = %id, "short id deleted by user");
                    return Err(ShortenerError::Gone(id.to_string()));
                }
            }
        }

        self.urls
            .resolve(id)
            .await?
            .ok_or_else(|| ShortenerError::NotFound(id.to_string()))
    }

    async fn get_user_archive(&self, user_token: &str) -> Result<Vec<UserUrl>, ShortenerError> {
        let ids = self
            .archive
            .list_live(user_token)
            .await?
            .ok_or_else(|| ShortenerError::NotFound("user has no archive".to_string()))?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.urls.resolve_many(&ids).await?;
        Ok(records
            .into_iter()
            .map(|record| UserUrl {
                short_url: self.short_url(&record.id),
                original_url: record.original_url,
            })
            .collect())
    }

    async fn for_each(
        &self,
        items: Vec<BatchItem>,
        user_token: &str,
        callback: &mut (dyn FnMut(BatchShortened) -> Result<(), ShortenerError> + Send),
    ) -> Result<(), ShortenerError> {
        let total = items.len();

        for item in items {
            match self.shorten_url(&item.original_url, user_token).await? {
                Shortened::Created(short_url) => callback(BatchShortened {
                    correlation_id: item.correlation_id,
                    short_url,
                })?,
                Shortened::AlreadyExists(_) => {
                    trace!(
                        correlation_id = %item.correlation_id,
                        "batch item already shortened, not reported"
                    );
                }
            }
        }

        debug!(items = total, "batch shortened");
        Ok(())
    }

    async fn delete_keys(&self, ids: Vec<ShortId>, user_token: &str) -> Result<(), ShortenerError> {
        self.archive.tombstone(user_token, &ids).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), ShortenerError> {
        self.urls.ping().await?;
        self.archive.ping().await?;
        Ok(())
    }
}
