use crate::postgres::{id_from_row, id_to_key, map_sqlx_error, ping};
use async_trait::async_trait;
use pinhole_core::error::Result;
use pinhole_core::{Allocation, ShortId, UrlRecord, UrlRepository};
use sqlx::{PgPool, Row};
use tracing::{debug, trace};

/// PostgreSQL implementation of the URL store.
///
/// New ids are `COUNT(*) + 1`, computed and inserted while holding an
/// exclusive lock on `short_urls`, so ids stay gap-free. The `UNIQUE`
/// constraint on `original_url` backs the one-id-per-URL rule.
#[derive(Debug, Clone)]
pub struct PgUrlRepository {
    pool: PgPool,
}

impl PgUrlRepository {
    /// Creates a repository from an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn find(&self, original_url: &str) -> Result<Option<ShortId>> {
        let value: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT short_id
            FROM short_urls
            WHERE original_url = $1
            "#,
        )
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        value.map(id_from_row).transpose()
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn shorten(&self, original_url: &str) -> Result<Allocation> {
        if let Some(id) = self.find(original_url).await? {
            trace!(id = %id, "url already shortened");
            return Ok(Allocation {
                id,
                already_existed: true,
            });
        }

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Serializes writers so `COUNT(*) + 1` is read and inserted atomically.
        // Plain reads are not blocked.
        sqlx::query("LOCK TABLE short_urls IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let existing: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT short_id
            FROM short_urls
            WHERE original_url = $1
            "#,
        )
        .bind(original_url)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let allocation = match existing {
            Some(value) => Allocation {
                id: id_from_row(value)?,
                already_existed: true,
            },
            None => {
                let value: i64 = sqlx::query_scalar(
                    r#"
                    INSERT INTO short_urls (short_id, original_url)
                    SELECT COUNT(*) + 1, $1
                    FROM short_urls
                    RETURNING short_id
                    "#,
                )
                .bind(original_url)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
                Allocation {
                    id: id_from_row(value)?,
                    already_existed: false,
                }
            }
        };

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(id = %allocation.id, already_existed = allocation.already_existed, "shortened url");
        Ok(allocation)
    }

    async fn resolve(&self, id: &ShortId) -> Result<Option<String>> {
        let Some(key) = id_to_key(id) else {
            return Ok(None);
        };

        let original_url: Option<String> = sqlx::query_scalar(
            r#"
            SELECT original_url
            FROM short_urls
            WHERE short_id = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(original_url)
    }

    async fn resolve_many(&self, ids: &[ShortId]) -> Result<Vec<UrlRecord>> {
        let keys: Vec<i64> = ids.iter().filter_map(id_to_key).collect();
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT short_id, original_url
            FROM short_urls
            WHERE short_id = ANY($1)
            ORDER BY short_id
            "#,
        )
        .bind(&keys)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| -> Result<UrlRecord> {
                let value: i64 = row.try_get("short_id").map_err(map_sqlx_error)?;
                let original_url: String =
                    row.try_get("original_url").map_err(map_sqlx_error)?;
                Ok(UrlRecord {
                    id: id_from_row(value)?,
                    original_url,
                })
            })
            .collect()
    }

    async fn ping(&self) -> Result<()> {
        ping(&self.pool).await
    }
}
