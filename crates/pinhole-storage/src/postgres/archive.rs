use crate::postgres::{map_sqlx_error, ping};
use async_trait::async_trait;
use pinhole_core::error::Result;
use pinhole_core::{ArchiveRepository, Ownership, ShortId};
use sqlx::{PgPool, Row};
use tracing::{debug, trace};

/// Number of ids updated per statement when tombstoning.
const TOMBSTONE_CHUNK: usize = 15;

/// PostgreSQL implementation of the user archive.
///
/// Rows of `user_archive` are never deleted; `is_live` is cleared instead.
#[derive(Debug, Clone)]
pub struct PgArchiveRepository {
    pool: PgPool,
}

impl PgArchiveRepository {
    /// Creates a repository from an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ArchiveRepository for PgArchiveRepository {
    async fn record_ownership(&self, user_token: &str, id: &ShortId) -> Result<()> {
        if user_token.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO user_archive (user_token, short_id, is_live)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (user_token, short_id) DO UPDATE SET is_live = TRUE
            "#,
        )
        .bind(user_token)
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        trace!(id = %id, "recorded ownership");
        Ok(())
    }

    async fn list_live(&self, user_token: &str) -> Result<Option<Vec<ShortId>>> {
        let rows = sqlx::query(
            r#"
            SELECT short_id, is_live
            FROM user_archive
            WHERE user_token = $1
            "#,
        )
        .bind(user_token)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut live = Vec::with_capacity(rows.len());
        for row in rows {
            let is_live: bool = row.try_get("is_live").map_err(map_sqlx_error)?;
            if is_live {
                let id: String = row.try_get("short_id").map_err(map_sqlx_error)?;
                live.push(ShortId::new(id));
            }
        }
        live.sort_by_key(ShortId::sequence);
        Ok(Some(live))
    }

    async fn liveness(&self, user_token: &str, id: &ShortId) -> Result<Ownership> {
        let is_live: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT is_live
            FROM user_archive
            WHERE user_token = $1
              AND short_id = $2
            "#,
        )
        .bind(user_token)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(match is_live {
            None => Ownership::Unowned,
            Some(true) => Ownership::Live,
            Some(false) => Ownership::Tombstoned,
        })
    }

    async fn tombstone(&self, user_token: &str, ids: &[ShortId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        // All chunks commit together; dropping `tx` on error rolls back.
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        let mut tombstoned = 0u64;

        for chunk in ids.chunks(TOMBSTONE_CHUNK) {
            let keys: Vec<String> = chunk.iter().map(ToString::to_string).collect();
            let result = sqlx::query(
                r#"
                UPDATE user_archive
                SET is_live = FALSE
                WHERE user_token = $1
                  AND short_id = ANY($2)
                "#,
            )
            .bind(user_token)
            .bind(&keys)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
            tombstoned += result.rows_affected();
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(requested = ids.len(), tombstoned, "tombstoned user urls");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        ping(&self.pool).await
    }
}
