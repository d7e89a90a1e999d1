//! PostgreSQL storage backend.
//!
//! Both repositories share one connection pool. The schema is created
//! idempotently by [`connect`]; see `ddl/postgres/schema.sql`.

pub mod archive;
pub mod url;

pub use archive::PgArchiveRepository;
pub use url::PgUrlRepository;

use pinhole_core::error::{Result, StorageError};
use pinhole_core::ShortId;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

const SCHEMA: &str = include_str!("../ddl/postgres/schema.sql");

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a connection pool and makes sure the schema exists.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
        .map_err(map_sqlx_error)?;
    ensure_schema(&pool).await?;
    info!("connected to postgres");
    Ok(pool)
}

/// Creates the tables used by the repositories if they are missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    let mut tx = pool.begin().await.map_err(map_sqlx_error)?;
    sqlx::raw_sql(SCHEMA)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
    tx.commit().await.map_err(map_sqlx_error)
}

pub(crate) async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

/// Converts a stored `BIGINT` key into a short id.
pub(crate) fn id_from_row(value: i64) -> Result<ShortId> {
    u64::try_from(value)
        .map(ShortId::from_sequence)
        .map_err(|_| StorageError::InvalidData(format!("negative short id '{value}'")))
}

/// Converts a short id into its `BIGINT` key, if it can be one.
///
/// Only the canonical spelling of a sequence has a key: `"01"` or `"+1"` are
/// distinct ids that were never allocated.
pub(crate) fn id_to_key(id: &ShortId) -> Option<i64> {
    id.sequence()
        .filter(|sequence| ShortId::from_sequence(*sequence).as_str() == id.as_str())
        .and_then(|sequence| i64::try_from(sequence).ok())
}

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}
