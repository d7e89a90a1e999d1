//! Storage backends for the Pinhole URL shortener.
//!
//! Two backends implement the [`UrlRepository`] and [`ArchiveRepository`]
//! contracts from `pinhole_core`:
//!
//! - [`memory`]: lock-guarded maps, optionally snapshotted to a JSON file.
//! - [`postgres`]: PostgreSQL through a `sqlx` connection pool.

pub mod memory;
pub mod postgres;

pub use memory::{Snapshot, UrlStore, UserArchive};
pub use pinhole_core::error::{Result, StorageError};
pub use pinhole_core::{ArchiveRepository, Ownership, UrlRepository};
pub use postgres::{PgArchiveRepository, PgUrlRepository};
