//! In-memory storage backend.
//!
//! Each structure is guarded by a single `parking_lot::RwLock`: readers run
//! concurrently, writers exclusively. Locks are never held across an await.

pub mod snapshot;
pub mod url_store;
pub mod user_archive;

pub use snapshot::Snapshot;
pub use url_store::UrlStore;
pub use user_archive::UserArchive;
