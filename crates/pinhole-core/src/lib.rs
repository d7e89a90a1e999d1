//! Core types and traits for the Pinhole URL shortener.
//!
//! This crate provides the identifier type, the error taxonomy and the
//! repository and facade contracts shared by the storage backends, the
//! shortener service and the HTTP gateway.

pub mod allocator;
pub mod error;
pub mod repository;
pub mod short_id;
pub mod shortener;

pub use allocator::SequentialAllocator;
pub use error::{ShortenerError, StorageError};
pub use repository::{Allocation, ArchiveRepository, Ownership, UrlRecord, UrlRepository};
pub use short_id::ShortId;
pub use shortener::{BatchItem, BatchShortened, Shortened, Shortener, UserUrl};
