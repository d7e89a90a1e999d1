//! URL shortener service implementation.
//!
//! This crate provides [`ShortenerService`], the storage facade that combines
//! a URL repository and a user archive into the operations the web layer
//! needs. Core types are re-exported from `pinhole_core`.

pub mod service;

pub use pinhole_core::{
    BatchItem, BatchShortened, ShortId, Shortened, Shortener, ShortenerError, UserUrl,
};
pub use service::{InMemoryShortener, PostgresShortener, ShortenerService};
