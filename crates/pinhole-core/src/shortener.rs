use crate::short_id::ShortId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// Result of a shorten request, carrying the public short URL.
///
/// `AlreadyExists` is not a failure: the URL had been shortened before and
/// the existing identifier was returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortened {
    Created(String),
    AlreadyExists(String),
}

impl Shortened {
    /// Returns the short URL.
    pub fn short_url(&self) -> &str {
        match self {
            Shortened::Created(url) | Shortened::AlreadyExists(url) => url,
        }
    }

    /// Consumes the outcome and returns the short URL.
    pub fn into_short_url(self) -> String {
        match self {
            Shortened::Created(url) | Shortened::AlreadyExists(url) => url,
        }
    }

    pub fn already_existed(&self) -> bool {
        matches!(self, Shortened::AlreadyExists(_))
    }
}

/// One entry of a user's archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUrl {
    pub short_url: String,
    pub original_url: String,
}

/// One URL of a batch shorten request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub correlation_id: String,
    pub original_url: String,
}

/// Short URL produced for one [`BatchItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchShortened {
    pub correlation_id: String,
    pub short_url: String,
}

/// The storage facade consumed by the web layer.
///
/// Every operation takes the caller's session token. An empty token means the
/// caller is anonymous: no ownership is recorded and none is checked.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Shortens `original_url` and records that `user_token` owns it, even
    /// when the URL had already been shortened by someone else.
    async fn shorten_url(&self, original_url: &str, user_token: &str) -> Result<Shortened>;

    /// Resolves an id to its original URL.
    ///
    /// With a non-empty token the caller must own the id: an unowned id is
    /// `NotFound` and a deleted one is `Gone`.
    async fn get_original_url(&self, id: &ShortId, user_token: &str) -> Result<String>;

    /// Lists the live URLs of a user.
    /// Returns `NotFound` when the user never shortened anything.
    async fn get_user_archive(&self, user_token: &str) -> Result<Vec<UserUrl>>;

    /// Shortens every item in order and hands each new short URL to
    /// `callback`. Items that were already shortened are stored for the user
    /// but not reported. The first callback error stops the batch.
    async fn for_each(
        &self,
        items: Vec<BatchItem>,
        user_token: &str,
        callback: &mut (dyn FnMut(BatchShortened) -> Result<()> + Send),
    ) -> Result<()>;

    /// Deletes the given ids for `user_token`. Ids the user does not own are
    /// silently ignored.
    async fn delete_keys(&self, ids: Vec<ShortId>, user_token: &str) -> Result<()>;

    /// Checks that the storage backend is reachable.
    async fn ping(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortened_exposes_url_for_both_outcomes() {
        let created = Shortened::Created("http://h/1".to_string());
        let existing = Shortened::AlreadyExists("http://h/1".to_string());

        assert_eq!(created.short_url(), existing.short_url());
        assert!(!created.already_existed());
        assert!(existing.already_existed());
        assert_eq!(existing.into_short_url(), "http://h/1");
    }

    #[test]
    fn batch_item_uses_snake_case_wire_names() {
        let item: BatchItem = serde_json::from_str(
            r#"{"correlation_id":"a","original_url":"http://example.com"}"#,
        )
        .unwrap();
        assert_eq!(item.correlation_id, "a");
        assert_eq!(item.original_url, "http://example.com");
    }
}
