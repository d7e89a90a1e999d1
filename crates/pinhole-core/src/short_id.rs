use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The identifier part of a shortened URL.
///
/// Identifiers are allocated from a counter starting at 1 and rendered in
/// decimal. Ids taken from requests are kept verbatim: an id that was never
/// allocated simply resolves to nothing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortId(String);

impl ShortId {
    /// Wraps a raw identifier, e.g. a path segment of an incoming request.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates the identifier for the given counter value.
    pub fn from_sequence(sequence: u64) -> Self {
        Self(sequence.to_string())
    }

    /// Returns the counter value this identifier was allocated from, if it
    /// is a decimal number.
    pub fn sequence(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }
}

impl Display for ShortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ShortId {
    fn from(sequence: u64) -> Self {
        Self::from_sequence(sequence)
    }
}
