//! Schema version identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for one revision of a persisted schema.
///
/// Version identifiers are opaque tokens; the library never parses or orders
/// them semantically. Two identifiers are the same version exactly when their
/// tokens are equal.
///
/// # Examples
///
/// ```
/// use datastack::VersionId;
///
/// let v1 = VersionId::new("v1");
/// assert_eq!(v1.as_str(), "v1");
/// assert_eq!(v1, VersionId::from("v1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    /// Create a version identifier from a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VersionId {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl From<String> for VersionId {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<VersionId> for String {
    fn from(version: VersionId) -> Self {
        version.0
    }
}

impl AsRef<str> for VersionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
