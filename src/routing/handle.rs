//! Store identity and configuration naming.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique, stable store identifier.
///
/// Minted when a store handle is created and never reused, so two
/// registrations of the same configuration can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(Uuid);

impl StoreId {
    /// Creates a new random store ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a store ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for StoreId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for StoreId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<StoreId> for Uuid {
    fn from(id: StoreId) -> Self {
        id.0
    }
}

/// Name of a store configuration, the partition a store is registered under.
///
/// Every schema has one unnamed default configuration that spans all of its
/// entity types; named configurations span a declared subset. The two kinds
/// never collide: `Named("default".into())` is a distinct partition from
/// [`ConfigurationName::Default`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationName {
    /// The unnamed configuration spanning every entity type in the schema.
    Default,
    /// A named configuration spanning a declared subset of entity types.
    Named(String),
}

impl ConfigurationName {
    /// Creates a named configuration.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Returns true for the unnamed default configuration.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl Default for ConfigurationName {
    fn default() -> Self {
        Self::Default
    }
}

impl fmt::Display for ConfigurationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "(default)"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

impl From<&str> for ConfigurationName {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for ConfigurationName {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

/// Where a backing store keeps its data.
///
/// Purely descriptive; this library routes to stores but never opens one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreLocation {
    /// A transient in-process store with no backing file.
    Memory,
    /// A locator the storage engine knows how to open, such as a file path
    /// or connection string.
    Url(String),
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Opaque reference to one concrete backing store.
///
/// A handle carries everything the routing layer knows about a store: its
/// identity, the configuration it serves, and where it lives. Handles are
/// cheap to clone and compare by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreHandle {
    id: StoreId,
    configuration: ConfigurationName,
    location: StoreLocation,
}

impl StoreHandle {
    /// Creates a handle with a freshly minted ID.
    #[must_use]
    pub fn new(configuration: ConfigurationName, location: StoreLocation) -> Self {
        Self {
            id: StoreId::new(),
            configuration,
            location,
        }
    }

    /// Creates a handle with an explicit ID.
    #[must_use]
    pub const fn with_id(
        id: StoreId,
        configuration: ConfigurationName,
        location: StoreLocation,
    ) -> Self {
        Self {
            id,
            configuration,
            location,
        }
    }

    /// The store's identity.
    #[must_use]
    pub const fn id(&self) -> StoreId {
        self.id
    }

    /// The configuration this store serves.
    #[must_use]
    pub const fn configuration(&self) -> &ConfigurationName {
        &self.configuration
    }

    /// Where the store keeps its data.
    #[must_use]
    pub const fn location(&self) -> &StoreLocation {
        &self.location
    }
}

impl fmt::Display for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "store {} [{}] at {}",
            self.id, self.configuration, self.location
        )
    }
}
