//! Error types for the stack.
//!
//! All errors are strongly typed using thiserror. Schema declaration and
//! stack setup fail loudly and early; routing queries themselves never
//! error, they report their outcome as a [`StoreResolution`].
//!
//! [`StoreResolution`]: crate::routing::StoreResolution

use thiserror::Error;

use crate::migration::VersionId;
use crate::routing::ConfigurationName;
use crate::schema::EntityTypeName;

/// Schema declaration errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Entity name cannot be empty")]
    EmptyEntityName,

    #[error("Field name cannot be empty (entity '{entity}')")]
    EmptyFieldName {
        entity: EntityTypeName,
    },

    #[error("Duplicate field '{field}' on entity '{entity}'")]
    DuplicateField {
        entity: EntityTypeName,
        field: String,
    },

    #[error("Version identifier cannot be empty")]
    EmptyVersionId,

    #[error("Entity '{entity}' is declared twice in version '{version}'")]
    DuplicateEntity {
        entity: EntityTypeName,
        version: VersionId,
    },

    #[error("Configuration name cannot be empty (version '{version}')")]
    EmptyConfigurationName {
        version: VersionId,
    },

    #[error("Configuration '{configuration}' references undeclared entity '{entity}' in version '{version}'")]
    UnknownEntityInConfiguration {
        configuration: ConfigurationName,
        entity: EntityTypeName,
        version: VersionId,
    },

    #[error("Schema version '{version}' is declared twice")]
    DuplicateVersion {
        version: VersionId,
    },

    #[error("Schema must declare at least one version")]
    EmptySchema,
}

/// Stack setup and store resolution errors.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Migration chain is invalid: conflicting version mappings")]
    InvalidMigrationChain,

    #[error("Migration chain references version '{version}' which the schema does not declare")]
    UndeclaredChainVersion {
        version: VersionId,
    },

    #[error("Active version '{version}' is not declared in the schema")]
    UnknownActiveVersion {
        version: VersionId,
    },

    #[error("Active version '{version}' is not a leaf of the migration chain")]
    ActiveVersionNotLeaf {
        version: VersionId,
    },

    #[error("Configuration '{configuration}' is not declared in schema version '{version}'")]
    UnknownConfiguration {
        configuration: ConfigurationName,
        version: VersionId,
    },

    #[error("No store is registered for entity type '{entity}'")]
    NoStoreForEntity {
        entity: EntityTypeName,
    },

    #[error("Entity type '{entity}' maps to multiple configurations; specify one explicitly")]
    AmbiguousStore {
        entity: EntityTypeName,
        candidates: Vec<ConfigurationName>,
    },
}

/// Top-level error type for the stack.
///
/// This enum encompasses all possible errors that can occur
/// when declaring schemas and setting up a data stack.
#[derive(Debug, Error)]
pub enum StackError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),
}

impl StackError {
    /// Returns true if this is a schema declaration error.
    #[must_use]
    pub const fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Returns true if this is a setup error.
    #[must_use]
    pub const fn is_setup(&self) -> bool {
        matches!(self, Self::Setup(_))
    }

    /// Returns true if no registered store could serve the request.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Setup(SetupError::NoStoreForEntity { .. }))
    }

    /// Returns true if more than one store could serve the request.
    #[must_use]
    pub const fn is_ambiguity(&self) -> bool {
        matches!(self, Self::Setup(SetupError::AmbiguousStore { .. }))
    }
}

/// Result type alias for stack operations.
pub type StackResult<T> = Result<T, StackError>;
