//! # datastack - Schema versioning and store routing
//!
//! `datastack` keeps a layered persistence setup honest. Applications
//! declare their schema explicitly, version by version, describe how
//! versions upgrade into one another, and partition entity types across any
//! number of backing stores. The stack validates the whole arrangement at
//! startup and then routes every entity type to the store that owns it.
//!
//! ## Core Concepts
//!
//! - **Schema**: explicit, versioned descriptions of every persisted entity type
//! - **VersionGraph**: the migration chain, a directed graph of version upgrades
//! - **Configuration**: a named partition of the schema, served by one store
//! - **DataStack**: the session object tying schema, chain, and routing together
//!
//! ## Usage
//!
//! ```
//! use datastack::{
//!     ConfigurationName, DataStack, EntityDescriptor, EntityTypeName, FieldDescriptor,
//!     FieldKind, Schema, SchemaVersion, StoreDescriptor, VersionGraph,
//! };
//!
//! // Declare the schema.
//! let accounts = EntityDescriptor::builder("Account")
//!     .field(FieldDescriptor::required("name", FieldKind::Text))
//!     .build()?;
//! let schema = Schema::single(SchemaVersion::builder("v1").entity(accounts).build()?);
//!
//! // Set up the stack and attach a store.
//! let stack = DataStack::new(schema, VersionGraph::single("v1"))?;
//! stack.attach_store(StoreDescriptor::memory(ConfigurationName::Default))?;
//!
//! // Every entity type now routes to exactly one store.
//! let store = stack.require_store(&EntityTypeName::new("Account"), None)?;
//! assert!(store.configuration().is_default());
//! # Ok::<(), datastack::StackError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod migration;
pub mod routing;
pub mod schema;
pub mod stack;

// Re-export primary types at crate root for convenience
pub use error::{SchemaError, SetupError, StackError, StackResult};
pub use migration::{MigrationSteps, VersionGraph, VersionId};
pub use routing::{
    ConfigurationName, StoreHandle, StoreId, StoreLocation, StoreResolution, StoreRouter,
};
pub use schema::{
    EntityDescriptor, EntityDescriptorBuilder, EntityTypeName, FieldDescriptor, FieldKind, Schema,
    SchemaVersion, SchemaVersionBuilder,
};
pub use stack::{AttachedStore, DataStack, StoreDescriptor};
