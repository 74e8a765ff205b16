//! The session layer tying schema, migration chain, and store routing
//! together.
//!
//! A [`DataStack`] is set up once, at startup, from the application's schema
//! and its migration chain. Setup is where everything that can go wrong does
//! go wrong: contradictory chains, undeclared versions, and unknown
//! configurations are rejected before any store is attached. After setup the
//! stack only answers questions.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SetupError, StackResult};
use crate::migration::{MigrationSteps, VersionGraph, VersionId};
use crate::routing::{ConfigurationName, StoreHandle, StoreLocation, StoreResolution, StoreRouter};
use crate::schema::{EntityTypeName, Schema, SchemaVersion};

/// Describes one backing store to attach to a [`DataStack`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDescriptor {
    /// The configuration the store will serve.
    pub configuration: ConfigurationName,
    /// Where the store keeps its data.
    pub location: StoreLocation,
}

impl StoreDescriptor {
    /// A transient in-process store for the given configuration.
    #[must_use]
    pub const fn memory(configuration: ConfigurationName) -> Self {
        Self {
            configuration,
            location: StoreLocation::Memory,
        }
    }

    /// A store at an engine-interpreted locator, such as a file path.
    #[must_use]
    pub fn url(configuration: ConfigurationName, url: impl Into<String>) -> Self {
        Self {
            configuration,
            location: StoreLocation::Url(url.into()),
        }
    }
}

/// Record of one store attached to a [`DataStack`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedStore {
    /// The handle minted for the store.
    pub handle: StoreHandle,
    /// When the store was attached.
    pub attached_at: DateTime<Utc>,
    /// How many entity types routed to the store at attach time.
    pub entity_count: usize,
}

/// Schema, migration chain, and store routing for one running application.
///
/// The stack validates its inputs once at construction and stays internally
/// consistent afterwards: attaching a store registers it together with the
/// entity memberships of its configuration, atomically.
///
/// # Examples
///
/// ```
/// use datastack::{
///     ConfigurationName, DataStack, EntityDescriptor, EntityTypeName, FieldDescriptor,
///     FieldKind, Schema, SchemaVersion, StoreDescriptor, VersionGraph,
/// };
///
/// let v1 = SchemaVersion::builder("v1")
///     .entity(
///         EntityDescriptor::builder("Account")
///             .field(FieldDescriptor::required("name", FieldKind::Text))
///             .build()?,
///     )
///     .build()?;
/// let v2 = SchemaVersion::builder("v2")
///     .entity(
///         EntityDescriptor::builder("Account")
///             .field(FieldDescriptor::required("name", FieldKind::Text))
///             .field(FieldDescriptor::optional("closed_at", FieldKind::Timestamp))
///             .build()?,
///     )
///     .build()?;
///
/// let schema = Schema::new(vec![v1, v2])?;
/// let stack = DataStack::new(schema, VersionGraph::linear(["v1", "v2"]))?;
///
/// stack.attach_store(StoreDescriptor::memory(ConfigurationName::Default))?;
/// let handle = stack.require_store(&EntityTypeName::new("Account"), None)?;
/// assert!(handle.configuration().is_default());
/// # Ok::<(), datastack::StackError>(())
/// ```
#[derive(Debug)]
pub struct DataStack {
    schema: Schema,
    chain: VersionGraph,
    active: SchemaVersion,
    router: StoreRouter,
    attached: RwLock<BTreeMap<ConfigurationName, AttachedStore>>,
}

impl DataStack {
    /// Creates a stack running at the schema's latest version.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain is invalid, references a version the
    /// schema does not declare, or does not end at the latest version.
    pub fn new(schema: Schema, chain: VersionGraph) -> StackResult<Self> {
        let active = schema.latest().clone();
        Self::assemble(schema, chain, active)
    }

    /// Creates a stack pinned to an explicit schema version.
    ///
    /// Useful for staged rollouts where the binary ships with newer schema
    /// versions than it is ready to run at. The pinned version must still be
    /// a leaf of the chain, so the chain has to be trimmed to match.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`DataStack::new`], or
    /// if `version` is not declared in the schema.
    pub fn with_active_version(
        schema: Schema,
        chain: VersionGraph,
        version: &VersionId,
    ) -> StackResult<Self> {
        let Some(active) = schema.get(version) else {
            return Err(SetupError::UnknownActiveVersion {
                version: version.clone(),
            }
            .into());
        };
        let active = active.clone();
        Self::assemble(schema, chain, active)
    }

    fn assemble(schema: Schema, chain: VersionGraph, active: SchemaVersion) -> StackResult<Self> {
        if !chain.is_valid() {
            return Err(SetupError::InvalidMigrationChain.into());
        }
        for version in chain.versions() {
            if !schema.contains_version(&version) {
                return Err(SetupError::UndeclaredChainVersion { version }.into());
            }
        }
        // Upgrades must land at the running version, so the chain may not
        // continue past it.
        if !chain.is_empty() && !chain.leaves().contains(active.version()) {
            return Err(SetupError::ActiveVersionNotLeaf {
                version: active.version().clone(),
            }
            .into());
        }

        debug!(
            version = %active.version(),
            entity_types = active.entity_names().count(),
            "data stack initialized"
        );
        Ok(Self {
            schema,
            chain,
            active,
            router: StoreRouter::new(),
            attached: RwLock::new(BTreeMap::new()),
        })
    }

    /// Attaches a backing store and routes its configuration's entity types
    /// to it.
    ///
    /// Attaching a second store for the same configuration replaces the
    /// first; entity memberships gained earlier are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor names a configuration the active
    /// schema version does not declare.
    pub fn attach_store(&self, descriptor: StoreDescriptor) -> StackResult<StoreHandle> {
        if !self.active.has_configuration(&descriptor.configuration) {
            return Err(SetupError::UnknownConfiguration {
                configuration: descriptor.configuration,
                version: self.active.version().clone(),
            }
            .into());
        }

        let entity_types = self.active.entities_in(&descriptor.configuration);
        let entity_count = entity_types.len();
        let handle = StoreHandle::new(descriptor.configuration, descriptor.location);
        self.router.register_store(handle.clone(), entity_types);

        let record = AttachedStore {
            handle: handle.clone(),
            attached_at: Utc::now(),
            entity_count,
        };
        let mut attached = self.attached.write().unwrap_or_else(PoisonError::into_inner);
        attached.insert(handle.configuration().clone(), record);
        drop(attached);

        debug!(
            store = %handle.id(),
            configuration = %handle.configuration(),
            entity_types = entity_count,
            "store attached"
        );
        Ok(handle)
    }

    /// Resolves which attached store backs `entity_type`.
    ///
    /// See [`StoreRouter::resolve`] for the precedence rules.
    #[must_use]
    pub fn resolve_store(
        &self,
        entity_type: &EntityTypeName,
        configuration: Option<&ConfigurationName>,
        infer_if_possible: bool,
    ) -> StoreResolution {
        self.router.resolve(entity_type, configuration, infer_if_possible)
    }

    /// Like [`DataStack::resolve_store`], but turns the non-resolved
    /// outcomes into errors.
    ///
    /// Inference is always attempted, matching what callers that reach for
    /// an error want: the one store if there is one, a precise complaint
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error naming the entity type when no store covers it, or
    /// listing the candidate configurations when more than one does.
    pub fn require_store(
        &self,
        entity_type: &EntityTypeName,
        configuration: Option<&ConfigurationName>,
    ) -> StackResult<StoreHandle> {
        match self.router.resolve(entity_type, configuration, true) {
            StoreResolution::Resolved(handle) => Ok(handle),
            StoreResolution::NotFound => Err(SetupError::NoStoreForEntity {
                entity: entity_type.clone(),
            }
            .into()),
            StoreResolution::Ambiguous => Err(SetupError::AmbiguousStore {
                entity: entity_type.clone(),
                candidates: self
                    .router
                    .configurations_for(entity_type)
                    .into_iter()
                    .collect(),
            }
            .into()),
        }
    }

    /// Upgrade steps from `from` to the end of the chain, in order.
    #[must_use]
    pub fn migration_steps(&self, from: &VersionId) -> MigrationSteps<'_> {
        self.chain.steps_from(from)
    }

    /// The schema version the stack runs at.
    #[must_use]
    pub const fn active_version(&self) -> &VersionId {
        self.active.version()
    }

    /// The full description of the active schema version.
    #[must_use]
    pub const fn active_schema(&self) -> &SchemaVersion {
        &self.active
    }

    /// The full model history.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The migration chain the stack was set up with.
    #[must_use]
    pub const fn migration_chain(&self) -> &VersionGraph {
        &self.chain
    }

    /// The underlying router, for callers that need raw resolution.
    #[must_use]
    pub const fn router(&self) -> &StoreRouter {
        &self.router
    }

    /// Snapshot of every attached store, sorted by configuration.
    #[must_use]
    pub fn attached_stores(&self) -> Vec<AttachedStore> {
        let attached = self.attached.read().unwrap_or_else(PoisonError::into_inner);
        attached.values().cloned().collect()
    }
}
