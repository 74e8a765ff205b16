//! Entity-to-store routing.
//!
//! A [`StoreRouter`] remembers which configurations each entity type belongs
//! to and which store currently backs each configuration. Registration and
//! resolution are total: they never fail, they only report outcomes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};

use crate::routing::handle::{ConfigurationName, StoreHandle};
use crate::schema::EntityTypeName;

/// Outcome of a store resolution.
///
/// Not-found and ambiguity are distinct outcomes: the first means no
/// registered store covers the entity type, the second means more than one
/// does and the caller has to name a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreResolution {
    /// Exactly one store serves the request.
    Resolved(StoreHandle),
    /// No registered store covers the entity type under the given
    /// constraints.
    NotFound,
    /// More than one configuration could serve the entity type.
    Ambiguous,
}

impl StoreResolution {
    /// The resolved handle, if resolution succeeded.
    #[must_use]
    pub const fn store(&self) -> Option<&StoreHandle> {
        match self {
            Self::Resolved(handle) => Some(handle),
            _ => None,
        }
    }

    /// Consumes the resolution, returning the handle if there is one.
    #[must_use]
    pub fn into_store(self) -> Option<StoreHandle> {
        match self {
            Self::Resolved(handle) => Some(handle),
            _ => None,
        }
    }

    /// Returns true if exactly one store was found.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Returns true if more than one store could serve the request.
    #[must_use]
    pub const fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous)
    }
}

#[derive(Debug, Default)]
struct RouterState {
    /// Which configurations each entity type belongs to. Memberships only
    /// ever grow; replacing a store never removes one.
    entity_configurations: BTreeMap<EntityTypeName, BTreeSet<ConfigurationName>>,
    /// The store currently backing each configuration.
    configuration_stores: BTreeMap<ConfigurationName, StoreHandle>,
}

/// Thread-safe registry mapping entity types to backing stores.
///
/// Reads take a shared lock and writes an exclusive one, so resolutions see
/// either none or all of a registration, never half of one.
///
/// # Examples
///
/// ```
/// use datastack::{
///     ConfigurationName, EntityTypeName, StoreHandle, StoreLocation, StoreResolution,
///     StoreRouter,
/// };
///
/// let router = StoreRouter::new();
/// let handle = StoreHandle::new(ConfigurationName::Default, StoreLocation::Memory);
/// router.register_store(handle.clone(), [EntityTypeName::new("Account")]);
///
/// let found = router.resolve(&EntityTypeName::new("Account"), None, true);
/// assert_eq!(found, StoreResolution::Resolved(handle));
/// ```
#[derive(Debug, Default)]
pub struct StoreRouter {
    state: RwLock<RouterState>,
}

impl StoreRouter {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` as the store backing its configuration.
    ///
    /// The store replaces any previous store of the same configuration, and
    /// every entity type in `entity_types` gains membership in that
    /// configuration. Both updates land under one exclusive lock, so no
    /// reader can observe the store without its memberships.
    pub fn register_store<I>(&self, handle: StoreHandle, entity_types: I)
    where
        I: IntoIterator<Item = EntityTypeName>,
    {
        let configuration = handle.configuration().clone();
        let store_id = handle.id();

        // No fallible calls run under the write guard: the entity iterator
        // is drained first and logging waits until the guard is released.
        let entity_types: Vec<EntityTypeName> = entity_types.into_iter().collect();

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let replaced = state
            .configuration_stores
            .insert(configuration.clone(), handle)
            .map(|previous| previous.id())
            .filter(|previous| previous != &store_id);
        let mut added = 0usize;
        for entity_type in entity_types {
            if state
                .entity_configurations
                .entry(entity_type)
                .or_default()
                .insert(configuration.clone())
            {
                added += 1;
            }
        }
        drop(state);

        if let Some(previous) = replaced {
            warn!(
                configuration = %configuration,
                previous = %previous,
                replacement = %store_id,
                "replacing registered store"
            );
        }
        debug!(
            store = %store_id,
            configuration = %configuration,
            memberships_added = added,
            "store registered"
        );
    }

    /// Resolves which store backs `entity_type`.
    ///
    /// Precedence:
    ///
    /// 1. A `configuration` hint naming a configuration the entity type
    ///    belongs to wins outright.
    /// 2. A hint the entity type does not belong to falls through to
    ///    inference when `infer_if_possible` is set and otherwise reports
    ///    [`StoreResolution::NotFound`].
    /// 3. Without a usable hint, the entity type's sole configuration is
    ///    inferred; two or more candidates report
    ///    [`StoreResolution::Ambiguous`].
    #[must_use]
    pub fn resolve(
        &self,
        entity_type: &EntityTypeName,
        configuration: Option<&ConfigurationName>,
        infer_if_possible: bool,
    ) -> StoreResolution {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let memberships = state.entity_configurations.get(entity_type);

        if let Some(hint) = configuration {
            if memberships.is_some_and(|set| set.contains(hint)) {
                return match state.configuration_stores.get(hint) {
                    Some(handle) => StoreResolution::Resolved(handle.clone()),
                    None => StoreResolution::NotFound,
                };
            }
            if !infer_if_possible {
                return StoreResolution::NotFound;
            }
        }

        match memberships {
            None => StoreResolution::NotFound,
            Some(set) => match set.len() {
                0 => StoreResolution::NotFound,
                1 => match set
                    .first()
                    .and_then(|only| state.configuration_stores.get(only))
                {
                    Some(handle) => StoreResolution::Resolved(handle.clone()),
                    None => StoreResolution::NotFound,
                },
                _ => StoreResolution::Ambiguous,
            },
        }
    }

    /// Configurations the entity type belongs to, empty if it was never
    /// registered.
    #[must_use]
    pub fn configurations_for(&self, entity_type: &EntityTypeName) -> BTreeSet<ConfigurationName> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .entity_configurations
            .get(entity_type)
            .cloned()
            .unwrap_or_default()
    }

    /// The store currently backing `configuration`, if any.
    #[must_use]
    pub fn store_for(&self, configuration: &ConfigurationName) -> Option<StoreHandle> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.configuration_stores.get(configuration).cloned()
    }

    /// Configurations that currently have a registered store, in sorted
    /// order.
    #[must_use]
    pub fn registered_configurations(&self) -> Vec<ConfigurationName> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.configuration_stores.keys().cloned().collect()
    }
}
