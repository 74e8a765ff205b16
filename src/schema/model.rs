//! Versioned schema models.
//!
//! A [`SchemaVersion`] is the complete description of the schema at one
//! version: its entity types and its named configurations. A [`Schema`]
//! collects every version the application knows about, in declaration order,
//! and gives the session layer the model history it validates migration
//! chains against.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::migration::VersionId;
use crate::routing::ConfigurationName;
use crate::schema::descriptor::{EntityDescriptor, EntityTypeName};

/// Complete schema description at a single version.
///
/// Entity types are keyed by name. Named configurations declare which subset
/// of the entity types they span; the unnamed default configuration always
/// spans all of them and is never declared explicitly.
///
/// # Examples
///
/// ```
/// use datastack::{
///     ConfigurationName, EntityDescriptor, EntityTypeName, FieldDescriptor, FieldKind,
///     SchemaVersion,
/// };
///
/// let v1 = SchemaVersion::builder("v1")
///     .entity(
///         EntityDescriptor::builder("Account")
///             .field(FieldDescriptor::required("name", FieldKind::Text))
///             .build()?,
///     )
///     .entity(EntityDescriptor::builder("AuditEntry").build()?)
///     .configuration("audit", ["AuditEntry"])
///     .build()?;
///
/// assert!(v1.contains_entity(&EntityTypeName::new("Account")));
/// assert_eq!(
///     v1.entities_in(&ConfigurationName::named("audit")).len(),
///     1,
/// );
/// // The default configuration spans everything.
/// assert_eq!(v1.entities_in(&ConfigurationName::Default).len(), 2);
/// # Ok::<(), datastack::SchemaError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaVersion {
    version: VersionId,
    entities: BTreeMap<EntityTypeName, EntityDescriptor>,
    configurations: BTreeMap<String, BTreeSet<EntityTypeName>>,
}

impl SchemaVersion {
    /// Starts building a schema version.
    #[must_use]
    pub fn builder(version: impl Into<VersionId>) -> SchemaVersionBuilder {
        SchemaVersionBuilder {
            version: version.into(),
            entities: Vec::new(),
            configurations: Vec::new(),
        }
    }

    /// The version this description belongs to.
    #[must_use]
    pub const fn version(&self) -> &VersionId {
        &self.version
    }

    /// Looks up an entity type by name.
    #[must_use]
    pub fn entity(&self, name: &EntityTypeName) -> Option<&EntityDescriptor> {
        self.entities.get(name)
    }

    /// Whether this version declares the entity type.
    #[must_use]
    pub fn contains_entity(&self, name: &EntityTypeName) -> bool {
        self.entities.contains_key(name)
    }

    /// Names of every declared entity type, in sorted order.
    pub fn entity_names(&self) -> impl Iterator<Item = &EntityTypeName> {
        self.entities.keys()
    }

    /// Whether the configuration exists at this version.
    ///
    /// The default configuration always exists.
    #[must_use]
    pub fn has_configuration(&self, configuration: &ConfigurationName) -> bool {
        match configuration {
            ConfigurationName::Default => true,
            ConfigurationName::Named(name) => self.configurations.contains_key(name),
        }
    }

    /// Entity types the configuration spans at this version.
    ///
    /// The default configuration spans every declared entity type. An
    /// undeclared named configuration spans nothing.
    #[must_use]
    pub fn entities_in(&self, configuration: &ConfigurationName) -> BTreeSet<EntityTypeName> {
        match configuration {
            ConfigurationName::Default => self.entities.keys().cloned().collect(),
            ConfigurationName::Named(name) => {
                self.configurations.get(name).cloned().unwrap_or_default()
            }
        }
    }

    /// The named configurations declared at this version, in sorted order.
    pub fn declared_configurations(&self) -> impl Iterator<Item = ConfigurationName> + '_ {
        self.configurations
            .keys()
            .map(|name| ConfigurationName::named(name.clone()))
    }

    /// Content fingerprint of this version's declarations.
    ///
    /// Two versions declared identically have equal fingerprints even when
    /// their version identifiers differ, so a changed fingerprint between
    /// adjacent chain versions means the stored shape actually moved. Entity
    /// and configuration order never affect the result; field order within
    /// an entity does.
    #[must_use]
    pub fn fingerprint(&self) -> blake3::Hash {
        // Tag bytes keep the record kinds from running together; 0xFF never
        // occurs in UTF-8, so it is an unambiguous string terminator.
        const ENTITY: u8 = 1;
        const FIELD: u8 = 2;
        const CONFIGURATION: u8 = 3;

        fn component(hasher: &mut blake3::Hasher, text: &str) {
            hasher.update(text.as_bytes());
            hasher.update(&[0xFF]);
        }

        let mut hasher = blake3::Hasher::new();
        for (name, entity) in &self.entities {
            hasher.update(&[ENTITY]);
            component(&mut hasher, name.as_str());
            for field in entity.fields() {
                hasher.update(&[FIELD]);
                component(&mut hasher, &field.name);
                component(&mut hasher, field.kind.as_str());
                hasher.update(&[u8::from(field.optional)]);
                match &field.default {
                    None => {
                        hasher.update(&[0]);
                    }
                    Some(value) => {
                        hasher.update(&[1]);
                        component(&mut hasher, &value.to_string());
                    }
                }
            }
        }
        for (name, members) in &self.configurations {
            hasher.update(&[CONFIGURATION]);
            component(&mut hasher, name);
            for member in members {
                component(&mut hasher, member.as_str());
            }
        }
        hasher.finalize()
    }
}

/// Builder for [`SchemaVersion`].
///
/// Declaring the same configuration name more than once merges the entity
/// lists, so membership can be declared incrementally.
#[derive(Debug, Clone)]
pub struct SchemaVersionBuilder {
    version: VersionId,
    entities: Vec<EntityDescriptor>,
    configurations: Vec<(String, Vec<EntityTypeName>)>,
}

impl SchemaVersionBuilder {
    /// Declares an entity type.
    #[must_use]
    pub fn entity(mut self, entity: EntityDescriptor) -> Self {
        self.entities.push(entity);
        self
    }

    /// Declares (or extends) a named configuration spanning `entities`.
    #[must_use]
    pub fn configuration<I, N>(mut self, name: impl Into<String>, entities: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<EntityTypeName>,
    {
        self.configurations.push((
            name.into(),
            entities.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Validates the declaration and produces the schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version identifier is empty, an entity type
    /// is declared twice, a configuration name is empty, or a configuration
    /// references an entity type this version does not declare.
    pub fn build(self) -> Result<SchemaVersion, SchemaError> {
        if self.version.as_str().is_empty() {
            return Err(SchemaError::EmptyVersionId);
        }

        let mut entities = BTreeMap::new();
        for entity in self.entities {
            let name = entity.name().clone();
            if entities.insert(name.clone(), entity).is_some() {
                return Err(SchemaError::DuplicateEntity {
                    entity: name,
                    version: self.version,
                });
            }
        }

        let mut configurations: BTreeMap<String, BTreeSet<EntityTypeName>> = BTreeMap::new();
        for (name, members) in self.configurations {
            if name.is_empty() {
                return Err(SchemaError::EmptyConfigurationName {
                    version: self.version,
                });
            }
            for member in &members {
                if !entities.contains_key(member) {
                    return Err(SchemaError::UnknownEntityInConfiguration {
                        configuration: ConfigurationName::named(name),
                        entity: member.clone(),
                        version: self.version,
                    });
                }
            }
            configurations.entry(name).or_default().extend(members);
        }

        Ok(SchemaVersion {
            version: self.version,
            entities,
            configurations,
        })
    }
}

/// The application's full model history, one description per version.
///
/// Versions keep their declaration order; the last declared version is the
/// latest. Version identifiers must be unique.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    versions: Vec<SchemaVersion>,
}

impl Schema {
    /// Builds a schema from its version descriptions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if `versions` is empty or declares the same version
    /// identifier twice.
    pub fn new(versions: Vec<SchemaVersion>) -> Result<Self, SchemaError> {
        if versions.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        let mut seen = BTreeSet::new();
        for version in &versions {
            if !seen.insert(version.version().clone()) {
                return Err(SchemaError::DuplicateVersion {
                    version: version.version().clone(),
                });
            }
        }

        Ok(Self { versions })
    }

    /// A schema with a single version.
    #[must_use]
    pub fn single(version: SchemaVersion) -> Self {
        Self {
            versions: vec![version],
        }
    }

    /// The most recently declared version.
    #[must_use]
    #[allow(clippy::missing_panics_doc)] // non-empty by construction
    pub fn latest(&self) -> &SchemaVersion {
        self.versions
            .last()
            .expect("schema always has at least one version")
    }

    /// Looks up a version description by identifier.
    #[must_use]
    pub fn get(&self, version: &VersionId) -> Option<&SchemaVersion> {
        self.versions.iter().find(|v| v.version() == version)
    }

    /// Whether the schema declares this version.
    #[must_use]
    pub fn contains_version(&self, version: &VersionId) -> bool {
        self.get(version).is_some()
    }

    /// Version identifiers in declaration order, oldest first.
    pub fn version_ids(&self) -> impl Iterator<Item = &VersionId> {
        self.versions.iter().map(SchemaVersion::version)
    }

    /// Number of declared versions.
    #[must_use]
    pub fn version_count(&self) -> usize {
        self.versions.len()
    }
}
