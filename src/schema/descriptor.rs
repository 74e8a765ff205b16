//! Entity and field descriptions.
//!
//! Schemas are declared explicitly with these descriptors rather than
//! derived from application types. A descriptor says what a persisted entity
//! looks like at one schema version; it carries no behavior and no data.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// Name of an entity type declared in a schema.
///
/// Entity type names are the keys the routing layer works with: stores are
/// resolved per entity type name, never per concrete record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityTypeName(String);

impl EntityTypeName {
    /// Creates an entity type name from a raw string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityTypeName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for EntityTypeName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for EntityTypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Semantic type of a persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Boolean flag.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point number.
    Float,
    /// UTF-8 text.
    Text,
    /// Opaque byte blob.
    Bytes,
    /// UTC timestamp.
    Timestamp,
    /// Arbitrary JSON document.
    Json,
}

impl FieldKind {
    /// Stable lowercase name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Timestamp => "timestamp",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One persisted field of an entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, unique within its entity.
    pub name: String,
    /// Semantic type of the stored value.
    pub kind: FieldKind,
    /// Whether the field may be absent.
    pub optional: bool,
    /// Value assumed when the field is absent from a stored record.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub default: Option<Value>,
}

impl FieldDescriptor {
    /// A field that must always be present.
    #[must_use]
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false,
            default: None,
        }
    }

    /// A field that may be absent.
    #[must_use]
    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: true,
            default: None,
        }
    }

    /// Attaches a default value for records missing this field.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Shape of one entity type at one schema version.
///
/// Built through [`EntityDescriptor::builder`], which rejects empty and
/// duplicate field names.
///
/// # Examples
///
/// ```
/// use datastack::{EntityDescriptor, FieldDescriptor, FieldKind};
///
/// let account = EntityDescriptor::builder("Account")
///     .field(FieldDescriptor::required("name", FieldKind::Text))
///     .field(FieldDescriptor::optional("closed_at", FieldKind::Timestamp))
///     .build()?;
///
/// assert_eq!(account.fields().len(), 2);
/// assert!(account.field("name").is_some());
/// # Ok::<(), datastack::SchemaError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    name: EntityTypeName,
    fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    /// Starts building an entity descriptor.
    #[must_use]
    pub fn builder(name: impl Into<EntityTypeName>) -> EntityDescriptorBuilder {
        EntityDescriptorBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// The entity type's name.
    #[must_use]
    pub const fn name(&self) -> &EntityTypeName {
        &self.name
    }

    /// The fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Builder for [`EntityDescriptor`].
#[derive(Debug, Clone)]
pub struct EntityDescriptorBuilder {
    name: EntityTypeName,
    fields: Vec<FieldDescriptor>,
}

impl EntityDescriptorBuilder {
    /// Adds a field. Order of calls is the order of the fields.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Validates the declaration and produces the descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity name is empty, a field name is empty,
    /// or two fields share a name.
    pub fn build(self) -> Result<EntityDescriptor, SchemaError> {
        if self.name.as_str().is_empty() {
            return Err(SchemaError::EmptyEntityName);
        }

        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName {
                    entity: self.name.clone(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    entity: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        Ok(EntityDescriptor {
            name: self.name,
            fields: self.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_preserves_field_order() {
        let entity = EntityDescriptor::builder("Account")
            .field(FieldDescriptor::required("name", FieldKind::Text))
            .field(FieldDescriptor::required("balance", FieldKind::Int))
            .field(FieldDescriptor::optional("closed_at", FieldKind::Timestamp))
            .build()
            .unwrap();

        let names: Vec<&str> = entity
            .fields()
            .iter()
            .map(|field| field.name.as_str())
            .collect();
        assert_eq!(names, vec!["name", "balance", "closed_at"]);
    }

    #[test]
    fn test_builder_rejects_empty_entity_name() {
        let result = EntityDescriptor::builder("").build();
        assert!(matches!(result, Err(SchemaError::EmptyEntityName)));
    }

    #[test]
    fn test_builder_rejects_empty_field_name() {
        let result = EntityDescriptor::builder("Account")
            .field(FieldDescriptor::required("", FieldKind::Text))
            .build();
        assert!(matches!(result, Err(SchemaError::EmptyFieldName { .. })));
    }

    #[test]
    fn test_builder_rejects_duplicate_field() {
        let result = EntityDescriptor::builder("Account")
            .field(FieldDescriptor::required("name", FieldKind::Text))
            .field(FieldDescriptor::optional("name", FieldKind::Text))
            .build();

        let Err(SchemaError::DuplicateField { entity, field }) = result else {
            panic!("expected duplicate field error, got {result:?}");
        };
        assert_eq!(entity.as_str(), "Account");
        assert_eq!(field, "name");
    }

    #[test]
    fn test_field_lookup_by_name() {
        let entity = EntityDescriptor::builder("Note")
            .field(FieldDescriptor::required("body", FieldKind::Text))
            .build()
            .unwrap();

        assert_eq!(entity.field("body").map(|f| f.kind), Some(FieldKind::Text));
        assert!(entity.field("missing").is_none());
    }

    #[test]
    fn test_field_default_value() {
        let field = FieldDescriptor::optional("retries", FieldKind::Int).with_default(json!(3));
        assert_eq!(field.default, Some(json!(3)));
        assert!(field.optional);
    }

    #[test]
    fn test_entity_without_fields_is_allowed() {
        let marker = EntityDescriptor::builder("Tombstone").build().unwrap();
        assert!(marker.fields().is_empty());
    }

    #[test]
    fn test_descriptor_serialization_round_trip() {
        let entity = EntityDescriptor::builder("Account")
            .field(FieldDescriptor::required("name", FieldKind::Text))
            .field(FieldDescriptor::optional("retries", FieldKind::Int).with_default(json!(0)))
            .build()
            .unwrap();

        let json = serde_json::to_string(&entity).unwrap();
        let back: EntityDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn test_field_kind_display_matches_as_str() {
        assert_eq!(FieldKind::Timestamp.to_string(), "timestamp");
        assert_eq!(FieldKind::Json.as_str(), "json");
    }
}
