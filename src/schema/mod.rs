//! Explicit schema declarations.
//!
//! Entity shapes, named configurations, and the version history they belong
//! to. Everything here is declared by the application; nothing is derived
//! from runtime type information.

mod descriptor;
mod model;

pub use descriptor::{
    EntityDescriptor, EntityDescriptorBuilder, EntityTypeName, FieldDescriptor, FieldKind,
};
pub use model::{Schema, SchemaVersion, SchemaVersionBuilder};
