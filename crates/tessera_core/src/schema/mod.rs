//! # Schema
//!
//! Object types are declared once at startup as lists of named, typed
//! properties. The registry turns each declaration into a byte layout that
//! every instance of the type shares.

mod property;
mod registry;

pub use property::{
    ObjectTypeId, PropertyDefinition, PropertyName, PropertyType, BLOB_DESCRIPTOR_SIZE,
    OBJECT_ID_SIZE, PROPERTY_NAME_CAPACITY,
};
pub use registry::{ObjectTypeDefinition, PropertyLayout, SchemaRegistry};
