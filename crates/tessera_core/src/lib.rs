//! # Tessera Core
//!
//! Generational, schema-reflective in-memory object database:
//! - Object types declared at runtime as lists of named, typed properties
//! - Objects addressed by 64-bit generational handles that never dangle
//! - Owned sub-objects, cross references and resizable blobs
//!
//! ## Architecture Rules
//!
//! 1. **Schemas are append-only** - a type can only own types registered
//!    before it, so ownership trees are finite
//! 2. **Handles are values** - a stale handle resolves to nothing, it never
//!    reads another object's memory
//! 3. **One allocator** - every instance and blob buffer comes from the
//!    [`Allocator`] the database was created with
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{Database, PropertyDefinition, PropertyType};
//!
//! let mut db = Database::new();
//! let point = db.add_object_type(&[
//!     PropertyDefinition::new("x", PropertyType::Float64)?,
//!     PropertyDefinition::new("y", PropertyType::Float64)?,
//! ])?;
//! let p = db.create_object(point)?;
//! db.set(p, "x", 1.5f64)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod memory;
pub mod schema;

pub use api::{DatabaseApi, DynDatabase, PluginSpec, Version, PLUGIN_SPEC};
pub use config::DatabaseConfig;
pub use db::{BlobDescriptor, Database, DatabaseStats, Object, ObjectId, PropertyValue};
pub use error::{DatabaseError, DbResult};
pub use memory::{
    AllocError, AllocationStats, Allocator, BudgetAllocator, SystemAllocator, TrackingAllocator,
};
pub use schema::{
    ObjectTypeDefinition, ObjectTypeId, PropertyDefinition, PropertyLayout, PropertyName,
    PropertyType,
};
