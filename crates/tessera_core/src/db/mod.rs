//! # Object Database
//!
//! Live objects, their handles, and everything that reads or writes them.
//!
//! ## Layers
//!
//! - `slot`: free-list slot table behind generational handles
//! - `accessor`: name + tag resolution and typed property access
//! - `blob`: variable-length buffers owned by blob properties
//! - `lifecycle`: recursive creation and destruction of owned sub-objects

mod accessor;
mod blob;
mod database;
mod id;
mod lifecycle;
mod slot;
pub mod value;

pub use blob::{BlobDescriptor, BlobStore};
pub use database::{Database, DatabaseStats, Object};
pub use id::ObjectId;
pub use slot::{LiveObject, Reservation, Slot, SlotTable};
pub use value::PropertyValue;
