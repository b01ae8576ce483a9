//! # Database Error Types
//!
//! All errors that can occur in the object database.

use thiserror::Error;

use crate::db::ObjectId;
use crate::memory::AllocError;
use crate::schema::{ObjectTypeId, PropertyType};

/// Errors that can occur in the object database.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    /// The object type id is zero or was never registered.
    #[error("unknown object type: {0}")]
    UnknownType(ObjectTypeId),

    /// A property definition names an object type that is not registered.
    #[error("property '{property}' names unknown object type {object_type}")]
    UnknownObjectType {
        /// The offending property.
        property: String,
        /// The type it names.
        object_type: ObjectTypeId,
    },

    /// The handle refers to a freed, recycled or never-allocated slot.
    #[error("stale object handle: {0}")]
    StaleHandle(ObjectId),

    /// No property of that name exists on the type.
    #[error("property '{name}' not found on object type {object_type}")]
    PropertyNotFound {
        /// The type that was searched.
        object_type: ObjectTypeId,
        /// The requested name.
        name: String,
    },

    /// The property exists but carries a different type tag.
    #[error("property '{property}' is {found}, not {expected}")]
    TypeMismatch {
        /// The property that was resolved.
        property: String,
        /// The tag the caller asked for.
        expected: PropertyType,
        /// The tag declared in the schema.
        found: PropertyType,
    },

    /// The property exists but is bound to a different object type.
    #[error("property '{property}' holds objects of type {expected}, got type {found}")]
    ObjectTypeMismatch {
        /// The property that was resolved.
        property: String,
        /// The object type declared in the schema.
        expected: ObjectTypeId,
        /// The object type supplied by the caller.
        found: ObjectTypeId,
    },

    /// Raw byte writes are limited to scalar properties.
    #[error("property '{property}' is {found}; only scalar properties take raw writes")]
    NotScalar {
        /// The property that was resolved.
        property: String,
        /// The tag declared in the schema.
        found: PropertyType,
    },

    /// A blob access reached past the end of the blob.
    #[error("blob access out of bounds: offset {offset} + len {len} exceeds size {size}")]
    OutOfBounds {
        /// Start of the requested range.
        offset: usize,
        /// Length of the requested range.
        len: usize,
        /// Current blob size.
        size: usize,
    },

    /// The allocator refused a request.
    #[error(transparent)]
    OutOfMemory(#[from] AllocError),

    /// A property name is empty or does not fit the fixed name buffer.
    #[error("invalid property name '{0}'")]
    InvalidPropertyName(String),

    /// An object or reference property was declared without an object type.
    #[error("property '{0}' needs an associated object type")]
    MissingObjectType(String),

    /// Two properties of one type share a name.
    #[error("duplicate property '{0}'")]
    DuplicateProperty(String),

    /// An owned sub-object would make the ownership graph cyclic.
    #[error("property '{property}' would make object type {object_type} own itself")]
    CyclicOwnership {
        /// The offending property.
        property: String,
        /// The type being registered.
        object_type: ObjectTypeId,
    },

    /// The chain of owned sub-objects is deeper than the configured limit.
    #[error("ownership depth {depth} exceeds limit {limit}")]
    OwnershipTooDeep {
        /// Depth the new type would have.
        depth: u32,
        /// Configured maximum.
        limit: u32,
    },

    /// Every 32-bit slot index is in use.
    #[error("object slots exhausted")]
    SlotsExhausted,

    /// The registry ran out of 16-bit type ids.
    #[error("too many object types registered")]
    TooManyTypes,

    /// The instance layout does not fit in 32 bits.
    #[error("instance size of new object type overflows")]
    InstanceTooLarge,

    /// A blob resize asked for more than the configured limit.
    #[error("blob of {requested} bytes exceeds limit {limit}")]
    BlobTooLarge {
        /// Requested size.
        requested: usize,
        /// Configured maximum.
        limit: u64,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DatabaseError>;
