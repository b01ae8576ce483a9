//! # Database
//!
//! The central container for schemas, objects and blobs.

use crate::config::DatabaseConfig;
use crate::error::DbResult;
use crate::memory::{Allocator, SystemAllocator};
use crate::schema::{ObjectTypeId, PropertyDefinition, SchemaRegistry};

use super::blob::BlobStore;
use super::id::ObjectId;
use super::slot::SlotTable;

/// Read-only view of a live object.
///
/// Borrowed from the database, so it cannot outlive the next mutation.
#[derive(Clone, Copy, Debug)]
pub struct Object<'a> {
    id: ObjectId,
    data: &'a [u8],
}

impl<'a> Object<'a> {
    /// The object's handle.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// The object's type.
    #[inline]
    #[must_use]
    pub const fn object_type(&self) -> ObjectTypeId {
        self.id.object_type()
    }

    /// Raw instance bytes, laid out by the object's type.
    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> &'a [u8] {
        self.data
    }
}

/// Counters describing a database's contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Registered object types.
    pub object_types: usize,
    /// Live objects.
    pub live_objects: usize,
    /// Slots ever allocated, live or free.
    pub slots: usize,
    /// Blobs currently holding a buffer.
    pub live_blobs: usize,
}

/// The object database.
///
/// Owns every instance buffer and blob it hands out, drawing them from the
/// allocator `A`. Callers hold [`ObjectId`] handles; anything borrowed from
/// the database (byte slices, [`Object`] views) is tied to a shared borrow
/// and so cannot be kept across `create_object`, `reallocate_blob` or any
/// other mutation.
///
/// # Concurrency
///
/// Single-threaded and non-reentrant. Wrap in a lock to share.
///
/// # Example
///
/// ```rust,ignore
/// let mut db = Database::new();
/// let point = db.add_object_type(&[
///     PropertyDefinition::new("x", PropertyType::Float64)?,
///     PropertyDefinition::new("y", PropertyType::Float64)?,
/// ])?;
///
/// let p = db.create_object(point)?;
/// db.set(p, "x", 3.0f64)?;
/// assert_eq!(db.get::<f64>(p, "x")?, 3.0);
/// ```
pub struct Database<A: Allocator = SystemAllocator> {
    pub(super) allocator: A,
    pub(super) config: DatabaseConfig,
    pub(super) schema: SchemaRegistry,
    pub(super) slots: SlotTable,
    pub(super) blobs: BlobStore,
}

impl Database<SystemAllocator> {
    /// Creates a database on the global heap with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DatabaseConfig::default())
    }

    /// Creates a database on the global heap.
    #[must_use]
    pub fn with_config(config: DatabaseConfig) -> Self {
        Self::with_allocator(SystemAllocator, config)
    }
}

impl Default for Database<SystemAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> Database<A> {
    /// Creates a database drawing every buffer from `allocator`.
    #[must_use]
    pub fn with_allocator(allocator: A, config: DatabaseConfig) -> Self {
        Self {
            allocator,
            schema: SchemaRegistry::with_capacity(
                config.initial_type_capacity,
                config.max_ownership_depth,
            ),
            slots: SlotTable::with_capacity(config.initial_object_capacity),
            blobs: BlobStore::default(),
            config,
        }
    }

    /// Registers an object type. See [`SchemaRegistry::add_object_type`].
    ///
    /// # Errors
    ///
    /// Propagates every registration error of the schema registry.
    pub fn add_object_type(&mut self, properties: &[PropertyDefinition]) -> DbResult<ObjectTypeId> {
        self.schema.add_object_type(properties).map_err(|err| {
            tracing::warn!(error = %err, "rejected object type");
            err
        })
    }

    /// The schema registry.
    #[inline]
    #[must_use]
    pub const fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// The settings the database was created with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// The allocator buffers are drawn from.
    #[inline]
    #[must_use]
    pub const fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Resolves a handle to a read-only view of its object.
    ///
    /// Returns `None` for null, freed, recycled or foreign handles.
    #[inline]
    #[must_use]
    pub fn get_object(&self, id: ObjectId) -> Option<Object<'_>> {
        self.slots.get(id).map(|object| Object {
            id: object.id,
            data: &object.data,
        })
    }

    /// Checks if a handle refers to a live object.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: ObjectId) -> bool {
        self.slots.get(id).is_some()
    }

    /// Returns the number of live objects.
    #[inline]
    #[must_use]
    pub const fn object_count(&self) -> usize {
        self.slots.live_count()
    }

    /// Iterates over the handles of all live objects in slot order.
    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.slots.iter_live().map(|object| object.id)
    }

    /// Returns content counters.
    #[must_use]
    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            object_types: self.schema.type_count(),
            live_objects: self.slots.live_count(),
            slots: self.slots.slot_count(),
            live_blobs: self.blobs.len(),
        }
    }
}

impl<A: Allocator> Drop for Database<A> {
    fn drop(&mut self) {
        let live = self.slots.live_count();
        if live > 0 {
            tracing::warn!(live_objects = live, "database dropped with live objects");
        }

        for object in self.slots.drain_live() {
            self.allocator.free(object.data);
        }
        for block in self.blobs.drain() {
            self.allocator.free(block);
        }
    }
}

impl<A: Allocator> std::fmt::Debug for Database<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
