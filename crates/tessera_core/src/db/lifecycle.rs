//! # Object Lifecycle
//!
//! Creation and destruction, including the owned sub-object tree.
//!
//! Recursion follows the ownership graph, which registration keeps acyclic
//! and bounded by `max_ownership_depth`.

use crate::error::{DatabaseError, DbResult};
use crate::memory::Allocator;
use crate::schema::{ObjectTypeId, PropertyType};

use super::database::Database;
use super::id::ObjectId;
use super::slot::LiveObject;

impl<A: Allocator> Database<A> {
    /// Creates an object of type `ty` along with all of its owned
    /// sub-objects.
    ///
    /// The instance buffer starts zeroed: scalars read `0`/`false`, blobs
    /// are empty, references are null. The object reuses the most recently
    /// freed slot if there is one, with the slot's generation advanced by
    /// one.
    ///
    /// # Errors
    ///
    /// - [`DatabaseError::UnknownType`] if `ty` is `NONE` or unregistered
    /// - [`DatabaseError::OutOfMemory`] / [`DatabaseError::SlotsExhausted`]
    ///   if any object in the tree cannot be created; everything already
    ///   created for this call is destroyed again
    pub fn create_object(&mut self, ty: ObjectTypeId) -> DbResult<ObjectId> {
        let id = self.instantiate(ty)?;
        tracing::trace!(object = %id, "created object");
        Ok(id)
    }

    fn instantiate(&mut self, ty: ObjectTypeId) -> DbResult<ObjectId> {
        let definition = *self.schema.object_type(ty)?;

        let data = self.allocator.allocate(definition.bytes() as usize)?;
        let Some(reservation) = self.slots.acquire() else {
            self.allocator.free(data);
            return Err(DatabaseError::SlotsExhausted);
        };

        let id = ObjectId::new(reservation.slot, ty, reservation.generation);
        self.slots.occupy(reservation, LiveObject { id, data });

        for index in 0..definition.property_count() {
            let layout = self.schema.layout_at(&definition, index);
            let property = layout.definition();
            if property.ty() != PropertyType::Object {
                continue;
            }

            match self.instantiate(property.object_type()) {
                Ok(child) => self.write_handle(id, &layout, child),
                Err(err) => {
                    self.destroy_object(id);
                    return Err(err);
                }
            }
        }

        Ok(id)
    }

    /// Destroys an object, its owned sub-objects and its blobs.
    ///
    /// References held by the object are not followed, and references to it
    /// held elsewhere are not cleared.
    ///
    /// Returns `false` (and does nothing) if `id` does not resolve, so
    /// destroying twice is harmless.
    pub fn destroy_object(&mut self, id: ObjectId) -> bool {
        if !self.is_alive(id) {
            return false;
        }

        let definition = self.schema.object_type(id.object_type()).copied();
        debug_assert!(definition.is_ok(), "live object {id} has no type");
        let definition = definition.unwrap_or_default();

        for index in 0..definition.property_count() {
            let layout = self.schema.layout_at(&definition, index);
            match layout.definition().ty() {
                PropertyType::Blob => self.free_blob(id, &layout),
                PropertyType::Object => {
                    let child = self.read_handle(id, &layout);
                    self.destroy_object(child);
                }
                _ => {}
            }
        }

        if let Some(object) = self.slots.release(id) {
            self.allocator.free(object.data);
        }

        tracing::trace!(object = %id, "destroyed object");
        true
    }
}
