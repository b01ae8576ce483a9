//! # Property Accessors
//!
//! Resolves properties by name and tag against an object's schema and reads
//! or writes them in the instance buffer.
//!
//! Resolution order: the handle must be live, the name must exist on its
//! type, the tag must match, and for object-bound tags the associated object
//! type must match when one is asked for. Each failure is its own error.

use crate::error::{DatabaseError, DbResult};
use crate::memory::Allocator;
use crate::schema::{ObjectTypeId, PropertyLayout, PropertyType};

use super::database::Database;
use super::id::ObjectId;
use super::value::PropertyValue;

impl<A: Allocator> Database<A> {
    /// Resolves a property of a live object.
    ///
    /// `object_type` restricts object and reference properties to a given
    /// associated type; pass `None` to accept any.
    ///
    /// # Errors
    ///
    /// - [`DatabaseError::StaleHandle`] if `id` is not live
    /// - [`DatabaseError::PropertyNotFound`] if the type has no such property
    /// - [`DatabaseError::TypeMismatch`] if the property has another tag
    /// - [`DatabaseError::ObjectTypeMismatch`] if `object_type` is given and
    ///   differs from the property's
    pub fn resolve_property(
        &self,
        id: ObjectId,
        ty: PropertyType,
        object_type: Option<ObjectTypeId>,
        name: &str,
    ) -> DbResult<PropertyLayout> {
        if !self.is_alive(id) {
            return Err(DatabaseError::StaleHandle(id));
        }

        let layout = self
            .schema
            .get_property_by_name(id.object_type(), name)
            .ok_or_else(|| DatabaseError::PropertyNotFound {
                object_type: id.object_type(),
                name: name.to_owned(),
            })?;

        let definition = layout.definition();
        if definition.ty() != ty {
            return Err(DatabaseError::TypeMismatch {
                property: name.to_owned(),
                expected: ty,
                found: definition.ty(),
            });
        }

        if let Some(expected) = object_type {
            if definition.object_type() != expected {
                return Err(DatabaseError::ObjectTypeMismatch {
                    property: name.to_owned(),
                    expected: definition.object_type(),
                    found: expected,
                });
            }
        }

        Ok(*layout)
    }

    /// Borrows the inline bytes of a property.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve_property`].
    pub fn property_bytes(&self, id: ObjectId, ty: PropertyType, name: &str) -> DbResult<&[u8]> {
        let layout = self.resolve_property(id, ty, None, name)?;
        let object = self.slots.get(id).ok_or(DatabaseError::StaleHandle(id))?;
        Ok(&object.data[layout.range()])
    }

    /// Mutably borrows the inline bytes of a scalar property.
    ///
    /// Blob descriptors and object handles are owned by the database and
    /// only change through [`Self::reallocate_blob`], [`Self::set_reference`]
    /// and object creation.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve_property`]. Returns [`DatabaseError::NotScalar`]
    /// for blob, object and reference properties.
    pub fn property_bytes_mut(
        &mut self,
        id: ObjectId,
        ty: PropertyType,
        name: &str,
    ) -> DbResult<&mut [u8]> {
        let layout = self.resolve_property(id, ty, None, name)?;
        if !ty.is_scalar() {
            return Err(DatabaseError::NotScalar {
                property: name.to_owned(),
                found: ty,
            });
        }
        let object = self
            .slots
            .get_mut(id)
            .ok_or(DatabaseError::StaleHandle(id))?;
        Ok(&mut object.data[layout.range()])
    }

    /// Reads a scalar property.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve_property`]; the tag is `T::TYPE`.
    #[inline]
    pub fn get<T: PropertyValue>(&self, id: ObjectId, name: &str) -> DbResult<T> {
        self.property_bytes(id, T::TYPE, name).map(T::read)
    }

    /// Writes a scalar property.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve_property`]; the tag is `T::TYPE`.
    #[inline]
    pub fn set<T: PropertyValue>(&mut self, id: ObjectId, name: &str, value: T) -> DbResult<()> {
        value.write(self.property_bytes_mut(id, T::TYPE, name)?);
        Ok(())
    }

    /// Returns the handle of an owned sub-object.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve_property`].
    pub fn get_sub_object(&self, id: ObjectId, name: &str) -> DbResult<ObjectId> {
        self.property_bytes(id, PropertyType::Object, name)
            .map(bytemuck::pod_read_unaligned)
    }

    /// Returns the handle stored in a reference property.
    ///
    /// The target is not checked: a reference to a destroyed object is
    /// returned as stored and simply fails to resolve.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve_property`].
    pub fn get_reference(&self, id: ObjectId, name: &str) -> DbResult<ObjectId> {
        self.property_bytes(id, PropertyType::Reference, name)
            .map(bytemuck::pod_read_unaligned)
    }

    /// Points a reference property at `value`, or clears it with
    /// [`ObjectId::NULL`].
    ///
    /// # Errors
    ///
    /// Besides the resolution errors, fails with
    /// [`DatabaseError::ObjectTypeMismatch`] if `value` has a different type
    /// than the property declares and with [`DatabaseError::StaleHandle`] if
    /// `value` is not live. The property is left unchanged on error.
    pub fn set_reference(&mut self, id: ObjectId, name: &str, value: ObjectId) -> DbResult<()> {
        let target_type = (!value.is_null()).then(|| value.object_type());
        let layout = self.resolve_property(id, PropertyType::Reference, target_type, name)?;

        if !value.is_null() && !self.is_alive(value) {
            return Err(DatabaseError::StaleHandle(value));
        }

        self.write_handle(id, &layout, value);
        Ok(())
    }

    /// Reads an object or reference handle from a live object's buffer.
    pub(super) fn read_handle(&self, id: ObjectId, layout: &PropertyLayout) -> ObjectId {
        self.slots.get(id).map_or(ObjectId::NULL, |object| {
            bytemuck::pod_read_unaligned(&object.data[layout.range()])
        })
    }

    /// Writes an object or reference handle into a live object's buffer.
    pub(super) fn write_handle(&mut self, id: ObjectId, layout: &PropertyLayout, value: ObjectId) {
        if let Some(object) = self.slots.get_mut(id) {
            object.data[layout.range()].copy_from_slice(bytemuck::bytes_of(&value));
        }
    }
}
