//! # Schema Registry
//!
//! Append-only tables of property layouts and object type definitions.
//!
//! Registration computes each instance's byte layout once: properties are
//! placed back to back in declaration order, with no alignment padding.
//! Values are read and written unaligned, so packing is safe.

use crate::error::{DatabaseError, DbResult};

use super::property::{ObjectTypeId, PropertyDefinition, PropertyType};

/// A property definition together with its byte offset in an instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyLayout {
    definition: PropertyDefinition,
    offset: u32,
}

impl PropertyLayout {
    /// The declared property.
    #[inline]
    #[must_use]
    pub const fn definition(&self) -> &PropertyDefinition {
        &self.definition
    }

    /// Byte offset of the property within an instance buffer.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Byte range of the property within an instance buffer.
    #[inline]
    #[must_use]
    pub const fn range(&self) -> std::ops::Range<usize> {
        let start = self.offset as usize;
        start..start + self.definition.size() as usize
    }
}

/// A registered object type: a slice of the property table plus the size of
/// one instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObjectTypeDefinition {
    first_property: u32,
    property_count: u32,
    bytes: u32,
    ownership_depth: u32,
}

impl ObjectTypeDefinition {
    /// Number of properties.
    #[inline]
    #[must_use]
    pub const fn property_count(&self) -> u32 {
        self.property_count
    }

    /// Instance size in bytes (sum of property sizes).
    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> u32 {
        self.bytes
    }

    /// Length of the longest chain of owned sub-objects, this type included.
    #[inline]
    #[must_use]
    pub const fn ownership_depth(&self) -> u32 {
        self.ownership_depth
    }

    #[inline]
    const fn property_range(&self) -> std::ops::Range<usize> {
        let start = self.first_property as usize;
        start..start + self.property_count as usize
    }
}

/// Registry of object types.
///
/// Types are immutable once added. An owned sub-object property may only
/// name a type registered *before* the one being declared, so ownership
/// always points from newer types to strictly older ones and the ownership
/// graph cannot contain a cycle. References carry no ownership and may also
/// name the type being declared.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = SchemaRegistry::new(64);
/// let point = registry.add_object_type(&[
///     PropertyDefinition::new("x", PropertyType::Float64)?,
///     PropertyDefinition::new("y", PropertyType::Float64)?,
/// ])?;
/// assert_eq!(registry.object_type(point)?.bytes(), 16);
/// ```
#[derive(Debug)]
pub struct SchemaRegistry {
    /// Layouts of every registered type, in registration order.
    properties: Vec<PropertyLayout>,
    /// Index 0 is a reserved empty entry.
    object_types: Vec<ObjectTypeDefinition>,
    /// Deepest ownership chain a type may declare.
    max_ownership_depth: u32,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(max_ownership_depth: u32) -> Self {
        Self::with_capacity(0, max_ownership_depth)
    }

    /// Creates an empty registry with room for `type_capacity` types.
    #[must_use]
    pub fn with_capacity(type_capacity: usize, max_ownership_depth: u32) -> Self {
        let mut object_types = Vec::with_capacity(type_capacity + 1);
        object_types.push(ObjectTypeDefinition::default());

        Self {
            properties: Vec::new(),
            object_types,
            max_ownership_depth,
        }
    }

    /// Number of registered types.
    #[inline]
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.object_types.len() - 1
    }

    /// Checks if `ty` names a registered type.
    #[inline]
    #[must_use]
    pub fn contains(&self, ty: ObjectTypeId) -> bool {
        !ty.is_none() && usize::from(ty.index()) < self.object_types.len()
    }

    /// Registers a new object type and returns its id.
    ///
    /// # Errors
    ///
    /// - [`DatabaseError::DuplicateProperty`] if two properties share a name
    /// - [`DatabaseError::CyclicOwnership`] if a sub-object names the type
    ///   being registered
    /// - [`DatabaseError::UnknownObjectType`] if a sub-object or reference
    ///   names an unregistered type
    /// - [`DatabaseError::OwnershipTooDeep`] if the ownership chain exceeds
    ///   the configured depth
    /// - [`DatabaseError::TooManyTypes`] / [`DatabaseError::InstanceTooLarge`]
    ///   when ids or layout sizes run out
    pub fn add_object_type(&mut self, properties: &[PropertyDefinition]) -> DbResult<ObjectTypeId> {
        let id = u16::try_from(self.object_types.len())
            .map(ObjectTypeId::new)
            .map_err(|_| DatabaseError::TooManyTypes)?;

        let mut bytes: u32 = 0;
        let mut depth: u32 = 1;

        for (i, property) in properties.iter().enumerate() {
            let name = property.name();
            if properties[..i].iter().any(|p| p.name() == name) {
                return Err(DatabaseError::DuplicateProperty(name.as_str().to_owned()));
            }

            let target = property.object_type();
            match property.ty() {
                PropertyType::Object => {
                    if target == id {
                        return Err(DatabaseError::CyclicOwnership {
                            property: name.as_str().to_owned(),
                            object_type: id,
                        });
                    }
                    let child = self.object_type(target).map_err(|_| {
                        DatabaseError::UnknownObjectType {
                            property: name.as_str().to_owned(),
                            object_type: target,
                        }
                    })?;
                    depth = depth.max(child.ownership_depth + 1);
                }
                PropertyType::Reference => {
                    if target != id && !self.contains(target) {
                        return Err(DatabaseError::UnknownObjectType {
                            property: name.as_str().to_owned(),
                            object_type: target,
                        });
                    }
                }
                _ => {}
            }

            bytes = bytes
                .checked_add(property.size())
                .ok_or(DatabaseError::InstanceTooLarge)?;
        }

        if depth > self.max_ownership_depth {
            return Err(DatabaseError::OwnershipTooDeep {
                depth,
                limit: self.max_ownership_depth,
            });
        }

        let first_property =
            u32::try_from(self.properties.len()).map_err(|_| DatabaseError::InstanceTooLarge)?;
        let property_count =
            u32::try_from(properties.len()).map_err(|_| DatabaseError::InstanceTooLarge)?;

        let mut offset = 0;
        self.properties.reserve(properties.len());
        for property in properties {
            self.properties.push(PropertyLayout {
                definition: *property,
                offset,
            });
            offset += property.size();
        }

        self.object_types.push(ObjectTypeDefinition {
            first_property,
            property_count,
            bytes,
            ownership_depth: depth,
        });

        tracing::debug!(
            object_type = %id,
            properties = property_count,
            bytes,
            depth,
            "registered object type"
        );

        Ok(id)
    }

    /// Looks up a type definition.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::UnknownType`] for `NONE` or an unregistered id.
    #[inline]
    pub fn object_type(&self, ty: ObjectTypeId) -> DbResult<&ObjectTypeDefinition> {
        if ty.is_none() {
            return Err(DatabaseError::UnknownType(ty));
        }
        self.object_types
            .get(usize::from(ty.index()))
            .ok_or(DatabaseError::UnknownType(ty))
    }

    /// Returns the property layouts of a type in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::UnknownType`] for `NONE` or an unregistered id.
    pub fn properties_of(&self, ty: ObjectTypeId) -> DbResult<&[PropertyLayout]> {
        let definition = self.object_type(ty)?;
        Ok(&self.properties[definition.property_range()])
    }

    /// Finds a property of `ty` by exact name.
    ///
    /// Returns `None` if the type is unknown or has no such property.
    #[must_use]
    pub fn get_property_by_name(&self, ty: ObjectTypeId, name: &str) -> Option<&PropertyLayout> {
        self.properties_of(ty)
            .ok()?
            .iter()
            .find(|layout| layout.definition.name().as_str() == name)
    }

    /// Returns the `index`-th property layout of a type by value.
    ///
    /// Used by the lifecycle code, which mutates the database while walking a
    /// type's properties and so cannot hold a borrow of the registry.
    #[inline]
    pub(crate) fn layout_at(&self, definition: &ObjectTypeDefinition, index: u32) -> PropertyLayout {
        debug_assert!(index < definition.property_count);
        self.properties[definition.first_property as usize + index as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(name: &str, ty: PropertyType) -> PropertyDefinition {
        PropertyDefinition::new(name, ty).unwrap()
    }

    #[test]
    fn test_sequential_layout() {
        let mut registry = SchemaRegistry::new(8);
        let ty = registry
            .add_object_type(&[
                scalar("active", PropertyType::Bool),
                scalar("x", PropertyType::Float32),
                scalar("y", PropertyType::Float64),
                scalar("blob", PropertyType::Blob),
            ])
            .unwrap();

        assert_eq!(ty, ObjectTypeId::new(1));
        assert_eq!(registry.type_count(), 1);

        let offsets: Vec<u32> = registry
            .properties_of(ty)
            .unwrap()
            .iter()
            .map(PropertyLayout::offset)
            .collect();
        assert_eq!(offsets, vec![0, 1, 5, 13]);
        assert_eq!(registry.object_type(ty).unwrap().bytes(), 29);
    }

    #[test]
    fn test_property_lookup() {
        let mut registry = SchemaRegistry::new(8);
        let ty = registry
            .add_object_type(&[scalar("x", PropertyType::Int32), scalar("y", PropertyType::Int32)])
            .unwrap();

        let y = registry.get_property_by_name(ty, "y").unwrap();
        assert_eq!(y.offset(), 4);
        assert!(registry.get_property_by_name(ty, "z").is_none());
        assert!(registry.get_property_by_name(ObjectTypeId::new(9), "x").is_none());
        assert!(registry.get_property_by_name(ObjectTypeId::NONE, "x").is_none());
    }

    #[test]
    fn test_unknown_type_lookups() {
        let registry = SchemaRegistry::new(8);
        assert_eq!(
            registry.object_type(ObjectTypeId::NONE),
            Err(DatabaseError::UnknownType(ObjectTypeId::NONE))
        );
        assert!(registry.properties_of(ObjectTypeId::new(1)).is_err());
    }

    #[test]
    fn test_self_ownership_rejected() {
        let mut registry = SchemaRegistry::new(8);
        let result = registry.add_object_type(&[
            PropertyDefinition::object("me", ObjectTypeId::new(1)).unwrap()
        ]);
        assert!(matches!(result, Err(DatabaseError::CyclicOwnership { .. })));
        assert_eq!(registry.type_count(), 0);
    }

    #[test]
    fn test_forward_ownership_rejected() {
        let mut registry = SchemaRegistry::new(8);
        let result = registry.add_object_type(&[
            PropertyDefinition::object("later", ObjectTypeId::new(5)).unwrap()
        ]);
        assert!(matches!(result, Err(DatabaseError::UnknownObjectType { .. })));
    }

    #[test]
    fn test_self_reference_allowed() {
        let mut registry = SchemaRegistry::new(8);
        let node = registry
            .add_object_type(&[
                scalar("value", PropertyType::Int64),
                PropertyDefinition::reference("next", ObjectTypeId::new(1)).unwrap(),
            ])
            .unwrap();
        assert_eq!(node, ObjectTypeId::new(1));
        assert_eq!(registry.object_type(node).unwrap().ownership_depth(), 1);
    }

    #[test]
    fn test_duplicate_property_rejected() {
        let mut registry = SchemaRegistry::new(8);
        let result = registry
            .add_object_type(&[scalar("x", PropertyType::Int8), scalar("x", PropertyType::Int16)]);
        assert_eq!(result, Err(DatabaseError::DuplicateProperty("x".into())));
    }

    #[test]
    fn test_ownership_depth_limit() {
        let mut registry = SchemaRegistry::new(2);
        let leaf = registry.add_object_type(&[scalar("v", PropertyType::UInt8)]).unwrap();
        let middle = registry
            .add_object_type(&[PropertyDefinition::object("leaf", leaf).unwrap()])
            .unwrap();
        assert_eq!(registry.object_type(middle).unwrap().ownership_depth(), 2);

        let result =
            registry.add_object_type(&[PropertyDefinition::object("middle", middle).unwrap()]);
        assert_eq!(
            result,
            Err(DatabaseError::OwnershipTooDeep { depth: 3, limit: 2 })
        );
    }

    #[test]
    fn test_empty_type() {
        let mut registry = SchemaRegistry::new(8);
        let ty = registry.add_object_type(&[]).unwrap();
        assert_eq!(registry.object_type(ty).unwrap().bytes(), 0);
        assert!(registry.properties_of(ty).unwrap().is_empty());
    }
}
