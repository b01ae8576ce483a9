//! # Property Definitions
//!
//! Properties are named, typed fields of an object type. Their names live in
//! a fixed inline buffer and their tags map to fixed byte sizes.

use std::fmt;

use crate::error::{DatabaseError, DbResult};

/// Size of the inline property-name buffer in bytes.
///
/// One byte is kept back as a terminator, so names hold at most 31 bytes.
pub const PROPERTY_NAME_CAPACITY: usize = 32;

/// Inline size of a blob descriptor (`size` + buffer key).
pub const BLOB_DESCRIPTOR_SIZE: u32 = 16;

/// Inline size of an object handle.
pub const OBJECT_ID_SIZE: u32 = 8;

/// Index of an object type in the schema registry.
///
/// Type `0` is reserved: it never names a registered type, and a handle
/// carrying it is never live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ObjectTypeId(u16);

impl ObjectTypeId {
    /// The reserved "no type" id.
    pub const NONE: Self = Self(0);

    /// Wraps a raw index.
    #[inline]
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u16 {
        self.0
    }

    /// Checks if this is the reserved "no type" id.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ObjectTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type tag of a property.
///
/// Discriminants start at 1; tag `0` means "none" and is never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum PropertyType {
    /// `bool`, one byte.
    Bool = 1,
    /// `i8`.
    Int8,
    /// `i16`.
    Int16,
    /// `i32`.
    Int32,
    /// `i64`.
    Int64,
    /// `u8`.
    UInt8,
    /// `u16`.
    UInt16,
    /// `u32`.
    UInt32,
    /// `u64`.
    UInt64,
    /// `f32`.
    Float32,
    /// `f64`.
    Float64,
    /// Variable-length owned byte buffer.
    Blob,
    /// Strictly owned sub-object.
    Object,
    /// Non-owning, type-checked handle to another object.
    Reference,
}

impl PropertyType {
    /// Inline size of a property of this type in bytes.
    #[must_use]
    pub const fn size(self) -> u32 {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
            Self::Blob => BLOB_DESCRIPTOR_SIZE,
            Self::Object | Self::Reference => OBJECT_ID_SIZE,
        }
    }

    /// Checks if this tag holds a plain value rather than a blob or handle.
    #[inline]
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !matches!(self, Self::Blob | Self::Object | Self::Reference)
    }

    /// Checks if this tag is bound to an object type.
    #[inline]
    #[must_use]
    pub const fn is_object_bound(self) -> bool {
        matches!(self, Self::Object | Self::Reference)
    }

    /// Lower-case tag name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Blob => "blob",
            Self::Object => "object",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-size inline property name.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyName {
    bytes: [u8; PROPERTY_NAME_CAPACITY],
    len: u8,
}

impl PropertyName {
    /// Copies `name` into a fixed buffer.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidPropertyName`] if `name` is empty or
    /// longer than `PROPERTY_NAME_CAPACITY - 1` bytes.
    pub fn new(name: &str) -> DbResult<Self> {
        let len = name.len();
        if len == 0 || len >= PROPERTY_NAME_CAPACITY {
            return Err(DatabaseError::InvalidPropertyName(name.to_owned()));
        }

        let mut bytes = [0u8; PROPERTY_NAME_CAPACITY];
        bytes[..len].copy_from_slice(name.as_bytes());

        Ok(Self {
            bytes,
            len: u8::try_from(len)
                .map_err(|_| DatabaseError::InvalidPropertyName(name.to_owned()))?,
        })
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Built from a `&str` and cut only at its end, so always valid UTF-8.
        std::str::from_utf8(&self.bytes[..usize::from(self.len)]).unwrap_or_default()
    }
}

impl fmt::Debug for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed property as declared by the caller.
///
/// Object and reference properties always carry the object type they hold;
/// every other property carries none.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyDefinition {
    name: PropertyName,
    ty: PropertyType,
    object_type: ObjectTypeId,
}

impl PropertyDefinition {
    /// Declares a scalar or blob property.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidPropertyName`] for a bad name and
    /// [`DatabaseError::MissingObjectType`] if `ty` is `Object` or
    /// `Reference` (use [`Self::object`] / [`Self::reference`]).
    pub fn new(name: &str, ty: PropertyType) -> DbResult<Self> {
        let name = PropertyName::new(name)?;
        if ty.is_object_bound() {
            return Err(DatabaseError::MissingObjectType(name.as_str().to_owned()));
        }

        Ok(Self {
            name,
            ty,
            object_type: ObjectTypeId::NONE,
        })
    }

    /// Declares an owned sub-object property.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidPropertyName`] for a bad name and
    /// [`DatabaseError::MissingObjectType`] if `object_type` is `NONE`.
    pub fn object(name: &str, object_type: ObjectTypeId) -> DbResult<Self> {
        Self::bound(name, PropertyType::Object, object_type)
    }

    /// Declares a non-owning reference property.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidPropertyName`] for a bad name and
    /// [`DatabaseError::MissingObjectType`] if `object_type` is `NONE`.
    pub fn reference(name: &str, object_type: ObjectTypeId) -> DbResult<Self> {
        Self::bound(name, PropertyType::Reference, object_type)
    }

    fn bound(name: &str, ty: PropertyType, object_type: ObjectTypeId) -> DbResult<Self> {
        let name = PropertyName::new(name)?;
        if object_type.is_none() {
            return Err(DatabaseError::MissingObjectType(name.as_str().to_owned()));
        }

        Ok(Self {
            name,
            ty,
            object_type,
        })
    }

    /// The property name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &PropertyName {
        &self.name
    }

    /// The type tag.
    #[inline]
    #[must_use]
    pub const fn ty(&self) -> PropertyType {
        self.ty
    }

    /// The associated object type (`NONE` unless object or reference).
    #[inline]
    #[must_use]
    pub const fn object_type(&self) -> ObjectTypeId {
        self.object_type
    }

    /// Inline size of this property in bytes.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.ty.size()
    }
}
