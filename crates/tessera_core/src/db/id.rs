//! # Object Handles
//!
//! Objects are identified by generational handles consisting of:
//! - A slot index into the slot table
//! - The object's type
//! - A generation counter for safe slot reuse

use std::fmt;

use bytemuck::{Pod, Zeroable};

use crate::schema::ObjectTypeId;

/// Generational handle to an object instance.
///
/// The handle is packed into 64 bits:
/// - Bits 0..32: slot index
/// - Bits 32..48: object type
/// - Bits 48..64: generation of the slot when the object was created
///
/// The all-zero value is [`ObjectId::NULL`]. Since a live object always has a
/// nonzero type, a zero-filled instance buffer reads back null handles.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Null/invalid object handle.
    pub const NULL: Self = Self(0);

    /// Creates a handle from its parts.
    #[inline]
    #[must_use]
    pub const fn new(slot: u32, object_type: ObjectTypeId, generation: u16) -> Self {
        Self((slot as u64) | ((object_type.index() as u64) << 32) | ((generation as u64) << 48))
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> u32 {
        self.0 as u32
    }

    /// Returns the object type.
    #[inline]
    #[must_use]
    pub const fn object_type(self) -> ObjectTypeId {
        ObjectTypeId::new((self.0 >> 32) as u16)
    }

    /// Returns the generation.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u16 {
        (self.0 >> 48) as u16
    }

    /// Returns the packed 64-bit representation.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Rebuilds a handle from [`Self::to_bits`].
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Checks if this handle can never refer to a live object.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.object_type().is_none()
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectId")
            .field("slot", &self.slot())
            .field("type", &self.object_type().index())
            .field("generation", &self.generation())
            .finish()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}@{}",
            self.object_type().index(),
            self.slot(),
            self.generation()
        )
    }
}
