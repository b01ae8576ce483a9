//! # Property Values
//!
//! One generic codec for every scalar property type. Values are read and
//! written unaligned in native byte order, since instance layouts are packed.

use bytemuck::Pod;

use crate::schema::PropertyType;

/// Expands `$callback!` once with every scalar Rust type, its property tag
/// and the names of its getter/setter pair.
///
/// This is the single list of base types: the [`PropertyValue`] impls and
/// the operation table are both generated from it, so adding a tag here
/// covers every accessor at once.
#[macro_export]
macro_rules! for_all_scalar_types {
    ($callback:ident) => {
        $callback! {
            bool => Bool, get_bool, set_bool;
            i8 => Int8, get_int8, set_int8;
            i16 => Int16, get_int16, set_int16;
            i32 => Int32, get_int32, set_int32;
            i64 => Int64, get_int64, set_int64;
            u8 => UInt8, get_uint8, set_uint8;
            u16 => UInt16, get_uint16, set_uint16;
            u32 => UInt32, get_uint32, set_uint32;
            u64 => UInt64, get_uint64, set_uint64;
            f32 => Float32, get_float32, set_float32;
            f64 => Float64, get_float64, set_float64;
        }
    };
}

mod sealed {
    pub trait Sealed {}
}

/// A Rust type that can be stored in a scalar property.
///
/// Implemented for exactly the scalar property types; sealed so the set
/// stays in step with [`PropertyType`].
pub trait PropertyValue: Copy + sealed::Sealed {
    /// The property tag this type maps to.
    const TYPE: PropertyType;

    /// Decodes a value from exactly `TYPE.size()` bytes.
    fn read(bytes: &[u8]) -> Self;

    /// Encodes a value into exactly `TYPE.size()` bytes.
    fn write(self, bytes: &mut [u8]);
}

#[inline]
fn read_pod<T: Pod>(bytes: &[u8]) -> T {
    bytemuck::pod_read_unaligned(bytes)
}

#[inline]
fn write_pod<T: Pod>(value: T, bytes: &mut [u8]) {
    bytes.copy_from_slice(bytemuck::bytes_of(&value));
}

macro_rules! impl_property_value {
    (bool => $tag:ident, $get:ident, $set:ident; $($ty:ty => $t:ident, $g:ident, $s:ident;)*) => {
        impl sealed::Sealed for bool {}

        impl PropertyValue for bool {
            const TYPE: PropertyType = PropertyType::$tag;

            #[inline]
            fn read(bytes: &[u8]) -> Self {
                bytes[0] != 0
            }

            #[inline]
            fn write(self, bytes: &mut [u8]) {
                bytes[0] = u8::from(self);
            }
        }

        $(
            impl sealed::Sealed for $ty {}

            impl PropertyValue for $ty {
                const TYPE: PropertyType = PropertyType::$t;

                #[inline]
                fn read(bytes: &[u8]) -> Self {
                    read_pod(bytes)
                }

                #[inline]
                fn write(self, bytes: &mut [u8]) {
                    write_pod(self, bytes);
                }
            }
        )*
    };
}

for_all_scalar_types!(impl_property_value);

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_sizes_match {
        ($($ty:ty => $tag:ident, $get:ident, $set:ident;)*) => {
            $(
                assert_eq!(
                    std::mem::size_of::<$ty>(),
                    PropertyType::$tag.size() as usize,
                    stringify!($ty)
                );
                assert_eq!(<$ty as PropertyValue>::TYPE, PropertyType::$tag);
            )*
        };
    }

    #[test]
    fn test_every_scalar_matches_its_tag() {
        for_all_scalar_types!(assert_sizes_match);
    }

    #[test]
    fn test_unaligned_access() {
        let mut bytes = [0u8; 9];
        (-2.5f64).write(&mut bytes[1..]);
        assert_eq!(f64::read(&bytes[1..]), -2.5);

        true.write(&mut bytes[..1]);
        assert!(bool::read(&bytes[..1]));
    }
}
