//! # Operation Table
//!
//! The database as a versioned table of plain function pointers, for hosts
//! that discover modules by name and version instead of linking against
//! [`Database`] directly.
//!
//! ```rust,ignore
//! let api = (PLUGIN_SPEC.load)();
//! let mut db = (api.create)(Box::new(SystemAllocator), DatabaseConfig::default());
//! let ty = (api.add_object_type)(&mut db, &props)?;
//! let obj = (api.create_object)(&mut db, ty);
//! (api.set_float64)(&mut db, obj, "x", 3.0)?;
//! ```

use std::fmt;

use crate::config::DatabaseConfig;
use crate::db::{Database, ObjectId};
use crate::error::DbResult;
use crate::memory::Allocator;
use crate::schema::{ObjectTypeId, PropertyDefinition};

/// Database type the operation table works on.
pub type DynDatabase = Database<Box<dyn Allocator>>;

/// Semantic version of a published table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Incompatible changes.
    pub major: u32,
    /// Backwards-compatible additions.
    pub minor: u32,
    /// Fixes.
    pub patch: u32,
}

impl Version {
    /// Creates a version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Checks if a table of this version can serve a caller that asked for
    /// `required`.
    ///
    /// Majors must match and this version must not be older. Below `1.0`
    /// every minor release is treated as breaking, so minors must match too.
    #[must_use]
    pub fn is_compatible_with(&self, required: Version) -> bool {
        if self.major != required.major {
            return false;
        }
        if self.major == 0 {
            return self.minor == required.minor && self.patch >= required.patch;
        }
        (self.minor, self.patch) >= (required.minor, required.patch)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Name, version and entry point of a published table.
#[derive(Clone, Copy)]
pub struct PluginSpec<T: 'static> {
    /// Name hosts look the table up by.
    pub name: &'static str,
    /// Version of the table.
    pub version: Version,
    /// Returns the table.
    pub load: fn() -> &'static T,
}

impl<T> fmt::Debug for PluginSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginSpec")
            .field("name", &self.name)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

macro_rules! define_database_api {
    ($($ty:ty => $tag:ident, $get:ident, $set:ident;)*) => {
        /// Function table over [`DynDatabase`].
        ///
        /// Every entry forwards to the [`Database`] method of the same name.
        /// `create_object` returns [`ObjectId::NULL`] on failure, like the
        /// handle it would otherwise have produced; everything else reports
        /// errors as values.
        #[derive(Clone, Copy)]
        pub struct DatabaseApi {
            /// Creates a database over the given allocator.
            pub create: fn(Box<dyn Allocator>, DatabaseConfig) -> DynDatabase,
            /// Registers an object type.
            pub add_object_type: fn(&mut DynDatabase, &[PropertyDefinition]) -> DbResult<ObjectTypeId>,
            /// Creates an object, or returns the null handle.
            pub create_object: fn(&mut DynDatabase, ObjectTypeId) -> ObjectId,
            /// Destroys an object and everything it owns.
            pub destroy_object: fn(&mut DynDatabase, ObjectId) -> bool,
            /// Checks if a handle is live.
            pub is_alive: fn(&DynDatabase, ObjectId) -> bool,
            $(
                #[doc = concat!("Reads a `", stringify!($ty), "` property.")]
                pub $get: fn(&DynDatabase, ObjectId, &str) -> DbResult<$ty>,
                #[doc = concat!("Writes a `", stringify!($ty), "` property.")]
                pub $set: fn(&mut DynDatabase, ObjectId, &str, $ty) -> DbResult<()>,
            )*
            /// Returns the handle of an owned sub-object.
            pub get_sub_object: fn(&DynDatabase, ObjectId, &str) -> DbResult<ObjectId>,
            /// Returns the handle stored in a reference.
            pub get_reference: fn(&DynDatabase, ObjectId, &str) -> DbResult<ObjectId>,
            /// Points a reference at an object of its declared type.
            pub set_reference: fn(&mut DynDatabase, ObjectId, &str, ObjectId) -> DbResult<()>,
            /// Resizes a blob.
            pub reallocate_blob: fn(&mut DynDatabase, ObjectId, &str, usize) -> DbResult<()>,
            /// Copies bytes out of a blob.
            pub get_blob_data: fn(&DynDatabase, ObjectId, &str, usize, &mut [u8]) -> DbResult<()>,
            /// Copies bytes into a blob.
            pub set_blob_data: fn(&mut DynDatabase, ObjectId, &str, usize, &[u8]) -> DbResult<()>,
        }

        static DATABASE_API: DatabaseApi = DatabaseApi {
            create: |allocator, config| Database::with_allocator(allocator, config),
            add_object_type: |db, properties| db.add_object_type(properties),
            create_object: |db, ty| db.create_object(ty).unwrap_or(ObjectId::NULL),
            destroy_object: |db, id| db.destroy_object(id),
            is_alive: |db, id| db.is_alive(id),
            $(
                $get: |db, id, name| db.get::<$ty>(id, name),
                $set: |db, id, name, value| db.set::<$ty>(id, name, value),
            )*
            get_sub_object: |db, id, name| db.get_sub_object(id, name),
            get_reference: |db, id, name| db.get_reference(id, name),
            set_reference: |db, id, name, value| db.set_reference(id, name, value),
            reallocate_blob: |db, id, name, size| db.reallocate_blob(id, name, size),
            get_blob_data: |db, id, name, offset, out| db.get_blob_data(id, name, offset, out),
            set_blob_data: |db, id, name, offset, data| db.set_blob_data(id, name, offset, data),
        };
    };
}

crate::for_all_scalar_types!(define_database_api);

impl fmt::Debug for DatabaseApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseApi").finish_non_exhaustive()
    }
}

fn load() -> &'static DatabaseApi {
    &DATABASE_API
}

/// The published database table.
pub static PLUGIN_SPEC: PluginSpec<DatabaseApi> = PluginSpec {
    name: "database",
    version: Version::new(0, 0, 2),
    load,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SystemAllocator;
    use crate::schema::PropertyType;

    #[test]
    fn test_version_compatibility() {
        let v002 = Version::new(0, 0, 2);
        assert!(v002.is_compatible_with(Version::new(0, 0, 1)));
        assert!(v002.is_compatible_with(Version::new(0, 0, 2)));
        assert!(!v002.is_compatible_with(Version::new(0, 0, 3)));
        assert!(!v002.is_compatible_with(Version::new(0, 1, 0)));
        assert!(!v002.is_compatible_with(Version::new(1, 0, 0)));

        let v12 = Version::new(1, 2, 0);
        assert!(v12.is_compatible_with(Version::new(1, 1, 9)));
        assert!(!v12.is_compatible_with(Version::new(1, 3, 0)));
    }

    #[test]
    fn test_table_roundtrip() {
        let api = (PLUGIN_SPEC.load)();
        let mut db = (api.create)(Box::new(SystemAllocator), DatabaseConfig::default());

        let ty = (api.add_object_type)(
            &mut db,
            &[
                PropertyDefinition::new("x", PropertyType::Float32).unwrap(),
                PropertyDefinition::new("n", PropertyType::UInt16).unwrap(),
            ],
        )
        .unwrap();

        let id = (api.create_object)(&mut db, ty);
        assert!((api.is_alive)(&db, id));

        (api.set_float32)(&mut db, id, "x", 3.0).unwrap();
        (api.set_uint16)(&mut db, id, "n", 7).unwrap();
        assert_eq!((api.get_float32)(&db, id, "x").unwrap().to_bits(), 3.0f32.to_bits());
        assert_eq!((api.get_uint16)(&db, id, "n").unwrap(), 7);
        assert!((api.get_float64)(&db, id, "x").is_err());

        assert!((api.destroy_object)(&mut db, id));
        assert!(!(api.is_alive)(&db, id));
    }

    #[test]
    fn test_create_object_failure_is_null() {
        let api = (PLUGIN_SPEC.load)();
        let mut db = (api.create)(Box::new(SystemAllocator), DatabaseConfig::default());
        assert_eq!((api.create_object)(&mut db, ObjectTypeId::new(4)), ObjectId::NULL);
    }
}
