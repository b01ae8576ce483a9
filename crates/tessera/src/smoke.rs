//! # Smoke Scenario
//!
//! Drives a loaded [`DatabaseApi`] through the paths a host relies on at
//! startup: two related object types, an owned sub-object and a reference,
//! a record copied in and out of a blob, a batch of extra objects and a
//! float round-trip. Everything created is destroyed again before the
//! database is dropped.

use tessera_core::{
    Allocator, DatabaseApi, DatabaseConfig, DynDatabase, ObjectId, ObjectTypeId,
    PropertyDefinition, PropertyType,
};

use crate::HostError;

/// Extra objects created after the initial pair.
pub const EXTRA_OBJECTS: usize = 100;

/// Fixed-size record stored in a blob by the scenario.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmokeRecord {
    /// Signed field.
    pub u: i32,
    /// NUL-padded text.
    pub w: [u8; 43],
    /// Float field.
    pub x: f32,
}

impl SmokeRecord {
    /// Encoded size in bytes.
    pub const SIZE: usize = 4 + 43 + 4;

    /// Creates a record, truncating `text` to fit.
    #[must_use]
    pub fn new(u: i32, text: &str, x: f32) -> Self {
        let mut w = [0u8; 43];
        let len = text.len().min(w.len());
        w[..len].copy_from_slice(&text.as_bytes()[..len]);
        Self { u, w, x }
    }

    /// The text up to its first NUL.
    #[must_use]
    pub fn text(&self) -> String {
        let end = self.w.iter().position(|&b| b == 0).unwrap_or(self.w.len());
        String::from_utf8_lossy(&self.w[..end]).into_owned()
    }

    /// Encodes the record in native byte order.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..4].copy_from_slice(&self.u.to_ne_bytes());
        bytes[4..47].copy_from_slice(&self.w);
        bytes[47..].copy_from_slice(&self.x.to_ne_bytes());
        bytes
    }

    /// Decodes a record written by [`Self::to_bytes`].
    #[must_use]
    pub fn from_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        let mut u = [0u8; 4];
        let mut w = [0u8; 43];
        let mut x = [0u8; 4];
        u.copy_from_slice(&bytes[..4]);
        w.copy_from_slice(&bytes[4..47]);
        x.copy_from_slice(&bytes[47..]);
        Self {
            u: i32::from_ne_bytes(u),
            w,
            x: f32::from_ne_bytes(x),
        }
    }
}

/// What the scenario observed.
#[derive(Clone, Debug, PartialEq)]
pub struct SmokeReport {
    /// The plain object type.
    pub item_type: ObjectTypeId,
    /// The type owning an item and referencing another.
    pub holder_type: ObjectTypeId,
    /// Live objects at the peak of the scenario.
    pub peak_objects: usize,
    /// `x` read back from the first item.
    pub x: f32,
    /// Record read back from the first item's blob.
    pub record: SmokeRecord,
    /// Live objects after teardown.
    pub remaining_objects: usize,
}

fn created(id: ObjectId, what: &str) -> Result<ObjectId, HostError> {
    if id.is_null() {
        Err(HostError::Scenario(format!("could not create {what}")))
    } else {
        Ok(id)
    }
}

fn write_record(
    api: &DatabaseApi,
    db: &mut DynDatabase,
    id: ObjectId,
    record: &SmokeRecord,
) -> Result<(), HostError> {
    (api.reallocate_blob)(db, id, "blob", SmokeRecord::SIZE)?;
    (api.set_blob_data)(db, id, "blob", 0, &record.to_bytes())?;
    Ok(())
}

/// Runs the scenario on a fresh database drawing from `allocator`.
///
/// # Errors
///
/// Propagates any database error, and returns [`HostError::Scenario`] if an
/// object cannot be created or a value reads back wrong.
pub fn run_smoke_scenario(
    api: &DatabaseApi,
    allocator: Box<dyn Allocator>,
    config: DatabaseConfig,
) -> Result<SmokeReport, HostError> {
    let mut db = (api.create)(allocator, config);

    let item_type = (api.add_object_type)(
        &mut db,
        &[
            PropertyDefinition::new("active", PropertyType::Bool)?,
            PropertyDefinition::new("x", PropertyType::Float32)?,
            PropertyDefinition::new("y", PropertyType::Float32)?,
            PropertyDefinition::new("blob", PropertyType::Blob)?,
        ],
    )?;
    let holder_type = (api.add_object_type)(
        &mut db,
        &[
            PropertyDefinition::object("subobject", item_type)?,
            PropertyDefinition::reference("reference", item_type)?,
        ],
    )?;
    tracing::debug!(%item_type, %holder_type, "registered smoke types");

    let holder = created((api.create_object)(&mut db, holder_type), "holder")?;
    let item = created((api.create_object)(&mut db, item_type), "item")?;

    let record = SmokeRecord::new(-12, "123", 1.25);
    write_record(api, &mut db, item, &record)?;

    let sub = (api.get_sub_object)(&db, holder, "subobject")?;
    write_record(api, &mut db, sub, &record)?;
    (api.set_reference)(&mut db, holder, "reference", item)?;

    (api.set_float32)(&mut db, item, "x", 3.0)?;

    let mut extra = Vec::with_capacity(EXTRA_OBJECTS);
    for _ in 0..EXTRA_OBJECTS {
        let id = created((api.create_object)(&mut db, item_type), "extra item")?;
        tracing::debug!(object = %id, "created extra item");
        extra.push(id);
    }
    let peak_objects = db.object_count();

    let x = (api.get_float32)(&db, item, "x")?;
    tracing::debug!(x, "item.x");

    let mut bytes = [0u8; SmokeRecord::SIZE];
    (api.get_blob_data)(&db, item, "blob", 0, &mut bytes)?;
    let read_back = SmokeRecord::from_bytes(&bytes);
    tracing::debug!(u = read_back.u, w = %read_back.text(), x = read_back.x, "item.blob");

    if read_back != record {
        return Err(HostError::Scenario(format!(
            "blob read back {read_back:?}, wrote {record:?}"
        )));
    }
    if (api.get_reference)(&db, holder, "reference")? != item {
        return Err(HostError::Scenario("reference did not round-trip".into()));
    }

    for id in extra {
        (api.destroy_object)(&mut db, id);
    }
    (api.destroy_object)(&mut db, holder);
    (api.destroy_object)(&mut db, item);
    let remaining_objects = db.object_count();

    tracing::info!(peak_objects, remaining_objects, "smoke scenario finished");

    Ok(SmokeReport {
        item_type,
        holder_type,
        peak_objects,
        x,
        record: read_back,
        remaining_objects,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_encoding() {
        let record = SmokeRecord::new(-12, "123", 1.25);
        let decoded = SmokeRecord::from_bytes(&record.to_bytes());
        assert_eq!(decoded, record);
        assert_eq!(decoded.text(), "123");
    }

    #[test]
    fn test_record_truncates_long_text() {
        let long = "x".repeat(64);
        assert_eq!(SmokeRecord::new(0, &long, 0.0).text().len(), 43);
    }
}
