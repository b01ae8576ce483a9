//! Integration tests for the object database.

use tessera_core::{
    BudgetAllocator, Database, DatabaseConfig, DatabaseError, ObjectId, ObjectTypeId,
    PropertyDefinition, PropertyType, SystemAllocator, TrackingAllocator,
};

fn point_type(db: &mut Database<impl tessera_core::Allocator>) -> ObjectTypeId {
    db.add_object_type(&[
        PropertyDefinition::new("x", PropertyType::Float64).unwrap(),
        PropertyDefinition::new("y", PropertyType::Float64).unwrap(),
    ])
    .unwrap()
}

#[test]
fn test_point_lifecycle_and_slot_reuse() {
    let mut db = Database::new();
    let point = point_type(&mut db);

    let ids: Vec<ObjectId> = (0..100u32)
        .map(|i| {
            let id = db.create_object(point).unwrap();
            db.set(id, "x", f64::from(i)).unwrap();
            id
        })
        .collect();

    for (i, &id) in ids.iter().enumerate() {
        assert_eq!(db.get::<f64>(id, "x").unwrap(), i as f64);
        assert_eq!(db.get::<f64>(id, "y").unwrap(), 0.0);
    }

    for &id in &ids[..50] {
        assert!(db.destroy_object(id));
    }
    assert_eq!(db.object_count(), 50);

    // The most recently freed slot comes back first.
    let last_freed = ids[49];
    let recreated = db.create_object(point).unwrap();
    assert_eq!(recreated.slot(), last_freed.slot());
    assert_eq!(recreated.generation(), last_freed.generation() + 1);

    assert!(db.get_object(last_freed).is_none());
    assert_eq!(
        db.get::<f64>(last_freed, "x"),
        Err(DatabaseError::StaleHandle(last_freed))
    );
    assert_eq!(db.get::<f64>(recreated, "x").unwrap(), 0.0);

    for (i, &id) in ids.iter().enumerate().skip(50) {
        assert_eq!(db.get::<f64>(id, "x").unwrap(), i as f64);
    }
}

#[test]
fn test_single_destroy_reuses_its_slot() {
    let mut db = Database::new();
    let point = point_type(&mut db);

    let ids: Vec<ObjectId> = (0..100u32)
        .map(|i| {
            let id = db.create_object(point).unwrap();
            db.set(id, "x", f64::from(i)).unwrap();
            id
        })
        .collect();

    let victim = ids[50];
    assert!(db.destroy_object(victim));
    assert_eq!(db.object_count(), 99);

    let replacement = db.create_object(point).unwrap();
    assert_eq!(replacement.slot(), victim.slot());
    assert_eq!(replacement.generation(), victim.generation() + 1);

    assert!(db.get_object(victim).is_none());
    assert_eq!(
        db.get::<f64>(victim, "x"),
        Err(DatabaseError::StaleHandle(victim))
    );
    assert_eq!(db.get::<f64>(replacement, "x").unwrap(), 0.0);
    assert_eq!(db.get::<f64>(ids[49], "x").unwrap(), 49.0);
    assert_eq!(db.get::<f64>(ids[51], "x").unwrap(), 51.0);
}

#[test]
fn test_raw_writes_limited_to_scalars() {
    let mut db = Database::new();
    let point = point_type(&mut db);
    let shape = db
        .add_object_type(&[
            PropertyDefinition::new("id", PropertyType::UInt32).unwrap(),
            PropertyDefinition::new("mesh", PropertyType::Blob).unwrap(),
            PropertyDefinition::object("origin", point).unwrap(),
            PropertyDefinition::reference("anchor", point).unwrap(),
        ])
        .unwrap();
    let s = db.create_object(shape).unwrap();

    db.property_bytes_mut(s, PropertyType::UInt32, "id")
        .unwrap()
        .copy_from_slice(&7u32.to_ne_bytes());
    assert_eq!(db.get::<u32>(s, "id").unwrap(), 7);

    for (name, ty) in [
        ("mesh", PropertyType::Blob),
        ("origin", PropertyType::Object),
        ("anchor", PropertyType::Reference),
    ] {
        assert_eq!(
            db.property_bytes_mut(s, ty, name),
            Err(DatabaseError::NotScalar {
                property: name.into(),
                found: ty,
            })
        );
        // Reading the inline bytes stays allowed.
        assert_eq!(db.property_bytes(s, ty, name).unwrap().len(), ty.size() as usize);
    }

    // A stale handle still reports as stale before the tag check.
    assert!(db.destroy_object(s));
    assert_eq!(
        db.property_bytes_mut(s, PropertyType::Blob, "mesh"),
        Err(DatabaseError::StaleHandle(s))
    );
}

#[test]
fn test_blob_roundtrip_and_release() {
    let tracker = TrackingAllocator::new(SystemAllocator);
    let mut db = Database::with_allocator(&tracker, DatabaseConfig::default());

    let ty = db
        .add_object_type(&[
            PropertyDefinition::new("name", PropertyType::UInt32).unwrap(),
            PropertyDefinition::new("payload", PropertyType::Blob).unwrap(),
        ])
        .unwrap();
    let id = db.create_object(ty).unwrap();
    assert_eq!(db.blob_len(id, "payload").unwrap(), 0);

    db.reallocate_blob(id, "payload", 64).unwrap();
    let written: Vec<u8> = (0..64).collect();
    db.set_blob_data(id, "payload", 0, &written).unwrap();

    let mut read = [0u8; 64];
    db.get_blob_data(id, "payload", 0, &mut read).unwrap();
    assert_eq!(&read[..], &written[..]);

    // A range ending exactly at the end is fine; one byte further is not.
    let mut tail = [0u8; 4];
    db.get_blob_data(id, "payload", 60, &mut tail).unwrap();
    assert_eq!(tail, [60, 61, 62, 63]);
    assert_eq!(
        db.get_blob_data(id, "payload", 61, &mut tail),
        Err(DatabaseError::OutOfBounds {
            offset: 61,
            len: 4,
            size: 64
        })
    );

    // Shrinking keeps the prefix, growing zero-fills.
    db.reallocate_blob(id, "payload", 8).unwrap();
    db.reallocate_blob(id, "payload", 16).unwrap();
    assert_eq!(
        db.blob(id, "payload").unwrap(),
        &[0, 1, 2, 3, 4, 5, 6, 7, 0, 0, 0, 0, 0, 0, 0, 0]
    );

    db.reallocate_blob(id, "payload", 0).unwrap();
    assert_eq!(db.blob_len(id, "payload").unwrap(), 0);
    assert_eq!(tracker.stats().live_blocks, 1);

    assert!(db.destroy_object(id));
    assert_eq!(tracker.stats().live_blocks, 0);
    assert_eq!(db.stats().live_blobs, 0);
}

#[test]
fn test_blob_limit_from_config() {
    let config = DatabaseConfig {
        max_blob_bytes: 32,
        ..DatabaseConfig::default()
    };
    let mut db = Database::with_config(config);
    let ty = db
        .add_object_type(&[PropertyDefinition::new("data", PropertyType::Blob).unwrap()])
        .unwrap();
    let id = db.create_object(ty).unwrap();

    db.reallocate_blob(id, "data", 32).unwrap();
    assert_eq!(
        db.reallocate_blob(id, "data", 33),
        Err(DatabaseError::BlobTooLarge {
            requested: 33,
            limit: 32
        })
    );
    assert_eq!(db.blob_len(id, "data").unwrap(), 32);
}

#[test]
fn test_failed_blob_growth_leaves_blob_intact() {
    let budget = BudgetAllocator::new(SystemAllocator, 64);
    let mut db = Database::with_allocator(&budget, DatabaseConfig::default());
    let ty = db
        .add_object_type(&[PropertyDefinition::new("data", PropertyType::Blob).unwrap()])
        .unwrap();
    let id = db.create_object(ty).unwrap();

    db.reallocate_blob(id, "data", 8).unwrap();
    db.set_blob_data(id, "data", 0, &[7; 8]).unwrap();

    let result = db.reallocate_blob(id, "data", 1024);
    assert!(matches!(result, Err(DatabaseError::OutOfMemory(_))));
    assert_eq!(db.blob(id, "data").unwrap(), &[7; 8]);
}

#[test]
fn test_references_are_typed_and_not_owning() {
    let mut db = Database::new();
    let point = point_type(&mut db);
    let node = db
        .add_object_type(&[
            PropertyDefinition::reference("target", point).unwrap(),
            PropertyDefinition::object("origin", point).unwrap(),
        ])
        .unwrap();

    let n = db.create_object(node).unwrap();
    let p = db.create_object(point).unwrap();
    let other = db.create_object(node).unwrap();

    assert_eq!(db.get_reference(n, "target").unwrap(), ObjectId::NULL);
    db.set_reference(n, "target", p).unwrap();
    assert_eq!(db.get_reference(n, "target").unwrap(), p);

    assert_eq!(
        db.set_reference(n, "target", other),
        Err(DatabaseError::ObjectTypeMismatch {
            property: "target".into(),
            expected: point,
            found: node,
        })
    );
    assert_eq!(db.get_reference(n, "target").unwrap(), p);

    // A reference is not a sub-object, and the reverse.
    assert!(matches!(
        db.get_sub_object(n, "target"),
        Err(DatabaseError::TypeMismatch { .. })
    ));
    assert!(matches!(
        db.get_reference(n, "origin"),
        Err(DatabaseError::TypeMismatch { .. })
    ));

    // Destroying the holder takes its origin but not its target.
    assert_eq!(db.object_count(), 5);
    assert!(db.destroy_object(n));
    assert!(db.is_alive(p));
    assert_eq!(db.object_count(), 3);

    db.set_reference(other, "target", ObjectId::NULL).unwrap();
}

#[test]
fn test_ownership_graph_stays_acyclic() {
    let mut db = Database::new();
    let leaf = point_type(&mut db);
    let future = ObjectTypeId::new(leaf.index() + 1);

    assert_eq!(
        db.add_object_type(&[PropertyDefinition::object("me", future).unwrap()]),
        Err(DatabaseError::CyclicOwnership {
            property: "me".into(),
            object_type: future,
        })
    );

    // A reference to the type being registered is allowed.
    let list = db
        .add_object_type(&[PropertyDefinition::reference("next", future).unwrap()])
        .unwrap();
    assert_eq!(list, future);

    let a = db.create_object(list).unwrap();
    let b = db.create_object(list).unwrap();
    db.set_reference(a, "next", b).unwrap();
    db.set_reference(b, "next", a).unwrap();
    assert_eq!(db.get_reference(db.get_reference(a, "next").unwrap(), "next").unwrap(), a);
}

#[test]
fn test_ownership_depth_limit_from_config() {
    let config = DatabaseConfig::from_toml_str("max_ownership_depth = 3").unwrap();
    let mut db = Database::with_config(config);

    let t1 = point_type(&mut db);
    let t2 = db
        .add_object_type(&[PropertyDefinition::object("c", t1).unwrap()])
        .unwrap();
    let t3 = db
        .add_object_type(&[PropertyDefinition::object("c", t2).unwrap()])
        .unwrap();
    assert!(matches!(
        db.add_object_type(&[PropertyDefinition::object("c", t3).unwrap()]),
        Err(DatabaseError::OwnershipTooDeep { depth: 4, limit: 3 })
    ));

    let root = db.create_object(t3).unwrap();
    assert_eq!(db.object_count(), 3);
    db.destroy_object(root);
    assert_eq!(db.object_count(), 0);
}

#[test]
fn test_config_rejects_unknown_keys() {
    assert!(matches!(
        DatabaseConfig::from_toml_str("max_blob_megabytes = 4"),
        Err(DatabaseError::InvalidConfig(_))
    ));
    assert!(matches!(
        DatabaseConfig::from_toml_str("max_ownership_depth = 0"),
        Err(DatabaseError::InvalidConfig(_))
    ));
}

#[test]
fn test_objects_iterates_live_handles() {
    let mut db = Database::new();
    let point = point_type(&mut db);

    let a = db.create_object(point).unwrap();
    let b = db.create_object(point).unwrap();
    let c = db.create_object(point).unwrap();
    db.destroy_object(b);

    let live: Vec<ObjectId> = db.objects().collect();
    assert_eq!(live, vec![a, c]);

    let stats = db.stats();
    assert_eq!(stats.object_types, 1);
    assert_eq!(stats.live_objects, 2);
    assert_eq!(stats.slots, 3);
}
