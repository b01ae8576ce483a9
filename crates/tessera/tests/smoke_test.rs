//! Integration test for the smoke scenario through the plugin registry.

use std::sync::Arc;

use tessera::core::{
    BudgetAllocator, DatabaseConfig, SystemAllocator, TrackingAllocator, Version,
};
use tessera::{run_smoke_scenario, HostError, PluginRegistry, SmokeRecord};

#[test]
fn test_smoke_scenario_through_registry() {
    let registry = PluginRegistry::with_builtin();
    let api = registry.load("database", Version::new(0, 0, 1)).unwrap();

    let tracker = Arc::new(TrackingAllocator::new(SystemAllocator));
    let report = run_smoke_scenario(
        api,
        Box::new(Arc::clone(&tracker)),
        DatabaseConfig::default(),
    )
    .unwrap();

    assert_eq!(report.item_type.index(), 1);
    assert_eq!(report.holder_type.index(), 2);
    // Holder, its sub-object, the first item and the extras.
    assert_eq!(report.peak_objects, 3 + 100);
    assert_eq!(report.remaining_objects, 0);
    assert_eq!(report.x, 3.0);
    assert_eq!(report.record, SmokeRecord::new(-12, "123", 1.25));

    let stats = tracker.stats();
    assert_eq!(stats.live_blocks, 0);
    assert_eq!(stats.total_allocations, stats.total_frees);
}

#[test]
fn test_smoke_scenario_reports_allocation_failure() {
    let registry = PluginRegistry::with_builtin();
    let api = registry.load("database", Version::new(0, 0, 2)).unwrap();

    // Enough for the first few objects but not the hundred extras.
    let budget = Arc::new(BudgetAllocator::new(SystemAllocator, 512));
    let result = run_smoke_scenario(api, Box::new(budget), DatabaseConfig::default());

    assert!(matches!(result, Err(HostError::Scenario(_))));
}

#[test]
fn test_smoke_scenario_honours_blob_limit() {
    let registry = PluginRegistry::with_builtin();
    let api = registry.load("database", Version::new(0, 0, 2)).unwrap();

    let config = DatabaseConfig {
        max_blob_bytes: 16,
        ..DatabaseConfig::default()
    };
    let result = run_smoke_scenario(api, Box::new(SystemAllocator), config);

    assert!(matches!(
        result,
        Err(HostError::Database(
            tessera::core::DatabaseError::BlobTooLarge { .. }
        ))
    ));
}
