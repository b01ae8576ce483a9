//! # Tessera Demo
//!
//! Resolves the database table through the plugin registry and runs the
//! smoke scenario against it.
//!
//! ```bash
//! # Default settings
//! ./tessera_demo
//!
//! # Settings from a TOML file, with debug output
//! RUST_LOG=debug ./tessera_demo tessera.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tessera::core::{DatabaseConfig, SystemAllocator, TrackingAllocator, Version};
use tessera::{run_smoke_scenario, HostError, PluginRegistry};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Version of the database table this host was written against.
const REQUIRED_DATABASE: Version = Version::new(0, 0, 1);

fn init_logging() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<DatabaseConfig, HostError> {
    let Some(path) = path else {
        return Ok(DatabaseConfig::default());
    };

    DatabaseConfig::from_file(&path).map_err(|source| HostError::Config { path, source })
}

fn run() -> Result<(), HostError> {
    let config = load_config(std::env::args_os().nth(1).map(PathBuf::from))?;
    tracing::info!(?config, "starting");

    let registry = PluginRegistry::with_builtin();
    let api = registry.load("database", REQUIRED_DATABASE)?;

    let tracker = Arc::new(TrackingAllocator::new(SystemAllocator));
    let report = run_smoke_scenario(api, Box::new(Arc::clone(&tracker)), config)?;

    let record = report.record;
    tracing::info!(x = report.x, "obj.x");
    tracing::info!(u = record.u, w = %record.text(), x = record.x, "obj.blob");

    let stats = tracker.stats();
    tracing::info!(
        peak_objects = report.peak_objects,
        peak_bytes = stats.peak_bytes,
        allocations = stats.total_allocations,
        leaked_blocks = stats.live_blocks,
        "database released"
    );

    Ok(())
}

fn main() {
    init_logging();

    if let Err(err) = run() {
        tracing::error!(error = %err, "demo failed");
        std::process::exit(1);
    }
}
