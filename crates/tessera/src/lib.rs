//! # Tessera
//!
//! The host side of the object database.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐   load(name, version)   ┌────────────────────┐
//! │   PluginRegistry   │────────────────────────>│    PluginSpec      │
//! │                    │                         │  "database" 0.0.2  │
//! │  • builtin specs   │<────────────────────────│                    │
//! │  • version match   │    &'static DatabaseApi │  • DatabaseApi     │
//! └─────────┬──────────┘                         └────────────────────┘
//!           │
//!           v
//! ┌────────────────────┐
//! │   Smoke Scenario   │  two types, sub-object, blob copy,
//! │                    │  100 extra objects, float round-trip
//! └────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `registry`: Resolving operation tables by name and version
//! - `smoke`: End-to-end exercise of a loaded database table

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod registry;
pub mod smoke;

use std::path::PathBuf;

use thiserror::Error;

// Re-export the database
pub use tessera_core as core;

pub use registry::PluginRegistry;
pub use smoke::{run_smoke_scenario, SmokeRecord, SmokeReport};

/// Errors raised by the host.
#[derive(Error, Debug)]
pub enum HostError {
    /// No registered table matches the requested name and version.
    #[error("no plugin '{name}' compatible with version {version}")]
    PluginNotFound {
        /// Requested name.
        name: String,
        /// Requested version.
        version: tessera_core::Version,
    },

    /// A database operation failed.
    #[error(transparent)]
    Database(#[from] tessera_core::DatabaseError),

    /// The configuration file could not be loaded.
    #[error("failed to load config {}: {source}", path.display())]
    Config {
        /// Path that was read.
        path: PathBuf,
        /// Underlying failure.
        source: tessera_core::DatabaseError,
    },

    /// The smoke scenario observed a wrong value.
    #[error("smoke scenario failed: {0}")]
    Scenario(String),
}
