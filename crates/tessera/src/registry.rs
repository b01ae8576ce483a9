//! # Plugin Registry
//!
//! Operation tables are looked up by name and the version the caller was
//! written against. The first registered table whose version
//! [is compatible](tessera_core::Version::is_compatible_with) wins.

use tessera_core::{DatabaseApi, PluginSpec, Version, PLUGIN_SPEC};

use crate::HostError;

/// Registered database tables.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    specs: Vec<&'static PluginSpec<DatabaseApi>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the database table built into
    /// `tessera_core`.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(&PLUGIN_SPEC);
        registry
    }

    /// Adds a table. Earlier registrations take precedence on lookup.
    pub fn register(&mut self, spec: &'static PluginSpec<DatabaseApi>) {
        tracing::debug!(plugin = spec.name, version = %spec.version, "registered plugin");
        self.specs.push(spec);
    }

    /// Number of registered tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Checks if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Resolves a table by name for a caller written against `version`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::PluginNotFound`] if no registered table has that
    /// name and a compatible version.
    pub fn load(&self, name: &str, version: Version) -> Result<&'static DatabaseApi, HostError> {
        let spec = self
            .specs
            .iter()
            .find(|spec| spec.name == name && spec.version.is_compatible_with(version))
            .ok_or_else(|| HostError::PluginNotFound {
                name: name.to_owned(),
                version,
            })?;

        tracing::info!(plugin = spec.name, version = %spec.version, requested = %version, "loaded plugin");
        Ok((spec.load)())
    }
}
