//! # Database Configuration
//!
//! Tunables loaded once at startup, typically from a TOML file:
//!
//! ```toml
//! initial_object_capacity = 4096
//! initial_type_capacity = 32
//! max_ownership_depth = 16
//! max_blob_bytes = 67108864
//! ```
//!
//! Missing keys fall back to [`DatabaseConfig::default`]; unknown keys are
//! rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DatabaseError, DbResult};

/// Database tunables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Object slots reserved up front.
    pub initial_object_capacity: usize,
    /// Object types reserved up front.
    pub initial_type_capacity: usize,
    /// Longest chain of owned sub-objects a type may declare. Bounds the
    /// recursion depth of object creation and destruction.
    pub max_ownership_depth: u32,
    /// Largest size a single blob may be resized to.
    pub max_blob_bytes: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            initial_object_capacity: 1024,
            initial_type_capacity: 16,
            max_ownership_depth: 64,
            max_blob_bytes: 1 << 30,
        }
    }
}

impl DatabaseConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidConfig`] on malformed TOML, unknown
    /// keys, or values rejected by [`Self::validate`].
    pub fn from_toml_str(source: &str) -> DbResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| DatabaseError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidConfig`] if the file cannot be read
    /// or does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            DatabaseError::InvalidConfig(format!("{}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks that the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidConfig`] if `max_ownership_depth` or
    /// `max_blob_bytes` is zero.
    pub fn validate(&self) -> DbResult<()> {
        if self.max_ownership_depth == 0 {
            return Err(DatabaseError::InvalidConfig(
                "max_ownership_depth must be at least 1".into(),
            ));
        }
        if self.max_blob_bytes == 0 {
            return Err(DatabaseError::InvalidConfig(
                "max_blob_bytes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = DatabaseConfig::from_toml_str("max_ownership_depth = 4").unwrap();
        assert_eq!(config.max_ownership_depth, 4);
        assert_eq!(
            config.initial_object_capacity,
            DatabaseConfig::default().initial_object_capacity
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = DatabaseConfig::from_toml_str("max_depth = 4");
        assert!(matches!(result, Err(DatabaseError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_depth_rejected() {
        let result = DatabaseConfig::from_toml_str("max_ownership_depth = 0");
        assert!(matches!(result, Err(DatabaseError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = DatabaseConfig::from_file("/nonexistent/tessera.toml");
        assert!(matches!(result, Err(DatabaseError::InvalidConfig(_))));
    }
}
