//! Adapter configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dtype::DType;
use crate::error::{AdapterError, AdapterResult};

/// Configuration for a bridge runtime.
///
/// ```toml
/// repr_max_len = 80
/// delegation = true
///
/// [default_dtypes]
/// exposure = "float64"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Maximum length of an adapter representation
    pub repr_max_len: usize,

    /// Fall through to foreign methods for unbound attributes
    pub delegation: bool,

    /// Per-role default dtype for roles resolved by keyword
    pub default_dtypes: BTreeMap<String, DType>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            repr_max_len: 120,
            delegation: true,
            default_dtypes: BTreeMap::new(),
        }
    }
}

impl BridgeConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that only exposes explicitly bound attributes
    pub fn strict() -> Self {
        Self {
            delegation: false,
            ..Default::default()
        }
    }

    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> AdapterResult<Self> {
        let config: BridgeConfig = toml::from_str(text).map_err(|e| AdapterError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> AdapterResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AdapterError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> AdapterResult<String> {
        toml::to_string_pretty(self).map_err(|e| AdapterError::config(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> AdapterResult<()> {
        if self.repr_max_len < 8 {
            return Err(AdapterError::config("repr_max_len must be at least 8"));
        }
        Ok(())
    }

    /// Configured default dtype for a role
    pub fn default_dtype(&self, role: &str) -> Option<DType> {
        self.default_dtypes.get(role).copied()
    }
}
