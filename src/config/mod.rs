//! Configuration handling for chunksplit
//!
//! Parses and manages chunksplit.toml configuration files.

mod schema;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::split::CacheGroups;

pub use schema::*;

/// Default configuration file name
pub const CONFIG_FILE: &str = "chunksplit.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Project metadata
    #[serde(default)]
    pub project: ProjectConfig,

    /// Cache groups, in declaration order
    ///
    /// Kept as a raw value so that a malformed table degrades to "no match"
    /// instead of failing the whole file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_groups: Option<toml::Value>,
}

impl Config {
    /// Load configuration from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let canonical_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        let content = fs::read_to_string(&canonical_path)
            .with_context(|| format!("Failed to read config file: {}", canonical_path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse {}", canonical_path.display()))
    }

    /// Parse configuration from TOML source
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Cache groups ready for the split pass
    pub fn cache_groups(&self) -> CacheGroups {
        cache_groups_from_value(self.cache_groups.as_ref())
            .into_iter()
            .collect()
    }
}
