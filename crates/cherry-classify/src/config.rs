//! Configuration for locating the model cache

use crate::cache::FsCache;
use cherry_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Cherry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CherryConfig {
    /// Root directory of the model cache
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Model used when none is named explicitly
    #[serde(default)]
    pub default_model: Option<String>,
}

impl Default for CherryConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            default_model: None,
        }
    }
}

impl CherryConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::config(format!("invalid YAML: {}", e)))
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Load from file if it exists, defaults otherwise
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Override the cache directory
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Resolve the model to use: the explicit one, or the configured default
    pub fn model<'a>(&'a self, explicit: Option<&'a str>) -> Result<&'a str> {
        explicit
            .or(self.default_model.as_deref())
            .ok_or_else(|| Error::config("no model given and no default_model configured"))
    }

    /// Filesystem cache at the configured location
    pub fn cache(&self) -> FsCache {
        FsCache::new(&self.cache_dir)
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("cherry"))
        .unwrap_or_else(|| PathBuf::from("./.cherry"))
}
