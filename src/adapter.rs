//! Read-only map view over a [`LayeredConfig`].
//!
//! For consumers that want plain key lookup and iteration. Every call reads
//! through to the live layers; mutation is rejected.

use std::sync::Arc;

use crate::config::{ConfigError, LayeredConfig};

/// Map-like adaptor exposing effective string values.
#[derive(Debug, Clone)]
pub struct ConfigMap {
    config: Arc<LayeredConfig>,
}

impl ConfigMap {
    pub fn new(config: Arc<LayeredConfig>) -> Self {
        Self { config }
    }

    /// Effective (first) value of `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get_string(key).ok()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.config.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.config.keys()
    }

    /// Snapshot of every key and its effective value.
    pub fn iter(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.config
            .keys()
            .into_iter()
            .filter_map(|key| self.get(&key).map(|value| (key, value)))
    }

    pub fn len(&self) -> usize {
        self.config.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.config.is_empty()
    }

    pub fn insert(&self, _key: &str, _value: &str) -> Result<Option<String>, ConfigError> {
        Err(ConfigError::UnsupportedOperation("insert"))
    }

    pub fn remove(&self, _key: &str) -> Result<Option<String>, ConfigError> {
        Err(ConfigError::UnsupportedOperation("remove"))
    }

    pub fn clear(&self) -> Result<(), ConfigError> {
        Err(ConfigError::UnsupportedOperation("clear"))
    }

    /// The underlying configuration.
    pub fn config(&self) -> &LayeredConfig {
        &self.config
    }
}

impl From<LayeredConfig> for ConfigMap {
    fn from(config: LayeredConfig) -> Self {
        Self::new(Arc::new(config))
    }
}
