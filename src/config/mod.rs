//! Layered configuration: discovery, precedence, and typed lookup.
//!
//! A [`LayeredConfig`] overlays up to four sources for one logical file
//! (see [`loader`] for the order). Every getter reads through the live
//! sources, so values refreshed in the background are picked up without
//! rebuilding the instance.

pub mod loader;
pub mod value;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use indexmap::IndexSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::DEFAULT_REFRESH_INTERVAL;
use crate::context::ProcessContext;
use crate::refresh::{self, RefreshHandle};
use crate::resource::ResourcePath;
use crate::source::{ConfigSource, Layer};

pub use loader::{Candidate, LayerReport, LayerStatus};

/// Errors surfaced by configuration reads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("configuration key '{0}' not found in any layer")]
    KeyNotFound(String),

    #[error("configuration key '{key}' has value {value:?}, which is not a valid {target}")]
    TypeCoercion {
        key: String,
        value: String,
        target: &'static str,
    },

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}

/// Builder for [`LayeredConfig`].
#[derive(Debug, Clone)]
pub struct LayeredConfigBuilder {
    filename: String,
    context: Option<ProcessContext>,
    resources: Option<ResourcePath>,
    refresh_interval: Duration,
}

impl LayeredConfigBuilder {
    /// Process context selecting the local, host, and env layers.
    /// Defaults to [`ProcessContext::global`].
    pub fn context(mut self, context: ProcessContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Where the host, env, and base layers are looked up.
    /// Defaults to [`ResourcePath::default`].
    pub fn resource_path(mut self, resources: ResourcePath) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Minimum time between freshness checks. Zero disables refresh.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Discover and load sources. Never fails: absent or broken sources
    /// are left out and logged.
    pub fn build(self) -> LayeredConfig {
        let context = self
            .context
            .unwrap_or_else(|| ProcessContext::global().clone());
        let resources = self.resources.unwrap_or_default();

        let (sources, report) =
            loader::load_sources(&self.filename, &context, &resources, self.refresh_interval);

        let handles = sources
            .iter()
            .filter_map(|source| refresh::register(Arc::clone(source)))
            .collect();

        debug!(
            filename = %self.filename,
            active_layers = sources.len(),
            "layered config ready"
        );

        LayeredConfig {
            filename: self.filename,
            refresh_interval: self.refresh_interval,
            sources,
            report,
            handles: Mutex::new(handles),
        }
    }
}

/// Merged, live view over the layers of one logical properties file.
#[derive(Debug)]
pub struct LayeredConfig {
    filename: String,
    refresh_interval: Duration,
    sources: Vec<Arc<ConfigSource>>,
    report: Vec<LayerReport>,
    handles: Mutex<Vec<RefreshHandle>>,
}

impl LayeredConfig {
    /// Load `filename` for `context` with the default resource path and a
    /// 15 second refresh interval.
    pub fn new(filename: impl Into<String>, context: ProcessContext) -> Self {
        Self::builder(filename).context(context).build()
    }

    pub fn builder(filename: impl Into<String>) -> LayeredConfigBuilder {
        LayeredConfigBuilder {
            filename: filename.into(),
            context: None,
            resources: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Active layers, highest precedence first.
    pub fn layers(&self) -> Vec<Layer> {
        self.sources.iter().map(|source| source.layer()).collect()
    }

    /// What happened to every candidate at construction time.
    pub fn report(&self) -> &[LayerReport] {
        &self.report
    }

    /// Winning layer and values for `key`.
    pub fn lookup(&self, key: &str) -> Option<(Layer, Vec<String>)> {
        self.sources.iter().find_map(|source| {
            source
                .properties()
                .get(key)
                .map(|values| (source.layer(), values.to_vec()))
        })
    }

    /// The layer that supplies `key`, if any.
    pub fn layer_of(&self, key: &str) -> Option<Layer> {
        self.sources
            .iter()
            .find(|source| source.properties().contains_key(key))
            .map(|source| source.layer())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.layer_of(key).is_some()
    }

    /// Every key defined in any layer, in first-seen precedence order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = IndexSet::new();
        for source in &self.sources {
            let properties = source.properties();
            for key in properties.keys() {
                if !keys.contains(key) {
                    keys.insert(key.to_string());
                }
            }
        }
        keys.into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources
            .iter()
            .all(|source| source.properties().is_empty())
    }

    fn scalar(&self, key: &str) -> Option<String> {
        self.lookup(key)
            .map(|(_, values)| values.into_iter().next().unwrap_or_default())
    }

    pub fn get_string(&self, key: &str) -> Result<String, ConfigError> {
        self.scalar(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.scalar(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        let raw = self.get_string(key)?;
        coerce(key, raw, "boolean", value::parse_bool)
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.scalar(key) {
            Some(raw) => coerce(key, raw, "boolean", value::parse_bool),
            None => Ok(default),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<i32, ConfigError> {
        let raw = self.get_string(key)?;
        coerce(key, raw, "32-bit integer", value::parse_i32)
    }

    pub fn get_int_or(&self, key: &str, default: i32) -> Result<i32, ConfigError> {
        match self.scalar(key) {
            Some(raw) => coerce(key, raw, "32-bit integer", value::parse_i32),
            None => Ok(default),
        }
    }

    pub fn get_long(&self, key: &str) -> Result<i64, ConfigError> {
        let raw = self.get_string(key)?;
        coerce(key, raw, "64-bit integer", value::parse_i64)
    }

    pub fn get_long_or(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        match self.scalar(key) {
            Some(raw) => coerce(key, raw, "64-bit integer", value::parse_i64),
            None => Ok(default),
        }
    }

    /// All values of `key` from the winning layer. Layers are not concatenated.
    pub fn get_list(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        self.lookup(key)
            .map(|(_, values)| values)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))
    }

    pub fn get_list_or(&self, key: &str, default: Vec<String>) -> Vec<String> {
        self.lookup(key).map(|(_, values)| values).unwrap_or(default)
    }

    /// Check every source for changes now instead of waiting for the
    /// scheduler. Returns how many sources were reloaded.
    pub fn refresh_now(&self) -> usize {
        self.sources
            .iter()
            .filter(|source| match source.check_for_update() {
                Ok(reloaded) => reloaded,
                Err(e) => {
                    warn!(layer = %source.layer(), "keeping stale config: {e}");
                    false
                }
            })
            .count()
    }

    /// Stop all background refresh tasks. Values stay readable; they just
    /// no longer change. Safe to call more than once.
    pub fn close(&self) {
        let handles: Vec<RefreshHandle> = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        if !handles.is_empty() {
            debug!(filename = %self.filename, tasks = handles.len(), "closing layered config");
        }
        for handle in &handles {
            handle.cancel();
        }
    }

    /// True once [`close`](Self::close) has run (or nothing was registered).
    pub fn is_closed(&self) -> bool {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl Drop for LayeredConfig {
    fn drop(&mut self) {
        self.close();
    }
}

fn coerce<T>(
    key: &str,
    raw: String,
    target: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    parse(&raw).ok_or_else(|| ConfigError::TypeCoercion {
        key: key.to_string(),
        value: raw,
        target,
    })
}
