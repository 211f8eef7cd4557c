//! Process context: the environment name, host name, and local override
//! directory that select which configuration layers apply.
//!
//! Values come from `STRATA_ENV`, `STRATA_HOST_NAME`, and
//! `STRATA_CONFIG_PATH`. When no host name is supplied, the local host
//! name is resolved once (see [`hostname`]).

pub mod hostname;

use std::sync::OnceLock;

use tracing::{debug, info};

use crate::constants::{ENV_CONFIG_PATH, ENV_ENV, ENV_HOST_NAME};
use crate::env::Env;

/// Read-only description of where this process runs.
///
/// Construct one explicitly and hand it to
/// [`LayeredConfig`](crate::config::LayeredConfig), or use
/// [`ProcessContext::global`] for the lazily-resolved process-wide value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessContext {
    env: Option<String>,
    host_name: Option<String>,
    config_path: Option<String>,
}

impl ProcessContext {
    /// A context with nothing set: only the base layer applies.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start from an empty context; combine with the `with_*` methods.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = normalize(Some(env.into()));
        self
    }

    pub fn with_host_name(mut self, host_name: impl Into<String>) -> Self {
        self.host_name = normalize(Some(host_name.into()));
        self
    }

    pub fn with_config_path(mut self, config_path: impl Into<String>) -> Self {
        self.config_path = normalize(Some(config_path.into()));
        self
    }

    /// Resolve the context from environment variables.
    ///
    /// Falls back to the local host name when `STRATA_HOST_NAME` is unset.
    /// Resolution failures leave the field empty; this never fails.
    pub fn from_env(env: &Env) -> Self {
        let config_path = read_param(env, ENV_CONFIG_PATH);
        let environment = read_param(env, ENV_ENV);
        let host_name = read_param(env, ENV_HOST_NAME).or_else(|| {
            let inferred = hostname::local_host_name(env);
            if let Some(ref name) = inferred {
                info!(host_name = %name, "using inferred host name");
            }
            inferred
        });

        Self {
            env: environment,
            host_name,
            config_path,
        }
    }

    /// The process-wide context, resolved from the real environment on
    /// first access and cached for the life of the process.
    pub fn global() -> &'static ProcessContext {
        static GLOBAL: OnceLock<ProcessContext> = OnceLock::new();
        GLOBAL.get_or_init(|| Self::from_env(&Env::real()))
    }

    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    pub fn host_name(&self) -> Option<&str> {
        self.host_name.as_deref()
    }

    pub fn config_path(&self) -> Option<&str> {
        self.config_path.as_deref()
    }

    pub fn has_env(&self) -> bool {
        self.env.is_some()
    }

    pub fn has_host_name(&self) -> bool {
        self.host_name.is_some()
    }

    pub fn has_config_path(&self) -> bool {
        self.config_path.is_some()
    }

    /// True when none of the three override selectors is set.
    pub fn is_empty(&self) -> bool {
        !self.has_env() && !self.has_host_name() && !self.has_config_path()
    }
}

fn read_param(env: &Env, name: &str) -> Option<String> {
    match env.non_empty(name) {
        Some(value) => {
            info!(param = name, %value, "using process parameter");
            Some(value)
        }
        None => {
            debug!(param = name, "process parameter is unspecified");
            None
        }
    }
}

// Empty strings count as absent everywhere.
fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
