//! App-wide constants.
//!
//! Centralises the tool name, environment variable names, and layering
//! defaults so a rename only requires changing this file.

use std::time::Duration;

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "strata";

/// Crate version, as published.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Target triple the binary was compiled for (set by `build.rs`).
pub const TARGET: &str = env!("TARGET");

/// Seconds between freshness checks of a loaded source unless overridden.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 15;

/// [`DEFAULT_REFRESH_INTERVAL_SECS`] as a [`Duration`].
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS);

/// Joins a host or environment prefix to the logical filename (`dev.app.properties`).
pub const LAYER_SEPARATOR: &str = ".";

/// Resource root used when `STRATA_RESOURCE_PATH` is unset.
pub const DEFAULT_RESOURCE_DIR: &str = "resources";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_ENV: &str = "STRATA_ENV";
pub const ENV_HOST_NAME: &str = "STRATA_HOST_NAME";
pub const ENV_CONFIG_PATH: &str = "STRATA_CONFIG_PATH";
pub const ENV_RESOURCE_PATH: &str = "STRATA_RESOURCE_PATH";
