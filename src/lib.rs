//! strata — layered, live-reloading properties configuration (library crate).
//!
//! Resolves one logical properties file into a merged view over up to four
//! layers: a local override directory, a host-specific resource, an
//! environment-specific resource, and the base resource. Loaded files are
//! re-read in the background when they change.
//!
//! ```no_run
//! use strata::{LayeredConfig, ProcessContext};
//!
//! let config = LayeredConfig::new("project.properties", ProcessContext::global().clone());
//! let port = config.get_int_or("server.port", 8080)?;
//! # Ok::<(), strata::ConfigError>(())
//! ```

pub mod adapter;
pub mod config;
pub mod constants;
pub mod context;
pub mod env;
pub mod properties;
pub mod refresh;
pub mod resource;
pub mod source;

pub use adapter::ConfigMap;
pub use config::{ConfigError, LayeredConfig, LayeredConfigBuilder};
pub use context::ProcessContext;
pub use resource::ResourcePath;
pub use source::{ConfigSource, Layer, SourceError};
