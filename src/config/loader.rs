//! Candidate discovery and loading.
//!
//! Priority (highest to lowest):
//! 1. `<configPath>/<file>` on the filesystem (only if a config path is set)
//! 2. `<hostName>.<file>` on the resource path (only if a host name is set)
//! 3. `<env>.<file>` on the resource path (only if an environment is set)
//! 4. `<file>` on the resource path
//!
//! Missing or unreadable candidates are skipped; loading never fails.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, trace, warn};

use crate::constants::LAYER_SEPARATOR;
use crate::context::ProcessContext;
use crate::resource::ResourcePath;
use crate::source::{ConfigSource, Layer, SourceError, SourceOrigin};

/// One place a layer may be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub layer: Layer,
    /// Filesystem path for [`Layer::Local`], resource name otherwise.
    pub name: String,
}

impl Candidate {
    /// Resolve to an existing file.
    pub fn locate(&self, resources: &ResourcePath) -> Result<SourceOrigin, SourceError> {
        match self.layer {
            Layer::Local => {
                let path = PathBuf::from(&self.name);
                if path.is_file() {
                    Ok(SourceOrigin::File(path))
                } else {
                    Err(SourceError::NotFound(self.name.clone()))
                }
            }
            Layer::Host | Layer::Env | Layer::Base => resources
                .locate(&self.name)
                .map(|path| SourceOrigin::Resource {
                    name: self.name.clone(),
                    path,
                })
                .ok_or_else(|| SourceError::NotFound(self.name.clone())),
        }
    }
}

/// Outcome of one candidate during loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LayerStatus {
    Loaded { origin: String },
    NotFound,
    Failed { reason: String },
}

/// What happened to each candidate, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerReport {
    pub layer: Layer,
    pub name: String,
    #[serde(flatten)]
    pub status: LayerStatus,
}

/// Candidates for `filename` under `context`, highest precedence first.
pub fn candidates(filename: &str, context: &ProcessContext) -> Vec<Candidate> {
    let mut out = Vec::with_capacity(4);

    if let Some(dir) = context.config_path() {
        out.push(Candidate {
            layer: Layer::Local,
            name: Path::new(dir).join(filename).to_string_lossy().into_owned(),
        });
    }
    if let Some(host) = context.host_name() {
        out.push(Candidate {
            layer: Layer::Host,
            name: format!("{host}{LAYER_SEPARATOR}{filename}"),
        });
    }
    if let Some(env) = context.env() {
        out.push(Candidate {
            layer: Layer::Env,
            name: format!("{env}{LAYER_SEPARATOR}{filename}"),
        });
    }
    out.push(Candidate {
        layer: Layer::Base,
        name: filename.to_string(),
    });

    out
}

/// Load every candidate that exists, in order.
///
/// A missing base layer is logged at `error` when no context layer was even
/// attempted: that usually means a broken deployment.
pub(crate) fn load_sources(
    filename: &str,
    context: &ProcessContext,
    resources: &ResourcePath,
    refresh_interval: Duration,
) -> (Vec<Arc<ConfigSource>>, Vec<LayerReport>) {
    let mut sources = Vec::new();
    let mut report = Vec::new();

    for candidate in candidates(filename, context) {
        trace!(layer = %candidate.layer, name = %candidate.name, "attempting to load config source");

        let status = match candidate
            .locate(resources)
            .and_then(|origin| ConfigSource::load(candidate.layer, origin, refresh_interval))
        {
            Ok(source) => {
                info!(layer = %candidate.layer, origin = %source.origin(), "loaded config source");
                let origin = source.origin().to_string();
                sources.push(Arc::new(source));
                LayerStatus::Loaded { origin }
            }
            Err(SourceError::NotFound(name)) => {
                if candidate.layer == Layer::Base && context.is_empty() {
                    error!(
                        layer = %candidate.layer,
                        %name,
                        "config source not found and no override layers are configured"
                    );
                } else {
                    warn!(layer = %candidate.layer, %name, "config source not found");
                }
                LayerStatus::NotFound
            }
            Err(e) => {
                warn!(layer = %candidate.layer, name = %candidate.name, "skipping config source: {e}");
                LayerStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        report.push(LayerReport {
            layer: candidate.layer,
            name: candidate.name,
            status,
        });
    }

    (sources, report)
}
