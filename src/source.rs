//! A single loaded configuration layer and its freshness check.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use arc_swap::ArcSwap;
use serde::Serialize;
use strum::{Display, EnumIter};
use thiserror::Error;
use tracing::{debug, info};

use crate::properties::{Properties, PropertiesError};

/// Errors while loading or reloading a source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("config source {0} not found")]
    NotFound(String),

    #[error("failed to read config source {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config source {path}: {source}")]
    Parse {
        path: PathBuf,
        source: PropertiesError,
    },
}

/// Precedence rank of a source. Declaration order is lookup order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// `<configPath>/<file>` on the filesystem.
    Local,
    /// `<hostName>.<file>` on the resource path.
    Host,
    /// `<env>.<file>` on the resource path.
    Env,
    /// `<file>` on the resource path.
    Base,
}

/// Where a source was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    /// A file addressed directly by path.
    File(PathBuf),
    /// A named resource, resolved to `path` through the resource search path.
    Resource { name: String, path: PathBuf },
}

impl SourceOrigin {
    /// The file backing this origin.
    pub fn path(&self) -> &Path {
        match self {
            SourceOrigin::File(path) => path,
            SourceOrigin::Resource { path, .. } => path,
        }
    }
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOrigin::File(path) => write!(f, "{}", path.display()),
            SourceOrigin::Resource { name, path } => {
                write!(f, "resource {name} ({})", path.display())
            }
        }
    }
}

#[derive(Debug)]
struct Freshness {
    loaded_at: SystemTime,
    last_checked_at: SystemTime,
    last_modified: Option<SystemTime>,
}

/// One loaded properties file.
///
/// The backing store is replaced wholesale on reload, so readers see either
/// the old or the new contents, never a mix.
#[derive(Debug)]
pub struct ConfigSource {
    layer: Layer,
    origin: SourceOrigin,
    refresh_interval: Duration,
    store: ArcSwap<Properties>,
    freshness: Mutex<Freshness>,
}

impl ConfigSource {
    /// Read and parse the file behind `origin`.
    pub fn load(
        layer: Layer,
        origin: SourceOrigin,
        refresh_interval: Duration,
    ) -> Result<Self, SourceError> {
        let path = origin.path();
        let last_modified = modified_time(path).ok();
        let properties = read_properties(path)?;
        let now = SystemTime::now();

        debug!(%layer, path = %path.display(), keys = properties.len(), "parsed config source");

        Ok(Self {
            layer,
            origin,
            refresh_interval,
            store: ArcSwap::from_pointee(properties),
            freshness: Mutex::new(Freshness {
                loaded_at: now,
                last_checked_at: now,
                last_modified,
            }),
        })
    }

    /// Reload the backing store if the file's modification time advanced
    /// since the last successful load.
    ///
    /// Returns `Ok(true)` when the store was replaced. On error the previous
    /// store stays in place.
    pub fn check_for_update(&self) -> Result<bool, SourceError> {
        let mut freshness = self.lock_freshness();
        freshness.last_checked_at = SystemTime::now();

        let path = self.origin.path();
        let modified = modified_time(path).map_err(|e| SourceError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        if freshness.last_modified.is_some_and(|previous| modified <= previous) {
            return Ok(false);
        }

        let properties = read_properties(path)?;
        let keys = properties.len();
        self.store.store(Arc::new(properties));
        freshness.last_modified = Some(modified);
        freshness.loaded_at = SystemTime::now();

        info!(layer = %self.layer, path = %path.display(), keys, "reloaded config source");
        Ok(true)
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn origin(&self) -> &SourceOrigin {
        &self.origin
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Current contents of the backing store.
    pub fn properties(&self) -> Arc<Properties> {
        self.store.load_full()
    }

    /// When the store was last (re)loaded.
    pub fn loaded_at(&self) -> SystemTime {
        self.lock_freshness().loaded_at
    }

    /// When the file was last checked for changes.
    pub fn last_checked_at(&self) -> SystemTime {
        self.lock_freshness().last_checked_at
    }

    fn lock_freshness(&self) -> MutexGuard<'_, Freshness> {
        self.freshness.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn modified_time(path: &Path) -> std::io::Result<SystemTime> {
    std::fs::metadata(path)?.modified()
}

fn read_properties(path: &Path) -> Result<Properties, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|e| SourceError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Properties::parse(&content).map_err(|e| SourceError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use strum::IntoEnumIterator;

    fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn bump_mtime(path: &Path, secs_ahead: i64) {
        let now = FileTime::now();
        let future = FileTime::from_unix_time(now.unix_seconds() + secs_ahead, 0);
        filetime::set_file_mtime(path, future).unwrap();
    }

    #[test]
    fn layers_iterate_in_precedence_order() {
        let layers: Vec<Layer> = Layer::iter().collect();
        assert_eq!(layers, vec![Layer::Local, Layer::Host, Layer::Env, Layer::Base]);
        assert_eq!(Layer::Host.to_string(), "host");
    }

    #[test]
    fn load_reads_properties() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), "app.properties", "a=1\nb=x, y");

        let source = ConfigSource::load(
            Layer::Local,
            SourceOrigin::File(path.clone()),
            Duration::from_secs(15),
        )
        .unwrap();

        assert_eq!(source.layer(), Layer::Local);
        assert_eq!(source.origin().path(), path);
        assert_eq!(source.properties().first("a"), Some("1"));
        assert_eq!(source.properties().get("b").unwrap(), ["x", "y"]);
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigSource::load(
            Layer::Base,
            SourceOrigin::File(dir.path().join("absent.properties")),
            Duration::from_secs(15),
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));
    }

    #[test]
    fn load_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), "bad.properties", "k=\\uZZZZ");
        let err = ConfigSource::load(Layer::Base, SourceOrigin::File(path), Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn check_without_change_keeps_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), "app.properties", "a=1");
        let source =
            ConfigSource::load(Layer::Base, SourceOrigin::File(path), Duration::ZERO).unwrap();

        let before = source.last_checked_at();
        assert!(!source.check_for_update().unwrap());
        assert!(source.last_checked_at() >= before);
        assert_eq!(source.properties().first("a"), Some("1"));
    }

    #[test]
    fn check_reloads_when_mtime_advances() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), "app.properties", "a=1");
        let source = ConfigSource::load(
            Layer::Base,
            SourceOrigin::File(path.clone()),
            Duration::ZERO,
        )
        .unwrap();
        let loaded_at = source.loaded_at();

        std::fs::write(&path, "a=2\nnew=yes").unwrap();
        bump_mtime(&path, 5);

        assert!(source.check_for_update().unwrap());
        assert_eq!(source.properties().first("a"), Some("2"));
        assert_eq!(source.properties().first("new"), Some("yes"));
        assert!(source.loaded_at() >= loaded_at);
    }

    #[test]
    fn failed_reload_keeps_stale_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), "app.properties", "a=1");
        let source = ConfigSource::load(
            Layer::Base,
            SourceOrigin::File(path.clone()),
            Duration::ZERO,
        )
        .unwrap();

        std::fs::write(&path, "a=\\u12").unwrap();
        bump_mtime(&path, 5);
        assert!(matches!(source.check_for_update(), Err(SourceError::Parse { .. })));
        assert_eq!(source.properties().first("a"), Some("1"));

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(source.check_for_update(), Err(SourceError::Read { .. })));
        assert_eq!(source.properties().first("a"), Some("1"));
    }

    #[test]
    fn held_snapshot_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), "app.properties", "a=1");
        let source = ConfigSource::load(
            Layer::Base,
            SourceOrigin::File(path.clone()),
            Duration::ZERO,
        )
        .unwrap();

        let snapshot = source.properties();
        std::fs::write(&path, "a=2").unwrap();
        bump_mtime(&path, 5);
        source.check_for_update().unwrap();

        assert_eq!(snapshot.first("a"), Some("1"));
        assert_eq!(source.properties().first("a"), Some("2"));
    }

    #[test]
    fn resource_origin_display_names_resource() {
        let origin = SourceOrigin::Resource {
            name: "dev.app.properties".to_string(),
            path: PathBuf::from("/res/dev.app.properties"),
        };
        assert_eq!(
            origin.to_string(),
            "resource dev.app.properties (/res/dev.app.properties)"
        );
        assert_eq!(origin.path(), Path::new("/res/dev.app.properties"));
    }
}
