//! Resource search path: the read-only directories that hold the packaged
//! host, environment, and base layers.

use std::path::{Path, PathBuf};

use tracing::trace;

use crate::constants::{DEFAULT_RESOURCE_DIR, ENV_RESOURCE_PATH};
use crate::env::Env;

/// Ordered list of resource roots. Earlier roots shadow later ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    roots: Vec<PathBuf>,
}

impl ResourcePath {
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Roots from `STRATA_RESOURCE_PATH` (platform path-list syntax), or
    /// `./resources` when it is unset.
    pub fn from_env(env: &Env) -> Self {
        match env.non_empty(ENV_RESOURCE_PATH) {
            Some(list) => Self::new(std::env::split_paths(&list)),
            None => Self::new([DEFAULT_RESOURCE_DIR]),
        }
    }

    /// Find the first root containing `name` as a regular file.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        self.roots.iter().find_map(|root| {
            let candidate = root.join(name);
            trace!(path = %candidate.display(), "probing resource");
            candidate.is_file().then_some(candidate)
        })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Add a root with the lowest priority.
    pub fn push(&mut self, root: impl AsRef<Path>) {
        self.roots.push(root.as_ref().to_path_buf());
    }
}

impl Default for ResourcePath {
    fn default() -> Self {
        Self::from_env(&Env::real())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_finds_file_in_first_matching_root() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(second.path().join("app.properties"), "a=1").unwrap();

        let path = ResourcePath::new([first.path(), second.path()]);
        assert_eq!(
            path.locate("app.properties"),
            Some(second.path().join("app.properties"))
        );
    }

    #[test]
    fn earlier_roots_shadow_later_ones() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("app.properties"), "a=1").unwrap();
        std::fs::write(second.path().join("app.properties"), "a=2").unwrap();

        let path = ResourcePath::new([first.path(), second.path()]);
        assert_eq!(
            path.locate("app.properties"),
            Some(first.path().join("app.properties"))
        );
    }

    #[test]
    fn directories_are_not_resources() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("app.properties")).unwrap();
        let path = ResourcePath::new([root.path()]);
        assert_eq!(path.locate("app.properties"), None);
    }

    #[test]
    fn from_env_uses_default_dir_when_unset() {
        let env = Env::mock(Vec::<(&str, &str)>::new());
        assert_eq!(
            ResourcePath::from_env(&env).roots(),
            [PathBuf::from("resources")]
        );
    }

    #[test]
    fn from_env_splits_path_list() {
        let joined = std::env::join_paths(["/opt/a", "/opt/b"]).unwrap();
        let env = Env::mock([("STRATA_RESOURCE_PATH", joined.to_string_lossy().to_string())]);
        assert_eq!(
            ResourcePath::from_env(&env).roots(),
            [PathBuf::from("/opt/a"), PathBuf::from("/opt/b")]
        );
    }

    #[test]
    fn push_appends_lowest_priority_root() {
        let mut path = ResourcePath::new(["/first"]);
        path.push("/second");
        assert_eq!(path.roots(), [PathBuf::from("/first"), PathBuf::from("/second")]);
    }
}
