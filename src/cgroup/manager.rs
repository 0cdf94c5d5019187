use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::mode::{CgroupMode, cgroup_mode};
use super::{fs, fs2};

/// Subsystem whose path stands in for the whole unified hierarchy.
pub const UNIFIED_PATH_KEY: &str = "cpu";

/// Errors raised while constructing a cgroup manager.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("unified cgroup manager requires a path, but none was given")]
    EmptyPath,
    #[error("unified cgroup path `{path}` is not absolute")]
    RelativePath { path: PathBuf },
}

/// Configuration of a named cgroup, as consumed by the legacy manager.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CgroupConfig {
    pub name: String,
}

impl CgroupConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A handle to a cgroup on either hierarchy layout.
///
/// Handles are created per request and owned by the caller; nothing is read or written on
/// the cgroup filesystem when one is constructed.
pub trait Manager: fmt::Debug + Send + Sync {
    /// The hierarchy layout this manager operates on.
    fn mode(&self) -> CgroupMode;

    /// The cgroup name the manager was bound to, if it is bound by name.
    fn name(&self) -> Option<&str>;

    /// Returns the directory backing `subsystem`.
    fn path(&self, subsystem: &str) -> Option<&Path>;

    /// Returns all subsystem directories. A unified manager reports its single path under
    /// the empty key.
    fn paths(&self) -> HashMap<String, PathBuf>;
}

/// Builds the concrete managers for each hierarchy layout.
pub trait ManagerFactory {
    /// Builds a manager for a named cgroup with one path per subsystem.
    fn legacy(
        &self,
        config: CgroupConfig,
        paths: HashMap<String, PathBuf>,
    ) -> Result<Box<dyn Manager>, ManagerError>;

    /// Builds a manager for a single unified cgroup directory.
    fn unified(&self, path: PathBuf) -> Result<Box<dyn Manager>, ManagerError>;
}

/// [`ManagerFactory`] producing the filesystem backed [`fs::Manager`] and [`fs2::Manager`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FsManagerFactory;

impl ManagerFactory for FsManagerFactory {
    fn legacy(
        &self,
        config: CgroupConfig,
        paths: HashMap<String, PathBuf>,
    ) -> Result<Box<dyn Manager>, ManagerError> {
        Ok(Box::new(fs::Manager::new(config, paths)))
    }

    fn unified(&self, path: PathBuf) -> Result<Box<dyn Manager>, ManagerError> {
        Ok(Box::new(fs2::Manager::new(path)?))
    }
}

/// Creates a manager for the cgroup `name` on this host.
///
/// On a unified host the manager is bound to `paths["cpu"]` and `name` is not used. On a
/// legacy host it is bound to `name` and every entry of `paths`.
///
/// # Errors
///
/// Returns [`ManagerError`] if the unified path is missing or relative.
///
/// # Example
///
/// ```no_run
/// use std::collections::HashMap;
/// use std::path::PathBuf;
/// use cgroup_catalog::cgroup::new_cgroup_manager;
///
/// let paths = HashMap::from([(
///     String::from("cpu"),
///     PathBuf::from("/sys/fs/cgroup/system.slice/containerd.service"),
/// )]);
/// let manager = new_cgroup_manager("/system.slice/containerd.service", &paths).unwrap();
/// println!("{:?}", manager.path("cpu"));
/// ```
pub fn new_cgroup_manager(
    name: &str,
    paths: &HashMap<String, PathBuf>,
) -> Result<Box<dyn Manager>, ManagerError> {
    select_manager(cgroup_mode(), &FsManagerFactory, name, paths)
}

/// Creates a manager for an explicitly given cgroup `mode` through `factory`.
///
/// The choice depends on `mode` alone, never on the contents of `paths`.
pub fn select_manager<F>(
    mode: CgroupMode,
    factory: &F,
    name: &str,
    paths: &HashMap<String, PathBuf>,
) -> Result<Box<dyn Manager>, ManagerError>
where
    F: ManagerFactory + ?Sized,
{
    match mode {
        CgroupMode::Unified => {
            let path = paths.get(UNIFIED_PATH_KEY).cloned().unwrap_or_default();
            log::debug!(
                "Creating unified cgroup manager for `{}` at `{}`",
                name,
                path.display()
            );
            factory.unified(path)
        }
        CgroupMode::Legacy => {
            log::debug!(
                "Creating legacy cgroup manager for `{}` over {} subsystems",
                name,
                paths.len()
            );
            factory.legacy(CgroupConfig::new(name), paths.clone())
        }
    }
}
