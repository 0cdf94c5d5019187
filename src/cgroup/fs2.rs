//! Unified (cgroup v2) manager: a single directory for every controller.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::manager::ManagerError;
use super::mode::CgroupMode;

#[derive(Debug, Clone)]
pub struct Manager {
    path: PathBuf,
}

impl Manager {
    /// Binds a manager to the unified cgroup directory `path`.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::EmptyPath`] if `path` is empty.
    /// - [`ManagerError::RelativePath`] if `path` is not absolute.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, ManagerError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(ManagerError::EmptyPath);
        }
        if !path.is_absolute() {
            return Err(ManagerError::RelativePath { path });
        }
        Ok(Self { path })
    }

    pub fn unified_path(&self) -> &Path {
        &self.path
    }
}

impl super::Manager for Manager {
    fn mode(&self) -> CgroupMode {
        CgroupMode::Unified
    }

    fn name(&self) -> Option<&str> {
        None
    }

    fn path(&self, _subsystem: &str) -> Option<&Path> {
        Some(&self.path)
    }

    fn paths(&self) -> HashMap<String, PathBuf> {
        HashMap::from([(String::new(), self.path.clone())])
    }
}
