//! Legacy (cgroup v1) manager: one directory per subsystem.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::manager::CgroupConfig;
use super::mode::CgroupMode;

#[derive(Debug, Clone)]
pub struct Manager {
    config: CgroupConfig,
    paths: HashMap<String, PathBuf>,
}

impl Manager {
    pub fn new(config: CgroupConfig, paths: HashMap<String, PathBuf>) -> Self {
        Self { config, paths }
    }

    pub fn config(&self) -> &CgroupConfig {
        &self.config
    }
}

impl super::Manager for Manager {
    fn mode(&self) -> CgroupMode {
        CgroupMode::Legacy
    }

    fn name(&self) -> Option<&str> {
        Some(&self.config.name)
    }

    fn path(&self, subsystem: &str) -> Option<&Path> {
        self.paths.get(subsystem).map(PathBuf::as_path)
    }

    fn paths(&self) -> HashMap<String, PathBuf> {
        self.paths.clone()
    }
}
