use std::collections::HashSet;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use crate::cgroup::CgroupMode;
use crate::fsutil;

use super::detect::{detect_cgroup2_mount_point, for_each_mount};
use super::membership::read_v1_controllers;
use super::parser::MountInfo;
use super::{CGROUP_FS_TYPE, CGROUP_NAME_PREFIX, Result};

/// A cgroup filesystem mount and the subsystems it serves.
///
/// e.g.: `/sys/fs/cgroup/cpu,cpuacct` -> `["cpu", "cpuacct"]`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Mount {
    /// Where the hierarchy is mounted.
    pub mount_point: PathBuf,
    /// Root of the mount within the cgroup hierarchy.
    pub root: String,
    /// Subsystem names in the order the mount lists them.
    pub subsystems: Vec<String>,
}

impl Mount {
    /// Creates a mount rooted at `/` of its hierarchy.
    pub fn new<S: Into<String>>(
        mount_point: impl Into<PathBuf>,
        subsystems: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            mount_point: mount_point.into(),
            root: String::from("/"),
            subsystems: subsystems.into_iter().map(Into::into).collect(),
        }
    }
}

/// Supplies the raw list of cgroup mounts on a host.
pub trait MountSource {
    /// Returns the cgroup mounts.
    ///
    /// With `include_all` set, every cgroup mount is reported, even if the same subsystem
    /// shows up more than once or a mount exposes nothing of interest.
    fn cgroup_mounts(&self, include_all: bool) -> Result<Vec<Mount>>;
}

impl<T: MountSource + ?Sized> MountSource for &T {
    fn cgroup_mounts(&self, include_all: bool) -> Result<Vec<Mount>> {
        (**self).cgroup_mounts(include_all)
    }
}

/// [`MountSource`] reading `/proc/self/mountinfo` and `/proc/self/cgroup` below a root
/// filesystem.
///
/// Reported mount points are re-rooted below `rootfs`, so that a monitor running in a
/// container with the host mounted at e.g. `/rootfs` gets paths it can open.
#[derive(Debug, Clone)]
pub struct ProcMountSource {
    rootfs: PathBuf,
    mountinfo_path: PathBuf,
    cgroup_path: PathBuf,
    mode: CgroupMode,
}

impl ProcMountSource {
    /// Creates a source for the given root filesystem and cgroup mode.
    pub fn new(rootfs: impl Into<PathBuf>, mode: CgroupMode) -> Self {
        let rootfs = rootfs.into();
        Self {
            mountinfo_path: rootfs.join("proc/self/mountinfo"),
            cgroup_path: rootfs.join("proc/self/cgroup"),
            rootfs,
            mode,
        }
    }

    /// Creates a source for the host this process runs on.
    pub fn host() -> Self {
        Self::new("/", crate::cgroup::cgroup_mode())
    }

    /// Overrides the `mountinfo` file to read, e.g. `proc/1/mountinfo` to see the
    /// mounts of the host's init process.
    pub fn with_mountinfo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.mountinfo_path = path.into();
        self
    }

    /// Overrides the cgroup membership file to read.
    pub fn with_cgroup_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cgroup_path = path.into();
        self
    }

    pub fn rootfs(&self) -> &Path {
        &self.rootfs
    }

    pub fn mode(&self) -> CgroupMode {
        self.mode
    }

    fn unified_mounts(&self) -> Result<Vec<Mount>> {
        let mount_point = detect_cgroup2_mount_point(&self.mountinfo_path)?;
        let mount_point = fsutil::under_rootfs(&self.rootfs, mount_point);
        let controllers =
            fsutil::read_file_to_string(mount_point.join(super::CGROUP_CONTROLLERS_FILE))?;
        let mount = Mount::new(mount_point, controllers.split_whitespace());
        log::debug!(
            "Unified cgroup mount `{}` offers {:?}",
            mount.mount_point.display(),
            mount.subsystems
        );
        Ok(vec![mount])
    }

    fn legacy_mounts(&self, include_all: bool) -> Result<Vec<Mount>> {
        let reader = fsutil::open_file_reader(&self.cgroup_path)?;
        let mut pending = read_v1_controllers(reader, &self.cgroup_path)?;
        let mut mounts = Vec::new();

        for_each_mount(&self.mountinfo_path, |mount_info| {
            if mount_info.fs_type != CGROUP_FS_TYPE {
                return ControlFlow::Continue(());
            }

            let subsystems = claim_subsystems(mount_info, &mut pending, include_all);
            if !subsystems.is_empty() || include_all {
                mounts.push(Mount {
                    mount_point: fsutil::under_rootfs(&self.rootfs, &*mount_info.mount_point),
                    root: mount_info.root.to_string(),
                    subsystems,
                });
            }

            if !include_all && pending.is_empty() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;

        Ok(mounts)
    }
}

/// Picks the controllers out of a v1 mount's superblock options.
///
/// Unless `include_all` is set, a claimed controller is removed from `pending` so a later
/// mount of the same controller reports nothing for it.
fn claim_subsystems(
    mount_info: &MountInfo<'_>,
    pending: &mut HashSet<String>,
    include_all: bool,
) -> Vec<String> {
    let mut subsystems = Vec::new();
    for opt in mount_info.super_options() {
        let opt = if pending.contains(opt) {
            opt
        } else {
            match opt.strip_prefix(CGROUP_NAME_PREFIX) {
                Some(name) if pending.contains(name) => name,
                _ => continue,
            }
        };
        if !include_all {
            pending.remove(opt);
        }
        subsystems.push(opt.to_owned());
    }
    subsystems
}

impl MountSource for ProcMountSource {
    fn cgroup_mounts(&self, include_all: bool) -> Result<Vec<Mount>> {
        match self.mode {
            CgroupMode::Unified => self.unified_mounts(),
            CgroupMode::Legacy => self.legacy_mounts(include_all),
        }
    }
}
