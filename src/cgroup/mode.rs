use std::fmt;
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::OnceLock;

use crate::fsutil;
use crate::mountinfo::{self, CGROUP_CONTROLLERS_FILE, CGROUP2_FS_TYPE};

/// Where the cgroup filesystem is mounted on a standard Linux host.
pub const CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// The cgroup layout a host runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CgroupMode {
    /// One hierarchy per (group of) v1 controllers. Hybrid hosts, which mount cgroup2
    /// below the v1 hierarchies, count as legacy.
    Legacy,
    /// A single cgroup v2 hierarchy mounted at [`CGROUP_ROOT`].
    Unified,
}

impl fmt::Display for CgroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CgroupMode::Legacy => f.write_str("legacy"),
            CgroupMode::Unified => f.write_str("unified"),
        }
    }
}

static HOST_MODE: OnceLock<CgroupMode> = OnceLock::new();

/// Returns the cgroup mode of the host this process runs on.
///
/// Detected on first use and cached for the lifetime of the process.
pub fn cgroup_mode() -> CgroupMode {
    *HOST_MODE.get_or_init(|| detect_cgroup_mode("/"))
}

/// Returns `true` if the host runs the unified (v2) hierarchy.
pub fn is_unified_mode() -> bool {
    cgroup_mode() == CgroupMode::Unified
}

/// Detects the cgroup mode of the system rooted at `rootfs` without caching.
///
/// The system is unified if `proc/self/mountinfo` lists a `cgroup2` mount at
/// [`CGROUP_ROOT`]. If the mount table can't be read, the presence of
/// `cgroup.controllers` below [`CGROUP_ROOT`] decides instead.
pub fn detect_cgroup_mode(rootfs: impl AsRef<Path>) -> CgroupMode {
    let rootfs = rootfs.as_ref();
    detect_cgroup_mode_from(rootfs, rootfs.join("proc/self/mountinfo"))
}

/// Like [`detect_cgroup_mode`], but scans the given `mountinfo` file, e.g.
/// `<rootfs>/proc/1/mountinfo` to judge by the host's init process.
pub fn detect_cgroup_mode_from(
    rootfs: impl AsRef<Path>,
    mountinfo_path: impl AsRef<Path>,
) -> CgroupMode {
    let rootfs = rootfs.as_ref();

    let mut unified = false;
    let scan = mountinfo::for_each_mount(mountinfo_path, |mount_info| {
        if mount_info.fs_type == CGROUP2_FS_TYPE && mount_info.mount_point == CGROUP_ROOT {
            unified = true;
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    let mode = match scan {
        Ok(()) if unified => CgroupMode::Unified,
        Ok(()) => CgroupMode::Legacy,
        Err(err) => {
            let controllers =
                fsutil::under_rootfs(rootfs, CGROUP_ROOT).join(CGROUP_CONTROLLERS_FILE);
            log::warn!(
                "Failed to scan mounts for the cgroup mode, probing `{}` instead: {}",
                controllers.display(),
                err
            );
            if controllers.exists() {
                CgroupMode::Unified
            } else {
                CgroupMode::Legacy
            }
        }
    };

    log::debug!("Detected {mode} cgroup mode below `{}`", rootfs.display());
    mode
}
