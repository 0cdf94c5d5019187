//! Discovery of cgroup mounts from procfs.
//!
//! [`MountSource`] is the seam the subsystem catalog reads mounts through;
//! [`ProcMountSource`] implements it on top of `/proc/self/mountinfo` and
//! `/proc/self/cgroup`.
mod detect;
mod error;
mod membership;
mod parser;
mod source;

pub use detect::{detect_cgroup2_mount_point, for_each_mount};
pub use error::{Error, Result};
pub use membership::{CgroupLine, CgroupLineError, parse_cgroup_line, read_v1_controllers};
pub use parser::{MountInfo, MountInfoField, ParseError, parse_mount_info_line};
pub use source::{Mount, MountSource, ProcMountSource};

/// Filesystem type of legacy (v1) cgroup hierarchies.
pub const CGROUP_FS_TYPE: &str = "cgroup";
/// Filesystem type of the unified (v2) cgroup hierarchy.
pub const CGROUP2_FS_TYPE: &str = "cgroup2";
/// Lists the controllers available in a unified hierarchy.
pub const CGROUP_CONTROLLERS_FILE: &str = "cgroup.controllers";
/// Prefix of named v1 hierarchies such as `name=systemd`.
pub const CGROUP_NAME_PREFIX: &str = "name=";
