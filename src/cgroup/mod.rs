//! Cgroup hierarchy handling.
//!
//! - [`CgroupMode`] tells whether the host runs the unified (v2) or the legacy (v1)
//!   hierarchy, detected once per process by [`cgroup_mode`].
//! - [`new_cgroup_manager`] picks the matching [`Manager`] implementation for a named
//!   cgroup: [`fs2::Manager`] on unified hosts, [`fs::Manager`] otherwise.
//! - [`stats`] aggregates raw block I/O samples into per-device records.
pub mod fs;
pub mod fs2;
mod manager;
mod mode;
pub mod stats;

pub use manager::{
    CgroupConfig, FsManagerFactory, Manager, ManagerError, ManagerFactory, UNIFIED_PATH_KEY,
    new_cgroup_manager, select_manager,
};
pub use mode::{
    CGROUP_ROOT, CgroupMode, cgroup_mode, detect_cgroup_mode, detect_cgroup_mode_from,
    is_unified_mode,
};
