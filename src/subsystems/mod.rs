//! Catalog of the cgroup subsystems available for collection.
//!
//! [`get_cgroup_subsystems`] reads the host's cgroup mounts through a
//! [`MountSource`](crate::mountinfo::MountSource), drops every subsystem that is unsupported
//! or not needed for the requested metrics, and resolves each remaining subsystem to exactly
//! one mount.
mod catalog;
mod error;
mod subsystem;

pub use catalog::{
    CgroupSubsystems, disabled_subsystems, get_all_cgroup_subsystems, get_cgroup_subsystems,
    resolve_subsystems,
};
pub use error::{Error, Result};
pub use subsystem::{Subsystem, UnsupportedSubsystem};
