use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::metrics::{MetricKind, MetricSet};
use crate::mountinfo::{Mount, MountSource};

use super::{Error, Result, Subsystem};

/// The cgroup mounts selected for collection and where each subsystem lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CgroupSubsystems {
    /// Cgroup subsystem mounts, in the order the mount source reported them.
    /// e.g.: `/sys/fs/cgroup/cpu,cpuacct` -> `["cpu", "cpuacct"]`
    pub mounts: Vec<Mount>,

    /// Cgroup subsystem to its mount location.
    /// e.g.: `cpu` -> `/sys/fs/cgroup/cpu,cpuacct`
    pub mount_points: HashMap<Subsystem, PathBuf>,
}

impl CgroupSubsystems {
    /// Returns the mount location of `subsystem`, if it was selected.
    pub fn mount_point(&self, subsystem: Subsystem) -> Option<&Path> {
        self.mount_points.get(&subsystem).map(PathBuf::as_path)
    }

    /// Returns the mount locations keyed by kernel subsystem name, the shape cgroup managers
    /// are built from.
    pub fn paths(&self) -> HashMap<String, PathBuf> {
        self.mount_points
            .iter()
            .map(|(subsystem, path)| (subsystem.as_str().to_owned(), path.clone()))
            .collect()
    }

    /// Returns the paths of `cgroup_path` within every selected subsystem hierarchy.
    ///
    /// `cgroup_path` is relative to the hierarchy roots, e.g. `/kubepods/pod1/abc`.
    pub fn cgroup_paths(&self, cgroup_path: impl AsRef<Path>) -> HashMap<String, PathBuf> {
        let cgroup_path = cgroup_path.as_ref();
        let relative = cgroup_path.strip_prefix("/").unwrap_or(cgroup_path);
        self.mount_points
            .iter()
            .map(|(subsystem, path)| (subsystem.as_str().to_owned(), path.join(relative)))
            .collect()
    }
}

/// Returns the cgroup subsystems needed to collect `included_metrics`.
///
/// Subsystems serving a metric category that is not in `included_metrics` are left out.
///
/// # Errors
///
/// - [`Error::Mounts`] if the mount source fails.
/// - [`Error::NoMounts`] if the mount source reports no cgroup mounts at all.
pub fn get_cgroup_subsystems(
    source: &impl MountSource,
    included_metrics: &MetricSet,
) -> Result<CgroupSubsystems> {
    let all_mounts = source.cgroup_mounts(true)?;
    resolve_subsystems(&all_mounts, &disabled_subsystems(included_metrics))
}

/// Returns every supported cgroup subsystem regardless of which metrics are collected.
///
/// # Errors
///
/// Same as [`get_cgroup_subsystems`].
pub fn get_all_cgroup_subsystems(source: &impl MountSource) -> Result<CgroupSubsystems> {
    let all_mounts = source.cgroup_mounts(true)?;
    resolve_subsystems(&all_mounts, &HashSet::new())
}

/// Collects the subsystems of every metric category missing from `included_metrics`.
pub fn disabled_subsystems(included_metrics: &MetricSet) -> HashSet<Subsystem> {
    MetricKind::ALL
        .into_iter()
        .filter(|kind| !included_metrics.has(*kind))
        .flat_map(|kind| kind.subsystems().iter().copied())
        .collect()
}

/// Reduces `all_mounts` to the supported, enabled subsystems.
///
/// Mounts are processed in the given order. When a subsystem is mounted more than once, the
/// first mount wins and later ones are skipped. A mount that serves several subsystems
/// (`cpu,cpuacct`) is kept only once.
///
/// # Errors
///
/// Returns [`Error::NoMounts`] if `all_mounts` is empty.
pub fn resolve_subsystems(
    all_mounts: &[Mount],
    disabled: &HashSet<Subsystem>,
) -> Result<CgroupSubsystems> {
    if all_mounts.is_empty() {
        return Err(Error::NoMounts);
    }

    let mut mounts = Vec::with_capacity(all_mounts.len());
    let mut recorded_mount_points: HashSet<&Path> = HashSet::with_capacity(all_mounts.len());
    let mut mount_points: HashMap<Subsystem, PathBuf> = HashMap::with_capacity(all_mounts.len());

    for mount in all_mounts {
        for name in &mount.subsystems {
            let Ok(subsystem) = name.parse::<Subsystem>() else {
                log::trace!(
                    "skipping unsupported subsystem `{}` at {}",
                    name,
                    mount.mount_point.display()
                );
                continue;
            };
            if disabled.contains(&subsystem) {
                continue;
            }
            if let Some(existing) = mount_points.get(&subsystem) {
                log::debug!(
                    "skipping {} for {}, already using mount at {}",
                    mount.mount_point.display(),
                    subsystem,
                    existing.display()
                );
                continue;
            }
            if recorded_mount_points.insert(mount.mount_point.as_path()) {
                mounts.push(mount.clone());
            }
            mount_points.insert(subsystem, mount.mount_point.clone());
        }
    }

    Ok(CgroupSubsystems {
        mounts,
        mount_points,
    })
}
