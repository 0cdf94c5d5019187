//! Cgroup Catalog: resolves which cgroup subsystem hierarchies a container monitor reads from.
//!
//! This library discovers the host's cgroup mounts, reduces them to one mount per supported
//! subsystem, picks the cgroup manager matching the host's hierarchy layout, and folds raw
//! block I/O counters into per-device records.

use std::collections::HashSet;
use std::path::Path;

use crate::mountinfo::MountSource;

pub mod cgroup;
pub mod config;
pub mod fsutil;
pub mod metrics;
pub mod mountinfo;
pub mod subsystems;

/// What [`run`] reports about the host.
#[derive(Debug, serde::Serialize)]
pub struct Report {
    pub mode: cgroup::CgroupMode,
    pub subsystems: subsystems::CgroupSubsystems,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_paths: Option<std::collections::HashMap<String, std::path::PathBuf>>,
}

/// Resolves the cgroup subsystem catalog for the configured root filesystem.
///
/// When a cgroup name is configured, a manager is created for it and its paths are included
/// in the report.
///
/// # Errors
///
/// Possible errors include:
/// - An invalid configuration (e.g., an unknown entry in `CGROUP_INCLUDED_METRICS`).
/// - Failure to read `mountinfo` or the cgroup membership file.
/// - No cgroup mounts found on the host.
pub fn collect_report(config: &config::Config) -> Result<Report, Box<dyn std::error::Error>> {
    log::debug!("Final rootfs: {}", config.rootfs.display());

    // Outside the host's root, our own /proc entries don't describe the host's mounts.
    let (mountinfo_path, cgroup_path) = if config.rootfs == Path::new("/") {
        (
            config.rootfs.join("proc/self/mountinfo"),
            config.rootfs.join("proc/self/cgroup"),
        )
    } else {
        (
            config.rootfs.join("proc/1/mountinfo"),
            config.rootfs.join("proc/1/cgroup"),
        )
    };

    let mode = cgroup::detect_cgroup_mode_from(&config.rootfs, &mountinfo_path);
    let source = mountinfo::ProcMountSource::new(&config.rootfs, mode)
        .with_mountinfo_path(mountinfo_path)
        .with_cgroup_path(cgroup_path);

    let all_mounts = source.cgroup_mounts(true)?;
    let catalog = subsystems::resolve_subsystems(
        &all_mounts,
        &subsystems::disabled_subsystems(&config.included_metrics),
    )?;
    log::debug!(
        "Selected {} subsystems from {} mounts",
        catalog.mount_points.len(),
        catalog.mounts.len()
    );

    // The cgroup is located through every hierarchy, not only the collected ones.
    let manager_paths = match &config.cgroup_name {
        Some(name) => {
            let located = subsystems::resolve_subsystems(&all_mounts, &HashSet::new())?;
            let manager = cgroup::select_manager(
                mode,
                &cgroup::FsManagerFactory,
                name,
                &located.cgroup_paths(name),
            )?;
            Some(manager.paths())
        }
        None => None,
    };

    Ok(Report {
        mode,
        subsystems: catalog,
        manager_paths,
    })
}

/// Runs the catalog diagnostics and prints the [`Report`] as JSON to stdout.
///
/// # Errors
///
/// Returns errors from [`config::Config::from_env`], [`collect_report`], and from writing
/// the report.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::from_env()?;
    let report = collect_report(&config)?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report)?;
    std::io::Write::write_all(&mut stdout, b"\n")?;
    Ok(())
}
