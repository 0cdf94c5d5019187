use std::fs;
use std::path::{Path, PathBuf};

use cgroup_catalog::cgroup::stats::{BlkioStatEntry, BlkioStats, DiskIoStats};
use cgroup_catalog::cgroup::{CgroupMode, FsManagerFactory, ManagerError, select_manager};
use cgroup_catalog::config::Config;
use cgroup_catalog::metrics::{MetricKind, MetricSet};
use cgroup_catalog::mountinfo::ProcMountSource;
use cgroup_catalog::subsystems::{Subsystem, get_cgroup_subsystems};

const LEGACY_MOUNTINFO: &str = "\
22 1 8:1 / / rw,relatime shared:1 - ext4 /dev/sda1 rw
30 22 0:26 / /sys/fs/cgroup ro,nosuid,nodev,noexec shared:7 - tmpfs tmpfs ro,mode=755
31 30 0:27 / /sys/fs/cgroup/systemd rw,nosuid shared:8 - cgroup cgroup rw,xattr,name=systemd
32 30 0:28 / /sys/fs/cgroup/cpu,cpuacct rw,nosuid shared:9 - cgroup cgroup rw,cpu,cpuacct
33 30 0:29 / /sys/fs/cgroup/memory rw,nosuid shared:10 - cgroup cgroup rw,memory
34 30 0:30 / /sys/fs/cgroup/blkio rw,nosuid shared:11 - cgroup cgroup rw,blkio
35 30 0:31 / /sys/fs/cgroup/pids rw,nosuid shared:12 - cgroup cgroup rw,pids
36 30 0:32 / /sys/fs/cgroup/rdma rw,nosuid shared:13 - cgroup cgroup rw,rdma
";

const LEGACY_CGROUP: &str = "\
7:rdma:/
6:pids:/system.slice/containerd.service
5:blkio:/system.slice/containerd.service
4:memory:/system.slice/containerd.service
3:cpu,cpuacct:/system.slice/containerd.service
1:name=systemd:/system.slice/containerd.service
";

const UNIFIED_MOUNTINFO: &str = "\
22 1 8:1 / / rw,relatime shared:1 - ext4 /dev/sda1 rw
30 22 0:26 / /sys/fs/cgroup rw,nosuid,nodev,noexec,relatime shared:4 - cgroup2 cgroup2 rw,nsdelegate
";

fn write_procfs(root: &Path, pid: &str, mountinfo: &str, cgroup: &str) {
    let proc_dir = root.join("proc").join(pid);
    fs::create_dir_all(&proc_dir).unwrap();
    fs::write(proc_dir.join("mountinfo"), mountinfo).unwrap();
    fs::write(proc_dir.join("cgroup"), cgroup).unwrap();
}

fn legacy_rootfs() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_procfs(dir.path(), "self", LEGACY_MOUNTINFO, LEGACY_CGROUP);
    write_procfs(dir.path(), "1", LEGACY_MOUNTINFO, LEGACY_CGROUP);
    dir
}

fn unified_rootfs() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_procfs(dir.path(), "self", UNIFIED_MOUNTINFO, "0::/\n");
    write_procfs(dir.path(), "1", UNIFIED_MOUNTINFO, "0::/\n");
    let cgroup_root = dir.path().join("sys/fs/cgroup");
    fs::create_dir_all(&cgroup_root).unwrap();
    fs::write(
        cgroup_root.join("cgroup.controllers"),
        "cpuset cpu io memory hugetlb pids rdma misc\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_legacy_host_catalog_and_manager() {
    let dir = legacy_rootfs();
    let root = dir.path();
    let source = ProcMountSource::new(root, CgroupMode::Legacy);

    let catalog = get_cgroup_subsystems(&source, &MetricSet::all()).unwrap();

    assert_eq!(
        catalog.mount_point(Subsystem::Cpu),
        Some(root.join("sys/fs/cgroup/cpu,cpuacct").as_path())
    );
    assert_eq!(
        catalog.mount_point(Subsystem::Cpuacct),
        Some(root.join("sys/fs/cgroup/cpu,cpuacct").as_path())
    );
    assert_eq!(
        catalog.mount_point(Subsystem::Blkio),
        Some(root.join("sys/fs/cgroup/blkio").as_path())
    );
    // Hierarchies without a supported subsystem are dropped.
    assert_eq!(catalog.mounts.len(), 4);
    assert!(
        !catalog
            .mounts
            .iter()
            .any(|m| m.subsystems.iter().any(|s| s == "rdma" || s == "systemd"))
    );
    assert_eq!(catalog.mount_points.len(), 5);

    let name = "/system.slice/containerd.service";
    let manager = select_manager(
        CgroupMode::Legacy,
        &FsManagerFactory,
        name,
        &catalog.cgroup_paths(name),
    )
    .unwrap();
    assert_eq!(manager.mode(), CgroupMode::Legacy);
    assert_eq!(manager.name(), Some(name));
    assert_eq!(
        manager.path("memory"),
        Some(
            root.join("sys/fs/cgroup/memory/system.slice/containerd.service")
                .as_path()
        )
    );
}

#[test]
fn test_legacy_host_respects_included_metrics() {
    let dir = legacy_rootfs();
    let source = ProcMountSource::new(dir.path(), CgroupMode::Legacy);
    let metrics: MetricSet = [MetricKind::CpuUsage].into_iter().collect();

    let catalog = get_cgroup_subsystems(&source, &metrics).unwrap();

    assert!(catalog.mount_point(Subsystem::Cpu).is_some());
    assert!(catalog.mount_point(Subsystem::Cpuacct).is_some());
    assert!(catalog.mount_point(Subsystem::Memory).is_none());
    assert!(catalog.mount_point(Subsystem::Blkio).is_none());
    assert!(catalog.mount_point(Subsystem::Pids).is_none());
}

#[test]
fn test_unified_host_catalog_and_manager() {
    let dir = unified_rootfs();
    let root = dir.path();
    let source = ProcMountSource::new(root, CgroupMode::Unified);

    let catalog = get_cgroup_subsystems(&source, &MetricSet::all()).unwrap();

    let cgroup_root = root.join("sys/fs/cgroup");
    assert_eq!(catalog.mounts.len(), 1);
    for subsystem in [
        Subsystem::Cpu,
        Subsystem::Cpuset,
        Subsystem::Io,
        Subsystem::Memory,
        Subsystem::Hugetlb,
        Subsystem::Pids,
    ] {
        assert_eq!(
            catalog.mount_point(subsystem),
            Some(cgroup_root.as_path()),
            "{subsystem}"
        );
    }
    assert!(catalog.mount_point(Subsystem::Blkio).is_none());

    let name = "/system.slice/containerd.service";
    let manager = select_manager(
        CgroupMode::Unified,
        &FsManagerFactory,
        name,
        &catalog.cgroup_paths(name),
    )
    .unwrap();
    let expected = cgroup_root.join("system.slice/containerd.service");
    assert_eq!(manager.mode(), CgroupMode::Unified);
    assert_eq!(manager.path("memory"), Some(expected.as_path()));
    assert_eq!(manager.path("io"), Some(expected.as_path()));
}

#[test]
fn test_unified_manager_without_cpu_path() {
    let err = select_manager(
        CgroupMode::Unified,
        &FsManagerFactory,
        "/a",
        &[("memory".to_owned(), PathBuf::from("/sys/fs/cgroup/a"))]
            .into_iter()
            .collect(),
    )
    .unwrap_err();
    assert!(matches!(err, ManagerError::EmptyPath));
}

#[test]
fn test_collect_report_for_container_rootfs() {
    let dir = unified_rootfs();
    let config = Config {
        rootfs: dir.path().to_path_buf(),
        included_metrics: MetricSet::all(),
        cgroup_name: Some("/kubepods/pod1".to_owned()),
    };

    let report = cgroup_catalog::collect_report(&config).unwrap();

    assert_eq!(report.mode, CgroupMode::Unified);
    let expected = dir.path().join("sys/fs/cgroup/kubepods/pod1");
    let manager_paths = report.manager_paths.unwrap();
    assert_eq!(manager_paths.get(""), Some(&expected));

    let json = serde_json::to_value(&report.subsystems).unwrap();
    assert_eq!(json["mounts"].as_array().map(Vec::len), Some(1));
}

#[test]
fn test_collect_report_locates_unified_cgroup_without_cpu_metrics() {
    let dir = unified_rootfs();
    let config = Config {
        rootfs: dir.path().to_path_buf(),
        included_metrics: [MetricKind::MemoryUsage].into_iter().collect(),
        cgroup_name: Some("/kubepods/pod1".to_owned()),
    };

    let report = cgroup_catalog::collect_report(&config).unwrap();

    let cgroup_root = dir.path().join("sys/fs/cgroup");
    assert_eq!(
        report.subsystems.mount_point(Subsystem::Memory),
        Some(cgroup_root.as_path())
    );
    assert!(report.subsystems.mount_point(Subsystem::Cpu).is_none());
    let manager_paths = report.manager_paths.unwrap();
    assert_eq!(
        manager_paths.get(""),
        Some(&cgroup_root.join("kubepods/pod1"))
    );
}

#[test]
fn test_collect_report_locates_legacy_cgroup_in_every_hierarchy() {
    let dir = legacy_rootfs();
    let config = Config {
        rootfs: dir.path().to_path_buf(),
        included_metrics: [MetricKind::MemoryUsage].into_iter().collect(),
        cgroup_name: Some("/system.slice/containerd.service".to_owned()),
    };

    let report = cgroup_catalog::collect_report(&config).unwrap();

    assert_eq!(report.mode, CgroupMode::Legacy);
    assert!(report.subsystems.mount_point(Subsystem::Cpu).is_none());
    let manager_paths = report.manager_paths.unwrap();
    assert_eq!(
        manager_paths.get("cpu"),
        Some(
            &dir.path()
                .join("sys/fs/cgroup/cpu,cpuacct/system.slice/containerd.service")
        )
    );
    assert_eq!(manager_paths.len(), 5);
}

#[test]
fn test_collect_report_detects_mode_from_init_mounts() {
    let dir = unified_rootfs();
    // The monitor's own namespace looks legacy; the host's init process sees cgroup2.
    write_procfs(dir.path(), "self", LEGACY_MOUNTINFO, LEGACY_CGROUP);
    let config = Config {
        rootfs: dir.path().to_path_buf(),
        included_metrics: MetricSet::all(),
        cgroup_name: None,
    };

    let report = cgroup_catalog::collect_report(&config).unwrap();

    assert_eq!(report.mode, CgroupMode::Unified);
    assert_eq!(report.subsystems.mounts.len(), 1);
    assert!(report.manager_paths.is_none());
}

#[test]
fn test_disk_io_stats_from_blkio() {
    let blkio = BlkioStats {
        io_service_bytes_recursive: vec![
            BlkioStatEntry::new(8, 16, "Read", 4096),
            BlkioStatEntry::new(8, 0, "Read", 1024),
            BlkioStatEntry::new(8, 0, "Write", 2048),
            BlkioStatEntry::new(8, 16, "Write", 0),
        ],
        io_serviced_recursive: vec![BlkioStatEntry::new(8, 0, "Count", 7)],
        ..BlkioStats::default()
    };

    let disk_io = DiskIoStats::from(&blkio);

    assert_eq!(disk_io.io_service_bytes.len(), 2);
    let first = &disk_io.io_service_bytes[0];
    assert_eq!((first.major, first.minor), (8, 0));
    assert_eq!(first.stats.get("Read"), Some(&1024));
    assert_eq!(first.stats.get("Write"), Some(&2048));
    let second = &disk_io.io_service_bytes[1];
    assert_eq!((second.major, second.minor), (8, 16));
    assert_eq!(second.stats.get("Write"), Some(&0));

    assert_eq!(disk_io.io_serviced.len(), 1);
    assert_eq!(disk_io.io_serviced[0].stats.get("Count"), Some(&7));
    assert!(disk_io.sectors.is_empty());
}
