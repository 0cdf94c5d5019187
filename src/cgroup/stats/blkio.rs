//! Per-device aggregation of block I/O counters.
//!
//! The blkio (v1) and io (v2) controllers report one value per device and operation,
//! e.g. `8:0 Read 4096` in `blkio.throttle.io_service_bytes`. Those samples arrive as
//! [`BlkioStatEntry`] values and are grouped into one [`PerDiskStats`] record per device.
//!
//! # Example
//!
//! ```rust
//! use cgroup_catalog::cgroup::stats::{BlkioStatEntry, disk_stats_copy};
//!
//! let entries = [
//!     BlkioStatEntry::new(8, 0, "Read", 4096),
//!     BlkioStatEntry::new(8, 0, "Write", 1024),
//!     BlkioStatEntry::new(8, 16, "", 7),
//! ];
//! let stats = disk_stats_copy(&entries);
//!
//! assert_eq!(stats.len(), 2);
//! assert_eq!(stats[0].stats["Read"], 4096);
//! assert_eq!(stats[1].stats["Count"], 7);
//! ```

use std::collections::{BTreeMap, HashMap};

/// Operation name used for samples that carry no operation label.
pub const COUNT_OP: &str = "Count";

/// A single raw blkio sample: one counter for one device and operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlkioStatEntry {
    pub major: u64,
    pub minor: u64,
    /// Operation label such as `Read`, `Write`, `Sync`. Empty for single-value files
    /// like `blkio.sectors`.
    pub op: String,
    pub value: u64,
}

impl BlkioStatEntry {
    pub fn new(major: u64, minor: u64, op: impl Into<String>, value: u64) -> Self {
        Self {
            major,
            minor,
            op: op.into(),
            value,
        }
    }
}

/// Identifies a block device by its major and minor number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiskKey {
    pub major: u64,
    pub minor: u64,
}

/// Counters of one block device, keyed by operation name.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct PerDiskStats {
    pub major: u64,
    pub minor: u64,
    pub stats: HashMap<String, u64>,
}

impl PerDiskStats {
    fn empty(key: DiskKey) -> Self {
        Self {
            major: key.major,
            minor: key.minor,
            stats: HashMap::new(),
        }
    }

    pub fn key(&self) -> DiskKey {
        DiskKey {
            major: self.major,
            minor: self.minor,
        }
    }
}

/// Groups raw blkio samples into one record per device.
///
/// Samples without an operation label are stored under [`COUNT_OP`]. A later sample for the
/// same device and operation replaces the earlier value rather than adding to it. Records are
/// returned ordered by device number; an empty input yields an empty result.
pub fn disk_stats_copy(entries: &[BlkioStatEntry]) -> Vec<PerDiskStats> {
    if entries.is_empty() {
        return Vec::new();
    }

    let mut disks: BTreeMap<DiskKey, PerDiskStats> = BTreeMap::new();
    for entry in entries {
        let key = DiskKey {
            major: entry.major,
            minor: entry.minor,
        };
        let disk = disks
            .entry(key)
            .or_insert_with(|| PerDiskStats::empty(key));
        let op = if entry.op.is_empty() {
            COUNT_OP
        } else {
            entry.op.as_str()
        };
        disk.stats.insert(op.to_owned(), entry.value);
    }

    disks.into_values().collect()
}

/// Raw samples of every blkio stat file of a cgroup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlkioStats {
    pub io_service_bytes_recursive: Vec<BlkioStatEntry>,
    pub io_serviced_recursive: Vec<BlkioStatEntry>,
    pub io_queued_recursive: Vec<BlkioStatEntry>,
    pub io_service_time_recursive: Vec<BlkioStatEntry>,
    pub io_wait_time_recursive: Vec<BlkioStatEntry>,
    pub io_merged_recursive: Vec<BlkioStatEntry>,
    pub io_time_recursive: Vec<BlkioStatEntry>,
    pub sectors_recursive: Vec<BlkioStatEntry>,
}

/// Per-device view of [`BlkioStats`], one list of records per stat file.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct DiskIoStats {
    pub io_service_bytes: Vec<PerDiskStats>,
    pub io_serviced: Vec<PerDiskStats>,
    pub io_queued: Vec<PerDiskStats>,
    pub sectors: Vec<PerDiskStats>,
    pub io_service_time: Vec<PerDiskStats>,
    pub io_wait_time: Vec<PerDiskStats>,
    pub io_merged: Vec<PerDiskStats>,
    pub io_time: Vec<PerDiskStats>,
}

impl DiskIoStats {
    pub fn from_blkio(blkio: &BlkioStats) -> Self {
        Self {
            io_service_bytes: disk_stats_copy(&blkio.io_service_bytes_recursive),
            io_serviced: disk_stats_copy(&blkio.io_serviced_recursive),
            io_queued: disk_stats_copy(&blkio.io_queued_recursive),
            sectors: disk_stats_copy(&blkio.sectors_recursive),
            io_service_time: disk_stats_copy(&blkio.io_service_time_recursive),
            io_wait_time: disk_stats_copy(&blkio.io_wait_time_recursive),
            io_merged: disk_stats_copy(&blkio.io_merged_recursive),
            io_time: disk_stats_copy(&blkio.io_time_recursive),
        }
    }
}

impl From<&BlkioStats> for DiskIoStats {
    fn from(blkio: &BlkioStats) -> Self {
        Self::from_blkio(blkio)
    }
}
