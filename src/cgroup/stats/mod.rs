//! Statistics shapes produced from raw cgroup counters.
//!
//! Reading and parsing the cgroup stat files happens elsewhere; this module only turns the
//! already-read samples into per-device records.

mod blkio;

pub use blkio::{
    BlkioStatEntry, BlkioStats, COUNT_OP, DiskIoStats, DiskKey, PerDiskStats, disk_stats_copy,
};
