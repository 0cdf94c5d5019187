//! Metric categories a caller can ask to collect.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::subsystems::Subsystem;

/// A category of container metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    CpuUsage,
    ProcessScheduler,
    PerCpuUsage,
    MemoryUsage,
    MemoryNuma,
    CpuLoad,
    DiskIo,
    DiskUsage,
    Network,
    Accelerator,
    Hugetlb,
    Perf,
    Process,
    CpuSet,
    Oom,
}

impl MetricKind {
    pub const ALL: [MetricKind; 15] = [
        MetricKind::CpuUsage,
        MetricKind::ProcessScheduler,
        MetricKind::PerCpuUsage,
        MetricKind::MemoryUsage,
        MetricKind::MemoryNuma,
        MetricKind::CpuLoad,
        MetricKind::DiskIo,
        MetricKind::DiskUsage,
        MetricKind::Network,
        MetricKind::Accelerator,
        MetricKind::Hugetlb,
        MetricKind::Perf,
        MetricKind::Process,
        MetricKind::CpuSet,
        MetricKind::Oom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::CpuUsage => "cpu",
            MetricKind::ProcessScheduler => "sched",
            MetricKind::PerCpuUsage => "percpu",
            MetricKind::MemoryUsage => "memory",
            MetricKind::MemoryNuma => "memory_numa",
            MetricKind::CpuLoad => "cpuLoad",
            MetricKind::DiskIo => "diskIO",
            MetricKind::DiskUsage => "disk",
            MetricKind::Network => "network",
            MetricKind::Accelerator => "accelerator",
            MetricKind::Hugetlb => "hugetlb",
            MetricKind::Perf => "perf_event",
            MetricKind::Process => "process",
            MetricKind::CpuSet => "cpuset",
            MetricKind::Oom => "oom_event",
        }
    }

    /// The cgroup subsystems that only exist to serve this category.
    ///
    /// A subsystem listed here is left out of the catalog when the category isn't
    /// collected.
    pub fn subsystems(self) -> &'static [Subsystem] {
        match self {
            MetricKind::DiskIo => &[Subsystem::Blkio, Subsystem::Io],
            MetricKind::CpuUsage => &[Subsystem::Cpu],
            MetricKind::CpuSet => &[Subsystem::Cpuset],
            MetricKind::Hugetlb => &[Subsystem::Hugetlb],
            MetricKind::MemoryUsage => &[Subsystem::Memory],
            MetricKind::Perf => &[Subsystem::PerfEvent],
            MetricKind::Process => &[Subsystem::Pids],
            _ => &[],
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric kind `{0}`")]
pub struct UnknownMetricKind(pub String);

impl FromStr for MetricKind {
    type Err = UnknownMetricKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownMetricKind(s.to_owned()))
    }
}

/// The set of metric categories a caller is interested in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricSet(HashSet<MetricKind>);

impl MetricSet {
    /// A set containing every metric category.
    pub fn all() -> Self {
        MetricKind::ALL.into_iter().collect()
    }

    pub fn has(&self, kind: MetricKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<MetricKind> for MetricSet {
    fn from_iter<T: IntoIterator<Item = MetricKind>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for MetricSet {
    type Err = UnknownMetricKind;

    /// Parses a comma-separated list such as `cpu,memory,diskIO`. Blank entries are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(MetricKind::from_str)
            .collect()
    }
}
