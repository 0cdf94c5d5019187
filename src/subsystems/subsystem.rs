use std::fmt;
use std::str::FromStr;

/// A cgroup subsystem (controller) whose statistics can be interpreted.
///
/// This is the closed set of supported subsystems; names read from the host that do not
/// parse into a `Subsystem` are not supported.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Subsystem {
    Cpu,
    Cpuacct,
    Memory,
    Hugetlb,
    Pids,
    Cpuset,
    Blkio,
    Io,
    Devices,
    PerfEvent,
}

impl Subsystem {
    /// Every supported subsystem.
    pub const ALL: [Subsystem; 10] = [
        Subsystem::Cpu,
        Subsystem::Cpuacct,
        Subsystem::Memory,
        Subsystem::Hugetlb,
        Subsystem::Pids,
        Subsystem::Cpuset,
        Subsystem::Blkio,
        Subsystem::Io,
        Subsystem::Devices,
        Subsystem::PerfEvent,
    ];

    /// The kernel's name for the subsystem.
    pub fn as_str(self) -> &'static str {
        match self {
            Subsystem::Cpu => "cpu",
            Subsystem::Cpuacct => "cpuacct",
            Subsystem::Memory => "memory",
            Subsystem::Hugetlb => "hugetlb",
            Subsystem::Pids => "pids",
            Subsystem::Cpuset => "cpuset",
            Subsystem::Blkio => "blkio",
            Subsystem::Io => "io",
            Subsystem::Devices => "devices",
            Subsystem::PerfEvent => "perf_event",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported cgroup subsystem `{0}`")]
pub struct UnsupportedSubsystem(pub String);

impl FromStr for Subsystem {
    type Err = UnsupportedSubsystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subsystem::ALL
            .into_iter()
            .find(|subsystem| subsystem.as_str() == s)
            .ok_or_else(|| UnsupportedSubsystem(s.to_owned()))
    }
}
