use std::ffi::OsString;
use std::path::PathBuf;

use crate::metrics::{MetricSet, UnknownMetricKind};

/// Root of the host filesystem, for monitors running inside a container.
pub const ROOTFS_ENV: &str = "ROOTFS_MOUNT_PATH";
/// Comma-separated metric categories to collect, e.g. `cpu,memory,diskIO`.
pub const INCLUDED_METRICS_ENV: &str = "CGROUP_INCLUDED_METRICS";
/// Optional cgroup, relative to the hierarchy roots, to build a manager for.
pub const CGROUP_NAME_ENV: &str = "CGROUP_NAME";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid `{var}`: {source}")]
    InvalidMetrics {
        var: &'static str,
        #[source]
        source: UnknownMetricKind,
    },
    #[error("`{var}` is not valid unicode")]
    NotUnicode { var: &'static str },
}

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub rootfs: PathBuf,
    pub included_metrics: MetricSet,
    pub cgroup_name: Option<String>,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|name| std::env::var_os(name))
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Unset variables fall back to `/` for the rootfs, every metric category, and no
    /// cgroup name.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self, Error> {
        let rootfs = lookup(ROOTFS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/"));

        let included_metrics = match lookup(INCLUDED_METRICS_ENV) {
            Some(raw) => raw
                .into_string()
                .map_err(|_| Error::NotUnicode {
                    var: INCLUDED_METRICS_ENV,
                })?
                .parse()
                .map_err(|source| Error::InvalidMetrics {
                    var: INCLUDED_METRICS_ENV,
                    source,
                })?,
            None => MetricSet::all(),
        };

        let cgroup_name = lookup(CGROUP_NAME_ENV)
            .map(|raw| {
                raw.into_string()
                    .map_err(|_| Error::NotUnicode {
                        var: CGROUP_NAME_ENV,
                    })
            })
            .transpose()?
            .filter(|name| !name.is_empty());

        Ok(Self {
            rootfs,
            included_metrics,
            cgroup_name,
        })
    }
}
