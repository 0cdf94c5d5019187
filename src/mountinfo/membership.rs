//! Parser for `/proc/[pid]/cgroup` membership files.
//!
//! Each line has the form `<hierarchy-id>:<controller-list>:<cgroup-path>`:
//!
//! - cgroup v1 lines carry a non-zero hierarchy id and a comma-separated controller list,
//!   e.g. `4:cpu,cpuacct:/user.slice`. Named hierarchies appear as `name=systemd`.
//! - the cgroup v2 line always has hierarchy id `0` and an empty controller list.

use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

use super::{Error, Result};

#[derive(Debug, thiserror::Error)]
pub enum CgroupLineError {
    #[error("invalid cgroup line format: {0}")]
    InvalidFormat(String),
    #[error("invalid hierarchy id in cgroup line: {0}")]
    InvalidHierarchyID(String),
}

/// A parsed line of a `/proc/[pid]/cgroup` file.
#[derive(Debug, PartialEq, Eq)]
pub struct CgroupLine<'a> {
    pub hierarchy_id: u32,
    pub controller_list: Vec<&'a str>,
    pub cgroup_path: &'a str,
}

/// Parses a single `/proc/[pid]/cgroup` line.
///
/// The cgroup path is the remainder of the line after the second `:`, so paths that
/// contain colons themselves are kept intact.
pub fn parse_cgroup_line(line: &str) -> std::result::Result<CgroupLine<'_>, CgroupLineError> {
    let line = line.trim_end_matches('\n');
    let mut it = line.splitn(3, ':');
    let hierarchy_id = it
        .next()
        .ok_or_else(|| CgroupLineError::InvalidFormat(line.to_owned()))?
        .parse::<u32>()
        .map_err(|_| CgroupLineError::InvalidHierarchyID(line.to_owned()))?;
    let controller_list = it
        .next()
        .ok_or_else(|| CgroupLineError::InvalidFormat(line.to_owned()))?;
    let controller_list: Vec<&str> = if controller_list.is_empty() {
        Vec::default()
    } else {
        controller_list.split(',').collect()
    };
    let cgroup_path = it
        .next()
        .ok_or_else(|| CgroupLineError::InvalidFormat(line.to_owned()))?;

    Ok(CgroupLine {
        hierarchy_id,
        controller_list,
        cgroup_path: cgroup_path.trim(),
    })
}

/// Collects the cgroup v1 controllers the process is a member of.
///
/// Named hierarchies are returned without their `name=` prefix. The v2 line contributes
/// nothing. Blank lines are skipped.
///
/// # Errors
///
/// - [`Error::ReadLine`] if reading from `reader` fails.
/// - [`Error::Membership`] if a line is malformed.
pub fn read_v1_controllers<R: BufRead>(mut reader: R, origin: &Path) -> Result<HashSet<String>> {
    let mut line = String::with_capacity(128);
    let mut controllers = HashSet::new();

    while reader
        .read_line(&mut line)
        .map_err(|source| Error::ReadLine {
            path: origin.to_path_buf(),
            source,
        })?
        != 0
    {
        if !line.trim().is_empty() {
            let cgl = parse_cgroup_line(&line).map_err(|source| Error::Membership {
                path: origin.to_path_buf(),
                source,
            })?;
            if cgl.hierarchy_id != 0 {
                controllers.extend(
                    cgl.controller_list
                        .into_iter()
                        .map(|c| c.strip_prefix(super::CGROUP_NAME_PREFIX).unwrap_or(c))
                        .filter(|c| !c.is_empty())
                        .map(str::to_owned),
                );
            }
        }

        line.clear();
    }

    log::trace!(
        "Found {} cgroup v1 controllers in `{}`",
        controllers.len(),
        origin.display()
    );
    Ok(controllers)
}
