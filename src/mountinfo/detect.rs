use crate::fsutil;

use super::parser::{MountInfo, parse_mount_info_line};
use super::{Error, Result};
use std::io::BufRead;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

/// Walks every entry of a `mountinfo` file in order, handing each parsed line to `visit`.
///
/// Iteration stops early when `visit` returns [`ControlFlow::Break`].
///
/// # Errors
///
/// - [`Error::File`] if the file can't be opened.
/// - [`Error::ReadLine`] if reading from the file fails.
/// - [`Error::Parse`] if parsing any line fails.
pub fn for_each_mount(
    path: impl AsRef<Path>,
    visit: impl FnMut(&MountInfo<'_>) -> ControlFlow<()>,
) -> Result<()> {
    let path = path.as_ref();
    let buf = fsutil::open_file_reader(path)?;

    for_each_mount_from_reader(buf, path, visit)
}

/// Reader-based form of [`for_each_mount`].
///
/// `origin` is the logical origin of the data and only used in error messages.
/// Blank lines are skipped.
pub(crate) fn for_each_mount_from_reader<R: BufRead>(
    mut reader: R,
    origin: &Path,
    mut visit: impl FnMut(&MountInfo<'_>) -> ControlFlow<()>,
) -> Result<()> {
    let mut line = String::with_capacity(256);

    while reader
        .read_line(&mut line)
        .map_err(|source| Error::ReadLine {
            path: origin.to_path_buf(),
            source,
        })?
        != 0
    {
        if !line.trim().is_empty() {
            let mount_info =
                parse_mount_info_line(line.as_str()).map_err(|source| Error::Parse {
                    path: origin.to_path_buf(),
                    source,
                })?;
            if visit(&mount_info).is_break() {
                break;
            }
        }

        line.clear();
    }

    Ok(())
}

/// Detects the cgroup v2 mount point by parsing a Linux `mountinfo` file.
///
/// This function scans the file for entries where the filesystem type is `cgroup2`
/// and returns the associated mount point. If multiple `cgroup2` entries exist,
/// the first one is returned.
///
/// # Errors
///
/// Returns errors from [`for_each_mount`] and [`Error::MissingCgroup2Mount`] if no
/// `cgroup2` mount is found.
///
/// # Example
///
/// ```no_run
/// use cgroup_catalog::mountinfo::detect_cgroup2_mount_point;
///
/// let root = detect_cgroup2_mount_point("/proc/self/mountinfo").unwrap();
/// println!("cgroup2 root: {}", root.display());
/// ```
pub fn detect_cgroup2_mount_point(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let buf = fsutil::open_file_reader(path)?;

    detect_cgroup2_mount_point_from_reader(buf, path)
}

fn detect_cgroup2_mount_point_from_reader<R: BufRead>(
    reader: R,
    origin: &Path,
) -> Result<PathBuf> {
    let mut mount_point = None;

    for_each_mount_from_reader(reader, origin, |mount_info| {
        if mount_info.fs_type != super::CGROUP2_FS_TYPE {
            return ControlFlow::Continue(());
        }
        log::debug!(
            "Found `cgroup2` mount point with root `{}`: {}",
            mount_info.root,
            mount_info.mount_point
        );
        mount_point = Some(PathBuf::from(&*mount_info.mount_point));
        ControlFlow::Break(())
    })?;

    mount_point.ok_or_else(|| Error::MissingCgroup2Mount {
        path: origin.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn new_cursor_from_contents(contents: &str) -> Cursor<Vec<u8>> {
        Cursor::new(contents.as_bytes().to_vec())
    }

    #[test]
    fn test_detect_single_cgroup2_mount() {
        let input =
            "42 35 0:39 / /sys/fs/cgroup rw,nosuid,nodev,noexec,relatime - cgroup2 cgroup rw\n";
        let path = Path::new("/dummy");
        let reader = new_cursor_from_contents(input);

        let mount = detect_cgroup2_mount_point_from_reader(reader, path).unwrap();
        assert_eq!(mount, PathBuf::from("/sys/fs/cgroup"));
    }

    #[test]
    fn test_detect_hybrid_cgroup2_mount() {
        let input = "\
33 25 0:28 / /sys/fs/cgroup ro,nosuid,nodev,noexec shared:9 - tmpfs tmpfs ro,mode=755
34 33 0:29 / /sys/fs/cgroup/unified rw,nosuid,nodev,noexec,relatime shared:10 - cgroup2 cgroup2 rw
35 33 0:30 / /sys/fs/cgroup/memory rw,nosuid,nodev,noexec,relatime shared:11 - cgroup cgroup rw,memory
";
        let reader = new_cursor_from_contents(input);

        let mount = detect_cgroup2_mount_point_from_reader(reader, Path::new("/dummy")).unwrap();
        assert_eq!(mount, PathBuf::from("/sys/fs/cgroup/unified"));
    }

    #[test]
    fn test_detect_missing_cgroup2_mount() {
        let input = "25 1 0:24 / /proc rw,relatime - proc proc rw\n";
        let path = Path::new("/dummy");
        let reader = new_cursor_from_contents(input);

        let err = detect_cgroup2_mount_point_from_reader(reader, path).unwrap_err();
        match err {
            Error::MissingCgroup2Mount { path: err_path } => assert_eq!(err_path, path),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_detect_invalid_line() {
        let input = "invalid mountinfo line";
        let path = Path::new("/dummy");
        let reader = new_cursor_from_contents(input);

        let err = detect_cgroup2_mount_point_from_reader(reader, path).unwrap_err();
        match err {
            Error::Parse { path: err_path, .. } => assert_eq!(err_path, path),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_for_each_mount_stops_on_break() {
        let input = "\
25 1 0:24 / /proc rw,relatime - proc proc rw
26 1 0:25 / /sys rw,relatime - sysfs sysfs rw
this line is never parsed
";
        let mut seen = Vec::new();
        for_each_mount_from_reader(
            new_cursor_from_contents(input),
            Path::new("/dummy"),
            |mount_info| {
                seen.push(mount_info.mount_point.to_string());
                if mount_info.fs_type == "sysfs" {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        )
        .unwrap();
        assert_eq!(seen, vec!["/proc", "/sys"]);
    }

    #[test]
    fn test_detect_from_tempfile() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "42 35 0:39 / /sys/fs/cgroup rw,nosuid,nodev,noexec,relatime - cgroup2 cgroup rw"
        )
        .unwrap();

        let mount = detect_cgroup2_mount_point(tmp.path()).unwrap();
        assert_eq!(mount, PathBuf::from("/sys/fs/cgroup"));
    }

    #[test]
    fn test_detect_from_missing_file() {
        let err = detect_cgroup2_mount_point("/definitely/does/not/exist").unwrap_err();
        assert!(matches!(err, Error::File(_)));
    }
}
