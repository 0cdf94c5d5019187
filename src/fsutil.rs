use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Error that occurs when opening or reading a file fails.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("failed to open file `{path}`: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read file `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    /// Returns the path of the file the failed operation was performed on.
    pub fn path(&self) -> &Path {
        match self {
            FileError::Open { path, .. } | FileError::Read { path, .. } => path,
        }
    }

    /// Returns the underlying I/O error.
    pub fn io_error(&self) -> &io::Error {
        match self {
            FileError::Open { source, .. } | FileError::Read { source, .. } => source,
        }
    }
}

/// Opens a file at the given path and wraps it in a [`BufReader`].
///
/// # Errors
///
/// Returns [`FileError::Open`] if the file cannot be opened.
///
/// # Example
/// ```no_run
/// # use cgroup_catalog::fsutil;
/// let reader = fsutil::open_file_reader("/proc/self/mountinfo")?;
/// # Ok::<(), fsutil::FileError>(())
/// ```
pub fn open_file_reader(path: impl AsRef<Path>) -> Result<BufReader<File>, FileError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Reads the whole file at the given path into a string.
///
/// # Errors
///
/// Returns [`FileError::Read`] if the file cannot be read.
pub fn read_file_to_string(path: impl AsRef<Path>) -> Result<String, FileError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Joins an absolute host path below `rootfs`.
///
/// Paths read from procfs are absolute, so they are re-rooted instead of
/// replacing `rootfs` entirely as [`Path::join`] would.
pub fn under_rootfs(rootfs: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    rootfs.join(path.strip_prefix("/").unwrap_or(path))
}
