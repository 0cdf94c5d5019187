use crate::mountinfo;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Mounts(#[from] mountinfo::Error),
    #[error("failed to find cgroup mounts")]
    NoMounts,
}

pub type Result<T> = std::result::Result<T, Error>;
