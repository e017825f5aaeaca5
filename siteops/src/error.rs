use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required file or directory is missing; aborts before any processing.
    #[error("{0}")]
    Precondition(String),

    #[error("failed to parse manifest {path:?}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to back up {path:?}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("failed to list files: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to encode webp: {0}")]
    Encode(String),
}

impl Error {
    /// Fatal errors stop the whole run; everything else is reported per item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Precondition(_) | Self::Manifest { .. } | Self::Config(_))
    }
}
