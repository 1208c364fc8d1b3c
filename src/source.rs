use std::fmt;
use std::path::{Path, PathBuf};

/// Where the demuxer reads the container from
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum VideoSource {
    /// A complete container held in memory, read through a custom avio context
    Raw(Vec<u8>),
    /// A path to a file
    Filesystem(PathBuf),
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(data) => write!(f, "<{} bytes in memory>", data.len()),
            Self::Filesystem(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<PathBuf> for VideoSource {
    fn from(path: PathBuf) -> Self {
        Self::Filesystem(path)
    }
}

impl From<&Path> for VideoSource {
    fn from(path: &Path) -> Self {
        path.to_path_buf().into()
    }
}

impl From<Vec<u8>> for VideoSource {
    fn from(data: Vec<u8>) -> Self {
        Self::Raw(data)
    }
}

impl From<String> for VideoSource {
    fn from(s: String) -> Self {
        PathBuf::from(s).into()
    }
}

impl From<&str> for VideoSource {
    fn from(s: &str) -> Self {
        Path::new(s).into()
    }
}
