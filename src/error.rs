// Error handling for the file and command line wrappers.
//
// Decoding itself never fails; everything here comes from reading images,
// loading configuration or writing listings.

use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum DetokError {
    Io { path: PathBuf, source: io::Error },
    InvalidAddress(String),
    Config(String),
    Usage(String),
}

impl DetokError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DetokError::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for DetokError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DetokError::Io { path, source } => match source.kind() {
                io::ErrorKind::NotFound => write!(f, "File not found: {}", path.display()),
                io::ErrorKind::PermissionDenied => {
                    write!(f, "Permission denied: {}", path.display())
                }
                _ => write!(f, "I/O error on {}: {}", path.display(), source),
            },
            DetokError::InvalidAddress(addr) => {
                write!(f, "Address {} was not in hex or decimal format", addr)
            }
            DetokError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DetokError::Usage(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DetokError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DetokError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
