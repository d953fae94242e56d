use std::fmt;

/// Errors that can occur while storing or discarding uploads.
#[derive(Debug)]
pub enum StorageError {
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The payload exceeds the configured size ceiling. Checked before any
    /// bytes are written.
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// The declared content type is not in the image allow-list.
    UnsupportedMediaType(String),
    /// The reference is malformed or would escape the storage root.
    InvalidReference(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "file exceeds size limit ({actual} > {limit} bytes)")
            }
            Self::UnsupportedMediaType(ty) => write!(f, "unsupported content type '{ty}'"),
            Self::InvalidReference(msg) => write!(f, "invalid upload reference: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
