//! Error type for integrity computations and the execution boundary.

use std::path::PathBuf;
use std::time::Duration;

/// Why a digest request produced no integrity value.
///
/// Returned by the digest engine and by every [`crate::runner::DigestRunner`],
/// so the controller can tell "not found" apart from "unreadable" or
/// "took too long" instead of waiting on silence.
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// No path or no algorithm was supplied.
    #[error("missing input: a path and an algorithm are required")]
    MissingInput,
    /// The file does not exist.
    #[error("{} not found", .path.display())]
    NotFound { path: PathBuf },
    /// The file exists but could not be read (permissions, directory, I/O).
    #[error("read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The algorithm tag is not one of `sha256` / `sha512`.
    #[error("unsupported algorithm {0:?} (expected sha256 or sha512)")]
    UnsupportedAlgorithm(String),
    /// The computation did not finish within the dispatch timeout.
    #[error("no result after {after:?}")]
    TimedOut { after: Duration },
    /// The external digest process could not be started.
    #[error("spawn digest process: {0}")]
    Spawn(#[source] std::io::Error),
    /// The external digest process wrote something that is not an integrity value.
    #[error("malformed digest output {0:?}")]
    MalformedOutput(String),
}

impl DigestError {
    /// Map an I/O error from reading `path` to `NotFound` or `Unreadable`.
    pub fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            DigestError::NotFound { path }
        } else {
            DigestError::Unreadable { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn from_read_not_found() {
        let e = DigestError::from_read("/nope.js", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(e, DigestError::NotFound { .. }));
        assert_eq!(e.to_string(), "/nope.js not found");
    }

    #[test]
    fn from_read_permission_denied_is_unreadable() {
        let e = DigestError::from_read(
            "/secret.css",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(e, DigestError::Unreadable { .. }));
        assert!(e.to_string().starts_with("read /secret.css: "));
    }
}
