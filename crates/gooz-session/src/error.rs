//! Error types for the session layer.

use std::path::PathBuf;

/// Errors that can occur while loading or saving the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session file could not be read, written, or removed.
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The session file exists but does not hold a valid record.
    ///
    /// The caller decides whether to clear it and start fresh.
    #[error("session file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The record could not be serialized for writing.
    #[error("session record for {path} could not be encoded: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
