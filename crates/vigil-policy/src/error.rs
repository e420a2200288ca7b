// error.rs — Error types for the policy subsystem.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or writing the policy document.
///
/// Every variant here is a deny for the calling gate: there is no path
/// from a policy error to an allowed action.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy document could not be read from disk.
    #[error("failed to read policy document at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The policy document exists but is not valid YAML for the schema.
    #[error("malformed policy document at {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// A pattern in the document does not compile as a regex.
    #[error("invalid pattern '{pattern}' in group '{group}': {reason}")]
    InvalidPattern {
        group: String,
        pattern: String,
        reason: String,
    },

    /// The policy document could not be written.
    #[error("failed to write policy document at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serializing the document for an administrative write failed.
    #[error("failed to serialize policy document: {0}")]
    SerializeFailed(#[from] serde_yaml::Error),
}
