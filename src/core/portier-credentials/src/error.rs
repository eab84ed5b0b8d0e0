//! Credential store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or producing credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The credential file exists but cannot be read.
    #[error("credential store unavailable at {path}: {source}")]
    StoreUnavailable {
        /// Location of the credential file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Unknown hash scheme name.
    #[error("unknown hash scheme: {0}")]
    UnknownScheme(String),

    /// Producing a password hash failed.
    #[error("hashing failed: {0}")]
    Hashing(String),
}
