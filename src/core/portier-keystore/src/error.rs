//! Key store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while provisioning the signing secret.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// The secret file can neither be read nor created.
    #[error("secret store unavailable at {path}: {source}")]
    StoreUnavailable {
        /// Location of the secret file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The secret file exists but holds no secret.
    #[error("secret file {0} is empty")]
    EmptySecret(PathBuf),

    /// Crypto error.
    #[error("crypto error: {0}")]
    Crypto(String),
}

impl From<portier_crypto::CryptoError> for KeyStoreError {
    fn from(e: portier_crypto::CryptoError) -> Self {
        KeyStoreError::Crypto(e.to_string())
    }
}
