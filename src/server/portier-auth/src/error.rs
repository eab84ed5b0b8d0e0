//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication and authorization.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username, password or token not supplied.
    #[error("missing credentials")]
    MissingCredentials,

    /// Unknown user or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token cannot be decoded.
    #[error("malformed token")]
    MalformedToken,

    /// Token is past its expiry.
    #[error("token expired")]
    ExpiredToken,

    /// Token was not signed with the current secret.
    #[error("bad token signature")]
    BadSignature,

    /// Credential or secret file cannot be accessed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Token could not be produced.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Outward classification of an [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Login must be (re)attempted.
    Unauthorized,
    /// Presented token does not grant access.
    Forbidden,
    /// Gateway cannot decide right now.
    Unavailable,
}

impl AuthError {
    /// Maps the error to its outward rejection class.
    pub fn rejection(&self) -> Rejection {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidCredentials => {
                Rejection::Unauthorized
            },
            AuthError::MalformedToken | AuthError::ExpiredToken | AuthError::BadSignature => {
                Rejection::Forbidden
            },
            AuthError::StoreUnavailable(_) | AuthError::Internal(_) => Rejection::Unavailable,
        }
    }
}

impl From<portier_credentials::CredentialError> for AuthError {
    fn from(e: portier_credentials::CredentialError) -> Self {
        AuthError::StoreUnavailable(e.to_string())
    }
}

impl From<portier_keystore::KeyStoreError> for AuthError {
    fn from(e: portier_keystore::KeyStoreError) -> Self {
        AuthError::StoreUnavailable(e.to_string())
    }
}
