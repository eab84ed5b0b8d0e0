//! Credential backend trait.

use portier_credentials::CredentialStore;

use crate::AuthError;

/// Trait for credential backends.
///
/// Implementations check a username/password pair. Expected failures (unknown
/// user, wrong password) are `Ok(false)`; only an inaccessible backing store
/// is an error.
pub trait CredentialBackend: Send + Sync {
    /// Verifies the given credentials.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the password matches
    /// * `Ok(false)` - If the user is unknown or the password is wrong
    /// * `Err(AuthError::StoreUnavailable)` - If the store cannot be read
    fn verify(&self, username: &str, password: &str) -> Result<bool, AuthError>;

    /// Returns the name of this backend for logging/debugging.
    fn name(&self) -> &'static str;
}

impl CredentialBackend for CredentialStore {
    fn verify(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        Ok(CredentialStore::verify(self, username, password)?)
    }

    fn name(&self) -> &'static str {
        "credential-file"
    }
}
