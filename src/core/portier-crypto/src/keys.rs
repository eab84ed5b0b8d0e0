//! Signing secret with automatic memory zeroization.
//!
//! The secret is kept in the textual form it is persisted in, and its bytes
//! are used directly as the HMAC key.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::random::{generate_urlsafe_token, SECRET_BYTES};

/// Minimum recommended secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// The symmetric secret that signs and verifies tokens.
///
/// Securely erased from memory when dropped. `Debug` never prints the value.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    value: String,
}

impl Secret {
    /// Generates a new random secret (256 bits, URL-safe encoded).
    pub fn generate() -> Self {
        let token = generate_urlsafe_token(SECRET_BYTES);
        Self {
            value: token.to_string(),
        }
    }

    /// Wraps an existing secret value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, CryptoError> {
        let value = value.into();
        if value.is_empty() {
            return Err(CryptoError::InvalidKey("secret is empty".to_string()));
        }
        Ok(Self { value })
    }

    /// Returns the raw secret bytes.
    ///
    /// Use with caution - the returned slice is not zeroized automatically.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.value.as_bytes()
    }

    /// Returns the secret in its persisted textual form.
    #[inline]
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Length of the secret in bytes.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Always false; empty secrets cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Whether the secret meets [`MIN_SECRET_LEN`].
    pub fn is_strong(&self) -> bool {
        self.len() >= MIN_SECRET_LEN
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("value", &"[REDACTED]")
            .finish()
    }
}
