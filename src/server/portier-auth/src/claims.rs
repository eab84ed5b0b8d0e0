//! Token claims and the issued token.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Signed payload of a session token.
///
/// Serialized with the registered JWT claim names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated username.
    #[serde(rename = "sub")]
    pub subject: String,

    /// Issued at (Unix seconds).
    #[serde(rename = "iat")]
    pub issued_at: u64,

    /// Expiration (Unix seconds). Valid while `now <= expires_at`.
    #[serde(rename = "exp")]
    pub expires_at: u64,
}

impl Claims {
    /// Builds claims for `subject` issued at `now` and valid for `ttl`.
    pub fn new(subject: impl Into<String>, now: u64, ttl: Duration) -> Self {
        Self {
            subject: subject.into(),
            issued_at: now,
            expires_at: now.saturating_add(ttl.as_secs()),
        }
    }

    /// Checks whether the claims are past expiry at `now`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at
    }

    /// Remaining lifetime in seconds at `now` (0 if expired).
    pub fn remaining_at(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}

/// A signed token together with the claims it carries.
#[derive(Clone)]
pub struct Token {
    encoded: String,
    claims: Claims,
}

impl Token {
    pub(crate) fn new(encoded: String, claims: Claims) -> Self {
        Self { encoded, claims }
    }

    /// Compact wire form (`header.payload.signature`).
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Claims signed into the token.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Consumes the token, returning its wire form.
    pub fn into_string(self) -> String {
        self.encoded
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("encoded", &"[REDACTED]")
            .field("claims", &self.claims)
            .finish()
    }
}
