//! The authentication gateway.
//!
//! Client session lifecycle:
//!
//! ```text
//! Anonymous --authenticate--> Authenticated(token) --exp passes--> Expired
//! ```
//!
//! There is no logout or revocation; expiry is the only way back to
//! `Anonymous`.

use std::time::Duration;

use tracing::{debug, info};

use portier_credentials::CredentialStore;
use portier_keystore::KeyStore;

use crate::backend::CredentialBackend;
use crate::claims::{Claims, Token};
use crate::config::GatewayConfig;
use crate::error::AuthError;
use crate::token::{unix_now, TokenService};

/// Composes credential verification and token issuance.
///
/// Holds no mutable state; share it across requests behind an `Arc`.
pub struct AuthGateway {
    credentials: Box<dyn CredentialBackend>,
    tokens: TokenService,
    token_ttl: Duration,
}

impl std::fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGateway")
            .field("credentials", &self.credentials.name())
            .field("tokens", &self.tokens)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl AuthGateway {
    /// Creates a gateway from its parts.
    pub fn new(
        credentials: impl CredentialBackend + 'static,
        tokens: TokenService,
        token_ttl: Duration,
    ) -> Self {
        Self {
            credentials: Box::new(credentials),
            tokens,
            token_ttl,
        }
    }

    /// Loads (or creates) the signing secret and wires the credential file.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, AuthError> {
        let keystore = KeyStore::load_or_create(&config.secret_key_file)?;
        let tokens = TokenService::new(keystore.secret());
        let credentials = CredentialStore::new(&config.credentials_file, config.default_scheme);

        info!(
            secret_key_file = %config.secret_key_file.display(),
            credentials_file = %config.credentials_file.display(),
            default_scheme = %config.default_scheme,
            token_ttl_secs = config.token_ttl.as_secs(),
            "Authentication gateway ready"
        );

        Ok(Self::new(credentials, tokens, config.token_ttl))
    }

    /// Lifetime of tokens issued by [`authenticate`](Self::authenticate).
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Verifies the credentials and issues a token for `username`.
    ///
    /// Unknown users and wrong passwords both yield
    /// [`AuthError::InvalidCredentials`].
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Token, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        if !self.credentials.verify(username, password)? {
            debug!(username, backend = self.credentials.name(), "Authentication failed");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(username, unix_now(), self.token_ttl)?;
        info!(
            username,
            expires_at = token.claims().expires_at,
            "Session token issued"
        );

        Ok(token)
    }

    /// Verifies a presented token against the current time.
    pub fn authorize(&self, token: Option<&str>) -> Result<Claims, AuthError> {
        self.authorize_at(token, unix_now())
    }

    /// Verifies a presented token as of `now` (Unix seconds).
    pub fn authorize_at(&self, token: Option<&str>, now: u64) -> Result<Claims, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingCredentials)?;

        match self.tokens.verify(token, now) {
            Ok(claims) => {
                debug!(
                    subject = %claims.subject,
                    remaining_secs = claims.remaining_at(now),
                    "Token accepted"
                );
                Ok(claims)
            },
            Err(e) => {
                debug!(reason = %e, "Token rejected");
                Err(e)
            },
        }
    }
}
