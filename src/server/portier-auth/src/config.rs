//! Gateway configuration.

use std::path::PathBuf;
use std::time::Duration;

use portier_credentials::HashScheme;

use crate::token::DEFAULT_TOKEN_TTL;

/// Default location of the signing secret.
pub const DEFAULT_SECRET_KEY_FILE: &str = "secret.key";

/// Default location of the credential file.
pub const DEFAULT_CREDENTIALS_FILE: &str = "../secrets";

/// Settings consumed by [`AuthGateway::from_config`](crate::AuthGateway::from_config).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Path of the signing secret file (created on first start).
    pub secret_key_file: PathBuf,
    /// Path of the `username:hash` credential file.
    pub credentials_file: PathBuf,
    /// Lifetime of issued tokens.
    pub token_ttl: Duration,
    /// Scheme applied to hashes whose scheme cannot be detected.
    pub default_scheme: HashScheme,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            secret_key_file: PathBuf::from(DEFAULT_SECRET_KEY_FILE),
            credentials_file: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            token_ttl: DEFAULT_TOKEN_TTL,
            default_scheme: HashScheme::Bcrypt,
        }
    }
}
