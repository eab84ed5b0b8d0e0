//! Session token issuance and verification.
//!
//! Tokens are compact JWTs signed with HMAC-SHA256 under the key store
//! secret. Expiry is checked against a caller-supplied clock after the
//! signature, so a forged token is always reported as such even when stale.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use portier_crypto::Secret;

use crate::claims::{Claims, Token};
use crate::error::AuthError;

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Current time as Unix seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Issues and verifies signed session tokens.
pub struct TokenService {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.header.alg)
            .finish()
    }
}

impl TokenService {
    /// Creates a token service signing with `secret`.
    pub fn new(secret: &Secret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced in `verify` against the caller's clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            header: Header::new(Algorithm::HS256),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a token for `subject`, valid from `now` for `ttl`.
    pub fn issue(&self, subject: &str, now: u64, ttl: Duration) -> Result<Token, AuthError> {
        let claims = Claims::new(subject, now, ttl);
        let encoded = encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(Token::new(encoded, claims))
    }

    /// Verifies `token` and returns its claims if still valid at `now`.
    ///
    /// # Errors
    ///
    /// * [`AuthError::MalformedToken`] - the token cannot be decoded
    /// * [`AuthError::BadSignature`] - not signed with this service's secret
    /// * [`AuthError::ExpiredToken`] - `now` is past `exp`
    pub fn verify(&self, token: &str, now: u64) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    AuthError::BadSignature
                },
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::MalformedToken,
            })?
            .claims;

        if claims.is_expired_at(now) {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims)
    }
}
