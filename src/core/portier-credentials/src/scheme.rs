//! Password-hash schemes and their detection.
//!
//! Modular-crypt markers (`$apr1$`, `$2b$`, `$argon2id$`, ...) are the primary
//! signal. Without a marker, the stored hash is compared with hex digests of
//! the *username*; a match selects that digest algorithm. This check is a
//! heuristic kept for compatibility with existing credential files. When
//! nothing matches, the configured fallback applies.

use std::fmt;
use std::str::FromStr;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::Digest as _;
use tracing::debug;

use portier_crypto::constant_time_eq;
use portier_crypto::random::generate_crypt_salt;

use crate::apr1;
use crate::error::CredentialError;

/// Markers of the bcrypt variants.
const BCRYPT_MARKERS: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// Marker shared by the Argon2 variants.
const ARGON2_MARKER: &str = "$argon2";

/// Digest algorithms tried when a hash carries no marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// SHA-224.
    Sha224,
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl DigestAlgorithm {
    /// Probe order.
    pub const ALL: [DigestAlgorithm; 4] = [
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha512,
        DigestAlgorithm::Sha224,
        DigestAlgorithm::Sha384,
    ];

    /// Lowercase hex digest of `input`.
    pub fn hex_digest(&self, input: &[u8]) -> String {
        match self {
            DigestAlgorithm::Sha224 => hex::encode(sha2::Sha224::digest(input)),
            DigestAlgorithm::Sha256 => hex::encode(sha2::Sha256::digest(input)),
            DigestAlgorithm::Sha384 => hex::encode(sha2::Sha384::digest(input)),
            DigestAlgorithm::Sha512 => hex::encode(sha2::Sha512::digest(input)),
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha224 => "sha224",
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha384 => "sha384",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }
}

/// Encoding that produced a stored password hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HashScheme {
    /// Password stored as-is.
    Plaintext,
    /// Apache MD5-crypt (`$apr1$`).
    Apr1,
    /// bcrypt (`$2a$`, `$2b$`, `$2x$`, `$2y$`).
    #[default]
    Bcrypt,
    /// Argon2 PHC string (`$argon2id$...`).
    Argon2,
    /// Unsalted hex digest.
    Digest(DigestAlgorithm),
}

impl HashScheme {
    /// Identifies a scheme from the hash prefix alone.
    pub fn from_marker(hash: &str) -> Option<Self> {
        if hash.starts_with(apr1::APR1_MAGIC) {
            Some(HashScheme::Apr1)
        } else if BCRYPT_MARKERS.iter().any(|m| hash.starts_with(m)) {
            Some(HashScheme::Bcrypt)
        } else if hash.starts_with(ARGON2_MARKER) {
            Some(HashScheme::Argon2)
        } else {
            None
        }
    }

    /// Detects the scheme of a stored hash belonging to `username`.
    pub fn detect(username: &str, hash: &str, fallback: HashScheme) -> HashScheme {
        if let Some(scheme) = Self::from_marker(hash) {
            return scheme;
        }

        DigestAlgorithm::ALL
            .into_iter()
            .find(|alg| alg.hex_digest(username.as_bytes()).eq_ignore_ascii_case(hash))
            .map(HashScheme::Digest)
            .unwrap_or(fallback)
    }

    /// Checks `password` against `stored` under this scheme.
    ///
    /// Malformed stored hashes never verify.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        match self {
            HashScheme::Plaintext => constant_time_eq(password.as_bytes(), stored.as_bytes()),
            HashScheme::Apr1 => match apr1::salt_of(stored) {
                Some(salt) => {
                    let computed = apr1::hash_with_salt(password.as_bytes(), salt);
                    constant_time_eq(computed.as_bytes(), stored.as_bytes())
                },
                None => false,
            },
            HashScheme::Bcrypt => bcrypt::verify(password, stored).unwrap_or_else(|e| {
                debug!(error = %e, "Stored hash is not valid bcrypt");
                false
            }),
            HashScheme::Argon2 => {
                let Ok(parsed) = PasswordHash::new(stored) else {
                    debug!("Stored hash is not a valid argon2 PHC string");
                    return false;
                };
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            },
            HashScheme::Digest(alg) => {
                let computed = alg.hex_digest(password.as_bytes());
                constant_time_eq(computed.as_bytes(), stored.to_ascii_lowercase().as_bytes())
            },
        }
    }

    /// Produces a stored hash of `password` under this scheme.
    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        match self {
            HashScheme::Plaintext => Ok(password.to_string()),
            HashScheme::Apr1 => Ok(apr1::hash_with_salt(
                password.as_bytes(),
                &generate_crypt_salt(apr1::SALT_LEN),
            )),
            HashScheme::Bcrypt => bcrypt_hash(password, bcrypt::DEFAULT_COST),
            HashScheme::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|h| h.to_string())
                    .map_err(|e| CredentialError::Hashing(e.to_string()))
            },
            HashScheme::Digest(alg) => Ok(alg.hex_digest(password.as_bytes())),
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            HashScheme::Plaintext => "plaintext",
            HashScheme::Apr1 => "apr1",
            HashScheme::Bcrypt => "bcrypt",
            HashScheme::Argon2 => "argon2",
            HashScheme::Digest(alg) => alg.name(),
        }
    }
}

impl fmt::Display for HashScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashScheme {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaintext" | "plain" => Ok(HashScheme::Plaintext),
            "apr1" | "md5" => Ok(HashScheme::Apr1),
            "bcrypt" => Ok(HashScheme::Bcrypt),
            "argon2" | "argon2id" => Ok(HashScheme::Argon2),
            "sha224" => Ok(HashScheme::Digest(DigestAlgorithm::Sha224)),
            "sha256" => Ok(HashScheme::Digest(DigestAlgorithm::Sha256)),
            "sha384" => Ok(HashScheme::Digest(DigestAlgorithm::Sha384)),
            "sha512" => Ok(HashScheme::Digest(DigestAlgorithm::Sha512)),
            other => Err(CredentialError::UnknownScheme(other.to_string())),
        }
    }
}

/// Hashes `password` with bcrypt at the given cost.
pub fn bcrypt_hash(password: &str, cost: u32) -> Result<String, CredentialError> {
    bcrypt::hash(password, cost).map_err(|e| CredentialError::Hashing(e.to_string()))
}

/// Detects the scheme of a raw `username:hash` credential line.
///
/// Lines without a `:` separator yield `fallback`.
pub fn detect_scheme(line: &str, fallback: HashScheme) -> HashScheme {
    match line.trim().split_once(':') {
        Some((username, hash)) => HashScheme::detect(username, hash, fallback),
        None => fallback,
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_detect_apr1_line() {
        let line = "admin:$apr1$abc$hashvalue";
        assert_eq!(detect_scheme(line, HashScheme::Bcrypt), HashScheme::Apr1);
    }

    #[test]
    fn test_detect_sha256_of_username() {
        let line = format!("admin:{}", DigestAlgorithm::Sha256.hex_digest(b"admin"));
        assert_eq!(
            detect_scheme(&line, HashScheme::Bcrypt),
            HashScheme::Digest(DigestAlgorithm::Sha256)
        );
    }

    #[test]
    fn test_detect_digest_is_case_insensitive() {
        let digest = DigestAlgorithm::Sha512.hex_digest(b"admin").to_uppercase();
        assert_eq!(
            HashScheme::detect("admin", &digest, HashScheme::Bcrypt),
            HashScheme::Digest(DigestAlgorithm::Sha512)
        );
    }

    #[test]
    fn test_detect_unrecognized_falls_back_to_bcrypt() {
        assert_eq!(
            detect_scheme("admin:not-a-known-hash", HashScheme::Bcrypt),
            HashScheme::Bcrypt
        );
    }

    #[test]
    fn test_detect_uses_configured_fallback() {
        assert_eq!(
            detect_scheme("admin:hunter2", HashScheme::Plaintext),
            HashScheme::Plaintext
        );
        assert_eq!(
            detect_scheme("no separator", HashScheme::Plaintext),
            HashScheme::Plaintext
        );
    }

    #[test]
    fn test_detect_markers() {
        for marker in ["$2a$", "$2b$", "$2x$", "$2y$"] {
            let hash = format!("{marker}10$abcdefghijklmnopqrstuv");
            assert_eq!(HashScheme::from_marker(&hash), Some(HashScheme::Bcrypt));
        }
        assert_eq!(
            HashScheme::from_marker("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"),
            Some(HashScheme::Argon2)
        );
        assert_eq!(HashScheme::from_marker("plain"), None);
    }

    #[test]
    fn test_plaintext_verify() {
        assert!(HashScheme::Plaintext.verify("secret", "secret"));
        assert!(!HashScheme::Plaintext.verify("secret", "secreT"));
        assert!(!HashScheme::Plaintext.verify("secret", "secret2"));
    }

    #[test]
    fn test_apr1_verify() {
        let stored = "$apr1$r31.....$HqJZimcKQFAMYayBlzkrA/";
        assert!(HashScheme::Apr1.verify("myPassword", stored));
        assert!(!HashScheme::Apr1.verify("wrong", stored));
        assert!(!HashScheme::Apr1.verify("myPassword", "$apr1$garbage"));
    }

    #[test]
    fn test_apr1_hash_roundtrip() {
        let stored = HashScheme::Apr1.hash("s3cret").unwrap();
        assert!(stored.starts_with("$apr1$"));
        assert!(HashScheme::Apr1.verify("s3cret", &stored));
    }

    #[test]
    fn test_bcrypt_verify() {
        let stored = bcrypt_hash("s3cret", TEST_COST).unwrap();
        assert_eq!(HashScheme::from_marker(&stored), Some(HashScheme::Bcrypt));
        assert!(HashScheme::Bcrypt.verify("s3cret", &stored));
        assert!(!HashScheme::Bcrypt.verify("wrong", &stored));
    }

    #[test]
    fn test_bcrypt_rejects_non_bcrypt_hash() {
        assert!(!HashScheme::Bcrypt.verify("s3cret", "s3cret"));
    }

    #[test]
    fn test_argon2_verify() {
        let stored = HashScheme::Argon2.hash("s3cret").unwrap();
        assert_eq!(HashScheme::from_marker(&stored), Some(HashScheme::Argon2));
        assert!(HashScheme::Argon2.verify("s3cret", &stored));
        assert!(!HashScheme::Argon2.verify("wrong", &stored));
        assert!(!HashScheme::Argon2.verify("s3cret", "$argon2id$broken"));
    }

    #[test]
    fn test_digest_verify() {
        let scheme = HashScheme::Digest(DigestAlgorithm::Sha256);
        let stored = scheme.hash("admin").unwrap();
        assert_eq!(
            stored,
            "8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918"
        );
        assert!(scheme.verify("admin", &stored));
        assert!(scheme.verify("admin", &stored.to_uppercase()));
        assert!(!scheme.verify("other", &stored));
    }

    #[test]
    fn test_scheme_names_roundtrip() {
        for scheme in [
            HashScheme::Plaintext,
            HashScheme::Apr1,
            HashScheme::Bcrypt,
            HashScheme::Argon2,
            HashScheme::Digest(DigestAlgorithm::Sha224),
            HashScheme::Digest(DigestAlgorithm::Sha256),
            HashScheme::Digest(DigestAlgorithm::Sha384),
            HashScheme::Digest(DigestAlgorithm::Sha512),
        ] {
            assert_eq!(scheme.to_string().parse::<HashScheme>().unwrap(), scheme);
        }
    }

    #[test]
    fn test_unknown_scheme_name() {
        let result = "rot13".parse::<HashScheme>();
        assert!(matches!(result, Err(CredentialError::UnknownScheme(_))));
    }
}
