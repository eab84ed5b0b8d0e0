//! # Portier Credentials
//!
//! Flat-file credential store in the `htpasswd` tradition.
//!
//! One entry per line, `username:hash`. The username ends at the first `:`;
//! the rest of the line is the stored hash. Blank lines are ignored and lines
//! without a separator are skipped.
//!
//! The file is read again on every verification, so edits take effect
//! immediately and no in-memory state needs synchronizing.
//!
//! ## Supported Hash Schemes
//!
//! - Apache MD5-crypt (`$apr1$`)
//! - bcrypt (`$2a$`, `$2b$`, `$2x$`, `$2y$`)
//! - Argon2 (`$argon2id$`, ...)
//! - Unsalted SHA-2 hex digests (detected by username, see [`scheme`])
//! - Plaintext (only as the configured fallback)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod apr1;
pub mod error;
pub mod scheme;

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::{debug, warn};

pub use error::CredentialError;
pub use scheme::{bcrypt_hash, detect_scheme, DigestAlgorithm, HashScheme};

/// A parsed credential line.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialEntry {
    /// Account name (text before the first `:`).
    pub username: String,
    /// Stored hash (text after the first `:`).
    pub hash: String,
    /// Scheme detected for `hash`.
    pub scheme: HashScheme,
}

impl std::fmt::Debug for CredentialEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialEntry")
            .field("username", &self.username)
            .field("hash", &"[REDACTED]")
            .field("scheme", &self.scheme)
            .finish()
    }
}

/// Parses the contents of a credential file.
///
/// Entries keep file order. Duplicate usernames are kept too; lookups take
/// the first one.
pub fn parse_entries(contents: &str, fallback: HashScheme) -> Vec<CredentialEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let Some((username, hash)) = line.split_once(':') else {
            debug!(line = index + 1, "Skipping credential line without separator");
            continue;
        };

        if !seen.insert(username) {
            warn!(
                username,
                line = index + 1,
                "Duplicate username in credential store, first entry wins"
            );
        }

        entries.push(CredentialEntry {
            username: username.to_string(),
            hash: hash.to_string(),
            scheme: HashScheme::detect(username, hash, fallback),
        });
    }

    entries
}

/// Credential file consulted on every verification.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    fallback: HashScheme,
}

impl CredentialStore {
    /// Creates a store over `path`.
    ///
    /// `fallback` is the scheme used for hashes whose scheme cannot be detected.
    pub fn new(path: impl AsRef<Path>, fallback: HashScheme) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            fallback,
        }
    }

    /// Returns the location of the credential file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the fallback scheme.
    pub fn fallback(&self) -> HashScheme {
        self.fallback
    }

    /// Loads every entry from the file. A missing file yields no entries.
    ///
    /// # Errors
    ///
    /// [`CredentialError::StoreUnavailable`] if the file exists but cannot be read.
    pub fn entries(&self) -> Result<Vec<CredentialEntry>, CredentialError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "Credential store not found");
                return Ok(Vec::new());
            },
            Err(source) => {
                return Err(CredentialError::StoreUnavailable {
                    path: self.path.clone(),
                    source,
                })
            },
        };

        Ok(parse_entries(&contents, self.fallback))
    }

    /// Returns the first entry for `username`.
    pub fn find(&self, username: &str) -> Result<Option<CredentialEntry>, CredentialError> {
        Ok(self
            .entries()?
            .into_iter()
            .find(|entry| entry.username == username))
    }

    /// Checks `password` for `username` against the current file contents.
    ///
    /// Returns `Ok(false)` for unknown users, a missing file, or a wrong password.
    pub fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        let Some(entry) = self.find(username)? else {
            debug!("No credential entry for user");
            verify_dummy(self.fallback, password);
            return Ok(false);
        };

        let valid = entry.scheme.verify(password, &entry.hash);
        debug!(scheme = %entry.scheme, valid, "Credential checked");

        Ok(valid)
    }
}

/// Password behind the placeholder hashes checked for unknown users.
const DUMMY_PASSWORD: &str = "portier-unknown-user";

/// Placeholder hash of [`DUMMY_PASSWORD`] under `scheme`.
///
/// Salted schemes are hashed once per process.
fn dummy_hash(scheme: HashScheme) -> Option<String> {
    static APR1: OnceLock<Option<String>> = OnceLock::new();
    static BCRYPT: OnceLock<Option<String>> = OnceLock::new();
    static ARGON2: OnceLock<Option<String>> = OnceLock::new();

    let cell = match scheme {
        HashScheme::Apr1 => &APR1,
        HashScheme::Bcrypt => &BCRYPT,
        HashScheme::Argon2 => &ARGON2,
        HashScheme::Plaintext | HashScheme::Digest(_) => return scheme.hash(DUMMY_PASSWORD).ok(),
    };

    cell.get_or_init(|| scheme.hash(DUMMY_PASSWORD).ok()).clone()
}

/// Runs a full verification against a placeholder hash so that unknown
/// users cost as much as known ones. The outcome is discarded.
fn verify_dummy(scheme: HashScheme, password: &str) {
    if let Some(hash) = dummy_hash(scheme) {
        std::hint::black_box(scheme.verify(password, &hash));
    }
}
