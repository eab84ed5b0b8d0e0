//! # Portier Key Store
//!
//! Provisioning of the secret that signs and verifies session tokens.
//!
//! The secret lives in a single text file. On first start it is generated
//! and persisted; on every later start the same file is read back, so tokens
//! survive restarts. Deleting the file rotates the secret and invalidates
//! every token signed with the previous one.
//!
//! ## First-run race
//!
//! A new secret is written to a temporary file next to the target and moved
//! into place with a create-exclusive rename. A process that loses the race
//! re-reads the winner's file instead of overwriting it, so a deployment
//! never trusts two secrets at once.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use portier_crypto::Secret;

pub use error::KeyStoreError;

/// Prefix of the temporary file used while persisting a new secret.
const TEMP_PREFIX: &str = ".portier-secret-";

/// Owner of the signing secret for the lifetime of the process.
///
/// The secret is read-only once loaded and safe to share between threads.
#[derive(Debug)]
pub struct KeyStore {
    path: PathBuf,
    secret: Secret,
    created: bool,
}

impl KeyStore {
    /// Loads the secret from `path`, generating and persisting it if absent.
    ///
    /// # Errors
    ///
    /// * [`KeyStoreError::StoreUnavailable`] - the file can neither be read nor created
    /// * [`KeyStoreError::EmptySecret`] - the file exists but is empty
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, KeyStoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(secret) = read_secret(&path)? {
            debug!(path = %path.display(), "Signing secret loaded");
            return Ok(Self {
                path,
                secret,
                created: false,
            });
        }

        let secret = Secret::generate();
        match persist_new(&path, &secret) {
            Ok(()) => {
                info!(path = %path.display(), "Generated new signing secret");
                Ok(Self {
                    path,
                    secret,
                    created: true,
                })
            },
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(
                    path = %path.display(),
                    "Secret file created concurrently, re-reading"
                );
                let secret = read_secret(&path)?.ok_or_else(|| KeyStoreError::StoreUnavailable {
                    path: path.clone(),
                    source: std::io::Error::from(ErrorKind::NotFound),
                })?;
                Ok(Self {
                    path,
                    secret,
                    created: false,
                })
            },
            Err(source) => Err(KeyStoreError::StoreUnavailable { path, source }),
        }
    }

    /// Returns the signing secret.
    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Returns the location of the secret file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if this instance generated the secret file.
    pub fn was_created(&self) -> bool {
        self.created
    }
}

/// Reads and trims the secret file. `Ok(None)` when the file does not exist.
fn read_secret(path: &Path) -> Result<Option<Secret>, KeyStoreError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => Zeroizing::new(contents),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(KeyStoreError::StoreUnavailable {
                path: path.to_path_buf(),
                source,
            })
        },
    };

    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Err(KeyStoreError::EmptySecret(path.to_path_buf()));
    }

    let secret = Secret::new(trimmed)?;
    if !secret.is_strong() {
        warn!(
            path = %path.display(),
            len = secret.len(),
            "Signing secret is shorter than recommended"
        );
    }

    Ok(Some(secret))
}

/// Writes a new secret file without ever replacing an existing one.
///
/// The temporary file is created owner-only, so the persisted secret keeps
/// `0600` permissions on Unix.
fn persist_new(path: &Path, secret: &Secret) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)?;
    tmp.write_all(secret.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist_noclobber(path).map_err(|e| e.error)?;

    Ok(())
}
