//! # Portier Crypto
//!
//! Core cryptographic primitives for Portier.
//!
//! This crate provides the low-level pieces shared by the gateway:
//! - Secure random generation (OS CSPRNG)
//! - URL-safe secret encoding
//! - The zeroizing [`Secret`] handle used to sign and verify tokens
//! - Constant-time comparison

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod compare;
pub mod error;
pub mod keys;
pub mod random;

pub use compare::constant_time_eq;
pub use error::CryptoError;
pub use keys::{Secret, MIN_SECRET_LEN};
