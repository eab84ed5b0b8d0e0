//! # Portier Auth
//!
//! Token lifecycle and the authentication gateway.
//!
//! - [`TokenService`] issues HS256-signed, time-bounded tokens and verifies
//!   them (signature, then expiry).
//! - [`AuthGateway`] composes a [`CredentialBackend`] with the token service
//!   into `authenticate` and `authorize`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod claims;
pub mod config;
pub mod error;
pub mod gateway;
pub mod token;

pub use backend::CredentialBackend;
pub use claims::{Claims, Token};
pub use config::GatewayConfig;
pub use error::{AuthError, Rejection};
pub use gateway::AuthGateway;
pub use token::{unix_now, TokenService, DEFAULT_TOKEN_TTL};
