//! # Portier API
//!
//! HTTP layer for the Portier gateway.
//!
//! ## Endpoints
//!
//! - `GET /` - Redirect to the login page
//! - `GET /health` - Liveness
//! - `GET /login` - Login form (or redirect when already signed in)
//! - `POST /login` - Form login, sets the `auth_token` cookie
//! - `POST /token` - JSON login, returns a bearer token
//! - `GET /verify` - Checks a bearer token or session cookie

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extract;
pub mod handlers;
pub mod page;
pub mod state;

use axum::routing::{get, post};
use axum::Router;

pub use error::{ApiError, ApiErrorResponse};
pub use extract::AUTH_COOKIE;
pub use handlers::{HealthResponse, TokenRequest, TokenResponse};
pub use state::AppState;

/// Builds the router with every endpoint bound to `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/login",
            get(handlers::login_page).post(handlers::login_submit),
        )
        .route("/token", post(handlers::issue_token))
        .route("/verify", get(handlers::verify))
        .with_state(state)
}
