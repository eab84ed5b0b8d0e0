//! Shared handler state.

use std::sync::Arc;

use portier_auth::AuthGateway;

use crate::error::ApiError;
use crate::page::LoginPage;

/// State passed to every handler via axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The authentication gateway.
    pub gateway: Arc<AuthGateway>,
    /// Compiled login form.
    pub login_page: Arc<LoginPage>,
}

impl AppState {
    /// Wraps `gateway` for sharing across requests and compiles the login page.
    pub fn new(gateway: AuthGateway) -> Result<Self, ApiError> {
        Ok(Self {
            gateway: Arc::new(gateway),
            login_page: Arc::new(LoginPage::new()?),
        })
    }
}
