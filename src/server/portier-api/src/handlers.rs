//! Request handlers.

use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::debug;

use portier_auth::{Claims, Rejection, Token};

use crate::error::ApiError;
use crate::extract::{presented_token, AUTH_COOKIE};
use crate::page::safe_target;
use crate::state::AppState;

/// Query string of `GET /login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// Where to go once signed in.
    pub url: Option<String>,
}

/// Body of `POST /login`.
#[derive(Default, Deserialize)]
pub struct LoginForm {
    /// Submitted username.
    #[serde(default)]
    pub username: String,
    /// Submitted password.
    #[serde(default)]
    pub password: String,
    /// Where to go once signed in.
    pub url: Option<String>,
}

/// Body of `POST /token`.
#[derive(Deserialize, Serialize)]
pub struct TokenRequest {
    /// Username.
    #[serde(default)]
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

/// Response of `POST /token`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed session token.
    pub token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Expiration (Unix seconds).
    pub expires_at: u64,
}

/// Response of `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests.
    pub status: String,
    /// Crate version.
    pub version: String,
}

async fn authenticate(
    state: &AppState,
    username: String,
    password: String,
) -> Result<Token, ApiError> {
    let gateway = Arc::clone(&state.gateway);
    let token =
        tokio::task::spawn_blocking(move || gateway.authenticate(&username, &password)).await??;
    Ok(token)
}

fn login_form(
    state: &AppState,
    status: StatusCode,
    target: &str,
    error: Option<&str>,
) -> Response {
    match state.login_page.render(target, error) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET /
pub async fn root() -> Redirect {
    Redirect::to("/login")
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /login
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    jar: CookieJar,
) -> Response {
    let target = safe_target(query.url.as_deref());

    if let Some(cookie) = jar.get(AUTH_COOKIE) {
        if state.gateway.authorize(Some(cookie.value())).is_ok() {
            return Redirect::to(target).into_response();
        }
    }

    login_form(&state, StatusCode::OK, target, None)
}

/// POST /login
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let target = safe_target(form.url.as_deref()).to_string();

    match authenticate(&state, form.username, form.password).await {
        Ok(token) => {
            let cookie = Cookie::build((AUTH_COOKIE, token.into_string()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            (jar.add(cookie), Redirect::to(&target)).into_response()
        },
        Err(ApiError::Auth(e)) if e.rejection() == Rejection::Unauthorized => {
            debug!(reason = %e, "Login form rejected");
            login_form(
                &state,
                StatusCode::UNAUTHORIZED,
                &target,
                Some("Invalid username or password"),
            )
        },
        Err(e) => e.into_response(),
    }
}

/// POST /token
pub async fn issue_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = authenticate(&state, req.username, req.password).await?;
    let expires_at = token.claims().expires_at;

    Ok(Json(TokenResponse {
        token: token.into_string(),
        token_type: "Bearer".to_string(),
        expires_at,
    }))
}

/// GET /verify
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Json<Claims>, ApiError> {
    let token = presented_token(&headers, &jar);
    let claims = state.gateway.authorize(token.as_deref())?;

    Ok(Json(claims))
}
