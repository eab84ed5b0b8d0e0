//! Integration tests for the Portier gateway.
//!
//! These tests run the full HTTP stack on an ephemeral port and drive it
//! over real connections.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tokio::task::JoinHandle;

use portier_api::AppState;
use portier_auth::{AuthGateway, GatewayConfig, DEFAULT_TOKEN_TTL};
use portier_credentials::{bcrypt_hash, HashScheme};

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: u64,
}

#[derive(Debug, Deserialize)]
pub struct ClaimsResponse {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

// ============================================================================
// Test Fixture
// ============================================================================

/// Data directory holding the secret key and credential files.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// Creates a data directory with the given `(username, password)` pairs
    /// hashed with bcrypt.
    pub fn with_users(users: &[(&str, &str)]) -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temp dir")?;
        let mut contents = String::new();
        for (username, password) in users {
            let hash = bcrypt_hash(password, 4)?;
            contents.push_str(&format!("{}:{}\n", username, hash));
        }
        std::fs::write(dir.path().join("secrets"), contents)?;

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn secret_key_file(&self) -> PathBuf {
        self.path().join("secret.key")
    }

    pub fn config(&self) -> GatewayConfig {
        GatewayConfig {
            secret_key_file: self.secret_key_file(),
            credentials_file: self.path().join("secrets"),
            token_ttl: DEFAULT_TOKEN_TTL,
            default_scheme: HashScheme::Bcrypt,
        }
    }
}

// ============================================================================
// Test Server
// ============================================================================

/// A server instance running in the test process.
pub struct TestServer {
    handle: JoinHandle<()>,
    pub base_url: String,
    pub addr: SocketAddr,
}

impl TestServer {
    /// Starts a server reading its files from `fixture`.
    pub async fn start(fixture: &Fixture) -> Result<Self> {
        Self::start_with(fixture.config()).await
    }

    /// Starts a server with an explicit gateway configuration.
    pub async fn start_with(config: GatewayConfig) -> Result<Self> {
        let gateway = AuthGateway::from_config(&config)?;
        let app = portier_api::router(AppState::new(gateway)?);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind ephemeral port")?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            handle,
            base_url: format!("http://{}", addr),
            addr,
        };

        server.wait_for_ready().await?;

        Ok(server)
    }

    /// Wait for the server to be ready to accept connections.
    async fn wait_for_ready(&self) -> Result<()> {
        let client = Client::new();
        let url = format!("{}/health", self.base_url);

        for _ in 0..50 {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }

        bail!("Server failed to start within 5 seconds")
    }

    /// Get a configured HTTP client for this server.
    pub fn client(&self) -> PortierClient {
        PortierClient::new(&self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ============================================================================
// Test Client
// ============================================================================

/// HTTP client for testing the Portier API. Does not follow redirects.
pub struct PortierClient {
    client: Client,
    base_url: String,
}

impl PortierClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .redirect(Policy::none())
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn token(&self, username: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/token"))
            .json(&TokenRequest { username, password })
            .send()
            .await?)
    }

    pub async fn login_token(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let resp = self.token(username, password).await?;
        if !resp.status().is_success() {
            bail!("Login failed: {}", resp.status());
        }
        Ok(resp.json().await?)
    }

    pub async fn form_login(
        &self,
        username: &str,
        password: &str,
        url: &str,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password), ("url", url)])
            .send()
            .await?)
    }

    pub async fn verify_bearer(&self, token: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(self.url("/verify"))
            .bearer_auth(token)
            .send()
            .await?)
    }

    pub async fn verify_cookie(&self, token: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(self.url("/verify"))
            .header(reqwest::header::COOKIE, format!("auth_token={}", token))
            .send()
            .await?)
    }

    pub async fn verify_anonymous(&self) -> Result<StatusCode> {
        Ok(self.client.get(self.url("/verify")).send().await?.status())
    }
}

/// Extracts the `auth_token` value from a response's `Set-Cookie` header.
pub fn session_cookie(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix("auth_token="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Fixture {
        Fixture::with_users(&[("alice", "wonderland"), ("bob", "builder")]).unwrap()
    }

    #[tokio::test]
    async fn test_token_then_bearer_verify() {
        let fixture = alice();
        let server = TestServer::start(&fixture).await.unwrap();
        let client = server.client();

        let issued = client.login_token("alice", "wonderland").await.unwrap();
        let resp = client.verify_bearer(&issued.token).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let claims: ClaimsResponse = resp.json().await.unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp, issued.expires_at);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[tokio::test]
    async fn test_secret_created_on_first_start() {
        let fixture = alice();
        assert!(!fixture.secret_key_file().exists());

        let _server = TestServer::start(&fixture).await.unwrap();

        let secret = std::fs::read_to_string(fixture.secret_key_file()).unwrap();
        assert!(!secret.trim().is_empty());
    }

    #[tokio::test]
    async fn test_form_login_then_cookie() {
        let fixture = alice();
        let server = TestServer::start(&fixture).await.unwrap();
        let client = server.client();

        let resp = client
            .form_login("bob", "builder", "/workshop")
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[reqwest::header::LOCATION], "/workshop");
        let token = session_cookie(&resp).unwrap();

        let verified = client.verify_cookie(&token).await.unwrap();
        assert_eq!(verified.status(), StatusCode::OK);
        let claims: ClaimsResponse = verified.json().await.unwrap();
        assert_eq!(claims.sub, "bob");
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let fixture = alice();
        let server = TestServer::start(&fixture).await.unwrap();
        let client = server.client();

        let wrong = client.token("alice", "looking-glass").await.unwrap();
        let unknown = client.token("mallory", "wonderland").await.unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            wrong.text().await.unwrap(),
            unknown.text().await.unwrap()
        );

        let form = client.form_login("alice", "nope", "/").await.unwrap();
        assert_eq!(form.status(), StatusCode::UNAUTHORIZED);
        assert!(session_cookie(&form).is_none());
    }

    #[tokio::test]
    async fn test_missing_and_garbage_tokens() {
        let fixture = alice();
        let server = TestServer::start(&fixture).await.unwrap();
        let client = server.client();

        assert_eq!(
            client.verify_anonymous().await.unwrap(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            client.verify_bearer("garbage").await.unwrap().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            client.verify_cookie("a.b.c").await.unwrap().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_restart_keeps_tokens_valid() {
        let fixture = alice();

        let token = {
            let server = TestServer::start(&fixture).await.unwrap();
            server
                .client()
                .login_token("alice", "wonderland")
                .await
                .unwrap()
                .token
        };

        let restarted = TestServer::start(&fixture).await.unwrap();
        let resp = restarted.client().verify_bearer(&token).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_deleted_secret_invalidates_tokens() {
        let fixture = alice();

        let token = {
            let server = TestServer::start(&fixture).await.unwrap();
            server
                .client()
                .login_token("alice", "wonderland")
                .await
                .unwrap()
                .token
        };

        std::fs::remove_file(fixture.secret_key_file()).unwrap();

        let rotated = TestServer::start(&fixture).await.unwrap();
        let resp = rotated.client().verify_bearer(&token).await.unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_credential_file_edits_apply_without_restart() {
        let fixture = alice();
        let server = TestServer::start(&fixture).await.unwrap();
        let client = server.client();

        let carol = format!("carol:{}\n", bcrypt_hash("hunter2", 4).unwrap());
        std::fs::write(fixture.path().join("secrets"), carol).unwrap();

        assert_eq!(
            client.token("carol", "hunter2").await.unwrap().status(),
            StatusCode::OK
        );
        assert_eq!(
            client.token("alice", "wonderland").await.unwrap().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_concurrent_logins() {
        let fixture = alice();
        let server = TestServer::start(&fixture).await.unwrap();
        let base_url = server.base_url.clone();

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let base_url = base_url.clone();
                tokio::spawn(async move {
                    PortierClient::new(&base_url)
                        .login_token("alice", "wonderland")
                        .await
                        .unwrap()
                        .token
                })
            })
            .collect();

        let client = server.client();
        for handle in handles {
            let token = handle.await.unwrap();
            let resp = client.verify_bearer(&token).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }
    }
}
