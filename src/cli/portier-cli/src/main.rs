//! Portier CLI - Command line interface.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use portier_credentials::{bcrypt_hash, HashScheme};

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "portier")]
#[command(about = "Portier CLI - Hash credentials and talk to a Portier gateway")]
#[command(version)]
struct Cli {
    /// Portier server address
    #[arg(long, default_value = "http://localhost:9111", env = "PORTIER_ADDR")]
    addr: String,

    /// Session token
    #[arg(long, env = "PORTIER_TOKEN", global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a credential file line for a user
    Hash {
        /// Username
        username: String,
        /// Hash scheme (bcrypt, apr1 or argon2)
        #[arg(long, default_value = "bcrypt")]
        scheme: HashScheme,
        /// Password (or read from stdin if not provided)
        #[arg(long)]
        password: Option<String>,
        /// bcrypt cost factor
        #[arg(long)]
        cost: Option<u32>,
    },
    /// Obtain a session token
    Login {
        /// Username
        #[arg(long)]
        username: String,
        /// Password (or read from stdin if not provided)
        #[arg(long)]
        password: Option<String>,
    },
    /// Check a session token
    Verify,
    /// Check server status
    Status,
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
    expires_at: u64,
}

#[derive(Debug, Deserialize)]
struct ClaimsResponse {
    sub: String,
    iat: u64,
    exp: u64,
}

// ============================================================================
// HTTP Client
// ============================================================================

struct PortierClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl PortierClient {
    fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn ensure_success(resp: Response, action: &str) -> Result<Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let error: ErrorResponse = resp.json().await.unwrap_or(ErrorResponse {
            message: "Unknown error".into(),
        });
        bail!("{} failed ({}): {}", action, status, error.message);
    }

    async fn get_health(&self) -> Result<HealthResponse> {
        let resp = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .context("Failed to connect to server")?;

        let resp = Self::ensure_success(resp, "Health check").await?;
        resp.json().await.context("Failed to parse response")
    }

    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let resp = self
            .client
            .post(self.url("/token"))
            .json(&TokenRequest { username, password })
            .send()
            .await
            .context("Failed to connect to server")?;

        let resp = Self::ensure_success(resp, "Login").await?;
        resp.json().await.context("Failed to parse response")
    }

    async fn verify(&self) -> Result<ClaimsResponse> {
        let token = self
            .token
            .as_ref()
            .context("Session token required. Set PORTIER_TOKEN or use --token")?;

        let resp = self
            .client
            .get(self.url("/verify"))
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to connect to server")?;

        let resp = Self::ensure_success(resp, "Verify").await?;
        resp.json().await.context("Failed to parse response")
    }
}

// ============================================================================
// Commands
// ============================================================================

fn read_password(password: Option<String>) -> Result<String> {
    let password = match password {
        Some(p) => p,
        None => {
            eprint!("Password: ");
            io::stderr().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        },
    };

    if password.is_empty() {
        bail!("Password cannot be empty");
    }

    Ok(password)
}

fn credential_line(
    username: &str,
    scheme: HashScheme,
    password: &str,
    cost: Option<u32>,
) -> Result<String> {
    if username.is_empty() || username.contains(':') {
        bail!("Username must be non-empty and must not contain ':'");
    }

    if matches!(scheme, HashScheme::Plaintext | HashScheme::Digest(_)) {
        bail!(
            "{} hashes carry no scheme marker and only verify when the server runs with \
             DEFAULT_HASH_SCHEME={}; use bcrypt, apr1 or argon2",
            scheme,
            scheme
        );
    }

    let hash = match (scheme, cost) {
        (HashScheme::Bcrypt, Some(cost)) => bcrypt_hash(password, cost)?,
        (_, Some(_)) => bail!("--cost only applies to bcrypt"),
        (scheme, None) => scheme.hash(password)?,
    };

    Ok(format!("{}:{}", username, hash))
}

fn cmd_hash(
    username: &str,
    scheme: HashScheme,
    password: Option<String>,
    cost: Option<u32>,
) -> Result<()> {
    let password = read_password(password)?;
    println!("{}", credential_line(username, scheme, &password, cost)?);
    Ok(())
}

async fn cmd_login(client: &PortierClient, username: &str, password: Option<String>) -> Result<()> {
    let password = read_password(password)?;
    let result = client.login(username, &password).await?;

    println!("{}", result.token);
    eprintln!("Expires at: {} (Unix seconds)", result.expires_at);

    Ok(())
}

async fn cmd_verify(client: &PortierClient) -> Result<()> {
    let claims = client.verify().await?;

    println!("Token is valid:");
    println!("  Subject:    {}", claims.sub);
    println!("  Issued at:  {}", claims.iat);
    println!("  Expires at: {}", claims.exp);

    Ok(())
}

async fn cmd_status(client: &PortierClient) -> Result<()> {
    let health = client.get_health().await?;

    println!("Portier server status:");
    println!("  Status:  {}", health.status);
    println!("  Version: {}", health.version);

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = PortierClient::new(&cli.addr, cli.token)?;

    match cli.command {
        Commands::Hash {
            username,
            scheme,
            password,
            cost,
        } => cmd_hash(&username, scheme, password, cost),
        Commands::Login { username, password } => cmd_login(&client, &username, password).await,
        Commands::Verify => cmd_verify(&client).await,
        Commands::Status => cmd_status(&client).await,
    }
}
