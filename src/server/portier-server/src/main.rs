//! Portier Server - Main entry point.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portier_api::AppState;
use portier_auth::config::{DEFAULT_CREDENTIALS_FILE, DEFAULT_SECRET_KEY_FILE};
use portier_auth::{AuthGateway, GatewayConfig};
use portier_credentials::HashScheme;

#[derive(Parser)]
#[command(name = "portier-server")]
#[command(about = "Portier - session authentication gateway")]
#[command(version)]
struct Cli {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0", env = "PORTIER_BIND_ADDRESS")]
    bind: String,

    /// Server port
    #[arg(short, long, default_value_t = 9111, env = "APP_PORT")]
    port: u16,

    /// Signing secret file (created on first start)
    #[arg(long, default_value = DEFAULT_SECRET_KEY_FILE, env = "SECRET_KEY_FILE")]
    secret_key_file: PathBuf,

    /// Credential file (`username:hash` per line)
    #[arg(long, default_value = DEFAULT_CREDENTIALS_FILE, env = "HTACCESS_FILE")]
    credentials_file: PathBuf,

    /// Lifetime of issued tokens, in seconds
    #[arg(long, default_value_t = 3600, env = "TOKEN_TTL_SECS")]
    token_ttl_secs: u64,

    /// Scheme assumed for hashes without a recognizable marker
    #[arg(long, default_value = "bcrypt", env = "DEFAULT_HASH_SCHEME")]
    default_scheme: HashScheme,
}

impl Cli {
    fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .bind
            .parse()
            .with_context(|| format!("invalid bind address {}", self.bind))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            secret_key_file: self.secret_key_file.clone(),
            credentials_file: self.credentials_file.clone(),
            token_ttl: Duration::from_secs(self.token_ttl_secs),
            default_scheme: self.default_scheme,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting Portier server...");

    let addr = cli.socket_addr()?;

    let gateway = AuthGateway::from_config(&cli.gateway_config())
        .context("failed to initialize authentication gateway")?;

    let state = AppState::new(gateway).context("failed to compile login page")?;
    let app = portier_api::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "Portier server started successfully");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
