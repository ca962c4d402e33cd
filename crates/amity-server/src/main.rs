//! amity server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), connects to the
//! PostgREST data API, and serves the JSON routes over HTTP. Environment
//! variables prefixed `AMITY_` override file settings, with `__` separating
//! nested keys (`AMITY_AUTH__JWT_SECRET=...`).

use std::{path::PathBuf, sync::Arc, time::Duration};

use amity_core::{
  graph::RelationshipManager,
  lifecycle::AccountManager,
  otp::OtpIssuer,
  token::TokenSigner,
};
use amity_notify::{LogNotifier, NotifyQueue, ResendNotifier};
use amity_server::{AppState, ServerConfig};
use amity_store_postgrest::{PostgrestConfig, PostgrestStore};
use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Amity account and relationship server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("AMITY").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Connect the record store.
  let store = Arc::new(
    PostgrestStore::new(PostgrestConfig {
      base_url: server_cfg.store.url.clone(),
      api_key:  server_cfg.store.api_key.clone(),
    })
    .context("failed to build PostgREST client")?,
  );

  // Outbound mail; log-only without an API key.
  let notify = match &server_cfg.email.resend_api_key {
    Some(key) => NotifyQueue::spawn(
      ResendNotifier::new(key.clone(), server_cfg.email.from.clone())
        .context("failed to build mail client")?,
      server_cfg.email.queue_capacity,
    ),
    None => NotifyQueue::spawn(LogNotifier, server_cfg.email.queue_capacity),
  };

  // Build application state.
  let codes = Arc::new(OtpIssuer::in_memory(Duration::from_secs(
    server_cfg.auth.otp_ttl_secs,
  )));
  let tokens = Arc::new(TokenSigner::new(
    server_cfg.auth.jwt_secret.clone(),
    Duration::from_secs(server_cfg.auth.access_ttl_secs),
    Duration::from_secs(server_cfg.auth.refresh_ttl_secs),
  ));
  let state = AppState {
    accounts: Arc::new(AccountManager::new(Arc::clone(&store), codes)),
    friends:  Arc::new(RelationshipManager::new(store)),
    tokens,
    notify,
  };

  let app = amity_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
