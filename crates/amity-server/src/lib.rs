//! HTTP boundary for Amity.
//!
//! Exposes an axum [`Router`] over any [`SocialStore`], wiring the account
//! lifecycle and relationship-graph managers to the JSON routes the web
//! client calls.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::sync::Arc;

use amity_core::{
  graph::RelationshipManager,
  lifecycle::AccountManager,
  store::SocialStore,
  token::TokenSigner,
};
use amity_notify::NotifyQueue;
use axum::{
  Json,
  Router,
  routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` with
/// `AMITY_*` environment overrides. Every field has a default, so an empty
/// file yields a local dev server against a PostgREST on `localhost:3000`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:  String,
  pub port:  u16,
  pub store: StoreConfig,
  pub auth:  AuthConfig,
  pub email: EmailConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:  "127.0.0.1".to_string(),
      port:  8080,
      store: StoreConfig::default(),
      auth:  AuthConfig::default(),
      email: EmailConfig::default(),
    }
  }
}

/// Connection details for the PostgREST data API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  pub url:     String,
  pub api_key: String,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self { url: "http://localhost:3000".to_string(), api_key: String::new() }
  }
}

/// HS256 signing secret plus token and one-time-code lifetimes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
  pub jwt_secret:       String,
  pub access_ttl_secs:  u64,
  pub refresh_ttl_secs: u64,
  pub otp_ttl_secs:     u64,
}

impl Default for AuthConfig {
  fn default() -> Self {
    Self {
      jwt_secret:       String::new(),
      access_ttl_secs:  3600,
      refresh_ttl_secs: 7 * 24 * 3600,
      otp_ttl_secs:     300,
    }
  }
}

/// Outbound email. Without an API key the server logs mail instead of
/// sending it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
  pub resend_api_key: Option<String>,
  pub from:           String,
  pub queue_capacity: usize,
}

impl Default for EmailConfig {
  fn default() -> Self {
    Self {
      resend_api_key: None,
      from:           "Amity <onboarding@resend.dev>".to_string(),
      queue_capacity: 256,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: SocialStore> {
  pub accounts: Arc<AccountManager<S>>,
  pub friends:  Arc<RelationshipManager<S>>,
  pub tokens:   Arc<TokenSigner>,
  pub notify:   NotifyQueue,
}

// Not derived: that would require `S: Clone`, which stores need not be.
impl<S: SocialStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      accounts: Arc::clone(&self.accounts),
      friends:  Arc::clone(&self.friends),
      tokens:   Arc::clone(&self.tokens),
      notify:   self.notify.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SocialStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Sessions
    .route("/auth/login", post(handlers::auth::login::<S>))
    .route("/auth/login/basic", post(handlers::auth::login_basic::<S>))
    .route("/auth/refresh", post(handlers::auth::refresh::<S>))
    .route("/auth/check", get(handlers::auth::check::<S>))
    .route("/auth/change-password", post(handlers::auth::change_password::<S>))
    .route(
      "/auth/change-password-new-user",
      post(handlers::auth::change_password_new_user::<S>),
    )
    // Registration
    .route("/register/check-email", post(handlers::register::check_email::<S>))
    .route("/register/send-otp", post(handlers::register::send_otp::<S>))
    .route("/register/verify-otp", post(handlers::register::verify_otp::<S>))
    .route("/register/complete", post(handlers::register::complete::<S>))
    // Password reset
    .route(
      "/forgot-password/send-otp",
      post(handlers::register::forgot_send_otp::<S>),
    )
    .route(
      "/forgot-password/verify-otp",
      post(handlers::register::forgot_verify_otp::<S>),
    )
    .route("/forgot-password/reset", post(handlers::register::forgot_reset::<S>))
    // Relationship graph
    .route("/friends/follow/{user_id}", post(handlers::friends::follow::<S>))
    .route("/friends/accept/{id}", put(handlers::friends::accept::<S>))
    .route("/friends/reject/{id}", put(handlers::friends::reject::<S>))
    .route("/friends/unfollow/{user_id}", delete(handlers::friends::unfollow::<S>))
    .route("/friends/unfriend/{id}", delete(handlers::friends::unfriend::<S>))
    .route("/friends/status/{user_id}", get(handlers::friends::status::<S>))
    .route("/friends/requests", get(handlers::friends::requests::<S>))
    .route("/friends/followers", get(handlers::friends::followers::<S>))
    .route("/friends/followers/{user_id}", get(handlers::friends::followers_of::<S>))
    .route("/friends/following", get(handlers::friends::following::<S>))
    .route("/friends/following/{user_id}", get(handlers::friends::following_of::<S>))
    // Accounts
    .route("/users/{id}", delete(handlers::users::soft_delete::<S>))
    .route("/users/{id}/restore", post(handlers::users::restore::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// `GET /health`
async fn health() -> Json<Value> {
  Json(json!({ "status": "ok" }))
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests;
