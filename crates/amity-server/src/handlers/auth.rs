//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Body: [`ProviderLoginBody`]; provisions on first contact |
//! | `POST` | `/auth/login/basic` | Body: [`BasicLoginBody`] |
//! | `POST` | `/auth/refresh` | Body: [`RefreshBody`]; echoes the refresh token |
//! | `GET`  | `/auth/check` | Requires a bearer token |
//! | `POST` | `/auth/change-password` | Requires a bearer token; body: [`ChangePasswordBody`] |
//! | `POST` | `/auth/change-password-new-user` | Body: [`TempExchangeBody`] |

use amity_core::{account::Account, store::SocialStore};
use amity_notify::Notification;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{AppState, auth::AuthedUser, error::ApiError};

// ─── Response shape ───────────────────────────────────────────────────────────

/// Token pair plus the account, returned by every credential flow.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
  pub access_token:  String,
  pub refresh_token: String,
  pub user:          Account,
  pub is_new_user:   bool,
  /// Present only when this login just provisioned the account.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub temp_password: Option<String>,
  /// `true` while the account still runs on its temporary credential.
  pub require_password_change: bool,
}

impl AuthResponse {
  fn issue<S: SocialStore>(
    state: &AppState<S>,
    user: Account,
    is_new_user: bool,
    temp_password: Option<String>,
  ) -> Result<Self, ApiError> {
    let access_token = state.tokens.issue_access(&user)?;
    let refresh_token = state.tokens.issue_refresh(&user)?;
    let require_password_change = user.status.is_pending_password();
    Ok(Self {
      access_token,
      refresh_token,
      user,
      is_new_user,
      temp_password,
      require_password_change,
    })
  }
}

// ─── Provider login ───────────────────────────────────────────────────────────

/// Body for `POST /auth/login`: an email the identity provider has already
/// verified.
#[derive(Debug, Deserialize)]
pub struct ProviderLoginBody {
  pub email: String,
}

/// `POST /auth/login` — resolves the account for a provider-verified email,
/// provisioning one on first contact. A fresh account's temporary credential
/// is queued for mail delivery and included in the response.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<ProviderLoginBody>,
) -> Result<Json<AuthResponse>, ApiError>
where
  S: SocialStore,
{
  let provisioned = state.accounts.resolve_or_provision(&body.email).await?;
  if let Some(temp) = &provisioned.temp_credential {
    state.notify.enqueue(Notification::TempPassword {
      email:         provisioned.account.email.clone(),
      username:      provisioned.account.username.clone(),
      temp_password: temp.clone(),
    });
  }
  Ok(Json(AuthResponse::issue(
    &state,
    provisioned.account,
    provisioned.is_new,
    provisioned.temp_credential,
  )?))
}

// ─── Basic login ──────────────────────────────────────────────────────────────

/// Body for `POST /auth/login/basic`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicLoginBody {
  pub username_login: String,
  pub password_login: String,
}

/// `POST /auth/login/basic` — handle-and-password login for active accounts.
pub async fn login_basic<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<BasicLoginBody>,
) -> Result<Json<AuthResponse>, ApiError>
where
  S: SocialStore,
{
  let account = state
    .accounts
    .authenticate(&body.username_login, &body.password_login)
    .await?;
  Ok(Json(AuthResponse::issue(&state, account, false, None)?))
}

// ─── Refresh ──────────────────────────────────────────────────────────────────

/// Body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshBody {
  pub refresh_token: String,
}

/// `POST /auth/refresh` — verifies the refresh token, re-reads the account,
/// and answers with a fresh access token plus the same refresh token.
pub async fn refresh<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RefreshBody>,
) -> Result<Json<Value>, ApiError>
where
  S: SocialStore,
{
  let claims = state.tokens.verify(&body.refresh_token)?;
  let account = state.accounts.find_active(claims.sub).await?;
  let access_token = state.tokens.issue_access(&account)?;
  Ok(Json(json!({
    "accessToken":  access_token,
    "refreshToken": body.refresh_token,
  })))
}

// ─── Session check ────────────────────────────────────────────────────────────

/// `GET /auth/check`
pub async fn check<S>(user: AuthedUser) -> Json<Value>
where
  S: SocialStore,
{
  Json(json!({ "authenticated": true, "userId": user.id }))
}

// ─── Password changes ─────────────────────────────────────────────────────────

/// Body for `POST /auth/change-password`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
  pub current_password: String,
  pub new_password:     String,
  pub confirm_password: String,
}

/// `POST /auth/change-password` — re-checks the current credential and, on
/// success, answers with a fresh token pair.
pub async fn change_password<S>(
  State(state): State<AppState<S>>,
  user: AuthedUser,
  Json(body): Json<ChangePasswordBody>,
) -> Result<Json<AuthResponse>, ApiError>
where
  S: SocialStore,
{
  let account = state
    .accounts
    .change_password(
      user.id,
      &body.current_password,
      &body.new_password,
      &body.confirm_password,
    )
    .await?;
  Ok(Json(AuthResponse::issue(&state, account, false, None)?))
}

/// Body for `POST /auth/change-password-new-user`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempExchangeBody {
  pub email:            String,
  pub temp_password:    String,
  pub new_password:     String,
  pub confirm_password: String,
}

/// `POST /auth/change-password-new-user` — exchanges the mailed temporary
/// credential for a chosen one. No bearer token required; the temporary
/// credential itself is the proof.
pub async fn change_password_new_user<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<TempExchangeBody>,
) -> Result<Json<AuthResponse>, ApiError>
where
  S: SocialStore,
{
  let account = state
    .accounts
    .change_password_with_temp(
      &body.email,
      &body.temp_password,
      &body.new_password,
      &body.confirm_password,
    )
    .await?;
  Ok(Json(AuthResponse::issue(&state, account, false, None)?))
}
