//! Handlers for `/register` and `/forgot-password` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/register/check-email` | Body: [`EmailBody`] |
//! | `POST` | `/register/send-otp` | Refuses taken emails; code travels by mail |
//! | `POST` | `/register/verify-otp` | Non-consuming probe |
//! | `POST` | `/register/complete` | Body: [`CompleteBody`]; 201 + the account |
//! | `POST` | `/forgot-password/send-otp` | 404 for unknown emails |
//! | `POST` | `/forgot-password/verify-otp` | Non-consuming probe |
//! | `POST` | `/forgot-password/reset` | Body: [`ResetBody`] |

use amity_core::{account::Account, otp::OtpPurpose, store::SocialStore};
use amity_notify::Notification;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};

// ─── Bodies ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EmailBody {
  pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  pub email: String,
  pub otp:   String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteBody {
  pub email:    String,
  pub otp:      String,
  pub password: String,
  /// Display name; defaults to one derived from the email when absent.
  pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetBody {
  pub email:        String,
  pub otp:          String,
  pub new_password: String,
}

// ─── Registration ─────────────────────────────────────────────────────────────

/// `POST /register/check-email`
pub async fn check_email<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<EmailBody>,
) -> Result<Json<Value>, ApiError>
where
  S: SocialStore,
{
  let exists = state.accounts.email_exists(&body.email).await?;
  Ok(Json(json!({ "exists": exists })))
}

/// `POST /register/send-otp` — issues a registration code and queues it for
/// mail delivery. The code never appears in the response.
pub async fn send_otp<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<EmailBody>,
) -> Result<Json<Value>, ApiError>
where
  S: SocialStore,
{
  let code = state.accounts.request_register_code(&body.email).await?;
  state.notify.enqueue(Notification::OtpCode {
    email: body.email,
    code,
    purpose: OtpPurpose::Register,
  });
  Ok(Json(json!({ "sent": true })))
}

/// `POST /register/verify-otp`
pub async fn verify_otp<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<VerifyBody>,
) -> Json<Value>
where
  S: SocialStore,
{
  let valid =
    state.accounts.verify_code(&body.email, &body.otp, OtpPurpose::Register);
  Json(json!({ "valid": valid }))
}

/// `POST /register/complete` — 201 + the stored account.
pub async fn complete<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<CompleteBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SocialStore,
{
  let account = state
    .accounts
    .register(&body.email, &body.otp, &body.password, body.username.as_deref())
    .await?;
  Ok((StatusCode::CREATED, Json(account)))
}

// ─── Password reset ───────────────────────────────────────────────────────────

/// `POST /forgot-password/send-otp`
pub async fn forgot_send_otp<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<EmailBody>,
) -> Result<Json<Value>, ApiError>
where
  S: SocialStore,
{
  let code = state.accounts.request_reset_code(&body.email).await?;
  state.notify.enqueue(Notification::OtpCode {
    email: body.email,
    code,
    purpose: OtpPurpose::Forgot,
  });
  Ok(Json(json!({ "sent": true })))
}

/// `POST /forgot-password/verify-otp`
pub async fn forgot_verify_otp<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<VerifyBody>,
) -> Json<Value>
where
  S: SocialStore,
{
  let valid =
    state.accounts.verify_code(&body.email, &body.otp, OtpPurpose::Forgot);
  Json(json!({ "valid": valid }))
}

/// `POST /forgot-password/reset`
pub async fn forgot_reset<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<ResetBody>,
) -> Result<Json<Account>, ApiError>
where
  S: SocialStore,
{
  let account = state
    .accounts
    .reset_password(&body.email, &body.otp, &body.new_password)
    .await?;
  Ok(Json(account))
}
