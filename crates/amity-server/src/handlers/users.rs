//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `DELETE` | `/users/{id}` | Deactivate; the owner or an `ADMIN` token |
//! | `POST` | `/users/{id}/restore` | Reactivate; same rule |
//!
//! Tokens are stateless, so a deactivated owner can still restore their own
//! account with a token issued before the deactivation.

use amity_core::{account::Account, store::SocialStore};
use axum::{
  Json,
  extract::{Path, State},
};
use uuid::Uuid;

use crate::{AppState, auth::AuthedUser, error::ApiError};

fn allowed(user: &AuthedUser, id: Uuid) -> Result<(), ApiError> {
  if user.id == id || user.is_admin() {
    Ok(())
  } else {
    Err(ApiError::Forbidden)
  }
}

/// `DELETE /users/{id}` — flips the account to deactivated and returns it.
pub async fn soft_delete<S>(
  State(state): State<AppState<S>>,
  user: AuthedUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Account>, ApiError>
where
  S: SocialStore,
{
  allowed(&user, id)?;
  let account = state.accounts.soft_delete(id).await?;
  Ok(Json(account))
}

/// `POST /users/{id}/restore`
pub async fn restore<S>(
  State(state): State<AppState<S>>,
  user: AuthedUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Account>, ApiError>
where
  S: SocialStore,
{
  allowed(&user, id)?;
  let account = state.accounts.restore(id).await?;
  Ok(Json(account))
}
