//! Bearer-token extraction for protected routes.

use amity_core::store::SocialStore;
use axum::{
  extract::FromRequestParts,
  http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// The verified caller of a protected route, read from the
/// `Authorization: Bearer <token>` header.
///
/// Extraction rejects with 401 when the header is missing or malformed and
/// when the token fails verification. Handlers that need the full account
/// record still look it up themselves; most only need the subject id.
#[derive(Debug, Clone)]
pub struct AuthedUser {
  pub id:   Uuid,
  /// Uppercased role claim, when the token carries one.
  pub role: Option<String>,
}

impl AuthedUser {
  pub fn is_admin(&self) -> bool {
    self.role.as_deref() == Some("ADMIN")
  }
}

impl<S> FromRequestParts<AppState<S>> for AuthedUser
where
  S: SocialStore,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = parts
      .headers
      .get(header::AUTHORIZATION)
      .and_then(|value| value.to_str().ok())
      .and_then(|value| value.strip_prefix("Bearer "))
      .ok_or(ApiError::Unauthorized)?;
    let claims = state.tokens.verify(token)?;
    Ok(Self { id: claims.sub, role: claims.role })
  }
}
