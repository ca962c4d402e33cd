//! Handlers for `/friends` endpoints. Every route requires a bearer token.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/friends/follow/{user_id}` | 201 + the pending edge |
//! | `PUT`  | `/friends/accept/{id}` | Recipient only |
//! | `PUT`  | `/friends/reject/{id}` | Recipient only; 204 |
//! | `DELETE` | `/friends/unfollow/{user_id}` | Withdraw the caller's pending request |
//! | `DELETE` | `/friends/unfriend/{id}` | Either participant; 204 |
//! | `GET`  | `/friends/status/{user_id}` | Relationship as seen by the caller |
//! | `GET`  | `/friends/requests` | Pending requests sent to the caller |
//! | `GET`  | `/friends/followers[/{user_id}]` | Accepted incoming edges |
//! | `GET`  | `/friends/following[/{user_id}]` | Accepted outgoing edges |
//!
//! List routes page with `?page=` (zero-based) and `?size=`, newest first.

use amity_core::{edge::Edge, store::SocialStore};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{AppState, auth::AuthedUser, error::ApiError};

// ─── Paging ───────────────────────────────────────────────────────────────────

fn default_size() -> u32 {
  10
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
  #[serde(default)]
  pub page: u32,
  #[serde(default = "default_size")]
  pub size: u32,
}

/// One page of edges, newest first.
#[derive(Debug, Serialize)]
pub struct EdgePage {
  pub data:  Vec<Edge>,
  pub count: usize,
  pub page:  u32,
  pub size:  u32,
}

impl EdgePage {
  fn new(data: Vec<Edge>, params: &PageParams) -> Self {
    Self { count: data.len(), data, page: params.page, size: params.size }
  }
}

// ─── Mutations ────────────────────────────────────────────────────────────────

/// `POST /friends/follow/{user_id}` — 201 + the new pending edge.
pub async fn follow<S>(
  State(state): State<AppState<S>>,
  user: AuthedUser,
  Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SocialStore,
{
  let edge = state.friends.follow(user.id, user_id).await?;
  Ok((StatusCode::CREATED, Json(edge)))
}

/// `PUT /friends/accept/{id}`
pub async fn accept<S>(
  State(state): State<AppState<S>>,
  user: AuthedUser,
  Path(id): Path<i64>,
) -> Result<Json<Edge>, ApiError>
where
  S: SocialStore,
{
  let edge = state.friends.accept(id, user.id).await?;
  Ok(Json(edge))
}

/// `PUT /friends/reject/{id}`
pub async fn reject<S>(
  State(state): State<AppState<S>>,
  user: AuthedUser,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: SocialStore,
{
  state.friends.reject(id, user.id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /friends/unfollow/{user_id}` — reports whether a pending request
/// was actually withdrawn.
pub async fn unfollow<S>(
  State(state): State<AppState<S>>,
  user: AuthedUser,
  Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: SocialStore,
{
  let removed = state.friends.unfollow(user.id, user_id).await?;
  Ok(Json(json!({ "removed": removed })))
}

/// `DELETE /friends/unfriend/{id}`
pub async fn unfriend<S>(
  State(state): State<AppState<S>>,
  user: AuthedUser,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: SocialStore,
{
  state.friends.unfriend(id, user.id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Views ────────────────────────────────────────────────────────────────────

/// `GET /friends/status/{user_id}`
pub async fn status<S>(
  State(state): State<AppState<S>>,
  user: AuthedUser,
  Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: SocialStore,
{
  let status = state.friends.status(user.id, user_id).await?;
  Ok(Json(json!({ "followStatus": status })))
}

/// `GET /friends/requests?page=&size=`
pub async fn requests<S>(
  State(state): State<AppState<S>>,
  user: AuthedUser,
  Query(params): Query<PageParams>,
) -> Result<Json<EdgePage>, ApiError>
where
  S: SocialStore,
{
  let data = state
    .friends
    .pending_received(user.id, params.page, params.size)
    .await?;
  Ok(Json(EdgePage::new(data, &params)))
}

/// `GET /friends/followers?page=&size=`
pub async fn followers<S>(
  State(state): State<AppState<S>>,
  user: AuthedUser,
  Query(params): Query<PageParams>,
) -> Result<Json<EdgePage>, ApiError>
where
  S: SocialStore,
{
  let data = state.friends.followers(user.id, params.page, params.size).await?;
  Ok(Json(EdgePage::new(data, &params)))
}

/// `GET /friends/followers/{user_id}?page=&size=`
pub async fn followers_of<S>(
  State(state): State<AppState<S>>,
  _user: AuthedUser,
  Path(user_id): Path<Uuid>,
  Query(params): Query<PageParams>,
) -> Result<Json<EdgePage>, ApiError>
where
  S: SocialStore,
{
  let data = state.friends.followers(user_id, params.page, params.size).await?;
  Ok(Json(EdgePage::new(data, &params)))
}

/// `GET /friends/following?page=&size=`
pub async fn following<S>(
  State(state): State<AppState<S>>,
  user: AuthedUser,
  Query(params): Query<PageParams>,
) -> Result<Json<EdgePage>, ApiError>
where
  S: SocialStore,
{
  let data = state.friends.following(user.id, params.page, params.size).await?;
  Ok(Json(EdgePage::new(data, &params)))
}

/// `GET /friends/following/{user_id}?page=&size=`
pub async fn following_of<S>(
  State(state): State<AppState<S>>,
  _user: AuthedUser,
  Path(user_id): Path<Uuid>,
  Query(params): Query<PageParams>,
) -> Result<Json<EdgePage>, ApiError>
where
  S: SocialStore,
{
  let data = state.friends.following(user_id, params.page, params.size).await?;
  Ok(Json(EdgePage::new(data, &params)))
}
