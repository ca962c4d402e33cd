//! Integration tests driving the router over the in-memory store.

use std::{sync::Arc, time::Duration};

use amity_core::{
  graph::RelationshipManager,
  lifecycle::{AccountManager, DEFAULT_ROLE},
  memory::MemoryStore,
  otp::{OtpIssuer, OtpPurpose},
  token::TokenSigner,
};
use amity_notify::{LogNotifier, NotifyQueue};
use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, router};

struct Harness {
  state: AppState<MemoryStore>,
  codes: Arc<OtpIssuer>,
}

fn make_state() -> Harness {
  let store = Arc::new(MemoryStore::new());
  store.add_role(DEFAULT_ROLE);
  let codes = Arc::new(OtpIssuer::in_memory(Duration::from_secs(300)));
  let state = AppState {
    accounts: Arc::new(AccountManager::new(
      Arc::clone(&store),
      Arc::clone(&codes),
    )),
    friends:  Arc::new(RelationshipManager::new(store)),
    tokens:   Arc::new(TokenSigner::new(
      "test-secret",
      Duration::from_secs(3600),
      Duration::from_secs(7200),
    )),
    notify:   NotifyQueue::spawn(LogNotifier, 8),
  };
  Harness { state, codes }
}

async fn send(
  state: &AppState<MemoryStore>,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let request = match body {
    Some(body) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let response = router(state.clone()).oneshot(request).await.unwrap();
  let status = response.status();
  let bytes =
    axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

/// Provision an account through the login route; returns its id and the
/// mailed temporary credential.
async fn provisioned(h: &Harness, email: &str) -> (Uuid, String, String) {
  let (status, body) =
    send(&h.state, "POST", "/auth/login", None, Some(json!({ "email": email })))
      .await;
  assert_eq!(status, StatusCode::OK);
  let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
  (
    id,
    body["accessToken"].as_str().unwrap().to_string(),
    body["tempPassword"].as_str().unwrap().to_string(),
  )
}

/// Exchange a temporary credential for `new` and return the response body.
async fn exchange(h: &Harness, email: &str, temp: &str, new: &str) -> Value {
  let (status, body) = send(
    &h.state,
    "POST",
    "/auth/change-password-new-user",
    None,
    Some(json!({
      "email":           email,
      "tempPassword":    temp,
      "newPassword":     new,
      "confirmPassword": new,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  body
}

/// Provision and activate an account with the password `graph-pw`;
/// returns (id, access token, login handle).
async fn active_account(h: &Harness, email: &str) -> (Uuid, String, String) {
  let (id, _, temp) = provisioned(h, email).await;
  let body = exchange(h, email, &temp, "graph-pw").await;
  (
    id,
    body["accessToken"].as_str().unwrap().to_string(),
    body["user"]["username_login"].as_str().unwrap().to_string(),
  )
}

// ── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_answers_ok() {
  let h = make_state();
  let (status, body) = send(&h.state, "GET", "/health", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ok");
}

// ── Provider login ──────────────────────────────────────────────────────────

#[tokio::test]
async fn login_provisions_on_first_contact() {
  let h = make_state();
  let (status, body) = send(
    &h.state,
    "POST",
    "/auth/login",
    None,
    Some(json!({ "email": "ana@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["isNewUser"], true);
  assert_eq!(body["requirePasswordChange"], true);
  assert_eq!(body["tempPassword"].as_str().unwrap().len(), 8);
  assert!(body["accessToken"].is_string());
  assert!(body["refreshToken"].is_string());
  assert_eq!(body["user"]["status"], 2);
  assert_eq!(body["user"]["email"], "ana@example.com");
  assert_eq!(body["user"]["username"], "ana");
  // the credential never leaves through the account record
  assert!(body["user"].get("password_login").is_none());
}

#[tokio::test]
async fn login_again_finds_the_same_account() {
  let h = make_state();
  let (first_id, _, _) = provisioned(&h, "ana@example.com").await;

  let (status, body) = send(
    &h.state,
    "POST",
    "/auth/login",
    None,
    Some(json!({ "email": "ana@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["isNewUser"], false);
  assert_eq!(body["requirePasswordChange"], true);
  assert!(body.get("tempPassword").is_none());
  assert_eq!(body["user"]["id"], first_id.to_string());
}

#[tokio::test]
async fn login_rejects_a_blank_email() {
  let h = make_state();
  let (status, body) =
    send(&h.state, "POST", "/auth/login", None, Some(json!({ "email": "" })))
      .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

// ── Temporary-credential exchange ───────────────────────────────────────────

#[tokio::test]
async fn temp_exchange_then_basic_login() {
  let h = make_state();
  let (_, _, temp) = provisioned(&h, "ana@example.com").await;

  let body = exchange(&h, "ana@example.com", &temp, "s3cret-pw").await;
  assert_eq!(body["user"]["status"], 1);
  assert_eq!(body["requirePasswordChange"], false);
  let handle = body["user"]["username_login"].as_str().unwrap().to_string();

  let (status, body) = send(
    &h.state,
    "POST",
    "/auth/login/basic",
    None,
    Some(json!({ "usernameLogin": handle, "passwordLogin": "s3cret-pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["isNewUser"], false);

  // the spent temporary credential no longer opens the account
  let (status, _) = send(
    &h.state,
    "POST",
    "/auth/login/basic",
    None,
    Some(json!({ "usernameLogin": handle, "passwordLogin": temp })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn temp_exchange_rejects_a_mismatched_confirmation() {
  let h = make_state();
  let (_, _, temp) = provisioned(&h, "ana@example.com").await;

  let (status, _) = send(
    &h.state,
    "POST",
    "/auth/change-password-new-user",
    None,
    Some(json!({
      "email":           "ana@example.com",
      "tempPassword":    temp,
      "newPassword":     "one-pw",
      "confirmPassword": "other-pw",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn basic_login_rejects_unknown_credentials() {
  let h = make_state();
  let (status, body) = send(
    &h.state,
    "POST",
    "/auth/login/basic",
    None,
    Some(json!({ "usernameLogin": "nobody", "passwordLogin": "nope" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body["error"].is_string());
}

// ── Refresh and session check ───────────────────────────────────────────────

#[tokio::test]
async fn refresh_issues_a_fresh_access_token() {
  let h = make_state();
  let (_, _, temp) = provisioned(&h, "ana@example.com").await;
  let body = exchange(&h, "ana@example.com", &temp, "s3cret-pw").await;
  let refresh = body["refreshToken"].as_str().unwrap().to_string();

  let (status, body) = send(
    &h.state,
    "POST",
    "/auth/refresh",
    None,
    Some(json!({ "refreshToken": refresh })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["accessToken"].is_string());
  assert_eq!(body["refreshToken"].as_str(), Some(refresh.as_str()));

  let (status, _) = send(
    &h.state,
    "POST",
    "/auth/refresh",
    None,
    Some(json!({ "refreshToken": "not-a-token" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn check_reports_the_token_subject() {
  let h = make_state();
  let (id, token, _) = provisioned(&h, "ana@example.com").await;

  let (status, body) =
    send(&h.state, "GET", "/auth/check", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["authenticated"], true);
  assert_eq!(body["userId"], id.to_string());

  let (status, _) = send(&h.state, "GET", "/auth/check", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, _) =
    send(&h.state, "GET", "/auth/check", Some("garbage"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Authenticated password change ───────────────────────────────────────────

#[tokio::test]
async fn change_password_needs_the_current_one() {
  let h = make_state();
  let (_, token, _) = active_account(&h, "ana@example.com").await;

  let (status, _) = send(
    &h.state,
    "POST",
    "/auth/change-password",
    Some(&token),
    Some(json!({
      "currentPassword": "wrong",
      "newPassword":     "second-pw",
      "confirmPassword": "second-pw",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, body) = send(
    &h.state,
    "POST",
    "/auth/change-password",
    Some(&token),
    Some(json!({
      "currentPassword": "graph-pw",
      "newPassword":     "second-pw",
      "confirmPassword": "second-pw",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["accessToken"].is_string());
  assert!(body["refreshToken"].is_string());
}

#[tokio::test]
async fn change_password_requires_a_token() {
  let h = make_state();
  let (status, _) = send(
    &h.state,
    "POST",
    "/auth/change-password",
    None,
    Some(json!({
      "currentPassword": "a",
      "newPassword":     "b",
      "confirmPassword": "b",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Registration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_flow_end_to_end() {
  let h = make_state();

  let (status, body) = send(
    &h.state,
    "POST",
    "/register/check-email",
    None,
    Some(json!({ "email": "new@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["exists"], false);

  let (status, body) = send(
    &h.state,
    "POST",
    "/register/send-otp",
    None,
    Some(json!({ "email": "new@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["sent"], true);

  // The mailed code is never echoed over HTTP; mint the current one directly.
  let code = h.codes.generate("new@example.com", OtpPurpose::Register);

  let (status, body) = send(
    &h.state,
    "POST",
    "/register/verify-otp",
    None,
    Some(json!({ "email": "new@example.com", "otp": code })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["valid"], true);

  let (status, body) = send(
    &h.state,
    "POST",
    "/register/complete",
    None,
    Some(json!({
      "email":    "new@example.com",
      "otp":      code,
      "password": "chosen-pw",
      "username": "Newcomer",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["status"], 1);
  assert_eq!(body["username"], "Newcomer");
  assert_eq!(body["provider"], "email");

  let (status, body) = send(
    &h.state,
    "POST",
    "/register/check-email",
    None,
    Some(json!({ "email": "new@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["exists"], true);

  let (status, _) = send(
    &h.state,
    "POST",
    "/auth/login/basic",
    None,
    Some(json!({ "usernameLogin": "Newcomer", "passwordLogin": "chosen-pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_send_otp_refuses_a_taken_email() {
  let h = make_state();
  provisioned(&h, "ana@example.com").await;

  let (status, _) = send(
    &h.state,
    "POST",
    "/register/send-otp",
    None,
    Some(json!({ "email": "ana@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_complete_rejects_a_wrong_code() {
  let h = make_state();
  let code = h.codes.generate("new@example.com", OtpPurpose::Register);
  let wrong = if code == "000000" { "111111" } else { "000000" };

  let (status, _) = send(
    &h.state,
    "POST",
    "/register/complete",
    None,
    Some(json!({ "email": "new@example.com", "otp": wrong, "password": "pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Password reset ──────────────────────────────────────────────────────────

#[tokio::test]
async fn forgot_password_flow_resets_the_credential() {
  let h = make_state();
  let (_, _, handle) = active_account(&h, "ana@example.com").await;

  let (status, body) = send(
    &h.state,
    "POST",
    "/forgot-password/send-otp",
    None,
    Some(json!({ "email": "ana@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["sent"], true);

  let code = h.codes.generate("ana@example.com", OtpPurpose::Forgot);

  let (status, body) = send(
    &h.state,
    "POST",
    "/forgot-password/verify-otp",
    None,
    Some(json!({ "email": "ana@example.com", "otp": code })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["valid"], true);

  let (status, _) = send(
    &h.state,
    "POST",
    "/forgot-password/reset",
    None,
    Some(json!({
      "email":       "ana@example.com",
      "otp":         code,
      "newPassword": "reset-pw",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(
    &h.state,
    "POST",
    "/auth/login/basic",
    None,
    Some(json!({ "usernameLogin": handle, "passwordLogin": "reset-pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn forgot_send_otp_rejects_an_unknown_email() {
  let h = make_state();
  let (status, _) = send(
    &h.state,
    "POST",
    "/forgot-password/send-otp",
    None,
    Some(json!({ "email": "ghost@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Relationship graph ──────────────────────────────────────────────────────

#[tokio::test]
async fn follow_accept_status_listing_unfriend() {
  let h = make_state();
  let (ana, ana_token, _) = active_account(&h, "ana@example.com").await;
  let (bo, bo_token, _) = active_account(&h, "bo@example.com").await;

  let (status, edge) = send(
    &h.state,
    "POST",
    &format!("/friends/follow/{bo}"),
    Some(&ana_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(edge["state"], "Pending");
  assert_eq!(edge["from"], ana.to_string());
  assert_eq!(edge["to"], bo.to_string());
  let edge_id = edge["id"].as_i64().unwrap();

  // both views of the pending pair
  let (_, view) = send(
    &h.state,
    "GET",
    &format!("/friends/status/{bo}"),
    Some(&ana_token),
    None,
  )
  .await;
  assert_eq!(view["followStatus"], "pending_sent");
  let (_, view) = send(
    &h.state,
    "GET",
    &format!("/friends/status/{ana}"),
    Some(&bo_token),
    None,
  )
  .await;
  assert_eq!(view["followStatus"], "pending_received");

  // the recipient sees the request in their inbox
  let (_, page) =
    send(&h.state, "GET", "/friends/requests", Some(&bo_token), None).await;
  assert_eq!(page["count"], 1);
  assert_eq!(page["data"][0]["id"].as_i64(), Some(edge_id));

  // only the recipient may accept
  let (status, _) = send(
    &h.state,
    "PUT",
    &format!("/friends/accept/{edge_id}"),
    Some(&ana_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, edge) = send(
    &h.state,
    "PUT",
    &format!("/friends/accept/{edge_id}"),
    Some(&bo_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(edge["state"], "Done");

  // the derived view flips on both sides
  let (_, view) = send(
    &h.state,
    "GET",
    &format!("/friends/status/{bo}"),
    Some(&ana_token),
    None,
  )
  .await;
  assert_eq!(view["followStatus"], "following");
  let (_, view) = send(
    &h.state,
    "GET",
    &format!("/friends/status/{ana}"),
    Some(&bo_token),
    None,
  )
  .await;
  assert_eq!(view["followStatus"], "follower");

  // listings split by direction
  let (_, page) =
    send(&h.state, "GET", "/friends/following", Some(&ana_token), None).await;
  assert_eq!(page["count"], 1);
  assert_eq!(page["page"], 0);
  assert_eq!(page["size"], 10);
  let (_, page) = send(
    &h.state,
    "GET",
    &format!("/friends/followers/{bo}"),
    Some(&ana_token),
    None,
  )
  .await;
  assert_eq!(page["count"], 1);
  let (_, page) =
    send(&h.state, "GET", "/friends/followers", Some(&ana_token), None).await;
  assert_eq!(page["count"], 0);

  // either side may unfriend
  let (status, _) = send(
    &h.state,
    "DELETE",
    &format!("/friends/unfriend/{edge_id}"),
    Some(&bo_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, view) = send(
    &h.state,
    "GET",
    &format!("/friends/status/{bo}"),
    Some(&ana_token),
    None,
  )
  .await;
  assert_eq!(view["followStatus"], "none");
}

#[tokio::test]
async fn follow_guards_and_unfollow() {
  let h = make_state();
  let (ana, ana_token, _) = active_account(&h, "ana@example.com").await;
  let (bo, _, _) = active_account(&h, "bo@example.com").await;

  let (status, _) = send(
    &h.state,
    "POST",
    &format!("/friends/follow/{ana}"),
    Some(&ana_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) =
    send(&h.state, "POST", &format!("/friends/follow/{bo}"), None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, _) = send(
    &h.state,
    "POST",
    &format!("/friends/follow/{bo}"),
    Some(&ana_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  // a second request over the live pair is refused
  let (status, _) = send(
    &h.state,
    "POST",
    &format!("/friends/follow/{bo}"),
    Some(&ana_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = send(
    &h.state,
    "DELETE",
    &format!("/friends/unfollow/{bo}"),
    Some(&ana_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["removed"], true);

  // withdrawing again is a no-op, not an error
  let (status, body) = send(
    &h.state,
    "DELETE",
    &format!("/friends/unfollow/{bo}"),
    Some(&ana_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["removed"], false);
}

#[tokio::test]
async fn reject_clears_the_request() {
  let h = make_state();
  let (_, ana_token, _) = active_account(&h, "ana@example.com").await;
  let (bo, bo_token, _) = active_account(&h, "bo@example.com").await;

  let (_, edge) = send(
    &h.state,
    "POST",
    &format!("/friends/follow/{bo}"),
    Some(&ana_token),
    None,
  )
  .await;
  let edge_id = edge["id"].as_i64().unwrap();

  let (status, _) = send(
    &h.state,
    "PUT",
    &format!("/friends/reject/{edge_id}"),
    Some(&bo_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, view) = send(
    &h.state,
    "GET",
    &format!("/friends/status/{bo}"),
    Some(&ana_token),
    None,
  )
  .await;
  assert_eq!(view["followStatus"], "none");

  // the rejected edge is gone for good
  let (status, _) = send(
    &h.state,
    "PUT",
    &format!("/friends/accept/{edge_id}"),
    Some(&bo_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Account lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn deactivate_and_restore_an_account() {
  let h = make_state();
  let (ana, ana_token, handle) = active_account(&h, "ana@example.com").await;
  let (_, bo_token, _) = active_account(&h, "bo@example.com").await;

  // only the owner or an admin may touch the account
  let (status, _) = send(
    &h.state,
    "DELETE",
    &format!("/users/{ana}"),
    Some(&bo_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, body) = send(
    &h.state,
    "DELETE",
    &format!("/users/{ana}"),
    Some(&ana_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], 0);

  // deactivated accounts cannot log in
  let (status, _) = send(
    &h.state,
    "POST",
    "/auth/login/basic",
    None,
    Some(json!({ "usernameLogin": handle, "passwordLogin": "graph-pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  // tokens are stateless, so the owner can still restore
  let (status, body) = send(
    &h.state,
    "POST",
    &format!("/users/{ana}/restore"),
    Some(&ana_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], 1);

  let (status, _) = send(
    &h.state,
    "POST",
    "/auth/login/basic",
    None,
    Some(json!({ "usernameLogin": handle, "passwordLogin": "graph-pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
}
