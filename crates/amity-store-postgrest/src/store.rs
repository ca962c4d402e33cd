//! [`PostgrestStore`] — the PostgREST implementation of [`SocialStore`].

use std::fmt::Display;

use serde_json::json;
use uuid::Uuid;

use amity_core::{
  account::{Account, AccountStatus, NewAccount, Role},
  edge::{Edge, EdgeState, NewEdge},
  store::{EdgeQuery, SocialStore},
};

use crate::{
  Error, Result,
  client::{Postgrest, PostgrestConfig},
  wire::{AccountRow, EdgeRow, InsertAccount, InsertEdge, today},
};

const ACCOUNT: &str = "account";
const ROLE: &str = "role";
const FRIEND: &str = "friend";

/// Every account read embeds the role row.
const ACCOUNT_COLUMNS: &str = "*,role(*)";

fn eq<T: Display>(value: T) -> String {
  format!("eq.{value}")
}

/// The `or=` filter matching the pair in both directions.
pub(crate) fn either_direction(a: Uuid, b: Uuid) -> String {
  format!("(and(id_user.eq.{a},friend_id.eq.{b}),and(id_user.eq.{b},friend_id.eq.{a}))")
}

/// Query string for [`SocialStore::list_edges`]: optional equality filters
/// plus the live-row guard, newest first, windowed by limit/offset.
pub(crate) fn edge_params(query: &EdgeQuery) -> Vec<(&'static str, String)> {
  let mut params = Vec::new();
  if let Some(from) = query.from {
    params.push(("id_user", eq(from)));
  }
  if let Some(to) = query.to {
    params.push(("friend_id", eq(to)));
  }
  if let Some(state) = query.state {
    params.push(("status_fr", eq(state.as_str())));
  }
  params.push(("status", eq(1)));
  params.push(("order", "id.desc".to_string()));
  params.push(("limit", query.limit.to_string()));
  params.push(("offset", query.offset.to_string()));
  params
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The record store behind a PostgREST endpoint.
///
/// Cloning is cheap — the inner HTTP client is reference-counted.
#[derive(Clone)]
pub struct PostgrestStore {
  client: Postgrest,
}

impl PostgrestStore {
  pub fn new(config: PostgrestConfig) -> Result<Self> {
    Ok(Self { client: Postgrest::new(config)? })
  }

  async fn first_account(
    &self,
    query: Vec<(&'static str, String)>,
  ) -> Result<Option<Account>> {
    let rows: Vec<AccountRow> = self.client.select(ACCOUNT, &query).await?;
    Ok(rows.into_iter().next().map(Account::from))
  }

  /// PATCH `account` through `filters`; the first updated row, or `None`
  /// when the filter matched nothing.
  async fn patch_account(
    &self,
    mut filters: Vec<(&'static str, String)>,
    body: serde_json::Value,
  ) -> Result<Option<Account>> {
    filters.push(("select", ACCOUNT_COLUMNS.to_string()));
    let rows: Vec<AccountRow> = self.client.update(ACCOUNT, &filters, &body).await?;
    Ok(rows.into_iter().next().map(Account::from))
  }

  async fn patch_edge(
    &self,
    id: i64,
    body: serde_json::Value,
  ) -> Result<Option<Edge>> {
    let query = vec![("id", eq(id)), ("status", eq(1))];
    let rows: Vec<EdgeRow> = self.client.update(FRIEND, &query, &body).await?;
    Ok(rows.into_iter().next().map(Edge::from))
  }
}

// ─── SocialStore impl ────────────────────────────────────────────────────────

impl SocialStore for PostgrestStore {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn find_account(&self, id: Uuid) -> Result<Option<Account>> {
    self
      .first_account(vec![
        ("select", ACCOUNT_COLUMNS.to_string()),
        ("id", eq(id)),
        ("limit", "1".to_string()),
      ])
      .await
  }

  async fn find_active_account(&self, id: Uuid) -> Result<Option<Account>> {
    self
      .first_account(vec![
        ("select", ACCOUNT_COLUMNS.to_string()),
        ("id", eq(id)),
        ("status", eq(1)),
        ("limit", "1".to_string()),
      ])
      .await
  }

  async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
    self
      .first_account(vec![
        ("select", ACCOUNT_COLUMNS.to_string()),
        ("email", eq(email)),
        ("limit", "1".to_string()),
      ])
      .await
  }

  async fn find_account_by_login(
    &self,
    handle: &str,
    credential: &str,
  ) -> Result<Option<Account>> {
    self
      .first_account(vec![
        ("select", ACCOUNT_COLUMNS.to_string()),
        ("username_login", eq(handle)),
        ("password_login", eq(credential)),
        ("status", eq(1)),
        ("limit", "1".to_string()),
      ])
      .await
  }

  async fn insert_account(&self, input: NewAccount) -> Result<Option<Account>> {
    let payload = InsertAccount::from(input);
    let query = [("select", ACCOUNT_COLUMNS.to_string())];
    let rows: Option<Vec<AccountRow>> =
      self.client.insert(ACCOUNT, &query, &payload).await?;
    Ok(rows.and_then(|rows| rows.into_iter().next()).map(Account::from))
  }

  async fn update_credential(
    &self,
    id: Uuid,
    current: &str,
    new: &str,
  ) -> Result<Option<Account>> {
    self
      .patch_account(
        vec![("id", eq(id)), ("password_login", eq(current))],
        json!({ "password_login": new, "status": 1, "updateDate": today() }),
      )
      .await
  }

  async fn reset_pending_credential(
    &self,
    email: &str,
    temp: &str,
    new: &str,
  ) -> Result<Option<Account>> {
    self
      .patch_account(
        vec![
          ("email", eq(email)),
          ("password_login", eq(temp)),
          ("status", eq(2)),
        ],
        json!({ "password_login": new, "status": 1, "updateDate": today() }),
      )
      .await
  }

  async fn reset_credential(
    &self,
    email: &str,
    new: &str,
  ) -> Result<Option<Account>> {
    self
      .patch_account(
        vec![("email", eq(email))],
        json!({ "password_login": new, "updateDate": today() }),
      )
      .await
  }

  async fn set_account_status(
    &self,
    id: Uuid,
    status: AccountStatus,
  ) -> Result<Option<Account>> {
    self
      .patch_account(
        vec![("id", eq(id))],
        json!({ "status": status, "updateDate": today() }),
      )
      .await
  }

  // ── Roles ─────────────────────────────────────────────────────────────────

  async fn find_role(&self, name: &str) -> Result<Option<Role>> {
    let rows: Vec<Role> = self
      .client
      .select(ROLE, &[
        ("role", eq(name)),
        ("status", eq(1)),
        ("limit", "1".to_string()),
      ])
      .await?;
    Ok(rows.into_iter().next())
  }

  // ── Edges ─────────────────────────────────────────────────────────────────

  async fn find_edge(&self, id: i64) -> Result<Option<Edge>> {
    let rows: Vec<EdgeRow> = self
      .client
      .select(FRIEND, &[
        ("id", eq(id)),
        ("status", eq(1)),
        ("limit", "1".to_string()),
      ])
      .await?;
    Ok(rows.into_iter().next().map(Edge::from))
  }

  async fn find_edge_between(&self, from: Uuid, to: Uuid) -> Result<Option<Edge>> {
    let rows: Vec<EdgeRow> = self
      .client
      .select(FRIEND, &[
        ("id_user", eq(from)),
        ("friend_id", eq(to)),
        ("status", eq(1)),
        ("limit", "1".to_string()),
      ])
      .await?;
    Ok(rows.into_iter().next().map(Edge::from))
  }

  async fn any_edge_between(&self, a: Uuid, b: Uuid) -> Result<bool> {
    let rows: Vec<EdgeRow> = self
      .client
      .select(FRIEND, &[
        ("or", either_direction(a, b)),
        ("status", eq(1)),
        ("limit", "1".to_string()),
      ])
      .await?;
    Ok(!rows.is_empty())
  }

  async fn insert_edge(&self, input: NewEdge) -> Result<Option<Edge>> {
    let payload = InsertEdge::from(input);
    let rows: Option<Vec<EdgeRow>> =
      self.client.insert(FRIEND, &[], &payload).await?;
    Ok(rows.and_then(|rows| rows.into_iter().next()).map(Edge::from))
  }

  async fn set_edge_state(&self, id: i64, state: EdgeState) -> Result<Option<Edge>> {
    self.patch_edge(id, json!({ "status_fr": state.as_str() })).await
  }

  async fn soft_delete_edge(&self, id: i64) -> Result<Option<Edge>> {
    self.patch_edge(id, json!({ "status": 0 })).await
  }

  async fn list_edges(&self, query: &EdgeQuery) -> Result<Vec<Edge>> {
    let rows: Vec<EdgeRow> =
      self.client.select(FRIEND, &edge_params(query)).await?;
    Ok(rows.into_iter().map(Edge::from).collect())
  }
}
