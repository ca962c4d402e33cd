//! Row types for the `account`, `role`, and `friend` tables.
//!
//! Column names follow the schema: the follow graph lives in `friend` with
//! `id_user` as the sender, `friend_id` as the recipient, `status_fr` as the
//! request state, and `status` as the soft-delete flag.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use amity_core::{
  account::{Account, AccountStatus, NewAccount, Role},
  edge::{Edge, EdgeState, NewEdge},
};

pub fn today() -> NaiveDate {
  Utc::now().date_naive()
}

// ─── account ─────────────────────────────────────────────────────────────────

/// An `account` row as PostgREST returns it, with the role embedded when the
/// read selected `*,role(*)`.
#[derive(Debug, Deserialize)]
pub struct AccountRow {
  pub id:             Uuid,
  pub username_login: String,
  pub password_login: String,
  pub username:       String,
  pub email:          String,
  pub gmail:          Option<String>,
  pub provider:       String,
  pub openid_sub:     Option<String>,
  pub email_verified: bool,
  pub role_id:        Option<Uuid>,
  #[serde(default)]
  pub role:           Option<Role>,
  pub status:         AccountStatus,
  #[serde(rename = "createDate")]
  pub create_date:    Option<NaiveDate>,
  #[serde(rename = "updateDate")]
  pub update_date:    Option<NaiveDate>,
}

impl From<AccountRow> for Account {
  fn from(row: AccountRow) -> Account {
    Account {
      id:             row.id,
      username_login: row.username_login,
      password_login: row.password_login,
      username:       row.username,
      email:          row.email,
      gmail:          row.gmail,
      provider:       row.provider,
      openid_sub:     row.openid_sub,
      email_verified: row.email_verified,
      role_id:        row.role_id,
      role:           row.role,
      status:         row.status,
      create_date:    row.create_date,
      update_date:    row.update_date,
    }
  }
}

/// Insert payload for `account`. The id and both date columns are assigned
/// here so the write is complete in one round trip.
#[derive(Debug, Serialize)]
pub struct InsertAccount {
  pub id:             Uuid,
  pub username_login: String,
  pub password_login: String,
  pub username:       String,
  pub email:          String,
  pub gmail:          Option<String>,
  pub provider:       String,
  pub openid_sub:     Option<String>,
  pub email_verified: bool,
  pub role_id:        Uuid,
  pub status:         AccountStatus,
  #[serde(rename = "createDate")]
  pub create_date:    NaiveDate,
  #[serde(rename = "updateDate")]
  pub update_date:    NaiveDate,
}

impl From<NewAccount> for InsertAccount {
  fn from(input: NewAccount) -> InsertAccount {
    let date = today();
    InsertAccount {
      id:             Uuid::new_v4(),
      username_login: input.username_login,
      password_login: input.password_login,
      username:       input.username,
      email:          input.email,
      gmail:          input.gmail,
      provider:       input.provider,
      openid_sub:     input.openid_sub,
      email_verified: input.email_verified,
      role_id:        input.role_id,
      status:         input.status,
      create_date:    date,
      update_date:    date,
    }
  }
}

// ─── friend ──────────────────────────────────────────────────────────────────

/// A `friend` row. `status` is `1` for live rows and `0` once soft-deleted.
#[derive(Debug, Deserialize)]
pub struct EdgeRow {
  pub id:        i64,
  pub id_user:   Uuid,
  pub friend_id: Uuid,
  pub status_fr: EdgeState,
  pub status:    i64,
}

impl From<EdgeRow> for Edge {
  fn from(row: EdgeRow) -> Edge {
    Edge {
      id:     row.id,
      from:   row.id_user,
      to:     row.friend_id,
      state:  row.status_fr,
      active: row.status == 1,
    }
  }
}

/// Insert payload for `friend`. The id is a database identity column and is
/// read back from the representation.
#[derive(Debug, Serialize)]
pub struct InsertEdge {
  pub id_user:   Uuid,
  pub friend_id: Uuid,
  pub status_fr: EdgeState,
  pub status:    i64,
}

impl From<NewEdge> for InsertEdge {
  fn from(input: NewEdge) -> InsertEdge {
    InsertEdge {
      id_user:   input.from,
      friend_id: input.to,
      status_fr: input.state,
      status:    1,
    }
  }
}
