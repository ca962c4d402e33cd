//! Account — the identity record at the centre of the lifecycle engine.
//!
//! An account is addressed by a single opaque [`Uuid`] everywhere; the login
//! handle and contact emails are attributes, never identifiers. The numeric
//! `status` column drives the provisioning state machine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle state of an account, stored as a bare integer.
///
/// Transitions: provisioning creates `PendingPassword` (provider flow) or
/// `Active` (register flow); exchanging the temporary credential moves
/// `PendingPassword` to `Active`; soft-delete moves any state to
/// `Deactivated`; restore moves back to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum AccountStatus {
  Deactivated,
  Active,
  /// Provisioned with a temporary credential that has not been exchanged yet.
  PendingPassword,
}

impl AccountStatus {
  pub fn is_active(&self) -> bool {
    matches!(self, Self::Active)
  }

  pub fn is_pending_password(&self) -> bool {
    matches!(self, Self::PendingPassword)
  }
}

impl From<AccountStatus> for i64 {
  fn from(status: AccountStatus) -> i64 {
    match status {
      AccountStatus::Deactivated => 0,
      AccountStatus::Active => 1,
      AccountStatus::PendingPassword => 2,
    }
  }
}

impl TryFrom<i64> for AccountStatus {
  type Error = String;

  fn try_from(value: i64) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Self::Deactivated),
      1 => Ok(Self::Active),
      2 => Ok(Self::PendingPassword),
      other => Err(format!("unknown account status: {other}")),
    }
  }
}

// ─── Role ────────────────────────────────────────────────────────────────────

/// Read-mostly reference data; the engine only ever resolves the default role
/// by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
  pub id:     Uuid,
  pub role:   String,
  pub status: i64,
}

// ─── Account ─────────────────────────────────────────────────────────────────

/// The identity record. The credential is compared by the store and never
/// serialized outward.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
  pub id:             Uuid,
  pub username_login: String,
  #[serde(skip_serializing)]
  pub password_login: String,
  /// Display name, distinct from the login handle.
  pub username:       String,
  pub email:          String,
  pub gmail:          Option<String>,
  /// Identity origin, e.g. `"google"` or `"email"`.
  pub provider:       String,
  /// Subject identifier at the upstream provider, when known.
  pub openid_sub:     Option<String>,
  pub email_verified: bool,
  pub role_id:        Option<Uuid>,
  /// Embedded role row when the read included it.
  pub role:           Option<Role>,
  pub status:         AccountStatus,
  #[serde(rename = "createDate")]
  pub create_date:    Option<NaiveDate>,
  #[serde(rename = "updateDate")]
  pub update_date:    Option<NaiveDate>,
}

// ─── NewAccount ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::SocialStore::insert_account`].
/// The id and both date columns are always set by the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
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
}
