//! Account lifecycle — provisioning, credential exchange, registration,
//! and soft-delete.
//!
//! Every flow that was once read-then-write races on the store now ends in a
//! conditional write; a write that matches zero rows surfaces as an error,
//! never as silent success.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::{
  Error, Result,
  account::{Account, AccountStatus, NewAccount, Role},
  otp::{OtpIssuer, OtpPurpose},
  store::SocialStore,
};

/// Name of the role granted to every account the engine provisions.
pub const DEFAULT_ROLE: &str = "User";

const TEMP_CREDENTIAL_LEN: usize = 8;
const TEMP_CREDENTIAL_ALPHABET: &[u8] =
  b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Outcome of [`AccountManager::resolve_or_provision`]. The temporary
/// credential is only ever present for a freshly provisioned account; it is
/// the boundary's job to get it to the owner.
#[derive(Debug, Clone)]
pub struct Provisioned {
  pub account:         Account,
  pub is_new:          bool,
  pub temp_credential: Option<String>,
}

pub struct AccountManager<S> {
  store: Arc<S>,
  codes: Arc<OtpIssuer>,
}

impl<S: SocialStore> AccountManager<S> {
  pub fn new(store: Arc<S>, codes: Arc<OtpIssuer>) -> Self {
    Self { store, codes }
  }

  // ── Provider login ────────────────────────────────────────────────────

  /// Find the account for a provider-verified email, creating it on first
  /// contact. Lookup spans all statuses so a deactivated account is found,
  /// not duplicated. Losing the insert race to a concurrent login resolves
  /// to the winner's row, keeping the operation idempotent per email.
  pub async fn resolve_or_provision(&self, email: &str) -> Result<Provisioned> {
    require("email", email)?;

    if let Some(account) =
      self.store.find_account_by_email(email).await.map_err(Error::store)?
    {
      return Ok(Provisioned { account, is_new: false, temp_credential: None });
    }

    let role = self.default_role().await?;
    let local = local_part(email);
    let temp = generate_credential();
    let input = NewAccount {
      username_login: format!("{local}_{}", Utc::now().timestamp_millis()),
      password_login: temp.clone(),
      username:       local.to_string(),
      email:          email.to_string(),
      gmail:          Some(email.to_string()),
      provider:       "google".to_string(),
      openid_sub:     None,
      email_verified: true,
      role_id:        role.id,
      status:         AccountStatus::PendingPassword,
    };

    match self.store.insert_account(input).await.map_err(Error::store)? {
      Some(account) => {
        Ok(Provisioned { account, is_new: true, temp_credential: Some(temp) })
      }
      // lost the provisioning race; return the row that beat us
      None => self
        .store
        .find_account_by_email(email)
        .await
        .map_err(Error::store)?
        .map(|account| Provisioned {
          account,
          is_new: false,
          temp_credential: None,
        })
        .ok_or_else(|| Error::EmailTaken(email.to_string())),
    }
  }

  // ── Password login ────────────────────────────────────────────────────

  /// Credential login against active accounts only. Pending accounts must
  /// exchange their temporary credential first; deactivated accounts are
  /// indistinguishable from bad credentials.
  pub async fn authenticate(
    &self,
    handle: &str,
    credential: &str,
  ) -> Result<Account> {
    require("username_login", handle)?;
    require("password_login", credential)?;
    self
      .store
      .find_account_by_login(handle, credential)
      .await
      .map_err(Error::store)?
      .ok_or(Error::InvalidCredentials)
  }

  /// Fetch an active account by id; backs the token refresh flow.
  pub async fn find_active(&self, id: Uuid) -> Result<Account> {
    self
      .store
      .find_active_account(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::AccountNotFound(id))
  }

  // ── Credential changes ────────────────────────────────────────────────

  /// Authenticated password change. The final write is filtered on the
  /// current credential, so two concurrent changes cannot both win.
  pub async fn change_password(
    &self,
    id: Uuid,
    current: &str,
    new: &str,
    confirm: &str,
  ) -> Result<Account> {
    require("current_password", current)?;
    require("new_password", new)?;
    require("confirm_password", confirm)?;

    let account = self
      .store
      .find_account(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::AccountNotFound(id))?;
    if account.password_login != current {
      return Err(Error::InvalidCredentials);
    }
    if new != confirm {
      return Err(Error::ConfirmationMismatch);
    }

    self
      .store
      .update_credential(id, current, new)
      .await
      .map_err(Error::store)?
      .ok_or(Error::InvalidCredentials)
  }

  /// Unauthenticated temporary-credential exchange: one conditional write
  /// filtered on email, the temporary credential, and pending status. A
  /// zero-row match means any of the three was wrong; the caller learns no
  /// more than that.
  pub async fn change_password_with_temp(
    &self,
    email: &str,
    temp: &str,
    new: &str,
    confirm: &str,
  ) -> Result<Account> {
    require("email", email)?;
    require("temp_password", temp)?;
    require("new_password", new)?;
    require("confirm_password", confirm)?;
    if new != confirm {
      return Err(Error::ConfirmationMismatch);
    }

    self
      .store
      .reset_pending_credential(email, temp, new)
      .await
      .map_err(Error::store)?
      .ok_or(Error::InvalidCredentials)
  }

  // ── One-time-code flows ───────────────────────────────────────────────

  /// Whether any account, in any status, already owns this email.
  pub async fn email_exists(&self, email: &str) -> Result<bool> {
    require("email", email)?;
    Ok(
      self
        .store
        .find_account_by_email(email)
        .await
        .map_err(Error::store)?
        .is_some(),
    )
  }

  /// Issue a registration code; refuses emails that already have an
  /// account in any status. Returns the code for the boundary to dispatch.
  pub async fn request_register_code(&self, email: &str) -> Result<String> {
    require("email", email)?;
    if self
      .store
      .find_account_by_email(email)
      .await
      .map_err(Error::store)?
      .is_some()
    {
      return Err(Error::EmailTaken(email.to_string()));
    }
    Ok(self.codes.generate(email, OtpPurpose::Register))
  }

  /// Issue a password-reset code; the email must belong to an account.
  pub async fn request_reset_code(&self, email: &str) -> Result<String> {
    require("email", email)?;
    if self
      .store
      .find_account_by_email(email)
      .await
      .map_err(Error::store)?
      .is_none()
    {
      return Err(Error::EmailNotFound(email.to_string()));
    }
    Ok(self.codes.generate(email, OtpPurpose::Forgot))
  }

  /// Non-consuming probe so a client can check a code before submitting
  /// the full form.
  pub fn verify_code(&self, email: &str, code: &str, purpose: OtpPurpose) -> bool {
    self.codes.verify(email, code, purpose)
  }

  /// Complete registration: the code is re-verified here and consumed only
  /// after the insert succeeds, so a failed attempt can be retried with
  /// the same code.
  pub async fn register(
    &self,
    email: &str,
    code: &str,
    credential: &str,
    display_name: Option<&str>,
  ) -> Result<Account> {
    require("email", email)?;
    require("otp", code)?;
    require("password", credential)?;
    if !self.codes.verify(email, code, OtpPurpose::Register) {
      return Err(Error::InvalidCode);
    }

    let role = self.default_role().await?;
    let username = match display_name {
      Some(name) if !name.trim().is_empty() => name.to_string(),
      _ => format!("{}_{}", local_part(email), Utc::now().timestamp_millis()),
    };
    let input = NewAccount {
      username_login: username.clone(),
      password_login: credential.to_string(),
      username,
      email: email.to_string(),
      gmail: Some(email.to_string()),
      provider: "email".to_string(),
      openid_sub: None,
      email_verified: true,
      role_id: role.id,
      status: AccountStatus::Active,
    };

    let account = self
      .store
      .insert_account(input)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::EmailTaken(email.to_string()))?;
    self.codes.consume(email);
    Ok(account)
  }

  /// Forgot-password reset: guarded by a forgot code instead of the old
  /// credential. Status is left untouched; the code is consumed on
  /// success.
  pub async fn reset_password(
    &self,
    email: &str,
    code: &str,
    new: &str,
  ) -> Result<Account> {
    require("email", email)?;
    require("otp", code)?;
    require("new_password", new)?;
    if !self.codes.verify(email, code, OtpPurpose::Forgot) {
      return Err(Error::InvalidCode);
    }

    let account = self
      .store
      .reset_credential(email, new)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::EmailNotFound(email.to_string()))?;
    self.codes.consume(email);
    Ok(account)
  }

  // ── Soft delete ───────────────────────────────────────────────────────

  pub async fn soft_delete(&self, id: Uuid) -> Result<Account> {
    self
      .store
      .set_account_status(id, AccountStatus::Deactivated)
      .await
      .map_err(Error::store)?
      .ok_or(Error::AccountNotFound(id))
  }

  pub async fn restore(&self, id: Uuid) -> Result<Account> {
    self
      .store
      .set_account_status(id, AccountStatus::Active)
      .await
      .map_err(Error::store)?
      .ok_or(Error::AccountNotFound(id))
  }

  async fn default_role(&self) -> Result<Role> {
    self
      .store
      .find_role(DEFAULT_ROLE)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::RoleUnavailable(DEFAULT_ROLE.to_string()))
  }
}

fn require(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::MissingField(field));
  }
  Ok(())
}

fn local_part(email: &str) -> &str {
  email.split_once('@').map(|(local, _)| local).unwrap_or(email)
}

fn generate_credential() -> String {
  let mut rng = rand::thread_rng();
  (0..TEMP_CREDENTIAL_LEN)
    .map(|_| {
      TEMP_CREDENTIAL_ALPHABET[rng.gen_range(0..TEMP_CREDENTIAL_ALPHABET.len())]
        as char
    })
    .collect()
}
