//! In-memory [`SocialStore`] backend.
//!
//! Backs the test suites and single-process deployments. Enforces the same
//! uniqueness rules the production store carries as indexes: one account per
//! email, one active edge per ordered pair.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Mutex, PoisonError},
};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  account::{Account, AccountStatus, NewAccount, Role},
  edge::{Edge, EdgeState, NewEdge},
  store::{EdgeQuery, SocialStore},
};

#[derive(Default)]
struct Tables {
  accounts:     HashMap<Uuid, Account>,
  roles:        Vec<Role>,
  /// Every edge ever written, soft-deleted rows included. Ids are assigned
  /// from `next_edge_id` and never reused.
  edges:        Vec<Edge>,
  next_edge_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
    self.tables.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Seed a role row; reference data has no write path through the trait.
  pub fn add_role(&self, name: &str) -> Role {
    let role = Role {
      id:     Uuid::new_v4(),
      role:   name.to_string(),
      status: 1,
    };
    self.lock().roles.push(role.clone());
    role
  }
}

impl SocialStore for MemoryStore {
  type Error = Infallible;

  async fn find_account(&self, id: Uuid) -> Result<Option<Account>, Infallible> {
    Ok(self.lock().accounts.get(&id).cloned())
  }

  async fn find_active_account(
    &self,
    id: Uuid,
  ) -> Result<Option<Account>, Infallible> {
    Ok(
      self
        .lock()
        .accounts
        .get(&id)
        .filter(|account| account.status.is_active())
        .cloned(),
    )
  }

  async fn find_account_by_email(
    &self,
    email: &str,
  ) -> Result<Option<Account>, Infallible> {
    Ok(
      self
        .lock()
        .accounts
        .values()
        .find(|account| account.email == email)
        .cloned(),
    )
  }

  async fn find_account_by_login(
    &self,
    handle: &str,
    credential: &str,
  ) -> Result<Option<Account>, Infallible> {
    Ok(
      self
        .lock()
        .accounts
        .values()
        .find(|account| {
          account.username_login == handle
            && account.password_login == credential
            && account.status.is_active()
        })
        .cloned(),
    )
  }

  async fn insert_account(
    &self,
    input: NewAccount,
  ) -> Result<Option<Account>, Infallible> {
    let mut tables = self.lock();
    if tables.accounts.values().any(|account| account.email == input.email) {
      return Ok(None);
    }
    let today = Utc::now().date_naive();
    let account = Account {
      id:             Uuid::new_v4(),
      username_login: input.username_login,
      password_login: input.password_login,
      username:       input.username,
      email:          input.email,
      gmail:          input.gmail,
      provider:       input.provider,
      openid_sub:     input.openid_sub,
      email_verified: input.email_verified,
      role_id:        Some(input.role_id),
      role:           tables.roles.iter().find(|r| r.id == input.role_id).cloned(),
      status:         input.status,
      create_date:    Some(today),
      update_date:    Some(today),
    };
    tables.accounts.insert(account.id, account.clone());
    Ok(Some(account))
  }

  async fn update_credential(
    &self,
    id: Uuid,
    current: &str,
    new: &str,
  ) -> Result<Option<Account>, Infallible> {
    let mut tables = self.lock();
    let Some(account) = tables.accounts.get_mut(&id) else {
      return Ok(None);
    };
    if account.password_login != current {
      return Ok(None);
    }
    account.password_login = new.to_string();
    account.status = AccountStatus::Active;
    account.update_date = Some(Utc::now().date_naive());
    Ok(Some(account.clone()))
  }

  async fn reset_pending_credential(
    &self,
    email: &str,
    temp: &str,
    new: &str,
  ) -> Result<Option<Account>, Infallible> {
    let mut tables = self.lock();
    let Some(account) = tables.accounts.values_mut().find(|account| {
      account.email == email
        && account.password_login == temp
        && account.status.is_pending_password()
    }) else {
      return Ok(None);
    };
    account.password_login = new.to_string();
    account.status = AccountStatus::Active;
    account.update_date = Some(Utc::now().date_naive());
    Ok(Some(account.clone()))
  }

  async fn reset_credential(
    &self,
    email: &str,
    new: &str,
  ) -> Result<Option<Account>, Infallible> {
    let mut tables = self.lock();
    let Some(account) =
      tables.accounts.values_mut().find(|account| account.email == email)
    else {
      return Ok(None);
    };
    account.password_login = new.to_string();
    account.update_date = Some(Utc::now().date_naive());
    Ok(Some(account.clone()))
  }

  async fn set_account_status(
    &self,
    id: Uuid,
    status: AccountStatus,
  ) -> Result<Option<Account>, Infallible> {
    let mut tables = self.lock();
    let Some(account) = tables.accounts.get_mut(&id) else {
      return Ok(None);
    };
    account.status = status;
    account.update_date = Some(Utc::now().date_naive());
    Ok(Some(account.clone()))
  }

  async fn find_role(&self, name: &str) -> Result<Option<Role>, Infallible> {
    Ok(
      self
        .lock()
        .roles
        .iter()
        .find(|role| role.role == name && role.status == 1)
        .cloned(),
    )
  }

  async fn find_edge(&self, id: i64) -> Result<Option<Edge>, Infallible> {
    Ok(
      self
        .lock()
        .edges
        .iter()
        .find(|edge| edge.id == id && edge.active)
        .copied(),
    )
  }

  async fn find_edge_between(
    &self,
    from: Uuid,
    to: Uuid,
  ) -> Result<Option<Edge>, Infallible> {
    Ok(
      self
        .lock()
        .edges
        .iter()
        .find(|edge| edge.active && edge.from == from && edge.to == to)
        .copied(),
    )
  }

  async fn any_edge_between(&self, a: Uuid, b: Uuid) -> Result<bool, Infallible> {
    Ok(self.lock().edges.iter().any(|edge| {
      edge.active
        && ((edge.from == a && edge.to == b) || (edge.from == b && edge.to == a))
    }))
  }

  async fn insert_edge(&self, input: NewEdge) -> Result<Option<Edge>, Infallible> {
    let mut tables = self.lock();
    let duplicate = tables
      .edges
      .iter()
      .any(|edge| edge.active && edge.from == input.from && edge.to == input.to);
    if duplicate {
      return Ok(None);
    }
    tables.next_edge_id += 1;
    let edge = Edge {
      id:     tables.next_edge_id,
      from:   input.from,
      to:     input.to,
      state:  input.state,
      active: true,
    };
    tables.edges.push(edge);
    Ok(Some(edge))
  }

  async fn set_edge_state(
    &self,
    id: i64,
    state: EdgeState,
  ) -> Result<Option<Edge>, Infallible> {
    let mut tables = self.lock();
    let Some(edge) =
      tables.edges.iter_mut().find(|edge| edge.id == id && edge.active)
    else {
      return Ok(None);
    };
    edge.state = state;
    Ok(Some(*edge))
  }

  async fn soft_delete_edge(&self, id: i64) -> Result<Option<Edge>, Infallible> {
    let mut tables = self.lock();
    let Some(edge) =
      tables.edges.iter_mut().find(|edge| edge.id == id && edge.active)
    else {
      return Ok(None);
    };
    edge.active = false;
    Ok(Some(*edge))
  }

  async fn list_edges(&self, query: &EdgeQuery) -> Result<Vec<Edge>, Infallible> {
    let tables = self.lock();
    let mut matches: Vec<Edge> = tables
      .edges
      .iter()
      .filter(|edge| edge.active)
      .filter(|edge| query.from.is_none_or(|from| edge.from == from))
      .filter(|edge| query.to.is_none_or(|to| edge.to == to))
      .filter(|edge| query.state.is_none_or(|state| edge.state == state))
      .copied()
      .collect();
    matches.sort_by(|a, b| b.id.cmp(&a.id));
    Ok(matches.into_iter().skip(query.offset).take(query.limit).collect())
  }
}
