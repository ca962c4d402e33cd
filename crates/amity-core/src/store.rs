//! The `SocialStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `amity-store-postgrest`
//! and the in-process [`crate::memory::MemoryStore`]). Engine layers and the
//! HTTP boundary depend on this abstraction, not on any concrete backend.
//!
//! Conditional writes return `Option`: `None` means the filter matched zero
//! rows (updates) or a uniqueness conflict (inserts). Callers decide what
//! that means; silent success on a zero-row update is never an option.

use std::future::Future;

use uuid::Uuid;

use crate::{
  account::{Account, AccountStatus, NewAccount, Role},
  edge::{Edge, EdgeState, NewEdge},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`SocialStore::list_edges`]. Only active edges are ever
/// listed, ordered by edge id descending (newest request first).
#[derive(Debug, Clone)]
pub struct EdgeQuery {
  /// Restrict to edges leaving this account.
  pub from:   Option<Uuid>,
  /// Restrict to edges arriving at this account.
  pub to:     Option<Uuid>,
  pub state:  Option<EdgeState>,
  pub limit:  usize,
  pub offset: usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the account and relationship record store.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SocialStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Retrieve an account by id regardless of status.
  fn find_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Retrieve an account by id, active accounts only.
  fn find_active_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Look up an account by email across all statuses, so deactivated and
  /// pending accounts are found rather than re-provisioned.
  fn find_account_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Credential check: login handle plus credential, active accounts only.
  fn find_account_by_login<'a>(
    &'a self,
    handle: &'a str,
    credential: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Persist a new account. Returns `None` when the email is already taken
  /// (store-level uniqueness), the created row otherwise.
  fn insert_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Set a new credential for `id`, filtered on the current credential.
  /// Activates the account and refreshes `updateDate` in the same write.
  /// `None` means the filter matched nothing — the credential changed
  /// underneath the caller.
  fn update_credential<'a>(
    &'a self,
    id: Uuid,
    current: &'a str,
    new: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Exchange a temporary credential: filtered on email, the temporary
  /// credential, and pending-password status; sets the new credential and
  /// activates the account in one write.
  fn reset_pending_credential<'a>(
    &'a self,
    email: &'a str,
    temp: &'a str,
    new: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Overwrite the credential for an email, leaving status untouched.
  /// Backs the forgot-password flow, which is guarded by a one-time code
  /// rather than the old credential.
  fn reset_credential<'a>(
    &'a self,
    email: &'a str,
    new: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Move an account to the given status (soft-delete and restore).
  fn set_account_status(
    &self,
    id: Uuid,
    status: AccountStatus,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  // ── Roles ─────────────────────────────────────────────────────────────

  /// Resolve an active role by name.
  fn find_role<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Role>, Self::Error>> + Send + 'a;

  // ── Edges ─────────────────────────────────────────────────────────────

  /// Retrieve an active edge by id. Soft-deleted rows are invisible.
  fn find_edge(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Edge>, Self::Error>> + Send + '_;

  /// The active edge for an exact ordered pair, if any.
  fn find_edge_between(
    &self,
    from: Uuid,
    to: Uuid,
  ) -> impl Future<Output = Result<Option<Edge>, Self::Error>> + Send + '_;

  /// Whether any active edge exists between two accounts in either
  /// direction.
  fn any_edge_between(
    &self,
    a: Uuid,
    b: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Persist a new edge. Returns `None` when an active edge for the same
  /// ordered pair already exists.
  fn insert_edge(
    &self,
    input: NewEdge,
  ) -> impl Future<Output = Result<Option<Edge>, Self::Error>> + Send + '_;

  /// Flip the request state of an active edge. `None` when the edge is
  /// missing or already soft-deleted.
  fn set_edge_state(
    &self,
    id: i64,
    state: EdgeState,
  ) -> impl Future<Output = Result<Option<Edge>, Self::Error>> + Send + '_;

  /// Soft-delete an active edge. The row stays behind as history; `None`
  /// when there was no active row to delete.
  fn soft_delete_edge(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Edge>, Self::Error>> + Send + '_;

  /// List active edges matching `query`, newest first.
  fn list_edges<'a>(
    &'a self,
    query: &'a EdgeQuery,
  ) -> impl Future<Output = Result<Vec<Edge>, Self::Error>> + Send + 'a;
}
