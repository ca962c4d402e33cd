//! Relationship edges — directed follow requests and the derived
//! relationship view.
//!
//! An edge is created by a follow request and only ever soft-deleted; ids are
//! store-assigned and never reused. The five-way [`RelationshipStatus`] is
//! computed on read from the two directed edges between a pair of accounts —
//! it is never stored.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Edge state ──────────────────────────────────────────────────────────────

/// Request state of an edge, stored as the exact strings `"Pending"` and
/// `"Done"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeState {
  Pending,
  Done,
}

impl EdgeState {
  /// The string persisted in the `status_fr` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Pending => "Pending",
      Self::Done => "Done",
    }
  }
}

// ─── Edge ────────────────────────────────────────────────────────────────────

/// A directed follow edge. `active` is the soft-delete flag (`1`/`0` on the
/// wire); inactive rows are history and are excluded from every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
  pub id:     i64,
  pub from:   Uuid,
  pub to:     Uuid,
  pub state:  EdgeState,
  pub active: bool,
}

impl Edge {
  pub fn involves(&self, account: Uuid) -> bool {
    self.from == account || self.to == account
  }
}

/// Input to [`crate::store::SocialStore::insert_edge`].
/// The id is assigned by the store and the row starts active.
#[derive(Debug, Clone, Copy)]
pub struct NewEdge {
  pub from:  Uuid,
  pub to:    Uuid,
  pub state: EdgeState,
}

// ─── Derived view ────────────────────────────────────────────────────────────

/// The relationship between a viewer and a target as seen by the viewer.
/// Derived by [`crate::graph::derive_status`]; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
  None,
  /// Viewer has an unanswered request out to the target.
  PendingSent,
  /// Target has an unanswered request out to the viewer.
  PendingReceived,
  /// Viewer's request was accepted.
  Following,
  /// Target's request was accepted.
  Follower,
  /// Both directions accepted.
  Mutual,
}
