//! The follow graph — requests, acceptance, and the derived relationship
//! view.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  edge::{Edge, EdgeState, NewEdge, RelationshipStatus},
  store::{EdgeQuery, SocialStore},
};

pub struct RelationshipManager<S> {
  store: Arc<S>,
}

impl<S: SocialStore> RelationshipManager<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// Open a follow request. Blocked while any active edge exists between
  /// the pair in either direction, so a counter-request must go through
  /// accept rather than a second edge. The store re-checks the same-pair
  /// rule on insert.
  pub async fn follow(&self, from: Uuid, to: Uuid) -> Result<Edge> {
    if from == to {
      return Err(Error::SelfFollow);
    }
    if self.store.any_edge_between(from, to).await.map_err(Error::store)? {
      return Err(Error::DuplicateEdge);
    }
    self
      .store
      .insert_edge(NewEdge { from, to, state: EdgeState::Pending })
      .await
      .map_err(Error::store)?
      .ok_or(Error::DuplicateEdge)
  }

  /// Accept a request. Only the recipient may accept; accepting an
  /// already-accepted edge is a no-op that returns it unchanged.
  pub async fn accept(&self, edge_id: i64, actor: Uuid) -> Result<Edge> {
    let edge = self.active_edge(edge_id).await?;
    if edge.to != actor {
      return Err(Error::NotRecipient(edge_id));
    }
    self
      .store
      .set_edge_state(edge_id, EdgeState::Done)
      .await
      .map_err(Error::store)?
      .ok_or(Error::EdgeNotFound(edge_id))
  }

  /// Decline a request. Only the recipient may reject; the edge is
  /// soft-deleted and a fresh request can be opened later.
  pub async fn reject(&self, edge_id: i64, actor: Uuid) -> Result<Edge> {
    let edge = self.active_edge(edge_id).await?;
    if edge.to != actor {
      return Err(Error::NotRecipient(edge_id));
    }
    self
      .store
      .soft_delete_edge(edge_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::EdgeNotFound(edge_id))
  }

  /// Withdraw the viewer's edge toward `target`, pending or accepted.
  /// Returns whether anything was deleted; unfollowing a stranger is not
  /// an error.
  pub async fn unfollow(&self, from: Uuid, to: Uuid) -> Result<bool> {
    match self
      .store
      .find_edge_between(from, to)
      .await
      .map_err(Error::store)?
    {
      Some(edge) => Ok(
        self
          .store
          .soft_delete_edge(edge.id)
          .await
          .map_err(Error::store)?
          .is_some(),
      ),
      None => Ok(false),
    }
  }

  /// Sever an edge from either end. Unlike [`Self::reject`] the sender may
  /// also remove an accepted relationship.
  pub async fn unfriend(&self, edge_id: i64, actor: Uuid) -> Result<Edge> {
    let edge = self.active_edge(edge_id).await?;
    if !edge.involves(actor) {
      return Err(Error::NotParticipant(edge_id));
    }
    self
      .store
      .soft_delete_edge(edge_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::EdgeNotFound(edge_id))
  }

  /// The viewer's relationship to `target`, derived from the two directed
  /// edges.
  pub async fn status(
    &self,
    viewer: Uuid,
    target: Uuid,
  ) -> Result<RelationshipStatus> {
    let outgoing = self
      .store
      .find_edge_between(viewer, target)
      .await
      .map_err(Error::store)?;
    let incoming = self
      .store
      .find_edge_between(target, viewer)
      .await
      .map_err(Error::store)?;
    Ok(derive_status(outgoing.as_ref(), incoming.as_ref()))
  }

  // ── Listings ──────────────────────────────────────────────────────────

  /// Unanswered requests arriving at `account`, newest first.
  pub async fn pending_received(
    &self,
    account: Uuid,
    page: u32,
    size: u32,
  ) -> Result<Vec<Edge>> {
    self.list(None, Some(account), EdgeState::Pending, page, size).await
  }

  /// Edges into `account` that it accepted — the accounts following it,
  /// newest first.
  pub async fn followers(
    &self,
    account: Uuid,
    page: u32,
    size: u32,
  ) -> Result<Vec<Edge>> {
    self.list(None, Some(account), EdgeState::Done, page, size).await
  }

  /// Accepted edges out of `account` — the accounts it follows, newest
  /// first.
  pub async fn following(
    &self,
    account: Uuid,
    page: u32,
    size: u32,
  ) -> Result<Vec<Edge>> {
    self.list(Some(account), None, EdgeState::Done, page, size).await
  }

  async fn list(
    &self,
    from: Option<Uuid>,
    to: Option<Uuid>,
    state: EdgeState,
    page: u32,
    size: u32,
  ) -> Result<Vec<Edge>> {
    let query = EdgeQuery {
      from,
      to,
      state: Some(state),
      limit: size as usize,
      offset: page as usize * size as usize,
    };
    self.store.list_edges(&query).await.map_err(Error::store)
  }

  async fn active_edge(&self, edge_id: i64) -> Result<Edge> {
    self
      .store
      .find_edge(edge_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::EdgeNotFound(edge_id))
  }
}

/// Fold the two directed edges between viewer and target into the viewer's
/// five-way relationship view.
///
/// Order matters: the mutual check runs first, then the viewer's outgoing
/// edge takes precedence over the incoming one. With both edges present and
/// exactly one accepted, the answer follows the outgoing edge, so the two
/// participants can see different statuses in that corner.
pub fn derive_status(
  outgoing: Option<&Edge>,
  incoming: Option<&Edge>,
) -> RelationshipStatus {
  match (outgoing, incoming) {
    (Some(out), Some(inc))
      if out.state == EdgeState::Done && inc.state == EdgeState::Done =>
    {
      RelationshipStatus::Mutual
    }
    (Some(out), _) => match out.state {
      EdgeState::Pending => RelationshipStatus::PendingSent,
      EdgeState::Done => RelationshipStatus::Following,
    },
    (None, Some(inc)) => match inc.state {
      EdgeState::Pending => RelationshipStatus::PendingReceived,
      EdgeState::Done => RelationshipStatus::Follower,
    },
    (None, None) => RelationshipStatus::None,
  }
}
