//! The bounded dispatch queue between request handlers and the mailer.

use tokio::sync::mpsc;
use tracing::warn;

use crate::{Notification, Notifier};

/// Handle onto the dispatch task. Cheap to clone; enqueueing never blocks
/// and never fails the caller.
#[derive(Clone)]
pub struct NotifyQueue {
  tx: mpsc::Sender<Notification>,
}

impl NotifyQueue {
  /// Start the dispatch task. The worker owns the notifier and drains the
  /// queue until every handle is dropped.
  pub fn spawn<N>(notifier: N, capacity: usize) -> Self
  where
    N: Notifier + Send + Sync + 'static,
  {
    let (tx, mut rx) = mpsc::channel(capacity);
    tokio::spawn(async move {
      while let Some(notification) = rx.recv().await {
        if !notifier.send(notification).await {
          warn!("notification was not delivered");
        }
      }
    });
    Self { tx }
  }

  /// Queue a notification. When the queue is full the notification is
  /// dropped with a warning; mail must never hold up a request.
  pub fn enqueue(&self, notification: Notification) {
    if let Err(error) = self.tx.try_send(notification) {
      warn!(%error, "notification dropped");
    }
  }
}
