//! Outbound notifications for the account lifecycle.
//!
//! Delivery is fire-and-forget: callers enqueue onto a [`NotifyQueue`] and a
//! background task drives the configured [`Notifier`]. A delivery failure is
//! logged and dropped; it never surfaces to the request that triggered it.

mod mailer;
mod notification;
mod queue;

pub use mailer::{LogNotifier, ResendNotifier};
pub use notification::{Notification, Notifier};
pub use queue::NotifyQueue;
