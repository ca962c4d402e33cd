//! Mail delivery backends.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tracing::{info, warn};

use crate::{Notification, Notifier};

const RESEND_URL: &str = "https://api.resend.com/emails";

// ─── Resend ──────────────────────────────────────────────────────────────────

/// Sends mail through the Resend HTTP API.
#[derive(Clone)]
pub struct ResendNotifier {
  client:  Client,
  api_key: String,
  from:    String,
}

impl ResendNotifier {
  pub fn new(
    api_key: impl Into<String>,
    from: impl Into<String>,
  ) -> Result<Self, reqwest::Error> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, api_key: api_key.into(), from: from.into() })
  }
}

impl Notifier for ResendNotifier {
  async fn send(&self, notification: Notification) -> bool {
    let body = json!({
      "from": self.from,
      "to": notification.email(),
      "subject": notification.subject(),
      "html": notification.html(),
    });

    let resp = self
      .client
      .post(RESEND_URL)
      .bearer_auth(&self.api_key)
      .json(&body)
      .send()
      .await;

    match resp {
      Ok(resp) if resp.status().is_success() => true,
      Ok(resp) => {
        warn!(
          to = notification.email(),
          status = %resp.status(),
          "mail delivery refused"
        );
        false
      }
      Err(error) => {
        warn!(to = notification.email(), %error, "mail delivery failed");
        false
      }
    }
  }
}

// ─── Log fallback ────────────────────────────────────────────────────────────

/// Stands in when no mail provider is configured: logs the would-be mail so
/// codes and temporary passwords stay reachable in development.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
  async fn send(&self, notification: Notification) -> bool {
    info!(
      to = notification.email(),
      subject = notification.subject(),
      body = notification.html(),
      "mail delivery disabled; logging instead"
    );
    true
  }
}
