//! One-time codes guarding registration and password reset.
//!
//! Codes are six decimal digits, keyed by lowercased identity (email), and
//! live for a configurable window. A new code overwrites any prior code for
//! the same identity regardless of purpose, so at most one code is ever live
//! per identity. Verification is non-consuming: callers consume explicitly
//! once the guarded operation has committed, so a failed registration does
//! not burn the code.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
  time::{Duration, Instant},
};

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// What a code is allowed to authorize. A register code cannot reset a
/// password and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpPurpose {
  Register,
  Forgot,
}

impl OtpPurpose {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Register => "register",
      Self::Forgot => "forgot",
    }
  }
}

/// A live code with its expiry deadline.
#[derive(Debug, Clone)]
pub struct CodeEntry {
  pub code:       String,
  pub purpose:    OtpPurpose,
  pub expires_at: Instant,
}

// ─── Backing table ───────────────────────────────────────────────────────────

/// Storage seam for live codes, so the single-process table below can be
/// swapped for a shared cache without touching the issuer.
pub trait CodeStore: Send + Sync {
  fn put(&self, key: String, entry: CodeEntry);
  fn get(&self, key: &str) -> Option<CodeEntry>;
  fn remove(&self, key: &str);
}

#[derive(Default)]
pub struct MemoryCodeStore {
  entries: Mutex<HashMap<String, CodeEntry>>,
}

impl MemoryCodeStore {
  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CodeEntry>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl CodeStore for MemoryCodeStore {
  fn put(&self, key: String, entry: CodeEntry) {
    self.lock().insert(key, entry);
  }

  fn get(&self, key: &str) -> Option<CodeEntry> {
    self.lock().get(key).cloned()
  }

  fn remove(&self, key: &str) {
    self.lock().remove(key);
  }
}

// ─── Issuer ──────────────────────────────────────────────────────────────────

pub struct OtpIssuer {
  codes: Arc<dyn CodeStore>,
  ttl:   Duration,
}

impl OtpIssuer {
  pub fn new(codes: Arc<dyn CodeStore>, ttl: Duration) -> Self {
    Self { codes, ttl }
  }

  /// Issuer over the in-process table.
  pub fn in_memory(ttl: Duration) -> Self {
    Self::new(Arc::new(MemoryCodeStore::default()), ttl)
  }

  /// Issue a fresh code for `identity`, replacing any live one.
  pub fn generate(&self, identity: &str, purpose: OtpPurpose) -> String {
    let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
    let entry = CodeEntry {
      code: code.clone(),
      purpose,
      expires_at: Instant::now() + self.ttl,
    };
    self.codes.put(key(identity), entry);
    code
  }

  /// Check a presented code without consuming it. An expired entry is
  /// removed as a side effect of being discovered.
  pub fn verify(&self, identity: &str, code: &str, purpose: OtpPurpose) -> bool {
    let key = key(identity);
    let Some(entry) = self.codes.get(&key) else {
      return false;
    };
    if Instant::now() > entry.expires_at {
      self.codes.remove(&key);
      return false;
    }
    if entry.purpose != purpose {
      return false;
    }
    entry.code == code
  }

  /// Drop the live code for `identity` after the guarded operation commits.
  pub fn consume(&self, identity: &str) {
    self.codes.remove(&key(identity));
  }
}

fn key(identity: &str) -> String {
  identity.to_lowercase()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
