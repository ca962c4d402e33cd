//! Session tokens — HS256 JWTs built directly on `hmac` + `sha2`.
//!
//! Access tokens carry the subject, the login handle, and an uppercased role
//! claim so authorization survives a role read being unavailable later.
//! Refresh tokens are identity-only: subject and expiry, nothing else, so a
//! leaked refresh token reveals no role or handle.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::{Error, Result, account::Account};

type HmacSha256 = Hmac<Sha256>;

/// Role claim used when the account has no resolvable role.
pub const DEFAULT_ROLE_CLAIM: &str = "USER";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
  alg: String,
  typ: String,
}

impl Header {
  fn hs256() -> Self {
    Self { alg: "HS256".to_string(), typ: "JWT".to_string() }
  }
}

/// Payload of a session token. Refresh tokens leave everything but `sub`
/// and `exp` unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub:   Uuid,
  /// Login handle of the subject; access tokens only.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  /// Uppercased role name; access tokens only.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub role:  Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub iat:   Option<i64>,
  pub exp:   i64,
}

pub struct TokenSigner {
  secret:      Vec<u8>,
  access_ttl:  Duration,
  refresh_ttl: Duration,
}

impl TokenSigner {
  pub fn new(
    secret: impl Into<Vec<u8>>,
    access_ttl: Duration,
    refresh_ttl: Duration,
  ) -> Self {
    Self { secret: secret.into(), access_ttl, refresh_ttl }
  }

  pub fn issue_access(&self, account: &Account) -> Result<String> {
    let role = account
      .role
      .as_ref()
      .map(|role| role.role.to_uppercase())
      .unwrap_or_else(|| DEFAULT_ROLE_CLAIM.to_string());
    let now = Utc::now().timestamp();
    self.sign(&Claims {
      sub:   account.id,
      email: Some(account.username_login.clone()),
      role:  Some(role),
      iat:   Some(now),
      exp:   now + self.access_ttl.as_secs() as i64,
    })
  }

  pub fn issue_refresh(&self, account: &Account) -> Result<String> {
    let now = Utc::now().timestamp();
    self.sign(&Claims {
      sub:   account.id,
      email: None,
      role:  None,
      iat:   None,
      exp:   now + self.refresh_ttl.as_secs() as i64,
    })
  }

  fn sign(&self, claims: &Claims) -> Result<String> {
    let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&Header::hs256())?);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
    let signing_input = format!("{header}.{payload}");

    let mut mac = HmacSha256::new_from_slice(&self.secret)
      .map_err(|_| Error::SigningKey)?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature}"))
  }

  /// Check structure, header, signature, then expiry, in that order, so a
  /// forged token never reaches the expiry comparison.
  pub fn verify(&self, token: &str) -> Result<Claims> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(sig_b64), None) =
      (parts.next(), parts.next(), parts.next(), parts.next())
    else {
      return Err(Error::TokenInvalid);
    };

    let header_raw =
      URL_SAFE_NO_PAD.decode(header_b64).map_err(|_| Error::TokenInvalid)?;
    let header: Header =
      serde_json::from_slice(&header_raw).map_err(|_| Error::TokenInvalid)?;
    if header.alg != "HS256" || header.typ != "JWT" {
      return Err(Error::TokenInvalid);
    }

    let signature =
      URL_SAFE_NO_PAD.decode(sig_b64).map_err(|_| Error::TokenInvalid)?;
    let mut mac = HmacSha256::new_from_slice(&self.secret)
      .map_err(|_| Error::SigningKey)?;
    mac.update(format!("{header_b64}.{payload_b64}").as_bytes());
    mac.verify_slice(&signature).map_err(|_| Error::TokenInvalid)?;

    let payload_raw =
      URL_SAFE_NO_PAD.decode(payload_b64).map_err(|_| Error::TokenInvalid)?;
    let claims: Claims =
      serde_json::from_slice(&payload_raw).map_err(|_| Error::TokenInvalid)?;

    if Utc::now().timestamp() >= claims.exp {
      return Err(Error::TokenExpired);
    }
    Ok(claims)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::account::{AccountStatus, Role};

  const DAY: Duration = Duration::from_secs(86_400);

  fn account(role: Option<&str>) -> Account {
    Account {
      id:             Uuid::new_v4(),
      username_login: "casey_171".to_string(),
      password_login: "secret".to_string(),
      username:       "casey".to_string(),
      email:          "casey@example.com".to_string(),
      gmail:          Some("casey@example.com".to_string()),
      provider:       "email".to_string(),
      openid_sub:     None,
      email_verified: true,
      role_id:        None,
      role:           role.map(|name| Role {
        id:     Uuid::new_v4(),
        role:   name.to_string(),
        status: 1,
      }),
      status:         AccountStatus::Active,
      create_date:    None,
      update_date:    None,
    }
  }

  fn signer() -> TokenSigner {
    TokenSigner::new(*b"0123456789abcdef0123456789abcdef", DAY, DAY)
  }

  #[test]
  fn access_token_round_trips_with_role_claim() {
    let signer = signer();
    let account = account(Some("Admin"));

    let token = signer.issue_access(&account).unwrap();
    let claims = signer.verify(&token).unwrap();

    assert_eq!(claims.sub, account.id);
    assert_eq!(claims.email.as_deref(), Some("casey_171"));
    assert_eq!(claims.role.as_deref(), Some("ADMIN"));
    assert!(claims.iat.is_some());
  }

  #[test]
  fn missing_role_defaults_to_user() {
    let signer = signer();
    let token = signer.issue_access(&account(None)).unwrap();
    let claims = signer.verify(&token).unwrap();

    assert_eq!(claims.role.as_deref(), Some(DEFAULT_ROLE_CLAIM));
  }

  #[test]
  fn refresh_token_is_identity_only() {
    let signer = signer();
    let token = signer.issue_refresh(&account(Some("Admin"))).unwrap();
    let claims = signer.verify(&token).unwrap();

    assert!(claims.email.is_none());
    assert!(claims.role.is_none());
    assert!(claims.iat.is_none());
  }

  #[test]
  fn expired_token_is_rejected() {
    let signer =
      TokenSigner::new(*b"0123456789abcdef0123456789abcdef", Duration::ZERO, DAY);
    let token = signer.issue_access(&account(None)).unwrap();

    assert!(matches!(signer.verify(&token), Err(Error::TokenExpired)));
  }

  #[test]
  fn tampered_payload_is_rejected() {
    let signer = signer();
    let token = signer.issue_access(&account(None)).unwrap();

    let parts: Vec<&str> = token.split('.').collect();
    let forged_payload = URL_SAFE_NO_PAD.encode(
      serde_json::to_vec(&Claims {
        sub:   Uuid::new_v4(),
        email: None,
        role:  Some("ADMIN".to_string()),
        iat:   None,
        exp:   i64::MAX,
      })
      .unwrap(),
    );
    let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

    assert!(matches!(signer.verify(&forged), Err(Error::TokenInvalid)));
  }

  #[test]
  fn wrong_secret_is_rejected() {
    let token = signer().issue_access(&account(None)).unwrap();
    let other =
      TokenSigner::new(*b"ffffffffffffffffffffffffffffffff", DAY, DAY);

    assert!(matches!(other.verify(&token), Err(Error::TokenInvalid)));
  }

  #[test]
  fn garbage_is_rejected() {
    let signer = signer();

    assert!(matches!(signer.verify(""), Err(Error::TokenInvalid)));
    assert!(matches!(signer.verify("a.b"), Err(Error::TokenInvalid)));
    assert!(matches!(signer.verify("a.b.c.d"), Err(Error::TokenInvalid)));
    assert!(matches!(signer.verify("not a token"), Err(Error::TokenInvalid)));
  }
}
