//! Error types for `amity-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} must not be blank")]
  MissingField(&'static str),

  #[error("new password and confirmation do not match")]
  ConfirmationMismatch,

  #[error("an account already exists for {0}")]
  EmailTaken(String),

  #[error("cannot follow yourself")]
  SelfFollow,

  #[error("a relationship between these accounts already exists")]
  DuplicateEdge,

  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("invalid or expired one-time code")]
  InvalidCode,

  #[error("session token expired")]
  TokenExpired,

  #[error("invalid session token")]
  TokenInvalid,

  #[error("invalid signing key")]
  SigningKey,

  #[error("only the recipient can act on follow request {0}")]
  NotRecipient(i64),

  #[error("account is not part of follow request {0}")]
  NotParticipant(i64),

  #[error("account not found: {0}")]
  AccountNotFound(Uuid),

  #[error("no account registered for {0}")]
  EmailNotFound(String),

  #[error("follow request not found: {0}")]
  EdgeNotFound(i64),

  #[error("default role {0:?} is not provisioned")]
  RoleUnavailable(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification used by boundaries to pick a status code without
/// matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  Authentication,
  Authorization,
  NotFound,
  Provisioning,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::MissingField(_)
      | Self::ConfirmationMismatch
      | Self::EmailTaken(_)
      | Self::SelfFollow
      | Self::DuplicateEdge => ErrorKind::Validation,

      Self::InvalidCredentials
      | Self::InvalidCode
      | Self::TokenExpired
      | Self::TokenInvalid => ErrorKind::Authentication,

      Self::NotRecipient(_) | Self::NotParticipant(_) => ErrorKind::Authorization,

      Self::AccountNotFound(_) | Self::EmailNotFound(_) | Self::EdgeNotFound(_) => {
        ErrorKind::NotFound
      }

      Self::RoleUnavailable(_)
      | Self::SigningKey
      | Self::Serialization(_)
      | Self::Store(_) => ErrorKind::Provisioning,
    }
  }

  /// Wrap a backend error from a [`crate::store::SocialStore`] implementation.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
