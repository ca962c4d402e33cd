//! Error type for `amity-store-postgrest`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The endpoint answered with a status the caller has no mapping for.
  /// Conflicts and zero-row updates are not errors; they surface as `None`
  /// from the store methods.
  #[error("unexpected response from {table}: {status}: {body}")]
  UnexpectedStatus {
    table:  String,
    status: u16,
    body:   String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
