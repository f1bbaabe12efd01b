//! Error type for `carelog-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] carelog_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column could not be decoded back into a domain value.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("username already exists: {0}")]
  UsernameTaken(String),

  #[error("care home not found: {0}")]
  CareHomeNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
