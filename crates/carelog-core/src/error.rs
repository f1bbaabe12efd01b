//! Error types for `carelog-core`.

use thiserror::Error;

use crate::{id::IncidentId, validate::FieldError};

#[derive(Debug, Error)]
pub enum Error {
  /// One or more input fields were rejected. Always carries every violated
  /// constraint, never just the first.
  #[error("validation failed: {}", summarize(.0))]
  ValidationFailed(Vec<FieldError>),

  #[error("incident not found: {0}")]
  NotFound(IncidentId),

  #[error("incident id already exists: {0}")]
  DuplicateId(IncidentId),

  #[error(
    "incident {incident_id} changed since it was read (expected version \
     {expected}, found {current})"
  )]
  Conflict {
    incident_id: IncidentId,
    expected:    u32,
    current:     u32,
  },

  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("unknown {kind}: {value:?}")]
  UnknownValue { kind: &'static str, value: String },
}

impl Error {
  /// Wrap a backend error; the register never inspects or retries these.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StoreUnavailable(Box::new(err))
  }
}

fn summarize(errors: &[FieldError]) -> String {
  errors
    .iter()
    .map(|e| e.message.as_str())
    .collect::<Vec<_>>()
    .join(" ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
