//! Human-readable incident identifiers.
//!
//! Identifiers have the form `CSI-YYYYMMDD-HHMMSS` (UTC, second granularity).
//! A process can easily create two incidents within the same second, so the
//! generator appends a two-digit sequence (`-02`, `-03`, …) to every id after
//! the first one in a given second. Uniqueness across processes is left to
//! the store's primary key.

use std::{
  fmt,
  sync::{Mutex, PoisonError},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The primary key of an incident record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncidentId(String);

impl IncidentId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Display for IncidentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<String> for IncidentId {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for IncidentId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

/// Issues incident ids that are unique within this process.
#[derive(Debug, Default)]
pub struct IdGenerator {
  /// `(unix second, ids issued in that second)` for the latest id issued.
  last: Mutex<Option<(i64, u32)>>,
}

impl IdGenerator {
  pub fn new() -> Self { Self::default() }

  /// Issue the id for an incident submitted at `now`.
  ///
  /// If the clock steps back, ids keep counting within the latest second
  /// already issued rather than reusing an earlier one.
  pub fn next_at(&self, now: DateTime<Utc>) -> IncidentId {
    let (second, seq) = {
      let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
      let next = match *last {
        Some((second, seq)) if now.timestamp() <= second => (second, seq + 1),
        _ => (now.timestamp(), 1),
      };
      *last = Some(next);
      next
    };

    let stamp = DateTime::from_timestamp(second, 0).unwrap_or(now);
    let base = stamp.format("CSI-%Y%m%d-%H%M%S").to_string();
    if seq == 1 {
      IncidentId(base)
    } else {
      IncidentId(format!("{base}-{seq:02}"))
    }
  }
}
