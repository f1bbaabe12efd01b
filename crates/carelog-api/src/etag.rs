//! ETag computation for incident resources.
//!
//! An incident's ETag is a SHA-256 hash over its id and version. Only a
//! review changes the version, so the ETag changes exactly when the record
//! does.

use carelog_core::incident::IncidentRecord;
use sha2::{Digest, Sha256};

pub fn compute_etag(record: &IncidentRecord) -> String {
  let mut hasher = Sha256::new();
  hasher.update(record.incident_id.as_str().as_bytes());
  hasher.update([0u8]);
  hasher.update(record.version.to_le_bytes());
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// `If-Match` values may arrive with or without the surrounding `"`, and
/// possibly with a weak `W/` prefix.
pub fn strip_etag_quotes(s: &str) -> &str {
  let s = s.trim();
  s.strip_prefix("W/").unwrap_or(s).trim_matches('"')
}
