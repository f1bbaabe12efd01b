//! Flat CSV export of the incident register for inspection evidence.
//!
//! Converts [`carelog_core`] incident records into a single CSV document with
//! one row per incident. Pure synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use carelog_export::{export_file_name, to_csv};
//!
//! let body = to_csv(&[]);
//! println!("{}: {} bytes", export_file_name(chrono::Utc::now()), body.len());
//! ```

mod serialize;

use carelog_core::incident::IncidentRecord;
use chrono::{DateTime, Utc};

pub use serialize::HEADERS;

// ─── Public API ──────────────────────────────────────────────────────────────

/// Serialize `records` as RFC 4180 CSV: a header row, then one row per
/// record in the order given. Lines end with CRLF.
pub fn to_csv(records: &[IncidentRecord]) -> String {
  let mut out = serialize::row(HEADERS.iter().copied());
  for record in records {
    out.push_str(&serialize::record_row(record));
  }
  out
}

/// Suggested download name for an export taken at `now`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
  format!(
    "clinical_safety_incidents_{}.csv",
    now.format("%Y%m%d_%H%M%S")
  )
}
