//! RFC 4180 row serializer.

use carelog_core::incident::{IncidentRecord, InformedParty};
use chrono::{DateTime, Utc};

/// Column titles, in output order.
pub const HEADERS: [&str; 25] = [
  "Incident ID",
  "Incident date",
  "Incident time",
  "Category",
  "Location",
  "Resident identifier",
  "Date of birth",
  "Room",
  "Incident account",
  "Immediate actions taken",
  "Harm / injury sustained",
  "Harm / injury details",
  "Individuals / services informed",
  "Severity",
  "Reported by (name)",
  "Reported by (role)",
  "Immediate learning / actions",
  "Audit integrity confirmation",
  "Submitted timestamp",
  "Management review status",
  "Management reviewer (name)",
  "Management reviewer (role)",
  "Management review outcome",
  "Sign-off decision",
  "Sign-off timestamp",
];

// ─── Field escaping ──────────────────────────────────────────────────────────

/// Quote `s` if it contains a delimiter, a quote or a line break; embedded
/// quotes are doubled.
fn escape_field(s: &str) -> String {
  if s.contains([',', '"', '\r', '\n']) {
    format!("\"{}\"", s.replace('"', "\"\""))
  } else {
    s.to_owned()
  }
}

/// Emit one CSV line, CRLF-terminated.
pub(crate) fn row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
  let mut line = fields
    .into_iter()
    .map(escape_field)
    .collect::<Vec<_>>()
    .join(",");
  line.push_str("\r\n");
  line
}

fn timestamp(dt: DateTime<Utc>) -> String {
  dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn yes_no(b: bool) -> &'static str { if b { "Yes" } else { "No" } }

// ─── Records ─────────────────────────────────────────────────────────────────

pub(crate) fn record_row(record: &IncidentRecord) -> String {
  let r = &record.report;
  let review = record.review.review();

  let cells: [String; 25] = [
    record.incident_id.to_string(),
    r.incident_date.format("%Y-%m-%d").to_string(),
    r.incident_time.format("%H:%M:%S").to_string(),
    r.category.as_str().to_owned(),
    r.location.clone(),
    r.resident_identifier.clone(),
    r.resident_dob
      .map(|d| d.format("%Y-%m-%d").to_string())
      .unwrap_or_default(),
    r.resident_room.clone(),
    r.incident_account.clone(),
    r.immediate_actions_taken.clone(),
    yes_no(r.harm_injury_sustained).to_owned(),
    r.harm_injury_details.clone(),
    InformedParty::join(&r.individuals_services_informed),
    r.severity.as_str().to_owned(),
    r.reported_by_name.clone(),
    r.reported_by_role.clone(),
    r.immediate_learning_actions.clone(),
    record.audit_integrity_confirmation.as_str().to_owned(),
    timestamp(record.submitted_timestamp),
    record.status().as_str().to_owned(),
    review.map(|m| m.reviewer_name.clone()).unwrap_or_default(),
    review.map(|m| m.reviewer_role.clone()).unwrap_or_default(),
    review.map(|m| m.outcome.clone()).unwrap_or_default(),
    review
      .map(|m| m.decision.as_str().to_owned())
      .unwrap_or_default(),
    review
      .map(|m| timestamp(m.signoff_timestamp))
      .unwrap_or_default(),
  ];

  row(cells.iter().map(String::as_str))
}
