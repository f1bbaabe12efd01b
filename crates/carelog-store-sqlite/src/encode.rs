//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (nanosecond
//! precision, `Z` suffix) so that lexical order is chronological order.
//! Closed-set values are stored as their display labels.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use carelog_core::{
  account::{CareHome, StaffAccount},
  id::IncidentId,
  incident::{IncidentRecord, IncidentReport, InformedParty},
  lifecycle::{ManagementReview, ReviewEntry, ReviewState, ReviewStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse()
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

fn decode_time(s: &str) -> Result<NaiveTime> {
  s.parse()
    .map_err(|e| Error::Decode(format!("time {s:?}: {e}")))
}

fn encode_yes_no(b: bool) -> &'static str { if b { "Yes" } else { "No" } }

fn decode_yes_no(s: &str) -> Result<bool> {
  match s {
    "Yes" => Ok(true),
    "No" => Ok(false),
    other => Err(Error::Decode(format!("expected Yes/No, got {other:?}"))),
  }
}

fn decode_version(v: i64) -> Result<u32> {
  u32::try_from(v).map_err(|_| Error::Decode(format!("version out of range: {v}")))
}

// ─── Incident rows ───────────────────────────────────────────────────────────

/// Column list shared by every `SELECT` that builds a [`RawIncident`].
pub const INCIDENT_COLUMNS: &str = "
  incident_id, care_home_id, incident_date, incident_time, category,
  location, resident_identifier, resident_dob, resident_room,
  incident_account, immediate_actions_taken, harm_injury_sustained,
  harm_injury_details, individuals_services_informed, severity,
  reported_by_name, reported_by_role, immediate_learning_actions,
  audit_integrity_confirmation, submitted_timestamp,
  management_review_status, management_reviewer_name,
  management_reviewer_role, management_review_outcome, signoff_decision,
  signoff_timestamp, version";

/// Raw column values of one `incidents` row, in [`INCIDENT_COLUMNS`] order.
pub struct RawIncident {
  pub incident_id:                   String,
  pub care_home_id:                  Option<i64>,
  pub incident_date:                 String,
  pub incident_time:                 String,
  pub category:                      String,
  pub location:                      String,
  pub resident_identifier:           String,
  pub resident_dob:                  Option<String>,
  pub resident_room:                 String,
  pub incident_account:              String,
  pub immediate_actions_taken:       String,
  pub harm_injury_sustained:         String,
  pub harm_injury_details:           String,
  pub individuals_services_informed: String,
  pub severity:                      String,
  pub reported_by_name:              String,
  pub reported_by_role:              String,
  pub immediate_learning_actions:    String,
  pub audit_integrity_confirmation:  String,
  pub submitted_timestamp:           String,
  // management columns
  pub management_review_status:      String,
  pub management_reviewer_name:      String,
  pub management_reviewer_role:      String,
  pub management_review_outcome:     String,
  pub signoff_decision:              String,
  pub signoff_timestamp:             String,
  pub version:                       i64,
}

impl RawIncident {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      incident_id:                   row.get(0)?,
      care_home_id:                  row.get(1)?,
      incident_date:                 row.get(2)?,
      incident_time:                 row.get(3)?,
      category:                      row.get(4)?,
      location:                      row.get(5)?,
      resident_identifier:           row.get(6)?,
      resident_dob:                  row.get(7)?,
      resident_room:                 row.get(8)?,
      incident_account:              row.get(9)?,
      immediate_actions_taken:       row.get(10)?,
      harm_injury_sustained:         row.get(11)?,
      harm_injury_details:           row.get(12)?,
      individuals_services_informed: row.get(13)?,
      severity:                      row.get(14)?,
      reported_by_name:              row.get(15)?,
      reported_by_role:              row.get(16)?,
      immediate_learning_actions:    row.get(17)?,
      audit_integrity_confirmation:  row.get(18)?,
      submitted_timestamp:           row.get(19)?,
      management_review_status:      row.get(20)?,
      management_reviewer_name:      row.get(21)?,
      management_reviewer_role:      row.get(22)?,
      management_review_outcome:     row.get(23)?,
      signoff_decision:              row.get(24)?,
      signoff_timestamp:             row.get(25)?,
      version:                       row.get(26)?,
    })
  }

  pub fn from_record(record: &IncidentRecord) -> Self {
    let r = &record.report;
    let review = record.review.review();

    Self {
      incident_id:                   record.incident_id.to_string(),
      care_home_id:                  record.care_home_id,
      incident_date:                 r.incident_date.to_string(),
      incident_time:                 r.incident_time.to_string(),
      category:                      r.category.as_str().to_owned(),
      location:                      r.location.clone(),
      resident_identifier:           r.resident_identifier.clone(),
      resident_dob:                  r.resident_dob.map(|d| d.to_string()),
      resident_room:                 r.resident_room.clone(),
      incident_account:              r.incident_account.clone(),
      immediate_actions_taken:       r.immediate_actions_taken.clone(),
      harm_injury_sustained:         encode_yes_no(r.harm_injury_sustained).to_owned(),
      harm_injury_details:           r.harm_injury_details.clone(),
      individuals_services_informed: InformedParty::join(&r.individuals_services_informed),
      severity:                      r.severity.as_str().to_owned(),
      reported_by_name:              r.reported_by_name.clone(),
      reported_by_role:              r.reported_by_role.clone(),
      immediate_learning_actions:    r.immediate_learning_actions.clone(),
      audit_integrity_confirmation:  record.audit_integrity_confirmation.as_str().to_owned(),
      submitted_timestamp:           encode_dt(record.submitted_timestamp),
      management_review_status:      record.status().as_str().to_owned(),
      management_reviewer_name:      review
        .map(|m| m.reviewer_name.clone())
        .unwrap_or_default(),
      management_reviewer_role:      review
        .map(|m| m.reviewer_role.clone())
        .unwrap_or_default(),
      management_review_outcome:     review
        .map(|m| m.outcome.clone())
        .unwrap_or_default(),
      signoff_decision:              review
        .map(|m| m.decision.as_str().to_owned())
        .unwrap_or_default(),
      signoff_timestamp:             review
        .map(|m| encode_dt(m.signoff_timestamp))
        .unwrap_or_default(),
      version:                       i64::from(record.version),
    }
  }

  pub fn into_record(self) -> Result<IncidentRecord> {
    let review = match self.management_review_status.parse::<ReviewStatus>()? {
      ReviewStatus::Pending => ReviewState::Pending,
      ReviewStatus::Completed => ReviewState::Completed(ManagementReview {
        reviewer_name:     self.management_reviewer_name,
        reviewer_role:     self.management_reviewer_role,
        outcome:           self.management_review_outcome,
        decision:          self.signoff_decision.parse()?,
        signoff_timestamp: decode_dt(&self.signoff_timestamp)?,
      }),
    };

    let report = IncidentReport {
      incident_date:                 decode_date(&self.incident_date)?,
      incident_time:                 decode_time(&self.incident_time)?,
      category:                      self.category.parse()?,
      location:                      self.location,
      resident_identifier:           self.resident_identifier,
      resident_dob:                  self
        .resident_dob
        .as_deref()
        .map(decode_date)
        .transpose()?,
      resident_room:                 self.resident_room,
      incident_account:              self.incident_account,
      immediate_actions_taken:       self.immediate_actions_taken,
      harm_injury_sustained:         decode_yes_no(&self.harm_injury_sustained)?,
      harm_injury_details:           self.harm_injury_details,
      individuals_services_informed: InformedParty::split(
        &self.individuals_services_informed,
      )?,
      severity:                      self.severity.parse()?,
      reported_by_name:              self.reported_by_name,
      reported_by_role:              self.reported_by_role,
      immediate_learning_actions:    self.immediate_learning_actions,
    };

    Ok(IncidentRecord {
      incident_id: IncidentId::new(self.incident_id),
      care_home_id: self.care_home_id,
      report,
      audit_integrity_confirmation: self.audit_integrity_confirmation.parse()?,
      submitted_timestamp: decode_dt(&self.submitted_timestamp)?,
      review,
      version: decode_version(self.version)?,
    })
  }
}

// ─── Review history rows ─────────────────────────────────────────────────────

/// Raw strings read directly from a `review_history` row.
pub struct RawReviewEntry {
  pub review_id:         String,
  pub incident_id:       String,
  pub reviewer_name:     String,
  pub reviewer_role:     String,
  pub outcome:           String,
  pub decision:          String,
  pub signoff_timestamp: String,
  pub version:           i64,
}

impl RawReviewEntry {
  pub fn into_entry(self) -> Result<ReviewEntry> {
    Ok(ReviewEntry {
      review_id:   decode_uuid(&self.review_id)?,
      incident_id: IncidentId::new(self.incident_id),
      review:      ManagementReview {
        reviewer_name:     self.reviewer_name,
        reviewer_role:     self.reviewer_role,
        outcome:           self.outcome,
        decision:          self.decision.parse()?,
        signoff_timestamp: decode_dt(&self.signoff_timestamp)?,
      },
      version:     decode_version(self.version)?,
    })
  }
}

// ─── Provisioning rows ───────────────────────────────────────────────────────

pub struct RawCareHome {
  pub care_home_id: i64,
  pub name:         String,
  pub created_at:   String,
}

impl RawCareHome {
  pub fn into_care_home(self) -> Result<CareHome> {
    Ok(CareHome {
      care_home_id: self.care_home_id,
      name:         self.name,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawStaffAccount {
  pub user_id:      i64,
  pub care_home_id: i64,
  pub username:     String,
  pub role:         String,
  pub created_at:   String,
}

impl RawStaffAccount {
  pub fn into_account(self) -> Result<StaffAccount> {
    Ok(StaffAccount {
      user_id:      self.user_id,
      care_home_id: self.care_home_id,
      username:     self.username,
      role:         self.role.parse()?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
