//! Incident types: the reporting half of an incident record.
//!
//! Everything in [`IncidentReport`] is written once at submission and never
//! updated. The management half lives in [`crate::lifecycle`].

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  id::IncidentId,
  lifecycle::{ReviewState, ReviewStatus},
};

/// Harm details recorded when the reporter says no harm was sustained.
pub const NO_HARM_DETAILS: &str = "No harm or injury sustained";

/// Labels are compared case-insensitively with all whitespace removed, so
/// `"Aggression/violence"` and `"aggression / violence"` both parse.
fn label_key(s: &str) -> String {
  s.chars()
    .filter(|c| !c.is_whitespace())
    .flat_map(char::to_lowercase)
    .collect()
}

fn parse_label<T: Copy>(
  kind: &'static str,
  all: &[T],
  label: fn(T) -> &'static str,
  s: &str,
) -> Result<T> {
  let key = label_key(s);
  all
    .iter()
    .copied()
    .find(|v| label_key(label(*v)) == key)
    .ok_or_else(|| Error::UnknownValue { kind, value: s.to_owned() })
}

// ─── Category ────────────────────────────────────────────────────────────────

/// The kind of clinical or safety event being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Category {
  Fall,
  #[serde(rename = "Medication incident")]
  Medication,
  #[serde(rename = "Safeguarding concern")]
  Safeguarding,
  #[serde(rename = "Aggression / violence")]
  Aggression,
  #[serde(rename = "Pressure injury")]
  PressureInjury,
  #[serde(rename = "Infection prevention / control")]
  InfectionControl,
  #[serde(rename = "Equipment / environment safety")]
  EquipmentSafety,
  Other,
}

impl Category {
  pub const ALL: [Self; 8] = [
    Self::Fall,
    Self::Medication,
    Self::Safeguarding,
    Self::Aggression,
    Self::PressureInjury,
    Self::InfectionControl,
    Self::EquipmentSafety,
    Self::Other,
  ];

  /// The display label; also the value stored in the `category` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Fall => "Fall",
      Self::Medication => "Medication incident",
      Self::Safeguarding => "Safeguarding concern",
      Self::Aggression => "Aggression / violence",
      Self::PressureInjury => "Pressure injury",
      Self::InfectionControl => "Infection prevention / control",
      Self::EquipmentSafety => "Equipment / environment safety",
      Self::Other => "Other",
    }
  }
}

impl FromStr for Category {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    parse_label("category", &Self::ALL, Self::as_str, s)
  }
}

impl TryFrom<String> for Category {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

// ─── Severity ────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String")]
pub enum Severity {
  Low,
  Moderate,
  High,
  Critical,
}

impl Severity {
  pub const ALL: [Self; 4] =
    [Self::Low, Self::Moderate, Self::High, Self::Critical];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Low => "Low",
      Self::Moderate => "Moderate",
      Self::High => "High",
      Self::Critical => "Critical",
    }
  }
}

impl FromStr for Severity {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    parse_label("severity", &Self::ALL, Self::as_str, s)
  }
}

impl TryFrom<String> for Severity {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

// ─── Notifications ───────────────────────────────────────────────────────────

/// Someone told about the incident at the time it was reported.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String")]
pub enum InformedParty {
  #[serde(rename = "Nurse in charge")]
  NurseInCharge,
  #[serde(rename = "Registered manager")]
  RegisteredManager,
  #[serde(rename = "GP")]
  Gp,
  #[serde(rename = "Family / next of kin")]
  Family,
  #[serde(rename = "Safeguarding team")]
  SafeguardingTeam,
  #[serde(rename = "Emergency services")]
  EmergencyServices,
  #[serde(rename = "Other professional (specify in free text)")]
  OtherProfessional,
}

impl InformedParty {
  pub const ALL: [Self; 7] = [
    Self::NurseInCharge,
    Self::RegisteredManager,
    Self::Gp,
    Self::Family,
    Self::SafeguardingTeam,
    Self::EmergencyServices,
    Self::OtherProfessional,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::NurseInCharge => "Nurse in charge",
      Self::RegisteredManager => "Registered manager",
      Self::Gp => "GP",
      Self::Family => "Family / next of kin",
      Self::SafeguardingTeam => "Safeguarding team",
      Self::EmergencyServices => "Emergency services",
      Self::OtherProfessional => "Other professional (specify in free text)",
    }
  }

  /// Join a set of parties into the delimited form used for storage and
  /// export.
  pub fn join(parties: &[Self]) -> String {
    parties
      .iter()
      .map(|p| p.as_str())
      .collect::<Vec<_>>()
      .join(", ")
  }

  /// Inverse of [`InformedParty::join`]. An empty string is an empty set.
  ///
  /// Splitting on `", "` is unambiguous because no label contains that
  /// sequence.
  pub fn split(s: &str) -> Result<Vec<Self>> {
    if s.trim().is_empty() {
      return Ok(Vec::new());
    }
    s.split(", ").map(str::parse).collect()
  }
}

impl FromStr for InformedParty {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    parse_label("informed party", &Self::ALL, Self::as_str, s)
  }
}

impl TryFrom<String> for InformedParty {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

// ─── Attestation ─────────────────────────────────────────────────────────────

/// The reporter's honesty attestation. A persisted record can only ever hold
/// `Confirmed`; an unattested draft is rejected before it reaches the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditConfirmation {
  #[default]
  Confirmed,
}

impl AuditConfirmation {
  pub fn as_str(self) -> &'static str { "Confirmed" }
}

impl FromStr for AuditConfirmation {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "Confirmed" => Ok(Self::Confirmed),
      other => Err(Error::UnknownValue {
        kind:  "audit integrity confirmation",
        value: other.to_owned(),
      }),
    }
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// The reporting fields of an incident, as entered by staff.
///
/// Missing text fields decode as empty so validation can report every one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentReport {
  /// When the incident happened; may differ from the submission time.
  pub incident_date:                 NaiveDate,
  pub incident_time:                 NaiveTime,
  pub category:                      Category,
  #[serde(default)]
  pub location:                      String,
  #[serde(default)]
  pub resident_identifier:           String,
  #[serde(default)]
  pub resident_dob:                  Option<NaiveDate>,
  #[serde(default)]
  pub resident_room:                 String,
  #[serde(default)]
  pub incident_account:              String,
  #[serde(default)]
  pub immediate_actions_taken:       String,
  #[serde(default)]
  pub harm_injury_sustained:         bool,
  #[serde(default)]
  pub harm_injury_details:           String,
  #[serde(default)]
  pub individuals_services_informed: Vec<InformedParty>,
  pub severity:                      Severity,
  #[serde(default)]
  pub reported_by_name:              String,
  #[serde(default)]
  pub reported_by_role:              String,
  #[serde(default)]
  pub immediate_learning_actions:    String,
}

impl IncidentReport {
  /// Trim free text, fill in the no-harm details and put the notification
  /// list into canonical order.
  pub fn normalized(mut self) -> Self {
    for field in [
      &mut self.location,
      &mut self.resident_identifier,
      &mut self.resident_room,
      &mut self.incident_account,
      &mut self.immediate_actions_taken,
      &mut self.harm_injury_details,
      &mut self.reported_by_name,
      &mut self.reported_by_role,
      &mut self.immediate_learning_actions,
    ] {
      let trimmed = field.trim();
      if trimmed.len() != field.len() {
        *field = trimmed.to_owned();
      }
    }

    if !self.harm_injury_sustained {
      self.harm_injury_details = NO_HARM_DETAILS.to_owned();
    }

    self.individuals_services_informed.sort();
    self.individuals_services_informed.dedup();
    self
  }
}

/// Input to [`crate::IncidentRegister::submit`].
///
/// `incident_id` and `submitted_timestamp` are always assigned by the
/// register; they are not accepted from callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentDraft {
  #[serde(flatten)]
  pub report:       IncidentReport,
  /// The reporter ticked the audit integrity statement.
  #[serde(default)]
  pub attestation:  bool,
  #[serde(default)]
  pub care_home_id: Option<i64>,
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A persisted incident: the immutable report plus its review state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
  pub incident_id:                  IncidentId,
  /// Loose reference to a provisioned care home; never enforced.
  pub care_home_id:                 Option<i64>,
  #[serde(flatten)]
  pub report:                       IncidentReport,
  pub audit_integrity_confirmation: AuditConfirmation,
  /// Server-assigned; never changes after creation.
  pub submitted_timestamp:          DateTime<Utc>,
  pub review:                       ReviewState,
  /// Bumped by every review; compared by optimistic review updates.
  pub version:                      u32,
}

impl IncidentRecord {
  pub fn status(&self) -> ReviewStatus { self.review.status() }
}
