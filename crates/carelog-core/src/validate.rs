//! Field-presence validation for submissions and reviews.
//!
//! Validators collect every violation before returning, so callers can show
//! the reporter all of their mistakes at once.

use serde::{Deserialize, Serialize};

use crate::{
  incident::IncidentDraft,
  lifecycle::{ReviewInput, SignoffDecision},
};

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub field:   String,
  pub message: String,
}

impl FieldError {
  pub fn new(field: &str, message: impl Into<String>) -> Self {
    Self { field: field.to_owned(), message: message.into() }
  }
}

pub const ATTESTATION_REQUIRED: &str =
  "Audit integrity confirmation must be completed before submission.";

fn require_text(
  errors: &mut Vec<FieldError>,
  field: &str,
  value: &str,
  message: &str,
) {
  if value.trim().is_empty() {
    errors.push(FieldError::new(field, message));
  }
}

/// Check a draft before submission.
pub fn validate_draft(draft: &IncidentDraft) -> Result<(), Vec<FieldError>> {
  let r = &draft.report;
  let mut errors = Vec::new();

  require_text(
    &mut errors,
    "resident_identifier",
    &r.resident_identifier,
    "Resident name / identifier is required.",
  );
  require_text(&mut errors, "location", &r.location, "Location is required.");
  require_text(
    &mut errors,
    "incident_account",
    &r.incident_account,
    "A factual incident account is required.",
  );
  require_text(
    &mut errors,
    "reported_by_name",
    &r.reported_by_name,
    "Reporter name is required.",
  );
  require_text(
    &mut errors,
    "reported_by_role",
    &r.reported_by_role,
    "Reporter role is required.",
  );
  if !draft.attestation {
    errors.push(FieldError::new("attestation", ATTESTATION_REQUIRED));
  }

  if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Check reviewer input, returning the parsed sign-off decision.
pub fn validate_review(
  input: &ReviewInput,
) -> Result<SignoffDecision, Vec<FieldError>> {
  let mut errors = Vec::new();

  require_text(
    &mut errors,
    "reviewer_name",
    &input.reviewer_name,
    "Reviewer name is required.",
  );
  require_text(
    &mut errors,
    "reviewer_role",
    &input.reviewer_role,
    "Reviewer role is required.",
  );
  require_text(
    &mut errors,
    "outcome",
    &input.outcome,
    "Management review outcome is required.",
  );

  let decision = if input.decision.trim().is_empty() {
    errors.push(FieldError::new(
      "decision",
      "A sign-off decision is required.",
    ));
    None
  } else {
    match input.decision.parse::<SignoffDecision>() {
      Ok(d) => Some(d),
      Err(_) => {
        let allowed = SignoffDecision::ALL
          .iter()
          .map(|d| d.as_str())
          .collect::<Vec<_>>()
          .join(", ");
        errors.push(FieldError::new(
          "decision",
          format!("Sign-off decision must be one of: {allowed}."),
        ));
        None
      }
    }
  };

  match decision {
    Some(d) if errors.is_empty() => Ok(d),
    _ => Err(errors),
  }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, NaiveTime};

  use super::*;
  use crate::incident::{Category, IncidentReport, Severity};

  fn draft() -> IncidentDraft {
    IncidentDraft {
      report:       IncidentReport {
        incident_date:                 NaiveDate::from_ymd_opt(2024, 5, 1)
          .unwrap(),
        incident_time:                 NaiveTime::from_hms_opt(12, 0, 0)
          .unwrap(),
        category:                      Category::Fall,
        location:                      "Room 4".into(),
        resident_identifier:           "Jane Doe".into(),
        resident_dob:                  None,
        resident_room:                 String::new(),
        incident_account:              "Fell near bed.".into(),
        immediate_actions_taken:       String::new(),
        harm_injury_sustained:         false,
        harm_injury_details:           String::new(),
        individuals_services_informed: vec![],
        severity:                      Severity::Low,
        reported_by_name:              "A. Nurse".into(),
        reported_by_role:              "Care Assistant".into(),
        immediate_learning_actions:    String::new(),
      },
      attestation:  true,
      care_home_id: None,
    }
  }

  fn fields(errors: &[FieldError]) -> Vec<&str> {
    errors.iter().map(|e| e.field.as_str()).collect()
  }

  #[test]
  fn valid_draft_passes() {
    assert!(validate_draft(&draft()).is_ok());
  }

  #[test]
  fn whitespace_only_fields_are_blank() {
    let mut d = draft();
    d.report.location = "   \t".into();
    let errors = validate_draft(&d).unwrap_err();
    assert_eq!(fields(&errors), ["location"]);
  }

  #[test]
  fn every_violation_is_reported() {
    let mut d = draft();
    d.report.resident_identifier.clear();
    d.report.incident_account = "\n".into();
    d.report.reported_by_role.clear();
    d.attestation = false;

    let errors = validate_draft(&d).unwrap_err();
    assert_eq!(
      fields(&errors),
      [
        "resident_identifier",
        "incident_account",
        "reported_by_role",
        "attestation"
      ]
    );
  }

  #[test]
  fn missing_attestation_alone_fails() {
    let mut d = draft();
    d.attestation = false;
    let errors = validate_draft(&d).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(
      errors[0]
        .message
        .contains("Audit integrity confirmation must be completed")
    );
  }

  #[test]
  fn review_requires_known_decision() {
    let input = ReviewInput {
      reviewer_name: "R. Manager".into(),
      reviewer_role: "Registered Manager".into(),
      outcome:       "Falls plan updated.".into(),
      decision:      "Maybe".into(),
    };
    let errors = validate_review(&input).unwrap_err();
    assert_eq!(fields(&errors), ["decision"]);
    assert!(errors[0].message.contains("Re-opened for clarification"));
  }

  #[test]
  fn blank_review_reports_all_fields() {
    let errors = validate_review(&ReviewInput::default()).unwrap_err();
    assert_eq!(
      fields(&errors),
      ["reviewer_name", "reviewer_role", "outcome", "decision"]
    );
    assert_eq!(errors[3].message, "A sign-off decision is required.");
  }

  #[test]
  fn valid_review_returns_decision() {
    let input = ReviewInput {
      reviewer_name: "R. Manager".into(),
      reviewer_role: "Registered Manager".into(),
      outcome:       "Falls plan updated.".into(),
      decision:      "Accepted".into(),
    };
    assert_eq!(validate_review(&input).unwrap(), SignoffDecision::Accepted);
  }
}
