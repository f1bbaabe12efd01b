//! The management half of an incident: review state, sign-off decisions and
//! the append-only review history.
//!
//! An incident is either unreviewed or fully reviewed. There is no partially
//! reviewed state, and [`ReviewState`] makes one unrepresentable.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, id::IncidentId};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewStatus {
  Pending,
  Completed,
}

impl ReviewStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "Pending",
      Self::Completed => "Completed",
    }
  }
}

impl FromStr for ReviewStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pending" => Ok(Self::Pending),
      "completed" => Ok(Self::Completed),
      _ => Err(Error::UnknownValue {
        kind:  "review status",
        value: s.to_owned(),
      }),
    }
  }
}

// ─── Sign-off ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignoffDecision {
  Accepted,
  #[serde(rename = "Further action required")]
  FurtherActionRequired,
  #[serde(rename = "Re-opened for clarification")]
  ReopenedForClarification,
}

impl SignoffDecision {
  pub const ALL: [Self; 3] = [
    Self::Accepted,
    Self::FurtherActionRequired,
    Self::ReopenedForClarification,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Accepted => "Accepted",
      Self::FurtherActionRequired => "Further action required",
      Self::ReopenedForClarification => "Re-opened for clarification",
    }
  }
}

impl FromStr for SignoffDecision {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let wanted = s.trim();
    Self::ALL
      .into_iter()
      .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
      .ok_or_else(|| Error::UnknownValue {
        kind:  "sign-off decision",
        value: s.to_owned(),
      })
  }
}

// ─── Review ──────────────────────────────────────────────────────────────────

/// A completed management review and sign-off. All five fields are set
/// together or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementReview {
  pub reviewer_name:     String,
  pub reviewer_role:     String,
  pub outcome:           String,
  pub decision:          SignoffDecision,
  pub signoff_timestamp: DateTime<Utc>,
}

/// The review state of an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "management_review_status")]
pub enum ReviewState {
  Pending,
  Completed(ManagementReview),
}

impl ReviewState {
  pub fn status(&self) -> ReviewStatus {
    match self {
      Self::Pending => ReviewStatus::Pending,
      Self::Completed(_) => ReviewStatus::Completed,
    }
  }

  pub fn review(&self) -> Option<&ManagementReview> {
    match self {
      Self::Pending => None,
      Self::Completed(r) => Some(r),
    }
  }
}

/// Raw reviewer input to [`crate::IncidentRegister::review_and_signoff`].
///
/// `decision` stays a string so that a blank or unknown value can be
/// reported alongside the other field errors. Missing fields deserialize as
/// blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewInput {
  pub reviewer_name: String,
  pub reviewer_role: String,
  pub outcome:       String,
  pub decision:      String,
}

// ─── History ─────────────────────────────────────────────────────────────────

/// One entry in an incident's append-only review history. Every successful
/// review appends an entry, so re-reviews never lose the review they
/// replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
  pub review_id:   Uuid,
  pub incident_id: IncidentId,
  pub review:      ManagementReview,
  /// The record version this review produced.
  pub version:     u32,
}
