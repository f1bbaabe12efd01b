//! The `IncidentStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `carelog-store-sqlite`).
//! Higher layers (`carelog-api`, `carelog-server`) depend on the
//! [`IncidentRegister`](crate::IncidentRegister), which depends on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  id::IncidentId,
  incident::{IncidentRecord, Severity},
  lifecycle::{ManagementReview, ReviewEntry, ReviewStatus},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`IncidentStore::list`]. Every predicate is optional and
/// set predicates are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentFilter {
  pub status:       Option<ReviewStatus>,
  pub severity:     Option<Severity>,
  /// Case-insensitive substring over incident id, resident identifier,
  /// location and category. Blank text matches everything.
  pub text:         Option<String>,
  pub care_home_id: Option<i64>,
}

impl IncidentFilter {
  /// The lowercased search needle, or `None` when there is nothing to search
  /// for.
  pub fn needle(&self) -> Option<String> {
    self
      .text
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(str::to_lowercase)
  }

  pub fn matches_text(&self, record: &IncidentRecord) -> bool {
    let Some(needle) = self.needle() else {
      return true;
    };
    [
      record.incident_id.as_str(),
      record.report.resident_identifier.as_str(),
      record.report.location.as_str(),
      record.report.category.as_str(),
    ]
    .into_iter()
    .any(|hay| hay.to_lowercase().contains(&needle))
  }

  pub fn matches(&self, record: &IncidentRecord) -> bool {
    self.status.is_none_or(|s| record.status() == s)
      && self.severity.is_none_or(|s| record.report.severity == s)
      && self
        .care_home_id
        .is_none_or(|id| record.care_home_id == Some(id))
      && self.matches_text(record)
  }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of [`IncidentStore::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
  Inserted,
  /// A record with the same incident id already exists; nothing was written.
  DuplicateId,
}

/// Result of [`IncidentStore::update_review`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewUpdate {
  Updated {
    record:   IncidentRecord,
    /// The review this update overwrote, if the incident was already
    /// completed.
    replaced: Option<ManagementReview>,
  },
  NotFound,
  /// The caller's expected version did not match; nothing was written.
  VersionMismatch { current: u32 },
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an incident store backend.
///
/// Reporting fields are write-once: there is no method that
/// updates them. The only mutation is [`IncidentStore::update_review`],
/// which must write the review, bump the version and append to the review
/// history atomically.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait IncidentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a freshly submitted record.
  fn insert<'a>(
    &'a self,
    record: &'a IncidentRecord,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + 'a;

  /// Replace the review fields of an incident, set its status to
  /// `Completed` and increment its version.
  ///
  /// When `expected_version` is set the update only happens if it equals
  /// the stored version.
  fn update_review(
    &self,
    incident_id: IncidentId,
    review: ManagementReview,
    expected_version: Option<u32>,
  ) -> impl Future<Output = Result<ReviewUpdate, Self::Error>> + Send + '_;

  /// Retrieve an incident by id. Returns `None` if not found.
  fn get(
    &self,
    incident_id: IncidentId,
  ) -> impl Future<Output = Result<Option<IncidentRecord>, Self::Error>> + Send + '_;

  /// All incidents matching `filter`, most recently submitted first.
  fn list<'a>(
    &'a self,
    filter: &'a IncidentFilter,
  ) -> impl Future<Output = Result<Vec<IncidentRecord>, Self::Error>> + Send + 'a;

  /// Every review ever recorded for an incident, oldest first. Returns
  /// `None` if the incident does not exist.
  fn review_history(
    &self,
    incident_id: IncidentId,
  ) -> impl Future<Output = Result<Option<Vec<ReviewEntry>>, Self::Error>> + Send + '_;
}
