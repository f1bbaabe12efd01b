//! [`IncidentRegister`], the incident lifecycle manager.
//!
//! Owns the only two state transitions an incident has:
//!
//! ```text
//! [none] --submit--> Pending --review_and_signoff--> Completed
//!                                 Completed --review_and_signoff--> Completed
//! ```
//!
//! Submissions and reviews are validated here, before the store is touched.
//! Store failures are passed straight back to the caller; nothing is retried.

use chrono::Utc;

use crate::{
  Error, Result,
  id::{IdGenerator, IncidentId},
  incident::{AuditConfirmation, IncidentDraft, IncidentRecord},
  lifecycle::{ManagementReview, ReviewEntry, ReviewInput, ReviewState},
  store::{IncidentFilter, IncidentStore, InsertOutcome, ReviewUpdate},
  validate::{validate_draft, validate_review},
};

pub struct IncidentRegister<S> {
  store: S,
  ids:   IdGenerator,
}

impl<S: IncidentStore> IncidentRegister<S> {
  pub fn new(store: S) -> Self { Self { store, ids: IdGenerator::new() } }

  pub fn store(&self) -> &S { &self.store }

  /// Validate and persist a new incident. The returned record is `Pending`
  /// with every management field blank.
  pub async fn submit(&self, draft: IncidentDraft) -> Result<IncidentRecord> {
    if let Err(errors) = validate_draft(&draft) {
      tracing::warn!(errors = errors.len(), "rejected incident submission");
      return Err(Error::ValidationFailed(errors));
    }

    let now = Utc::now();
    let record = IncidentRecord {
      incident_id:                  self.ids.next_at(now),
      care_home_id:                 draft.care_home_id,
      report:                       draft.report.normalized(),
      audit_integrity_confirmation: AuditConfirmation::Confirmed,
      submitted_timestamp:          now,
      review:                       ReviewState::Pending,
      version:                      1,
    };

    match self.store.insert(&record).await.map_err(Error::store)? {
      InsertOutcome::Inserted => {}
      InsertOutcome::DuplicateId => {
        return Err(Error::DuplicateId(record.incident_id));
      }
    }

    tracing::info!(
      incident_id = %record.incident_id,
      category = record.report.category.as_str(),
      severity = record.report.severity.as_str(),
      "incident submitted"
    );
    Ok(record)
  }

  /// Record a management review and sign-off.
  ///
  /// Reviewing a completed incident is allowed: the new review replaces the
  /// current one, the replaced review stays in the review history, and the
  /// status remains `Completed`. Pass `expected_version` to fail with
  /// [`Error::Conflict`] instead of overwriting a concurrent change.
  pub async fn review_and_signoff(
    &self,
    incident_id: &IncidentId,
    input: ReviewInput,
    expected_version: Option<u32>,
  ) -> Result<IncidentRecord> {
    let decision = validate_review(&input).map_err(Error::ValidationFailed)?;

    let review = ManagementReview {
      reviewer_name: input.reviewer_name.trim().to_owned(),
      reviewer_role: input.reviewer_role.trim().to_owned(),
      outcome: input.outcome.trim().to_owned(),
      decision,
      signoff_timestamp: Utc::now(),
    };

    let update = self
      .store
      .update_review(incident_id.clone(), review, expected_version)
      .await
      .map_err(Error::store)?;

    match update {
      ReviewUpdate::Updated { record, replaced } => {
        if let Some(previous) = replaced {
          tracing::warn!(
            %incident_id,
            previous_reviewer = %previous.reviewer_name,
            previous_decision = previous.decision.as_str(),
            version = record.version,
            "completed review overwritten by a correction"
          );
        } else {
          tracing::info!(
            %incident_id,
            decision = decision.as_str(),
            "incident reviewed and signed off"
          );
        }
        Ok(record)
      }
      ReviewUpdate::NotFound => Err(Error::NotFound(incident_id.clone())),
      ReviewUpdate::VersionMismatch { current } => Err(Error::Conflict {
        incident_id: incident_id.clone(),
        expected: expected_version.unwrap_or_default(),
        current,
      }),
    }
  }

  pub async fn fetch(
    &self,
    incident_id: &IncidentId,
  ) -> Result<Option<IncidentRecord>> {
    self.store.get(incident_id.clone()).await.map_err(Error::store)
  }

  /// All incidents matching `filter`, most recently submitted first.
  pub async fn fetch_all(
    &self,
    filter: &IncidentFilter,
  ) -> Result<Vec<IncidentRecord>> {
    self.store.list(filter).await.map_err(Error::store)
  }

  /// The full review history of an incident, oldest first.
  pub async fn review_history(
    &self,
    incident_id: &IncidentId,
  ) -> Result<Vec<ReviewEntry>> {
    self
      .store
      .review_history(incident_id.clone())
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(incident_id.clone()))
  }
}
