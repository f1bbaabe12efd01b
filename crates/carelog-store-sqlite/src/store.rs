//! [`SqliteStore`], the SQLite implementation of [`IncidentStore`].

use std::path::Path;

use carelog_core::{
  id::IncidentId,
  incident::IncidentRecord,
  lifecycle::{ManagementReview, ReviewEntry},
  store::{IncidentFilter, IncidentStore, InsertOutcome, ReviewUpdate},
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    INCIDENT_COLUMNS, RawIncident, RawReviewEntry, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An incident store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

/// What the review transaction found, before decoding.
enum RawReviewUpdate {
  Updated { before: RawIncident, after: RawIncident },
  NotFound,
  VersionMismatch(i64),
}

fn select_incident(
  conn: &rusqlite::Connection,
  incident_id: &str,
) -> rusqlite::Result<Option<RawIncident>> {
  conn
    .query_row(
      &format!("SELECT {INCIDENT_COLUMNS} FROM incidents WHERE incident_id = ?1"),
      rusqlite::params![incident_id],
      RawIncident::from_row,
    )
    .optional()
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── IncidentStore impl ──────────────────────────────────────────────────────

impl IncidentStore for SqliteStore {
  type Error = crate::Error;

  async fn insert(&self, record: &IncidentRecord) -> Result<InsertOutcome> {
    let raw = RawIncident::from_record(record);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if select_incident(&tx, &raw.incident_id)?.is_some() {
          return Ok(InsertOutcome::DuplicateId);
        }
        tx.execute(
          &format!(
            "INSERT INTO incidents ({INCIDENT_COLUMNS}) VALUES (
               ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
               ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27
             )"
          ),
          rusqlite::params![
            raw.incident_id,
            raw.care_home_id,
            raw.incident_date,
            raw.incident_time,
            raw.category,
            raw.location,
            raw.resident_identifier,
            raw.resident_dob,
            raw.resident_room,
            raw.incident_account,
            raw.immediate_actions_taken,
            raw.harm_injury_sustained,
            raw.harm_injury_details,
            raw.individuals_services_informed,
            raw.severity,
            raw.reported_by_name,
            raw.reported_by_role,
            raw.immediate_learning_actions,
            raw.audit_integrity_confirmation,
            raw.submitted_timestamp,
            raw.management_review_status,
            raw.management_reviewer_name,
            raw.management_reviewer_role,
            raw.management_review_outcome,
            raw.signoff_decision,
            raw.signoff_timestamp,
            raw.version,
          ],
        )?;
        tx.commit()?;
        Ok(InsertOutcome::Inserted)
      })
      .await?;

    tracing::debug!(incident_id = %record.incident_id, ?outcome, "insert");
    Ok(outcome)
  }

  async fn update_review(
    &self,
    incident_id: IncidentId,
    review: ManagementReview,
    expected_version: Option<u32>,
  ) -> Result<ReviewUpdate> {
    let id_str        = incident_id.to_string();
    let review_id_str = encode_uuid(Uuid::new_v4());
    let decision_str  = review.decision.as_str().to_owned();
    let signoff_str   = encode_dt(review.signoff_timestamp);
    let expected      = expected_version.map(i64::from);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(before) = select_incident(&tx, &id_str)? else {
          return Ok(RawReviewUpdate::NotFound);
        };
        if let Some(expected) = expected
          && expected != before.version
        {
          return Ok(RawReviewUpdate::VersionMismatch(before.version));
        }
        let new_version = before.version + 1;

        tx.execute(
          "INSERT INTO review_history (
             review_id, incident_id, reviewer_name, reviewer_role, outcome,
             decision, signoff_timestamp, version
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            review_id_str,
            id_str,
            review.reviewer_name,
            review.reviewer_role,
            review.outcome,
            decision_str,
            signoff_str,
            new_version,
          ],
        )?;

        tx.execute(
          "UPDATE incidents SET
             management_review_status  = 'Completed',
             management_reviewer_name  = ?2,
             management_reviewer_role  = ?3,
             management_review_outcome = ?4,
             signoff_decision          = ?5,
             signoff_timestamp         = ?6,
             version                   = ?7
           WHERE incident_id = ?1",
          rusqlite::params![
            id_str,
            review.reviewer_name,
            review.reviewer_role,
            review.outcome,
            decision_str,
            signoff_str,
            new_version,
          ],
        )?;

        let after = select_incident(&tx, &id_str)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(RawReviewUpdate::Updated { before, after })
      })
      .await?;

    match raw {
      RawReviewUpdate::Updated { before, after } => {
        let replaced = before.into_record()?.review.review().cloned();
        let record = after.into_record()?;
        tracing::debug!(%incident_id, version = record.version, "review written");
        Ok(ReviewUpdate::Updated { record, replaced })
      }
      RawReviewUpdate::NotFound => Ok(ReviewUpdate::NotFound),
      RawReviewUpdate::VersionMismatch(current) => {
        Ok(ReviewUpdate::VersionMismatch {
          current: u32::try_from(current).unwrap_or(u32::MAX),
        })
      }
    }
  }

  async fn get(&self, incident_id: IncidentId) -> Result<Option<IncidentRecord>> {
    let id_str = incident_id.into_inner();

    let raw = self
      .conn
      .call(move |conn| Ok(select_incident(conn, &id_str)?))
      .await?;

    raw.map(RawIncident::into_record).transpose()
  }

  async fn list(&self, filter: &IncidentFilter) -> Result<Vec<IncidentRecord>> {
    // Exact-match predicates go to SQL; the Unicode-aware text search is
    // applied to the decoded records below.
    let status_str   = filter.status.map(|s| s.as_str().to_owned());
    let severity_str = filter.severity.map(|s| s.as_str().to_owned());
    let care_home_id = filter.care_home_id;

    let raws: Vec<RawIncident> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {INCIDENT_COLUMNS}
           FROM incidents
           WHERE (?1 IS NULL OR management_review_status = ?1)
             AND (?2 IS NULL OR severity = ?2)
             AND (?3 IS NULL OR care_home_id = ?3)
           ORDER BY submitted_timestamp DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![status_str, severity_str, care_home_id],
            RawIncident::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut records = raws
      .into_iter()
      .map(RawIncident::into_record)
      .collect::<Result<Vec<_>>>()?;
    records.retain(|r| filter.matches_text(r));
    Ok(records)
  }

  async fn review_history(
    &self,
    incident_id: IncidentId,
  ) -> Result<Option<Vec<ReviewEntry>>> {
    let id_str = incident_id.into_inner();

    let raws: Option<Vec<RawReviewEntry>> = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM incidents WHERE incident_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }

        let mut stmt = conn.prepare(
          "SELECT review_id, incident_id, reviewer_name, reviewer_role,
                  outcome, decision, signoff_timestamp, version
           FROM review_history
           WHERE incident_id = ?1
           ORDER BY version ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawReviewEntry {
              review_id:         row.get(0)?,
              incident_id:       row.get(1)?,
              reviewer_name:     row.get(2)?,
              reviewer_role:     row.get(3)?,
              outcome:           row.get(4)?,
              decision:          row.get(5)?,
              signoff_timestamp: row.get(6)?,
              version:           row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(rows))
      })
      .await?;

    raws
      .map(|entries| {
        entries
          .into_iter()
          .map(RawReviewEntry::into_entry)
          .collect::<Result<Vec<_>>>()
      })
      .transpose()
  }
}
