//! Handlers for `/incidents` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/incidents` | Optional `status`, `severity`, `q`, `care_home_id` |
//! | `POST` | `/incidents` | Body: [`IncidentDraft`]; returns 201 + record + `ETag` |
//! | `GET`  | `/incidents/:id` | Single record + `ETag` |
//! | `POST` | `/incidents/:id/review` | Body: [`ReviewBody`]; honours `If-Match` |
//! | `GET`  | `/incidents/:id/reviews` | Review history, oldest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use carelog_core::{
  IncidentRegister,
  id::IncidentId,
  incident::{IncidentDraft, IncidentRecord, Severity},
  lifecycle::{ReviewEntry, ReviewInput, ReviewStatus},
  store::{IncidentFilter, IncidentStore},
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  etag::{compute_etag, strip_etag_quotes},
};

fn with_etag(record: IncidentRecord) -> impl IntoResponse {
  ([(header::ETAG, compute_etag(&record))], Json(record))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  payload
    .map(|Json(t)| t)
    .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// Query parameters for `GET /incidents`. Blank values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub status:       Option<String>,
  pub severity:     Option<String>,
  /// Free-text search over id, resident, location and category.
  pub q:            Option<String>,
  pub care_home_id: Option<i64>,
}

fn non_blank(s: Option<&str>) -> Option<&str> {
  s.map(str::trim).filter(|s| !s.is_empty())
}

impl TryFrom<ListParams> for IncidentFilter {
  type Error = ApiError;

  fn try_from(p: ListParams) -> Result<Self, ApiError> {
    let status = non_blank(p.status.as_deref())
      .map(str::parse::<ReviewStatus>)
      .transpose()?;
    let severity = non_blank(p.severity.as_deref())
      .map(str::parse::<Severity>)
      .transpose()?;
    Ok(IncidentFilter {
      status,
      severity,
      text: p.q,
      care_home_id: p.care_home_id,
    })
  }
}

/// `GET /incidents[?status=...][&severity=...][&q=...][&care_home_id=...]`
pub async fn list<S>(
  State(register): State<Arc<IncidentRegister<S>>>,
  query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<IncidentRecord>>, ApiError>
where
  S: IncidentStore + 'static,
{
  let Query(params) =
    query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
  let filter = IncidentFilter::try_from(params)?;
  let records = register.fetch_all(&filter).await?;
  Ok(Json(records))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /incidents`: returns 201 + the stored record.
pub async fn create<S>(
  State(register): State<Arc<IncidentRegister<S>>>,
  payload: Result<Json<IncidentDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: IncidentStore + 'static,
{
  let draft = body(payload)?;
  let record = register.submit(draft).await?;
  Ok((StatusCode::CREATED, with_etag(record)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /incidents/:id`
pub async fn get_one<S>(
  State(register): State<Arc<IncidentRegister<S>>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: IncidentStore + 'static,
{
  let id = IncidentId::new(id);
  let record = register
    .fetch(&id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("incident {id} not found")))?;
  Ok(with_etag(record))
}

// ─── Review ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /incidents/:id/review`.
#[derive(Debug, Deserialize)]
pub struct ReviewBody {
  #[serde(flatten)]
  pub input:            ReviewInput,
  /// Fail with 412 unless the stored version still equals this.
  #[serde(default)]
  pub expected_version: Option<u32>,
}

/// `POST /incidents/:id/review`
///
/// An `If-Match` header is checked against the current ETag before the
/// review is attempted; the version it matched is then enforced by the
/// store, so a review landing in between still fails with 412.
pub async fn review<S>(
  State(register): State<Arc<IncidentRegister<S>>>,
  Path(id): Path<String>,
  headers: HeaderMap,
  payload: Result<Json<ReviewBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: IncidentStore + 'static,
{
  let id = IncidentId::new(id);
  let ReviewBody { input, mut expected_version } = body(payload)?;

  let if_match = headers
    .get(header::IF_MATCH)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| *v != "*")
    .map(str::to_owned);

  if let Some(tag) = if_match {
    let current = register
      .fetch(&id)
      .await?
      .ok_or_else(|| ApiError::NotFound(format!("incident {id} not found")))?;
    let current_etag = compute_etag(&current);
    if strip_etag_quotes(&current_etag) != strip_etag_quotes(&tag) {
      return Err(ApiError::PreconditionFailed(format!(
        "incident {id} has changed since it was read"
      )));
    }
    expected_version = expected_version.or(Some(current.version));
  }

  let record = register
    .review_and_signoff(&id, input, expected_version)
    .await?;
  Ok(with_etag(record))
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /incidents/:id/reviews`
pub async fn history<S>(
  State(register): State<Arc<IncidentRegister<S>>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<ReviewEntry>>, ApiError>
where
  S: IncidentStore + 'static,
{
  let entries = register.review_history(&IncidentId::new(id)).await?;
  Ok(Json(entries))
}
