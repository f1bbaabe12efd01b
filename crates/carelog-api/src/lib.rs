//! JSON REST API for the carelog incident register.
//!
//! Exposes an axum [`Router`] backed by an [`IncidentRegister`] over any
//! [`carelog_core::store::IncidentStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", carelog_api::api_router(register.clone()))
//! ```

pub mod error;
pub mod etag;
pub mod export;
pub mod incidents;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use carelog_core::{IncidentRegister, store::IncidentStore};

pub use error::ApiError;

/// Build the API router for `register`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(register: Arc<IncidentRegister<S>>) -> Router<()>
where
  S: IncidentStore + 'static,
{
  Router::new()
    // Incidents
    .route(
      "/incidents",
      get(incidents::list::<S>).post(incidents::create::<S>),
    )
    .route("/incidents/{id}", get(incidents::get_one::<S>))
    .route("/incidents/{id}/review", post(incidents::review::<S>))
    .route("/incidents/{id}/reviews", get(incidents::history::<S>))
    // Export
    .route("/export.csv", get(export::handler::<S>))
    .with_state(register)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use carelog_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  async fn make_router() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(IncidentRegister::new(store)))
  }

  async fn oneshot_raw(
    router:  Router,
    method:  &str,
    uri:     &str,
    headers: Vec<(header::HeaderName, &str)>,
    body:    Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    router.oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn draft(resident: &str, severity: &str) -> Value {
    json!({
      "incident_date": "2024-03-05",
      "incident_time": "13:45:00",
      "category": "Fall",
      "location": "Lounge",
      "resident_identifier": resident,
      "incident_account": "Found on the floor beside the chair.",
      "harm_injury_sustained": false,
      "individuals_services_informed": ["Family / next of kin", "Nurse in charge"],
      "severity": severity,
      "reported_by_name": "J. Smith",
      "reported_by_role": "Care assistant",
      "attestation": true
    })
  }

  fn review_body() -> Value {
    json!({
      "reviewer_name": "M. Jones",
      "reviewer_role": "Registered manager",
      "outcome": "Falls risk reassessed.",
      "decision": "Accepted"
    })
  }

  async fn submit(router: &Router, resident: &str, severity: &str) -> (String, String) {
    let resp = oneshot_raw(
      router.clone(),
      "POST",
      "/incidents",
      vec![],
      Some(draft(resident, severity)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let etag = resp.headers()[header::ETAG].to_str().unwrap().to_owned();
    let json = body_json(resp).await;
    (json["incident_id"].as_str().unwrap().to_owned(), etag)
  }

  // ── Submit ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn submit_returns_201_with_pending_record() {
    let router = make_router().await;
    let resp = oneshot_raw(
      router,
      "POST",
      "/incidents",
      vec![],
      Some(draft("R-1042", "High")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().contains_key(header::ETAG));

    let json = body_json(resp).await;
    assert!(json["incident_id"].as_str().unwrap().starts_with("CSI-"));
    assert_eq!(json["review"]["management_review_status"], "Pending");
    assert_eq!(json["audit_integrity_confirmation"], "Confirmed");
    assert_eq!(json["harm_injury_details"], "No harm or injury sustained");
    assert_eq!(
      json["individuals_services_informed"],
      json!(["Nurse in charge", "Family / next of kin"])
    );
    assert_eq!(json["version"], 1);
  }

  #[tokio::test]
  async fn submit_with_blank_fields_returns_422_listing_each() {
    let router = make_router().await;
    let mut body = draft("   ", "Low");
    body["location"] = json!("");
    body["attestation"] = json!(false);

    let resp = oneshot_raw(router.clone(), "POST", "/incidents", vec![], Some(body)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(resp).await;
    let fields: Vec<_> = json["field_errors"]
      .as_array()
      .unwrap()
      .iter()
      .map(|e| e["field"].as_str().unwrap().to_owned())
      .collect();
    assert_eq!(fields, ["resident_identifier", "location", "attestation"]);

    let list = oneshot_raw(router, "GET", "/incidents", vec![], None).await;
    assert_eq!(body_json(list).await, json!([]));
  }

  #[tokio::test]
  async fn submit_with_unknown_category_is_bad_request() {
    let router = make_router().await;
    let mut body = draft("R-1", "Low");
    body["category"] = json!("Volcano");
    let resp = oneshot_raw(router, "POST", "/incidents", vec![], Some(body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn submit_with_omitted_fields_returns_422_listing_each() {
    let router = make_router().await;
    let mut body = draft("R-1", "Low");
    body.as_object_mut().unwrap().remove("location");
    body["attestation"] = json!(false);

    let resp = oneshot_raw(router, "POST", "/incidents", vec![], Some(body)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(resp).await;
    let fields: Vec<_> = json["field_errors"]
      .as_array()
      .unwrap()
      .iter()
      .map(|e| e["field"].as_str().unwrap().to_owned())
      .collect();
    assert_eq!(fields, ["location", "attestation"]);
  }

  // ── Fetch ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_returns_record_with_matching_etag() {
    let router = make_router().await;
    let (id, etag) = submit(&router, "R-1", "Low").await;

    let resp = oneshot_raw(router, "GET", &format!("/incidents/{id}"), vec![], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::ETAG].to_str().unwrap(), etag);
    assert_eq!(body_json(resp).await["incident_id"], id.as_str());
  }

  #[tokio::test]
  async fn get_missing_returns_404() {
    let router = make_router().await;
    let resp = oneshot_raw(router, "GET", "/incidents/CSI-none", vec![], None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_json(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn list_applies_filters() {
    let router = make_router().await;
    submit(&router, "R-1", "High").await;
    submit(&router, "R-2", "Low").await;
    submit(&router, "R-3", "High").await;

    let resp = oneshot_raw(router.clone(), "GET", "/incidents?severity=high", vec![], None).await;
    let json = body_json(resp).await;
    let residents: Vec<_> = json
      .as_array()
      .unwrap()
      .iter()
      .map(|r| r["resident_identifier"].as_str().unwrap().to_owned())
      .collect();
    assert_eq!(residents, ["R-3", "R-1"]);

    let resp = oneshot_raw(router.clone(), "GET", "/incidents?q=r-2&status=", vec![], None).await;
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);

    let resp = oneshot_raw(router, "GET", "/incidents?status=Archived", vec![], None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn malformed_query_returns_json_error() {
    let router = make_router().await;
    let resp = oneshot_raw(router, "GET", "/incidents?care_home_id=abc", vec![], None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let json = body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("care_home_id"));
  }

  // ── Review ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn review_completes_incident_and_changes_etag() {
    let router = make_router().await;
    let (id, etag) = submit(&router, "R-1", "Moderate").await;

    let resp = oneshot_raw(
      router.clone(),
      "POST",
      &format!("/incidents/{id}/review"),
      vec![(header::IF_MATCH, etag.as_str())],
      Some(review_body()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_ne!(resp.headers()[header::ETAG].to_str().unwrap(), etag);

    let json = body_json(resp).await;
    assert_eq!(json["review"]["management_review_status"], "Completed");
    assert_eq!(json["review"]["reviewer_name"], "M. Jones");
    assert_eq!(json["review"]["decision"], "Accepted");
    assert_eq!(json["version"], 2);
  }

  #[tokio::test]
  async fn review_with_stale_etag_returns_412() {
    let router = make_router().await;
    let (id, etag) = submit(&router, "R-1", "Moderate").await;
    let uri = format!("/incidents/{id}/review");

    let first = oneshot_raw(
      router.clone(),
      "POST",
      &uri,
      vec![(header::IF_MATCH, etag.as_str())],
      Some(review_body()),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = oneshot_raw(
      router,
      "POST",
      &uri,
      vec![(header::IF_MATCH, etag.as_str())],
      Some(review_body()),
    )
    .await;
    assert_eq!(second.status(), StatusCode::PRECONDITION_FAILED);
  }

  #[tokio::test]
  async fn review_with_stale_expected_version_returns_412() {
    let router = make_router().await;
    let (id, _) = submit(&router, "R-1", "Moderate").await;
    let mut body = review_body();
    body["expected_version"] = json!(7);

    let resp = oneshot_raw(
      router,
      "POST",
      &format!("/incidents/{id}/review"),
      vec![],
      Some(body),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);
  }

  #[tokio::test]
  async fn review_missing_incident_returns_404() {
    let router = make_router().await;
    let resp = oneshot_raw(
      router,
      "POST",
      "/incidents/CSI-none/review",
      vec![],
      Some(review_body()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn review_without_decision_returns_422() {
    let router = make_router().await;
    let (id, _) = submit(&router, "R-1", "Moderate").await;

    let resp = oneshot_raw(
      router.clone(),
      "POST",
      &format!("/incidents/{id}/review"),
      vec![],
      Some(json!({ "reviewer_name": "M. Jones" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(resp).await;
    assert_eq!(json["field_errors"].as_array().unwrap().len(), 3);

    let resp = oneshot_raw(router, "GET", &format!("/incidents/{id}"), vec![], None).await;
    assert_eq!(
      body_json(resp).await["review"]["management_review_status"],
      "Pending"
    );
  }

  #[tokio::test]
  async fn re_review_is_recorded_in_history() {
    let router = make_router().await;
    let (id, _) = submit(&router, "R-1", "Critical").await;
    let uri = format!("/incidents/{id}/review");

    oneshot_raw(router.clone(), "POST", &uri, vec![], Some(review_body())).await;
    let mut correction = review_body();
    correction["reviewer_name"] = json!("A. Deputy");
    correction["decision"] = json!("Further action required");
    let resp = oneshot_raw(router.clone(), "POST", &uri, vec![], Some(correction)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = oneshot_raw(router, "GET", &format!("/incidents/{id}/reviews"), vec![], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let names: Vec<_> = json
      .as_array()
      .unwrap()
      .iter()
      .map(|e| e["review"]["reviewer_name"].as_str().unwrap().to_owned())
      .collect();
    assert_eq!(names, ["M. Jones", "A. Deputy"]);
  }

  #[tokio::test]
  async fn history_of_missing_incident_returns_404() {
    let router = make_router().await;
    let resp = oneshot_raw(router, "GET", "/incidents/CSI-none/reviews", vec![], None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Export ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn export_returns_csv_attachment() {
    let router = make_router().await;
    let (id, _) = submit(&router, "R-1", "Low").await;

    let resp = oneshot_raw(router, "GET", "/export.csv", vec![], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
      resp.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv")
    );
    let disposition = resp.headers()[header::CONTENT_DISPOSITION]
      .to_str()
      .unwrap()
      .to_owned();
    assert!(disposition.contains("clinical_safety_incidents_"));

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = text.split("\r\n");
    assert!(lines.next().unwrap().starts_with("Incident ID,"));
    assert!(lines.next().unwrap().starts_with(&id));
  }
}
