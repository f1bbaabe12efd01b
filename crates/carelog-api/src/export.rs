//! `GET /export.csv`: the whole register as a CSV download.

use std::sync::Arc;

use axum::{extract::State, http::header, response::IntoResponse};
use carelog_core::{
  IncidentRegister,
  store::{IncidentFilter, IncidentStore},
};
use chrono::Utc;

use crate::error::ApiError;

pub async fn handler<S>(
  State(register): State<Arc<IncidentRegister<S>>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: IncidentStore + 'static,
{
  let records = register.fetch_all(&IncidentFilter::default()).await?;
  let file_name = carelog_export::export_file_name(Utc::now());
  tracing::info!(rows = records.len(), %file_name, "register exported");

  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{file_name}\""),
      ),
    ],
    carelog_export::to_csv(&records),
  ))
}
