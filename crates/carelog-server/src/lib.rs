//! Process wiring for the `carelog` binary: configuration, provisioning
//! helpers and the HTTP application.

pub mod config;
pub mod provision;

use std::sync::Arc;

use axum::Router;
use carelog_core::{IncidentRegister, store::IncidentStore};
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;

/// The full HTTP application: the incident API with request tracing.
pub fn app<S>(register: Arc<IncidentRegister<S>>) -> Router
where
  S: IncidentStore + 'static,
{
  carelog_api::api_router(register).layer(TraceLayer::new_for_http())
}
