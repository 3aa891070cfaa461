use axum::extract::State;
use macros::route;

use crate::{extract::Json, openapi::tag};

use super::{model, HealthService};

/// Health check
/// Checks the health of the service and its dependencies: database connectivity,
/// uptime and memory usage. Always responds with 200; the outcome is in the `status` field.
#[route(tag = tag::HEALTH)]
pub async fn check(State(health): State<HealthService>) -> Json<model::HealthCheck> {
	Json(health.check().await)
}
