use aide::axum::{routing::get_with, ApiRouter};

use crate::AppState;

pub mod model;
pub mod route;
pub mod service;

pub use service::{HealthService, Probe};

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route("/health", get_with(check, check_docs))
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_health_ok() {
		let app = app();

		let response = app.get("/health").await;
		let body = response.json::<Value>();

		assert_eq!(response.status_code(), 200);
		assert_eq!(body["status"], "ok");
		assert_eq!(body["database"]["status"], "connected");
		assert!(body["database"]["responseTime"].as_u64().is_some());
		assert!(body["database"].get("error").is_none());
		assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
		assert!(body["uptime"].as_f64().unwrap() >= 0.0);

		let percentage = body["memory"]["percentage"].as_f64().unwrap();

		assert!(percentage > 0.0 && percentage <= 100.0);
	}

	#[tokio::test]
	async fn test_health_reports_database_errors_with_200() {
		let app = app_with(state_with_probe(FailingProbe));

		let response = app.get("/health").await;
		let body = response.json::<Value>();

		assert_eq!(response.status_code(), 200);
		assert_eq!(body["status"], "error");
		assert_eq!(body["database"]["status"], "disconnected");
		assert!(body["database"]["error"].is_string());
		assert!(body["database"].get("responseTime").is_none());
	}
}
