use aide::axum::{
	routing::{delete_with, get_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod repository;
pub mod route;
pub mod service;

pub use service::PostService;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(i32),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(list_posts, list_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route("/:id", delete_with(delete_post, delete_post_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", post)
				.into_vec(),
			Self::Database(..) => error::Message::new("internal_server_error").into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_post_lifecycle() {
		let app = app();

		let response = app.get("/v1/posts").await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>(), json!([]));

		let response = app.post("/v1/posts").json(&json!({ "name": "A" })).await;

		assert_eq!(response.status_code(), 201);
		assert_eq!(response.json::<Value>(), json!({ "id": 1, "name": "A" }));

		let response = app
			.post("/v1/posts")
			.json(&json!({ "name": "B", "description": "d" }))
			.await;

		assert_eq!(response.status_code(), 201);
		assert_eq!(
			response.json::<Value>(),
			json!({ "id": 2, "name": "B", "description": "d" })
		);

		let response = app.get("/v1/posts").await;

		assert_eq!(
			response.json::<Value>(),
			json!([
				{ "id": 1, "name": "A" },
				{ "id": 2, "name": "B", "description": "d" },
			])
		);

		let response = app.delete("/v1/posts/1").await;

		assert_eq!(response.status_code(), 204);
		assert!(response.text().is_empty());

		let response = app.get("/v1/posts").await;

		assert_eq!(
			response.json::<Value>(),
			json!([{ "id": 2, "name": "B", "description": "d" }])
		);

		let response = app.delete("/v1/posts/1").await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "unknown_post");
		assert_eq!(response.json::<Value>()["errors"][0]["details"]["post"], 1);
	}

	#[tokio::test]
	async fn test_create_rejects_invalid_names() {
		let app = app();

		for body in [
			json!({ "name": "" }),
			json!({ "name": "a".repeat(256) }),
			json!({ "description": "missing name" }),
			json!({ "name": 4 }),
		] {
			let response = app.post("/v1/posts").json(&body).await;

			assert_eq!(response.status_code(), 400, "{body}");
			assert_eq!(response.json::<Value>()["success"], false);
		}

		let response = app.get("/v1/posts").await;

		assert_eq!(response.json::<Value>(), json!([]));
	}

	#[tokio::test]
	async fn test_create_lists_failed_constraints() {
		let app = app();

		let response = app.post("/v1/posts").json(&json!({ "name": "" })).await;
		let body = response.json::<Value>();

		assert_eq!(response.status_code(), 400);
		assert_eq!(body["errors"][0]["field"], "name");
		assert_eq!(body["errors"][0]["content"], "minLength");
		assert!(body["errors"][0]["details"]["reason"].is_string());
	}

	#[tokio::test]
	async fn test_create_lists_every_failed_constraint() {
		let app = app();

		let response = app
			.post("/v1/posts")
			.json(&json!({ "name": "", "extra": 1 }))
			.await;
		let body = response.json::<Value>();
		let errors = body["errors"].as_array().unwrap();

		assert_eq!(response.status_code(), 400);
		assert_eq!(errors.len(), 2);
		assert!(errors
			.iter()
			.any(|error| error["field"] == "name" && error["content"] == "minLength"));
		assert!(errors
			.iter()
			.any(|error| error["content"] == "additionalProperties"));
	}

	#[tokio::test]
	async fn test_create_reports_missing_name() {
		let app = app();

		let response = app
			.post("/v1/posts")
			.json(&json!({ "description": "x" }))
			.await;
		let body = response.json::<Value>();

		assert_eq!(response.status_code(), 400);
		assert_eq!(body["errors"][0]["content"], "required");
		assert!(body["errors"][0]["details"]["reason"]
			.as_str()
			.unwrap()
			.contains("name"));
	}

	#[tokio::test]
	async fn test_create_rejects_malformed_json() {
		let app = app();

		let response = app
			.post("/v1/posts")
			.text("{ \"name\": ")
			.content_type("application/json")
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "invalid_body");
	}

	#[tokio::test]
	async fn test_create_accepts_boundary_names() {
		let app = app();
		let name = "a".repeat(255);

		let response = app.post("/v1/posts").json(&json!({ "name": name })).await;

		assert_eq!(response.status_code(), 201);
		assert_eq!(response.json::<Value>()["name"], name);
	}

	#[tokio::test]
	async fn test_create_rejects_unknown_fields() {
		let app = app();

		let response = app
			.post("/v1/posts")
			.json(&json!({ "name": "A", "author": "someone" }))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"additionalProperties"
		);
	}

	#[tokio::test]
	async fn test_delete_rejects_non_integer_ids() {
		let app = app();

		let response = app.delete("/v1/posts/abc").await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "invalid_path");
	}

	#[tokio::test]
	async fn test_delete_unknown_post() {
		let app = app();

		let response = app.delete("/v1/posts/42").await;

		assert_eq!(response.status_code(), 404);
	}
}
