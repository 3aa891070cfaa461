use std::borrow::Cow;

use aide::OperationOutput;
use axum::{
	body::Body,
	extract::rejection,
	http::{header, HeaderMap, HeaderValue, Response, StatusCode},
	response::IntoResponse,
	Json,
};
use axum_jsonschema::JsonSchemaRejection;
use schemars::JsonSchema;
use serde::Serialize;
use tower_governor::GovernorError;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error, as presented to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// A short, machine-readable description of the error.
	pub content: Cow<'a, str>,
	/// The request field that caused the error, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	/// Additional context for the error.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	/// Sets the field from a location such as `/tags/0` or `tags[0]`,
	/// leaving it unset for the document root.
	#[must_use]
	pub fn field_at(self, location: &str) -> Self {
		let field = location
			.split(['/', '.', '[', ']'])
			.filter(|segment| !segment.is_empty())
			.collect::<Vec<_>>()
			.join(".");

		if field.is_empty() {
			self
		} else {
			self.field(field)
		}
	}

	#[must_use]
	pub fn detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse<'a> {
	pub success: bool,
	pub errors: Vec<Message<'a>>,
}

/// An error that knows which status code it maps to and how it
/// is presented to the client.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn into_errors(self) -> Vec<Message<'static>>;

	/// Extra headers sent along with the error.
	fn headers(&self) -> Option<HeaderMap> {
		None
	}
}

fn respond<E: ErrorShape>(error: E) -> Response<Body> {
	let status = error.status();
	let headers = error.headers();

	if status.is_server_error() {
		tracing::error!(%error, "request failed");
	} else {
		tracing::debug!(%error, "request rejected");
	}

	let mut response = (
		status,
		Json(ErrorResponse {
			success: false,
			errors: error.into_errors(),
		}),
	)
		.into_response();

	if let Some(headers) = headers {
		response.headers_mut().extend(headers);
	}

	response
}

/// Errors raised outside of a specific route, mostly by extractors
/// and middleware.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0:?}")]
	Json(JsonSchemaRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("rate limit error: {0}")]
	RateLimit(#[from] GovernorError),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

impl From<JsonSchemaRejection> for AppError {
	fn from(rejection: JsonSchemaRejection) -> Self {
		Self::Json(rejection)
	}
}

impl ErrorShape for AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Json(..) | Self::Path(..) => StatusCode::BAD_REQUEST,
			Self::RateLimit(GovernorError::TooManyRequests { .. }) => StatusCode::TOO_MANY_REQUESTS,
			Self::RateLimit(GovernorError::Other { code, .. }) => *code,
			Self::RateLimit(..) | Self::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<Message<'static>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors.iter().map(move |error| {
						let content = error
							.message
							.as_ref()
							.map_or_else(|| error.code.to_string(), ToString::to_string);
						let message = Message::new(content).field(field.to_string());

						error
							.params
							.iter()
							.filter(|(key, _)| *key != "value")
							.fold(message, |message, (key, value)| {
								message.detail(key.to_string(), value.clone())
							})
					})
				})
				.collect(),
			Self::Json(JsonSchemaRejection::Json(rejection)) => Message::new("invalid_body")
				.detail("reason", rejection.body_text())
				.into_vec(),
			Self::Json(JsonSchemaRejection::Schema(units)) => units
				.iter()
				.map(|unit| {
					let keyword = unit.keyword_location().to_string();

					Message::new(keyword.rsplit('/').next().unwrap_or_default().to_string())
						.field_at(&unit.instance_location().to_string())
						.detail("reason", unit.error_description().to_string())
				})
				.collect(),
			Self::Json(JsonSchemaRejection::Serde(error)) => Message::new("invalid_body")
				.field_at(&error.path().to_string())
				.detail("reason", error.inner().to_string())
				.into_vec(),
			Self::Path(rejection) => Message::new("invalid_path")
				.detail("reason", rejection.body_text())
				.into_vec(),
			Self::RateLimit(GovernorError::TooManyRequests { wait_time, .. }) => {
				Message::new("too_many_requests")
					.detail("retry_after", wait_time)
					.into_vec()
			}
			Self::RateLimit(GovernorError::Other { msg: Some(msg), .. }) => {
				Message::new(msg).into_vec()
			}
			Self::RateLimit(..) | Self::Database(..) => {
				Message::new("internal_server_error").into_vec()
			}
		}
	}

	fn headers(&self) -> Option<HeaderMap> {
		match self {
			Self::RateLimit(GovernorError::TooManyRequests { wait_time, headers }) => {
				let mut headers = headers.clone().unwrap_or_default();

				headers.insert(header::RETRY_AFTER, HeaderValue::from(*wait_time));
				Some(headers)
			}
			Self::RateLimit(GovernorError::Other { headers, .. }) => headers.clone(),
			_ => None,
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		respond(self)
	}
}

/// The error type returned by route handlers.
///
/// Wraps the route's own error enum so every route error is rendered
/// the same way.
#[derive(Debug)]
pub struct RouteError<E>(pub E);

impl<E: ErrorShape> From<E> for RouteError<E> {
	fn from(error: E) -> Self {
		Self(error)
	}
}

impl<E: ErrorShape> IntoResponse for RouteError<E> {
	fn into_response(self) -> Response<Body> {
		respond(self.0)
	}
}

impl<E> OperationOutput for RouteError<E> {
	type Inner = ErrorResponse<'static>;
}
