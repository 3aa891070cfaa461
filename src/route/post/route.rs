use aide::axum::IntoApiResponse;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use macros::route;

use crate::{
	error::ErrorResponse,
	extract::{Json, Path},
	openapi::tag,
};

use super::{model, PostService, RouteError};

/// List posts
/// Returns every post, oldest first. Returns an empty array if there are no posts.
#[route(tag = tag::POST)]
pub async fn list_posts(
	State(posts): State<PostService>,
) -> Result<Json<Vec<model::Post>>, RouteError> {
	Ok(Json(posts.list_posts().await?))
}

/// Create post
/// Creates a new post with the provided name and optional description.
/// The name is required and must be between 1 and 255 characters long.
#[route(
	tag = tag::POST,
	response(status = 201, description = "The post was created.", shape = "Json<model::Post>"),
	response(status = 400, description = "The request body is invalid.", shape = "Json<ErrorResponse<'static>>"),
)]
pub async fn create_post(
	State(posts): State<PostService>,
	Json(input): Json<model::CreatePostInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let post = posts.create_post(&input).await?;

	Ok((StatusCode::CREATED, Json(post)).into_response())
}

/// Delete post
/// Deletes an existing post by its unique id.
#[route(
	tag = tag::POST,
	response(status = 204, description = "The post was deleted."),
	response(status = 404, description = "No post has this id.", shape = "Json<ErrorResponse<'static>>"),
)]
pub async fn delete_post(
	State(posts): State<PostService>,
	Path(path): Path<model::IdInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	posts.delete_post(path.id).await?;

	Ok(StatusCode::NO_CONTENT.into_response())
}
