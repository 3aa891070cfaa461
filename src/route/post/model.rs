pub use crate::route::model::IdInput;

use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single post.
#[model]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
#[serde(deny_unknown_fields)]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: i32,
	/// The title or name of the post.
	#[validate(length(min = 1, max = 255))]
	pub name: String,
	/// An optional detailed description or content of the post.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}
