use aide::{
	openapi::{Info, License, OpenApi, Tag},
	transform::TransformOpenApi,
};

use crate::{
	error::{ErrorResponse, Message},
	extract::Json,
};

pub mod tag {
	pub const POST: &str = "Post";
	pub const HEALTH: &str = "Health";
}

/// The document the generated routes are added to.
pub fn base() -> OpenApi {
	OpenApi {
		info: Info {
			version: env!("CARGO_PKG_VERSION").into(),
			license: Some(License {
				name: "MIT".into(),
				url: Some("https://opensource.org/licenses/MIT".into()),
				..Default::default()
			}),
			..Default::default()
		},
		..Default::default()
	}
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Posts API")
		.summary("Create, list and delete blog posts")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Operations related to blog posts management".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::HEALTH.into(),
			description: Some("Service health".into()),
			..Default::default()
		})
		.default_response_with::<Json<ErrorResponse<'static>>, _>(|res| {
			res.example(ErrorResponse {
				success: false,
				errors: Message::new("error message")
					.field("optional field")
					.detail("key", "value")
					.into_vec(),
			})
		})
}
