use axum::{
	extract::Request,
	http::{header, HeaderName, HeaderValue},
	middleware::Next,
	response::Response,
};

use crate::route::docs;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self';base-uri 'self';font-src 'self' https: data:;form-action 'self';frame-ancestors 'self';img-src 'self' data:;object-src 'none';script-src 'self';script-src-attr 'none';style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests";

/// The documentation page loads its script from a CDN and configures it inline.
const DOCS_CONTENT_SECURITY_POLICY: &str = "default-src 'self';base-uri 'self';font-src 'self' https: data:;form-action 'self';frame-ancestors 'self';img-src 'self' data: https:;object-src 'none';script-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net;script-src-attr 'none';style-src 'self' https: 'unsafe-inline';connect-src 'self'";

const HEADERS: [(HeaderName, &str); 11] = [
	(
		HeaderName::from_static("cross-origin-opener-policy"),
		"same-origin",
	),
	(
		HeaderName::from_static("cross-origin-resource-policy"),
		"same-origin",
	),
	(HeaderName::from_static("origin-agent-cluster"), "?1"),
	(header::REFERRER_POLICY, "no-referrer"),
	(
		header::STRICT_TRANSPORT_SECURITY,
		"max-age=15552000; includeSubDomains",
	),
	(header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
	(header::X_DNS_PREFETCH_CONTROL, "off"),
	(HeaderName::from_static("x-download-options"), "noopen"),
	(header::X_FRAME_OPTIONS, "SAMEORIGIN"),
	(
		HeaderName::from_static("x-permitted-cross-domain-policies"),
		"none",
	),
	(header::X_XSS_PROTECTION, "0"),
];

/// Adds the usual security headers to every response, leaving any
/// header the handler already set untouched.
pub async fn headers(request: Request, next: Next) -> Response {
	let policy = if request.uri().path().starts_with(docs::PREFIX) {
		DOCS_CONTENT_SECURITY_POLICY
	} else {
		CONTENT_SECURITY_POLICY
	};

	let mut response = next.run(request).await;
	let headers = response.headers_mut();

	headers
		.entry(header::CONTENT_SECURITY_POLICY)
		.or_insert(HeaderValue::from_static(policy));

	for (name, value) in HEADERS {
		headers
			.entry(name)
			.or_insert(HeaderValue::from_static(value));
	}

	response
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_security_headers() {
		let app = app();

		let response = app.get("/v1/posts").await;

		assert_eq!(response.header("x-content-type-options"), "nosniff");
		assert_eq!(response.header("x-frame-options"), "SAMEORIGIN");
		assert_eq!(response.header("referrer-policy"), "no-referrer");
		assert!(response
			.header("content-security-policy")
			.to_str()
			.unwrap()
			.contains("script-src 'self';"));
	}

	#[tokio::test]
	async fn test_docs_allow_the_reference_script() {
		let app = app();

		let response = app.get("/docs/private/api.json").await;

		assert_eq!(response.status_code(), 200);
		assert!(response
			.header("content-security-policy")
			.to_str()
			.unwrap()
			.contains("https://cdn.jsdelivr.net"));
	}
}
