use std::{sync::Arc, time::Duration};

use axum::{
	body::Body,
	response::{IntoResponse, Response},
};
use governor::{
	clock::QuantaInstant,
	middleware::{RateLimitingMiddleware, StateInformationMiddleware},
};
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::{KeyExtractor, PeerIpKeyExtractor},
	GovernorError,
};

pub type Config = GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Allows `max` requests per `window` for each client IP.
///
/// The full allowance is available as a burst and refills one request
/// every `window / max`. Returns `None` when that refill period rounds
/// down to zero.
pub fn per_client(max: u32, window: Duration) -> Option<Arc<Config>> {
	let period = window.checked_div(max)?;

	if period.is_zero() {
		return None;
	}

	GovernorConfigBuilder::default()
		.period(period)
		.burst_size(max)
		.use_headers()
		.error_handler(error_handler)
		.finish()
		.map(Arc::new)
}

fn error_handler(error: GovernorError) -> Response<Body> {
	crate::error::AppError::from(error).into_response()
}

/// Periodically drops rate limiting state for clients that have
/// not been seen recently.
pub fn cleanup_old_limits<T, M>(configs: &[&Arc<GovernorConfig<T, M>>], interval: Duration)
where
	T: KeyExtractor,
	<T as KeyExtractor>::Key: Send + Sync + 'static,
	M: RateLimitingMiddleware<QuantaInstant> + Send + Sync + 'static,
{
	let limiters = configs
		.iter()
		.map(|config| config.limiter().clone())
		.collect::<Vec<_>>();

	std::thread::spawn(move || loop {
		std::thread::sleep(interval);

		for limiter in &limiters {
			tracing::debug!("rate limiting storage size: {}", limiter.len());

			limiter.retain_recent();
		}
	});
}

#[cfg(test)]
mod test {
	use std::{net::SocketAddr, time::Duration};

	use axum::extract::connect_info::MockConnectInfo;
	use tower_governor::GovernorLayer;

	use super::per_client;
	use crate::test::*;

	#[test]
	fn test_per_client() {
		assert!(per_client(100, Duration::from_secs(60)).is_some());
		assert!(per_client(0, Duration::from_secs(60)).is_none());
		assert!(per_client(1_000, Duration::from_nanos(10)).is_none());
	}

	#[tokio::test]
	async fn test_limit_is_enforced_per_client() {
		let config = per_client(1, Duration::from_secs(60)).unwrap();
		let app = crate::app(state())
			.layer(GovernorLayer { config })
			.layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
		let server = TestServer::new(app).unwrap();

		let response = server.get("/v1/posts").await;

		assert_eq!(response.status_code(), 200);

		let response = server.get("/v1/posts").await;
		let body = response.json::<Value>();

		assert_eq!(response.status_code(), 429);
		assert!(response
			.header("retry-after")
			.to_str()
			.unwrap()
			.parse::<u64>()
			.is_ok());
		assert_eq!(body["success"], false);
		assert_eq!(body["errors"][0]["content"], "too_many_requests");
	}
}
