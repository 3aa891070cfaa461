#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod openapi;
mod ratelimit;
mod route;
mod security;
mod trace;

use std::{
	net::{Ipv4Addr, SocketAddr},
	sync::Arc,
	time::{Duration, Instant},
};

use aide::axum::ApiRouter;
use axum::{
	body::Body,
	extract::FromRef,
	http::{HeaderName, Request},
	middleware, Extension, Router,
};
use route::{docs, health, post};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use crate::config::Config;

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

const REQUEST_ID: &str = "x-request-id";

/// The shared application state.
///
/// Handlers pull the service they need out of it with [`FromRef`].
#[derive(Clone, FromRef)]
pub struct State {
	pub posts: post::PostService,
	pub health: health::HealthService,
}

impl State {
	pub fn new(database: Database, started: Instant) -> Self {
		Self {
			posts: post::PostService::new(Arc::new(database.clone())),
			health: health::HealthService::new(Arc::new(database), started),
		}
	}
}

/// Builds the application router with its documentation and middleware.
///
/// Rate limiting needs the peer address, so it is layered on in [`main`].
pub fn app(state: State) -> Router {
	aide::gen::extract_schemas(true);

	let mut api = openapi::base();

	ApiRouter::new()
		.nest_api_service(docs::PREFIX, docs::routes())
		.nest("/v1/posts", post::routes())
		.merge(health::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.layer(middleware::from_fn(security::headers))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::new(
					HeaderName::from_static(REQUEST_ID),
					MakeRequestUuid,
				))
				.layer(
					TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
						let request_id = request
							.headers()
							.get(REQUEST_ID)
							.and_then(|id| id.to_str().ok())
							.unwrap_or_default();

						tracing::info_span!(
							"request",
							method = %request.method(),
							uri = %request.uri(),
							request_id,
						)
					}),
				)
				.layer(PropagateRequestIdLayer::new(HeaderName::from_static(
					REQUEST_ID,
				)))
				.layer(CompressionLayer::new())
				.layer(CorsLayer::permissive()),
		)
		.with_state(state)
}

#[derive(Debug, thiserror::Error)]
enum InitError {
	#[error("error parsing .env file: {0}")]
	Dotenv(#[from] dotenvy::Error),
	#[error("invalid configuration: {0}")]
	Config(#[from] config::Error),
	#[error("error installing tracing: {0}")]
	Trace(#[from] trace::Error),
	#[error("error connecting to the database: {0}")]
	Database(#[from] sqlx::Error),
	#[error("error running migrations: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	#[error("rate limit of {0} requests per {1:?} is too fine-grained")]
	RateLimit(u32, Duration),
	#[error("error binding tcp listener: {0}")]
	TcpBind(std::io::Error),
	#[error("error serving server: {0}")]
	TcpServe(std::io::Error),
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(error) = tokio::signal::ctrl_c().await {
			tracing::error!(%error, "failed to listen for ctrl-c");
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(error) => {
				tracing::error!(%error, "failed to listen for SIGTERM");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}

	tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
	let started = Instant::now();
	let dotenv = dotenvy::dotenv();

	let config = Config::from_env()?;
	let _guard = trace::init_tracing_subscriber(&config)?;

	match dotenv {
		Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
		Err(error) if error.not_found() => tracing::debug!("no .env file found"),
		Err(error) => return Err(error.into()),
	}

	let database = PgPoolOptions::new()
		.connect_with(config.database()?)
		.await?;

	if config.synchronize() {
		sqlx::migrate!().run(&database).await?;
		tracing::info!("database schema is up to date");
	}

	let window = config.rate_limit_window;
	let limiter = ratelimit::per_client(config.rate_limit_max, window)
		.ok_or(InitError::RateLimit(config.rate_limit_max, window))?;

	ratelimit::cleanup_old_limits(&[&limiter], Duration::from_secs(60));

	let app = app(State::new(database, started)).layer(GovernorLayer { config: limiter });

	let listener = tokio::net::TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port))
		.await
		.map_err(InitError::TcpBind)?;

	tracing::info!(
		port = config.port,
		environment = config.node_env.as_str(),
		"listening"
	);

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.with_graceful_shutdown(shutdown_signal())
	.await
	.map_err(InitError::TcpServe)?;

	Ok(())
}
