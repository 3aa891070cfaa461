use std::{str::FromStr, time::Duration};

use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("error parsing environment: {0}")]
	Envy(#[from] envy::Error),
	#[error("missing {0}: set DATABASE_URL or all of DATABASE_HOST, DATABASE_USER, DATABASE_PASSWORD and DATABASE_NAME")]
	MissingDatabase(&'static str),
	#[error("invalid DATABASE_URL: {0}")]
	DatabaseUrl(#[source] sqlx::Error),
	#[error("RATE_LIMIT_MAX must be greater than zero")]
	RateLimitMax,
	#[error("RATE_LIMIT_WINDOW must be greater than zero")]
	RateLimitWindow,
}

/// The deployment environment, read from `NODE_ENV`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
	#[default]
	Development,
	Production,
	Test,
}

impl Environment {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Development => "development",
			Self::Production => "production",
			Self::Test => "test",
		}
	}
}

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
fn default_port() -> u16 {
	3000
}

#[inline]
fn default_database_port() -> u16 {
	5432
}

#[inline]
fn default_rate_limit_max() -> u32 {
	100
}

#[inline]
fn default_rate_limit_window() -> Duration {
	Duration::from_secs(60)
}

/// Application configuration, deserialized from the environment.
///
/// Field names map to upper-case variables, so `database_url` is read
/// from `DATABASE_URL`.
#[derive(Debug, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub node_env: Environment,
	#[serde(default = "default_port")]
	pub port: u16,
	pub database_url: Option<String>,
	pub database_host: Option<String>,
	#[serde(default = "default_database_port")]
	pub database_port: u16,
	pub database_user: Option<String>,
	pub database_password: Option<String>,
	pub database_name: Option<String>,
	#[serde(default = "default_rate_limit_max")]
	pub rate_limit_max: u32,
	/// A human-readable duration such as `1 minute` or `30s`.
	#[serde(with = "humantime_serde", default = "default_rate_limit_window")]
	pub rate_limit_window: Duration,
	/// Enables OpenTelemetry export when set.
	pub otel_exporter_otlp_endpoint: Option<String>,
}

impl Config {
	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, Error> {
		Self::from_vars(std::env::vars())
	}

	/// Reads and validates the configuration from key-value pairs.
	pub fn from_vars<I>(vars: I) -> Result<Self, Error>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		let config = envy::from_iter::<_, Self>(vars)?;

		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), Error> {
		if self.rate_limit_max == 0 {
			return Err(Error::RateLimitMax);
		}

		if self.rate_limit_window.is_zero() {
			return Err(Error::RateLimitWindow);
		}

		self.database().map(|_| ())
	}

	pub fn is_production(&self) -> bool {
		self.node_env == Environment::Production
	}

	/// Whether migrations run automatically on startup.
	pub fn synchronize(&self) -> bool {
		!self.is_production()
	}

	/// Builds the database connection options.
	///
	/// `DATABASE_URL` wins over the individual variables. In production,
	/// TLS is required.
	pub fn database(&self) -> Result<PgConnectOptions, Error> {
		let options = if let Some(url) = &self.database_url {
			PgConnectOptions::from_str(url).map_err(Error::DatabaseUrl)?
		} else {
			PgConnectOptions::new()
				.host(required(&self.database_host, "DATABASE_HOST")?)
				.port(self.database_port)
				.username(required(&self.database_user, "DATABASE_USER")?)
				.password(required(&self.database_password, "DATABASE_PASSWORD")?)
				.database(required(&self.database_name, "DATABASE_NAME")?)
		};

		Ok(if self.is_production() {
			options.ssl_mode(PgSslMode::Require)
		} else {
			options
		})
	}
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, Error> {
	value.as_deref().ok_or(Error::MissingDatabase(name))
}
