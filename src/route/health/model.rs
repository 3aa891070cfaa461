use schemars::JsonSchema;
use serde::Serialize;

/// The overall health of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
	Ok,
	Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
	Connected,
	Disconnected,
}

/// The outcome of the database probe.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
	pub status: DatabaseStatus,
	/// How long the probe took, in milliseconds. Only set when connected.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub response_time: Option<u64>,
	/// Why the probe failed. Only set when disconnected.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl DatabaseHealth {
	pub fn connected(response_time: u64) -> Self {
		Self {
			status: DatabaseStatus::Connected,
			response_time: Some(response_time),
			error: None,
		}
	}

	pub fn disconnected(error: impl Into<String>) -> Self {
		Self {
			status: DatabaseStatus::Disconnected,
			response_time: None,
			error: Some(error.into()),
		}
	}
}

/// Memory used by the process.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct MemoryUsage {
	/// Resident memory, in megabytes.
	pub used: f64,
	/// Virtual memory reserved by the process, in megabytes.
	pub total: f64,
	/// `used` as a percentage of `total`.
	pub percentage: f64,
}

/// A point-in-time report on the health of the service.
#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthCheck {
	/// `ok` when the database is reachable, `error` otherwise.
	pub status: Status,
	/// When the check ran, in RFC 3339 format.
	pub timestamp: String,
	/// Process uptime, in seconds.
	pub uptime: f64,
	pub database: DatabaseHealth,
	pub memory: MemoryUsage,
}
