//! Json bodies exchanged with a registry.

use serde::{Deserialize, Serialize};

use crate::registration::DapRegistration;

/// Body of `GET /metadata`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationMetadata {
	pub enabled: bool,
	pub supported_did_methods: Vec<String>,
}

/// Body of a successful `POST /daps`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RegistrationResponse {
	/// The registration, counter-signed by the registry.
	pub proof: DapRegistration,
}

/// Body of a successful `GET /daps/{handle}`.
///
/// `proof` is returned exactly as it was stored.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResponse {
	pub did: String,
	pub proof: serde_json::Value,
}

/// Body of every error response.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: ErrorBody,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
	pub message: String,
}

impl ErrorResponse {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			error: ErrorBody {
				message: message.into(),
			},
		}
	}

	pub fn message(&self) -> &str {
		&self.error.message
	}
}
