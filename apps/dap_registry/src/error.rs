use axum::{http::StatusCode, response::IntoResponse, Json};
use dap::messages::ErrorResponse;
use tracing::{debug, error};

use crate::{db::InsertError, registry::RegisterError, registry_did::RegistryDidError};

/// Everything that the routes can fail with.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error("Registration is disabled")]
	RegistrationDisabled,
	#[error(transparent)]
	Register(#[from] RegisterError),
	#[error("Handle not found")]
	HandleNotFound,
	#[error("Failed to process request")]
	Lookup(#[source] sqlx::Error),
	#[error(transparent)]
	RegistryDid(#[from] RegistryDidError),
}

impl ApiError {
	fn status(&self) -> StatusCode {
		match self {
			Self::RegistrationDisabled => StatusCode::FORBIDDEN,
			Self::Register(RegisterError::Malformed(_)) => StatusCode::BAD_REQUEST,
			Self::Register(RegisterError::Unverified(_)) => StatusCode::UNAUTHORIZED,
			Self::Register(RegisterError::Insert(
				InsertError::Conflict(_) | InsertError::UnknownConflict(_),
			)) => StatusCode::CONFLICT,
			Self::HandleNotFound => StatusCode::NOT_FOUND,
			Self::Register(RegisterError::Insert(InsertError::Database(_)))
			| Self::Register(RegisterError::RegistryDid(_))
			| Self::Lookup(_)
			| Self::RegistryDid(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		let status = self.status();
		if status.is_server_error() {
			error!("{self:?}");
		} else {
			debug!("{self}");
		}
		(status, Json(ErrorResponse::new(self.to_string()))).into_response()
	}
}
