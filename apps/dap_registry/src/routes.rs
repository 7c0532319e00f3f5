//! Http handlers of the registry.

use std::sync::Arc;

use axum::{
	body::Bytes,
	extract::{Path, State},
	http::StatusCode,
	Json,
};
use dap::messages::{RegistrationMetadata, RegistrationResponse, ResolutionResponse};
use did_simple::document::DidDocument;

use crate::{error::ApiError, registry::Registry};

#[derive(Debug, Clone)]
pub(crate) struct RouterState {
	pub registry: Arc<Registry>,
	pub metadata: Arc<RegistrationMetadata>,
}

pub(crate) async fn root() -> &'static str {
	"DAP registry. Register with POST /daps, resolve with GET /daps/{handle}."
}

#[tracing::instrument(skip_all)]
pub(crate) async fn did_document(
	State(state): State<RouterState>,
) -> Result<Json<DidDocument>, ApiError> {
	let did = state.registry.registry_did().get()?;
	Ok(Json(did.document()))
}

#[tracing::instrument(skip_all)]
pub(crate) async fn metadata(
	State(state): State<RouterState>,
) -> Json<RegistrationMetadata> {
	Json(RegistrationMetadata::clone(&state.metadata))
}

/// The body is taken as raw bytes, so that malformed json is reported like any
/// other malformed registration.
#[tracing::instrument(skip_all)]
#[axum_macros::debug_handler]
pub(crate) async fn register(
	State(state): State<RouterState>,
	body: Bytes,
) -> Result<(StatusCode, Json<RegistrationResponse>), ApiError> {
	if !state.metadata.enabled {
		return Err(ApiError::RegistrationDisabled);
	}
	let proof = state.registry.register(&body).await?;
	Ok((StatusCode::CREATED, Json(RegistrationResponse { proof })))
}

#[tracing::instrument(skip_all, fields(handle))]
#[axum_macros::debug_handler]
pub(crate) async fn resolve(
	State(state): State<RouterState>,
	Path(handle): Path<String>,
) -> Result<Json<ResolutionResponse>, ApiError> {
	tracing::Span::current().record("handle", handle.as_str());
	let row = state
		.registry
		.lookup(&handle)
		.await
		.map_err(ApiError::Lookup)?
		.ok_or(ApiError::HandleNotFound)?;
	Ok(Json(ResolutionResponse {
		did: row.did,
		proof: row.proof,
	}))
}
