//! Http client for talking to a DAP registry.

use did_simple::document::DidDocument;
use reqwest::{Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::{
	messages::{
		ErrorResponse, RegistrationMetadata, RegistrationResponse, ResolutionResponse,
	},
	registration::DapRegistration,
};

#[derive(Debug, Clone)]
pub struct DapRegistryClient {
	client: reqwest::Client,
	base_url: Url,
}

impl DapRegistryClient {
	/// `base_url` is where the registry's routes are mounted, for example
	/// `https://registry.example.com`.
	pub fn new(client: reqwest::Client, base_url: Url) -> Result<Self, ClientError> {
		if base_url.cannot_be_a_base() {
			return Err(ClientError::InvalidBaseUrl(base_url));
		}
		Ok(Self { client, base_url })
	}

	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
		let mut url = self.base_url.clone();
		url.path_segments_mut()
			.expect("checked that the url can be a base")
			.pop_if_empty()
			.extend(segments);
		url
	}

	/// Submits a signed registration, and returns the registry's proof.
	pub async fn register(
		&self,
		registration: &DapRegistration,
	) -> Result<DapRegistration, ClientError> {
		let url = self.endpoint(["daps"]);
		debug!(%url, id = %registration.id, "submitting registration");
		let response = self.client.post(url).json(registration).send().await?;
		let response = check_status(response).await?;
		let body: RegistrationResponse = response.json().await?;
		Ok(body.proof)
	}

	/// Looks up a handle. Returns `None` if it is not registered.
	pub async fn resolve(
		&self,
		handle: &str,
	) -> Result<Option<ResolutionResponse>, ClientError> {
		let url = self.endpoint(["daps", handle]);
		let response = self.client.get(url).send().await?;
		if response.status() == StatusCode::NOT_FOUND {
			return Ok(None);
		}
		let response = check_status(response).await?;
		Ok(Some(response.json().await?))
	}

	pub async fn metadata(&self) -> Result<RegistrationMetadata, ClientError> {
		let url = self.endpoint(["metadata"]);
		let response = check_status(self.client.get(url).send().await?).await?;
		Ok(response.json().await?)
	}

	/// The DID document that the registry signs its proofs with.
	pub async fn registry_document(&self) -> Result<DidDocument, ClientError> {
		let url = self.endpoint([".well-known", "did.json"]);
		let response = check_status(self.client.get(url).send().await?).await?;
		Ok(response.json().await?)
	}
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}
	let body = response.bytes().await?;
	let message = serde_json::from_slice::<ErrorResponse>(&body)
		.map(|err| err.error.message)
		.unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
	Err(ClientError::Rejected { status, message })
}

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
	#[error("registry url {0} cannot be used as a base url")]
	InvalidBaseUrl(Url),
	#[error("registry responded with {status}: {message}")]
	Rejected { status: StatusCode, message: String },
	#[error(transparent)]
	Http(#[from] reqwest::Error),
}

impl ClientError {
	/// The http status, if the registry rejected the request.
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Self::Rejected { status, .. } => Some(*status),
			Self::InvalidBaseUrl(_) => None,
			Self::Http(err) => err.status(),
		}
	}
}
