//! The registry's own identity, used to counter-sign registrations.

use std::{str::FromStr, sync::Arc};

use arc_swap::ArcSwapOption;
use did_simple::{bearer::ImportError, BearerDid};
use tracing::info;

/// Provides the registry's [`BearerDid`].
///
/// The DID is configured as a portable DID json string. It is imported the
/// first time it is needed and cached afterwards, so a broken configuration
/// only fails the requests that need to sign.
/// The [`Debug`](std::fmt::Debug) output never contains key material.
#[derive(derive_more::Debug)]
pub struct RegistryDidProvider {
	#[debug("{}", if portable_did.is_some() { "Some(<redacted>)" } else { "None" })]
	portable_did: Option<String>,
	#[debug("{:?}", cached.load_full().map(|did| did.uri().to_string()))]
	cached: ArcSwapOption<BearerDid>,
}

impl RegistryDidProvider {
	pub fn from_config(portable_did: Option<String>) -> Self {
		Self {
			portable_did,
			cached: ArcSwapOption::empty(),
		}
	}

	/// Always provides `did`.
	pub fn from_bearer(did: BearerDid) -> Self {
		Self {
			portable_did: None,
			cached: ArcSwapOption::from_pointee(did),
		}
	}

	pub fn get(&self) -> Result<Arc<BearerDid>, RegistryDidError> {
		if let Some(did) = self.cached.load_full() {
			return Ok(did);
		}
		let portable_did = self
			.portable_did
			.as_deref()
			.ok_or(RegistryDidError::Missing)?;
		let did = Arc::new(BearerDid::from_str(portable_did)?);
		info!(did = %did.uri(), "imported registry did");
		// Concurrent first calls may both import, they produce the same DID.
		self.cached.store(Some(Arc::clone(&did)));
		Ok(did)
	}
}

#[derive(thiserror::Error, Debug)]
pub enum RegistryDidError {
	#[error("Failed to access portable DID from runtime configuration")]
	Missing,
	#[error("Failed to import Bearer DID: {0}")]
	Import(#[from] ImportError),
}
