//! Registration and lookup of DAPs, independent of http.

use dap::{DapRegistration, InvalidDapRegistration, RegistrationError};
use tracing::{debug, info};

use crate::{
	db::{DapRow, InsertError, MigratedDbPool, NewDap},
	registry_did::{RegistryDidError, RegistryDidProvider},
};

#[derive(Debug)]
pub struct Registry {
	db: MigratedDbPool,
	registry_did: RegistryDidProvider,
}

impl Registry {
	pub fn new(db: MigratedDbPool, registry_did: RegistryDidProvider) -> Self {
		Self { db, registry_did }
	}

	pub fn registry_did(&self) -> &RegistryDidProvider {
		&self.registry_did
	}

	/// Verifies and stores a registration request, and returns the proof of
	/// registration.
	///
	/// The proof is only issued once the registration was stored. A conflicting
	/// registration is never retried.
	pub async fn register(
		&self,
		request: &[u8],
	) -> Result<DapRegistration, RegisterError> {
		let verified = DapRegistration::parse(request)?;
		let registry_did = self.registry_did.get()?;

		let registration = verified.registration();
		debug!(
			id = %registration.id,
			handle = %registration.handle,
			"verified registration"
		);
		let proof = serde_json::to_value(registration)
			.expect("registrations always serialize to json");
		let id = registration.id.to_string();
		self.db
			.insert(&NewDap {
				id: &id,
				did: &registration.did,
				handle: &registration.handle,
				proof: &proof,
			})
			.await?;

		let counter_signed = verified.counter_sign(&*registry_did);
		info!(%id, handle = %counter_signed.handle, "registered dap");
		Ok(counter_signed)
	}

	/// Looks up the did and stored proof of a handle.
	pub async fn lookup(&self, handle: &str) -> Result<Option<DapRow>, sqlx::Error> {
		self.db.find_by_handle(handle).await
	}
}

#[derive(thiserror::Error, Debug)]
pub enum RegisterError {
	#[error(transparent)]
	Malformed(RegistrationError),
	#[error(transparent)]
	Unverified(InvalidDapRegistration),
	#[error(transparent)]
	RegistryDid(#[from] RegistryDidError),
	#[error(transparent)]
	Insert(#[from] InsertError),
}

impl From<RegistrationError> for RegisterError {
	fn from(err: RegistrationError) -> Self {
		match err {
			RegistrationError::Invalid(err) => Self::Unverified(err),
			err @ (RegistrationError::Malformed(_)
			| RegistrationError::InvalidId(_)) => Self::Malformed(err),
		}
	}
}
