//! A registration binds a handle to a DID, and is signed by that DID.
//!
//! The lifecycle of a registration is:
//! 1. The registrant [creates](DapRegistration::create) and
//!    [signs](DapRegistration::sign) it.
//! 2. The registry [parses](DapRegistration::parse) it, which also checks that
//!    it was signed by its own `did`, yielding a [`VerifiedRegistration`].
//! 3. Once stored, the registry [counter-signs](VerifiedRegistration::counter_sign)
//!    it, and hands the result back as the proof of registration.

use did_simple::DidUri;
use serde::{Deserialize, Serialize};

use crate::{
	dap::{is_valid_segment, Dap, MalformedIdentifier},
	digest::{self, DIGEST_LEN},
	jws::{self, DidSigner, VerifyError},
	registration_id::{InvalidRegistrationId, RegistrationId},
};

/// Handles are stored in a column of this length.
pub const MAX_HANDLE_LEN: usize = 64;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DapRegistration {
	pub id: RegistrationId,
	pub handle: String,
	pub did: String,
	pub domain: String,
	/// Detached JWS over [`Self::compute_digest`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signature: Option<String>,
}

/// The fields covered by the signature.
#[derive(Serialize)]
struct SignedFields<'a> {
	id: String,
	handle: &'a str,
	did: &'a str,
	domain: &'a str,
}

/// Wire form of a registration request. Everything is required.
#[derive(Deserialize)]
struct RawRegistration {
	id: String,
	handle: String,
	did: String,
	domain: String,
	signature: String,
}

impl DapRegistration {
	/// Creates a new, unsigned registration with a fresh id.
	pub fn create(
		handle: impl Into<String>,
		did: impl Into<String>,
		domain: impl Into<String>,
	) -> Result<Self, RegistrationError> {
		let registration = Self {
			id: RegistrationId::create(),
			handle: handle.into(),
			did: did.into(),
			domain: domain.into(),
			signature: None,
		};
		registration.validate()?;
		Ok(registration)
	}

	/// Checks the fields, but not the signature.
	pub fn validate(&self) -> Result<(), RegistrationError> {
		if !is_valid_segment(&self.handle) {
			return Err(RegistrationError::Malformed(
				"handle must be non-empty and must not contain '@' or '/'".into(),
			));
		}
		if self.handle.chars().count() > MAX_HANDLE_LEN {
			return Err(RegistrationError::Malformed(format!(
				"handle must be at most {MAX_HANDLE_LEN} characters"
			)));
		}
		if !is_valid_segment(&self.domain) {
			return Err(RegistrationError::Malformed(
				"domain must be non-empty and must not contain '@' or '/'".into(),
			));
		}
		if self.did.is_empty() {
			return Err(RegistrationError::Malformed("did must be non-empty".into()));
		}
		Ok(())
	}

	/// Parses a registration request and verifies its signature.
	pub fn parse(raw: &[u8]) -> Result<VerifiedRegistration, RegistrationError> {
		let raw: RawRegistration = serde_json::from_slice(raw)
			.map_err(|err| RegistrationError::Malformed(err.to_string()))?;
		Self::from_raw(raw)
	}

	/// Same as [`Self::parse`], for an already deserialized json value.
	pub fn parse_value(
		value: serde_json::Value,
	) -> Result<VerifiedRegistration, RegistrationError> {
		let raw: RawRegistration = serde_json::from_value(value)
			.map_err(|err| RegistrationError::Malformed(err.to_string()))?;
		Self::from_raw(raw)
	}

	fn from_raw(
		raw: RawRegistration,
	) -> Result<VerifiedRegistration, RegistrationError> {
		let registration = Self {
			id: raw.id.parse()?,
			handle: raw.handle,
			did: raw.did,
			domain: raw.domain,
			signature: Some(raw.signature),
		};
		registration.validate()?;
		let signer = registration.verify()?;

		Ok(VerifiedRegistration {
			registration,
			signer,
		})
	}

	/// The SHA-256 digest of the canonical json of `{id, handle, did, domain}`.
	pub fn compute_digest(&self) -> [u8; DIGEST_LEN] {
		let fields = SignedFields {
			id: self.id.to_string(),
			handle: &self.handle,
			did: &self.did,
			domain: &self.domain,
		};
		digest::digest(&fields).expect("a struct of strings is always valid json")
	}

	/// Signs the registration, replacing any previous signature.
	pub fn sign(&mut self, signer: &impl DidSigner) {
		let payload = self.compute_digest();
		self.signature = Some(jws::sign(signer, &payload, true));
	}

	/// Checks that the signature covers the current fields and was made by
	/// `self.did`. Returns the signer.
	pub fn verify(&self) -> Result<DidUri, InvalidDapRegistration> {
		let signature = self
			.signature
			.as_deref()
			.ok_or(InvalidDapRegistration::MissingSignature)?;
		let payload = self.compute_digest();
		let signer = jws::verify(signature, Some(&payload))?;
		if signer.as_str() != self.did {
			return Err(InvalidDapRegistration::SignerMismatch {
				expected: self.did.clone(),
				actual: signer.into_inner(),
			});
		}
		Ok(signer)
	}

	/// The public identifier of this registration.
	pub fn dap(&self) -> Result<Dap, MalformedIdentifier> {
		Dap::new(self.handle.as_str(), self.domain.as_str())
	}
}

/// A registration whose signature was checked against its own `did`.
///
/// Only [`DapRegistration::parse`] can create this.
#[derive(Debug, Clone)]
pub struct VerifiedRegistration {
	registration: DapRegistration,
	signer: DidUri,
}

impl VerifiedRegistration {
	pub fn registration(&self) -> &DapRegistration {
		&self.registration
	}

	/// The DID recovered from the signature, equal to `registration().did`.
	pub fn signer(&self) -> &DidUri {
		&self.signer
	}

	pub fn into_inner(self) -> DapRegistration {
		self.registration
	}

	/// Issues the registry's signature over the same fields. The registrant's
	/// signature is replaced.
	pub fn counter_sign(self, registry: &impl DidSigner) -> DapRegistration {
		let mut registration = self.registration;
		registration.sign(registry);
		registration
	}
}

#[derive(thiserror::Error, Debug)]
pub enum RegistrationError {
	#[error("Failed to parse DAP registration: {0}")]
	Malformed(String),
	#[error(transparent)]
	InvalidId(#[from] InvalidRegistrationId),
	#[error(transparent)]
	Invalid(#[from] InvalidDapRegistration),
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum InvalidDapRegistration {
	#[error("Invalid DAP Registration: Signature is missing")]
	MissingSignature,
	#[error("Invalid DAP Registration: {0}")]
	Signature(#[from] VerifyError),
	#[error(
		"Invalid DAP Registration: Expected registration to be signed by the specified DID"
	)]
	SignerMismatch { expected: String, actual: String },
}
