//! Compact [JSON Web Signatures][rfc7515] signed by DIDs.
//!
//! The protected header carries the DID url of the signing key in `kid`, so
//! verifying a signature also tells you *who* signed it. Callers must compare
//! that DID against whoever they expected to have signed.
//!
//! [rfc7515]: https://datatracker.ietf.org/doc/html/rfc7515

use std::str::FromStr;

use base64::prelude::{Engine as _, BASE64_URL_SAFE_NO_PAD};
use did_simple::{
	crypto::{ed25519::Signature, JOSE_ALG_EDDSA},
	methods::DidDyn,
	BearerDid, DidUri, DidUrl,
};
use serde::{Deserialize, Serialize};

/// Something that can sign on behalf of a DID.
pub trait DidSigner {
	/// The DID url of the verification method used to sign.
	fn key_id(&self) -> String;
	/// The JOSE `alg` of the produced signatures.
	fn algorithm(&self) -> &'static str;
	fn sign(&self, message: &[u8]) -> Vec<u8>;
}

impl DidSigner for BearerDid {
	fn key_id(&self) -> String {
		BearerDid::key_id(self)
	}

	fn algorithm(&self) -> &'static str {
		BearerDid::algorithm(self)
	}

	fn sign(&self, message: &[u8]) -> Vec<u8> {
		BearerDid::sign(self, message).to_bytes().to_vec()
	}
}

#[derive(Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct JwsHeader {
	pub alg: String,
	pub kid: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub typ: Option<String>,
}

/// Signs `payload`, producing a compact JWS.
///
/// When `detached` is true, the payload segment is left empty and the same
/// bytes have to be handed to [`verify`] again.
pub fn sign(signer: &impl DidSigner, payload: &[u8], detached: bool) -> String {
	let header = JwsHeader {
		alg: signer.algorithm().to_owned(),
		kid: signer.key_id(),
		typ: None,
	};
	let header =
		serde_json::to_vec(&header).expect("serializing a jws header is infallible");
	let header = BASE64_URL_SAFE_NO_PAD.encode(header);
	let payload = BASE64_URL_SAFE_NO_PAD.encode(payload);
	let signing_input = format!("{header}.{payload}");
	let signature =
		BASE64_URL_SAFE_NO_PAD.encode(signer.sign(signing_input.as_bytes()));

	if detached {
		format!("{header}..{signature}")
	} else {
		format!("{signing_input}.{signature}")
	}
}

/// Verifies a compact JWS and returns the DID that signed it.
///
/// `detached_payload` must be provided if and only if the payload segment of
/// `jws` is empty.
pub fn verify(
	jws: &str,
	detached_payload: Option<&[u8]>,
) -> Result<DidUri, VerifyError> {
	let mut parts = jws.split('.');
	let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
		(parts.next(), parts.next(), parts.next(), parts.next())
	else {
		return Err(VerifyError::Malformed("expected three segments"));
	};

	let payload_b64 = match (payload_b64.is_empty(), detached_payload) {
		(true, Some(detached)) => BASE64_URL_SAFE_NO_PAD.encode(detached),
		(true, None) => return Err(VerifyError::MissingDetachedPayload),
		(false, None) => payload_b64.to_owned(),
		(false, Some(_)) => return Err(VerifyError::AmbiguousPayload),
	};

	let header: JwsHeader = BASE64_URL_SAFE_NO_PAD
		.decode(header_b64)
		.ok()
		.and_then(|bytes| serde_json::from_slice(&bytes).ok())
		.ok_or(VerifyError::Malformed("header was not base64url encoded json"))?;
	if header.alg != JOSE_ALG_EDDSA {
		return Err(VerifyError::UnsupportedAlgorithm(header.alg));
	}
	let kid = DidUrl::from_str(&header.kid)
		.map_err(|err| VerifyError::InvalidKeyId(err.to_string()))?;
	let did = DidDyn::try_from(kid.did().clone())
		.map_err(|err| VerifyError::Resolution(err.to_string()))?;
	let key = did
		.verifying_key(kid.fragment())
		.map_err(|err| VerifyError::Resolution(err.to_string()))?;

	let signature = BASE64_URL_SAFE_NO_PAD
		.decode(signature_b64)
		.ok()
		.and_then(|bytes| Signature::from_slice(&bytes).ok())
		.ok_or(VerifyError::Malformed(
			"signature was not a base64url ed25519 signature",
		))?;
	let signing_input = format!("{header_b64}.{payload_b64}");
	key.verify(signing_input.as_bytes(), &signature)
		.map_err(|_| VerifyError::InvalidSignature)?;

	Ok(kid.into_did())
}

/// The signature could not be verified.
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum VerifyError {
	#[error("malformed jws: {0}")]
	Malformed(&'static str),
	#[error("jws has a detached payload, but none was provided")]
	MissingDetachedPayload,
	#[error("jws has an embedded payload, but a detached payload was also provided")]
	AmbiguousPayload,
	#[error("unsupported jws algorithm {0:?}")]
	UnsupportedAlgorithm(String),
	#[error("jws kid was not a did url: {0}")]
	InvalidKeyId(String),
	#[error("failed to resolve the signer's key: {0}")]
	Resolution(String),
	#[error("signature verification failed")]
	InvalidSignature,
}
