//! An implementation of the [did:jwk] method.
//!
//! A did:jwk is just a public key, serialized as a JWK and then base64url
//! encoded. Resolving it requires no network access, the DID document is
//! derived entirely from the DID itself.
//!
//! [did:jwk]: https://github.com/quartzjer/did-jwk/blob/main/spec.md

use std::{fmt::Display, str::FromStr};

use base64::prelude::{Engine as _, BASE64_URL_SAFE_NO_PAD};
use jose_jwk::Jwk;

use crate::{
	crypto::ed25519::{self, VerifyingKey},
	document::{DidDocument, VerificationMethod, DID_CORE_CONTEXT},
	uri::{DidMethod, DidUri, ParseError},
};

/// The only verification method of a did:jwk has this fragment.
pub const VERIFICATION_METHOD_FRAGMENT: &str = "0";

/// An implementation of the `did:jwk` method. See the [module](self) docs for more
/// info.
#[derive(Debug, Eq, PartialEq, Hash, Clone)]
pub struct DidJwk {
	uri: DidUri,
	key: VerifyingKey,
}

impl DidJwk {
	pub const PREFIX: &'static str = "did:jwk:";

	/// Creates the did:jwk for an ed25519 public key.
	pub fn from_verifying_key(key: VerifyingKey) -> Self {
		let jwk = ed25519_pub_jwk(key);
		let serialized =
			serde_json::to_vec(&jwk).expect("serializing a jwk is infallible");
		let uri =
			format!("{}{}", Self::PREFIX, BASE64_URL_SAFE_NO_PAD.encode(serialized));
		Self {
			uri: DidUri::try_from(uri).expect("did:jwk we built ourselves is valid"),
			key,
		}
	}

	pub fn as_str(&self) -> &str {
		self.uri.as_str()
	}

	pub fn uri(&self) -> &DidUri {
		&self.uri
	}

	pub fn verifying_key(&self) -> &VerifyingKey {
		&self.key
	}

	pub fn jwk(&self) -> Jwk {
		ed25519_pub_jwk(self.key)
	}

	/// The full id of the verification method, for use as a JWS `kid`.
	pub fn verification_method_id(&self) -> String {
		format!("{}#{VERIFICATION_METHOD_FRAGMENT}", self.uri)
	}

	/// Derives the DID document.
	pub fn document(&self) -> DidDocument {
		let vm_id = self.verification_method_id();
		DidDocument {
			context: vec![DID_CORE_CONTEXT.to_owned()],
			id: self.uri.to_string(),
			verification_method: vec![VerificationMethod {
				id: vm_id.clone(),
				kind: "JsonWebKey2020".to_owned(),
				controller: self.uri.to_string(),
				public_key_jwk: self.jwk(),
			}],
			authentication: vec![vm_id.clone()],
			assertion_method: vec![vm_id.clone()],
			capability_invocation: vec![vm_id.clone()],
			capability_delegation: vec![vm_id],
		}
	}
}

/// Creates a JWK from a ed25519 verifying key.
pub fn ed25519_pub_jwk(pub_key: VerifyingKey) -> Jwk {
	Jwk {
		key: jose_jwk::Okp {
			crv: jose_jwk::OkpCurves::Ed25519,
			x: pub_key.as_bytes().as_slice().to_owned().into(),
			d: None,
		}
		.into(),
		prm: Default::default(),
	}
}

/// Extracts the ed25519 verifying key from a public JWK.
pub fn ed25519_from_jwk(jwk: &Jwk) -> Result<VerifyingKey, FromJwkError> {
	let jose_jwk::Key::Okp(okp) = &jwk.key else {
		return Err(FromJwkError::WrongKeyType);
	};
	if okp.crv != jose_jwk::OkpCurves::Ed25519 {
		return Err(FromJwkError::WrongCurve);
	}
	if okp.d.is_some() {
		return Err(FromJwkError::PrivateKeyPresent);
	}
	let x: &[u8] = &okp.x;
	Ok(VerifyingKey::try_from_slice(x)?)
}

#[derive(thiserror::Error, Debug)]
pub enum FromJwkError {
	#[error("expected an OKP key")]
	WrongKeyType,
	#[error("expected the Ed25519 curve")]
	WrongCurve,
	#[error("a public jwk must not contain private key material")]
	PrivateKeyPresent,
	#[error(transparent)]
	InvalidKey(#[from] ed25519::TryFromBytesError),
}

impl TryFrom<DidUri> for DidJwk {
	type Error = FromUriError;

	fn try_from(value: DidUri) -> Result<Self, Self::Error> {
		let m = value.method();
		if m != DidMethod::Jwk {
			return Err(FromUriError::WrongMethod(m));
		}
		let decoded = BASE64_URL_SAFE_NO_PAD.decode(value.method_specific_id())?;
		let jwk: Jwk = serde_json::from_slice(&decoded)?;
		let key = ed25519_from_jwk(&jwk)?;

		Ok(Self { uri: value, key })
	}
}

impl FromStr for DidJwk {
	type Err = FromUriError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::try_from(DidUri::from_str(s)?)
	}
}

#[derive(thiserror::Error, Debug)]
pub enum FromUriError {
	#[error(transparent)]
	Uri(#[from] ParseError),
	#[error("Expected \"jwk\" method but got {0:?}")]
	WrongMethod(DidMethod),
	#[error("method-specific-id was not valid base64url: {0}")]
	Base64(#[from] base64::DecodeError),
	#[error("method-specific-id was not a json web key: {0}")]
	Json(#[from] serde_json::Error),
	#[error(transparent)]
	Jwk(#[from] FromJwkError),
}

impl Display for DidJwk {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.as_str().fmt(f)
	}
}
