//! A DID together with the private key that controls it.
//!
//! [`PortableDid`] is the serialized form, so that a service can be configured
//! with its own identity.

use std::str::FromStr;

use base64::prelude::{Engine as _, BASE64_URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::{
	crypto::{
		ed25519::{Signature, SigningKey},
		JOSE_ALG_EDDSA,
	},
	document::DidDocument,
	methods::jwk::{self, DidJwk},
	uri::DidUri,
};

/// A DID that we hold the private keys for, and can therefore sign with.
#[derive(Debug, Clone)]
pub struct BearerDid {
	did: DidJwk,
	signing_key: SigningKey,
}

impl BearerDid {
	pub fn from_signing_key(signing_key: SigningKey) -> Self {
		Self {
			did: DidJwk::from_verifying_key(signing_key.verifying_key()),
			signing_key,
		}
	}

	/// Creates a brand new did:jwk.
	#[cfg(feature = "random")]
	pub fn generate<R>(rng: &mut R) -> Self
	where
		R: rand_core::CryptoRngCore + ?Sized,
	{
		Self::from_signing_key(SigningKey::random(rng))
	}

	pub fn uri(&self) -> &DidUri {
		self.did.uri()
	}

	pub fn did(&self) -> &DidJwk {
		&self.did
	}

	/// The DID url of the key that [`Self::sign`] uses.
	pub fn key_id(&self) -> String {
		self.did.verification_method_id()
	}

	/// The JOSE algorithm of [`Self::sign`].
	pub fn algorithm(&self) -> &'static str {
		JOSE_ALG_EDDSA
	}

	pub fn sign(&self, message: &[u8]) -> Signature {
		self.signing_key.sign(message)
	}

	pub fn document(&self) -> DidDocument {
		self.did.document()
	}

	pub fn import(portable: PortableDid) -> Result<Self, ImportError> {
		let did = DidJwk::from_str(&portable.uri)?;
		let [private_key] = portable.private_keys.as_slice() else {
			return Err(ImportError::KeyCount(portable.private_keys.len()));
		};
		if private_key.kty != "OKP" || private_key.crv != "Ed25519" {
			return Err(ImportError::UnsupportedKey);
		}
		let d = BASE64_URL_SAFE_NO_PAD.decode(&private_key.d)?;
		let d: &[u8; SigningKey::LEN] = d
			.as_slice()
			.try_into()
			.map_err(|_| ImportError::WrongLength(d.len()))?;
		let signing_key = SigningKey::from_bytes(d);
		if signing_key.verifying_key() != *did.verifying_key() {
			return Err(ImportError::KeyMismatch);
		}
		if let Some(x) = &private_key.x {
			if BASE64_URL_SAFE_NO_PAD.decode(x)? != did.verifying_key().as_bytes() {
				return Err(ImportError::KeyMismatch);
			}
		}

		Ok(Self { did, signing_key })
	}

	pub fn export(&self) -> PortableDid {
		PortableDid {
			uri: self.did.to_string(),
			document: serde_json::to_value(self.document()).ok(),
			metadata: None,
			private_keys: vec![PrivateJwk {
				kty: "OKP".to_owned(),
				crv: "Ed25519".to_owned(),
				x: Some(
					BASE64_URL_SAFE_NO_PAD.encode(self.did.verifying_key().as_bytes()),
				),
				d: BASE64_URL_SAFE_NO_PAD.encode(self.signing_key.to_bytes()),
			}],
		}
	}
}

impl FromStr for BearerDid {
	type Err = ImportError;

	/// Parses and imports a json [`PortableDid`].
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let portable: PortableDid =
			serde_json::from_str(s).map_err(ImportError::Json)?;
		Self::import(portable)
	}
}

/// Serializable form of a [`BearerDid`], containing private keys.
///
/// The `document` and `metadata` fields are accepted for interoperability but
/// ignored on import, since the document of a did:jwk is derived from its uri.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortableDid {
	pub uri: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub document: Option<serde_json::Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<serde_json::Value>,
	pub private_keys: Vec<PrivateJwk>,
}

/// A private key in JWK form, see
/// <https://datatracker.ietf.org/doc/html/rfc8037#section-2>.
#[derive(Clone, Serialize, Deserialize)]
pub struct PrivateJwk {
	pub kty: String,
	pub crv: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<String>,
	pub d: String,
}

impl std::fmt::Debug for PrivateJwk {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PrivateJwk")
			.field("kty", &self.kty)
			.field("crv", &self.crv)
			.field("x", &self.x)
			.finish_non_exhaustive()
	}
}

#[derive(thiserror::Error, Debug)]
pub enum ImportError {
	#[error("portable did was not valid json: {0}")]
	Json(#[source] serde_json::Error),
	#[error("only did:jwk can be imported: {0}")]
	Did(#[from] jwk::FromUriError),
	#[error("expected exactly one private key but got {0}")]
	KeyCount(usize),
	#[error("only Ed25519 OKP private keys are supported")]
	UnsupportedKey,
	#[error("private key was not valid base64url: {0}")]
	Base64(#[from] base64::DecodeError),
	#[error("expected a 32 byte private key but got {0} bytes")]
	WrongLength(usize),
	#[error("private key does not match the public key of the did")]
	KeyMismatch,
}

#[cfg(all(test, feature = "random"))]
mod test {
	use super::*;

	fn rng() -> rand_core::OsRng {
		rand_core::OsRng
	}

	#[test]
	fn test_export_import_round_trip() -> eyre::Result<()> {
		let bearer = BearerDid::generate(&mut rng());
		let json = serde_json::to_string(&bearer.export())?;
		let imported = BearerDid::from_str(&json)?;
		assert_eq!(imported.uri(), bearer.uri());

		let msg = b"hello";
		imported
			.did()
			.verifying_key()
			.verify(msg, &bearer.sign(msg))?;
		Ok(())
	}

	#[test]
	fn test_key_id() {
		let bearer = BearerDid::generate(&mut rng());
		assert_eq!(bearer.key_id(), format!("{}#0", bearer.uri()));
		assert_eq!(bearer.algorithm(), "EdDSA");
	}

	#[test]
	fn test_import_rejects_mismatched_key() {
		let alice = BearerDid::generate(&mut rng());
		let bob = BearerDid::generate(&mut rng());
		let mut portable = alice.export();
		portable.private_keys = bob.export().private_keys;
		portable.private_keys[0].x = None;
		assert!(matches!(
			BearerDid::import(portable),
			Err(ImportError::KeyMismatch)
		));
	}

	#[test]
	fn test_import_rejects_bad_input() {
		assert!(matches!(BearerDid::from_str("{}"), Err(ImportError::Json(_))));

		let alice = BearerDid::generate(&mut rng());
		let mut no_keys = alice.export();
		no_keys.private_keys.clear();
		assert!(matches!(
			BearerDid::import(no_keys),
			Err(ImportError::KeyCount(0))
		));

		let mut wrong_curve = alice.export();
		wrong_curve.private_keys[0].crv = "X25519".to_owned();
		assert!(matches!(
			BearerDid::import(wrong_curve),
			Err(ImportError::UnsupportedKey)
		));

		let mut not_jwk = alice.export();
		not_jwk.uri = "did:web:example.com".to_owned();
		assert!(matches!(BearerDid::import(not_jwk), Err(ImportError::Did(_))));
	}

	#[test]
	fn test_debug_does_not_leak_private_key() {
		let alice = BearerDid::generate(&mut rng());
		let portable = alice.export();
		let d = portable.private_keys[0].d.clone();
		assert!(!format!("{portable:?}").contains(&d));
	}
}
