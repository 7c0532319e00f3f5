pub mod jwk;

use crate::{
	crypto::ed25519::VerifyingKey,
	uri::{DidMethod, DidUri},
};

/// Dynamically typed did method. Only methods that can be resolved without
/// any network access are supported.
#[derive(Debug, Eq, PartialEq, Hash, Clone)]
#[non_exhaustive]
pub enum DidDyn {
	Jwk(self::jwk::DidJwk),
}

impl DidDyn {
	pub fn uri(&self) -> &DidUri {
		match self {
			Self::Jwk(did) => did.uri(),
		}
	}

	/// Gets the key for a verification method of this DID, identified by the
	/// fragment of its DID url.
	pub fn verifying_key(
		&self,
		fragment: Option<&str>,
	) -> Result<&VerifyingKey, ResolveError> {
		match self {
			Self::Jwk(did) => match fragment {
				None | Some(self::jwk::VERIFICATION_METHOD_FRAGMENT) => {
					Ok(did.verifying_key())
				}
				Some(other) => {
					Err(ResolveError::UnknownVerificationMethod(other.to_owned()))
				}
			},
		}
	}
}

impl TryFrom<DidUri> for DidDyn {
	type Error = ResolveError;

	fn try_from(value: DidUri) -> Result<Self, Self::Error> {
		match value.method() {
			DidMethod::Jwk => Ok(Self::Jwk(self::jwk::DidJwk::try_from(value)?)),
			m @ (DidMethod::Dht | DidMethod::Key | DidMethod::Web) => {
				Err(ResolveError::UnsupportedMethod(m))
			}
		}
	}
}

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
	#[error("resolving did:{0} is not supported")]
	UnsupportedMethod(DidMethod),
	#[error("no verification method with fragment {0:?}")]
	UnknownVerificationMethod(String),
	#[error(transparent)]
	Jwk(#[from] self::jwk::FromUriError),
}
