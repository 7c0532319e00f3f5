//! A minimal [DID document][did-core], enough to publish the keys of a DID.
//!
//! [did-core]: https://www.w3.org/TR/did-core/#core-properties

use jose_jwk::Jwk;
use serde::{Deserialize, Serialize};

pub const DID_CORE_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
	#[serde(rename = "@context")]
	pub context: Vec<String>,
	pub id: String,
	pub verification_method: Vec<VerificationMethod>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub authentication: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub assertion_method: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub capability_invocation: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub capability_delegation: Vec<String>,
}

impl DidDocument {
	/// Looks up a verification method by its full id (`did#fragment`).
	pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
		self.verification_method.iter().find(|vm| vm.id == id)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
	pub id: String,
	#[serde(rename = "type")]
	pub kind: String,
	pub controller: String,
	pub public_key_jwk: Jwk,
}
