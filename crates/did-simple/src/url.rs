use std::{fmt::Display, str::FromStr};

use crate::uri::{DidUri, ParseError as UriParseError};

/// A Decentralized Identifier with an optional fragment, as used to point at a
/// specific verification method, for example `did:jwk:eyJr...#0`.
///
/// Paths and queries are not supported.
#[derive(Debug, Eq, PartialEq, Hash, Clone)]
pub struct DidUrl {
	did: DidUri,
	fragment: Option<String>,
}

impl DidUrl {
	pub fn new(did: DidUri, fragment: Option<String>) -> Self {
		Self { did, fragment }
	}

	/// The DID that this url is relative to.
	pub fn did(&self) -> &DidUri {
		&self.did
	}

	/// The part after the `#`, if any.
	pub fn fragment(&self) -> Option<&str> {
		self.fragment.as_deref()
	}

	pub fn into_did(self) -> DidUri {
		self.did
	}
}

impl FromStr for DidUrl {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (did, fragment) = match s.split_once('#') {
			Some((_, "")) => return Err(ParseError::EmptyFragment),
			Some((did, fragment)) => (did, Some(fragment.to_owned())),
			None => (s, None),
		};
		if did.contains(['?', '/']) {
			return Err(ParseError::Unsupported);
		}
		Ok(Self {
			did: DidUri::from_str(did)?,
			fragment,
		})
	}
}

impl Display for DidUrl {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.fragment {
			Some(fragment) => write!(f, "{}#{fragment}", self.did),
			None => self.did.fmt(f),
		}
	}
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum ParseError {
	#[error(transparent)]
	Did(#[from] UriParseError),
	#[error("fragment separator was present but the fragment was empty")]
	EmptyFragment,
	#[error("did urls with paths or queries are not supported")]
	Unsupported,
}
