use std::{fmt::Display, str::FromStr};

#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone)]
pub enum DidMethod {
	Dht,
	Jwk,
	Key,
	Web,
}

impl DidMethod {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Dht => "dht",
			Self::Jwk => "jwk",
			Self::Key => "key",
			Self::Web => "web",
		}
	}
}

impl FromStr for DidMethod {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s {
			"dht" => Self::Dht,
			"jwk" => Self::Jwk,
			"key" => Self::Key,
			"web" => Self::Web,
			"" => return Err(ParseError::MissingMethod),
			_ => return Err(ParseError::UnknownMethod),
		})
	}
}

impl Display for DidMethod {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.as_str().fmt(f)
	}
}

/// A bare DID, for example `did:jwk:eyJrdHkiOiJPS1Ai...`.
///
/// The method-specific-id is opaque at this level, it is up to the individual
/// [methods](crate::methods) to make sense of it.
#[derive(Debug, Eq, PartialEq, Hash, Clone)]
pub struct DidUri {
	method: DidMethod,
	/// The string representation of the DID.
	s: String,
	/// The substring for method-specific-id. This is a range index into `s`.
	method_specific_id: std::ops::RangeFrom<usize>,
}

impl DidUri {
	/// Gets the buffer representing the uri as a str.
	pub fn as_str(&self) -> &str {
		&self.s
	}

	/// Gets the buffer representing the uri as a byte slice.
	pub fn as_slice(&self) -> &[u8] {
		self.s.as_bytes()
	}

	/// The method of the did.
	pub fn method(&self) -> DidMethod {
		self.method
	}

	/// Method-specific identity info.
	pub fn method_specific_id(&self) -> &str {
		&self.s[self.method_specific_id.clone()]
	}

	pub fn into_inner(self) -> String {
		self.s
	}
}

impl FromStr for DidUri {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::try_from(s.to_owned())
	}
}

impl TryFrom<String> for DidUri {
	type Error = ParseError;

	fn try_from(s: String) -> Result<Self, Self::Error> {
		let (method, remaining) = s
			.strip_prefix("did:")
			.ok_or(ParseError::InvalidScheme)?
			.split_once(':')
			.ok_or(ParseError::MissingMethod)?;
		let method = DidMethod::from_str(method)?;
		if remaining.is_empty() {
			return Err(ParseError::EmptyMethodSpecificId);
		}
		if remaining.contains(['#', '?', '/']) {
			return Err(ParseError::NotABareDid);
		}
		let start_idx = s.len() - remaining.len();

		Ok(DidUri {
			method,
			s,
			method_specific_id: (start_idx..),
		})
	}
}

impl Display for DidUri {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.as_str().fmt(f)
	}
}

impl PartialEq<str> for DidUri {
	fn eq(&self, other: &str) -> bool {
		self.as_str() == other
	}
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum ParseError {
	#[error("expected the did: scheme")]
	InvalidScheme,
	#[error("expected did:method, but method was not present")]
	MissingMethod,
	#[error("encountered unknown did:method")]
	UnknownMethod,
	#[error("the method-specific-id of the did was empty")]
	EmptyMethodSpecificId,
	#[error("expected a bare did, without a path, query or fragment")]
	NotABareDid,
}
