//! The public handle identifier, `@handle/domain`.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// A handle bound to the domain of the registry that it is registered with.
///
/// Neither segment may be empty or contain [`Dap::PREFIX`] or
/// [`Dap::SEPARATOR`]. No normalization is performed.
#[derive(Debug, Eq, PartialEq, Hash, Clone)]
pub struct Dap {
	handle: String,
	domain: String,
}

impl Dap {
	pub const PREFIX: char = '@';
	pub const SEPARATOR: char = '/';

	pub fn new(
		handle: impl Into<String>,
		domain: impl Into<String>,
	) -> Result<Self, MalformedIdentifier> {
		let handle = handle.into();
		let domain = domain.into();
		if !is_valid_segment(&handle) || !is_valid_segment(&domain) {
			return Err(MalformedIdentifier);
		}
		Ok(Self { handle, domain })
	}

	pub fn handle(&self) -> &str {
		&self.handle
	}

	pub fn domain(&self) -> &str {
		&self.domain
	}
}

/// Whether `segment` could be the handle or domain of a [`Dap`].
pub fn is_valid_segment(segment: &str) -> bool {
	!segment.is_empty() && !segment.contains([Dap::PREFIX, Dap::SEPARATOR])
}

impl FromStr for Dap {
	type Err = MalformedIdentifier;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (handle, domain) = s
			.strip_prefix(Self::PREFIX)
			.and_then(|rest| rest.split_once(Self::SEPARATOR))
			.ok_or(MalformedIdentifier)?;
		Self::new(handle, domain)
	}
}

impl Display for Dap {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}{}{}{}", Self::PREFIX, self.handle, Self::SEPARATOR, self.domain)
	}
}

impl Serialize for Dap {
	fn serialize<S: serde::Serializer>(
		&self,
		serializer: S,
	) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Dap {
	fn deserialize<D: serde::Deserializer<'de>>(
		deserializer: D,
	) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		Self::from_str(&s).map_err(serde::de::Error::custom)
	}
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
#[error("Invalid DAP")]
pub struct MalformedIdentifier;
