//! Time sortable registration ids, in the [TypeID] format.
//!
//! An id looks like `reg_01j5fzv0f7e8qvbq8x6k9n3v2w`: the `reg` type tag, an
//! underscore, and 26 characters of lowercase Crockford base32 encoding a
//! UUIDv7. The first 48 bits of the UUID are a unix timestamp in milliseconds.
//!
//! [TypeID]: https://github.com/jetify-com/typeid/tree/main/spec

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ALPHABET: &[u8; 32] = b"0123456789abcdefghjkmnpqrstvwxyz";
const ENCODED_LEN: usize = 26;
const TIMESTAMP_BITS: u32 = 48;

#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
	pub const PREFIX: &'static str = "reg";

	/// Creates a new id stamped with the current time.
	pub fn create() -> Self {
		let now = Utc::now().timestamp_millis();
		Self::create_at(u64::try_from(now).unwrap_or(0))
	}

	/// Creates a new id stamped with `unix_millis`. Only the low 48 bits of the
	/// timestamp are kept.
	pub fn create_at(unix_millis: u64) -> Self {
		let unix_millis = unix_millis & ((1 << TIMESTAMP_BITS) - 1);
		let random_bytes: [u8; 10] = rand::random();
		let uuid =
			uuid::Builder::from_unix_timestamp_millis(unix_millis, &random_bytes)
				.into_uuid();
		Self(uuid)
	}

	pub fn from_uuid(uuid: Uuid) -> Self {
		Self(uuid)
	}

	pub fn as_uuid(&self) -> &Uuid {
		&self.0
	}

	/// The embedded timestamp, in milliseconds since the unix epoch.
	pub fn extract_timestamp(&self) -> u64 {
		(self.0.as_u128() >> (128 - TIMESTAMP_BITS)) as u64
	}

	/// The embedded timestamp.
	pub fn extract_date(&self) -> DateTime<Utc> {
		// 48 bits of milliseconds is roughly 8900 years, well within range.
		DateTime::from_timestamp_millis(self.extract_timestamp() as i64)
			.expect("48 bit timestamps are always in range")
	}
}

fn encode(value: u128) -> String {
	(0..ENCODED_LEN)
		.map(|i| {
			let shift = 5 * (ENCODED_LEN - 1 - i);
			ALPHABET[((value >> shift) & 0x1f) as usize] as char
		})
		.collect()
}

fn decode(s: &str) -> Result<u128, InvalidRegistrationId> {
	if s.len() != ENCODED_LEN {
		return Err(InvalidRegistrationId::InvalidLength(s.len()));
	}
	let mut value: u128 = 0;
	for (i, c) in s.chars().enumerate() {
		let digit = ALPHABET
			.iter()
			.position(|&a| a as char == c)
			.ok_or(InvalidRegistrationId::InvalidCharacter(c))? as u128;
		// 26 characters carry 130 bits, the first one may only use 3 of its 5.
		if i == 0 && digit > 7 {
			return Err(InvalidRegistrationId::Overflow);
		}
		value = (value << 5) | digit;
	}
	Ok(value)
}

impl Display for RegistrationId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}_{}", Self::PREFIX, encode(self.0.as_u128()))
	}
}

impl FromStr for RegistrationId {
	type Err = InvalidRegistrationId;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let Some((prefix, suffix)) = s.split_once('_') else {
			return Err(InvalidRegistrationId::WrongPrefix);
		};
		if prefix != Self::PREFIX {
			return Err(InvalidRegistrationId::WrongPrefix);
		}
		Ok(Self(Uuid::from_u128(decode(suffix)?)))
	}
}

impl Serialize for RegistrationId {
	fn serialize<S: serde::Serializer>(
		&self,
		serializer: S,
	) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for RegistrationId {
	fn deserialize<D: serde::Deserializer<'de>>(
		deserializer: D,
	) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		Self::from_str(&s).map_err(serde::de::Error::custom)
	}
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum InvalidRegistrationId {
	#[error("Registration ID prefix must be \"reg\"")]
	WrongPrefix,
	#[error(
		"Invalid length: expected {ENCODED_LEN} characters after the prefix but got {0}"
	)]
	InvalidLength(usize),
	#[error("Invalid character {0:?} in registration ID")]
	InvalidCharacter(char),
	#[error("Invalid registration ID: encoded value does not fit in 128 bits")]
	Overflow,
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_create_is_unique() {
		assert_ne!(RegistrationId::create(), RegistrationId::create());
	}

	#[test]
	fn test_to_string_format() {
		let s = RegistrationId::create().to_string();
		assert!(s.starts_with("reg_"), "{s}");
		assert_eq!(s.len(), 4 + ENCODED_LEN);
		assert!(s[4..].bytes().all(|b| ALPHABET.contains(&b)));
	}

	#[test]
	fn test_round_trip() {
		for _ in 0..64 {
			let id = RegistrationId::create();
			assert_eq!(RegistrationId::from_str(&id.to_string()), Ok(id));
		}
		let edges = [
			Uuid::nil(),
			Uuid::from_u128(u128::MAX),
			Uuid::from_u128(1 << 127),
		];
		for uuid in edges {
			let id = RegistrationId::from_uuid(uuid);
			assert_eq!(RegistrationId::from_str(&id.to_string()), Ok(id));
		}
	}

	#[test]
	fn test_known_encodings() {
		// Vectors from the TypeID spec.
		let nil = RegistrationId::from_uuid(Uuid::nil());
		assert_eq!(nil.to_string(), "reg_00000000000000000000000000");
		let max = RegistrationId::from_uuid(Uuid::from_u128(u128::MAX));
		assert_eq!(max.to_string(), "reg_7zzzzzzzzzzzzzzzzzzzzzzzzz");
		let one = RegistrationId::from_uuid(Uuid::from_u128(1));
		assert_eq!(one.to_string(), "reg_00000000000000000000000001");
	}

	#[test]
	fn test_timestamp_is_close_to_now() {
		let before = Utc::now().timestamp_millis() as u64;
		let id = RegistrationId::create();
		let after = Utc::now().timestamp_millis() as u64;
		let ts = id.extract_timestamp();
		assert!(before <= ts && ts <= after, "{before} <= {ts} <= {after}");
		assert_eq!(id.extract_date().timestamp_millis() as u64, ts);
	}

	#[test]
	fn test_millisecond_precision() {
		let a = RegistrationId::create_at(1_700_000_000_000);
		let b = RegistrationId::create_at(1_700_000_000_001);
		assert_eq!(b.extract_timestamp() - a.extract_timestamp(), 1);
	}

	#[test]
	fn test_monotonic_timestamps() {
		let mut prev = 0;
		for ms in [0, 1, 86_400_000, 1_700_000_000_000, (1 << 48) - 1] {
			let ts = RegistrationId::create_at(ms).extract_timestamp();
			assert_eq!(ts, ms);
			assert!(prev <= ts);
			prev = ts;
		}
	}

	#[test]
	fn test_dates_far_in_the_future_and_past() {
		for date in ["2100-01-01T00:00:00Z", "1970-01-02T00:00:00Z"] {
			let date: DateTime<Utc> = date.parse().unwrap();
			let id = RegistrationId::create_at(date.timestamp_millis() as u64);
			assert_eq!(id.extract_date(), date);
			let reparsed = RegistrationId::from_str(&id.to_string()).unwrap();
			assert_eq!(reparsed.extract_date(), date);
		}
	}

	#[test]
	fn test_is_uuid_v7() {
		let id = RegistrationId::create();
		assert_eq!(id.as_uuid().get_version_num(), 7);
	}

	#[test]
	fn test_parse_errors() {
		assert_eq!(
			RegistrationId::from_str("reg_1234567890abcdef"),
			Err(InvalidRegistrationId::InvalidLength(16))
		);
		assert!(RegistrationId::from_str("reg_1234567890abcdef")
			.unwrap_err()
			.to_string()
			.starts_with("Invalid length"));
		assert_eq!(
			RegistrationId::from_str("1234567890abcdef1234567890"),
			Err(InvalidRegistrationId::WrongPrefix)
		);
		assert_eq!(
			RegistrationId::from_str("user_00000000000000000000000000"),
			Err(InvalidRegistrationId::WrongPrefix)
		);
		assert_eq!(
			RegistrationId::from_str("reg_0000000000000000000000000u"),
			Err(InvalidRegistrationId::InvalidCharacter('u'))
		);
		assert_eq!(
			RegistrationId::from_str("reg_0000000000000000000000000A"),
			Err(InvalidRegistrationId::InvalidCharacter('A'))
		);
		assert_eq!(
			RegistrationId::from_str("reg_80000000000000000000000000"),
			Err(InvalidRegistrationId::Overflow)
		);
	}

	#[test]
	fn test_serde() {
		let id = RegistrationId::create();
		let json = serde_json::to_value(id).unwrap();
		assert_eq!(json, serde_json::Value::String(id.to_string()));
		assert_eq!(serde_json::from_value::<RegistrationId>(json).unwrap(), id);
		assert!(serde_json::from_str::<RegistrationId>("\"reg_nope\"").is_err());
	}
}
