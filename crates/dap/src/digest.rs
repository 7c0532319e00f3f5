//! Canonical digests of json payloads.
//!
//! Payloads are serialized with the [JSON Canonicalization Scheme][jcs] and
//! then hashed with SHA-256, so two payloads with the same logical content
//! always have the same digest, regardless of key order or formatting.
//!
//! [jcs]: https://datatracker.ietf.org/doc/html/rfc8785

use serde::Serialize;
use serde_json::{Map, Number, Value};
use sha2::{Digest as _, Sha256};

pub const DIGEST_LEN: usize = 32;

/// Integers with a larger magnitude can't be represented exactly by an IEEE 754
/// double, so they are formatted like the double they would round to.
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// The SHA-256 digest of the canonical form of `payload`.
pub fn digest<T: Serialize + ?Sized>(
	payload: &T,
) -> Result<[u8; DIGEST_LEN], DigestError> {
	let canonical = canonicalize(payload)?;
	Ok(Sha256::digest(canonical.as_bytes()).into())
}

/// Serializes `payload` into its canonical json form.
pub fn canonicalize<T: Serialize + ?Sized>(payload: &T) -> Result<String, DigestError> {
	let value = serde_json::to_value(payload)?;
	let mut out = String::new();
	write_value(&value, &mut out);
	Ok(out)
}

fn write_value(value: &Value, out: &mut String) {
	match value {
		Value::Null => out.push_str("null"),
		Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
		Value::Number(n) => write_number(n, out),
		Value::String(s) => write_string(s, out),
		Value::Array(items) => {
			out.push('[');
			for (i, item) in items.iter().enumerate() {
				if i > 0 {
					out.push(',');
				}
				write_value(item, out);
			}
			out.push(']');
		}
		Value::Object(map) => write_object(map, out),
	}
}

fn write_object(map: &Map<String, Value>, out: &mut String) {
	// Member names are ordered by their UTF-16 code units, not by their UTF-8
	// bytes or chars.
	let mut entries: Vec<(&String, &Value)> = map.iter().collect();
	entries.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));

	out.push('{');
	for (i, (key, value)) in entries.into_iter().enumerate() {
		if i > 0 {
			out.push(',');
		}
		write_string(key, out);
		out.push(':');
		write_value(value, out);
	}
	out.push('}');
}

fn write_string(s: &str, out: &mut String) {
	out.push('"');
	for c in s.chars() {
		match c {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\u{08}' => out.push_str("\\b"),
			'\t' => out.push_str("\\t"),
			'\n' => out.push_str("\\n"),
			'\u{0c}' => out.push_str("\\f"),
			'\r' => out.push_str("\\r"),
			c if c < '\u{20}' => out.push_str(&format!("\\u{:04x}", c as u32)),
			c => out.push(c),
		}
	}
	out.push('"');
}

fn write_number(n: &Number, out: &mut String) {
	if let Some(i) = n.as_u64().filter(|i| *i <= MAX_SAFE_INTEGER) {
		out.push_str(&i.to_string());
	} else if let Some(i) =
		n.as_i64().filter(|i| i.unsigned_abs() <= MAX_SAFE_INTEGER)
	{
		out.push_str(&i.to_string());
	} else if let Some(f) = n.as_f64() {
		out.push_str(&format_f64(f));
	} else {
		// Only reachable with arbitrary precision numbers, which we don't enable.
		out.push_str(&n.to_string());
	}
}

/// Formats a finite double the way ECMAScript's `Number.prototype.toString`
/// does, see <https://tc39.es/ecma262/#sec-numeric-types-number-tostring>.
fn format_f64(f: f64) -> String {
	if f == 0.0 {
		return "0".to_owned();
	}
	// `{:e}` gives the shortest digits that round trip, which is also what
	// ECMAScript requires.
	let sci = format!("{:e}", f.abs());
	let (mantissa, exponent) =
		sci.split_once('e').expect("{:e} always has an exponent");
	let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
	let exponent: i32 = exponent.parse().expect("{:e} exponent is an integer");

	let k = digits.len() as i32;
	let n = exponent + 1;
	let mut out = String::new();
	if f.is_sign_negative() {
		out.push('-');
	}
	if k <= n && n <= 21 {
		out.push_str(&digits);
		out.extend(std::iter::repeat('0').take((n - k) as usize));
	} else if 0 < n && n <= 21 {
		out.push_str(&digits[..n as usize]);
		out.push('.');
		out.push_str(&digits[n as usize..]);
	} else if -6 < n && n <= 0 {
		out.push_str("0.");
		out.extend(std::iter::repeat('0').take((-n) as usize));
		out.push_str(&digits);
	} else {
		out.push_str(&digits[..1]);
		if k > 1 {
			out.push('.');
			out.push_str(&digits[1..]);
		}
		out.push('e');
		out.push(if n - 1 < 0 { '-' } else { '+' });
		out.push_str(&(n - 1).abs().to_string());
	}
	out
}

#[derive(thiserror::Error, Debug)]
#[error("payload could not be represented as json: {0}")]
pub struct DigestError(#[from] serde_json::Error);
