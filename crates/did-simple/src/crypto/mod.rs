//! Implementations of cryptographic operations

// Re-exports
#[cfg(feature = "random")]
pub use rand_core;

pub mod ed25519;

/// The JOSE algorithm name of signatures produced by keys in this crate.
///
/// See <https://datatracker.ietf.org/doc/html/rfc8037#section-3.1>
pub const JOSE_ALG_EDDSA: &str = "EdDSA";
