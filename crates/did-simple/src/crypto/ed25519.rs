//! Ed25519 keys, as used by the [`EdDSA`][rfc8037] JOSE algorithm.
//!
//! [rfc8037]: https://datatracker.ietf.org/doc/html/rfc8037

pub use ed25519_dalek::Signature;

/// An ed25519 public key.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

impl VerifyingKey {
	pub const LEN: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;

	/// Instantiates `VerifyingKey` from some bytes. Performs all necessary
	/// validation that the key is valid and of sufficient strength.
	///
	/// Note that we will reject any keys that are too weak (aka low order).
	pub fn try_from_bytes(bytes: &[u8; Self::LEN]) -> Result<Self, TryFromBytesError> {
		let key = ed25519_dalek::VerifyingKey::from_bytes(bytes)
			.map_err(|_| TryFromBytesError::NotOnCurve)?;
		if key.is_weak() {
			return Err(TryFromBytesError::WeakKey);
		}
		Ok(Self(key))
	}

	/// Same as [`Self::try_from_bytes`], but also checks the length of the slice.
	pub fn try_from_slice(bytes: &[u8]) -> Result<Self, TryFromBytesError> {
		let bytes: &[u8; Self::LEN] = bytes
			.try_into()
			.map_err(|_| TryFromBytesError::WrongLength(bytes.len()))?;
		Self::try_from_bytes(bytes)
	}

	pub fn as_bytes(&self) -> &[u8; Self::LEN] {
		self.0.as_bytes()
	}

	pub fn into_inner(self) -> ed25519_dalek::VerifyingKey {
		self.0
	}

	/// Verifies `signature` over `message`, rejecting malleable signatures.
	pub fn verify(
		&self,
		message: &[u8],
		signature: &Signature,
	) -> Result<(), SignatureError> {
		self.0.verify_strict(message, signature)?;
		Ok(())
	}
}

/// An ed25519 private key.
#[derive(Clone)]
pub struct SigningKey(ed25519_dalek::SigningKey);

impl SigningKey {
	pub const LEN: usize = ed25519_dalek::SECRET_KEY_LENGTH;

	pub fn from_bytes(bytes: &[u8; Self::LEN]) -> Self {
		Self(ed25519_dalek::SigningKey::from_bytes(bytes))
	}

	#[cfg(feature = "random")]
	pub fn random<R>(rng: &mut R) -> Self
	where
		R: rand_core::CryptoRngCore + ?Sized,
	{
		Self(ed25519_dalek::SigningKey::generate(rng))
	}

	pub fn verifying_key(&self) -> VerifyingKey {
		VerifyingKey(self.0.verifying_key())
	}

	pub fn sign(&self, message: &[u8]) -> Signature {
		use ed25519_dalek::Signer as _;
		self.0.sign(message)
	}

	/// The raw secret scalar seed. Handle with care.
	pub fn to_bytes(&self) -> [u8; Self::LEN] {
		self.0.to_bytes()
	}
}

impl std::fmt::Debug for SigningKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SigningKey")
			.field("verifying_key", &self.verifying_key())
			.finish_non_exhaustive()
	}
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum TryFromBytesError {
	#[error(
		"the provided bytes was not the y coordinate of a valid point on the curve"
	)]
	NotOnCurve,
	#[error("public key has a low order and is too weak, which would allow the key to generate signatures that work for almost any message. To prevent this, we reject weak keys.")]
	WeakKey,
	#[error("expected {} bytes but got {0}", VerifyingKey::LEN)]
	WrongLength(usize),
}

/// Errors which may occur while processing signatures and keypairs.
#[derive(thiserror::Error, Debug)]
#[error("invalid signature")]
pub struct SignatureError(#[from] ed25519_dalek::SignatureError);
