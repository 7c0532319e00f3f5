//! Decentralized Agnostic Paytags (DAPs).
//!
//! A DAP is a human readable handle like `@alice/example.com`, bound to a
//! [DID](did_simple). The holder of the DID signs a [`DapRegistration`] and
//! submits it to the registry of `example.com`, which stores it and answers
//! with the same registration counter-signed by the registry's own DID, as a
//! proof of registration.

#![forbid(unsafe_code)]

pub mod client;
pub mod dap;
pub mod digest;
pub mod jws;
pub mod messages;
pub mod registration;
pub mod registration_id;

pub use crate::dap::{Dap, MalformedIdentifier};
pub use crate::jws::DidSigner;
pub use crate::registration::{
	DapRegistration, InvalidDapRegistration, RegistrationError, VerifiedRegistration,
};
pub use crate::registration_id::{InvalidRegistrationId, RegistrationId};
