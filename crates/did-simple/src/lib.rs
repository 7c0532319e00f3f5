//! A Decentralized Identifier (aka [DID][spec]), is a globally unique
//! identifier that provides a general purpose way of looking up public keys
//! associated with the globally unique identifier.
//!
//! This means that unlike a UUID, someone can prove that they own a DID, and
//! you can verify messages signed by DIDs! This makes DIDs strictly more useful
//! than traditional UUIDs as account identifiers and are very useful for
//! building federated or decentralized services.
//!
//! This crate intentionally only supports DID methods which can be resolved
//! offline, currently [`did:jwk`](methods::jwk). That is enough to check who
//! signed a message, and to hold an identity of your own via [`BearerDid`].
//!
//! [spec]: https://www.w3.org/TR/did-core/

#![forbid(unsafe_code)]

pub mod bearer;
pub mod crypto;
pub mod document;
pub mod methods;
pub mod uri;
pub mod url;

pub use crate::bearer::{BearerDid, PortableDid};
pub use crate::uri::{DidMethod, DidUri};
pub use crate::url::DidUrl;
