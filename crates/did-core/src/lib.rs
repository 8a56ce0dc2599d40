//! # DID Core
//! Types, traits and functions for working with Decentralized Identifiers (DIDs) and DID Documents.
//!
//! The crate is method-independent: it defines the DID document data model, the closed set of
//! verification relationships, the key capability traits a DID method builds documents with and
//! the error type shared across the workspace.

pub(crate) mod document;
pub mod error;
pub(crate) mod keys;
mod serde;

pub use document::context::{Context, DID_CONTEXT, ED25519_2020_CONTEXT, X25519_2020_CONTEXT};
pub use document::verification_method::{KeyPurpose, VerificationMethod, VmRelationship};
pub use document::DidDocument;
pub use error::TransportError;
pub use keys::{KeyPair, KeyProvider};

/// Result type for DID Core.
pub type Result<T, E = error::Error> = core::result::Result<T, E>;
