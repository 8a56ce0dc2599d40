//! # DID Web
//!
//! An implementation of the `did:web` DID method.
//!
//! - [`did_from_url`] and [`url_from_did`] convert between HTTPS URLs and `did:web` DIDs.
//! - [`DidWebResolver::generate`] builds a DID document, binding keys generated by a
//!   [`KeyProvider`] (or supplied by the caller) to its verification relationships.
//! - [`DidWebResolver::get`] fetches a published document through a [`Fetch`] transport. With
//!   the `reqwest` feature (on by default) [`HttpClient`] provides one.
//!
//! # Example
//!
//! ```
//! use vercre_didweb::{did_from_url, url_from_did};
//!
//! let did = did_from_url("https://example.com/user/alice").unwrap();
//! assert_eq!(did, "did:web:example.com:user:alice");
//! assert_eq!(url_from_did(&did).unwrap(), "https://example.com/user/alice");
//! ```

#[cfg(feature = "reqwest")]
mod http;
mod provider;
pub mod web;

pub use did_core::error::{Err, Error};
pub use did_core::{
    Context, DidDocument, KeyPair, KeyProvider, KeyPurpose, Result, TransportError,
    VerificationMethod, VmRelationship, DID_CONTEXT, ED25519_2020_CONTEXT, X25519_2020_CONTEXT,
};

#[cfg(feature = "reqwest")]
pub use self::http::*;
pub use self::provider::*;
pub use self::web::*;
