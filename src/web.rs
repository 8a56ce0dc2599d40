//! # DID Web
//!
//! The `did:web` method uses a web domain's reputation to confer trust. A DID maps to the HTTPS
//! location of its document:
//!
//! - `did:web:example.com` is published at `https://example.com/.well-known/did.json`
//! - `did:web:example.com:user:alice` is published at `https://example.com/user/alice`
//!
//! See:
//!
//! - <https://w3c-ccg.github.io/did-method-web>
//! - <https://w3c.github.io/did-resolution>

mod keys;
mod resolver;
mod url;

pub use keys::*;
pub use resolver::*;
pub use url::*;
