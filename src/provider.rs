//! # Provider Traits
//!
//! Capabilities the `did:web` method relies on but does not implement itself. Key generation is
//! covered by [`did_core::KeyProvider`]; fetching documents over HTTP is covered by [`Fetch`].

use std::future::Future;

use did_core::TransportError;
use serde_json::Value;

/// [`Fetch`] retrieves a DID document body from a URL.
///
/// Implementers are free to apply whatever transport policy they need (TLS trust, timeouts,
/// proxies) through [`Fetch::Options`]. The resolver passes options through untouched.
pub trait Fetch: Send + Sync {
    /// Per-request transport options.
    type Options: Default + Send + Sync;

    /// Fetch the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the request fails or the server responds with a
    /// non-success status. The error carries the status and the server's error body, if any.
    fn fetch(
        &self, url: &str, options: &Self::Options,
    ) -> impl Future<Output = Result<FetchResponse, TransportError>> + Send;
}

/// A successful fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,

    /// Parsed response body.
    pub data: Value,
}
