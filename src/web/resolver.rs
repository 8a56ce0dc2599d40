//! # `did:web` Resolver
//!
//! Generates `did:web` documents from a key map and fetches published documents over HTTPS.

use std::sync::Arc;

use did_core::error::Err;
use did_core::{
    tracerr, Context, DidDocument, KeyPair, KeyProvider, KeyPurpose, Result, VerificationMethod,
    DID_CONTEXT, ED25519_2020_CONTEXT, X25519_2020_CONTEXT,
};
use serde_json::Value;

use crate::provider::Fetch;
use crate::web::keys::{initialize_keys, KeyMap, KeyPairSet};
use crate::web::url::{did_from_url, url_from_did};

/// The `did:web` method.
///
/// The resolver is built around a [`Fetch`] transport. Document generation additionally needs a
/// [`KeyProvider`] when the key map asks for new keys: set one with
/// [`DidWebResolver::with_key_provider`].
pub struct DidWebResolver<F, P = NoKeyProvider>
where
    F: Fetch,
    P: KeyProvider,
{
    fetcher: F,
    key_provider: Option<P>,
    key_map: KeyMap<P::KeyPair>,
}

impl<F, P> Clone for DidWebResolver<F, P>
where
    F: Fetch + Clone,
    P: KeyProvider + Clone,
{
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            key_provider: self.key_provider.clone(),
            key_map: self.key_map.clone(),
        }
    }
}

impl<F: Fetch> DidWebResolver<F> {
    /// Create a resolver using `fetcher` to retrieve documents. The resolver starts without a key
    /// provider and with the default key map.
    #[must_use]
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            key_provider: None,
            key_map: KeyMap::defaults(),
        }
    }
}

impl<F, P> DidWebResolver<F, P>
where
    F: Fetch,
    P: KeyProvider,
{
    /// Use `key_provider` to generate keys. Resets the key map to the default since key maps
    /// are tied to the provider's key pair type.
    #[must_use]
    pub fn with_key_provider<Q: KeyProvider>(self, key_provider: Q) -> DidWebResolver<F, Q> {
        DidWebResolver {
            fetcher: self.fetcher,
            key_provider: Some(key_provider),
            key_map: KeyMap::defaults(),
        }
    }

    /// Replace the key map used when a generate request does not carry its own.
    #[must_use]
    pub fn with_key_map(mut self, key_map: KeyMap<P::KeyPair>) -> Self {
        self.key_map = key_map;
        self
    }

    /// The transport used to fetch documents.
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The DID method name.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        "web"
    }

    /// Generate a DID document and its key pairs.
    ///
    /// The DID is taken from the request's `id` or, failing that, derived from its `url`. The
    /// document carries the DID, Ed25519 2020 and X25519 2020 contexts and one verification
    /// method per purpose in the key map.
    ///
    /// # Errors
    ///
    /// Returns `Err::InvalidFormat` if the DID has to be derived from a missing or invalid URL
    /// and `Err::InvalidConfig` if key initialization fails. See [`initialize_keys`].
    pub async fn generate(
        &self, request: GenerateRequest<P::KeyPair>,
    ) -> Result<Generated<P::KeyPair>> {
        let id = match request.id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => did_from_url(request.url.as_deref().unwrap_or_default())?,
        };
        tracing::debug!(did = %id, "generating DID document");

        let document = DidDocument {
            context: vec![
                Context::url(DID_CONTEXT),
                Context::url(ED25519_2020_CONTEXT),
                Context::url(X25519_2020_CONTEXT),
            ],
            id,
            ..DidDocument::default()
        };

        let key_map = request.key_map.as_ref().unwrap_or(&self.key_map);
        let (document, key_pairs) =
            initialize_keys(&document, self.key_provider.as_ref(), key_map).await?;

        Ok(Generated {
            document,
            key_pairs,
        })
    }

    /// Fetch a published DID document as raw JSON.
    ///
    /// The document is fetched from the request's `url` when set, otherwise from the URL derived
    /// from its `did`. The body is returned as the transport parsed it, without validation.
    ///
    /// # Errors
    ///
    /// Returns `Err::InvalidConfig` if the request has neither a DID nor a URL and a format error
    /// if the DID cannot be converted. Transport failures are returned unchanged: use
    /// [`did_core::error::Error::transport`] to inspect the status and server error body.
    pub async fn get(&self, request: &GetRequest<F::Options>) -> Result<Value> {
        let url = match (non_empty(request.url.as_ref()), non_empty(request.did.as_ref())) {
            (Some(url), _) => url.to_string(),
            (None, Some(did)) => url_from_did(did)?,
            (None, None) => {
                tracerr!(Err::InvalidConfig, "A did or url is required to get a document.")
            }
        };

        match self.fetcher.fetch(&url, &request.options).await {
            Ok(res) => {
                tracing::trace!(%url, status = res.status, "fetched DID document");
                Ok(res.data)
            }
            Err(e) => {
                tracing::error!(
                    %url, status = ?e.status, data = ?e.data,
                    "error fetching DID document: {}", e.message
                );
                Err(e.into())
            }
        }
    }

    /// Fetch a published DID document and deserialize it.
    ///
    /// # Errors
    ///
    /// As for [`DidWebResolver::get`], plus `Err::DeserializationError` if the body is not a DID
    /// document: not a JSON object, the wrong shape, or without an `id`.
    pub async fn get_document(&self, request: &GetRequest<F::Options>) -> Result<DidDocument> {
        let data = self.get(request).await?;
        if !data.is_object() {
            tracerr!(Err::DeserializationError, "DID document is not a JSON object.");
        }
        let doc: DidDocument = match serde_json::from_value(data) {
            Ok(doc) => doc,
            Err(e) => tracerr!(Err::DeserializationError, "Not a DID document: {}", e),
        };
        if doc.id.is_empty() {
            tracerr!(Err::DeserializationError, "DID document has no \"id\".");
        }
        Ok(doc)
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// Request to generate a DID document. Set either `id` or `url`. Empty strings count as unset.
#[derive(Debug)]
pub struct GenerateRequest<K> {
    /// The DID to generate a document for.
    pub id: Option<String>,

    /// HTTPS URL to derive the DID from when `id` is not set.
    pub url: Option<String>,

    /// Keys to bind. The resolver's key map is used when unset.
    pub key_map: Option<KeyMap<K>>,
}

impl<K> Default for GenerateRequest<K> {
    fn default() -> Self {
        Self {
            id: None,
            url: None,
            key_map: None,
        }
    }
}

impl<K> GenerateRequest<K> {
    /// Generate a document for an existing DID.
    #[must_use]
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Generate a document for the DID derived from an HTTPS URL.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Bind keys according to `key_map` instead of the resolver's.
    #[must_use]
    pub fn key_map(mut self, key_map: KeyMap<K>) -> Self {
        self.key_map = Some(key_map);
        self
    }
}

/// A generated document with the key pairs bound to it.
#[derive(Debug)]
pub struct Generated<K> {
    /// The populated DID document.
    pub document: DidDocument,

    /// Key pairs referenced by the document, by key ID. The caller is responsible for storing
    /// them.
    pub key_pairs: KeyPairSet<K>,
}

impl<K> Generated<K> {
    /// The key pair bound to `purpose`: the key whose ID is the first verification method for
    /// that purpose.
    ///
    /// # Errors
    ///
    /// Returns `Err::KeyNotFound` if the purpose has no verification method or the method's key
    /// is not in the key pair set.
    pub fn method_for(&self, purpose: KeyPurpose) -> Result<Arc<K>> {
        let key = self
            .document
            .purpose(purpose)
            .and_then(|rels| rels.first())
            .and_then(|rel| rel.method_id())
            .and_then(|id| self.key_pairs.get(id));

        match key {
            Some(k) => Ok(Arc::clone(k)),
            None => tracerr!(Err::KeyNotFound, "No key pair for purpose {}", purpose),
        }
    }
}

/// Request to fetch a DID document. Set either `did` or `url`. Empty strings count as unset.
#[derive(Clone, Debug, Default)]
pub struct GetRequest<O> {
    /// DID of the document.
    pub did: Option<String>,

    /// URL of the document. Takes precedence over `did`.
    pub url: Option<String>,

    /// Transport options, passed to the fetcher as-is.
    pub options: O,
}

impl<O: Default> GetRequest<O> {
    /// Fetch the document for a DID.
    #[must_use]
    pub fn did(did: impl Into<String>) -> Self {
        Self {
            did: Some(did.into()),
            url: None,
            options: O::default(),
        }
    }

    /// Fetch the document at a URL.
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            did: None,
            url: Some(url.into()),
            options: O::default(),
        }
    }
}

impl<O> GetRequest<O> {
    /// Set transport options.
    #[must_use]
    pub fn options(mut self, options: O) -> Self {
        self.options = options;
        self
    }
}

/// Key provider placeholder for a resolver that only fetches documents. It generates nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoKeyProvider;

/// Key pair type of [`NoKeyProvider`]. It has no values.
#[derive(Debug)]
pub enum NoKeyPair {}

impl KeyPair for NoKeyPair {
    fn id(&self) -> &str {
        match *self {}
    }

    fn controller(&self) -> &str {
        match *self {}
    }

    fn key_type(&self) -> &str {
        match *self {}
    }

    fn export(&self, _public_only: bool) -> VerificationMethod {
        match *self {}
    }
}

impl KeyProvider for NoKeyProvider {
    type KeyPair = NoKeyPair;

    async fn generate(&self, key_type: &str, _controller: &str) -> Result<NoKeyPair> {
        tracerr!(Err::InvalidConfig, "No key provider configured to generate a {} key.", key_type)
    }
}

#[cfg(test)]
mod tests {
    use did_core::TransportError;
    use serde_json::json;

    use super::*;
    use crate::provider::FetchResponse;

    #[derive(Clone, Debug, Default)]
    struct StaticFetch;

    impl Fetch for StaticFetch {
        type Options = ();

        async fn fetch(&self, url: &str, _: &()) -> Result<FetchResponse, TransportError> {
            Ok(FetchResponse {
                status: 200,
                data: json!({"id": url}),
            })
        }
    }

    #[test]
    fn method_name() {
        assert_eq!(DidWebResolver::new(StaticFetch).method(), "web");
    }

    #[tokio::test]
    async fn url_takes_precedence() {
        let resolver = DidWebResolver::new(StaticFetch);
        let request = GetRequest {
            did: Some("did:web:example.com".to_string()),
            url: Some("https://other.example/doc.json".to_string()),
            options: (),
        };
        let doc = resolver.get(&request).await.expect("should get");
        assert_eq!(doc, json!({"id": "https://other.example/doc.json"}));
    }

    #[tokio::test]
    async fn empty_url_falls_back_to_did() {
        let resolver = DidWebResolver::new(StaticFetch);
        let request = GetRequest {
            did: Some("did:web:example.com".to_string()),
            url: Some(String::new()),
            options: (),
        };
        let doc = resolver.get(&request).await.expect("should get");
        assert_eq!(doc, json!({"id": "https://example.com/.well-known/did.json"}));

        let request = GetRequest {
            did: Some(String::new()),
            url: Some(String::new()),
            options: (),
        };
        let err = resolver.get(&request).await.expect_err("should need a did or url");
        assert!(err.is(Err::InvalidConfig));
    }

    #[tokio::test]
    async fn empty_id_falls_back_to_url() {
        let resolver = DidWebResolver::new(StaticFetch);
        let request = GenerateRequest {
            id: Some(String::new()),
            url: Some("https://example.com/user/alice".to_string()),
            key_map: Some(KeyMap::new()),
        };
        let generated = resolver.generate(request).await.expect("should generate");
        assert_eq!(generated.document.id, "did:web:example.com:user:alice");
    }

    #[tokio::test]
    async fn generate_needs_provider() {
        let resolver = DidWebResolver::new(StaticFetch);
        let err = resolver
            .generate(GenerateRequest::from_url("https://example.com"))
            .await
            .expect_err("should need a key provider");
        assert!(err.is(Err::InvalidConfig));
    }

    #[tokio::test]
    async fn generate_without_keys() {
        let resolver = DidWebResolver::new(StaticFetch);
        let generated = resolver
            .generate(GenerateRequest::from_id("did:web:example.com").key_map(KeyMap::new()))
            .await
            .expect("should generate");

        assert_eq!(generated.document.id, "did:web:example.com");
        assert_eq!(generated.document.context.len(), 3);
        assert!(generated.key_pairs.is_empty());

        let err = generated.method_for(KeyPurpose::Authentication).expect_err("no keys");
        assert!(err.is(Err::KeyNotFound));
    }
}
