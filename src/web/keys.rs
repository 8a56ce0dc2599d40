//! Bind key pairs to a DID document's verification relationships.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::sync::Arc;

use did_core::error::Err;
use did_core::{tracerr, DidDocument, KeyPair, KeyProvider, KeyPurpose, Result};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

/// Signature key type used by the default key map.
pub const SIGNATURE_KEY_TYPE: &str = "Ed25519VerificationKey2020";

/// Key agreement key type used by the default key map.
pub const KEY_AGREEMENT_KEY_TYPE: &str = "X25519KeyAgreementKey2020";

/// Key pairs used to build a document, by key ID. The map shares the key pairs with the caller,
/// who remains responsible for storing them.
pub type KeyPairSet<K> = HashMap<String, Arc<K>>;

/// What to bind to a verification relationship.
#[derive(Debug)]
pub enum KeySpec<K> {
    /// Generate a new key of the named type with the document's key provider.
    Generate(String),

    /// Use an existing key pair as-is.
    Existing(Arc<K>),
}

impl<K> Clone for KeySpec<K> {
    fn clone(&self) -> Self {
        match self {
            Self::Generate(key_type) => Self::Generate(key_type.clone()),
            Self::Existing(key) => Self::Existing(Arc::clone(key)),
        }
    }
}

impl<K> From<&str> for KeySpec<K> {
    fn from(key_type: &str) -> Self {
        Self::Generate(key_type.to_string())
    }
}

impl<K> From<String> for KeySpec<K> {
    fn from(key_type: String) -> Self {
        Self::Generate(key_type)
    }
}

impl<K> From<Arc<K>> for KeySpec<K> {
    fn from(key: Arc<K>) -> Self {
        Self::Existing(key)
    }
}

/// Keys (or key types) to bind, by verification relationship name.
///
/// Purposes are held by name and only checked against [`KeyPurpose`] when the map is used, so a
/// map loaded from configuration can carry an unsupported name until then. Each purpose appears
/// at most once: inserting a purpose again replaces its entry. Entries iterate in name order.
#[derive(Debug)]
pub struct KeyMap<K> {
    entries: BTreeMap<String, KeySpec<K>>,
}

impl<K> Default for KeyMap<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K> Clone for KeyMap<K> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<K> KeyMap<K> {
    /// An empty key map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The key map used when generating a document without an explicit map: an Ed25519
    /// signature key for authentication, assertion, capability invocation and capability
    /// delegation and an X25519 key for key agreement.
    #[must_use]
    pub fn defaults() -> Self {
        Self::new()
            .with(KeyPurpose::Authentication, SIGNATURE_KEY_TYPE)
            .with(KeyPurpose::AssertionMethod, SIGNATURE_KEY_TYPE)
            .with(KeyPurpose::CapabilityInvocation, SIGNATURE_KEY_TYPE)
            .with(KeyPurpose::CapabilityDelegation, SIGNATURE_KEY_TYPE)
            .with(KeyPurpose::KeyAgreement, KEY_AGREEMENT_KEY_TYPE)
    }

    /// Add (or replace) the key for a purpose. `purpose` may be a [`KeyPurpose`] or a
    /// relationship name.
    #[must_use]
    pub fn with(mut self, purpose: impl Display, spec: impl Into<KeySpec<K>>) -> Self {
        self.insert(purpose, spec);
        self
    }

    /// Add (or replace) the key for a purpose.
    pub fn insert(&mut self, purpose: impl Display, spec: impl Into<KeySpec<K>>) {
        self.entries.insert(purpose.to_string(), spec.into());
    }

    /// Number of purposes in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(purpose name, key spec)` entries, ordered by purpose name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeySpec<K>)> {
        self.entries.iter().map(|(purpose, spec)| (purpose.as_str(), spec))
    }
}

/// A key map deserializes from an object of purpose name to key type, for example
/// `{"authentication": "Ed25519VerificationKey2020"}`. Every entry requests key generation.
impl<'de, K> Deserialize<'de> for KeyMap<K> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyTypes<K>(PhantomData<fn() -> KeyMap<K>>);

        impl<'de, K> Visitor<'de> for KeyTypes<K> {
            type Value = KeyMap<K>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of verification relationship to key type")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut key_map = KeyMap::new();
                while let Some((purpose, key_type)) = map.next_entry::<String, String>()? {
                    key_map.insert(purpose, key_type);
                }
                Ok(key_map)
            }
        }

        deserializer.deserialize_map(KeyTypes(PhantomData))
    }
}

/// Populate a DID document's verification relationships from a key map.
///
/// Keys requested by type are generated by `provider` with the document's ID as controller, one
/// purpose at a time in [`KeyPurpose::ALL`] order. Existing keys are used as-is. Each purpose
/// gets a single embedded verification method: the key's public export. A key used for several purposes appears once in the returned set.
///
/// The input document is left untouched; the populated copy is returned.
///
/// # Errors
///
/// Returns `Err::InvalidConfig` if the document has no ID, the key map names an unsupported
/// purpose or a key must be generated and no provider was given. Nothing is generated when a
/// purpose is unsupported. Errors from the provider are returned as-is.
pub async fn initialize_keys<P>(
    document: &DidDocument, provider: Option<&P>, key_map: &KeyMap<P::KeyPair>,
) -> Result<(DidDocument, KeyPairSet<P::KeyPair>)>
where
    P: KeyProvider,
{
    if document.id.is_empty() {
        tracerr!(
            Err::InvalidConfig,
            "DID Document \"id\" property is required to initialize keys."
        );
    }

    let mut plan = key_map
        .iter()
        .map(|(purpose, spec)| Ok((purpose.parse::<KeyPurpose>()?, spec)))
        .collect::<Result<Vec<_>>>()?;
    plan.sort_by_key(|(purpose, _)| *purpose);

    let mut doc = document.clone();
    let mut key_pairs = KeyPairSet::new();

    for (purpose, spec) in plan {
        let key = match spec {
            KeySpec::Generate(key_type) => {
                let Some(provider) = provider else {
                    tracerr!(
                        Err::InvalidConfig,
                        "A key provider is required to generate a {} key for {}.",
                        key_type,
                        purpose
                    );
                };
                Arc::new(provider.generate(key_type, &doc.id).await?)
            }
            KeySpec::Existing(key) => Arc::clone(key),
        };
        tracing::trace!(%purpose, key_id = key.id(), "binding key");

        doc.set_purpose(purpose, vec![key.export(true).into()]);
        key_pairs.insert(key.id().to_string(), key);
    }

    Ok((doc, key_pairs))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use did_core::VerificationMethod;

    use super::*;

    const DID: &str = "did:web:example.com";

    #[derive(Debug)]
    struct TestKey {
        id: String,
        key_type: String,
    }

    impl KeyPair for TestKey {
        fn id(&self) -> &str {
            &self.id
        }

        fn controller(&self) -> &str {
            DID
        }

        fn key_type(&self) -> &str {
            &self.key_type
        }

        fn export(&self, _public_only: bool) -> VerificationMethod {
            VerificationMethod {
                id: self.id.clone(),
                type_: self.key_type.clone(),
                controller: DID.to_string(),
                public_key_multibase: Some(format!("z{}", self.id.len())),
                ..VerificationMethod::default()
            }
        }
    }

    // Numbers keys in generation order.
    #[derive(Default)]
    struct CountingProvider {
        generated: AtomicUsize,
    }

    impl KeyProvider for CountingProvider {
        type KeyPair = TestKey;

        async fn generate(&self, key_type: &str, controller: &str) -> Result<TestKey> {
            let n = self.generated.fetch_add(1, Ordering::SeqCst);
            Ok(TestKey {
                id: format!("{controller}#key-{n}"),
                key_type: key_type.to_string(),
            })
        }
    }

    fn document() -> DidDocument {
        DidDocument {
            id: DID.to_string(),
            ..DidDocument::default()
        }
    }

    #[tokio::test]
    async fn generates_requested_keys() {
        let provider = CountingProvider::default();
        let key_map = KeyMap::new()
            .with(KeyPurpose::Authentication, SIGNATURE_KEY_TYPE)
            .with("keyAgreement", KEY_AGREEMENT_KEY_TYPE);

        let input = document();
        let (doc, key_pairs) =
            initialize_keys(&input, Some(&provider), &key_map).await.expect("should initialize");

        assert_eq!(provider.generated.load(Ordering::SeqCst), 2);
        assert_eq!(key_pairs.len(), 2);
        assert_eq!(doc.purposes(), vec![KeyPurpose::Authentication, KeyPurpose::KeyAgreement]);

        let ka = doc.get_key(KeyPurpose::KeyAgreement).expect("should have key agreement");
        assert_eq!(ka.type_, KEY_AGREEMENT_KEY_TYPE);
        assert_eq!(ka.controller, DID);
        assert!(key_pairs.contains_key(&ka.id));

        // input is not modified
        assert!(input.purposes().is_empty());
    }

    #[tokio::test]
    async fn generation_order() {
        let provider = CountingProvider::default();
        let (doc, _) = initialize_keys(&document(), Some(&provider), &KeyMap::defaults())
            .await
            .expect("should initialize");

        for (n, purpose) in KeyPurpose::ALL.into_iter().enumerate() {
            let vm = doc.get_key(purpose).expect("should have key");
            assert_eq!(vm.id, format!("{DID}#key-{n}"), "{purpose}");
        }
    }

    #[tokio::test]
    async fn existing_key_is_shared() {
        let key = Arc::new(TestKey {
            id: format!("{DID}#existing"),
            key_type: SIGNATURE_KEY_TYPE.to_string(),
        });
        let key_map = KeyMap::new()
            .with(KeyPurpose::Authentication, Arc::clone(&key))
            .with(KeyPurpose::AssertionMethod, Arc::clone(&key));

        let (doc, key_pairs) = initialize_keys::<CountingProvider>(&document(), None, &key_map)
            .await
            .expect("should initialize without a provider");

        assert_eq!(key_pairs.len(), 1);
        assert!(Arc::ptr_eq(&key_pairs[&key.id], &key));

        let auth = doc.get_key(KeyPurpose::Authentication).expect("should have auth key");
        let assertion = doc.get_key(KeyPurpose::AssertionMethod).expect("should have assertion");
        assert_eq!(auth.id, key.id);
        assert_eq!(assertion.id, key.id);
    }

    #[tokio::test]
    async fn unsupported_purpose() {
        let provider = CountingProvider::default();
        let key_map = KeyMap::new()
            .with(KeyPurpose::Authentication, SIGNATURE_KEY_TYPE)
            .with("signing", SIGNATURE_KEY_TYPE);

        let err = initialize_keys(&document(), Some(&provider), &key_map)
            .await
            .expect_err("should reject purpose");

        assert!(err.is(Err::InvalidConfig));
        assert_eq!(err.to_string(), "Unsupported key purpose: \"signing\"");
        assert_eq!(provider.generated.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_id() {
        let provider = CountingProvider::default();
        let err = initialize_keys(&DidDocument::default(), Some(&provider), &KeyMap::defaults())
            .await
            .expect_err("should require an id");
        assert!(err.is(Err::InvalidConfig));
    }

    #[tokio::test]
    async fn missing_provider() {
        let key_map = KeyMap::new().with(KeyPurpose::Authentication, SIGNATURE_KEY_TYPE);
        let err = initialize_keys::<CountingProvider>(&document(), None, &key_map)
            .await
            .expect_err("should require a provider");
        assert!(err.is(Err::InvalidConfig));
    }

    #[tokio::test]
    async fn empty_key_map() {
        let (doc, key_pairs) =
            initialize_keys::<CountingProvider>(&document(), None, &KeyMap::new())
                .await
                .expect("should initialize");
        assert_eq!(doc, document());
        assert!(key_pairs.is_empty());
    }

    #[test]
    fn deserialize_key_map() {
        let key_map: KeyMap<TestKey> = serde_json::from_str(
            r#"{"authentication": "Ed25519VerificationKey2020", "keyAgreement": "X25519KeyAgreementKey2020"}"#,
        )
        .expect("should deserialize");

        assert_eq!(key_map.len(), 2);
        let mut entries = key_map
            .iter()
            .map(|(purpose, spec)| match spec {
                KeySpec::Generate(key_type) => (purpose.to_string(), key_type.clone()),
                KeySpec::Existing(_) => panic!("should request generation"),
            })
            .collect::<Vec<_>>();
        entries.sort();
        assert_eq!(
            entries,
            vec![
                ("authentication".to_string(), SIGNATURE_KEY_TYPE.to_string()),
                ("keyAgreement".to_string(), KEY_AGREEMENT_KEY_TYPE.to_string()),
            ]
        );
    }

    #[test]
    fn default_key_map() {
        let key_map = KeyMap::<TestKey>::defaults();
        assert_eq!(key_map.len(), KeyPurpose::ALL.len());
        for (purpose, spec) in key_map.iter() {
            let KeySpec::Generate(key_type) = spec else {
                panic!("defaults should request generation");
            };
            let expected = if purpose == "keyAgreement" {
                KEY_AGREEMENT_KEY_TYPE
            } else {
                SIGNATURE_KEY_TYPE
            };
            assert_eq!(key_type, expected);
        }
    }
}
