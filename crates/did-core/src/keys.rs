//! Key capabilities. A DID method builds documents from key pairs it does not own: keys are
//! generated by a [`KeyProvider`] and handed back to the caller for storage in a key management
//! system.

use std::future::Future;

use crate::document::verification_method::VerificationMethod;
use crate::Result;

/// A public/private key pair bound to a controller.
///
/// Implementations hold whatever key material they need. DID documents only ever see the
/// verification method produced by [`KeyPair::export`].
pub trait KeyPair: Send + Sync {
    /// Identifier of the key, used as the verification method ID. For DID-bound keys this is a
    /// DID URL of the form `<controller>#<fragment>`.
    fn id(&self) -> &str;

    /// The DID controlling the key.
    fn controller(&self) -> &str;

    /// Verification method type, for example `Ed25519VerificationKey2020`.
    fn key_type(&self) -> &str;

    /// Export the key as a verification method descriptor. With `public_only` set, private key
    /// material is left out; this is the form published in DID documents.
    fn export(&self, public_only: bool) -> VerificationMethod;
}

/// Key generation provider. The `self` reference allows for configuration information such as
/// key store location and credentials.
pub trait KeyProvider: Send + Sync {
    /// The key pair type produced by this provider.
    type KeyPair: KeyPair;

    /// Generate a new key pair of the requested type, controlled by `controller`.
    ///
    /// # Errors
    ///
    /// Implementations should return `Err::UnsupportedAlgorithm` for key types they cannot
    /// generate.
    fn generate(
        &self, key_type: &str, controller: &str,
    ) -> impl Future<Output = Result<Self::KeyPair>> + Send;
}
