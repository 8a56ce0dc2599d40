use did_core::{KeyProvider, Result};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::{KeyPair, KeyType};

/// Ephemeral key provider. Every call to `generate` creates fresh key material from the operating
/// system's random number generator; nothing is retained.
#[derive(Clone, Copy, Debug, Default)]
pub struct Keyring;

impl Keyring {
    /// Create a new `Keyring` instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl KeyProvider for Keyring {
    type KeyPair = KeyPair;

    async fn generate(&self, key_type: &str, controller: &str) -> Result<KeyPair> {
        let key_type: KeyType = key_type.parse()?;

        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);

        let kp = KeyPair::from_secret(key_type, controller, secret);
        tracing::debug!(key_id = %kp.id, %key_type, "generated key pair");
        Ok(kp)
    }
}

#[cfg(test)]
mod tests {
    use did_core::error::Err;
    use did_core::KeyPair as _;

    use super::*;

    #[tokio::test]
    async fn generate_keys() {
        let keyring = Keyring::new();
        let controller = "did:web:example.com";

        let signing = keyring
            .generate("Ed25519VerificationKey2020", controller)
            .await
            .expect("should generate signing key");
        assert_eq!(signing.controller(), controller);
        assert!(signing.id().starts_with("did:web:example.com#z6Mk"));

        let agreement = keyring
            .generate("X25519KeyAgreementKey2020", controller)
            .await
            .expect("should generate agreement key");
        assert!(agreement.id().starts_with("did:web:example.com#z6LS"));

        let again = keyring
            .generate("Ed25519VerificationKey2020", controller)
            .await
            .expect("should generate signing key");
        assert_ne!(signing.id(), again.id());
    }

    #[tokio::test]
    async fn unsupported_type() {
        let Err(e) = Keyring::new().generate("RsaVerificationKey2018", "did:web:example.com").await
        else {
            panic!("expected error");
        };
        assert!(e.is(Err::UnsupportedAlgorithm));
    }
}
