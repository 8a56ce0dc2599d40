//! In-memory key provider for `did:web` documents.
//!
//! Keys are generated on request and handed straight back to the caller: the [`Keyring`] holds
//! no state, so storing the returned key pairs in a key management system is up to the caller.

mod ed25519;
mod keyring;
mod x25519;

use std::fmt::{self, Display};
use std::str::FromStr;

use did_core::error::{Err, Error};
use did_core::{tracerr, VerificationMethod};
use multibase::Base;

pub use crate::keyring::Keyring;

/// Verification method types the keyring can generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Ed25519 signature key, used for authentication, assertion and capabilities.
    Ed25519VerificationKey2020,

    /// X25519 Diffie-Hellman key, used for key agreement.
    X25519KeyAgreementKey2020,
}

impl KeyType {
    // Multicodec prefixes for the public and private key material.
    const fn codecs(self) -> ([u8; 2], [u8; 2]) {
        match self {
            Self::Ed25519VerificationKey2020 => (ed25519::PUBLIC_CODEC, ed25519::PRIVATE_CODEC),
            Self::X25519KeyAgreementKey2020 => (x25519::PUBLIC_CODEC, x25519::PRIVATE_CODEC),
        }
    }

    fn public_from_secret(self, secret: &[u8; 32]) -> [u8; 32] {
        match self {
            Self::Ed25519VerificationKey2020 => ed25519::public_key(secret),
            Self::X25519KeyAgreementKey2020 => x25519::public_key(secret),
        }
    }
}

impl Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ed25519VerificationKey2020 => write!(f, "Ed25519VerificationKey2020"),
            Self::X25519KeyAgreementKey2020 => write!(f, "X25519KeyAgreementKey2020"),
        }
    }
}

impl FromStr for KeyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ed25519VerificationKey2020" => Ok(Self::Ed25519VerificationKey2020),
            "X25519KeyAgreementKey2020" => Ok(Self::X25519KeyAgreementKey2020),
            _ => tracerr!(Err::UnsupportedAlgorithm, "Unsupported key type: \"{}\"", s),
        }
    }
}

/// A key pair bound to a DID controller.
///
/// The key ID is `<controller>#<fingerprint>`, where the fingerprint is the multibase
/// (base58btc) encoding of the multicodec-prefixed public key.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    id: String,
    controller: String,
    key_type: KeyType,
    public_key: [u8; 32],
    secret_key: Option<[u8; 32]>,
}

impl KeyPair {
    /// Build a key pair from existing secret key bytes. The public key is derived from the
    /// secret.
    #[must_use]
    pub fn from_secret(key_type: KeyType, controller: &str, secret_key: [u8; 32]) -> Self {
        let public_key = key_type.public_from_secret(&secret_key);
        let mut kp = Self::from_public(key_type, controller, public_key);
        kp.secret_key = Some(secret_key);
        kp
    }

    /// Build a public-only key pair, for example to publish a key held elsewhere.
    #[must_use]
    pub fn from_public(key_type: KeyType, controller: &str, public_key: [u8; 32]) -> Self {
        let mut kp = Self {
            id: String::new(),
            controller: controller.to_string(),
            key_type,
            public_key,
            secret_key: None,
        };
        kp.id = format!("{controller}#{}", kp.fingerprint());
        kp
    }

    /// Multibase-encoded public key, prefixed with the key type's multicodec.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let (codec, _) = self.key_type.codecs();
        multibase::encode(Base::Base58Btc, [codec.as_slice(), &self.public_key].concat())
    }

    /// Raw public key bytes.
    #[must_use]
    pub const fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    /// Verification method type of this key.
    #[must_use]
    pub const fn kind(&self) -> KeyType {
        self.key_type
    }

    fn private_key_multibase(&self) -> Option<String> {
        let (_, codec) = self.key_type.codecs();
        self.secret_key
            .map(|sk| multibase::encode(Base::Base58Btc, [codec.as_slice(), &sk].concat()))
    }
}

// Secret key material is never printed.
impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("id", &self.id)
            .field("controller", &self.controller)
            .field("key_type", &self.key_type)
            .field("public_key", &self.fingerprint())
            .field("secret_key", &self.secret_key.map(|_| "[redacted]"))
            .finish()
    }
}

impl did_core::KeyPair for KeyPair {
    fn id(&self) -> &str {
        &self.id
    }

    fn controller(&self) -> &str {
        &self.controller
    }

    fn key_type(&self) -> &str {
        match self.key_type {
            KeyType::Ed25519VerificationKey2020 => "Ed25519VerificationKey2020",
            KeyType::X25519KeyAgreementKey2020 => "X25519KeyAgreementKey2020",
        }
    }

    fn export(&self, public_only: bool) -> VerificationMethod {
        VerificationMethod {
            id: self.id.clone(),
            type_: self.key_type.to_string(),
            controller: self.controller.clone(),
            public_key_multibase: Some(self.fingerprint()),
            private_key_multibase: if public_only { None } else { self.private_key_multibase() },
        }
    }
}
