//! Verification methods allow public keys to be associated with a DID.

use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Err, Error};
use crate::tracerr;

/// A DID document can express verification methods, such as cryptographic public keys, which can be
/// used to authenticate or authorize interactions with the DID subject or associated parties.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationMethod {
    /// Identifier for the verification method. The value must be a string that conforms to DID URL
    /// Syntax, typically `<did>#<fingerprint>`.
    pub id: String,
    /// The type of verification method. One that is registered in a DID specification registry.
    /// <https://www.w3.org/TR/did-spec-registries/>
    #[serde(rename = "type")]
    pub type_: String,
    /// Identifier for the controller of the verification method. A DID.
    pub controller: String,
    /// The public key material of the verification method, multibase encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,
    /// Private key material, multibase encoded. Only present on a full (non-public) key export
    /// and never written into a DID document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_multibase: Option<String>,
}

/// Verification relationship (key purpose). The set is closed: a key can only be bound to a DID
/// document under one of these names.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyPurpose {
    #[default]
    /// The authentication verification relationship is used to specify how the DID subject is
    /// expected to be authenticated, for purposes such as logging into a website or engaging in
    /// any sort of challenge-response protocol.
    Authentication,
    /// The assertionMethod verification relationship is used to specify how the DID subject is
    /// expected to express claims, such as for the purposes of issuing a Verifiable Credential
    AssertionMethod,
    /// The keyAgreement verification relationship is used to specify how an entity can generate
    /// encryption material in order to transmit confidential information intended for the DID
    /// subject, such as for the purposes of establishing a secure communication channel with the
    /// recipient.
    KeyAgreement,
    /// The capabilityInvocation verification relationship is used to specify a verification method
    /// that might be used by the DID subject to invoke a cryptographic capability, such as the
    /// authorization to update the DID Document.
    CapabilityInvocation,
    /// The capabilityDelegation verification relationship is used to specify a mechanism that might
    /// be used by the DID subject to delegate a cryptographic capability to another party, such as
    /// delegating the authority to access a specific HTTP API to a subordinate.
    CapabilityDelegation,
}

impl KeyPurpose {
    /// Every supported verification relationship.
    pub const ALL: [Self; 5] = [
        Self::Authentication,
        Self::AssertionMethod,
        Self::KeyAgreement,
        Self::CapabilityInvocation,
        Self::CapabilityDelegation,
    ];
}

impl Display for KeyPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::AssertionMethod => write!(f, "assertionMethod"),
            Self::KeyAgreement => write!(f, "keyAgreement"),
            Self::CapabilityInvocation => write!(f, "capabilityInvocation"),
            Self::CapabilityDelegation => write!(f, "capabilityDelegation"),
        }
    }
}

/// Parse a purpose by its wire name. Anything outside the closed set is a configuration error.
impl FromStr for KeyPurpose {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authentication" => Ok(Self::Authentication),
            "assertionMethod" => Ok(Self::AssertionMethod),
            "keyAgreement" => Ok(Self::KeyAgreement),
            "capabilityInvocation" => Ok(Self::CapabilityInvocation),
            "capabilityDelegation" => Ok(Self::CapabilityDelegation),
            _ => tracerr!(Err::InvalidConfig, "Unsupported key purpose: \"{}\"", s),
        }
    }
}

/// A reference to a verification method or an embedded verification method object, as used by the
/// "authentication" and other similar fields in a [`crate::DidDocument`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VmRelationship {
    /// Key identifier referring to a verification method elsewhere in the DID document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// Embedded verification method object in the case where the verification method is not
    /// referred to by key identifier.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<VerificationMethod>,
}

impl VmRelationship {
    /// The ID of the verification method this relationship points at, whether referenced or
    /// embedded.
    #[must_use]
    pub fn method_id(&self) -> Option<&str> {
        self.key_id
            .as_deref()
            .or_else(|| self.verification_method.as_ref().map(|vm| vm.id.as_str()))
    }
}

/// Deserialise a verification method relationship in the case it is a string - the ID of a
/// verification method specified elsewhere in the DID document.
impl FromStr for VmRelationship {
    type Err = Infallible;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            key_id: Some(id.to_string()),
            verification_method: None,
        })
    }
}

impl PartialEq for VmRelationship {
    fn eq(&self, other: &Self) -> bool {
        if self.key_id.is_some() && other.key_id.is_some() {
            return self.key_id == other.key_id;
        }
        if let (Some(me), Some(them)) = (&self.verification_method, &other.verification_method) {
            return me == them;
        }
        false
    }
}
impl Eq for VmRelationship {}

/// Embed a verification method in a relationship.
impl From<VerificationMethod> for VmRelationship {
    fn from(vm: VerificationMethod) -> Self {
        Self {
            key_id: None,
            verification_method: Some(vm),
        }
    }
}

/// Serialize a verification method relationship to a string or object. If the `key_id` field is
/// set, serialize to a string, otherwise serialize to an embedded verification method.
impl Serialize for VmRelationship {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match (&self.key_id, &self.verification_method) {
            (Some(id), None) => serializer.serialize_str(id),
            (None, Some(vm)) => vm.serialize(serializer),
            _ => Err(serde::ser::Error::custom(
                "Verification method reference must be a string or object",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_names() {
        for purpose in KeyPurpose::ALL {
            let parsed: KeyPurpose = purpose.to_string().parse().expect("should parse");
            assert_eq!(parsed, purpose);

            let json = serde_json::to_value(purpose).expect("should serialize");
            assert_eq!(json, serde_json::Value::String(purpose.to_string()));
        }
    }

    #[test]
    fn unsupported_purpose() {
        let err = "signing".parse::<KeyPurpose>().expect_err("should fail");
        assert!(err.is(Err::InvalidConfig));
        assert_eq!(err.to_string(), "Unsupported key purpose: \"signing\"");
    }

    #[test]
    fn relationship_method_id() {
        let by_ref: VmRelationship = "did:web:example.com#key-0".parse().expect("infallible");
        assert_eq!(by_ref.method_id(), Some("did:web:example.com#key-0"));

        let embedded = VmRelationship::from(VerificationMethod {
            id: "did:web:example.com#key-1".to_string(),
            ..VerificationMethod::default()
        });
        assert_eq!(embedded.method_id(), Some("did:web:example.com#key-1"));
        assert_eq!(VmRelationship::default().method_id(), None);
    }

    #[test]
    fn private_key_not_serialized_when_absent() {
        let vm = VerificationMethod {
            id: "did:web:example.com#z6Mk".to_string(),
            type_: "Ed25519VerificationKey2020".to_string(),
            controller: "did:web:example.com".to_string(),
            public_key_multibase: Some("z6Mk".to_string()),
            private_key_multibase: None,
        };
        let json = serde_json::to_value(VmRelationship::from(vm)).expect("should serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "id": "did:web:example.com#z6Mk",
                "type": "Ed25519VerificationKey2020",
                "controller": "did:web:example.com",
                "publicKeyMultibase": "z6Mk"
            })
        );
    }
}
