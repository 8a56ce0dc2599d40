//! DID Document and its component data structures.

use serde::{Deserialize, Serialize};

use crate::document::context::{context_serialization, Context};
use crate::document::verification_method::{KeyPurpose, VerificationMethod, VmRelationship};
use crate::error::Err;
use crate::serde::option_flexvec;
use crate::{tracerr, Result};

pub mod context;
pub mod verification_method;

// ----------------------------------------------------------------------------
// DID Document
// ----------------------------------------------------------------------------

/// A DID is associated with a DID document that can be serialized into a representation of the DID.
/// <https://www.w3.org/TR/did-core/>
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DidDocument {
    /// The JSON-LD Context is either a string or a list containing any combination of strings
    /// and/or ordered maps.
    #[serde(rename = "@context", with = "context_serialization")]
    pub context: Vec<Context>,
    /// The DID document's unique identifier. The syntax conforms to that of the DID method
    /// implementation: "did:{method}:{method-specific-id}". An empty ID means the document has not
    /// been bound to a DID yet.
    pub id: String,
    /// A DID controller is an entity that is authorized to make changes to a DID document. A single
    /// DID or a list of DIDs.
    #[serde(skip_serializing_if = "Option::is_none", with = "option_flexvec")]
    pub controller: Option<Vec<String>>,
    /// Other identifiers for the subject of the DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub also_known_as: Option<Vec<String>>,
    /// Verification methods that relationships can refer to by ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<Vec<VerificationMethod>>,
    /// Authentication methods. Specifies how the DID subject is authenticated for purposes such as
    /// logging into a website or engaging in challenge-response interactions.
    #[serde(skip_serializing_if = "Option::is_none", with = "option_flexvec")]
    pub authentication: Option<Vec<VmRelationship>>,
    /// Assertion methods. Specifies how the DID subject is expected to express claims such as for
    /// the purposes of issuing verifiable credentials.
    #[serde(skip_serializing_if = "Option::is_none", with = "option_flexvec")]
    pub assertion_method: Option<Vec<VmRelationship>>,
    /// Key agreement methods. Specifies how an entity can generate encryption material to transmit
    /// confidential messages to the DID subject.
    #[serde(skip_serializing_if = "Option::is_none", with = "option_flexvec")]
    pub key_agreement: Option<Vec<VmRelationship>>,
    /// Capability invocation methods. Specifies how the DID subject can invoke a cryptographic
    /// capability, such as to authorize an update to the DID document.
    #[serde(skip_serializing_if = "Option::is_none", with = "option_flexvec")]
    pub capability_invocation: Option<Vec<VmRelationship>>,
    /// Capability delegation methods. Specifies how the DID subject can delegate a cryptographic
    /// capability to another party.
    #[serde(skip_serializing_if = "Option::is_none", with = "option_flexvec")]
    pub capability_delegation: Option<Vec<VmRelationship>>,
}

/// Utility methods for looking up and setting DID document components.
impl DidDocument {
    /// The relationships recorded for a verification purpose, if any.
    #[must_use]
    pub fn purpose(&self, purpose: KeyPurpose) -> Option<&[VmRelationship]> {
        let field = match purpose {
            KeyPurpose::Authentication => &self.authentication,
            KeyPurpose::AssertionMethod => &self.assertion_method,
            KeyPurpose::KeyAgreement => &self.key_agreement,
            KeyPurpose::CapabilityInvocation => &self.capability_invocation,
            KeyPurpose::CapabilityDelegation => &self.capability_delegation,
        };
        field.as_deref()
    }

    /// Replace the relationships for a verification purpose.
    pub fn set_purpose(&mut self, purpose: KeyPurpose, relationships: Vec<VmRelationship>) {
        let field = match purpose {
            KeyPurpose::Authentication => &mut self.authentication,
            KeyPurpose::AssertionMethod => &mut self.assertion_method,
            KeyPurpose::KeyAgreement => &mut self.key_agreement,
            KeyPurpose::CapabilityInvocation => &mut self.capability_invocation,
            KeyPurpose::CapabilityDelegation => &mut self.capability_delegation,
        };
        *field = Some(relationships);
    }

    /// The purposes that have at least one relationship set, in [`KeyPurpose::ALL`] order.
    #[must_use]
    pub fn purposes(&self) -> Vec<KeyPurpose> {
        KeyPurpose::ALL
            .into_iter()
            .filter(|p| self.purpose(*p).is_some_and(|r| !r.is_empty()))
            .collect()
    }

    // Get a verfication method from a verification method reference, either by looking up the ID
    // or returning the embedded verification method. If the ref contains an ID that doesn't resolve
    // or an embedded verification method doesn't exist, None is returned.
    fn vm_from_ref(&self, vm_ref: &VmRelationship) -> Option<VerificationMethod> {
        if let Some(id) = &vm_ref.key_id {
            return self.verification_method.as_ref()?.iter().find(|vm| &vm.id == id).cloned();
        }
        vm_ref.verification_method.clone()
    }

    /// Get the first verification method for a purpose.
    ///
    /// # Errors
    ///
    /// * `Err::KeyNotFound` - no relationship for the purpose resolves to a verification method.
    pub fn get_key(&self, purpose: KeyPurpose) -> Result<VerificationMethod> {
        let vm = self
            .purpose(purpose)
            .and_then(|rels| rels.iter().find_map(|r| self.vm_from_ref(r)));

        match vm {
            Some(v) => Ok(v),
            None => tracerr!(Err::KeyNotFound, "No key found for purpose {}", purpose),
        }
    }
}
