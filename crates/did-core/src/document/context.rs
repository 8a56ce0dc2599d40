//! Context is a JSON-LD context that describes a DID Document schema.

use std::collections::HashMap;
use std::convert::Infallible;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};

/// The default context for a DID document. <https://www.w3.org/TR/did-core/#context>
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// Context for documents publishing `Ed25519VerificationKey2020` verification methods.
pub const ED25519_2020_CONTEXT: &str = "https://w3id.org/security/suites/ed25519-2020/v1";

/// Context for documents publishing `X25519KeyAgreementKey2020` verification methods.
pub const X25519_2020_CONTEXT: &str = "https://w3id.org/security/suites/x25519-2020/v1";

/// The JSON-LD Context is either a string or a list containing any combination of strings and/or
/// ordered maps. Contexts are carried as opaque values: they are never fetched or interpreted.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Context {
    /// A single JSON-LD term.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// A map of JSON-LD terms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_map: Option<HashMap<String, String>>,
}

impl Context {
    /// Create a context from a single URL term.
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            url_map: None,
        }
    }
}

/// `FromStr` implementation for `Context`. Needed for deserializer.
impl FromStr for Context {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::url(s))
    }
}

/// Serialize a context to a string or map. If only the `url` field is set, serialize to a string,
/// otherwise serialize to a map.
impl Serialize for Context {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match (&self.url, &self.url_map) {
            (Some(u), None) => serializer.serialize_str(u),
            (None, Some(map)) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
            _ => Err(serde::ser::Error::custom("Context must be a string or map")),
        }
    }
}

/// `@context` is always written as a list. A single string is accepted when reading.
pub(crate) mod context_serialization {
    use std::collections::HashMap;
    use std::fmt;
    use std::marker::PhantomData;
    use std::str::FromStr;

    use serde::de::{self, SeqAccess, Visitor};
    use serde::ser::{SerializeSeq, Serializer};

    use super::Context;

    pub(crate) fn serialize<S>(value: &[Context], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(value.len()))?;
        for e in value {
            seq.serialize_element(e)?;
        }
        seq.end()
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Context>, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct StringOrMap<T>(PhantomData<fn() -> Vec<T>>);

        impl<'de> Visitor<'de> for StringOrMap<Vec<Context>> {
            type Value = Vec<Context>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("Context as a single string or a set of strings and/or maps")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                match Context::from_str(value) {
                    Ok(res) => Ok(vec![res]),
                    Err(_) => Err(de::Error::invalid_type(de::Unexpected::Str(value), &self)),
                }
            }

            // could be mixed array of strings and objects
            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut deser: Vec<Context> = Vec::new();
                while let Some(curr) = seq.next_element::<serde_json::Value>()? {
                    match curr {
                        serde_json::Value::String(s) => deser.push(Context::url(s)),
                        serde_json::Value::Object(o) => {
                            let Ok(res) = serde_json::from_value::<HashMap<String, String>>(
                                serde_json::Value::Object(o),
                            ) else {
                                return Err(de::Error::invalid_type(de::Unexpected::Map, &self));
                            };
                            deser.push(Context {
                                url: None,
                                url_map: Some(res),
                            });
                        }
                        _ => {
                            return Err(de::Error::custom(
                                "invalid type: cannot deserialize array element",
                            ));
                        }
                    }
                }
                Ok(deser)
            }
        }

        deserializer.deserialize_any(StringOrMap(PhantomData))
    }
}
