//! Serde helpers for DID document fields.

pub(crate) mod option_flexvec;
