//! # DID Core Errors
//!
//! This module defines the error types used by the DID Core library, including for traits that
//! may be implemented in other crates.
//!
//! Errors fall into three families. Format errors (`Err::InvalidFormat`,
//! `Err::UnsupportedMethod`) are raised for malformed URLs and identifiers. Configuration errors
//! (`Err::InvalidConfig`) are raised when a call is missing something it needs to proceed.
//! Transport errors ([`TransportError`]) come from the HTTP transport and are carried through
//! untouched.

use std::fmt::Display;

use thiserror::Error;

/// Simplify creation of errors with tracing.
///
/// # Example
/// ```
/// use did_core::error::Err;
/// use did_core::{tracerr, Result};
///
/// fn with_msg() -> Result<()> {
///     tracerr!(Err::InvalidFormat, "message: {}", "some message")
/// }
///
/// fn no_msg() -> Result<()> {
///     tracerr!(Err::InvalidFormat)
/// }
/// ```
#[macro_export]
macro_rules! tracerr {
    // with context
    ($code:expr, $($msg:tt)*) => {
        {
        use $crate::error::Context as _;
        tracing::error!($($msg)*);
        return Err($code).context(format!($($msg)*));
        }
    };
    // no context
    ($code:expr) => {
        {
        tracing::error!("{}", $code);
        return Err($code.into());
        }
    }
}

/// Public error type for DID Core.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(#[from] anyhow::Error);

impl Error {
    /// Transfer the error to `OAuth2` compatible format.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.0.root_cause().to_string(),
            "error_description": self.to_string(),
        })
    }

    /// Returns true if `E` is the type held by this error object.
    #[must_use]
    pub fn is(&self, err: Err) -> bool {
        self.0.downcast_ref::<Err>().is_some_and(|e| e == &err)
    }

    /// The transport failure wrapped by this error, if the error originated in the HTTP
    /// transport. The status and server error body are exactly as the transport reported them.
    #[must_use]
    pub fn transport(&self) -> Option<&TransportError> {
        self.0.downcast_ref::<TransportError>()
    }
}

/// Typed errors for DID Core.
#[derive(Clone, Copy, Error, Debug, PartialEq, Eq)]
pub enum Err {
    /// Invalid format. A URL or DID is missing, cannot be parsed or uses a scheme the method
    /// does not support. (See context for details)
    #[error("invalid_format")]
    InvalidFormat,

    /// The DID does not belong to a DID method supported by the caller.
    #[error("unsupported_method")]
    UnsupportedMethod,

    /// Something the operation needs was not configured: a document without an ID, a missing key
    /// provider or an unsupported verification relationship in a key map.
    #[error("invalid_config")]
    InvalidConfig,

    /// Key not found. This is in response to looking up a verification method in a DID document
    /// for a purpose and not finding one, or finding one with no matching key pair.
    #[error("key_not_found")]
    KeyNotFound,

    /// A requested key type is not supported by the key provider.
    #[error("unsupported_algorithm")]
    UnsupportedAlgorithm,

    /// An error occurred trying to deserialize data.
    #[error("deserialization_error")]
    DeserializationError,
}

/// Failure reported by an HTTP transport.
///
/// `status` is the HTTP status code when a response was received and `data` the server's error
/// body when it could be parsed as JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportError {
    /// HTTP status code of the failed response, if any.
    pub status: Option<u16>,

    /// Error body returned by the server, if any.
    pub data: Option<serde_json::Value>,

    /// Human-readable description of the failure.
    pub message: String,
}

impl Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "http {status} error: {}", self.message),
            None => write!(f, "http error: {}", self.message),
        }
    }
}

impl std::error::Error for TransportError {}

/// Context is used to decorate errors with useful context information.
pub trait Context<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Adds context to the error.
    ///
    /// # Errors
    ///
    /// * Original error with context appended.
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static;
}

impl<T, E> Context<T, E> for core::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Ok(ok) => Ok(ok),
            Err(e) => Err(Error(anyhow::Error::from(e).context(context))),
        }
    }
}

impl From<Err> for Error {
    fn from(error: Err) -> Self {
        Self(error.into())
    }
}

impl From<TransportError> for Error {
    fn from(error: TransportError) -> Self {
        Self(error.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self(err.into())
    }
}
