//! Default HTTP transport built on `reqwest`.

use std::time::Duration;

use did_core::{Result, TransportError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use serde_json::Value;

use crate::provider::{Fetch, FetchResponse};

const ACCEPT_DID: &str = "application/did+json, application/json";

/// Options for [`HttpClient`] requests.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpOptions {
    /// Accept TLS certificates that cannot be verified, such as self-signed certificates on a
    /// development server.
    pub accept_invalid_certs: bool,

    /// Request timeout. No timeout when unset.
    pub timeout: Option<Duration>,
}

/// [`Fetch`] implementation using `reqwest`.
///
/// The client is built once and shared by every request. A request that accepts invalid
/// certificates gets a client of its own.
#[derive(Clone, Debug)]
pub struct HttpClient {
    http_client: reqwest::Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the underlying client (TLS backend) cannot be initialized.
    pub fn new() -> Result<Self> {
        let http_client = build_client(false).map_err(request_error)?;
        Ok(Self { http_client })
    }
}

fn build_client(accept_invalid_certs: bool) -> reqwest::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_DID));

    reqwest::Client::builder()
        .default_headers(headers)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
}

impl Fetch for HttpClient {
    type Options = HttpOptions;

    async fn fetch(
        &self, url: &str, options: &HttpOptions,
    ) -> Result<FetchResponse, TransportError> {
        let insecure_client;
        let http_client = if options.accept_invalid_certs {
            insecure_client = build_client(true).map_err(request_error)?;
            &insecure_client
        } else {
            &self.http_client
        };

        let mut request = http_client.get(url);
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!(url, "fetching DID document");
        let res = request.send().await.map_err(request_error)?;

        let status = res.status();
        if !status.is_success() {
            // the body is best effort: servers don't always return JSON errors
            let data = res.json::<Value>().await.ok();
            return Err(TransportError {
                status: Some(status.as_u16()),
                data,
                message: status.canonical_reason().unwrap_or("request failed").to_string(),
            });
        }

        let data = res.json::<Value>().await.map_err(|e| TransportError {
            status: Some(status.as_u16()),
            data: None,
            message: format!("invalid response body: {e}"),
        })?;

        Ok(FetchResponse {
            status: status.as_u16(),
            data,
        })
    }
}

fn request_error(e: reqwest::Error) -> TransportError {
    TransportError {
        status: e.status().map(|s| s.as_u16()),
        data: None,
        message: e.to_string(),
    }
}
