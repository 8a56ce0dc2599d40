//! Conversion between HTTPS URLs and `did:web` DIDs.
//!
//! The mapping is bijective: the host (with any non-default port) becomes the first
//! method-specific component and each path segment becomes a further colon-separated component.
//! Every component is percent-encoded independently, so a `:` inside a component can never be
//! confused with a separator.

use std::borrow::Cow;

use did_core::error::Err;
use did_core::{tracerr, Result};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Prefix shared by every `did:web` DID.
pub const DID_WEB_PREFIX: &str = "did:web:";

/// Path of the DID document when the DID has no path components.
pub const DEFAULT_PATH: &str = "/.well-known/did.json";

// Everything except A-Z a-z 0-9 - _ . ! ~ * ' ( ) is percent-encoded.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// Characters that may not appear in a decoded host or path segment.
const HOST_DELIMITERS: &[char] = &['@', '/', '\\', '?', '#'];
const SEGMENT_DELIMITERS: &[char] = &['/', '\\', '?', '#'];

/// Construct a `did:web` DID from an HTTPS URL.
///
/// An empty path, `/` and `/.well-known/did.json` all denote the default document location and
/// produce the bare `did:web:<host>` form. Otherwise every path segment after the leading `/`
/// becomes a component, empty segments included, so `https://example.com/a/` maps to
/// `did:web:example.com:a:`.
///
/// Valid examples:
/// - `https://example.com` -> `did:web:example.com`
/// - `https://example.com/user/alice` -> `did:web:example.com:user:alice`
/// - `https://example.com:8443` -> `did:web:example.com%3A8443`
///
/// # Errors
///
/// Returns `Err::InvalidFormat` if the URL is empty, cannot be parsed, has no host or does not
/// use the `https` scheme.
pub fn did_from_url(url: &str) -> Result<String> {
    if url.is_empty() {
        tracerr!(Err::InvalidFormat, "Cannot convert url to did, missing url.");
    }
    let Ok(parsed) = Url::parse(url) else {
        tracerr!(Err::InvalidFormat, "Invalid url: \"{}\".", url);
    };
    if parsed.scheme() != "https" {
        tracerr!(Err::InvalidFormat, "did:web does not support non-HTTPS URLs: \"{}\".", url);
    }
    let Some(host) = parsed.host_str() else {
        tracerr!(Err::InvalidFormat, "No host in url: \"{}\".", url);
    };

    // `port` is `None` for the scheme's default port
    let authority = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    let mut did = format!("{DID_WEB_PREFIX}{}", encode(&authority));

    let path = parsed.path();
    if !(path.is_empty() || path == "/" || path == DEFAULT_PATH) {
        for segment in path.split('/').skip(1) {
            did.push(':');
            did.push_str(&encode(segment));
        }
    }

    Ok(did)
}

/// Construct the HTTPS URL of the DID document for a `did:web` DID.
///
/// A DID without path components resolves to `https://<host>/.well-known/did.json`. Otherwise
/// the decoded components are joined with `/` to form the path.
///
/// # Errors
///
/// Returns `Err::InvalidFormat` if the DID is empty, has an empty host, contains a malformed
/// percent-encoding, decodes to a component holding a URL delimiter (`@`, `/`, `\`, `?`, `#`)
/// or does not decode to a valid URL. Returns `Err::UnsupportedMethod` if the
/// DID does not start with `did:web:`.
pub fn url_from_did(did: &str) -> Result<String> {
    if did.is_empty() {
        tracerr!(Err::InvalidFormat, "Cannot convert did to url, missing did.");
    }
    let Some(method_id) = did.strip_prefix(DID_WEB_PREFIX) else {
        tracerr!(Err::UnsupportedMethod, "DID Method not supported: \"{}\".", did);
    };

    let mut components = method_id.split(':');
    let host = decode(components.next().unwrap_or_default())?;
    if host.is_empty() {
        tracerr!(Err::InvalidFormat, "No host in did: \"{}\".", did);
    }
    // a decoded delimiter would move the document to another host or path
    if host.contains(HOST_DELIMITERS) {
        tracerr!(Err::InvalidFormat, "Invalid host in did: \"{}\".", did);
    }

    let segments = components.map(decode).collect::<Result<Vec<_>>>()?;
    if segments.iter().any(|s| s.contains(SEGMENT_DELIMITERS)) {
        tracerr!(Err::InvalidFormat, "Invalid path in did: \"{}\".", did);
    }
    let path = if segments.is_empty() {
        DEFAULT_PATH.to_string()
    } else {
        format!("/{}", segments.join("/"))
    };

    let url = format!("https://{host}{path}");
    let Ok(parsed) = Url::parse(&url) else {
        tracerr!(Err::InvalidFormat, "DID does not map to a valid url: \"{}\".", did);
    };
    if !parsed.username().is_empty()
        || parsed.password().is_some()
        || parsed.query().is_some()
        || parsed.fragment().is_some()
    {
        tracerr!(Err::InvalidFormat, "DID does not map to a valid url: \"{}\".", did);
    }
    Ok(url)
}

fn encode(component: &str) -> String {
    utf8_percent_encode(component, COMPONENT).to_string()
}

fn decode(component: &str) -> Result<Cow<'_, str>> {
    // a lone '%' or one followed by non-hex digits can never come out of `encode`
    let bytes = component.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
        {
            tracerr!(Err::InvalidFormat, "Malformed percent-encoding in \"{}\".", component);
        }
    }

    match percent_decode_str(component).decode_utf8() {
        Ok(decoded) => Ok(decoded),
        Err(e) => tracerr!(Err::InvalidFormat, "Component \"{}\" is not UTF-8: {}", component, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_location() {
        for url in [
            "https://example.com",
            "https://example.com/",
            "https://example.com/.well-known/did.json",
        ] {
            assert_eq!(did_from_url(url).expect("should convert"), "did:web:example.com");
        }
        assert_eq!(
            url_from_did("did:web:example.com").expect("should convert"),
            "https://example.com/.well-known/did.json"
        );
    }

    #[test]
    fn path_segments() {
        let did = did_from_url("https://example.com/a/b").expect("should convert");
        assert_eq!(did, "did:web:example.com:a:b");
        assert_eq!(url_from_did(&did).expect("should convert"), "https://example.com/a/b");
    }

    #[test]
    fn port_is_encoded() {
        let did = did_from_url("https://localhost:8443/issuers/1").expect("should convert");
        assert_eq!(did, "did:web:localhost%3A8443:issuers:1");
        assert_eq!(url_from_did(&did).expect("should convert"), "https://localhost:8443/issuers/1");

        // the default port is dropped by URL parsing
        let did = did_from_url("https://example.com:443").expect("should convert");
        assert_eq!(did, "did:web:example.com");
    }

    #[test]
    fn trailing_slash_round_trips() {
        let did = did_from_url("https://example.com/a/").expect("should convert");
        assert_eq!(did, "did:web:example.com:a:");
        assert_eq!(url_from_did(&did).expect("should convert"), "https://example.com/a/");
    }

    #[test]
    fn escaped_path_round_trips() {
        let did = did_from_url("https://example.com/my%20docs/x:y").expect("should convert");
        assert_eq!(did, "did:web:example.com:my%2520docs:x%3Ay");
        assert_eq!(
            url_from_did(&did).expect("should convert"),
            "https://example.com/my%20docs/x:y"
        );
    }

    #[test]
    fn ipv6_host_round_trips() {
        let did = did_from_url("https://[::1]:8080/doc").expect("should convert");
        assert_eq!(did, "did:web:%5B%3A%3A1%5D%3A8080:doc");
        assert_eq!(url_from_did(&did).expect("should convert"), "https://[::1]:8080/doc");
    }

    #[test]
    fn query_and_fragment_ignored() {
        let did = did_from_url("https://example.com/a?x=1#frag").expect("should convert");
        assert_eq!(did, "did:web:example.com:a");
    }

    #[test]
    fn reject_bad_urls() {
        for url in ["", "not a url", "http://example.com", "http://example.com/a", "ftp://example.com"]
        {
            let err = did_from_url(url).expect_err("should fail");
            assert!(err.is(Err::InvalidFormat), "{url}: {err}");
        }
    }

    #[test]
    fn reject_bad_dids() {
        let err = url_from_did("did:key:abc").expect_err("should fail");
        assert!(err.is(Err::UnsupportedMethod));
        assert_eq!(err.to_string(), "DID Method not supported: \"did:key:abc\".");

        let err = url_from_did("did:webvh:example.com").expect_err("should fail");
        assert!(err.is(Err::UnsupportedMethod));

        for did in ["", "did:web:", "did:web::a", "did:web:example.com:%zz", "did:web:example.com:%e9"]
        {
            let err = url_from_did(did).expect_err("should fail");
            assert!(err.is(Err::InvalidFormat), "{did}: {err}");
        }
    }

    // Decoded delimiters must not move the document to another host or out of the path.
    #[test]
    fn reject_delimiters() {
        for did in [
            "did:web:example.com%40evil.com",
            "did:web:user%3Apass%40evil.com",
            "did:web:example.com%2Fevil",
            "did:web:evil.com%2F%40example.com",
            "did:web:example.com%5Cevil.com",
            "did:web:example.com%3Fq=1",
            "did:web:example.com%23frag",
            "did:web:example.com:a%3Fq=1",
            "did:web:example.com:a%23frag",
            "did:web:example.com:a%2Fb",
            "did:web:example.com:a%5Cb",
        ] {
            let err = url_from_did(did).expect_err("should fail");
            assert!(err.is(Err::InvalidFormat), "{did}: {err}");
        }
    }

    #[test]
    fn resolved_url_names_did_host() {
        for did in [
            "did:web:example.com",
            "did:web:localhost%3A8443:issuers:1",
            "did:web:example.com:my%2520docs:x%3Ay",
        ] {
            let url = url_from_did(did).expect("should convert");
            let parsed = Url::parse(&url).expect("should parse");
            assert!(parsed.username().is_empty());
            assert!(parsed.query().is_none());
            assert_eq!(did_from_url(&url).expect("should convert back"), did);
        }
    }
}
