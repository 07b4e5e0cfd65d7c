//! DID document resolution for the AT Protocol
//!
//! Only the DID → document direction is covered; handles are resolved by the
//! account host during login.
//!
//! ## Quick start
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use skyline_identity::{PublicResolver, resolver::IdentityResolver};
//!
//! let resolver = PublicResolver::default();
//! let doc = resolver.resolve_did_doc_owned("did:plc:ewvi7nxzyoun6zhxrhs64oiz").await?;
//! println!("{:?}", doc.pds_endpoint());
//! # Ok(())
//! # }
//! ```
//!
//! ## Sources
//!
//! - `did:plc:…` → `{plc_directory}/{did}` (default `https://plc.directory/`)
//! - `did:web:example.com` → `https://example.com/.well-known/did.json`
//! - `did:web:example.com:user:alice` → `https://example.com/user/alice/did.json`

#![warn(missing_docs)]
pub mod resolver;

use crate::resolver::{DidDocResponse, IdentityError, IdentityResolver, ResolverOptions};
use bytes::Bytes;
use http::header::ACCEPT;
use percent_encoding::percent_decode_str;
use skyline_common::error::TransportError;
use skyline_common::http_client::HttpClient;
use url::{ParseError, Url};

/// Default resolver implementation over any [`HttpClient`].
#[derive(Clone)]
pub struct SkylineResolver<C> {
    http: C,
    opts: ResolverOptions,
}

impl<C: HttpClient> SkylineResolver<C> {
    /// Create a new instance of the default resolver with all options
    pub fn new(http: C, opts: ResolverOptions) -> Self {
        #[cfg(feature = "tracing")]
        tracing::info!(
            plc_directory = %opts.plc_directory,
            validate_doc_id = opts.validate_doc_id,
            "SkylineResolver initialized",
        );
        Self { http, opts }
    }

    /// Set PLC directory base URL
    pub fn with_plc_directory(mut self, base: Url) -> Self {
        self.opts.plc_directory = base;
        self
    }

    /// Enable/disable doc id validation
    pub fn with_validate_doc_id(mut self, enable: bool) -> Self {
        self.opts.validate_doc_id = enable;
        self
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &C {
        &self.http
    }

    /// Construct the well-known HTTPS URL for a `did:web` DID.
    ///
    /// - `did:web:example.com` → `https://example.com/.well-known/did.json`
    /// - `did:web:example.com:user:alice` → `https://example.com/user/alice/did.json`
    fn did_web_url(&self, did: &str) -> resolver::Result<Url> {
        let rest = did
            .strip_prefix("did:web:")
            .ok_or_else(|| IdentityError::UnsupportedDidMethod(did.to_string()))?;
        let mut parts = rest.split(':');
        let host = parts
            .next()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| IdentityError::UnsupportedDidMethod(did.to_string()))?;
        // The host part may carry a percent-encoded port.
        let host = percent_decode_str(host).decode_utf8_lossy();
        let mut url = Url::parse(&format!("https://{host}/"))?;
        let path: Vec<&str> = parts.collect();
        if path.is_empty() {
            url.set_path(".well-known/did.json");
        } else {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| IdentityError::Url(ParseError::SetHostOnCannotBeABaseUrl))?;
            segments.pop_if_empty();
            for seg in path {
                let decoded = percent_decode_str(seg).decode_utf8_lossy();
                segments.push(&decoded);
            }
            segments.push("did.json");
        }
        Ok(url)
    }

    fn plc_url(&self, did: &str) -> resolver::Result<Url> {
        // join() would treat the colons in the DID as a scheme
        let base = self.opts.plc_directory.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{did}"))?)
    }

    async fn get_json_bytes(&self, url: Url) -> resolver::Result<(Bytes, http::StatusCode)> {
        let request = http::Request::get(url.as_str())
            .header(ACCEPT, "application/did+ld+json, application/json")
            .body(Vec::new())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let resp = self
            .http
            .send_http(request)
            .await
            .map_err(TransportError::from_client)?;
        let status = resp.status();
        Ok((Bytes::from(resp.into_body()), status))
    }
}

impl<C: HttpClient + Sync> IdentityResolver for SkylineResolver<C> {
    fn options(&self) -> &ResolverOptions {
        &self.opts
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, did), fields(did = %did)))]
    async fn resolve_did_doc(&self, did: &str) -> resolver::Result<DidDocResponse> {
        let url = if did.starts_with("did:plc:") {
            self.plc_url(did)?
        } else if did.starts_with("did:web:") {
            self.did_web_url(did)?
        } else {
            return Err(IdentityError::UnsupportedDidMethod(did.to_string()));
        };
        let (buffer, status) = self.get_json_bytes(url).await?;
        Ok(DidDocResponse {
            buffer,
            status,
            requested: Some(did.to_string()),
        })
    }
}

/// Resolver specialized for unauthenticated/public flows using reqwest
#[cfg(feature = "reqwest-client")]
pub type PublicResolver = SkylineResolver<reqwest::Client>;

#[cfg(feature = "reqwest-client")]
impl Default for PublicResolver {
    /// Build a resolver with a fresh reqwest client and default options.
    fn default() -> Self {
        SkylineResolver::new(reqwest::Client::new(), ResolverOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingClient {
        urls: Arc<Mutex<Vec<String>>>,
        body: &'static str,
    }

    impl HttpClient for RecordingClient {
        type Error = std::convert::Infallible;
        async fn send_http(
            &self,
            request: http::Request<Vec<u8>>,
        ) -> Result<http::Response<Vec<u8>>, Self::Error> {
            self.urls.lock().unwrap().push(request.uri().to_string());
            Ok(http::Response::builder()
                .status(200)
                .body(self.body.as_bytes().to_vec())
                .unwrap())
        }
    }

    fn resolver(body: &'static str) -> SkylineResolver<RecordingClient> {
        SkylineResolver::new(
            RecordingClient {
                body,
                ..Default::default()
            },
            ResolverOptions::default(),
        )
    }

    #[test]
    fn did_web_urls() {
        let r = resolver("{}");
        assert_eq!(
            r.did_web_url("did:web:example.com").unwrap().as_str(),
            "https://example.com/.well-known/did.json"
        );
        assert_eq!(
            r.did_web_url("did:web:example.com:user:alice").unwrap().as_str(),
            "https://example.com/user/alice/did.json"
        );
        assert_eq!(
            r.did_web_url("did:web:localhost%3A8080").unwrap().as_str(),
            "https://localhost:8080/.well-known/did.json"
        );
        assert!(r.did_web_url("did:plc:alice").is_err());
    }

    #[test]
    fn plc_url_keeps_did_in_path() {
        let r = resolver("{}");
        assert_eq!(
            r.plc_url("did:plc:ewvi7nxzyoun6zhxrhs64oiz").unwrap().as_str(),
            "https://plc.directory/did:plc:ewvi7nxzyoun6zhxrhs64oiz"
        );
    }

    #[tokio::test]
    async fn resolves_and_validates() {
        let r = resolver(
            r##"{"id":"did:plc:alice","service":[{"id":"#atproto_pds","type":"AtprotoPersonalDataServer","serviceEndpoint":"https://pds.example"}]}"##,
        );
        let doc = r.resolve_did_doc_owned("did:plc:alice").await.unwrap();
        assert_eq!(doc.pds_endpoint().unwrap().as_str(), "https://pds.example/");
        assert_eq!(
            r.http().urls.lock().unwrap().as_slice(),
            ["https://plc.directory/did:plc:alice".to_string()]
        );

        let err = r.resolve_did_doc_owned("did:plc:bob").await.unwrap_err();
        assert!(matches!(err, IdentityError::DocIdMismatch { .. }));
    }

    #[tokio::test]
    async fn unsupported_method() {
        let r = resolver("{}");
        assert!(matches!(
            r.resolve_did_doc("did:key:z6Mk").await,
            Err(IdentityError::UnsupportedDidMethod(_))
        ));
        assert!(r.http().urls.lock().unwrap().is_empty());
    }
}
