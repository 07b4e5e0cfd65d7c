//! DID → document resolution.
//!
//! `did:plc` documents come from a PLC directory, `did:web` documents from the
//! host's well-known location. Fetches return a [`DidDocResponse`] that owns the
//! raw buffer, so callers decide when (and whether) to validate the document id.

use std::future::Future;

use bon::Builder;
use bytes::Bytes;
use http::StatusCode;
use miette::Diagnostic;
use skyline_common::error::TransportError;
use skyline_common::types::did_doc::DidDocument;
use thiserror::Error;
use url::Url;

/// Result alias for resolver operations.
pub type Result<T> = std::result::Result<T, IdentityError>;

/// Errors that can occur during identity resolution.
///
/// Note: when validating a fetched DID document against a requested DID, a
/// `DocIdMismatch` error is returned that includes the owned document so callers
/// can inspect it and decide how to proceed.
#[derive(Debug, Error, Diagnostic)]
#[allow(missing_docs)]
pub enum IdentityError {
    #[error("unsupported DID method: {0}")]
    #[diagnostic(
        code(skyline_identity::unsupported_did_method),
        help("supported DID methods: did:web, did:plc")
    )]
    UnsupportedDidMethod(String),
    #[error("HTTP error: {0}")]
    #[diagnostic(
        code(skyline_identity::http),
        help("check network connectivity and TLS configuration")
    )]
    Http(#[from] TransportError),
    #[error("HTTP status {0}")]
    #[diagnostic(
        code(skyline_identity::http_status),
        help("the DID may not exist, or the directory is unavailable")
    )]
    HttpStatus(StatusCode),
    #[error("URL parse error: {0}")]
    #[diagnostic(code(skyline_identity::url))]
    Url(#[from] url::ParseError),
    #[error("invalid DID document: {0}")]
    #[diagnostic(
        code(skyline_identity::invalid_doc),
        help("a DID document is a JSON object with at least an `id`")
    )]
    InvalidDoc(#[from] serde_json::Error),
    /// DID document id did not match requested DID; includes the fetched document
    #[error("DID doc id mismatch: expected {expected}, got {}", .doc.id)]
    #[diagnostic(
        code(skyline_identity::doc_id_mismatch),
        help("document id differs from requested DID; do not trust this document")
    )]
    DocIdMismatch {
        expected: String,
        doc: Box<DidDocument>,
    },
}

/// Configurable resolver options.
#[derive(Debug, Clone, Builder)]
#[builder(start_fn = new)]
pub struct ResolverOptions {
    /// Base URL of the PLC directory serving `did:plc` documents
    pub plc_directory: Url,
    /// Validate that fetched DID document id matches the requested DID
    pub validate_doc_id: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            plc_directory: Url::parse("https://plc.directory/").expect("valid url"),
            validate_doc_id: true,
        }
    }
}

/// DID Document fetch response.
///
/// Carries the raw response bytes and the HTTP status, plus the requested DID
/// (if supplied) to enable validation.
#[derive(Clone, Debug)]
pub struct DidDocResponse {
    #[allow(missing_docs)]
    pub buffer: Bytes,
    #[allow(missing_docs)]
    pub status: StatusCode,
    /// Optional DID we intended to resolve; used for validation helpers
    pub requested: Option<String>,
}

impl DidDocResponse {
    /// Parse the document.
    pub fn parse(&self) -> Result<DidDocument> {
        if self.status.is_success() {
            Ok(serde_json::from_slice::<DidDocument>(&self.buffer)?)
        } else {
            Err(IdentityError::HttpStatus(self.status))
        }
    }

    /// Parse and validate that the DID in the document matches the requested DID if present.
    ///
    /// On mismatch, returns an error that contains the document for inspection.
    pub fn parse_validated(&self) -> Result<DidDocument> {
        let doc = self.parse()?;
        if let Some(expected) = &self.requested {
            if doc.id != *expected {
                return Err(IdentityError::DocIdMismatch {
                    expected: expected.clone(),
                    doc: Box::new(doc),
                });
            }
        }
        Ok(doc)
    }
}

/// Trait for identity resolution, for pluggable implementations.
pub trait IdentityResolver {
    /// Access options for validation decisions in default methods
    fn options(&self) -> &ResolverOptions;

    /// Fetch the DID document for `did`
    fn resolve_did_doc(
        &self,
        did: &str,
    ) -> impl Future<Output = Result<DidDocResponse>> + Send
    where
        Self: Sync;

    /// Fetch and parse the DID document, checking its id when the options ask for it
    fn resolve_did_doc_owned(
        &self,
        did: &str,
    ) -> impl Future<Output = Result<DidDocument>> + Send
    where
        Self: Sync,
    {
        async move {
            let resp = self.resolve_did_doc(did).await?;
            if self.options().validate_doc_id {
                resp.parse_validated()
            } else {
                resp.parse()
            }
        }
    }
}

impl<T: IdentityResolver + Sync + Send> IdentityResolver for std::sync::Arc<T> {
    fn options(&self) -> &ResolverOptions {
        self.as_ref().options()
    }

    async fn resolve_did_doc(&self, did: &str) -> Result<DidDocResponse> {
        self.as_ref().resolve_did_doc(did).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_validated_ok() {
        let resp = DidDocResponse {
            buffer: Bytes::from_static(br#"{"id":"did:plc:alice"}"#),
            status: StatusCode::OK,
            requested: Some("did:plc:alice".into()),
        };
        let doc = resp.parse_validated().expect("valid");
        assert_eq!(doc.id, "did:plc:alice");
    }

    #[test]
    fn parse_validated_mismatch() {
        let resp = DidDocResponse {
            buffer: Bytes::from_static(br#"{"id":"did:plc:bob"}"#),
            status: StatusCode::OK,
            requested: Some("did:plc:alice".into()),
        };
        match resp.parse_validated() {
            Err(IdentityError::DocIdMismatch { expected, doc }) => {
                assert_eq!(expected, "did:plc:alice");
                assert_eq!(doc.id, "did:plc:bob");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn error_status_and_garbage() {
        let resp = DidDocResponse {
            buffer: Bytes::from_static(b"not found"),
            status: StatusCode::NOT_FOUND,
            requested: None,
        };
        assert!(matches!(
            resp.parse(),
            Err(IdentityError::HttpStatus(StatusCode::NOT_FOUND))
        ));

        let resp = DidDocResponse {
            buffer: Bytes::from_static(b"[1,2]"),
            status: StatusCode::OK,
            requested: None,
        };
        assert!(matches!(resp.parse(), Err(IdentityError::InvalidDoc(_))));
    }
}
