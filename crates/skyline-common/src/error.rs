//! Error types for XRPC client operations

use std::io::ErrorKind;

use bytes::Bytes;

use crate::xrpc::{EncodeError, GenericXrpcError, XrpcError};

/// Client error type wrapping all possible error conditions
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ClientError {
    /// HTTP transport error
    #[error("HTTP transport error: {0}")]
    Transport(
        #[from]
        #[diagnostic_source]
        TransportError,
    ),

    /// Request serialization failed
    #[error("{0}")]
    Encode(
        #[from]
        #[diagnostic_source]
        EncodeError,
    ),

    /// Response deserialization failed
    #[error("{0}")]
    Decode(
        #[from]
        #[diagnostic_source]
        DecodeError,
    ),

    /// HTTP error response
    #[error("HTTP {0}")]
    Http(
        #[from]
        #[diagnostic_source]
        HttpError,
    ),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(
        #[from]
        #[diagnostic_source]
        AuthError,
    ),

    /// Structured XRPC error body returned by the server
    #[error("{0}")]
    #[diagnostic(code(skyline_common::xrpc::generic))]
    Xrpc(GenericXrpcError),
}

impl From<XrpcError> for ClientError {
    fn from(e: XrpcError) -> Self {
        match e {
            XrpcError::Auth(auth) => ClientError::Auth(auth),
            XrpcError::Generic(generic) => ClientError::Xrpc(generic),
            XrpcError::Decode(decode) => ClientError::Decode(decode),
        }
    }
}

/// Transport-level errors that occur during HTTP communication
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TransportError {
    /// Failed to establish connection to server
    #[error("Connection error: {0}")]
    Connect(String),

    /// Request timed out
    #[error("Request timeout")]
    Timeout,

    /// Request construction failed (malformed URI, headers, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Other transport error
    #[error("Transport error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Response deserialization errors
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DecodeError {
    /// JSON deserialization failed
    #[error("Failed to deserialize JSON: {0}")]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
}

/// HTTP error response (non-200 status codes outside of XRPC error handling)
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub struct HttpError {
    /// HTTP status code
    pub status: http::StatusCode,
    /// Response body if available
    pub body: Option<Bytes>,
}

impl HttpError {
    /// Decode the body as an XRPC error envelope, if it is one.
    ///
    /// Upstream proxies frequently answer 5xx with `{"error": "...", "message": "..."}`.
    pub fn xrpc_body(&self) -> Option<GenericXrpcError> {
        let body = self.body.as_ref()?;
        let mut generic: GenericXrpcError = serde_json::from_slice(body).ok()?;
        generic.http_status = self.status;
        Some(generic)
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(body) = &self.body {
            if let Ok(s) = std::str::from_utf8(body) {
                write!(f, ":\n{}", s)?;
            }
        }
        Ok(())
    }
}

/// Result type for client operations
pub type XrpcResult<T> = std::result::Result<T, ClientError>;

impl TransportError {
    /// Map an [`HttpClient`](crate::http_client::HttpClient) failure onto a transport error.
    ///
    /// reqwest errors, and `std::io` errors anywhere in the source chain, keep their
    /// timeout and connect distinctions. Anything else becomes [`TransportError::Other`].
    pub fn from_client<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let err: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
        #[cfg(feature = "reqwest-client")]
        let err = match err.downcast::<reqwest::Error>() {
            Ok(e) => return (*e).into(),
            Err(err) => err,
        };

        let root: &(dyn std::error::Error + 'static) = &*err;
        let io_kind = std::iter::successors(Some(root), |e| e.source())
            .find_map(|e| e.downcast_ref::<std::io::Error>())
            .map(std::io::Error::kind);
        match io_kind {
            Some(ErrorKind::TimedOut) => Self::Timeout,
            Some(
                ErrorKind::ConnectionRefused
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::NotConnected,
            ) => Self::Connect(err.to_string()),
            _ => Self::Other(err),
        }
    }
}

#[cfg(feature = "reqwest-client")]
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() || e.is_request() {
            Self::InvalidRequest(e.to_string())
        } else {
            Self::Other(Box::new(e))
        }
    }
}

/// Authentication and authorization errors
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum AuthError {
    /// Access token has expired (use refresh token to get a new one)
    #[error("Access token expired")]
    TokenExpired,

    /// Access token is invalid or malformed
    #[error("Invalid access token")]
    InvalidToken,

    /// Server rejected the supplied credentials with its own error body
    #[error("{0}")]
    Rejected(GenericXrpcError),

    /// Other authentication error
    #[error("Authentication error: {0:?}")]
    Other(http::HeaderValue),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, thiserror::Error)]
    #[error("client failed")]
    struct Wrapped(#[source] io::Error);

    #[test]
    fn io_timeouts_map_to_timeout() {
        let err = TransportError::from_client(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        assert!(matches!(err, TransportError::Timeout));

        let nested = TransportError::from_client(Wrapped(io::Error::from(io::ErrorKind::TimedOut)));
        assert!(matches!(nested, TransportError::Timeout));
    }

    #[test]
    fn refused_connections_map_to_connect() {
        let err = TransportError::from_client(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(matches!(err, TransportError::Connect(_)));
    }

    #[test]
    fn anything_else_is_other() {
        let err = TransportError::from_client(io::Error::other("boom"));
        match err {
            TransportError::Other(inner) => assert_eq!(inner.to_string(), "boom"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
