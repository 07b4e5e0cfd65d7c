//! Error types for the session lifecycle and the resilient caller.

use skyline_common::error::ClientError;
use skyline_common::session::SessionStoreError;
use skyline_common::types::jwt::TokenError;
use skyline_identity::resolver::IdentityError;

use crate::client::classify::{ErrorClass, TerminalKind, classify};

/// Result alias used throughout the client.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong obtaining or using an account client.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    /// Credentials were rejected, or the refresh token expired or was revoked
    #[error("authentication failed during {context}")]
    #[diagnostic(
        code(skyline::authentication),
        help("check the account identifier and app password; a revoked session needs a fresh login")
    )]
    Authentication {
        /// Operation that was rejected
        context: &'static str,
        #[source]
        #[diagnostic_source]
        source: ClientError,
    },

    /// The DID document could not be used to locate service endpoints
    #[error(transparent)]
    #[diagnostic(transparent)]
    Discovery(#[from] DiscoveryError),

    /// The access token payload could not be decoded, so expiry is unknown
    #[error("cannot determine token expiry")]
    #[diagnostic(code(skyline::malformed_token))]
    MalformedToken(
        #[from]
        #[source]
        #[diagnostic_source]
        TokenError,
    ),

    /// The credential cache could not be read or written
    #[error("credential cache failure")]
    #[diagnostic(
        code(skyline::persistence),
        help("check permissions on the cache directory; delete a corrupt record to force a fresh login")
    )]
    Persistence(
        #[from]
        #[source]
        #[diagnostic_source]
        SessionStoreError,
    ),

    /// Upstream kept failing transiently until the retry budget ran out
    #[error("{context}: still failing after {attempts} attempt(s)")]
    #[diagnostic(
        code(skyline::transient_upstream),
        help("the upstream service is degraded; try again later or raise `retries`")
    )]
    TransientUpstream {
        /// Call context, e.g. "error getting post record"
        context: String,
        /// Total attempts made, including the first
        attempts: u32,
        /// Class of the last failure
        class: ErrorClass,
        #[source]
        #[diagnostic_source]
        source: ClientError,
    },

    /// A remote call failed terminally
    #[error("{context}")]
    #[diagnostic(code(skyline::call))]
    Call {
        /// Call context, e.g. "error creating post"
        context: String,
        #[source]
        #[diagnostic_source]
        source: ClientError,
    },

    /// Caller-supplied input could not be used
    #[error("invalid input: {0}")]
    #[diagnostic(code(skyline::invalid_input))]
    InvalidInput(String),
}

impl Error {
    /// Classify this error the way the retry loop and the facet resolver see it.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Call { source, .. } => classify(source),
            Error::TransientUpstream { class, .. } => *class,
            Error::Authentication { .. } => ErrorClass::Terminal(TerminalKind::Authentication),
            _ => ErrorClass::Terminal(TerminalKind::Other),
        }
    }

    /// The transport error underneath, if this came from a remote call.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Error::Authentication { source, .. }
            | Error::TransientUpstream { source, .. }
            | Error::Call { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Endpoint discovery failures.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DiscoveryError {
    /// The DID document could not be fetched
    #[error("failed to resolve DID document for {did}")]
    #[diagnostic(code(skyline::discovery::resolve))]
    Resolve {
        /// DID being resolved
        did: String,
        #[source]
        #[diagnostic_source]
        source: IdentityError,
    },
    /// The embedded DID document is not a DID document
    #[error("malformed DID document for {did}")]
    #[diagnostic(code(skyline::discovery::malformed))]
    Malformed {
        /// DID being resolved
        did: String,
        #[source]
        source: serde_json::Error,
    },
    /// The document lists no services
    #[error("DID document for {did} has no service entries")]
    #[diagnostic(
        code(skyline::discovery::no_service),
        help("the first service entry must point at the account's data host")
    )]
    NoService {
        /// DID being resolved
        did: String,
    },
    /// The first service entry has no usable URL
    #[error("service {id} in DID document for {did} has no usable endpoint")]
    #[diagnostic(code(skyline::discovery::bad_endpoint))]
    BadEndpoint {
        /// DID being resolved
        did: String,
        /// Offending service id
        id: String,
    },
    /// A moderation call was made but the account has no second service entry
    #[error("no moderation service recorded for {did}")]
    #[diagnostic(
        code(skyline::discovery::no_moderation_service),
        help("endpoints are discovered at login; log in again once the DID document lists the service")
    )]
    NoModerationService {
        /// Account DID
        did: String,
    },
}
