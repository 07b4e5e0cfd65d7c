//! Upstream error classification.
//!
//! Structured signals come first: the XRPC error code in the body, then the HTTP
//! status. Only when neither decides does the message text get matched, and every
//! fragment of server text the client depends on lives in [`messages`].

use http::StatusCode;
use skyline_common::error::{AuthError, ClientError, TransportError};
use skyline_common::xrpc::GenericXrpcError;

/// Server message text the classifier recognises.
///
/// These are the rendered `"{error}: {message}"` forms returned by the reference
/// PDS and AppView.
pub mod messages {
    /// Generic 500 from the PDS
    pub const INTERNAL_SERVER_ERROR: &str = "InternalServerError: Internal Server Error";
    /// AppView could not reach its upstream
    pub const UPSTREAM_FAILURE: &str = "UpstreamFailure: Upstream Failure";
    /// Upstream took too long
    pub const UPSTREAM_TIMEOUT: &str = "UpstreamTimeout: Upload timed out, please try again";
    /// getProfile for an unknown account
    pub const PROFILE_NOT_FOUND: &str = "InvalidRequest: Profile not found";
    /// getRecord against an unknown repo
    pub const REPO_NOT_FOUND: &str = "InvalidRequest: Could not find repo";
    /// getRecord for a missing record
    pub const RECORD_NOT_FOUND: &str = "InvalidRequest: Could not locate record";
    /// Actor parameter is neither a DID nor a handle
    pub const INVALID_ACTOR: &str = "InvalidRequest: Error: actor must be a valid did or a handle";
    /// Repo parameter is neither a DID nor a handle
    pub const INVALID_REPO: &str = "InvalidRequest: Error: repo must be a valid did or a handle";
    /// createSession with bad credentials
    pub const INVALID_CREDENTIALS: &str = "AuthenticationRequired: Invalid identifier or password";
    /// Access or refresh token past its expiry
    pub const TOKEN_EXPIRED: &str = "ExpiredToken: Token has expired";
    /// Refresh token was revoked (usually by a newer refresh)
    pub const TOKEN_REVOKED: &str = "Token has been revoked";
}

/// How the retry loop should treat a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The upstream service failed; worth another attempt
    TransientUpstream,
    /// The upstream service timed out; worth another attempt
    TransientTimeout,
    /// The server hit an internal error; worth another attempt
    TransientInternal,
    /// Retrying cannot help
    Terminal(TerminalKind),
}

/// Sub-kinds of terminal failures callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    /// The account, profile or record does not exist
    NotFound,
    /// The identifier is not a valid DID or handle
    InvalidIdentifier,
    /// Credentials or tokens were rejected
    Authentication,
    /// Anything else
    Other,
}

impl ErrorClass {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, ErrorClass::Terminal(_))
    }
}

/// Classify a transport-level error.
pub fn classify(err: &ClientError) -> ErrorClass {
    match err {
        ClientError::Xrpc(generic) => classify_xrpc(generic),
        ClientError::Auth(AuthError::Rejected(generic)) => match classify_xrpc(generic) {
            ErrorClass::Terminal(TerminalKind::Other) => {
                ErrorClass::Terminal(TerminalKind::Authentication)
            }
            class => class,
        },
        ClientError::Auth(_) => ErrorClass::Terminal(TerminalKind::Authentication),
        ClientError::Http(http) => {
            if let Some(generic) = http.xrpc_body() {
                let class = classify_xrpc(&generic);
                if class.is_transient() {
                    return class;
                }
            }
            classify_status(http.status)
                .unwrap_or_else(|| ErrorClass::Terminal(TerminalKind::Other))
        }
        // Client-side timeouts are not retried: the request may have landed.
        ClientError::Transport(TransportError::Timeout) => {
            ErrorClass::Terminal(TerminalKind::Other)
        }
        other => classify_message(&other.to_string()),
    }
}

/// Classify an XRPC error body by code, then by message text.
pub fn classify_xrpc(err: &GenericXrpcError) -> ErrorClass {
    match err.error.as_str() {
        "UpstreamFailure" => ErrorClass::TransientUpstream,
        "UpstreamTimeout" => ErrorClass::TransientTimeout,
        "InternalServerError" => ErrorClass::TransientInternal,
        "NotFound" | "RecordNotFound" | "RepoNotFound" | "ProfileNotFound" => {
            ErrorClass::Terminal(TerminalKind::NotFound)
        }
        "AuthenticationRequired" | "ExpiredToken" | "InvalidToken" | "AuthFactorTokenRequired" => {
            ErrorClass::Terminal(TerminalKind::Authentication)
        }
        code => match &err.message {
            Some(message) => classify_message(&format!("{code}: {message}")),
            None => classify_message(code),
        },
    }
}

/// Classify by HTTP status alone, when it is decisive.
pub fn classify_status(status: StatusCode) -> Option<ErrorClass> {
    match status.as_u16() {
        500 => Some(ErrorClass::TransientInternal),
        502 => Some(ErrorClass::TransientUpstream),
        504 => Some(ErrorClass::TransientTimeout),
        _ => None,
    }
}

/// Classify rendered error text against the known server messages.
pub fn classify_message(text: &str) -> ErrorClass {
    use messages::*;

    const TABLE: &[(&str, ErrorClass)] = &[
        (UPSTREAM_FAILURE, ErrorClass::TransientUpstream),
        (UPSTREAM_TIMEOUT, ErrorClass::TransientTimeout),
        (INTERNAL_SERVER_ERROR, ErrorClass::TransientInternal),
        (PROFILE_NOT_FOUND, ErrorClass::Terminal(TerminalKind::NotFound)),
        (REPO_NOT_FOUND, ErrorClass::Terminal(TerminalKind::NotFound)),
        (RECORD_NOT_FOUND, ErrorClass::Terminal(TerminalKind::NotFound)),
        (INVALID_ACTOR, ErrorClass::Terminal(TerminalKind::InvalidIdentifier)),
        (INVALID_REPO, ErrorClass::Terminal(TerminalKind::InvalidIdentifier)),
        (INVALID_CREDENTIALS, ErrorClass::Terminal(TerminalKind::Authentication)),
        (TOKEN_EXPIRED, ErrorClass::Terminal(TerminalKind::Authentication)),
        (TOKEN_REVOKED, ErrorClass::Terminal(TerminalKind::Authentication)),
    ];

    TABLE
        .iter()
        .find(|(needle, _)| text.contains(needle))
        .map(|(_, class)| *class)
        .unwrap_or(ErrorClass::Terminal(TerminalKind::Other))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use skyline_common::error::HttpError;
    use smol_str::SmolStr;

    fn xrpc(error: &str, message: Option<&str>, status: StatusCode) -> GenericXrpcError {
        GenericXrpcError {
            error: SmolStr::new(error),
            message: message.map(SmolStr::new),
            nsid: "app.bsky.actor.getProfile",
            method: "GET",
            http_status: status,
        }
    }

    #[test]
    fn codes_take_precedence() {
        let err = ClientError::Xrpc(xrpc(
            "UpstreamFailure",
            Some("something else"),
            StatusCode::BAD_REQUEST,
        ));
        assert_eq!(classify(&err), ErrorClass::TransientUpstream);
        let err = ClientError::Xrpc(xrpc("RecordNotFound", None, StatusCode::BAD_REQUEST));
        assert_eq!(classify(&err), ErrorClass::Terminal(TerminalKind::NotFound));
    }

    #[test]
    fn invalid_request_falls_back_to_message() {
        let not_found = xrpc(
            "InvalidRequest",
            Some("Profile not found"),
            StatusCode::BAD_REQUEST,
        );
        assert_eq!(
            classify_xrpc(&not_found),
            ErrorClass::Terminal(TerminalKind::NotFound)
        );
        let bad_actor = xrpc(
            "InvalidRequest",
            Some("Error: actor must be a valid did or a handle"),
            StatusCode::BAD_REQUEST,
        );
        assert_eq!(
            classify_xrpc(&bad_actor),
            ErrorClass::Terminal(TerminalKind::InvalidIdentifier)
        );
        let other = xrpc("InvalidRequest", Some("bad cursor"), StatusCode::BAD_REQUEST);
        assert_eq!(
            classify_xrpc(&other),
            ErrorClass::Terminal(TerminalKind::Other)
        );
    }

    #[test]
    fn server_statuses() {
        let bare = |status| {
            ClientError::Http(HttpError {
                status,
                body: None,
            })
        };
        assert_eq!(
            classify(&bare(StatusCode::INTERNAL_SERVER_ERROR)),
            ErrorClass::TransientInternal
        );
        assert_eq!(
            classify(&bare(StatusCode::BAD_GATEWAY)),
            ErrorClass::TransientUpstream
        );
        assert_eq!(
            classify(&bare(StatusCode::GATEWAY_TIMEOUT)),
            ErrorClass::TransientTimeout
        );
        assert_eq!(
            classify(&bare(StatusCode::NOT_IMPLEMENTED)),
            ErrorClass::Terminal(TerminalKind::Other)
        );

        let with_body = ClientError::Http(HttpError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: Some(Bytes::from_static(
                br#"{"error":"UpstreamTimeout","message":"Upload timed out, please try again"}"#,
            )),
        });
        assert_eq!(classify(&with_body), ErrorClass::TransientTimeout);
    }

    #[test]
    fn auth_failures_are_terminal() {
        let rejected = ClientError::Auth(AuthError::Rejected(xrpc(
            "AuthenticationRequired",
            Some("Invalid identifier or password"),
            StatusCode::UNAUTHORIZED,
        )));
        assert_eq!(
            classify(&rejected),
            ErrorClass::Terminal(TerminalKind::Authentication)
        );
        assert_eq!(
            classify(&ClientError::Auth(AuthError::TokenExpired)),
            ErrorClass::Terminal(TerminalKind::Authentication)
        );
        assert_eq!(
            classify_message("InvalidToken: Token has been revoked"),
            ErrorClass::Terminal(TerminalKind::Authentication)
        );
    }

    #[test]
    fn client_timeout_is_terminal() {
        assert_eq!(
            classify(&ClientError::Transport(TransportError::Timeout)),
            ErrorClass::Terminal(TerminalKind::Other)
        );
    }

    #[test]
    fn message_table() {
        assert_eq!(
            classify_message("XRPC ERROR 502: UpstreamFailure: Upstream Failure"),
            ErrorClass::TransientUpstream
        );
        assert_eq!(
            classify_message(messages::UPSTREAM_TIMEOUT),
            ErrorClass::TransientTimeout
        );
        assert_eq!(
            classify_message(messages::INTERNAL_SERVER_ERROR),
            ErrorClass::TransientInternal
        );
        assert_eq!(
            classify_message(messages::INVALID_REPO),
            ErrorClass::Terminal(TerminalKind::InvalidIdentifier)
        );
        assert_eq!(
            classify_message("connection reset"),
            ErrorClass::Terminal(TerminalKind::Other)
        );
        assert!(!ErrorClass::Terminal(TerminalKind::NotFound).is_transient());
        assert!(ErrorClass::TransientInternal.is_transient());
    }
}
