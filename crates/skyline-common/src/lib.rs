//! Common transport types for the skyline AT Protocol client

#![warn(missing_docs)]
pub use smol_str;
pub use url;

pub mod error;
/// HTTP client abstraction used by skyline crates.
pub mod http_client;
/// Generic session storage traits and utilities.
pub mod session;
/// Baseline AT Protocol data types.
pub mod types;
pub mod xrpc;

/// Authorization token types for XRPC requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationToken {
    /// Bearer token (access JWT, refresh JWT to refresh the session)
    Bearer(String),
}

impl AuthorizationToken {
    /// The raw token, without the scheme prefix.
    pub fn as_str(&self) -> &str {
        match self {
            AuthorizationToken::Bearer(t) => t,
        }
    }
}
