//! App-password sessions, the credential cache, and the resilient caller.
//!
//! [`SessionManager::obtain_client`] is the entry point: it loads the cached
//! [`CredentialRecord`] for an account (or logs in and discovers endpoints),
//! refreshes an expiring session, and hands back an [`AccountClient`].

pub mod account;
pub mod classify;
pub mod credential_session;
pub mod error;
pub mod retry;
pub mod token;

use std::fmt;

use serde::{Deserialize, Serialize};
use skyline_api::com_atproto::server::create_session::CreateSessionOutput;
use skyline_api::com_atproto::server::refresh_session::RefreshSessionOutput;
use skyline_common::types::did_doc::DidDocument;
use skyline_common::types::jwt::Claims;
use url::Url;

pub use account::{AccountClient, PostData};
pub use classify::{ErrorClass, TerminalKind, classify};
pub use credential_session::SessionManager;
pub use error::{DiscoveryError, Error, Result};
pub use retry::RetryPolicy;
pub use token::{CredentialKey, FileCredentialStore};

use crate::config::Config;

/// Authenticated state for one account.
///
/// Tokens are replaced wholesale on refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Identifier the account logged in with (DID or handle)
    pub account_identifier: String,
    /// Bearer token for ordinary calls
    pub access_jwt: String,
    /// Bearer token for refreshSession
    pub refresh_jwt: String,
    /// Current handle
    pub handle: String,
    /// Account DID
    pub did: String,
    /// App password used to log in
    pub app_password: String,
}

impl Session {
    /// Build a session from a createSession response.
    pub fn from_login(
        account_identifier: impl Into<String>,
        app_password: impl Into<String>,
        out: &CreateSessionOutput,
    ) -> Self {
        Self {
            account_identifier: account_identifier.into(),
            access_jwt: out.access_jwt.clone(),
            refresh_jwt: out.refresh_jwt.clone(),
            handle: out.handle.clone(),
            did: out.did.clone(),
            app_password: app_password.into(),
        }
    }

    /// Install a refreshed token pair.
    pub fn apply_refresh(&mut self, out: RefreshSessionOutput) {
        self.access_jwt = out.access_jwt;
        self.refresh_jwt = out.refresh_jwt;
        self.handle = out.handle;
        self.did = out.did;
    }

    /// Whether the access token expires within `margin_secs` of now.
    ///
    /// A token whose payload cannot be read is an error, never "not expired".
    pub fn is_expired(&self, margin_secs: i64) -> Result<bool> {
        self.is_expired_at(chrono::Utc::now().timestamp(), margin_secs)
    }

    /// [`Session::is_expired`] against an explicit clock reading.
    pub fn is_expired_at(&self, now: i64, margin_secs: i64) -> Result<bool> {
        let claims = Claims::decode(&self.access_jwt)?;
        Ok(claims.expires_within(now, margin_secs))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("account_identifier", &self.account_identifier)
            .field("handle", &self.handle)
            .field("did", &self.did)
            .finish_non_exhaustive()
    }
}

/// The moderation service, reached through the data host with a proxy header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationHost {
    /// Same URL as the data host
    pub url: Url,
    /// `atproto-proxy` value, `{did}#{service}`
    pub atproto_proxy: String,
}

/// Where each logical service lives for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoints {
    /// Host that issued the session
    pub account_host: Url,
    /// Host holding the account's repository
    pub data_host: Url,
    /// Present only when the DID document lists a second service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderation_host: Option<ModerationHost>,
}

impl ServiceEndpoints {
    /// Derive endpoints from a DID document.
    ///
    /// The data host is the first service entry. A second entry, if any, yields a
    /// moderation host that reuses the data host URL and routes by header.
    pub fn from_did_doc(
        account_host: Url,
        did: &str,
        doc: &DidDocument,
    ) -> std::result::Result<Self, DiscoveryError> {
        let services = doc.services();
        let first = services.first().ok_or_else(|| DiscoveryError::NoService {
            did: did.to_string(),
        })?;
        let data_host = first
            .endpoint_url()
            .ok_or_else(|| DiscoveryError::BadEndpoint {
                did: did.to_string(),
                id: first.id.clone(),
            })?;
        let moderation_host = services.get(1).map(|second| ModerationHost {
            url: data_host.clone(),
            atproto_proxy: format!("{did}{}", second.fragment()),
        });
        Ok(Self {
            account_host,
            data_host,
            moderation_host,
        })
    }
}

/// Everything persisted for one account on one account host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Config the record was last used with
    pub config: Config,
    /// Live session
    pub session: Session,
    /// Discovered service endpoints
    pub endpoints: ServiceEndpoints,
}

impl CredentialRecord {
    /// Key this record is stored under.
    pub fn key(&self) -> CredentialKey {
        CredentialKey::new(
            self.endpoints.account_host.clone(),
            self.session.account_identifier.clone(),
        )
    }
}
