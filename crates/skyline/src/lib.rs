//! # Skyline
//!
//! An app-password AT Protocol client that survives restarts and flaky upstreams.
//!
//! - Sessions are cached on disk per (account host, account), reused while the
//!   access token is fresh, and refreshed ahead of expiry.
//! - Service endpoints are discovered from the account's DID document at login.
//! - Every domain call runs under a bounded retry policy that only retries
//!   upstream failures and timeouts.
//! - Post text is scanned for links, mentions and hashtags, and turned into
//!   facets with byte offsets.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use skyline::client::{FileCredentialStore, SessionManager, account::PostData};
//! use skyline::config::Config;
//!
//! # async fn run() -> skyline::client::Result<()> {
//! let config = Config::from_env()?;
//! let store = Arc::new(FileCredentialStore::new(&config.cache_dir));
//! let manager = SessionManager::new(store, Arc::new(reqwest::Client::new()));
//!
//! let client = manager
//!     .obtain_client("did:plc:example", "app-pass-word", config)
//!     .await?;
//! client
//!     .create_post(PostData::new().text("hello from #skyline").build())
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod richtext;

pub use skyline_api as api;
pub use skyline_common as common;
pub use skyline_identity as identity;

pub use client::{AccountClient, Error, Result, SessionManager};
pub use config::Config;
