//! Client configuration.
//!
//! A [`Config`] travels with every persisted credential record, so changing a
//! field takes effect (and is re-persisted) the next time a client is obtained.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::error::{Error, Result};
use crate::client::retry::RetryPolicy;

/// Default account host.
pub const DEFAULT_PDS: &str = "https://bsky.social";
/// Default directory holding credential records.
pub const DEFAULT_CACHE_DIR: &str = ".atp";

/// Collection identifiers, retry budget and cache location for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Account host used for createSession/refreshSession
    pub pds: Url,
    /// Profile record collection
    pub profiles_collection: String,
    /// Post record collection
    pub posts_collection: String,
    /// Repost record collection
    pub reposts_collection: String,
    /// Like record collection
    pub likes_collection: String,
    /// Follow record collection
    pub graph_follow_lexicon: String,
    /// Block record collection
    pub graph_block_lexicon: String,
    /// Labeler service declaration collection
    pub labeler_service: String,
    /// Re-attempts allowed after a transient failure
    pub retries: u32,
    /// Fixed delay between attempts, in seconds
    pub retry_delay_secs: u64,
    /// Refresh this many seconds before the access token actually expires
    pub expiry_margin_secs: i64,
    /// Directory holding credential records
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pds: Url::parse(DEFAULT_PDS).expect("default pds should be a valid url"),
            profiles_collection: "app.bsky.actor.profile".into(),
            posts_collection: "app.bsky.feed.post".into(),
            reposts_collection: "app.bsky.feed.repost".into(),
            likes_collection: "app.bsky.feed.like".into(),
            graph_follow_lexicon: "app.bsky.graph.follow".into(),
            graph_block_lexicon: "app.bsky.graph.block".into(),
            labeler_service: "app.bsky.labeler.service".into(),
            retries: 1,
            retry_delay_secs: 3,
            expiry_margin_secs: 60,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

impl Config {
    /// Defaults with `SKYLINE_*` environment overrides applied.
    ///
    /// Recognised: `SKYLINE_PDS`, `SKYLINE_RETRIES`, `SKYLINE_RETRY_DELAY_SECS`,
    /// `SKYLINE_EXPIRY_MARGIN_SECS`, `SKYLINE_CACHE_DIR`.
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary lookup (environment, test map, ...).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(pds) = lookup("SKYLINE_PDS") {
            self.pds = Url::parse(&pds)
                .map_err(|e| Error::InvalidInput(format!("SKYLINE_PDS: {e}")))?;
        }
        if let Some(retries) = lookup("SKYLINE_RETRIES") {
            self.retries = retries
                .parse()
                .map_err(|e| Error::InvalidInput(format!("SKYLINE_RETRIES: {e}")))?;
        }
        if let Some(delay) = lookup("SKYLINE_RETRY_DELAY_SECS") {
            self.retry_delay_secs = delay
                .parse()
                .map_err(|e| Error::InvalidInput(format!("SKYLINE_RETRY_DELAY_SECS: {e}")))?;
        }
        if let Some(margin) = lookup("SKYLINE_EXPIRY_MARGIN_SECS") {
            self.expiry_margin_secs = margin
                .parse()
                .map_err(|e| Error::InvalidInput(format!("SKYLINE_EXPIRY_MARGIN_SECS: {e}")))?;
        }
        if let Some(dir) = lookup("SKYLINE_CACHE_DIR") {
            self.cache_dir = PathBuf::from(dir);
        }
        Ok(self)
    }

    /// Retry budget and delay for calls made under this config.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, Duration::from_secs(self.retry_delay_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.pds.as_str(), "https://bsky.social/");
        assert_eq!(config.posts_collection, "app.bsky.feed.post");
        assert_eq!(config.graph_block_lexicon, "app.bsky.graph.block");
        assert_eq!(config.retries, 1);
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::new(1, Duration::from_secs(3))
        );
        assert_eq!(config.cache_dir, PathBuf::from(".atp"));
    }

    #[test]
    fn overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SKYLINE_PDS", "https://pds.example.com"),
            ("SKYLINE_RETRIES", "4"),
            ("SKYLINE_EXPIRY_MARGIN_SECS", "120"),
            ("SKYLINE_CACHE_DIR", "/tmp/creds"),
        ]);
        let config = Config::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.pds.as_str(), "https://pds.example.com/");
        assert_eq!(config.retries, 4);
        assert_eq!(config.retry_delay_secs, 3);
        assert_eq!(config.expiry_margin_secs, 120);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/creds"));
    }

    #[test]
    fn bad_override_is_rejected() {
        let err = Config::default()
            .with_overrides(|k| (k == "SKYLINE_RETRIES").then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(msg) if msg.starts_with("SKYLINE_RETRIES")));

        let err = Config::default()
            .with_overrides(|k| (k == "SKYLINE_EXPIRY_MARGIN_SECS").then(|| "1m".to_string()))
            .unwrap_err();
        assert!(
            matches!(err, Error::InvalidInput(msg) if msg.starts_with("SKYLINE_EXPIRY_MARGIN_SECS"))
        );
    }

    #[test]
    fn partial_records_fill_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"pds":"https://pds.example.com","retries":2}"#).unwrap();
        assert_eq!(config.retries, 2);
        assert_eq!(config.likes_collection, "app.bsky.feed.like");
    }
}
