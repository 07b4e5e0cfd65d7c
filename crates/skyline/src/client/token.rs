use async_trait::async_trait;
use skyline_common::session::{SessionStore, SessionStoreError};
use std::path::{Path, PathBuf};
use url::Url;

use crate::client::CredentialRecord;

/// Identifies one persisted credential record: an account on an account host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialKey {
    /// Host that issued the session
    pub account_host: Url,
    /// Account identifier as supplied at login (usually a DID)
    pub account: String,
}

impl CredentialKey {
    /// Key for `account` on `account_host`.
    pub fn new(account_host: Url, account: impl Into<String>) -> Self {
        Self {
            account_host,
            account: account.into(),
        }
    }

    /// File name of the record, `{host}_{did_suffix}_auth.json`.
    pub fn file_name(&self) -> String {
        let host = self.account_host.as_str();
        let host = host
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(host)
            .trim_end_matches('/')
            .replace(['/', ':'], "_");
        let account = self.account.strip_prefix("did:plc:").unwrap_or(&self.account);
        format!("{host}_{}_auth.json", account.replace(':', "_"))
    }
}

/// File-backed credential store: one pretty-printed JSON record per key.
///
/// Writes go through a temp file and a rename. There is no locking, so two
/// processes sharing an account will overwrite each other's refreshed tokens.
///
/// Example
/// ```no_run
/// use skyline::client::{CredentialKey, FileCredentialStore};
/// let store = FileCredentialStore::new(".atp");
/// let key = CredentialKey::new(url::Url::parse("https://bsky.social").unwrap(), "did:plc:alice");
/// assert!(store.path_for(&key).ends_with("bsky.social_alice_auth.json"));
/// ```
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    dir: PathBuf,
}

impl FileCredentialStore {
    /// Store records under `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the record for `key`.
    pub fn path_for(&self, key: &CredentialKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

#[async_trait]
impl SessionStore<CredentialKey, CredentialRecord> for FileCredentialStore {
    async fn get(&self, key: &CredentialKey) -> Result<Option<CredentialRecord>, SessionStoreError> {
        let path = self.path_for(key);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Leave an empty placeholder so the location is visible to the user.
                tokio::fs::create_dir_all(&self.dir).await?;
                tokio::fs::write(&path, b"").await?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        if data.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&data)?))
    }

    async fn set(&self, key: CredentialKey, record: CredentialRecord) -> Result<(), SessionStoreError> {
        let buf = serde_json::to_vec_pretty(&record)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(&key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &buf).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn del(&self, key: &CredentialKey) -> Result<(), SessionStoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionStoreError::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ServiceEndpoints, Session};
    use crate::config::Config;

    fn key() -> CredentialKey {
        CredentialKey::new(Url::parse("https://bsky.social").unwrap(), "did:plc:alice")
    }

    fn record() -> CredentialRecord {
        let pds = Url::parse("https://bsky.social").unwrap();
        CredentialRecord {
            config: Config::default(),
            session: Session {
                account_identifier: "did:plc:alice".into(),
                access_jwt: "a.b.c".into(),
                refresh_jwt: "d.e.f".into(),
                handle: "alice.test".into(),
                did: "did:plc:alice".into(),
                app_password: "pw".into(),
            },
            endpoints: ServiceEndpoints {
                account_host: pds.clone(),
                data_host: Url::parse("https://pds.example").unwrap(),
                moderation_host: None,
            },
        }
    }

    #[test]
    fn file_names() {
        assert_eq!(key().file_name(), "bsky.social_alice_auth.json");
        let k = CredentialKey::new(
            Url::parse("http://localhost:2583/base/").unwrap(),
            "did:web:example.com",
        );
        assert_eq!(k.file_name(), "localhost_2583_base_did_web_example.com_auth.json");
    }

    #[tokio::test]
    async fn missing_record_leaves_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("cache"));
        assert!(store.get(&key()).await.unwrap().is_none());
        let placeholder = std::fs::read(store.path_for(&key())).unwrap();
        assert!(placeholder.is_empty());
        // Empty file still reads as absent.
        assert!(store.get(&key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_get_del() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        store.set(key(), record()).await.unwrap();
        assert_eq!(store.get(&key()).await.unwrap(), Some(record()));
        assert!(!store.path_for(&key()).with_extension("json.tmp").exists());

        store.del(&key()).await.unwrap();
        assert!(!store.path_for(&key()).exists());
        store.del(&key()).await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        std::fs::write(store.path_for(&key()), b"{not json").unwrap();
        assert!(matches!(
            store.get(&key()).await,
            Err(SessionStoreError::Serde(_))
        ));
    }
}
