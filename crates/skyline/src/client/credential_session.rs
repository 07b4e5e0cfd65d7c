use std::sync::Arc;

use skyline_api::com_atproto::server::{
    create_session::{CreateSession, CreateSessionOutput},
    refresh_session::RefreshSession,
};
use skyline_common::{
    AuthorizationToken,
    error::ClientError,
    http_client::HttpClient,
    session::SessionStore,
    types::did_doc::DidDocument,
    xrpc::XrpcExt,
};
use skyline_identity::{
    SkylineResolver,
    resolver::{IdentityResolver, ResolverOptions},
};

use crate::client::{
    AccountClient, CredentialKey, CredentialRecord, DiscoveryError, Error, Result,
    ServiceEndpoints, Session,
    classify::{ErrorClass, TerminalKind, classify},
};
use crate::config::Config;

/// Logs in with app passwords and keeps the persisted credential record current.
///
/// Every record lives in the [`SessionStore`] under a [`CredentialKey`]; the
/// manager reads it fresh on each [`obtain_client`](Self::obtain_client), so there
/// is no in-memory cache to go stale between runs.
pub struct SessionManager<S, C, R = SkylineResolver<Arc<C>>> {
    store: Arc<S>,
    client: Arc<C>,
    resolver: R,
}

impl<S, C> SessionManager<S, C>
where
    C: HttpClient + Sync,
{
    /// Manager resolving DID documents over the same HTTP client.
    pub fn new(store: Arc<S>, client: Arc<C>) -> Self {
        let resolver = SkylineResolver::new(client.clone(), ResolverOptions::default());
        Self {
            store,
            client,
            resolver,
        }
    }
}

impl<S, C, R> SessionManager<S, C, R> {
    /// Manager with a caller-supplied identity resolver.
    pub fn with_resolver(store: Arc<S>, client: Arc<C>, resolver: R) -> Self {
        Self {
            store,
            client,
            resolver,
        }
    }

    /// The credential store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The identity resolver used when login returns no DID document.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Whether the session's access token expires within `margin_secs`.
    pub fn is_expired(&self, session: &Session, margin_secs: i64) -> Result<bool> {
        session.is_expired(margin_secs)
    }
}

impl<S, C, R> SessionManager<S, C, R>
where
    S: SessionStore<CredentialKey, CredentialRecord>,
    C: HttpClient + Sync + Send,
    R: IdentityResolver + Sync,
{
    /// Log in with an app password, discover endpoints, and persist the record.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all, fields(account = %account, pds = %config.pds)))]
    pub async fn create_session(
        &self,
        account: &str,
        app_password: &str,
        config: &Config,
    ) -> Result<CredentialRecord> {
        let request = CreateSession::new()
            .identifier(account)
            .password(app_password)
            .build();
        let out = self
            .client
            .xrpc(config.pds.clone())
            .send(&request)
            .await
            .and_then(|resp| resp.into_output())
            .map_err(|e| auth_or_call("createSession", e))?;

        let doc = self.did_document(&out).await?;
        let endpoints = ServiceEndpoints::from_did_doc(config.pds.clone(), &out.did, &doc)?;
        #[cfg(feature = "tracing")]
        tracing::info!(did = %out.did, data_host = %endpoints.data_host, "session created");

        let record = CredentialRecord {
            config: config.clone(),
            session: Session::from_login(account, app_password, &out),
            endpoints,
        };
        self.store.set(record.key(), record.clone()).await?;
        Ok(record)
    }

    /// Exchange the refresh token for a new pair and persist it.
    pub async fn refresh(&self, record: &mut CredentialRecord) -> Result<()> {
        refresh_session(self.client.as_ref(), self.store.as_ref(), record).await
    }

    /// Load (or create) the account's credential record and wrap it in a client.
    ///
    /// A cached record whose access token is still outside the expiry margin costs
    /// no network calls. An expiring one is refreshed exactly once. A changed
    /// config or app password is written back even when nothing expired.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all, fields(account = %account)))]
    pub async fn obtain_client(
        &self,
        account: &str,
        app_password: &str,
        config: Config,
    ) -> Result<AccountClient<S, C>> {
        let key = CredentialKey::new(config.pds.clone(), account);
        let record = match self.store.get(&key).await? {
            Some(mut record) => {
                let mut dirty = false;
                if record.config != config {
                    record.config = config;
                    dirty = true;
                }
                if record.session.app_password != app_password {
                    record.session.app_password = app_password.to_string();
                    dirty = true;
                }

                if record
                    .session
                    .is_expired(record.config.expiry_margin_secs)?
                {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("cached session expiring, refreshing");
                    self.refresh(&mut record).await?;
                } else if dirty {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("cached session reused, settings changed");
                    self.store.set(key, record.clone()).await?;
                } else {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("cached session reused");
                }
                record
            }
            None => self.create_session(account, app_password, &config).await?,
        };

        Ok(AccountClient::new(
            self.store.clone(),
            self.client.clone(),
            record,
        ))
    }

    async fn did_document(&self, out: &CreateSessionOutput) -> Result<DidDocument> {
        if let Some(value) = &out.did_doc {
            return serde_json::from_value(value.clone()).map_err(|source| {
                DiscoveryError::Malformed {
                    did: out.did.clone(),
                    source,
                }
                .into()
            });
        }
        self.resolver
            .resolve_did_doc_owned(&out.did)
            .await
            .map_err(|source| {
                DiscoveryError::Resolve {
                    did: out.did.clone(),
                    source,
                }
                .into()
            })
    }
}

/// `refreshSession` against the record's account host, then persist.
///
/// Shared by [`SessionManager`] and [`AccountClient`] so both paths install and
/// save tokens the same way.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all, fields(did = %record.session.did)))]
pub(crate) async fn refresh_session<S, C>(
    client: &C,
    store: &S,
    record: &mut CredentialRecord,
) -> Result<()>
where
    S: SessionStore<CredentialKey, CredentialRecord> + ?Sized,
    C: HttpClient + Sync,
{
    let out = client
        .xrpc(record.endpoints.account_host.clone())
        .auth(AuthorizationToken::Bearer(record.session.refresh_jwt.clone()))
        .send(&RefreshSession)
        .await
        .and_then(|resp| resp.into_output())
        .map_err(|e| auth_or_call("refreshSession", e))?;

    record.session.apply_refresh(out);
    store.set(record.key(), record.clone()).await?;
    #[cfg(feature = "tracing")]
    tracing::info!("session refreshed");
    Ok(())
}

fn auth_or_call(context: &'static str, source: ClientError) -> Error {
    match classify(&source) {
        ErrorClass::Terminal(TerminalKind::Authentication) => {
            Error::Authentication { context, source }
        }
        _ => Error::Call {
            context: format!("error calling {context}"),
            source,
        },
    }
}
