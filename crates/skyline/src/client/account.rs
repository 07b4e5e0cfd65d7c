//! Per-account client: every domain call goes through the retry policy.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use skyline_api::app_bsky::actor::{ProfileViewDetailed, get_profile::GetProfile};
use skyline_api::app_bsky::embed::record::Record as EmbedRecord;
use skyline_api::app_bsky::feed::{
    like::Like,
    post::{Post, PostRecordEmbed, ReplyRef},
    repost::Repost,
};
use skyline_api::app_bsky::graph::{block::Block, follow::Follow};
use skyline_api::com_atproto::repo::{
    create_record::{CreateRecord, CreateRecordOutput},
    delete_record::{DeleteRecord, DeleteRecordOutput},
    get_record::{GetRecord, GetRecordOutput},
    strong_ref::StrongRef,
};
use skyline_api::tools_ozone::moderation::search_repos::{SearchRepos, SearchReposOutput};
use skyline_common::{
    AuthorizationToken,
    error::ClientError,
    http_client::HttpClient,
    session::SessionStore,
    types::collection::{Collection, split_at_uri},
    xrpc::{CallOptions, XrpcExt, XrpcRequest},
};
use tokio::sync::RwLock;
use url::Url;

use crate::client::{
    CredentialKey, CredentialRecord, DiscoveryError, Error, Result, RetryPolicy,
    ServiceEndpoints, Session, credential_session::refresh_session,
};
use crate::richtext::{ProfileLookup, resolve_facets};

/// Text and metadata for a new post.
///
/// Facets are derived from `text` when the post is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, bon::Builder)]
#[builder(start_fn = new)]
pub struct PostData {
    /// Post body
    #[builder(into)]
    pub text: String,
    /// Defaults to now
    pub created_at: Option<DateTime<Utc>>,
    /// BCP-47 language tags
    pub langs: Option<Vec<String>>,
    /// Post to quote, embedded as an `app.bsky.embed.record`
    pub quote: Option<StrongRef>,
}

#[derive(Debug, Clone, Copy)]
enum Route {
    Data,
    Moderation,
}

/// Client for one authenticated account.
///
/// Holds the account's [`CredentialRecord`]; every request reads its bearer token
/// from that one record, so a refresh is seen by all subsequent calls. The access
/// token is refreshed ahead of any call made within the expiry margin.
pub struct AccountClient<S, C> {
    store: Arc<S>,
    client: Arc<C>,
    record: RwLock<CredentialRecord>,
    retry: RetryPolicy,
}

impl<S, C> AccountClient<S, C> {
    pub(crate) fn new(store: Arc<S>, client: Arc<C>, record: CredentialRecord) -> Self {
        let retry = record.config.retry_policy();
        Self {
            store,
            client,
            record: RwLock::new(record),
            retry,
        }
    }

    /// Snapshot of the credential record.
    pub async fn record(&self) -> CredentialRecord {
        self.record.read().await.clone()
    }

    /// Snapshot of the session.
    pub async fn session(&self) -> Session {
        self.record.read().await.session.clone()
    }

    /// Discovered service endpoints.
    pub async fn endpoints(&self) -> ServiceEndpoints {
        self.record.read().await.endpoints.clone()
    }

    /// Account DID.
    pub async fn did(&self) -> String {
        self.record.read().await.session.did.clone()
    }

    /// Retry budget applied to each call.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &C {
        &self.client
    }
}

impl<S, C> AccountClient<S, C>
where
    S: SessionStore<CredentialKey, CredentialRecord>,
    C: HttpClient + Sync + Send,
{
    /// Refresh the session now and persist the new tokens.
    pub async fn refresh(&self) -> Result<()> {
        let mut record = self.record.write().await;
        refresh_session(self.client.as_ref(), self.store.as_ref(), &mut record).await
    }

    /// Forget the persisted credentials for this account.
    pub async fn logout(self) -> Result<()> {
        let key = self.record.into_inner().key();
        self.store.del(&key).await?;
        Ok(())
    }

    async fn ensure_fresh(&self) -> Result<()> {
        {
            let record = self.record.read().await;
            if !record
                .session
                .is_expired(record.config.expiry_margin_secs)?
            {
                return Ok(());
            }
        }
        let mut record = self.record.write().await;
        // Another call may have refreshed while we waited for the lock.
        if record
            .session
            .is_expired(record.config.expiry_margin_secs)?
        {
            refresh_session(self.client.as_ref(), self.store.as_ref(), &mut record).await?;
        }
        Ok(())
    }

    async fn target(&self, route: Route) -> Result<(Url, CallOptions)> {
        let record = self.record.read().await;
        let mut opts = CallOptions {
            auth: Some(AuthorizationToken::Bearer(record.session.access_jwt.clone())),
            ..Default::default()
        };
        let base = match route {
            Route::Data => record.endpoints.data_host.clone(),
            Route::Moderation => {
                let moderation = record.endpoints.moderation_host.as_ref().ok_or_else(|| {
                    DiscoveryError::NoModerationService {
                        did: record.session.did.clone(),
                    }
                })?;
                opts.atproto_proxy = Some(moderation.atproto_proxy.clone());
                moderation.url.clone()
            }
        };
        Ok((base, opts))
    }

    async fn call<R>(&self, context: String, route: Route, request: &R) -> Result<R::Output>
    where
        R: XrpcRequest + Sync,
    {
        self.ensure_fresh().await?;
        let (base, opts) = self.target(route).await?;
        let client = self.client.as_ref();
        self.retry
            .call(context, || {
                let base = base.clone();
                let opts = opts.clone();
                async move {
                    client
                        .xrpc(base)
                        .with_options(opts)
                        .send(request)
                        .await?
                        .into_output()
                }
            })
            .await
    }

    async fn create_record<T: Collection>(
        &self,
        context: String,
        collection: String,
        record: &T,
    ) -> Result<CreateRecordOutput> {
        let value = match record_value(record, &collection) {
            Ok(value) => value,
            Err(e) => {
                return Err(Error::Call {
                    context,
                    source: ClientError::Encode(e.into()),
                });
            }
        };
        let request = CreateRecord::new()
            .collection(collection)
            .repo(self.did().await)
            .record(value)
            .build();
        self.call(context, Route::Data, &request).await
    }

    async fn delete_record(
        &self,
        context: String,
        collection: impl Into<String>,
        rkey: impl Into<String>,
    ) -> Result<DeleteRecordOutput> {
        let request = DeleteRecord::new()
            .collection(collection)
            .repo(self.did().await)
            .rkey(rkey)
            .build();
        self.call(context, Route::Data, &request).await
    }

    async fn config_value<F: FnOnce(&crate::config::Config) -> String>(&self, f: F) -> String {
        f(&self.record.read().await.config)
    }

    /// Fetch a profile by DID or handle.
    pub async fn get_profile(&self, actor: &str) -> Result<ProfileViewDetailed> {
        let request = GetProfile::new().actor(actor).build();
        self.call(format!("error getting {actor} profile"), Route::Data, &request)
            .await
    }

    /// Fetch a post record.
    pub async fn get_post(&self, repo: &str, rkey: &str) -> Result<GetRecordOutput> {
        let collection = self.config_value(|c| c.posts_collection.clone()).await;
        let request = GetRecord::new()
            .collection(collection)
            .repo(repo)
            .rkey(rkey)
            .build();
        self.call("error getting post record".into(), Route::Data, &request)
            .await
    }

    /// Strong reference (uri + cid) to the post `repo`/`rkey`, e.g. for quoting.
    pub async fn post_ref(&self, repo: &str, rkey: &str) -> Result<StrongRef> {
        self.strong_ref("error getting post record", repo, rkey)
            .await
    }

    async fn strong_ref(&self, context: &str, repo: &str, rkey: &str) -> Result<StrongRef> {
        let record = self.get_post(repo, rkey).await?;
        record
            .strong_ref()
            .ok_or_else(|| Error::InvalidInput(format!("{context}: {} has no cid", record.uri)))
    }

    /// Build a post record, resolving facets from its text.
    pub async fn build_post(&self, data: PostData) -> Result<Post> {
        let facets = resolve_facets(&data.text, self).await?;
        let created_at = data
            .created_at
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        Ok(Post::new()
            .text(data.text)
            .created_at(created_at)
            .maybe_facets((!facets.is_empty()).then_some(facets))
            .maybe_langs(data.langs)
            .maybe_embed(
                data.quote
                    .map(|record| PostRecordEmbed::Record(Box::new(EmbedRecord { record }))),
            )
            .build())
    }

    /// Publish a new post.
    pub async fn create_post(&self, data: PostData) -> Result<CreateRecordOutput> {
        let post = self.build_post(data).await?;
        let collection = self.config_value(|c| c.posts_collection.clone()).await;
        self.create_record("error creating post".into(), collection, &post)
            .await
    }

    /// Reply to `parent`. When `root` is `None` the parent is taken as the thread root.
    pub async fn reply_post(
        &self,
        parent: StrongRef,
        root: Option<StrongRef>,
        data: PostData,
    ) -> Result<CreateRecordOutput> {
        let mut post = self.build_post(data).await?;
        post.reply = Some(ReplyRef {
            root: root.unwrap_or_else(|| parent.clone()),
            parent,
        });
        let collection = self.config_value(|c| c.posts_collection.clone()).await;
        self.create_record("error replying post".into(), collection, &post)
            .await
    }

    /// Delete one of this account's posts.
    pub async fn delete_post(&self, rkey: &str) -> Result<DeleteRecordOutput> {
        let collection = self.config_value(|c| c.posts_collection.clone()).await;
        self.delete_record("error deleting post".into(), collection, rkey)
            .await
    }

    /// Like the post `repo`/`rkey`.
    pub async fn like(&self, repo: &str, rkey: &str) -> Result<CreateRecordOutput> {
        let context = "error liking post";
        let subject = self.strong_ref(context, repo, rkey).await?;
        let like = Like {
            created_at: now(),
            subject,
        };
        let collection = self.config_value(|c| c.likes_collection.clone()).await;
        self.create_record(context.into(), collection, &like).await
    }

    /// Remove a like by its record key.
    pub async fn unlike(&self, rkey: &str) -> Result<DeleteRecordOutput> {
        let collection = self.config_value(|c| c.likes_collection.clone()).await;
        self.delete_record("error unliking post".into(), collection, rkey)
            .await
    }

    /// Like a labeler's service declaration.
    pub async fn like_labeler(&self, cid: &str, did: &str) -> Result<CreateRecordOutput> {
        let labeler_service = self.config_value(|c| c.labeler_service.clone()).await;
        let like = Like {
            created_at: now(),
            subject: StrongRef::new()
                .cid(cid)
                .uri(format!("at://{did}/{labeler_service}/self"))
                .build(),
        };
        let collection = self.config_value(|c| c.likes_collection.clone()).await;
        self.create_record("error liking labeler".into(), collection, &like)
            .await
    }

    /// Repost the post `repo`/`rkey`.
    pub async fn repost(&self, repo: &str, rkey: &str) -> Result<CreateRecordOutput> {
        let context = "error reposting post";
        let subject = self.strong_ref(context, repo, rkey).await?;
        let repost = Repost {
            created_at: now(),
            subject,
        };
        let collection = self.config_value(|c| c.reposts_collection.clone()).await;
        self.create_record(context.into(), collection, &repost)
            .await
    }

    /// Remove a repost by its record key.
    pub async fn undo_repost(&self, rkey: &str) -> Result<DeleteRecordOutput> {
        let collection = self.config_value(|c| c.reposts_collection.clone()).await;
        self.delete_record("error undoing repost".into(), collection, rkey)
            .await
    }

    async fn subject_did(&self, actor: &str) -> Result<String> {
        if actor.starts_with("did:") {
            Ok(actor.to_string())
        } else {
            Ok(self.get_profile(actor).await?.did)
        }
    }

    /// Follow an account by DID or handle.
    pub async fn follow(&self, actor: &str) -> Result<CreateRecordOutput> {
        let subject = self.subject_did(actor).await?;
        let follow = Follow {
            created_at: now(),
            subject: subject.clone(),
        };
        let collection = self.config_value(|c| c.graph_follow_lexicon.clone()).await;
        self.create_record(format!("error following DID {subject}"), collection, &follow)
            .await
    }

    /// Stop following an account. `Ok(None)` when there was no follow record.
    pub async fn unfollow(&self, actor: &str) -> Result<Option<DeleteRecordOutput>> {
        let profile = self.get_profile(actor).await?;
        let uri = profile.viewer.and_then(|v| v.following);
        self.delete_graph_record(format!("error unfollowing {actor}"), uri)
            .await
    }

    /// Block an account by DID or handle.
    pub async fn block(&self, actor: &str) -> Result<CreateRecordOutput> {
        let subject = self.subject_did(actor).await?;
        let block = Block {
            created_at: now(),
            subject: subject.clone(),
        };
        let collection = self.config_value(|c| c.graph_block_lexicon.clone()).await;
        self.create_record(format!("error blocking DID {subject}"), collection, &block)
            .await
    }

    /// Unblock an account. `Ok(None)` when there was no block record.
    pub async fn unblock(&self, actor: &str) -> Result<Option<DeleteRecordOutput>> {
        let profile = self.get_profile(actor).await?;
        let uri = profile.viewer.and_then(|v| v.blocking);
        self.delete_graph_record(format!("error unblocking {actor}"), uri)
            .await
    }

    async fn delete_graph_record(
        &self,
        context: String,
        uri: Option<String>,
    ) -> Result<Option<DeleteRecordOutput>> {
        let Some(uri) = uri else {
            return Ok(None);
        };
        let (_, collection, rkey) = split_at_uri(&uri)
            .ok_or_else(|| Error::InvalidInput(format!("{context}: invalid record uri {uri:?}")))?;
        self.delete_record(context, collection, rkey)
            .await
            .map(Some)
    }

    /// Search repositories through the moderation service.
    pub async fn search_repos(
        &self,
        q: &str,
        cursor: Option<String>,
        limit: Option<i64>,
    ) -> Result<SearchReposOutput> {
        let request = SearchRepos::new()
            .q(q.to_string())
            .maybe_cursor(cursor)
            .maybe_limit(limit)
            .build();
        self.call(
            format!("error while searching repos of {q}"),
            Route::Moderation,
            &request,
        )
        .await
    }
}

impl<S, C> ProfileLookup for AccountClient<S, C>
where
    S: SessionStore<CredentialKey, CredentialRecord>,
    C: HttpClient + Sync + Send,
{
    async fn resolve_did(&self, actor: &str) -> Result<String> {
        Ok(self.get_profile(actor).await?.did)
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Record value tagged with the configured collection as its `$type`.
fn record_value<T: Collection>(record: &T, collection: &str) -> serde_json::Result<Value> {
    let mut value = record.to_record()?;
    if let Value::Object(map) = &mut value {
        map.insert("$type".into(), Value::String(collection.to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_collection_wins() {
        let follow = Follow {
            created_at: "2024-01-01T00:00:00.000Z".into(),
            subject: "did:plc:bob".into(),
        };
        let value = record_value(&follow, "com.example.follow").unwrap();
        assert_eq!(value["$type"], "com.example.follow");
        assert_eq!(value["subject"], "did:plc:bob");
        assert_eq!(value["createdAt"], "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn post_data_builder() {
        let data = PostData::new().text("hello").build();
        assert_eq!(data.text, "hello");
        assert!(data.created_at.is_none());
        assert!(data.langs.is_none());
        assert!(data.quote.is_none());
    }
}
