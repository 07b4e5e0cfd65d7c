///Record representing a 'repost' of an existing Bluesky post.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Repost {
    pub created_at: String,
    pub subject: crate::com_atproto::repo::strong_ref::StrongRef,
}
impl skyline_common::types::collection::Collection for Repost {
    const NSID: &'static str = "app.bsky.feed.repost";
}
