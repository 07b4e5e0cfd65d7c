///Record containing a Bluesky post.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[builder(start_fn = new)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    ///Client-declared timestamp when this post was originally created.
    #[builder(into)]
    pub created_at: String,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub embed: std::option::Option<PostRecordEmbed>,
    ///Annotations of text (mentions, URLs, hashtags, etc)
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub facets: std::option::Option<Vec<crate::app_bsky::richtext::facet::Facet>>,
    ///Indicates human language of post primary text content.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub langs: std::option::Option<Vec<String>>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub reply: std::option::Option<ReplyRef>,
    ///Additional hashtags, in addition to any included in post text and facets.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub tags: std::option::Option<Vec<String>>,
    ///The primary post content.
    #[builder(into)]
    pub text: String,
}
impl skyline_common::types::collection::Collection for Post {
    const NSID: &'static str = "app.bsky.feed.post";
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "$type")]
pub enum PostRecordEmbed {
    #[serde(rename = "app.bsky.embed.record")]
    Record(Box<crate::app_bsky::embed::record::Record>),
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRef {
    pub parent: crate::com_atproto::repo::strong_ref::StrongRef,
    pub root: crate::com_atproto::repo::strong_ref::StrongRef,
}
