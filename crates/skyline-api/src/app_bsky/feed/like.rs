///Record declaring a 'like' of a piece of subject content.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub created_at: String,
    pub subject: crate::com_atproto::repo::strong_ref::StrongRef,
}
impl skyline_common::types::collection::Collection for Like {
    const NSID: &'static str = "app.bsky.feed.like";
}
