///Record declaring a social 'follow' relationship of another account. Duplicate follows will be ignored by the AppView.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub created_at: String,
    pub subject: String,
}
impl skyline_common::types::collection::Collection for Follow {
    const NSID: &'static str = "app.bsky.graph.follow";
}
