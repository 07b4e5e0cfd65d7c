///Record declaring a 'block' relationship against another account.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub created_at: String,
    ///DID of the account to be blocked.
    pub subject: String,
}
impl skyline_common::types::collection::Collection for Block {
    const NSID: &'static str = "app.bsky.graph.block";
}
