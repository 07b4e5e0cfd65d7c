pub mod search_repos;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepoView {
    pub did: String,
    pub handle: String,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub indexed_at: std::option::Option<String>,
    #[serde(flatten)]
    pub extra_data: std::collections::BTreeMap<smol_str::SmolStr, serde_json::Value>,
}
