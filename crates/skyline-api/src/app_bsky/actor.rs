pub mod get_profile;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileViewDetailed {
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub avatar: std::option::Option<String>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub banner: std::option::Option<String>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub created_at: std::option::Option<String>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub description: std::option::Option<String>,
    pub did: String,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub display_name: std::option::Option<String>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub followers_count: std::option::Option<i64>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub follows_count: std::option::Option<i64>,
    pub handle: String,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub indexed_at: std::option::Option<String>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub posts_count: std::option::Option<i64>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub viewer: std::option::Option<ViewerState>,
    #[serde(flatten)]
    pub extra_data: std::collections::BTreeMap<smol_str::SmolStr, serde_json::Value>,
}
///Metadata about the requesting account's relationship with the subject account. Only has meaningful content for authed requests.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub blocked_by: std::option::Option<bool>,
    ///AT-URI of the requesting account's block record for the subject.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub blocking: std::option::Option<String>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub followed_by: std::option::Option<String>,
    ///AT-URI of the requesting account's follow record for the subject.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub following: std::option::Option<String>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub muted: std::option::Option<bool>,
}
