///Find repositories based on a search term.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[builder(start_fn = new)]
#[serde(rename_all = "camelCase")]
pub struct SearchRepos {
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub cursor: std::option::Option<String>,
    ///Defaults to 50
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub limit: std::option::Option<i64>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub q: std::option::Option<String>,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchReposOutput {
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub cursor: std::option::Option<String>,
    pub repos: Vec<crate::tools_ozone::moderation::RepoView>,
}
impl skyline_common::xrpc::XrpcRequest for SearchRepos {
    const NSID: &'static str = "tools.ozone.moderation.searchRepos";
    const METHOD: skyline_common::xrpc::XrpcMethod = skyline_common::xrpc::XrpcMethod::Query;
    type Output = SearchReposOutput;
}
