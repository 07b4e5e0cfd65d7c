#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[builder(start_fn = new)]
#[serde(rename_all = "camelCase")]
pub struct GetProfile {
    ///Handle or DID of account to fetch profile of.
    #[builder(into)]
    pub actor: String,
}
impl skyline_common::xrpc::XrpcRequest for GetProfile {
    const NSID: &'static str = "app.bsky.actor.getProfile";
    const METHOD: skyline_common::xrpc::XrpcMethod = skyline_common::xrpc::XrpcMethod::Query;
    type Output = crate::app_bsky::actor::ProfileViewDetailed;
}
