#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[builder(start_fn = new)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecord {
    #[builder(into)]
    pub collection: String,
    #[builder(into)]
    pub repo: String,
    #[builder(into)]
    pub rkey: String,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecordOutput {
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub commit: std::option::Option<crate::com_atproto::repo::CommitMeta>,
}
impl skyline_common::xrpc::XrpcRequest for DeleteRecord {
    const NSID: &'static str = "com.atproto.repo.deleteRecord";
    const METHOD: skyline_common::xrpc::XrpcMethod =
        skyline_common::xrpc::XrpcMethod::Procedure("application/json");
    type Output = DeleteRecordOutput;
}
