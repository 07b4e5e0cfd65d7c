#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, bon::Builder)]
#[builder(start_fn = new)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecord {
    ///The NSID of the record collection.
    #[builder(into)]
    pub collection: String,
    ///The record itself. Must contain a $type field.
    pub record: serde_json::Value,
    ///The handle or DID of the repo (aka, current account).
    #[builder(into)]
    pub repo: String,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub rkey: std::option::Option<String>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub validate: std::option::Option<bool>,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordOutput {
    pub cid: String,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub commit: std::option::Option<crate::com_atproto::repo::CommitMeta>,
    pub uri: String,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub validation_status: std::option::Option<String>,
}
impl skyline_common::xrpc::XrpcRequest for CreateRecord {
    const NSID: &'static str = "com.atproto.repo.createRecord";
    const METHOD: skyline_common::xrpc::XrpcMethod =
        skyline_common::xrpc::XrpcMethod::Procedure("application/json");
    type Output = CreateRecordOutput;
}
