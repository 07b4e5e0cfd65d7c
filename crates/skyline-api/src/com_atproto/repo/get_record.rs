#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[builder(start_fn = new)]
#[serde(rename_all = "camelCase")]
pub struct GetRecord {
    ///The CID of the version of the record. If not specified, then return the most recent version.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub cid: std::option::Option<String>,
    #[builder(into)]
    pub collection: String,
    ///The handle or DID of the repo.
    #[builder(into)]
    pub repo: String,
    #[builder(into)]
    pub rkey: String,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetRecordOutput {
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub cid: std::option::Option<String>,
    pub uri: String,
    pub value: serde_json::Value,
}
impl GetRecordOutput {
    /// Strong reference to this exact record version, if the server reported a CID.
    pub fn strong_ref(&self) -> std::option::Option<crate::com_atproto::repo::strong_ref::StrongRef> {
        self.cid.as_ref().map(|cid| crate::com_atproto::repo::strong_ref::StrongRef {
            cid: cid.clone(),
            uri: self.uri.clone(),
        })
    }
}
impl skyline_common::xrpc::XrpcRequest for GetRecord {
    const NSID: &'static str = "com.atproto.repo.getRecord";
    const METHOD: skyline_common::xrpc::XrpcMethod = skyline_common::xrpc::XrpcMethod::Query;
    type Output = GetRecordOutput;
}
