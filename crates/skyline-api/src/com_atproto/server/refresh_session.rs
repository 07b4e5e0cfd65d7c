///Refresh an authentication session. Requires auth using the 'refreshJwt' (not the 'accessJwt').
#[derive(serde::Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSession;
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSessionOutput {
    pub access_jwt: String,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub active: std::option::Option<bool>,
    pub did: String,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub did_doc: std::option::Option<serde_json::Value>,
    pub handle: String,
    pub refresh_jwt: String,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub status: std::option::Option<String>,
}
impl skyline_common::xrpc::XrpcRequest for RefreshSession {
    const NSID: &'static str = "com.atproto.server.refreshSession";
    const METHOD: skyline_common::xrpc::XrpcMethod =
        skyline_common::xrpc::XrpcMethod::Procedure("application/json");
    type Output = RefreshSessionOutput;
    fn encode_body(&self) -> Result<Vec<u8>, skyline_common::xrpc::EncodeError> {
        Ok(Vec::new())
    }
}
