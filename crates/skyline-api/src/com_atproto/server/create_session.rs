#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[builder(start_fn = new)]
#[serde(rename_all = "camelCase")]
pub struct CreateSession {
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub auth_factor_token: std::option::Option<String>,
    ///Handle or other identifier supported by the server for the authenticating user.
    #[builder(into)]
    pub identifier: String,
    #[builder(into)]
    pub password: String,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionOutput {
    pub access_jwt: String,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub active: std::option::Option<bool>,
    pub did: String,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub did_doc: std::option::Option<serde_json::Value>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub email: std::option::Option<String>,
    pub handle: String,
    pub refresh_jwt: String,
    ///If active=false, this optional field indicates a possible reason for why the account is not active.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub status: std::option::Option<String>,
}
impl skyline_common::xrpc::XrpcRequest for CreateSession {
    const NSID: &'static str = "com.atproto.server.createSession";
    const METHOD: skyline_common::xrpc::XrpcMethod =
        skyline_common::xrpc::XrpcMethod::Procedure("application/json");
    type Output = CreateSessionOutput;
}
