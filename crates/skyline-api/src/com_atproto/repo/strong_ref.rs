#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[builder(start_fn = new)]
#[serde(rename_all = "camelCase")]
pub struct StrongRef {
    #[builder(into)]
    pub cid: String,
    #[builder(into)]
    pub uri: String,
}
