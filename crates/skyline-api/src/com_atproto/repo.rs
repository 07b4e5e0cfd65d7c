pub mod create_record;
pub mod delete_record;
pub mod get_record;
pub mod strong_ref;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommitMeta {
    pub cid: String,
    pub rev: String,
}
