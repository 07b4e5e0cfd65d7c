///A representation of a record embedded in a Bluesky record (eg, a post). For example, a quote-post.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub record: crate::com_atproto::repo::strong_ref::StrongRef,
}
