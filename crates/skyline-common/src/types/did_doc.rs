use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;
use std::collections::BTreeMap;
use url::Url;

/// DID Document representation.
///
/// Only the fields the client reads are modeled explicitly. All other fields
/// are captured in `extra_data` so a document survives a load/save round trip.
///
/// Example
/// ```
/// use skyline_common::types::did_doc::DidDocument;
/// use serde_json::json;
/// let doc: DidDocument = serde_json::from_value(json!({
///   "id": "did:plc:alice",
///   "alsoKnownAs": ["at://alice.example"],
///   "service": [{"id":"#atproto_pds","type":"AtprotoPersonalDataServer","serviceEndpoint":"https://pds.example"}]
/// })).unwrap();
/// assert_eq!(doc.id.as_str(), "did:plc:alice");
/// assert!(doc.pds_endpoint().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(start_fn = new)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    /// Document identifier (e.g., `did:plc:...` or `did:web:...`)
    pub id: String,

    /// Alternate identifiers for the subject, such as at://<handle>
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub also_known_as: Option<Vec<String>>,

    /// Services associated with this DID (e.g., AtprotoPersonalDataServer)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<Service>>,

    /// Forward‑compatible capture of unmodeled fields
    #[serde(flatten)]
    #[builder(default)]
    pub extra_data: BTreeMap<SmolStr, Value>,
}

impl DidDocument {
    /// Service entries in document order.
    pub fn services(&self) -> &[Service] {
        self.service.as_deref().unwrap_or_default()
    }

    /// The AtprotoPersonalDataServer service endpoint, wherever it sits in the list.
    pub fn pds_endpoint(&self) -> Option<Url> {
        self.services()
            .iter()
            .find(|s| s.r#type == "AtprotoPersonalDataServer")
            .and_then(Service::endpoint_url)
    }
}

/// Service entry in a DID Document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(start_fn = new)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Service identifier, usually a fragment like `#atproto_pds`
    pub id: String,
    /// Service type (e.g., `AtprotoPersonalDataServer`)
    #[serde(rename = "type")]
    pub r#type: String,
    /// String or object; preserved as raw JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_endpoint: Option<Value>,

    /// Forward‑compatible capture of unmodeled fields
    #[serde(flatten)]
    #[builder(default)]
    pub extra_data: BTreeMap<SmolStr, Value>,
}

impl Service {
    /// Parse the endpoint as a `Url`.
    ///
    /// Accepts the endpoint as a string, or as an object with a `url` field.
    pub fn endpoint_url(&self) -> Option<Url> {
        match self.service_endpoint.as_ref()? {
            Value::String(s) => Url::parse(s).ok(),
            Value::Object(obj) => obj
                .get("url")
                .and_then(Value::as_str)
                .and_then(|s| Url::parse(s).ok()),
            _ => None,
        }
    }

    /// The service id as a fragment, always starting with `#`.
    pub fn fragment(&self) -> String {
        match self.id.rfind('#') {
            Some(idx) => self.id[idx..].to_string(),
            None => format!("#{}", self.id),
        }
    }
}
