use core::fmt;

use serde::Serialize;
use serde_json::Value;

/// Trait for a collection of records that can be stored in a repository.
///
/// The records all have the same Lexicon schema.
///
/// Implemented on the record type itself.
pub trait Collection: fmt::Debug + Serialize {
    /// The NSID for the Lexicon that defines the schema of records in this collection.
    const NSID: &'static str;

    /// Serialize into a record value carrying the `$type` tag.
    fn to_record(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.insert("$type".into(), Value::String(Self::NSID.into()));
        }
        Ok(value)
    }
}

/// Split an `at://<authority>/<collection>/<rkey>` URI into its parts.
///
/// Returns `None` unless all three parts are present.
pub fn split_at_uri(uri: &str) -> Option<(&str, &str, &str)> {
    let rest = uri.strip_prefix("at://")?;
    let mut parts = rest.splitn(3, '/');
    let authority = parts.next().filter(|s| !s.is_empty())?;
    let collection = parts.next().filter(|s| !s.is_empty())?;
    let rkey = parts.next().filter(|s| !s.is_empty() && !s.contains('/'))?;
    Some((authority, collection, rkey))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize)]
    struct Note {
        text: &'static str,
    }

    impl Collection for Note {
        const NSID: &'static str = "com.example.note";
    }

    #[test]
    fn record_carries_type_tag() {
        let value = Note { text: "hi" }.to_record().unwrap();
        assert_eq!(
            value,
            serde_json::json!({"$type": "com.example.note", "text": "hi"})
        );
    }

    #[test]
    fn at_uri_parts() {
        assert_eq!(
            split_at_uri("at://did:plc:alice/app.bsky.feed.post/3k2a"),
            Some(("did:plc:alice", "app.bsky.feed.post", "3k2a"))
        );
        assert_eq!(split_at_uri("at://did:plc:alice/app.bsky.feed.post"), None);
        assert_eq!(split_at_uri("https://example.com/a/b"), None);
        assert_eq!(split_at_uri("at://did:plc:alice/c/r/extra"), None);
    }
}
