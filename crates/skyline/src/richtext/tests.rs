use super::*;
use crate::client::error::Error;
use http::StatusCode;
use skyline_common::error::{ClientError, HttpError};
use skyline_common::xrpc::GenericXrpcError;
use std::sync::Mutex;

fn invalid_request(message: &str) -> Error {
    Error::Call {
        context: "error getting profile".into(),
        source: ClientError::Xrpc(GenericXrpcError {
            error: "InvalidRequest".into(),
            message: Some(message.into()),
            nsid: "app.bsky.actor.getProfile",
            method: "GET",
            http_status: StatusCode::BAD_REQUEST,
        }),
    }
}

/// Answers from a fixed table and remembers what it was asked.
#[derive(Default)]
struct Directory {
    asked: Mutex<Vec<String>>,
}

impl ProfileLookup for Directory {
    async fn resolve_did(&self, actor: &str) -> Result<String> {
        self.asked.lock().unwrap().push(actor.to_string());
        match actor {
            "a.b" => Ok("did:plc:ab".into()),
            "alice.test" => Ok("did:plc:alice".into()),
            "ghost.test" => Err(invalid_request("Profile not found")),
            "bad..handle" => Err(invalid_request(
                "Error: actor must be a valid did or a handle",
            )),
            _ => Err(Error::TransientUpstream {
                context: "error getting profile".into(),
                attempts: 2,
                class: ErrorClass::TransientUpstream,
                source: ClientError::Http(HttpError {
                    status: StatusCode::BAD_GATEWAY,
                    body: None,
                }),
            }),
        }
    }
}

#[test]
fn spans_are_byte_offsets() {
    let text = "hi 👋 @a.b #x";

    let mentions = extract_mentions(text);
    assert_eq!(mentions.len(), 1);
    assert_eq!((mentions[0].start, mentions[0].end), (8, 12));
    assert_eq!(mentions[0].text, "a.b");
    assert_eq!(&text[mentions[0].start..mentions[0].end], "@a.b");

    let tags = extract_tags(text);
    assert_eq!(tags.len(), 1);
    assert_eq!((tags[0].start, tags[0].end), (13, 15));
    assert_eq!(tags[0].text, "x");
    assert_eq!(&text[tags[0].start..tags[0].end], "#x");

    assert!(extract_links(text).is_empty());
}

#[test]
fn links_are_greedy() {
    let text = "docs at https://example.com/a?b=c&d=(e), then more";
    let links = extract_links(text);
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].text, "https://example.com/a?b=c&d=(e),");
    assert_eq!(&text[links[0].start..links[0].end], links[0].text);
}

#[test]
fn tag_needs_non_word_before_hash() {
    assert!(extract_tags("issue#12").is_empty());
    let tags = extract_tags("#first and (#second)");
    let names: Vec<_> = tags.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(names, ["first", "second)"]);
}

#[test]
fn tag_after_non_ascii_letter() {
    let tags = extract_tags("日本語#タグ");
    assert_eq!(tags.len(), 1);
    assert_eq!((tags[0].start, tags[0].end), (9, 16));
    assert_eq!(tags[0].text, "タグ");

    let tags = extract_tags("café#x");
    assert_eq!(tags.len(), 1);
    assert_eq!((tags[0].start, tags[0].end), (5, 7));
    assert_eq!(tags[0].text, "x");
}

#[tokio::test]
async fn resolves_in_pass_order() {
    let text = "#go @alice.test https://example.com";
    let directory = Directory::default();
    let facets = resolve_facets(text, &directory).await.unwrap();

    assert_eq!(facets.len(), 3);
    assert!(matches!(&facets[0].features[0], FacetFeature::Link(l) if l.uri == "https://example.com"));
    assert!(matches!(&facets[1].features[0], FacetFeature::Mention(m) if m.did == "did:plc:alice"));
    assert!(matches!(&facets[2].features[0], FacetFeature::Tag(t) if t.tag == "go"));
    assert_eq!(
        facets[1].index,
        ByteSlice {
            byte_start: 4,
            byte_end: 15
        }
    );
}

#[tokio::test]
async fn dotless_mentions_are_not_looked_up() {
    let directory = Directory::default();
    let facets = resolve_facets("ping @everyone", &directory).await.unwrap();
    assert!(facets.is_empty());
    assert!(directory.asked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_and_invalid_handles_are_dropped() {
    let directory = Directory::default();
    let facets = resolve_facets("@ghost.test @bad..handle @a.b", &directory)
        .await
        .unwrap();
    assert_eq!(facets.len(), 1);
    assert!(matches!(&facets[0].features[0], FacetFeature::Mention(m) if m.did == "did:plc:ab"));
    assert_eq!(
        *directory.asked.lock().unwrap(),
        ["ghost.test", "bad..handle", "a.b"]
    );
}

#[tokio::test]
async fn other_lookup_failures_propagate() {
    let directory = Directory::default();
    let err = resolve_facets("hello @down.test", &directory)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TransientUpstream { attempts: 2, .. }));
}

#[tokio::test]
async fn overlapping_spans_are_kept() {
    let text = "see https://example.com/#frag";
    let directory = Directory::default();
    let facets = resolve_facets(text, &directory).await.unwrap();

    assert_eq!(facets.len(), 2);
    let link = &facets[0].index;
    let tag = &facets[1].index;
    assert_eq!((link.byte_start, link.byte_end), (4, 29));
    assert_eq!((tag.byte_start, tag.byte_end), (24, 29));
    assert!(matches!(&facets[1].features[0], FacetFeature::Tag(t) if t.tag == "frag"));
}
