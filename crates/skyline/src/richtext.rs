//! Rich text facets for post text
//!
//! Extraction finds links, mentions and hashtags by pattern and reports UTF-8
//! byte spans. Resolution turns them into `app.bsky.richtext.facet` values,
//! looking up a DID for each mention.

use std::future::Future;
use std::sync::LazyLock;

use regex::Regex;
use skyline_api::app_bsky::richtext::facet::{
    ByteSlice, Facet, FacetFeature, Link, Mention, Tag,
};

use crate::client::classify::{ErrorClass, TerminalKind};
use crate::client::error::Result;

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[-A-Za-z0-9+&@#/%?=~_|!:,.;()]+").expect("url pattern should compile")
});

static MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[a-zA-Z0-9.]+").expect("mention pattern should compile"));

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\B)#\S+").expect("tag pattern should compile"));

/// A matched span of text.
///
/// `start..end` are byte offsets into the original text and cover the whole
/// match, including any `@` or `#` sigil; `text` has the sigil stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetEntity {
    /// Inclusive start byte
    pub start: usize,
    /// Exclusive end byte
    pub end: usize,
    /// Matched text without its sigil
    pub text: String,
}

impl FacetEntity {
    fn index(&self) -> ByteSlice {
        ByteSlice {
            byte_start: self.start as i64,
            byte_end: self.end as i64,
        }
    }
}

fn extract(regex: &Regex, text: &str, sigil: Option<char>) -> Vec<FacetEntity> {
    regex
        .find_iter(text)
        .map(|m| {
            let matched = m.as_str();
            let stripped = match sigil {
                Some(sigil) => matched.strip_prefix(sigil).unwrap_or(matched),
                None => matched,
            };
            FacetEntity {
                start: m.start(),
                end: m.end(),
                text: stripped.to_string(),
            }
        })
        .collect()
}

/// Every `http(s)://` URL in `text`.
pub fn extract_links(text: &str) -> Vec<FacetEntity> {
    extract(&URL_REGEX, text, None)
}

/// Every `@handle` in `text`.
pub fn extract_mentions(text: &str) -> Vec<FacetEntity> {
    extract(&MENTION_REGEX, text, Some('@'))
}

/// Every `#tag` in `text` not directly preceded by a word character.
pub fn extract_tags(text: &str) -> Vec<FacetEntity> {
    extract(&TAG_REGEX, text, Some('#'))
}

/// Resolves a handle to the DID behind it.
#[trait_variant::make(Send)]
pub trait ProfileLookup {
    /// DID for `actor` (a handle or DID).
    fn resolve_did(&self, actor: &str) -> impl Future<Output = Result<String>>;
}

/// Build facets for `text`: links first, then mentions, then tags.
///
/// Mentions without a `.` are not handles and are skipped. A mention whose lookup
/// fails as not-found or invalid is dropped; any other lookup failure is returned.
/// Spans from different passes may overlap and are kept as found.
pub async fn resolve_facets<L>(text: &str, lookup: &L) -> Result<Vec<Facet>>
where
    L: ProfileLookup + Sync,
{
    let mut facets = Vec::new();

    for link in extract_links(text) {
        facets.push(Facet {
            index: link.index(),
            features: vec![FacetFeature::Link(Box::new(Link { uri: link.text }))],
        });
    }

    for mention in extract_mentions(text) {
        if !mention.text.contains('.') {
            continue;
        }
        let did = match lookup.resolve_did(&mention.text).await {
            Ok(did) => did,
            Err(e) => match e.class() {
                ErrorClass::Terminal(TerminalKind::NotFound | TerminalKind::InvalidIdentifier) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(handle = %mention.text, error = %e, "skipping unresolvable mention");
                    continue;
                }
                _ => return Err(e),
            },
        };
        facets.push(Facet {
            index: mention.index(),
            features: vec![FacetFeature::Mention(Box::new(Mention { did }))],
        });
    }

    for tag in extract_tags(text) {
        facets.push(Facet {
            index: tag.index(),
            features: vec![FacetFeature::Tag(Box::new(Tag { tag: tag.text }))],
        });
    }

    Ok(facets)
}

#[cfg(test)]
mod tests;
