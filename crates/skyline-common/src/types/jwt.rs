//! Read-only inspection of session bearer tokens.
//!
//! Tokens are never verified here; the client only needs the expiry claim to
//! decide when to refresh.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Why a token payload could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum TokenError {
    /// Not three dot-separated segments
    #[error("token has {0} segment(s), expected 3")]
    #[diagnostic(code(skyline::token::segments))]
    Segments(usize),
    /// Payload segment is not base64url
    #[error("token payload is not base64url: {0}")]
    #[diagnostic(code(skyline::token::base64))]
    Base64(String),
    /// Payload is not a JSON object with an integer `exp`
    #[error("token payload is not a claims object: {0}")]
    #[diagnostic(
        code(skyline::token::claims),
        help("the payload must be a JSON object with an integer `exp` claim")
    )]
    Claims(String),
}

/// Claims carried in an access or refresh token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
    /// Issued-at, seconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Subject DID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<SmolStr>,
    /// Token scope (e.g. `com.atproto.access`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<SmolStr>,
    /// Audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<SmolStr>,
}

impl Claims {
    /// Decode the payload (second segment) of a three-part token.
    ///
    /// Trailing `=` padding is tolerated.
    pub fn decode(token: &str) -> Result<Self, TokenError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(TokenError::Segments(segments.len()));
        }
        let payload = URL_SAFE_NO_PAD
            .decode(segments[1].trim_end_matches('='))
            .map_err(|e| TokenError::Base64(e.to_string()))?;
        serde_json::from_slice(&payload).map_err(|e| TokenError::Claims(e.to_string()))
    }

    /// True iff `now >= exp - margin_secs`.
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        now >= self.exp.saturating_sub(margin_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with(payload: &serde_json::Value) -> String {
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("eyJhbGciOiJIUzI1NiJ9.{body}.c2ln")
    }

    #[test]
    fn decodes_expiry() {
        let token = token_with(&serde_json::json!({
            "scope": "com.atproto.access",
            "sub": "did:plc:alice",
            "iat": 1_700_000_000,
            "exp": 1_700_007_200
        }));
        let claims = Claims::decode(&token).unwrap();
        assert_eq!(claims.exp, 1_700_007_200);
        assert_eq!(claims.sub.as_deref(), Some("did:plc:alice"));
    }

    #[test]
    fn expiry_boundary_with_margin() {
        let claims = Claims {
            exp: 1_000,
            iat: None,
            sub: None,
            scope: None,
            aud: None,
        };
        assert!(!claims.expires_within(999, 0));
        assert!(claims.expires_within(1_000, 0));
        assert!(claims.expires_within(1_001, 0));
        assert!(!claims.expires_within(939, 60));
        assert!(claims.expires_within(940, 60));
    }

    #[test]
    fn padded_payload_is_accepted() {
        let body = base64::engine::general_purpose::URL_SAFE.encode(br#"{"exp":50}"#);
        assert!(body.ends_with('='));
        let claims = Claims::decode(&format!("a.{body}.c")).unwrap();
        assert_eq!(claims.exp, 50);
    }

    #[test]
    fn malformed_tokens_error() {
        assert_eq!(Claims::decode("onlyone"), Err(TokenError::Segments(1)));
        assert_eq!(Claims::decode("a.b.c.d"), Err(TokenError::Segments(4)));
        assert!(matches!(
            Claims::decode("a.!!!.c"),
            Err(TokenError::Base64(_))
        ));
        let not_json = URL_SAFE_NO_PAD.encode(b"hello");
        assert!(matches!(
            Claims::decode(&format!("a.{not_json}.c")),
            Err(TokenError::Claims(_))
        ));
        let no_exp = token_with(&serde_json::json!({"sub": "did:plc:alice"}));
        assert!(matches!(Claims::decode(&no_exp), Err(TokenError::Claims(_))));
        let float_exp = token_with(&serde_json::json!({"exp": 1.5}));
        assert!(matches!(
            Claims::decode(&float_exp),
            Err(TokenError::Claims(_))
        ));
    }
}
