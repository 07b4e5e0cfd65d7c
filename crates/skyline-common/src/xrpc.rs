//! XRPC request/response plumbing
//!
//! A request type carries its own NSID, HTTP method and output type. Calls are
//! assembled with [`XrpcExt::xrpc`] on any [`HttpClient`], which builds the HTTP
//! request, sends it, and hands back a [`Response`] owning the body buffer.

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use http::{
    HeaderName, HeaderValue, Request, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use url::Url;

use crate::AuthorizationToken;
use crate::error::{AuthError, DecodeError, TransportError, XrpcResult};
use crate::http_client::HttpClient;

/// Error type for encoding XRPC requests
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum EncodeError {
    /// Failed to serialize query parameters
    #[error("Failed to serialize query: {0}")]
    Query(
        #[from]
        #[source]
        serde_html_form::ser::Error,
    ),
    /// Failed to serialize JSON body
    #[error("Failed to serialize JSON: {0}")]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
}

/// XRPC method type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XrpcMethod {
    /// Query (HTTP GET)
    Query,
    /// Procedure (HTTP POST)
    Procedure(&'static str),
}

impl XrpcMethod {
    /// Get the HTTP method string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "GET",
            Self::Procedure(_) => "POST",
        }
    }
}

/// Trait for XRPC request types (queries and procedures)
///
/// Implemented on the request parameters/input type itself.
pub trait XrpcRequest: Serialize {
    /// The NSID for this XRPC method
    const NSID: &'static str;
    /// XRPC method (query/GET or procedure/POST)
    const METHOD: XrpcMethod;
    /// Decoded success body
    type Output: DeserializeOwned;

    /// Encode the request body for procedures.
    ///
    /// Default implementation serializes to JSON.
    fn encode_body(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Output type for procedures that return no body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoOutput;

impl<'de> Deserialize<'de> for NoOutput {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(NoOutput)
    }
}

/// Per-request options for XRPC calls.
#[derive(Debug, Default, Clone)]
pub struct CallOptions {
    /// Optional Authorization to apply.
    pub auth: Option<AuthorizationToken>,
    /// `atproto-proxy` header value.
    pub atproto_proxy: Option<String>,
}

/// Extension for stateless XRPC calls on any `HttpClient`.
///
/// Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use skyline_common::xrpc::XrpcExt;
///
/// let http = reqwest::Client::new();
/// let base = url::Url::parse("https://public.api.bsky.app")?;
/// // let resp = http.xrpc(base).send(&request).await?;
/// # Ok(())
/// # }
/// ```
pub trait XrpcExt: HttpClient {
    /// Start building an XRPC call for the given base URL.
    fn xrpc(&self, base: Url) -> XrpcCall<'_, Self>
    where
        Self: Sized,
    {
        XrpcCall {
            client: self,
            base,
            opts: CallOptions::default(),
        }
    }
}

impl<T: HttpClient> XrpcExt for T {}

/// Stateless XRPC call builder.
pub struct XrpcCall<'a, C: HttpClient> {
    pub(crate) client: &'a C,
    pub(crate) base: Url,
    pub(crate) opts: CallOptions,
}

impl<'a, C: HttpClient> XrpcCall<'a, C> {
    /// Apply Authorization to this call.
    pub fn auth(mut self, token: AuthorizationToken) -> Self {
        self.opts.auth = Some(token);
        self
    }
    /// Replace the builder's options entirely.
    pub fn with_options(mut self, opts: CallOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Send the given typed XRPC request and return a response wrapper.
    ///
    /// A 401 carrying a `WWW-Authenticate` header surfaces as
    /// `ClientError::Auth(AuthError::Other(header))`; otherwise 400/401 bodies flow
    /// through to [`Response`] for parsing.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, request), fields(nsid = R::NSID)))]
    pub async fn send<R>(self, request: &R) -> XrpcResult<Response<R>>
    where
        R: XrpcRequest,
    {
        let http_request = build_http_request(&self.base, request, &self.opts)?;

        let http_response = self
            .client
            .send_http(http_request)
            .await
            .map_err(TransportError::from_client)?;

        process_response(http_response)
    }
}

/// Process the HTTP response from the server into an xrpc response statelessly.
#[inline]
pub fn process_response<R>(http_response: http::Response<Vec<u8>>) -> XrpcResult<Response<R>>
where
    R: XrpcRequest,
{
    let status = http_response.status();
    if status.as_u16() == 401 {
        if let Some(hv) = http_response.headers().get(http::header::WWW_AUTHENTICATE) {
            return Err(AuthError::Other(hv.clone()).into());
        }
    }
    let buffer = Bytes::from(http_response.into_body());

    if !status.is_success() && !matches!(status.as_u16(), 400 | 401) {
        return Err(crate::error::HttpError {
            status,
            body: Some(buffer),
        }
        .into());
    }

    Ok(Response::new(buffer, status))
}

/// HTTP headers commonly used in XRPC requests
pub enum Header {
    /// Content-Type header
    ContentType,
    /// Authorization header
    Authorization,
    /// `atproto-proxy` header - specifies which service the user's PDS should forward requests to.
    ///
    /// See: <https://atproto.com/specs/xrpc#service-proxying>
    AtprotoProxy,
}

impl From<Header> for HeaderName {
    fn from(value: Header) -> Self {
        match value {
            Header::ContentType => CONTENT_TYPE,
            Header::Authorization => AUTHORIZATION,
            Header::AtprotoProxy => HeaderName::from_static("atproto-proxy"),
        }
    }
}

/// Build an HTTP request for an XRPC call given base URL and options
pub fn build_http_request<R>(
    base: &Url,
    req: &R,
    opts: &CallOptions,
) -> core::result::Result<Request<Vec<u8>>, TransportError>
where
    R: XrpcRequest,
{
    let mut url = base.clone();
    let mut path = url.path().trim_end_matches('/').to_owned();
    path.push_str("/xrpc/");
    path.push_str(R::NSID);
    url.set_path(&path);

    if let XrpcMethod::Query = R::METHOD {
        let qs = serde_html_form::to_string(req)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        if !qs.is_empty() {
            url.set_query(Some(&qs));
        } else {
            url.set_query(None);
        }
    }

    let method = match R::METHOD {
        XrpcMethod::Query => http::Method::GET,
        XrpcMethod::Procedure(_) => http::Method::POST,
    };

    let body = if let XrpcMethod::Procedure(_) = R::METHOD {
        req.encode_body()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?
    } else {
        vec![]
    };

    let mut builder = Request::builder().method(method).uri(url.as_str());

    // Input-less procedures (refreshSession) go out without a content type.
    if let XrpcMethod::Procedure(encoding) = R::METHOD {
        if !body.is_empty() {
            builder = builder.header(Header::ContentType, encoding);
        }
    }
    builder = builder.header(http::header::ACCEPT, "application/json");

    if let Some(token) = &opts.auth {
        let hv = match token {
            AuthorizationToken::Bearer(t) => HeaderValue::from_str(&format!("Bearer {t}")),
        }
        .map_err(|e| TransportError::InvalidRequest(format!("Invalid authorization token: {e}")))?;
        builder = builder.header(Header::Authorization, hv);
    }

    if let Some(proxy) = &opts.atproto_proxy {
        builder = builder.header(Header::AtprotoProxy, proxy.as_str());
    }

    builder
        .body(body)
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))
}

/// XRPC response wrapper that owns the response buffer
pub struct Response<R>
where
    R: XrpcRequest,
{
    _marker: PhantomData<fn() -> R>,
    buffer: Bytes,
    status: StatusCode,
}

impl<R> Response<R>
where
    R: XrpcRequest,
{
    /// Create a new response from a buffer and status code
    pub fn new(buffer: Bytes, status: StatusCode) -> Self {
        Self {
            buffer,
            status,
            _marker: PhantomData,
        }
    }

    /// Get the HTTP status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the raw buffer
    pub fn buffer(&self) -> &Bytes {
        &self.buffer
    }

    /// Parse the response body as the request's output, or as an XRPC error.
    pub fn parse(&self) -> Result<R::Output, XrpcError> {
        // 200: parse as output
        if self.status.is_success() {
            let body: &[u8] = if self.buffer.is_empty() {
                b"{}"
            } else {
                &self.buffer
            };
            return serde_json::from_slice(body).map_err(|e| XrpcError::Decode(e.into()));
        }

        let mut generic = match serde_json::from_slice::<GenericXrpcError>(&self.buffer) {
            Ok(generic) => generic,
            Err(e) => return Err(XrpcError::Decode(DecodeError::Json(e))),
        };
        generic.nsid = R::NSID;
        generic.method = R::METHOD.as_str();
        generic.http_status = self.status;

        match (self.status.as_u16(), generic.error.as_str()) {
            (_, "ExpiredToken") => Err(XrpcError::Auth(AuthError::TokenExpired)),
            (_, "InvalidToken") => Err(XrpcError::Auth(AuthError::InvalidToken)),
            // 401: always auth error
            (401, _) => Err(XrpcError::Auth(AuthError::Rejected(generic))),
            _ => Err(XrpcError::Generic(generic)),
        }
    }

    /// Parse the response into its output, folding XRPC errors into [`crate::error::ClientError`].
    pub fn into_output(self) -> XrpcResult<R::Output> {
        Ok(self.parse()?)
    }
}

/// Generic XRPC error body (`{"error": "...", "message": "..."}`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenericXrpcError {
    /// Error code (e.g., "InvalidRequest")
    pub error: SmolStr,
    /// Optional error message with details
    pub message: Option<SmolStr>,
    /// XRPC method NSID that produced this error (context only; not serialized)
    #[serde(skip)]
    pub nsid: &'static str,
    /// HTTP method used (GET/POST) (context only; not serialized)
    #[serde(skip)]
    pub method: &'static str,
    /// HTTP status code (context only; not serialized)
    #[serde(skip)]
    pub http_status: StatusCode,
}

impl fmt::Display for GenericXrpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(msg) = &self.message {
            write!(
                f,
                "{}: {} (nsid={}, method={}, status={})",
                self.error, msg, self.nsid, self.method, self.http_status
            )
        } else {
            write!(
                f,
                "{} (nsid={}, method={}, status={})",
                self.error, self.nsid, self.method, self.http_status
            )
        }
    }
}

impl std::error::Error for GenericXrpcError {}

/// XRPC errors decoded from a response body
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum XrpcError {
    /// Authentication error (ExpiredToken, InvalidToken, rejected credentials)
    #[error("Authentication error: {0}")]
    #[diagnostic(code(skyline_common::xrpc::auth))]
    Auth(#[from] AuthError),

    /// Generic XRPC error (e.g., InvalidRequest, UpstreamFailure)
    #[error("XRPC error: {0}")]
    #[diagnostic(code(skyline_common::xrpc::generic))]
    Generic(GenericXrpcError),

    /// Failed to decode the response body
    #[error("Failed to decode response: {0}")]
    #[diagnostic(code(skyline_common::xrpc::decode))]
    Decode(#[from] DecodeError),
}
