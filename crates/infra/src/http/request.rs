//! Fetch-style request inputs
//!
//! A logical fetch is replayed once per attempt, so the request is first
//! reduced to a [`PreparedRequest`] whose body is fully buffered.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Body, Method, Request};
use serde::Serialize;
use url::Url;

use super::agent::Scheme;
use super::error::FetchError;

/// What to fetch: a URL string, a parsed URL, or a complete request.
#[derive(Debug)]
pub enum FetchInput {
    Raw(String),
    Url(Url),
    Request(Request),
}

impl From<&str> for FetchInput {
    fn from(value: &str) -> Self {
        Self::Raw(value.to_string())
    }
}

impl From<String> for FetchInput {
    fn from(value: String) -> Self {
        Self::Raw(value)
    }
}

impl From<Url> for FetchInput {
    fn from(value: Url) -> Self {
        Self::Url(value)
    }
}

impl From<&Url> for FetchInput {
    fn from(value: &Url) -> Self {
        Self::Url(value.clone())
    }
}

impl From<Request> for FetchInput {
    fn from(value: Request) -> Self {
        Self::Request(value)
    }
}

/// Per-call request options. Values set here override those of a
/// [`FetchInput::Request`]; headers are merged, `init` winning on conflict.
#[derive(Debug, Clone, Default)]
pub struct RequestInit {
    pub method: Option<Method>,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl RequestInit {
    /// Empty options: the input's method, headers and body are kept.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the request method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set a header, replacing any previous value.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set a sensitive `Authorization: Bearer` header.
    ///
    /// # Errors
    /// Returns `FetchError::InvalidRequest` if `token` is not a valid header
    /// value.
    pub fn bearer_auth(self, token: &str) -> Result<Self, FetchError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            FetchError::InvalidRequest("access token is not a valid header value".into())
        })?;
        value.set_sensitive(true);
        Ok(self.header(AUTHORIZATION, value))
    }

    /// Replace the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, FetchError> {
        let encoded = serde_json::to_vec(value)
            .map_err(|err| FetchError::InvalidRequest(format!("failed to serialize body: {err}")))?;
        Ok(self.header(CONTENT_TYPE, HeaderValue::from_static("application/json")).body(encoded))
    }
}

/// A request that can be rebuilt for every attempt.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl PreparedRequest {
    /// Scheme that selects the agent for this request.
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        Scheme::from_url(&self.url)
    }

    /// Build a fresh `reqwest::Request` for one attempt.
    #[must_use]
    pub fn to_request(&self) -> Request {
        let mut request = Request::new(self.method.clone(), self.url.clone());
        *request.headers_mut() = self.headers.clone();
        if let Some(body) = &self.body {
            *request.body_mut() = Some(Body::from(body.clone()));
        }
        request
    }
}

impl FetchInput {
    /// Combine the input with `init` into a replayable request.
    pub fn prepare(self, init: RequestInit) -> Result<PreparedRequest, FetchError> {
        let (method, url, mut headers, body) = match self {
            Self::Raw(raw) => {
                let url = Url::parse(&raw).map_err(|err| {
                    FetchError::InvalidRequest(format!("invalid URL {raw:?}: {err}"))
                })?;
                (Method::GET, url, HeaderMap::new(), None)
            }
            Self::Url(url) => (Method::GET, url, HeaderMap::new(), None),
            Self::Request(request) => {
                let body = match request.body() {
                    None => None,
                    Some(body) => Some(body.as_bytes().map(Bytes::copy_from_slice).ok_or_else(
                        || {
                            FetchError::InvalidRequest(
                                "request body cannot be replayed; buffer the body to enable retries"
                                    .into(),
                            )
                        },
                    )?),
                };
                (request.method().clone(), request.url().clone(), request.headers().clone(), body)
            }
        };

        headers.extend(init.headers);

        Ok(PreparedRequest {
            method: init.method.unwrap_or(method),
            url,
            headers,
            body: init.body.or(body),
        })
    }
}
