//! HTTP Request composition and the fluent one-shot builder

use std::fmt;

use url::form_urlencoded;

use super::http_client::{ConnectionError, HttpClientConfig, Result, Transport};
use super::response::{Response, STATUS_OK};

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_ACCEPT_CHARSET: &str = "Accept-Charset";
pub const HEADER_ACCEPT: &str = "Accept";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

pub const CHARSET_UTF8: &str = "UTF-8";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// HTTP methods a builder can be created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insertion-ordered parameter set with unique keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, replacing the value of an existing key in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as `application/x-www-form-urlencoded` (UTF-8, space as `+`)
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

/// A fully composed request, ready to go on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Request {
    /// Lay out method, URL, headers and body for the given parameters.
    ///
    /// GET carries the encoded parameters after `?` on the URL, POST sends
    /// them as a form body to the URL unchanged.
    pub fn compose(method: Method, url: &str, params: &Params, authorization: Option<&str>) -> Self {
        let encoded = params.encode();

        let mut headers = vec![
            (HEADER_ACCEPT_CHARSET.to_string(), CHARSET_UTF8.to_string()),
            (HEADER_ACCEPT.to_string(), CONTENT_TYPE_JSON.to_string()),
        ];
        if let Some(token) = authorization.filter(|t| !t.is_empty()) {
            headers.push((HEADER_AUTHORIZATION.to_string(), token.to_string()));
        }

        match method {
            Method::Get => Self {
                method,
                url: format!("{}?{}", url, encoded),
                headers,
                body: None,
            },
            Method::Post => {
                headers.push((HEADER_CONTENT_TYPE.to_string(), CONTENT_TYPE_FORM.to_string()));
                Self {
                    method,
                    url: url.to_string(),
                    headers,
                    body: Some(encoded),
                }
            }
        }
    }

    /// Look up a header by name, ignoring ASCII case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Progress of the single round trip a builder is allowed
enum Exchange {
    Unsent,
    Failed(ConnectionError),
    Open(Response),
    Drained { status: u16, body: String },
    Aborted { status: u16, error: ConnectionError },
}

/// Fluent builder for a single GET or POST call.
///
/// Parameters and authorization are gathered first. The first accessor
/// (`status_code`, `is_successful` or `body`) performs the call; every later
/// accessor answers from the memoized outcome without touching the network.
///
/// ```no_run
/// use dialonce_sdk::RequestBuilder;
///
/// let mut call = RequestBuilder::post("https://api.example.com/ivr/log")
///     .with_param("caller", "+33600000000")
///     .with_authorization("Bearer abc123");
///
/// if call.is_successful()? {
///     println!("{}", call.body()?);
/// }
/// # Ok::<(), dialonce_sdk::ConnectionError>(())
/// ```
pub struct RequestBuilder<T = HttpClientConfig> {
    url: String,
    method: Method,
    params: Params,
    authorization: Option<String>,
    transport: T,
    exchange: Exchange,
}

impl RequestBuilder<HttpClientConfig> {
    /// Create a GET call using the default client
    pub fn get(url: &str) -> Self {
        Self::get_with(url, HttpClientConfig::default())
    }

    /// Create a POST call using the default client
    pub fn post(url: &str) -> Self {
        Self::post_with(url, HttpClientConfig::default())
    }
}

impl<T: Transport> RequestBuilder<T> {
    pub fn get_with(url: &str, transport: T) -> Self {
        Self::new(url, Method::Get, transport)
    }

    pub fn post_with(url: &str, transport: T) -> Self {
        Self::new(url, Method::Post, transport)
    }

    fn new(url: &str, method: Method, transport: T) -> Self {
        Self {
            url: url.to_string(),
            method,
            params: Params::new(),
            authorization: None,
            transport,
            exchange: Exchange::Unsent,
        }
    }

    /// Add a parameter; a repeated key keeps its position and takes the new value
    pub fn with_param(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Set the `Authorization` header value, sent verbatim. Empty means none.
    pub fn with_authorization(mut self, token: &str) -> Self {
        self.authorization = Some(token.to_string());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref().filter(|t| !t.is_empty())
    }

    /// Whether the round trip has been attempted, successfully or not
    pub fn is_executed(&self) -> bool {
        !matches!(self.exchange, Exchange::Unsent)
    }

    /// The request as it would be sent now
    pub fn request(&self) -> Request {
        Request::compose(self.method, &self.url, &self.params, self.authorization())
    }

    /// True iff the server answered 200 OK
    pub fn is_successful(&mut self) -> Result<bool> {
        Ok(self.status_code()? == STATUS_OK)
    }

    pub fn status_code(&mut self) -> Result<u16> {
        self.send()
    }

    /// Full response payload, the server's error payload included.
    ///
    /// The connection is released as soon as the body has been drained.
    pub fn body(&mut self) -> Result<&str> {
        self.send()?;
        self.drain();

        match &self.exchange {
            Exchange::Drained { body, .. } => Ok(body.as_str()),
            Exchange::Failed(error) | Exchange::Aborted { error, .. } => Err(error.clone()),
            Exchange::Unsent | Exchange::Open(_) => Err(ConnectionError::ResponseReadError(
                "response body is not available".to_string(),
            )),
        }
    }

    fn send(&mut self) -> Result<u16> {
        match &self.exchange {
            Exchange::Open(response) => return Ok(response.status()),
            Exchange::Drained { status, .. } | Exchange::Aborted { status, .. } => return Ok(*status),
            Exchange::Failed(error) => return Err(error.clone()),
            Exchange::Unsent => {}
        }

        let request = self.request();
        log::debug!("Composed {} {} ({} params)", request.method, request.url, self.params.len());

        match self.transport.execute(&request) {
            Ok(response) => {
                let status = response.status();
                self.exchange = Exchange::Open(response);
                Ok(status)
            }
            Err(e) => {
                self.exchange = Exchange::Failed(e.clone());
                Err(e)
            }
        }
    }

    fn drain(&mut self) {
        if !matches!(self.exchange, Exchange::Open(_)) {
            return;
        }
        if let Exchange::Open(response) = std::mem::replace(&mut self.exchange, Exchange::Unsent) {
            let status = response.status();
            self.exchange = match response.text() {
                Ok(body) => Exchange::Drained { status, body },
                Err(e) => {
                    log::warn!("❌ Reading body of {} {} failed: {}", self.method, self.url, e);
                    Exchange::Aborted { status, error: e }
                }
            };
        }
    }
}

impl<T> fmt::Debug for RequestBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.exchange {
            Exchange::Unsent => "unsent",
            Exchange::Failed(_) => "failed",
            Exchange::Open(_) => "open",
            Exchange::Drained { .. } => "drained",
            Exchange::Aborted { .. } => "aborted",
        };
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("params", &self.params)
            .field("authorization", &self.authorization.as_ref().map(|_| "<redacted>"))
            .field("state", &state)
            .finish()
    }
}
