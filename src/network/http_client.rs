//! Blocking HTTP/HTTPS client behind the request builder
//! Performs exactly one round trip per call and hands back the unread response

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use url::Url;

use super::request::{Method, Request};
use super::response::Response;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("dialonce-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Anything able to perform a single request/response round trip.
///
/// Implementors must not retry: one call to `execute` is one trip on the wire.
pub trait Transport {
    fn execute(&self, request: &Request) -> Result<Response>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &Request) -> Result<Response> {
        (**self).execute(request)
    }
}

/// A bare configuration acts as a transport by building its client on
/// first use, so that constructing a request never touches the network stack.
impl Transport for HttpClientConfig {
    fn execute(&self, request: &Request) -> Result<Response> {
        HttpClient::with_config(self.clone())?.execute(request)
    }
}

/// Blocking client backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ConnectionError::InvalidHeader(format!("User-Agent: {}", e)))?,
        );

        // Redirects, timeouts and pooling stay on reqwest's defaults.
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ConnectionError::ClientBuildError(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

impl Transport for HttpClient {
    fn execute(&self, request: &Request) -> Result<Response> {
        let url = Url::parse(&request.url)?;

        log::info!("🌐 {} request to: {}", request.method, url);

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };

        for (name, value) in &request.headers {
            let value = HeaderValue::from_str(value)
                .map_err(|e| ConnectionError::InvalidHeader(format!("{}: {}", name, e)))?;
            builder = builder.header(name.as_str(), value);
        }

        if let Some(body) = &request.body {
            log::debug!("📤 Writing {} byte form body", body.len());
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(|e| {
            log::warn!("❌ {} {} failed: {}", request.method, request.url, e);
            ConnectionError::from(e)
        })?;

        let status = response.status().as_u16();
        log::debug!("📥 Status {} from {}", status, request.url);

        Ok(Response::new(status, response))
    }
}

/// Errors that can occur while performing a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    InvalidUrl(String),
    InvalidHeader(String),
    ClientBuildError(String),
    RequestFailed(String),
    ResponseReadError(String),
}

impl std::fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl(e) => write!(f, "Invalid URL: {}", e),
            Self::InvalidHeader(e) => write!(f, "Invalid header: {}", e),
            Self::ClientBuildError(e) => write!(f, "Client build error: {}", e),
            Self::RequestFailed(e) => write!(f, "Request failed: {}", e),
            Self::ResponseReadError(e) => write!(f, "Response read error: {}", e),
        }
    }
}

impl std::error::Error for ConnectionError {}

impl From<reqwest::Error> for ConnectionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidUrl(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::ResponseReadError(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

impl From<url::ParseError> for ConnectionError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ConnectionError {
    fn from(err: std::io::Error) -> Self {
        Self::ResponseReadError(err.to_string())
    }
}

/// Result type for network calls
pub type Result<T> = std::result::Result<T, ConnectionError>;
