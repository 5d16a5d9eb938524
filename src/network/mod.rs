pub mod http_client;
pub mod request;
pub mod response;

pub use http_client::{ConnectionError, HttpClient, HttpClientConfig, Result, Transport};
pub use request::{Method, Params, Request, RequestBuilder};
pub use response::{Response, STATUS_OK};
