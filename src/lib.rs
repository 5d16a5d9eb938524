//! Fluent one-shot HTTP calls with form-encoded parameters
//!
//! A [`RequestBuilder`] is bound to a URL and a method at construction,
//! collects parameters and an optional `Authorization` value, and performs
//! its round trip lazily the first time the status or the body is asked for.

pub mod network;

pub use network::{
    ConnectionError, HttpClient, HttpClientConfig, Method, Params, Request, RequestBuilder,
    Response, Transport,
};
