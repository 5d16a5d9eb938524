//! HTTP Response handle for one-shot calls

use std::fmt;
use std::io::{Cursor, Read};

use super::http_client::Result;

/// The only status code treated as success
pub const STATUS_OK: u16 = 200;

/// Status line of a completed round trip plus the body, still unread
pub struct Response {
    status: u16,
    stream: Box<dyn Read + Send>,
}

impl Response {
    /// Wrap a status code and the stream the body will be read from
    pub fn new(status: u16, stream: impl Read + Send + 'static) -> Self {
        Self {
            status,
            stream: Box::new(stream),
        }
    }

    /// Build a response whose body is already in memory
    pub fn from_text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, Cursor::new(body.into().into_bytes()))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Drain the body and release the underlying connection.
    ///
    /// The payload is kept byte for byte, line separators included. Bytes
    /// that are not valid UTF-8 are replaced with U+FFFD.
    pub fn text(mut self) -> Result<String> {
        let mut bytes = Vec::new();
        self.stream.read_to_end(&mut bytes)?;

        log::info!("✅ Response received: {} bytes, status: {}", bytes.len(), self.status);

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
