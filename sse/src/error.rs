//! Error types for the `sse` transport.
//!
//! Transport errors never cross the stream-client boundary as values: they are
//! rendered to text and reported through `StreamListener::on_error`. The kinds
//! below decide whether the connection retries or gives up.

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// A configured header name or value is not valid HTTP.
    InvalidHeader,
    /// The HTTP client could not be built (bad proxy URL, TLS setup).
    ClientBuild,
    /// The request could not be sent or the connection dropped.
    Request,
    /// The server answered with a status that ends the subscription.
    Status(u16),
    /// The server answered with something other than `text/event-stream`.
    ContentType(String),
    /// The event stream broke mid-way.
    Stream,
}

impl Error {
    /// Fatal errors end the connection instead of scheduling a reconnect.
    pub fn is_fatal(&self) -> bool {
        !matches!(self.error_kind, ErrorKind::Request | ErrorKind::Stream)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::InvalidHeader => write!(f, "invalid header")?,
            ErrorKind::ClientBuild => write!(f, "failed to build http client")?,
            ErrorKind::Request => write!(f, "request failed")?,
            ErrorKind::Status(code) => write!(f, "unexpected http status {code}")?,
            ErrorKind::ContentType(content_type) => {
                write!(f, "unexpected content type {content_type}")?
            }
            ErrorKind::Stream => write!(f, "event stream failed")?,
        }
        match &self.source {
            Some(source) => write!(f, ": {source}"),
            None => Ok(()),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::ClientBuild
        } else {
            ErrorKind::Request
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

/// Helper function to create errors without an underlying source error.
pub fn transport_error(kind: ErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: kind,
    }
}
