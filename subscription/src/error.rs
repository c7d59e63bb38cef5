//! Error types for the `subscription` crate.
//!
//! Follows the same pattern as the other workspace crates with a root Error struct
//! and error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for the subscription crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in the subscription crate.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Configuration(ConfigurationErrorKind),
    Runtime(RuntimeErrorKind),
}

/// Errors produced while resolving the effective connection parameters.
#[derive(Debug, PartialEq)]
pub enum ConfigurationErrorKind {
    /// Neither the static configuration nor the control message carried a URL.
    NoUrl,
}

/// Errors from the subscription runtime.
#[derive(Debug, PartialEq)]
pub enum RuntimeErrorKind {
    /// The subscription task has already shut down.
    Closed,
}

impl Error {
    pub fn is_no_url(&self) -> bool {
        self.error_kind == ErrorKind::Configuration(ConfigurationErrorKind::NoUrl)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Configuration(ConfigurationErrorKind::NoUrl) => write!(f, "no url"),
            ErrorKind::Runtime(kind) => write!(f, "Subscription runtime error: {:?}", kind),
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

/// Helper function to create the "no url" configuration error.
pub fn no_url_error() -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::Configuration(ConfigurationErrorKind::NoUrl),
    }
}

/// Helper function to create runtime errors.
pub fn runtime_error(kind: RuntimeErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Runtime(kind),
    }
}
