//! The stream-client capability the controller drives.
//!
//! Implementations open one stream per call and report back through the
//! [`StreamListener`], tagging every callback with the [`ConnectionId`] the
//! stream was opened for. The controller uses that id to ignore callbacks
//! from connections it has already closed.

use crate::config::EffectiveConfig;
use std::fmt;
use std::sync::Arc;

/// Unique identifier for one opened stream (client-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receives the callbacks of opened streams.
pub trait StreamListener: Send + Sync {
    fn on_open(&self, connection: &ConnectionId);
    /// Every event type is delivered, including custom ones and `open`.
    fn on_event(&self, connection: &ConnectionId, event_type: &str, data: &str);
    fn on_error(&self, connection: &ConnectionId, error: &str);
}

/// Owned handle to one open stream.
pub trait ConnectionHandle: Send {
    /// Releases the underlying connection. Idempotent.
    fn close(&mut self);
}

pub trait StreamClient: Send {
    fn open(
        &mut self,
        connection: ConnectionId,
        config: &EffectiveConfig,
        listener: Arc<dyn StreamListener>,
    ) -> Box<dyn ConnectionHandle>;
}
