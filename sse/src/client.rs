use crate::connection::SseConnection;
use log::*;
use std::sync::Arc;
use std::time::Duration;
use subscription::{ConnectionHandle, ConnectionId, EffectiveConfig, StreamClient, StreamListener};

/// Transport-level tuning that is not part of a subscription's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    /// Delay before reconnecting a dropped stream, until the server sends `retry:`.
    pub reconnect_interval: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            reconnect_interval: Duration::from_millis(1000),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP stream client. Each `open` spawns a task that keeps one event stream
/// alive until its handle is closed.
#[derive(Debug, Clone, Default)]
pub struct SseClient {
    settings: ClientSettings,
}

impl SseClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ClientSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }
}

impl StreamClient for SseClient {
    fn open(
        &mut self,
        connection: ConnectionId,
        config: &EffectiveConfig,
        listener: Arc<dyn StreamListener>,
    ) -> Box<dyn ConnectionHandle> {
        debug!("Spawning SSE stream {connection} for {}", config.url);
        Box::new(SseConnection::spawn(
            connection,
            config.clone(),
            self.settings,
            listener,
        ))
    }
}
