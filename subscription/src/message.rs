use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Inbound control message delivered by the host.
///
/// Only `pause`, `stop`, `url` and `headers` have a meaning for the lifecycle.
/// Every other field of the inbound message is kept in `fields` so it can be
/// used as the context when rendering a templated URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// The operative instruction carried by a [`ControlMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Stop,
    Pause,
    /// (Re)connect, or resume a paused connection.
    Connect,
}

impl ControlMessage {
    /// A plain connect/resume message without overrides.
    pub fn connect() -> Self {
        Self::default()
    }

    pub fn pause() -> Self {
        Self {
            pause: Some(true),
            ..Self::default()
        }
    }

    pub fn stop() -> Self {
        Self {
            stop: Some(true),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// `stop` is evaluated before `pause`; anything else is a connect/resume.
    pub fn instruction(&self) -> Instruction {
        if self.stop == Some(true) {
            Instruction::Stop
        } else if self.pause == Some(true) {
            Instruction::Pause
        } else {
            Instruction::Connect
        }
    }

    /// URL override, treating an empty string as absent.
    pub fn url_override(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    /// Headers override, treating an empty mapping as absent.
    pub fn headers_override(&self) -> Option<&BTreeMap<String, String>> {
        self.headers.as_ref().filter(|headers| !headers.is_empty())
    }

    /// The whole message as a JSON object, used as the URL template context.
    pub fn template_context(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Outbound record emitted once per forwarded stream event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub event: String,
    pub payload: String,
}

impl EventRecord {
    pub fn new(event: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            payload: payload.into(),
        }
    }
}
