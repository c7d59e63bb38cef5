use crate::message::EventRecord;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Subscription status as shown to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Initial status, nothing has been requested yet.
    Idle,
    /// A connection was dispatched and has not reported open yet.
    Connecting,
    Connected,
    Paused,
    Disconnected,
    NoUrl,
    /// The watchdog fired and the last instruction is being replayed.
    Restarting,
    Error(String),
}

impl Status {
    pub fn severity(&self) -> Severity {
        match self {
            Status::Connecting | Status::Connected => Severity::Info,
            Status::Paused | Status::Restarting => Severity::Warn,
            Status::Idle | Status::Disconnected | Status::NoUrl | Status::Error(_) => {
                Severity::Error
            }
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "disconnected, waiting for input to start"),
            Status::Connecting => write!(f, "connecting"),
            Status::Connected => write!(f, "connected"),
            Status::Paused => write!(f, "paused"),
            Status::Disconnected => write!(f, "disconnected"),
            Status::NoUrl => write!(f, "no url"),
            Status::Restarting => write!(f, "timeout, restarting"),
            Status::Error(message) => write!(f, "error: {message}"),
        }
    }
}

/// A short message for the host's notice channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warn,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

/// Host side of a subscription: receives forwarded events, status changes and
/// notices (warnings and surfaced errors).
pub trait Host: Send {
    fn forward(&mut self, record: EventRecord);
    fn status(&mut self, status: Status);
    fn notify(&mut self, notice: Notice);
}
