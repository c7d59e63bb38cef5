//! Lifecycle management for a single Server-Sent-Events subscription.
//!
//! A subscription is started, paused, resumed and stopped by discrete control
//! messages, and restarts itself when no event has been forwarded for a
//! configured period.
//!
//! # Architecture
//!
//! - **ConfigResolver** (`resolver`): merges the static configuration with the
//!   url/headers overrides of a control message. Static values win.
//! - **TimeoutWatchdog** (`watchdog`): one inactivity timer at most. A fire
//!   replays the last connect instruction.
//! - **EventDispatchFilter** (`filter`): drops events while not connected, the
//!   synthetic `open` event, and types outside the allow-list.
//! - **ConnectionController** (`controller`): the state machine owning the
//!   single live connection.
//!
//! The stream transport, the timer primitive and the host are injected
//! capabilities (`stream::StreamClient`, `watchdog::TimerService`,
//! `status::Host`), so the controller can be driven synchronously in tests.
//! `runtime::spawn` runs a controller on tokio behind a mailbox.
//!
//! # Example
//!
//! ```rust,ignore
//! use subscription::{runtime, ControlMessage, SubscriptionConfig};
//!
//! let handle = runtime::spawn(config, Box::new(client), Box::new(host));
//! handle.send(ControlMessage::connect().with_url("https://x/events"))?;
//! handle.send(ControlMessage::pause())?;
//! handle.shutdown().await;
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod message;
pub mod resolver;
pub mod runtime;
pub mod status;
pub mod stream;
pub mod template;
pub mod watchdog;

pub use config::{EffectiveConfig, SubscriptionConfig, TransportOptions};
pub use controller::{ConnectionController, SubscriptionState};
pub use message::{ControlMessage, EventRecord, Instruction};
pub use runtime::SubscriptionHandle;
pub use status::{Host, Notice, Severity, Status};
pub use stream::{ConnectionHandle, ConnectionId, StreamClient, StreamListener};
