//! HTTP Server-Sent Events transport for subscriptions.
//!
//! This crate implements the `subscription::StreamClient` capability on top of
//! `reqwest` and `eventsource-stream`.
//!
//! # Behaviour
//!
//! - **One task per stream**: `open` spawns a task owning the HTTP request;
//!   closing the returned handle aborts it.
//! - **Options honoured**: configured headers are sent on every request, the
//!   proxy URL is used for all schemes, certificate verification can be turned
//!   off, and a cookie store is kept when credentials are sent.
//! - **Reconnects**: a dropped stream is reopened after the server's `retry:`
//!   delay (or `ClientSettings::reconnect_interval`), sending `Last-Event-ID`.
//!   Every (re)opened stream reports `on_open`.
//! - **Fatal responses**: a non-success status, `204 No Content` or a body that
//!   is not `text/event-stream` is reported once through `on_error` and ends
//!   the stream task. Recovery is left to the subscription's watchdog or the
//!   next control message.
//! - **Event types**: events without an `event:` field are reported as
//!   `message`. No filtering happens here.
//!
//! # Modules
//!
//! - `client`: `SseClient` and `ClientSettings`
//! - `connection`: the per-stream task and its handle
//! - `error`: transport error kinds

pub mod client;
pub mod connection;
pub mod error;

pub use client::{ClientSettings, SseClient};
