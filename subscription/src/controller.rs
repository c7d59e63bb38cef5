//! The subscription lifecycle state machine.

use crate::config::SubscriptionConfig;
use crate::filter::should_forward;
use crate::message::{ControlMessage, EventRecord, Instruction};
use crate::resolver::resolve;
use crate::status::{Host, Notice, Status};
use crate::stream::{ConnectionHandle, ConnectionId, StreamClient, StreamListener};
use crate::watchdog::{ArmId, TimeoutWatchdog, TimerService};
use log::*;
use std::mem;
use std::sync::Arc;

/// Externally observable subscription state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Disconnected,
    Connected,
    Paused,
}

struct Live {
    id: ConnectionId,
    handle: Box<dyn ConnectionHandle>,
}

impl Live {
    fn close(mut self) {
        debug!("Closing SSE connection {}", self.id);
        self.handle.close();
    }
}

/// A live connection only exists in the `Connected` and `Paused` phases.
enum Phase {
    Disconnected,
    Connected(Live),
    Paused(Live),
}

impl Phase {
    fn state(&self) -> SubscriptionState {
        match self {
            Phase::Disconnected => SubscriptionState::Disconnected,
            Phase::Connected(_) => SubscriptionState::Connected,
            Phase::Paused(_) => SubscriptionState::Paused,
        }
    }

    fn live(&self) -> Option<&Live> {
        match self {
            Phase::Disconnected => None,
            Phase::Connected(live) | Phase::Paused(live) => Some(live),
        }
    }
}

/// Owns the (at most one) live connection and the watchdog, and applies
/// control messages, stream callbacks and watchdog fires one at a time.
pub struct ConnectionController {
    config: SubscriptionConfig,
    client: Box<dyn StreamClient>,
    listener: Arc<dyn StreamListener>,
    watchdog: TimeoutWatchdog,
    host: Box<dyn Host>,
    phase: Phase,
    last_message: Option<ControlMessage>,
}

impl ConnectionController {
    pub fn new(
        config: SubscriptionConfig,
        client: Box<dyn StreamClient>,
        timers: Box<dyn TimerService>,
        listener: Arc<dyn StreamListener>,
        mut host: Box<dyn Host>,
    ) -> Self {
        host.status(Status::Idle);
        Self {
            config,
            client,
            listener,
            watchdog: TimeoutWatchdog::new(timers),
            host,
            phase: Phase::Disconnected,
            last_message: None,
        }
    }

    pub fn state(&self) -> SubscriptionState {
        self.phase.state()
    }

    pub fn connection_id(&self) -> Option<&ConnectionId> {
        self.phase.live().map(|live| &live.id)
    }

    pub fn is_watchdog_armed(&self) -> bool {
        self.watchdog.is_armed()
    }

    pub fn last_message(&self) -> Option<&ControlMessage> {
        self.last_message.as_ref()
    }

    /// Applies one control message.
    pub fn handle(&mut self, message: ControlMessage) {
        match message.instruction() {
            Instruction::Stop => self.stop(),
            Instruction::Pause => self.pause(),
            Instruction::Connect => self.connect(&message),
        }
    }

    pub fn on_open(&mut self, connection: &ConnectionId) {
        if !self.is_current(connection) {
            debug!("Ignoring open from stale connection {connection}");
            return;
        }
        if self.state() == SubscriptionState::Connected {
            info!("SSE connection {connection} open");
            self.host.status(Status::Connected);
        }
    }

    pub fn on_event(&mut self, connection: &ConnectionId, event_type: &str, data: &str) {
        if !self.is_current(connection) {
            trace!("Ignoring {event_type} event from stale connection {connection}");
            return;
        }
        if !should_forward(self.state(), event_type, &self.config.allowed_events) {
            trace!("Dropping {event_type} event");
            return;
        }

        self.arm_watchdog();
        self.host.forward(EventRecord::new(event_type, data));
    }

    /// Transport errors are reported but never close the connection.
    pub fn on_error(&mut self, connection: &ConnectionId, error: &str) {
        if !self.is_current(connection) {
            debug!("Ignoring error from stale connection {connection}: {error}");
            return;
        }
        error!("SSE connection {connection} error: {error}");
        self.host.status(Status::Error(error.to_string()));
        self.host.notify(Notice::error(error));
    }

    /// Replays the instruction that opened the current connection if `arm` is
    /// the pending watchdog arm.
    pub fn on_watchdog_fire(&mut self, arm: ArmId) {
        if !self.watchdog.fire(arm) {
            return;
        }

        warn!("No events for {:?}, restarting subscription", self.config.restart_after());
        self.host.status(Status::Restarting);
        let message = self.last_message.clone().unwrap_or_default();
        self.handle(message);
    }

    /// Tears everything down regardless of the current state.
    pub fn shutdown(&mut self) {
        self.watchdog.disarm();
        if let Some(live) = self.take_live() {
            live.close();
        }
        info!("Subscription shut down");
        self.host.status(Status::Disconnected);
    }

    fn stop(&mut self) {
        self.watchdog.disarm();
        match self.take_live() {
            Some(live) => {
                live.close();
                info!("Subscription stopped");
                self.host.status(Status::Disconnected);
            }
            None => debug!("Stop while disconnected, nothing to do"),
        }
    }

    fn pause(&mut self) {
        match mem::replace(&mut self.phase, Phase::Disconnected) {
            Phase::Connected(live) => {
                self.watchdog.disarm();
                info!("Subscription paused on connection {}", live.id);
                self.phase = Phase::Paused(live);
                self.host.status(Status::Paused);
            }
            Phase::Paused(live) => {
                debug!("Already paused");
                self.phase = Phase::Paused(live);
            }
            Phase::Disconnected => {
                self.host
                    .notify(Notice::info("pause ignored, subscription is not connected"));
            }
        }
    }

    fn connect(&mut self, message: &ControlMessage) {
        match mem::replace(&mut self.phase, Phase::Disconnected) {
            Phase::Paused(live) => {
                info!("Resuming subscription on connection {}", live.id);
                self.phase = Phase::Connected(live);
                self.arm_watchdog();
                self.host.status(Status::Connected);
            }
            Phase::Connected(live) => {
                // Every connect message is an intentional resubscribe.
                self.watchdog.disarm();
                live.close();
                self.open(message);
            }
            Phase::Disconnected => self.open(message),
        }
    }

    fn open(&mut self, message: &ControlMessage) {
        self.watchdog.disarm();

        let resolution = match resolve(&self.config, message) {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!("Cannot connect: {e}");
                self.host.status(Status::NoUrl);
                return;
            }
        };

        for notice in resolution.notices {
            warn!("{}", notice.text);
            self.host.notify(notice);
        }

        let id = ConnectionId::new();
        info!("Opening SSE connection {id} to {}", resolution.effective.url);
        let handle = self
            .client
            .open(id.clone(), &resolution.effective, self.listener.clone());
        self.phase = Phase::Connected(Live { id, handle });
        // A resume in place keeps the connection, so it never replaces this.
        self.last_message = Some(message.clone());
        self.arm_watchdog();
        self.host.status(Status::Connecting);
    }

    fn arm_watchdog(&mut self) {
        if let Some(after) = self.config.restart_after() {
            self.watchdog.arm(after);
        }
    }

    fn take_live(&mut self) -> Option<Live> {
        match mem::replace(&mut self.phase, Phase::Disconnected) {
            Phase::Disconnected => None,
            Phase::Connected(live) | Phase::Paused(live) => Some(live),
        }
    }

    fn is_current(&self, connection: &ConnectionId) -> bool {
        self.phase.live().is_some_and(|live| &live.id == connection)
    }
}

impl Drop for ConnectionController {
    fn drop(&mut self) {
        self.watchdog.disarm();
        if let Some(live) = self.take_live() {
            live.close();
        }
    }
}
