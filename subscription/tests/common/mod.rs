#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use subscription::watchdog::{ArmId, TimerGuard, TimerService};
use subscription::{
    ConnectionHandle, ConnectionId, EffectiveConfig, EventRecord, Host, Notice, Status,
    StreamClient, StreamListener,
};

// Fake stream client

#[derive(Default)]
pub struct StreamLog {
    pub opened: Vec<(ConnectionId, EffectiveConfig)>,
    pub closed: Vec<ConnectionId>,
    pub listener: Option<Arc<dyn StreamListener>>,
}

impl StreamLog {
    /// Connections opened and not closed yet.
    pub fn live(&self) -> Vec<ConnectionId> {
        let closed: HashSet<_> = self.closed.iter().collect();
        self.opened
            .iter()
            .map(|(id, _)| id)
            .filter(|id| !closed.contains(id))
            .cloned()
            .collect()
    }

    pub fn last_opened(&self) -> Option<ConnectionId> {
        self.opened.last().map(|(id, _)| id.clone())
    }
}

pub struct FakeClient(pub Arc<Mutex<StreamLog>>);

struct FakeHandle {
    id: ConnectionId,
    log: Arc<Mutex<StreamLog>>,
    closed: bool,
}

impl ConnectionHandle for FakeHandle {
    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.lock().unwrap().closed.push(self.id.clone());
        }
    }
}

impl StreamClient for FakeClient {
    fn open(
        &mut self,
        connection: ConnectionId,
        config: &EffectiveConfig,
        listener: Arc<dyn StreamListener>,
    ) -> Box<dyn ConnectionHandle> {
        let mut log = self.0.lock().unwrap();
        log.opened.push((connection.clone(), config.clone()));
        log.listener = Some(listener);
        Box::new(FakeHandle {
            id: connection,
            log: self.0.clone(),
            closed: false,
        })
    }
}

// Fake timers

#[derive(Default)]
pub struct TimerLog {
    pub started: Vec<(ArmId, Duration)>,
    pub cancelled: Vec<ArmId>,
}

impl TimerLog {
    pub fn pending(&self) -> Vec<ArmId> {
        self.started
            .iter()
            .map(|(arm, _)| *arm)
            .filter(|arm| !self.cancelled.contains(arm))
            .collect()
    }
}

pub struct FakeTimers(pub Arc<Mutex<TimerLog>>);

struct FakeTimer {
    arm: ArmId,
    log: Arc<Mutex<TimerLog>>,
}

impl TimerGuard for FakeTimer {
    fn cancel(&mut self) {
        let mut log = self.log.lock().unwrap();
        if !log.cancelled.contains(&self.arm) {
            log.cancelled.push(self.arm);
        }
    }
}

impl TimerService for FakeTimers {
    fn start(&mut self, after: Duration, arm: ArmId) -> Box<dyn TimerGuard> {
        self.0.lock().unwrap().started.push((arm, after));
        Box::new(FakeTimer {
            arm,
            log: self.0.clone(),
        })
    }
}

// Recording host

#[derive(Default)]
pub struct HostLog {
    pub forwarded: Vec<EventRecord>,
    pub statuses: Vec<Status>,
    pub notices: Vec<Notice>,
}

impl HostLog {
    pub fn last_status(&self) -> Option<&Status> {
        self.statuses.last()
    }
}

pub struct RecordingHost(pub Arc<Mutex<HostLog>>);

impl Host for RecordingHost {
    fn forward(&mut self, record: EventRecord) {
        self.0.lock().unwrap().forwarded.push(record);
    }

    fn status(&mut self, status: Status) {
        self.0.lock().unwrap().statuses.push(status);
    }

    fn notify(&mut self, notice: Notice) {
        self.0.lock().unwrap().notices.push(notice);
    }
}

/// Listener for controllers driven directly by the test.
pub struct NullListener;

impl StreamListener for NullListener {
    fn on_open(&self, _connection: &ConnectionId) {}
    fn on_event(&self, _connection: &ConnectionId, _event_type: &str, _data: &str) {}
    fn on_error(&self, _connection: &ConnectionId, _error: &str) {}
}
