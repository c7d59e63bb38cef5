//! Tokio runtime for one subscription.
//!
//! A single task owns the [`ConnectionController`]. Control messages, stream
//! callbacks and watchdog fires are all funnelled through one unbounded
//! mailbox, so they are applied one at a time in arrival order.

use crate::config::SubscriptionConfig;
use crate::controller::{ConnectionController, SubscriptionState};
use crate::error::{runtime_error, Error, RuntimeErrorKind};
use crate::message::ControlMessage;
use crate::status::Host;
use crate::stream::{ConnectionId, StreamClient, StreamListener};
use crate::watchdog::{ArmId, TimerGuard, TimerService};
use log::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

#[derive(Debug)]
enum Input {
    Control(ControlMessage),
    Opened(ConnectionId),
    Event {
        connection: ConnectionId,
        event_type: String,
        data: String,
    },
    Failed {
        connection: ConnectionId,
        error: String,
    },
    WatchdogFired(ArmId),
    Shutdown,
}

/// Posts stream callbacks into the mailbox.
struct MailboxListener {
    tx: mpsc::UnboundedSender<Input>,
}

impl MailboxListener {
    fn post(&self, input: Input) {
        if self.tx.send(input).is_err() {
            trace!("Subscription task gone, dropping stream callback");
        }
    }
}

impl StreamListener for MailboxListener {
    fn on_open(&self, connection: &ConnectionId) {
        self.post(Input::Opened(connection.clone()));
    }

    fn on_event(&self, connection: &ConnectionId, event_type: &str, data: &str) {
        self.post(Input::Event {
            connection: connection.clone(),
            event_type: event_type.to_string(),
            data: data.to_string(),
        });
    }

    fn on_error(&self, connection: &ConnectionId, error: &str) {
        self.post(Input::Failed {
            connection: connection.clone(),
            error: error.to_string(),
        });
    }
}

/// Watchdog timers backed by `tokio::time::sleep`.
struct TokioTimers {
    tx: mpsc::UnboundedSender<Input>,
}

struct TokioTimer {
    task: JoinHandle<()>,
}

impl TimerGuard for TokioTimer {
    fn cancel(&mut self) {
        self.task.abort();
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl TimerService for TokioTimers {
    fn start(&mut self, after: Duration, arm: ArmId) -> Box<dyn TimerGuard> {
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(Input::WatchdogFired(arm));
        });
        Box::new(TokioTimer { task })
    }
}

/// Handle to a running subscription.
///
/// Dropping the handle shuts the subscription down.
pub struct SubscriptionHandle {
    tx: mpsc::UnboundedSender<Input>,
    state: watch::Receiver<SubscriptionState>,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    /// Queues a control message.
    pub fn send(&self, message: ControlMessage) -> Result<(), Error> {
        self.tx
            .send(Input::Control(message))
            .map_err(|_| runtime_error(RuntimeErrorKind::Closed, "subscription task shut down"))
    }

    /// State after the most recently processed input.
    pub fn state(&self) -> SubscriptionState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<SubscriptionState> {
        self.state.clone()
    }

    /// Closes any live connection, cancels the watchdog and waits for the
    /// subscription task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.tx.send(Input::Shutdown);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Subscription task failed: {e}");
            }
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.tx.send(Input::Shutdown);
        }
    }
}

/// Spawns the subscription task. Must be called from within a tokio runtime.
pub fn spawn(
    config: SubscriptionConfig,
    client: Box<dyn StreamClient>,
    host: Box<dyn Host>,
) -> SubscriptionHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(SubscriptionState::Disconnected);

    let listener = Arc::new(MailboxListener { tx: tx.clone() });
    let timers = Box::new(TokioTimers { tx: tx.clone() });
    let controller = ConnectionController::new(config, client, timers, listener, host);

    let task = tokio::spawn(run(controller, rx, state_tx));

    SubscriptionHandle {
        tx,
        state: state_rx,
        task: Some(task),
    }
}

async fn run(
    mut controller: ConnectionController,
    mut rx: mpsc::UnboundedReceiver<Input>,
    state: watch::Sender<SubscriptionState>,
) {
    while let Some(input) = rx.recv().await {
        match input {
            Input::Control(message) => controller.handle(message),
            Input::Opened(connection) => controller.on_open(&connection),
            Input::Event {
                connection,
                event_type,
                data,
            } => controller.on_event(&connection, &event_type, &data),
            Input::Failed { connection, error } => controller.on_error(&connection, &error),
            Input::WatchdogFired(arm) => controller.on_watchdog_fire(arm),
            Input::Shutdown => {
                controller.shutdown();
                state.send_replace(controller.state());
                break;
            }
        }
        state.send_replace(controller.state());
    }
    debug!("Subscription task finished");
}
