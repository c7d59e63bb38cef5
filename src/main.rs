use log::*;
use service::{config::Config, logging::Logger};
use sse::{ClientSettings, SseClient};
use subscription::{runtime, ControlMessage, SubscriptionHandle};
use tokio::io::BufReader;

mod host;
mod input;

use host::ConsoleHost;
use input::pump;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
    }

    info!(
        "Starting SSE subscriber for {}",
        config.base_url().unwrap_or("<url from control messages>")
    );

    let client = SseClient::with_settings(ClientSettings {
        reconnect_interval: config.reconnect_interval(),
        ..ClientSettings::default()
    });
    let handle = runtime::spawn(
        config.subscription_config(),
        Box::new(client),
        Box::new(ConsoleHost::stdout()),
    );

    if config.connect_on_start() {
        send(&handle, ControlMessage::connect());
    }

    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received, shutting down"),
            Err(e) => error!("Failed to listen for interrupt, shutting down: {e}"),
        }
    };
    pump(BufReader::new(tokio::io::stdin()), interrupt, |message| {
        send(&handle, message)
    })
    .await;

    handle.shutdown().await;
}

fn send(handle: &SubscriptionHandle, message: ControlMessage) {
    if let Err(e) = handle.send(message) {
        error!("Failed to deliver control message: {e}");
    }
}
