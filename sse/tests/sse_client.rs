use mockito::{Matcher, Server};
use sse::{ClientSettings, SseClient};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use subscription::{ConnectionId, EffectiveConfig, StreamClient, StreamListener, TransportOptions};
use tokio::sync::mpsc;
use tokio::time::timeout;

#[derive(Debug, Clone, PartialEq)]
enum Signal {
    Open,
    Event(String, String),
    Error(String),
}

struct ChannelListener {
    tx: mpsc::UnboundedSender<Signal>,
}

impl StreamListener for ChannelListener {
    fn on_open(&self, _connection: &ConnectionId) {
        let _ = self.tx.send(Signal::Open);
    }

    fn on_event(&self, _connection: &ConnectionId, event_type: &str, data: &str) {
        let _ = self
            .tx
            .send(Signal::Event(event_type.to_string(), data.to_string()));
    }

    fn on_error(&self, _connection: &ConnectionId, error: &str) {
        let _ = self.tx.send(Signal::Error(error.to_string()));
    }
}

fn listener() -> (Arc<dyn StreamListener>, mpsc::UnboundedReceiver<Signal>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(ChannelListener { tx }), rx)
}

fn effective(url: String, headers: &[(&str, &str)]) -> EffectiveConfig {
    EffectiveConfig {
        url,
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
        options: TransportOptions::default(),
    }
}

fn client(reconnect_interval: Duration) -> SseClient {
    SseClient::with_settings(ClientSettings {
        reconnect_interval,
        ..ClientSettings::default()
    })
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Signal>) -> Option<Signal> {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("Timed out waiting for a stream signal")
}

#[tokio::test]
async fn delivers_open_and_typed_events_with_configured_headers() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/events")
        .match_header("x-token", "abc")
        .match_header("accept", "text/event-stream")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body("event: price\ndata: 42\n\n: keep-alive\n\ndata: plain\n\nevent: open\ndata: x\n\n")
        .create_async()
        .await;

    let (listener, mut rx) = listener();
    let mut handle = client(Duration::from_secs(60)).open(
        ConnectionId::new(),
        &effective(format!("{}/events", server.url()), &[("x-token", "abc")]),
        listener,
    );

    assert_eq!(next(&mut rx).await, Some(Signal::Open));
    assert_eq!(
        next(&mut rx).await,
        Some(Signal::Event("price".to_string(), "42".to_string()))
    );
    assert_eq!(
        next(&mut rx).await,
        Some(Signal::Event("message".to_string(), "plain".to_string()))
    );
    // Named "open" events are delivered; filtering them is the subscription's job.
    assert_eq!(
        next(&mut rx).await,
        Some(Signal::Event("open".to_string(), "x".to_string()))
    );

    handle.close();
}

#[tokio::test]
async fn error_status_is_reported_once_and_ends_the_stream() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/events")
        .with_status(500)
        .create_async()
        .await;

    let (listener, mut rx) = listener();
    let _handle = client(Duration::from_millis(10)).open(
        ConnectionId::new(),
        &effective(format!("{}/events", server.url()), &[]),
        listener,
    );

    match next(&mut rx).await {
        Some(Signal::Error(message)) => assert!(message.contains("500"), "{message}"),
        other => panic!("Expected an error signal, got {other:?}"),
    }
    // The task is gone, so the listener (and its sender) was dropped.
    assert_eq!(next(&mut rx).await, None);
}

#[tokio::test]
async fn wrong_content_type_is_fatal() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/events")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create_async()
        .await;

    let (listener, mut rx) = listener();
    let _handle = client(Duration::from_millis(10)).open(
        ConnectionId::new(),
        &effective(format!("{}/events", server.url()), &[]),
        listener,
    );

    match next(&mut rx).await {
        Some(Signal::Error(message)) => assert!(message.contains("content type"), "{message}"),
        other => panic!("Expected an error signal, got {other:?}"),
    }
    assert_eq!(next(&mut rx).await, None);
}

#[tokio::test]
async fn reconnect_sends_last_event_id() {
    let mut server = Server::new_async().await;
    let _first = server
        .mock("GET", "/events")
        .match_header("last-event-id", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body("id: 7\ndata: first\n\n")
        .create_async()
        .await;
    let _second = server
        .mock("GET", "/events")
        .match_header("last-event-id", "7")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body("data: second\n\n")
        .create_async()
        .await;

    let (listener, mut rx) = listener();
    let mut handle = client(Duration::from_millis(10)).open(
        ConnectionId::new(),
        &effective(format!("{}/events", server.url()), &[]),
        listener,
    );

    assert_eq!(next(&mut rx).await, Some(Signal::Open));
    assert_eq!(
        next(&mut rx).await,
        Some(Signal::Event("message".to_string(), "first".to_string()))
    );
    assert_eq!(next(&mut rx).await, Some(Signal::Open));
    assert_eq!(
        next(&mut rx).await,
        Some(Signal::Event("message".to_string(), "second".to_string()))
    );

    handle.close();
}

#[tokio::test]
async fn close_is_idempotent_and_stops_delivery() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/events")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body("data: tick\n\n")
        .create_async()
        .await;

    let (listener, mut rx) = listener();
    let mut handle = client(Duration::from_millis(10)).open(
        ConnectionId::new(),
        &effective(format!("{}/events", server.url()), &[]),
        listener,
    );
    assert_eq!(next(&mut rx).await, Some(Signal::Open));

    handle.close();
    handle.close();

    // Drain what was delivered before the abort; the channel then closes.
    let mut drained = 0;
    while next(&mut rx).await.is_some() {
        drained += 1;
        assert!(drained < 100, "stream kept delivering after close");
    }
}

#[tokio::test]
async fn invalid_header_is_reported_without_request() {
    let server = Server::new_async().await;

    let (listener, mut rx) = listener();
    let _handle = client(Duration::from_millis(10)).open(
        ConnectionId::new(),
        &effective(format!("{}/events", server.url()), &[("bad header", "v")]),
        listener,
    );

    match next(&mut rx).await {
        Some(Signal::Error(message)) => assert!(message.contains("invalid header"), "{message}"),
        other => panic!("Expected an error signal, got {other:?}"),
    }
    assert_eq!(next(&mut rx).await, None);
}
