use crate::error::{transport_error, Error, ErrorKind};
use crate::ClientSettings;
use eventsource_stream::Eventsource;
use futures_util::stream::StreamExt;
use log::*;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::StatusCode;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use subscription::{ConnectionHandle, ConnectionId, EffectiveConfig, StreamListener};
use tokio::task::JoinHandle;

const EVENT_STREAM: &str = "text/event-stream";
const LAST_EVENT_ID: &str = "last-event-id";
const DEFAULT_EVENT_TYPE: &str = "message";

/// Handle to one running stream task. Closing aborts the task.
pub struct SseConnection {
    id: ConnectionId,
    task: Option<JoinHandle<()>>,
}

impl SseConnection {
    pub(crate) fn spawn(
        id: ConnectionId,
        config: EffectiveConfig,
        settings: ClientSettings,
        listener: Arc<dyn StreamListener>,
    ) -> Self {
        let task = tokio::spawn(drive(id.clone(), config, settings, listener));
        Self {
            id,
            task: Some(task),
        }
    }
}

impl ConnectionHandle for SseConnection {
    fn close(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("Closing SSE stream {}", self.id);
            task.abort();
        }
    }
}

impl Drop for SseConnection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Mutable per-stream protocol state carried across reconnects.
struct Cursor {
    last_event_id: Option<String>,
    retry: Duration,
}

async fn drive(
    id: ConnectionId,
    config: EffectiveConfig,
    settings: ClientSettings,
    listener: Arc<dyn StreamListener>,
) {
    let prepared = build_client(&config, &settings).and_then(|client| {
        let headers = header_map(&config.headers)?;
        Ok((client, headers))
    });
    let (client, headers) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            listener.on_error(&id, &e.to_string());
            return;
        }
    };

    let mut cursor = Cursor {
        last_event_id: None,
        retry: settings.reconnect_interval,
    };

    loop {
        match stream_once(&id, &client, &config.url, &headers, &mut cursor, &*listener).await {
            Ok(()) => debug!("SSE stream {id} ended by server"),
            Err(e) if e.is_fatal() => {
                warn!("SSE stream {id} failed: {e}");
                listener.on_error(&id, &e.to_string());
                return;
            }
            Err(e) => {
                debug!("SSE stream {id} interrupted: {e}");
                listener.on_error(&id, &e.to_string());
            }
        }

        trace!("Reconnecting SSE stream {id} in {:?}", cursor.retry);
        tokio::time::sleep(cursor.retry).await;
    }
}

async fn stream_once(
    id: &ConnectionId,
    client: &reqwest::Client,
    url: &str,
    headers: &HeaderMap,
    cursor: &mut Cursor,
    listener: &dyn StreamListener,
) -> Result<(), Error> {
    let mut request = client
        .get(url)
        .header(ACCEPT, EVENT_STREAM)
        .header(CACHE_CONTROL, "no-cache")
        .headers(headers.clone());
    if let Some(last_event_id) = &cursor.last_event_id {
        request = request.header(LAST_EVENT_ID, last_event_id.as_str());
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() || status == StatusCode::NO_CONTENT {
        return Err(transport_error(
            ErrorKind::Status(status.as_u16()),
            status.canonical_reason().unwrap_or("no reason"),
        ));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !content_type.starts_with(EVENT_STREAM) {
        return Err(transport_error(
            ErrorKind::ContentType(content_type),
            "expected text/event-stream",
        ));
    }

    listener.on_open(id);

    let mut events = response.bytes_stream().eventsource();
    while let Some(item) = events.next().await {
        let event = item.map_err(|e| transport_error(ErrorKind::Stream, &e.to_string()))?;

        if !event.id.is_empty() {
            cursor.last_event_id = Some(event.id.clone());
        }
        if let Some(retry) = event.retry {
            cursor.retry = retry;
        }

        let event_type = if event.event.is_empty() {
            DEFAULT_EVENT_TYPE
        } else {
            event.event.as_str()
        };
        listener.on_event(id, event_type, &event.data);
    }

    Ok(())
}

fn build_client(config: &EffectiveConfig, settings: &ClientSettings) -> Result<reqwest::Client, Error> {
    let options = &config.options;
    let mut builder = reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .danger_accept_invalid_certs(!options.tls_verify)
        .cookie_store(options.send_credentials);

    if let Some(proxy_url) = &options.proxy_url {
        let proxy = reqwest::Proxy::all(proxy_url.as_str()).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::ClientBuild,
        })?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: ErrorKind::ClientBuild,
    })
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| transport_error(ErrorKind::InvalidHeader, name))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| transport_error(ErrorKind::InvalidHeader, name))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
