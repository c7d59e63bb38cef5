use log::*;
use std::future::Future;
use subscription::ControlMessage;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Parses one line of stdin into a control message.
///
/// Blank lines are skipped. Lines that are not a JSON object are logged and
/// skipped, they never stop the subscription.
pub fn parse_control_line(line: &str) -> Option<ControlMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str::<ControlMessage>(line) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!("Ignoring malformed control message: {e}");
            None
        }
    }
}

/// Delivers control messages read from `input` until `shutdown` resolves.
///
/// The input closing does not end the loop, the subscription keeps running
/// until `shutdown` resolves.
pub async fn pump<R, S, F>(input: R, shutdown: S, mut deliver: F)
where
    R: AsyncBufRead + Unpin,
    S: Future,
    F: FnMut(ControlMessage),
{
    let mut lines = input.lines();
    let mut input_open = true;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => {
                    if let Some(message) = parse_control_line(&line) {
                        deliver(message);
                    }
                }
                Ok(None) => {
                    info!("Control input closed, subscription keeps running until interrupted");
                    input_open = false;
                }
                Err(e) => {
                    error!("Failed to read control input: {e}");
                    input_open = false;
                }
            },
            _ = &mut shutdown => break,
        }
    }
}
