use log::*;
use std::io::Write;
use subscription::{EventRecord, Host, Notice, Severity, Status};

/// Host that writes forwarded records as JSON lines and reports status and
/// notices through the logger.
pub struct ConsoleHost<W: Write + Send> {
    out: W,
}

impl ConsoleHost<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleHost<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_record(&mut self, record: &EventRecord) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl<W: Write + Send> Host for ConsoleHost<W> {
    fn forward(&mut self, record: EventRecord) {
        if let Err(e) = self.write_record(&record) {
            error!("Failed to write {} event: {e}", record.event);
        }
    }

    fn status(&mut self, status: Status) {
        match status.severity() {
            Severity::Info => info!("Status: {status}"),
            Severity::Warn => warn!("Status: {status}"),
            Severity::Error => error!("Status: {status}"),
        }
    }

    fn notify(&mut self, notice: Notice) {
        match notice.severity {
            Severity::Info => info!("{}", notice.text),
            Severity::Warn => warn!("Warning: {}", notice.text),
            Severity::Error => error!("{}", notice.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_writes_one_json_line_per_record() {
        let mut host = ConsoleHost::new(Vec::new());
        host.forward(EventRecord::new("price", "42"));
        host.forward(EventRecord::new("message", "{\"a\":1}"));

        let written = String::from_utf8(host.out).unwrap();
        let lines: Vec<_> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"event":"price","payload":"42"}"#);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["event"], "message");
        assert_eq!(second["payload"], "{\"a\":1}");
    }

    #[test]
    fn status_and_notices_do_not_touch_the_output() {
        let mut host = ConsoleHost::new(Vec::new());
        host.status(Status::NoUrl);
        host.notify(Notice::warn("override ignored"));
        assert!(host.out.is_empty());
    }
}
