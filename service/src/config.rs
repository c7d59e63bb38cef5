use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::time::Duration;
use subscription::SubscriptionConfig;

/// Default delay before the transport reopens a dropped stream.
pub const DEFAULT_RECONNECT_INTERVAL_MS: u64 = 1000;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The event stream URL. May contain `{{field}}` placeholders that are filled
    /// from each control message. When unset, control messages must carry a `url`.
    #[arg(short, long, env)]
    base_url: Option<String>,

    /// Request headers as `Name:Value`. Repeat the flag, or put one header per
    /// line in `HEADERS`. When set, `headers` carried by control messages are
    /// ignored.
    #[arg(
        long = "header",
        env = "HEADERS",
        value_delimiter = '\n',
        value_parser = parse_header
    )]
    headers: Vec<(String, String)>,

    /// Event types to forward. Forward every type when empty.
    #[arg(short, long, env, value_delimiter = ',', use_value_delimiter = true)]
    events: Vec<String>,

    /// Proxy URL used for the event stream connection.
    #[arg(long, env)]
    proxy_url: Option<String>,

    /// Restart the subscription when no event was forwarded for this many seconds.
    #[arg(short, long, env)]
    restart_after_seconds: Option<u64>,

    /// Verify the server's TLS certificate.
    #[arg(long, env, default_value_t = true, action = clap::ArgAction::Set)]
    tls_verify: bool,

    /// Keep cookies set by the server and send them back on reconnects.
    #[arg(long, env, default_value_t = true, action = clap::ArgAction::Set)]
    send_credentials: bool,

    /// Milliseconds to wait before the transport reopens a dropped stream
    /// (until the server provides its own `retry:` value).
    #[arg(long, env, default_value_t = DEFAULT_RECONNECT_INTERVAL_MS)]
    reconnect_interval_ms: u64,

    /// Issue one connect message at startup instead of waiting for input.
    #[arg(long, env)]
    connect_on_start: bool,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn connect_on_start(&self) -> bool {
        self.connect_on_start
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    /// Builds the immutable subscription settings from the parsed flags.
    pub fn subscription_config(&self) -> SubscriptionConfig {
        SubscriptionConfig {
            base_url: self.base_url.clone(),
            headers: self.headers.iter().cloned().collect(),
            allowed_events: self
                .events
                .iter()
                .map(|event| event.trim())
                .filter(|event| !event.is_empty())
                .map(str::to_string)
                .collect(),
            proxy_url: self.proxy_url.clone(),
            restart_after_seconds: self.restart_after_seconds,
            tls_verify: self.tls_verify,
            send_credentials: self.send_credentials,
        }
    }
}

/// Parses a `Name:Value` header argument.
fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected `Name:Value`, got `{raw}`")),
    }
}
