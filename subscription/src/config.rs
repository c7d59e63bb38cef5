use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// Static settings of one subscription, loaded once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Base URL of the event stream. May contain `{{ placeholders }}`.
    pub base_url: Option<String>,
    pub headers: BTreeMap<String, String>,
    /// Event types to forward. Empty forwards every type.
    pub allowed_events: BTreeSet<String>,
    pub proxy_url: Option<String>,
    /// Inactivity period after which the subscription restarts itself.
    pub restart_after_seconds: Option<u64>,
    pub tls_verify: bool,
    pub send_credentials: bool,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            headers: BTreeMap::new(),
            allowed_events: BTreeSet::new(),
            proxy_url: None,
            restart_after_seconds: None,
            tls_verify: true,
            send_credentials: true,
        }
    }
}

impl SubscriptionConfig {
    /// Static URL, treating an empty string as unset.
    pub fn static_url(&self) -> Option<&str> {
        self.base_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Watchdog period. A zero period disables the watchdog.
    pub fn restart_after(&self) -> Option<Duration> {
        self.restart_after_seconds
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs)
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            tls_verify: self.tls_verify,
            send_credentials: self.send_credentials,
            proxy_url: self.proxy_url.clone().filter(|proxy| !proxy.is_empty()),
        }
    }
}

/// Transport switches handed to the stream client untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    pub tls_verify: bool,
    pub send_credentials: bool,
    pub proxy_url: Option<String>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            tls_verify: true,
            send_credentials: true,
            proxy_url: None,
        }
    }
}

/// The parameters one connection is actually opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub options: TransportOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_verify_tls_and_send_credentials() {
        let config = SubscriptionConfig::default();
        assert!(config.tls_verify);
        assert!(config.send_credentials);
        assert_eq!(config.restart_after(), None);
    }

    #[test]
    fn zero_restart_period_disables_watchdog() {
        let config = SubscriptionConfig {
            restart_after_seconds: Some(0),
            ..SubscriptionConfig::default()
        };
        assert_eq!(config.restart_after(), None);

        let config = SubscriptionConfig {
            restart_after_seconds: Some(5),
            ..SubscriptionConfig::default()
        };
        assert_eq!(config.restart_after(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn deserializes_partial_config_with_defaults() {
        let config: SubscriptionConfig = serde_json::from_str(
            r#"{ "base_url": "https://a/events", "allowed_events": ["price"], "tls_verify": false }"#,
        )
        .unwrap();
        assert_eq!(config.static_url(), Some("https://a/events"));
        assert!(config.allowed_events.contains("price"));
        assert!(!config.tls_verify);
        assert!(config.send_credentials);
    }

    #[test]
    fn empty_proxy_is_not_passed_to_transport() {
        let config = SubscriptionConfig {
            proxy_url: Some(String::new()),
            ..SubscriptionConfig::default()
        };
        assert_eq!(config.transport_options().proxy_url, None);
    }
}
