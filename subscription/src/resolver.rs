//! Merges the static subscription configuration with per-message overrides.

use crate::config::{EffectiveConfig, SubscriptionConfig};
use crate::error::{no_url_error, Error};
use crate::message::ControlMessage;
use crate::status::Notice;
use crate::template;
use log::*;

pub const OVERRIDE_IGNORED: &str =
    "msg properties can not override set node properties, using set node properties";

/// Result of a successful resolution: the effective parameters plus any
/// non-fatal notices produced on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub effective: EffectiveConfig,
    pub notices: Vec<Notice>,
}

/// Computes the parameters a new connection is opened with.
///
/// Static values always win. A message value is only used when the matching
/// static value is unset; a message value that conflicts with a static value
/// produces an "override ignored" warning. A resolved URL containing
/// placeholders is rendered against the message.
pub fn resolve(config: &SubscriptionConfig, message: &ControlMessage) -> Result<Resolution, Error> {
    let mut notices = Vec::new();
    let mut conflict = false;

    let url = match (config.static_url(), message.url_override()) {
        (Some(url), None) => url.to_string(),
        (None, Some(url)) => url.to_string(),
        (Some(url), Some(_)) => {
            conflict = true;
            url.to_string()
        }
        (None, None) => return Err(no_url_error()),
    };

    let headers = match (config.headers.is_empty(), message.headers_override()) {
        (true, Some(headers)) => headers.clone(),
        (false, Some(_)) => {
            conflict = true;
            config.headers.clone()
        }
        (_, None) => config.headers.clone(),
    };

    if conflict {
        notices.push(Notice::warn(OVERRIDE_IGNORED));
    }

    let url = if template::has_placeholders(&url) {
        let rendered = template::render(&url, &message.template_context());
        debug!("Rendered templated url {url} as {rendered}");
        rendered
    } else {
        url
    };

    Ok(Resolution {
        effective: EffectiveConfig {
            url,
            headers,
            options: config.transport_options(),
        },
        notices,
    })
}
