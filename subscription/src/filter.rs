use crate::controller::SubscriptionState;
use std::collections::BTreeSet;

/// Event type emitted by transports when a stream opens. Never a payload event.
pub const OPEN_EVENT: &str = "open";

/// Decides whether an incoming stream event is forwarded to the host.
///
/// Only a `Connected` subscription forwards. The synthetic `open` event is
/// always dropped, and a non-empty allow-list restricts the accepted types.
pub fn should_forward(
    state: SubscriptionState,
    event_type: &str,
    allow_list: &BTreeSet<String>,
) -> bool {
    if state != SubscriptionState::Connected {
        return false;
    }
    if event_type == OPEN_EVENT {
        return false;
    }
    allow_list.is_empty() || allow_list.contains(event_type)
}
