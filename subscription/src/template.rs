//! Mustache-style placeholder rendering for templated stream URLs.
//!
//! `{{name}}`, `{{{name}}}` and `{{& name}}` are replaced by the value found at
//! the dotted path `name` in the context. Values are inserted verbatim (no HTML
//! escaping). Missing values render as the empty string, like mustache does.
//! Rendering never fails.

use serde_json::Value;

/// Returns true if `template` contains at least one placeholder opening.
pub fn has_placeholders(template: &str) -> bool {
    template.contains("{{")
}

pub fn render(template: &str, context: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tag = &rest[start..];
        let (open, close) = if tag.starts_with("{{{") {
            ("{{{", "}}}")
        } else {
            ("{{", "}}")
        };
        let inner = &tag[open.len()..];

        match inner.find(close) {
            Some(end) => {
                let name = inner[..end].trim().trim_start_matches('&').trim();
                out.push_str(&lookup(context, name));
                rest = &inner[end + close.len()..];
            }
            None => {
                // Unterminated tag stays literal.
                out.push_str(tag);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

fn lookup(context: &Value, name: &str) -> String {
    let found = if name == "." {
        Some(context)
    } else {
        name.split('.')
            .try_fold(context, |value, key| match value {
                Value::Object(map) => map.get(key),
                Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    };

    match found {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
