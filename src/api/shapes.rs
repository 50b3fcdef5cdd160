//! Response-envelope matchers and entry decoders
//!
//! The provider's documented envelopes and the ones it actually returns
//! diverge, so each query carries an ordered list of matchers. The first
//! matcher that finds an array wins; when none does, the query yields an
//! empty sequence.

use crate::types::{Identity, TrafficRecord, UNKNOWN_USERNAME};
use serde_json::Value;

/// Pulls the record array out of a decoded response, or declines
pub type Extractor = fn(&Value) -> Option<&Vec<Value>>;

/// A named, pure extraction function
pub struct ShapeMatcher {
    pub name: &'static str,
    pub extract: Extractor,
}

/// SMTP user listing envelopes, in preference order
pub const IDENTITY_SHAPES: &[ShapeMatcher] = &[
    ShapeMatcher {
        name: "data.results",
        extract: nested_results,
    },
    ShapeMatcher {
        name: "results",
        extract: top_level_results,
    },
    ShapeMatcher {
        name: "data.users",
        extract: nested_users,
    },
];

/// Email history envelopes, in preference order
pub const TRAFFIC_SHAPES: &[ShapeMatcher] = &[
    ShapeMatcher {
        name: "data.history",
        extract: nested_history,
    },
    ShapeMatcher {
        name: "history",
        extract: top_level_history,
    },
];

fn nested_results(v: &Value) -> Option<&Vec<Value>> {
    v.get("data")?.get("results")?.as_array()
}

fn top_level_results(v: &Value) -> Option<&Vec<Value>> {
    v.get("results")?.as_array()
}

fn nested_users(v: &Value) -> Option<&Vec<Value>> {
    v.get("data")?.get("users")?.as_array()
}

fn nested_history(v: &Value) -> Option<&Vec<Value>> {
    v.get("data")?.get("history")?.as_array()
}

fn top_level_history(v: &Value) -> Option<&Vec<Value>> {
    v.get("history")?.as_array()
}

/// Try each matcher in order; first match wins
pub fn first_match<'a>(
    shapes: &[ShapeMatcher],
    response: &'a Value,
) -> Option<(&'static str, &'a Vec<Value>)> {
    shapes
        .iter()
        .find_map(|shape| (shape.extract)(response).map(|records| (shape.name, records)))
}

/// Top-level keys of a response, for diagnostics when nothing matched
pub fn top_level_keys(response: &Value) -> Vec<String> {
    response
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

/// Decode one SMTP user entry
///
/// The display name falls back from `name` to `description` to the username.
pub fn decode_identity(entry: &Value) -> Result<Identity, String> {
    if !entry.is_object() {
        return Err(format!("expected an object, got {}", entry));
    }
    let username = non_empty_str(entry, "username").ok_or("entry has no username")?;
    let display_name = non_empty_str(entry, "name")
        .or_else(|| non_empty_str(entry, "description"))
        .unwrap_or(username);
    let email = non_empty_str(entry, "email").unwrap_or_default();

    Ok(Identity::new(username, display_name, email))
}

/// Decode one email history entry grouped by username
///
/// `used` is the sent count; `bounces` and `rejects` are the failures.
pub fn decode_traffic(entry: &Value) -> Result<TrafficRecord, String> {
    if !entry.is_object() {
        return Err(format!("expected an object, got {}", entry));
    }
    let username = non_empty_str(entry, "username").unwrap_or(UNKNOWN_USERNAME);

    Ok(TrafficRecord::new(
        username,
        count(entry, &["used", "sent"]),
        count(entry, &["bounces", "bounced"]),
        count(entry, &["rejects", "rejected"]),
    ))
}

fn non_empty_str<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry
        .get(key)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// First counter present under any of `keys`; numbers, numeric strings and
/// floats are accepted, anything else (or a negative value) counts as 0
fn count(entry: &Value, keys: &[&str]) -> u64 {
    keys.iter()
        .find_map(|key| entry.get(*key).filter(|v| !v.is_null()))
        .and_then(|value| match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        })
        .unwrap_or(0)
}
