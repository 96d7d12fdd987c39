//! Shape detection for chat-completion JSON payloads.
//!
//! Providers in JSON mode answer with a bare array, an object wrapping the
//! array under some key, or a single pin object. [`normalize`] runs an ordered
//! chain of detectors and returns the first match; what happens when none
//! match is decided by the [`FallbackPolicy`].

use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Treat a lone object as a one-pin list.
    WrapSingle,
    /// Refuse anything without an array.
    FailLoud,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NormalizeRules {
    // Keys probed in order before falling back to "first array-valued field".
    pub keys: &'static [&'static str],
    pub fallback: FallbackPolicy,
}

impl NormalizeRules {
    pub fn strict(mut self) -> Self {
        self.fallback = FallbackPolicy::FailLoud;
        self
    }
}

/// Returns the pin list, or `None` when the payload has no usable shape.
pub fn normalize(parsed: Value, rules: &NormalizeRules) -> Option<Vec<Value>> {
    let map = match parsed {
        Value::Array(items) => return Some(items),
        Value::Object(map) => map,
        _ => return None,
    };

    for key in rules.keys {
        if let Some(Value::Array(items)) = map.get(*key) {
            return Some(items.clone());
        }
    }

    // Document order, serde_json is built with preserve_order.
    // Only lists of objects count, a lone pin's `tags` must not win.
    if let Some(items) = map.values().filter_map(Value::as_array).find(|items| is_object_list(items)) {
        return Some(items.clone());
    }

    match rules.fallback {
        FallbackPolicy::WrapSingle => Some(vec![Value::Object(map)]),
        FallbackPolicy::FailLoud => None,
    }
}

fn is_object_list(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(Value::is_object)
}
