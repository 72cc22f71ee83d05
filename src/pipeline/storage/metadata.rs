use std::collections::BTreeMap;

use serde_json::Value;

/// Render any JSON value as a metadata string.
///
/// Strings stay verbatim, `null` becomes empty, everything else is its
/// compact JSON text.
pub fn flatten_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Flatten a set of metadata entries to strings. Never fails.
pub fn flatten_metadata<'a, I>(entries: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), flatten_value(v)))
        .collect()
}
