//! Translation of caller-defined custom dimensions into positional Measurement Protocol
//! parameters.
//!
//! A custom dimension table maps property names (optionally dotted paths into nested objects) to
//! semantic keys such as `dimension3` or `userAgent`. [`map_dimensions`] resolves each property in
//! the event and reports it under the key's wire code (`cd3`, `ua`, ...).

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::analytics::config::CustomDimensions;
use crate::analytics::constants::SemanticKey;
use crate::analytics::error::{unknown_semantic_key, AnalyticsResult};
use crate::analytics::path::resolve_property;

/// Resolved dimensions keyed by wire code.
pub type Dimensions = BTreeMap<String, Value>;

/// Maps `properties` through `custom_dimensions`.
///
/// Every semantic key in the table is validated, whether or not the event carries a value for it.
/// Booleans are reported as `"true"`/`"false"`. Absent properties, `null` and empty strings are
/// omitted; `0` is kept. When two entries target the same wire code the one declared later
/// wins.
pub fn map_dimensions(
    properties: &Map<String, Value>,
    custom_dimensions: &CustomDimensions,
) -> AnalyticsResult<Dimensions> {
    let mut dimensions = Dimensions::new();
    for (name, semantic_key) in custom_dimensions {
        let key = SemanticKey::parse(semantic_key)
            .ok_or_else(|| unknown_semantic_key(semantic_key))?;
        let Some(value) = resolve_property(properties, name).and_then(provided_value) else {
            continue;
        };
        dimensions.insert(key.wire_code().to_string(), value);
    }
    Ok(dimensions)
}

fn provided_value(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(Value::String(flag.to_string())),
        Value::String(text) if text.is_empty() => None,
        other => Some(other.clone()),
    }
}
