//! Dot-separated lookups into free-form event properties.

use serde_json::{Map, Value};

/// A property key split on `.` into the segments walked during lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyPath<'a> {
    raw: &'a str,
    segments: Vec<&'a str>,
}

impl<'a> PropertyPath<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Self {
            raw,
            segments: raw.split('.').collect(),
        }
    }

    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Walks `properties` one segment at a time. Objects are indexed by key and arrays by decimal
    /// index; any other intermediate value ends the walk with `None`.
    pub fn lookup<'v>(&self, properties: &'v Map<String, Value>) -> Option<&'v Value> {
        let (first, rest) = self.segments.split_first()?;
        let mut current = properties.get(*first)?;
        for segment in rest {
            current = match current {
                Value::Object(map) => map.get(*segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// Resolves `key` against `properties`: a path walk first, then a direct lookup of the whole key
/// when the walk finds nothing (or `null`). The fallback lets flat keys that contain dots resolve.
pub fn resolve_property<'v>(properties: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    match PropertyPath::parse(key).lookup(properties) {
        Some(Value::Null) | None => properties.get(key),
        found => found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn splits_segments() {
        let path = PropertyPath::parse("user.plan.tier");
        assert_eq!(path.segments(), &["user", "plan", "tier"]);
        assert!(path.is_nested());
        assert!(!PropertyPath::parse("plan").is_nested());
    }

    #[test]
    fn walks_nested_objects() {
        let properties = props(json!({"user": {"plan": {"tier": "pro"}}}));
        let path = PropertyPath::parse("user.plan.tier");
        assert_eq!(path.lookup(&properties), Some(&json!("pro")));
    }

    #[test]
    fn indexes_arrays() {
        let properties = props(json!({"items": [{"sku": "a-1"}, {"sku": "b-2"}]}));
        assert_eq!(
            PropertyPath::parse("items.1.sku").lookup(&properties),
            Some(&json!("b-2"))
        );
        assert_eq!(PropertyPath::parse("items.9.sku").lookup(&properties), None);
        assert_eq!(PropertyPath::parse("items.x").lookup(&properties), None);
    }

    #[test]
    fn stops_at_scalar_intermediates() {
        let properties = props(json!({"user": "alice"}));
        assert_eq!(PropertyPath::parse("user.plan").lookup(&properties), None);
    }

    #[test]
    fn falls_back_to_flat_dotted_key() {
        let properties = props(json!({"user.plan": "pro"}));
        assert_eq!(resolve_property(&properties, "user.plan"), Some(&json!("pro")));
    }

    #[test]
    fn prefers_nested_value_over_flat_key() {
        let properties = props(json!({"user": {"plan": "nested"}, "user.plan": "flat"}));
        assert_eq!(
            resolve_property(&properties, "user.plan"),
            Some(&json!("nested"))
        );
    }

    #[test]
    fn nested_null_falls_back_to_flat_key() {
        let properties = props(json!({"user": {"plan": null}, "user.plan": "flat"}));
        assert_eq!(resolve_property(&properties, "user.plan"), Some(&json!("flat")));
    }

    #[test]
    fn nested_falsy_values_do_not_fall_back() {
        let properties = props(json!({
            "user": {"plan": "", "seats": 0, "beta": false},
            "user.plan": "flat",
            "user.seats": 5,
            "user.beta": true
        }));
        assert_eq!(resolve_property(&properties, "user.plan"), Some(&json!("")));
        assert_eq!(resolve_property(&properties, "user.seats"), Some(&json!(0)));
        assert_eq!(resolve_property(&properties, "user.beta"), Some(&json!(false)));
    }

    #[test]
    fn missing_everywhere_is_none() {
        let properties = props(json!({"other": 1}));
        assert_eq!(resolve_property(&properties, "user.plan"), None);
        assert_eq!(resolve_property(&properties, "plan"), None);
    }
}
