//! Field resolution for loosely-cased payload objects.
//!
//! The backend emits camelCase with PascalCase fallbacks. Each logical field
//! is read through an ordered candidate key list; the first usable value
//! wins. Null values are treated as absent.

use serde_json::Value;

/// First non-null value under any of the candidate keys.
pub fn first_value<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = value.as_object()?;
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|v| !v.is_null())
}

/// First non-empty trimmed string under any of the candidate keys.
pub fn first_str<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    let map = value.as_object()?;
    keys.iter()
        .filter_map(|key| map.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// First boolean under any of the candidate keys.
pub fn first_bool(value: &Value, keys: &[&str]) -> Option<bool> {
    let map = value.as_object()?;
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(Value::as_bool)
}

/// Identifier as a string. String ids are trimmed, numeric ids stringified.
pub fn id_string(value: &Value, keys: &[&str]) -> Option<String> {
    let map = value.as_object()?;
    for key in keys {
        match map.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{first_bool, first_str, first_value, id_string};
    use serde_json::json;

    #[test]
    fn candidates_resolve_in_order() {
        let obj = json!({ "name": "first", "Name": "second" });
        assert_eq!(first_str(&obj, &["name", "Name"]), Some("first"));
        assert_eq!(first_str(&obj, &["Name", "name"]), Some("second"));
    }

    #[test]
    fn null_and_empty_values_fall_through() {
        let obj = json!({ "name": null, "Name": "  fallback  " });
        assert_eq!(first_str(&obj, &["name", "Name"]), Some("fallback"));

        let obj = json!({ "name": "   ", "Name": "kept" });
        assert_eq!(first_str(&obj, &["name", "Name"]), Some("kept"));

        let obj = json!({ "geo": null });
        assert_eq!(first_value(&obj, &["geo"]), None);
    }

    #[test]
    fn missing_keys_resolve_to_none() {
        let obj = json!({ "other": 1 });
        assert_eq!(first_str(&obj, &["name", "Name"]), None);
        assert_eq!(first_bool(&obj, &["flag"]), None);
        assert_eq!(id_string(&obj, &["id", "Id"]), None);
    }

    #[test]
    fn ids_accept_strings_and_numbers() {
        assert_eq!(
            id_string(&json!({ "id": "prop-7" }), &["id"]),
            Some("prop-7".to_string())
        );
        assert_eq!(id_string(&json!({ "Id": 42 }), &["id", "Id"]), Some("42".to_string()));
        assert_eq!(id_string(&json!({ "id": "  " }), &["id"]), None);
    }

    #[test]
    fn bools_skip_non_boolean_candidates() {
        let obj = json!({ "owned": "yes", "Owned": true });
        assert_eq!(first_bool(&obj, &["owned", "Owned"]), Some(true));
    }

    #[test]
    fn non_object_values_resolve_to_none() {
        assert_eq!(first_str(&json!([1, 2]), &["name"]), None);
        assert_eq!(first_value(&json!("text"), &["name"]), None);
    }
}
