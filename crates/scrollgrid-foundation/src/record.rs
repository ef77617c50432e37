//! Opaque item records.
//!
//! Grids are generic over their item type; [`Record`] is the untyped
//! field/value item used with markup templates.

use indexmap::IndexMap;
use serde_json::Value;

/// An ordered mapping from field name to value.
pub type Record = IndexMap<String, Value>;

/// Builds a record from `(field, value)` pairs.
///
/// ```rust
/// use scrollgrid_foundation::record;
/// use serde_json::json;
///
/// let item = record([("name", json!("a")), ("age", json!(3))]);
/// assert_eq!(item["name"], json!("a"));
/// ```
pub fn record<K, I>(fields: I) -> Record
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Resolves a dotted path (`address.city`) against a record.
///
/// Returns `None` when any segment is missing or a non-object is traversed.
pub fn lookup_path<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = record.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Formats a value the way it is inserted into markup.
///
/// Strings insert their contents, `null` inserts nothing, everything else
/// its JSON form.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_field_order() {
        let item = record([("b", json!(1)), ("a", json!(2))]);
        let keys: Vec<_> = item.keys().cloned().collect();
        assert_eq!(keys, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_lookup_nested_path() {
        let item = record([("address", json!({ "city": "Oslo" }))]);
        assert_eq!(lookup_path(&item, "address.city"), Some(&json!("Oslo")));
        assert_eq!(lookup_path(&item, "address.zip"), None);
        assert_eq!(lookup_path(&item, "missing"), None);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("x")), "x");
        assert_eq!(display_value(&json!(null)), "");
        assert_eq!(display_value(&json!(4.5)), "4.5");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
    }
}
