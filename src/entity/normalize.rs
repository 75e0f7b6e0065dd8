//! Coercion of untrusted JSON into [`Record`]s.
//!
//! Imported files and remote payloads are not trusted to have the record
//! shape. Every element of a sequence is coerced field by field; only a
//! payload whose top level is not a sequence is rejected.

use serde_json::{Number, Value};

use super::record::{generate_unique_id, random_color, Record};
use crate::error::{NotizError, Result};

/// Normalize a decoded payload into records.
///
/// Fails with [`NotizError::InvalidPayload`] when `raw` is not an array.
pub fn normalize(raw: &Value) -> Result<Vec<Record>> {
    match raw {
        Value::Array(items) => Ok(normalize_items(items)),
        other => Err(NotizError::InvalidPayload(format!(
            "expected a JSON array, got {}",
            kind_of(other)
        ))),
    }
}

/// Normalize each element; never fails.
pub fn normalize_items(items: &[Value]) -> Vec<Record> {
    let mut records: Vec<Record> = Vec::with_capacity(items.len());
    for item in items {
        let field = |name: &str| item.get(name).unwrap_or(&Value::Null);

        let mut id = coerce_string(field("id"));
        if id.is_empty() || records.iter().any(|r| r.id == id) {
            id = generate_unique_id(&records);
        }

        let color = match coerce_string(field("color")) {
            c if c.is_empty() => random_color(),
            c => c,
        };

        records.push(Record {
            id,
            x: coerce_number(field("x")),
            y: coerce_number(field("y")),
            title: coerce_string(field("title")),
            note: coerce_string(field("note")),
            color,
        });
    }
    records
}

/// Loose numeric coercion: invalid or missing values become 0.
pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Loose string coercion: falsy values become the empty string.
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0 && f.is_finite()) => {
            number_text(n)
        }
        Value::Bool(true) => "true".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
        _ => String::new(),
    }
}

/// Whole floats print without a fraction, so `12.0` reads as `"12"`.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{seed, PALETTE};
    use serde_json::json;

    #[test]
    fn test_normalize_rejects_non_sequence() {
        for payload in [json!({"id": "a"}), json!("text"), json!(3), json!(null)] {
            let result = normalize(&payload);
            assert!(matches!(result, Err(NotizError::InvalidPayload(_))));
        }
    }

    #[test]
    fn test_normalize_keeps_well_formed_records() {
        let records = seed();
        let encoded = serde_json::to_string(&records).unwrap();
        let decoded: Value = serde_json::from_str(&encoded).unwrap();

        assert_eq!(normalize(&decoded).unwrap(), records);
    }

    #[test]
    fn test_normalize_fills_missing_fields() {
        let records = normalize(&json!([{}])).unwrap();
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.id.len(), 8);
        assert_eq!((r.x, r.y), (0.0, 0.0));
        assert_eq!(r.title, "");
        assert_eq!(r.note, "");
        assert!(PALETTE.contains(&r.color.as_str()));
    }

    #[test]
    fn test_normalize_coerces_field_types() {
        let raw = json!([{
            "id": 42,
            "x": "12.5",
            "y": "abc",
            "title": 7,
            "note": false,
            "color": "#000000"
        }]);
        let r = &normalize(&raw).unwrap()[0];

        assert_eq!(r.id, "42");
        assert_eq!(r.x, 12.5);
        assert_eq!(r.y, 0.0);
        assert_eq!(r.title, "7");
        assert_eq!(r.note, "");
        assert_eq!(r.color, "#000000");
    }

    #[test]
    fn test_normalize_coerces_non_record_elements() {
        let raw = json!([1, "loose", null, [1, 2], true]);
        let records = normalize(&raw).unwrap();

        assert_eq!(records.len(), 5);
        for r in &records {
            assert!(!r.id.is_empty());
            assert_eq!((r.x, r.y), (0.0, 0.0));
            assert!(!r.color.is_empty());
        }
    }

    #[test]
    fn test_normalize_regenerates_duplicate_ids() {
        let raw = json!([
            {"id": "same", "title": "first"},
            {"id": "same", "title": "second"},
            {"id": "", "title": "third"}
        ]);
        let records = normalize(&raw).unwrap();

        assert_eq!(records[0].id, "same");
        assert_ne!(records[1].id, "same");
        assert_ne!(records[2].id, records[1].id);
        assert_eq!(records[1].title, "second");
    }

    #[test]
    fn test_normalize_preserves_order() {
        let raw = json!([{"title": "a"}, {"title": "b"}, {"title": "c"}]);
        let titles: Vec<String> = normalize(&raw).unwrap().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_coerce_number_edge_cases() {
        assert_eq!(coerce_number(&json!(" 3 ")), 3.0);
        assert_eq!(coerce_number(&json!("")), 0.0);
        assert_eq!(coerce_number(&json!("inf")), 0.0);
        assert_eq!(coerce_number(&json!(true)), 1.0);
        assert_eq!(coerce_number(&json!(false)), 0.0);
        assert_eq!(coerce_number(&json!({"a": 1})), 0.0);
        assert_eq!(coerce_number(&json!(-4.25)), -4.25);
    }

    #[test]
    fn test_coerce_string_edge_cases() {
        assert_eq!(coerce_string(&json!(0)), "");
        assert_eq!(coerce_string(&json!(null)), "");
        assert_eq!(coerce_string(&json!(1.5)), "1.5");
        assert_eq!(coerce_string(&json!(12.0)), "12");
        assert_eq!(coerce_string(&json!(-3.0)), "-3");
        assert_eq!(coerce_string(&json!(42)), "42");
        assert_eq!(coerce_string(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
