//! Structural validation of feed documents and display rows
//!
//! Both entry points walk a `serde_json::Value`, collect every violation
//! instead of stopping at the first, and only then build the typed value.

use crate::error::{SchemaError, Violation};
use crate::types::{RawFeed, Transaction};
use serde_json::{Map, Value};

/// JSON type name used in violation messages
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Expect {
    String,
    Number,
}

impl Expect {
    fn name(self) -> &'static str {
        match self {
            Expect::String => "string",
            Expect::Number => "number",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Expect::String => value.is_string(),
            Expect::Number => value.is_number(),
        }
    }
}

#[derive(Default)]
struct Collector {
    violations: Vec<Violation>,
}

impl Collector {
    fn push(&mut self, path: String, expected: &str, found: &str) {
        self.violations.push(Violation {
            path,
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }

    fn required(&mut self, obj: &Map<String, Value>, prefix: &str, key: &str, expect: Expect) {
        match obj.get(key) {
            Some(value) if expect.matches(value) => {}
            Some(value) => self.push(join(prefix, key), expect.name(), type_name(value)),
            None => self.push(join(prefix, key), expect.name(), "missing"),
        }
    }

    /// `allow_null` mirrors the feed's habit of sending `null` for absent fields
    fn optional(&mut self, obj: &Map<String, Value>, prefix: &str, key: &str, expect: Expect, allow_null: bool) {
        match obj.get(key) {
            None => {}
            Some(Value::Null) if allow_null => {}
            Some(value) if expect.matches(value) => {}
            Some(value) => self.push(join(prefix, key), expect.name(), type_name(value)),
        }
    }

    fn party(&mut self, obj: &Map<String, Value>, prefix: &str, key: &str) {
        let path = join(prefix, key);
        match obj.get(key) {
            Some(Value::Object(inner)) => self.required(inner, &path, "description", Expect::String),
            Some(value) => self.push(path, "object", type_name(value)),
            None => self.push(path, "object", "missing"),
        }
    }

    fn finish(self) -> Result<(), SchemaError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError { violations: self.violations })
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn raw_record(collector: &mut Collector, value: &Value, path: &str) {
    let obj = match value {
        Value::Object(obj) => obj,
        other => {
            collector.push(path.to_string(), "object", type_name(other));
            return;
        }
    };

    collector.required(obj, path, "activity_id", Expect::String);
    collector.required(obj, path, "date", Expect::String);
    collector.required(obj, path, "type", Expect::String);
    collector.optional(obj, path, "method", Expect::String, true);
    collector.required(obj, path, "amount", Expect::Number);
    collector.required(obj, path, "balance", Expect::Number);
    collector.party(obj, path, "source");
    collector.party(obj, path, "destination");
}

/// Validate a fetched feed document and produce the typed feed
///
/// A missing or `null` `transactions` key is valid and yields an empty feed.
pub fn validate_feed(value: &Value) -> Result<RawFeed, SchemaError> {
    let mut collector = Collector::default();

    let root = match value {
        Value::Object(root) => root,
        other => {
            collector.push("$".to_string(), "object", type_name(other));
            return Err(SchemaError { violations: collector.violations });
        }
    };

    match root.get("transactions") {
        None | Some(Value::Null) => {}
        Some(Value::Array(records)) => {
            for (i, record) in records.iter().enumerate() {
                raw_record(&mut collector, record, &format!("transactions[{}]", i));
            }
        }
        Some(other) => collector.push("transactions".to_string(), "array", type_name(other)),
    }

    collector.finish()?;

    serde_json::from_value(value.clone()).map_err(|e| SchemaError {
        violations: vec![Violation {
            path: "$".to_string(),
            expected: "feed document".to_string(),
            found: e.to_string(),
        }],
    })
}

/// Validate a display-shaped row and produce the typed transaction
pub fn validate_transaction(value: &Value) -> Result<Transaction, SchemaError> {
    let mut collector = Collector::default();

    let obj = match value {
        Value::Object(obj) => obj,
        other => {
            collector.push("$".to_string(), "object", type_name(other));
            return Err(SchemaError { violations: collector.violations });
        }
    };

    collector.required(obj, "", "txID", Expect::String);
    collector.required(obj, "", "timestamp", Expect::String);
    collector.required(obj, "", "type", Expect::String);
    collector.optional(obj, "", "method", Expect::String, false);
    collector.required(obj, "", "amount", Expect::Number);
    collector.required(obj, "", "balance", Expect::Number);
    collector.optional(obj, "", "source", Expect::String, false);
    collector.optional(obj, "", "destination", Expect::String, false);

    collector.finish()?;

    serde_json::from_value(value.clone()).map_err(|e| SchemaError {
        violations: vec![Violation {
            path: "$".to_string(),
            expected: "transaction".to_string(),
            found: e.to_string(),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, amount: f64) -> Value {
        json!({
            "activity_id": id,
            "date": "2023-03-14T10:00:00Z",
            "type": "DEPOSIT",
            "method": "ACH",
            "amount": amount,
            "balance": 1000.0,
            "source": { "description": "Checking" },
            "destination": { "description": "Brokerage" }
        })
    }

    #[test]
    fn test_validate_feed_accepts_well_formed_records() {
        let feed = validate_feed(&json!({ "transactions": [record("A1", 10.0), record("A2", -5.0)] })).unwrap();
        assert_eq!(feed.records().len(), 2);
        assert_eq!(feed.records()[0].activity_id, "A1");
        assert_eq!(feed.records()[1].amount, -5.0);
        assert_eq!(feed.records()[0].source.description, "Checking");
    }

    #[test]
    fn test_validate_feed_missing_or_null_transactions() {
        assert!(validate_feed(&json!({})).unwrap().records().is_empty());
        assert!(validate_feed(&json!({ "transactions": null })).unwrap().records().is_empty());
        assert!(validate_feed(&json!({ "transactions": [] })).unwrap().records().is_empty());
    }

    #[test]
    fn test_validate_feed_ignores_unknown_fields() {
        let mut rec = record("A1", 1.0);
        rec["extra"] = json!(true);
        let feed = validate_feed(&json!({ "transactions": [rec], "meta": 1 })).unwrap();
        assert_eq!(feed.records().len(), 1);
    }

    #[test]
    fn test_validate_feed_null_method_is_absent() {
        let mut rec = record("A1", 1.0);
        rec["method"] = Value::Null;
        let feed = validate_feed(&json!({ "transactions": [rec] })).unwrap();
        assert_eq!(feed.records()[0].method, None);
    }

    #[test]
    fn test_validate_feed_enumerates_all_violations() {
        let mut broken = record("A2", 1.0);
        broken["amount"] = json!("12.00");
        broken.as_object_mut().unwrap().remove("source");
        broken["destination"] = json!({ "name": "x" });

        let err = validate_feed(&json!({ "transactions": [record("A1", 1.0), broken, 7] })).unwrap_err();
        let paths: Vec<&str> = err.violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "transactions[1].amount",
                "transactions[1].source",
                "transactions[1].destination.description",
                "transactions[2]",
            ]
        );
        assert_eq!(err.violations[0].found, "string");
        assert_eq!(err.violations[1].found, "missing");
        assert_eq!(err.violations[3].expected, "object");
    }

    #[test]
    fn test_validate_feed_rejects_non_object_root() {
        let err = validate_feed(&json!([1, 2])).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].path, "$");
        assert_eq!(err.violations[0].found, "array");
    }

    #[test]
    fn test_validate_feed_rejects_non_array_transactions() {
        let err = validate_feed(&json!({ "transactions": { "a": 1 } })).unwrap_err();
        assert_eq!(err.violations[0].path, "transactions");
        assert_eq!(err.violations[0].expected, "array");
    }

    #[test]
    fn test_validate_transaction_ok() {
        let tx = validate_transaction(&json!({
            "txID": "A1",
            "timestamp": "Tue, 14 Mar 2023 10:00:00 GMT",
            "type": "REFUND",
            "amount": 12.5,
            "balance": 100,
            "source": "Card"
        }))
        .unwrap();
        assert_eq!(tx.tx_id, "A1");
        assert_eq!(tx.kind, "REFUND");
        assert_eq!(tx.method, None);
        assert_eq!(tx.source.as_deref(), Some("Card"));
        assert_eq!(tx.balance, 100.0);
    }

    #[test]
    fn test_validate_transaction_reports_every_field() {
        let err = validate_transaction(&json!({
            "txID": 5,
            "type": "DEPOSIT",
            "method": null,
            "amount": "1",
            "balance": 2
        }))
        .unwrap_err();
        let paths: Vec<&str> = err.violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, vec!["txID", "timestamp", "method", "amount"]);
    }
}
