//! Input/output bags and the helpers nodes use to read them.
//!
//! Slots are deliberately untyped: they are the boundary where differently
//! shaped nodes exchange data. Each node converts what it needs into typed
//! values on entry.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A named bag of JSON values.
pub type Slots = serde_json::Map<String, Value>;

/// The input slot every non-conditional node starts a cycle with.
pub const TRIGGER_SLOT: &str = "trigger";

/// The bag a node's inputs are reset to between repeat cycles.
pub fn default_trigger() -> Slots {
  let mut slots = Slots::new();
  slots.insert(TRIGGER_SLOT.to_string(), Value::Bool(true));
  slots
}

/// Read a number that may have been written as a JSON number or a numeric
/// string (editors frequently produce the latter).
pub fn as_number(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

/// Outcome of looking up a numeric slot.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberSlot {
  Missing,
  Invalid(Value),
  Present(f64),
}

/// Look up `key` and interpret it as a number. Null counts as missing.
pub fn number_slot(slots: &Slots, key: &str) -> NumberSlot {
  match slots.get(key) {
    None | Some(Value::Null) => NumberSlot::Missing,
    Some(value) => match as_number(value) {
      Some(n) => NumberSlot::Present(n),
      None => NumberSlot::Invalid(value.clone()),
    },
  }
}

/// Serde helper: accept `100`, `100.5` or `"100"` for an optional number.
pub fn flexible_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  match value {
    None | Some(Value::Null) => Ok(None),
    Some(value) => as_number(&value)
      .map(Some)
      .ok_or_else(|| serde::de::Error::custom(format!("expected a number, got {}", value))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_default_trigger_has_single_slot() {
    let slots = default_trigger();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[TRIGGER_SLOT], json!(true));
  }

  #[test]
  fn test_number_slot_accepts_numeric_strings() {
    let mut slots = Slots::new();
    slots.insert("a".into(), json!(1.5));
    slots.insert("b".into(), json!(" 42 "));
    slots.insert("c".into(), json!("abc"));
    slots.insert("d".into(), Value::Null);

    assert_eq!(number_slot(&slots, "a"), NumberSlot::Present(1.5));
    assert_eq!(number_slot(&slots, "b"), NumberSlot::Present(42.0));
    assert_eq!(number_slot(&slots, "c"), NumberSlot::Invalid(json!("abc")));
    assert_eq!(number_slot(&slots, "d"), NumberSlot::Missing);
    assert_eq!(number_slot(&slots, "e"), NumberSlot::Missing);
  }
}
