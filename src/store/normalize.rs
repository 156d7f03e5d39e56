use serde_json::{Map, Value};

use crate::document::Contract;

/// Compact display projection of a contract.
///
/// Drops empty strings, nulls, empty arrays and objects that normalize to
/// nothing, at every nesting level. Array elements are kept as they are.
pub fn normalize_contract(contract: &Contract) -> Value {
    match serde_json::to_value(contract) {
        Ok(Value::Object(map)) => Value::Object(normalize_map(map)),
        _ => Value::Object(Map::new()),
    }
}

fn normalize_map(map: Map<String, Value>) -> Map<String, Value> {
    let mut result = Map::new();

    for (key, value) in map {
        match value {
            Value::Object(inner) => {
                let inner = normalize_map(inner);
                if !inner.is_empty() {
                    result.insert(key, Value::Object(inner));
                }
            }
            Value::Array(items) => {
                if !items.is_empty() {
                    result.insert(key, Value::Array(items));
                }
            }
            Value::Null => {}
            Value::String(s) if s.is_empty() => {}
            other => {
                result.insert(key, other);
            }
        }
    }

    result
}
