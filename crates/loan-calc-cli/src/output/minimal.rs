use serde_json::Value;

use super::plain_value;

/// Headline field of each kind of output, in priority order.
const PRIORITY_KEYS: [&str; 3] = ["periodic_payment", "is_valid", "total_repayment"];

/// Print just the key answer from the output: the repayment amount for a
/// calculation, the verdict for a validation, otherwise the first field.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                return plain_value(val);
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, plain_value(val));
        }
    }

    plain_value(result_obj)
}
