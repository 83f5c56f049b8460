use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::plain_value;

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result_table(result, map),
            _ => println!("{}", field_table(map, None)),
        },
        _ => println!("{}", plain_value(value)),
    }
}

fn print_result_table(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    let display = envelope.get("display").and_then(Value::as_object);
    println!("{}", field_table(result, display));

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Field/value rows, plus a formatted column when display strings exist.
fn field_table(rows: &Map<String, Value>, display: Option<&Map<String, Value>>) -> Table {
    let mut builder = Builder::default();
    match display {
        Some(display) => {
            builder.push_record(["Field", "Value", "Display"]);
            for (key, val) in rows {
                let shown = display.get(key).map(plain_value).unwrap_or_default();
                builder.push_record([key.clone(), plain_value(val), shown]);
            }
        }
        None => {
            builder.push_record(["Field", "Value"]);
            for (key, val) in rows {
                builder.push_record([key.clone(), plain_value(val)]);
            }
        }
    }
    builder.build()
}
