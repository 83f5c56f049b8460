use serde_json::Value;
use std::io;

use super::plain_value;

/// Write output as `field,value` CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        eprintln!("CSV output error: {}", e);
    }
}

fn write_csv<W: io::Write>(writer: W, value: &Value) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    let rows = value
        .as_object()
        .map(|map| match map.get("result") {
            Some(Value::Object(result)) => result,
            _ => map,
        });

    match rows {
        Some(map) => {
            wtr.write_record(["field", "value"])?;
            for (key, val) in map {
                wtr.write_record([key.as_str(), plain_value(val).as_str()])?;
            }
        }
        None => wtr.write_record([plain_value(value)])?,
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_rows() {
        let value = json!({
            "result": { "periodic_payment": "1457.93", "number_of_payments": 780 },
            "methodology": "ignored"
        });
        let mut buf = Vec::new();
        write_csv(&mut buf, &value).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "field,value\nnumber_of_payments,780\nperiodic_payment,1457.93\n");
    }
}
