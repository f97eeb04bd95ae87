use serde_json::Value;
use std::io;

use super::{plain, result_of, ROW_FIELDS};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// Results with row data (a schedule, a projection, scenarios) are written
/// one row per entry; anything else as `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match result_of(value) {
        Value::Object(result) => {
            let rows = ROW_FIELDS
                .iter()
                .filter_map(|k| result.get(*k))
                .filter_map(|v| v.as_array())
                .find(|rows| rows.iter().any(|r| r.is_object()));
            match rows {
                Some(rows) => write_rows(&mut wtr, rows),
                None => {
                    let _ = wtr.write_record(["field", "value"]);
                    for (key, val) in result {
                        let _ = wtr.write_record([key.as_str(), &plain(val)]);
                    }
                }
            }
        }
        Value::Array(arr) => write_rows(&mut wtr, arr),
        other => {
            let _ = wtr.write_record([plain(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([plain(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for item in arr.iter().filter_map(|v| v.as_object()) {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(*h).map(plain).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&row);
    }
}
