use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{plain, ROW_FIELDS};

/// Format output as tables: headline fields first, then one table per row set.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result(result, map),
            _ => print_fields(map),
        },
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", plain(value)),
    }
}

fn print_result(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    let mut scalars = Map::new();
    let mut nested: Vec<(&String, &Map<String, Value>)> = Vec::new();
    for (key, val) in result {
        if ROW_FIELDS.contains(&key.as_str()) {
            continue;
        }
        match val {
            Value::Object(inner) => nested.push((key, inner)),
            _ => {
                scalars.insert(key.clone(), val.clone());
            }
        }
    }
    print_fields(&scalars);

    for (key, inner) in nested {
        println!("\n{key}:");
        print_result(inner, &Map::new());
    }

    for key in ROW_FIELDS {
        if let Some(Value::Array(rows)) = result.get(key) {
            if !rows.is_empty() {
                println!("\n{key}:");
                print_rows(rows);
            }
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(|w| w.as_str()) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

fn print_fields(map: &Map<String, Value>) {
    if map.is_empty() {
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), plain(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    match arr.first() {
        Some(Value::Object(first)) => {
            let headers: Vec<String> = first.keys().cloned().collect();
            let mut builder = Builder::default();
            builder.push_record(headers.clone());
            for item in arr.iter().filter_map(|v| v.as_object()) {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| item.get(h).map(plain).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
            println!("{}", Table::from(builder));
        }
        // Tuples such as chart points
        Some(Value::Array(_)) => {
            let mut builder = Builder::default();
            for item in arr.iter().filter_map(|v| v.as_array()) {
                builder.push_record(item.iter().map(plain).collect::<Vec<_>>());
            }
            println!("{}", Table::from(builder));
        }
        _ => {
            for item in arr {
                println!("{}", plain(item));
            }
        }
    }
}
