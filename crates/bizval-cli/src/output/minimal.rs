use serde_json::Value;

use super::{plain, result_of};

/// Headline field per calculator, first match wins.
const HEADLINE_FIELDS: [&str; 7] = [
    "recommended_offer",
    "calculated_value",
    "annual_payment",
    "total_roi",
    "fit_score",
    "recommended_value",
    "industry",
];

/// Print just the headline number of a calculation.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    if let Value::Object(map) = result {
        if let Some(v) = HEADLINE_FIELDS
            .iter()
            .filter_map(|k| map.get(*k))
            .find(|v| !v.is_null())
        {
            println!("{}", plain(v));
            return;
        }
        // Nested reports such as scenarios carry their headline one level down
        if let Some(v) = map
            .values()
            .filter_map(|v| v.as_object())
            .find_map(|m| HEADLINE_FIELDS.iter().find_map(|k| m.get(*k)))
        {
            println!("{}", plain(v));
            return;
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, plain(val));
            return;
        }
    }

    println!("{}", plain(result));
}
