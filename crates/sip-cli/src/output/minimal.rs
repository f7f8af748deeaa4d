use serde_json::Value;

use super::format_amount;

/// Print just the headline figure: the total future value when present,
/// otherwise the first field of the result.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let headline = result
        .pointer("/totals/total_future_value")
        .or_else(|| result.get("total_future_value"))
        .filter(|v| !v.is_null());
    if let Some(v) = headline {
        return format_amount(v);
    }

    if let Some((key, val)) = result.as_object().and_then(|m| m.iter().next()) {
        return format!("{}: {}", key, format_amount(val));
    }

    format_amount(result)
}
