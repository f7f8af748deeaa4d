pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use rust_decimal::Decimal;
use serde_json::Value;
use sip_core::types::round_money;
use std::str::FromStr;

/// Column headings for per-plan rows, in display order, with the result
/// field each one reads.
pub const PLAN_COLUMNS: [(&str, &str); 4] = [
    ("Fund Name", "name"),
    ("Invested Amount", "invested_amount"),
    ("Estimated Returns", "estimated_returns"),
    ("Future Value", "future_value"),
];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object of an envelope when it is a plan report.
pub fn as_report(value: &Value) -> Option<&serde_json::Map<String, Value>> {
    let result = value.get("result")?.as_object()?;
    if result.contains_key("results") && result.contains_key("totals") {
        Some(result)
    } else {
        None
    }
}

/// Render a decimal amount rounded to display precision. Anything that is
/// not a decimal is rendered as-is.
pub fn format_amount(value: &Value) -> String {
    let parsed = match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    };
    match parsed {
        Some(d) => round_money(d).to_string(),
        None => format_value(value),
    }
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Display label for a plan row at `position`.
pub fn plan_label(row: &Value, position: usize) -> String {
    let name = row.get("name").and_then(Value::as_str).unwrap_or_default();
    sip_core::sip::display_name(name, position)
}
