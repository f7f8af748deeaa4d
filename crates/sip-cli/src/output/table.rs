use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{as_report, format_amount, format_value, plan_label, PLAN_COLUMNS};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    let Value::Object(envelope) = value else {
        println!("{}", value);
        return;
    };

    if let Some(report) = as_report(value) {
        print_report(report);
    } else if let Some(Value::Object(result)) = envelope.get("result") {
        print_flat_object(result);
    } else {
        print_flat_object(envelope);
    }

    print_notes(envelope);
}

fn print_report(report: &Map<String, Value>) {
    let empty = Vec::new();
    let results = report
        .get("results")
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let allocation = report
        .get("allocation")
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    if results.is_empty() {
        println!("(no plans)");
    } else {
        println!("{}", plans_table(results, allocation, report.get("totals")));
    }

    if !allocation.is_empty() {
        let basis = report
            .get("allocation_basis")
            .and_then(Value::as_str)
            .unwrap_or("invested");
        println!("\nAllocation ({})", basis.replace('_', " "));
        println!("{}", allocation_table(allocation));
    }

    for (label, key) in [
        ("Estimated returns", "return_pct"),
        ("Future value", "wealth_multiple_pct"),
    ] {
        if let Some(v) = report.get(key).filter(|v| !v.is_null()) {
            println!("{label}: {}% of invested", format_amount(v));
        }
    }
}

/// Per-plan rows followed by a totals row.
fn plans_table(results: &[Value], allocation: &[Value], totals: Option<&Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(PLAN_COLUMNS.iter().map(|(heading, _)| heading.to_string()));

    for (i, row) in results.iter().enumerate() {
        // allocation labels already account for skipped plans
        let label = allocation
            .get(i)
            .and_then(|s| s.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| plan_label(row, i));
        let mut record = vec![label];
        record.extend(
            PLAN_COLUMNS[1..]
                .iter()
                .map(|(_, key)| row.get(*key).map(format_amount).unwrap_or_default()),
        );
        builder.push_record(record);
    }

    if let Some(t) = totals {
        builder.push_record([
            "Total".to_string(),
            t.get("total_invested").map(format_amount).unwrap_or_default(),
            t.get("total_returns").map(format_amount).unwrap_or_default(),
            t.get("total_future_value").map(format_amount).unwrap_or_default(),
        ]);
    }

    builder.build()
}

fn allocation_table(allocation: &[Value]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Fund Name", "Amount", "Share %"]);
    for slice in allocation {
        builder.push_record([
            slice.get("name").map(format_value).unwrap_or_default(),
            slice.get("value").map(format_amount).unwrap_or_default(),
            slice.get("share_pct").map(format_amount).unwrap_or_default(),
        ]);
    }
    builder.build()
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), format_amount(val)]);
    }
    println!("{}", builder.build());
}

fn print_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
