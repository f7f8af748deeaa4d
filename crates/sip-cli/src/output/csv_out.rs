use serde_json::{Map, Value};
use std::io;

use super::{as_report, format_amount, plan_label, PLAN_COLUMNS};

/// Write output as CSV to stdout.
///
/// Plan reports become one row per plan; any other result becomes a
/// two-column `field,value` listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let written = write_csv(&mut wtr, value).and_then(|_| wtr.flush().map_err(csv::Error::from));
    if let Err(e) = written {
        tracing::error!(%e, "could not write CSV output");
    }
}

fn write_csv<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    if let Some(report) = as_report(value) {
        return write_plan_rows(wtr, report);
    }

    match value.get("result") {
        Some(Value::Object(result)) => write_fields(wtr, result),
        _ => match value {
            Value::Object(map) => write_fields(wtr, map),
            other => wtr.write_record([format_amount(other)]),
        },
    }
}

fn write_plan_rows<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    report: &Map<String, Value>,
) -> csv::Result<()> {
    wtr.write_record(PLAN_COLUMNS.iter().map(|(heading, _)| *heading))?;

    let results = report.get("results").and_then(Value::as_array);
    let allocation = report.get("allocation").and_then(Value::as_array);
    for (i, row) in results.into_iter().flatten().enumerate() {
        let label = allocation
            .and_then(|a| a.get(i))
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
        wtr.write_record(&record)?;
    }
    Ok(())
}

fn write_fields<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    map: &Map<String, Value>,
) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.as_str(), &format_amount(val)])?;
    }
    Ok(())
}
