use sip_core::sip::PlanInput;
use std::io::{self, Read};
use tracing::debug;

use super::file::PlanFile;

/// Read plans piped on stdin as JSON, either a bare list or `{ "plans": [...] }`.
/// Returns None when stdin is a terminal or carries nothing.
pub fn read_stdin_plans() -> Result<Option<Vec<PlanInput>>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_plans(&buffer)
}

fn parse_plans(raw: &str) -> Result<Option<Vec<PlanInput>>, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let file: PlanFile = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse plans from stdin: {e}"))?;
    let plans = file.into_plans();
    debug!(count = plans.len(), "plans read from stdin");
    Ok(Some(plans))
}
