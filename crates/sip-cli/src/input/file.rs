use serde::Deserialize;
use sip_core::sip::PlanInput;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Columns a plan sheet must carry. Each entry lists the accepted header
/// names, exported-sheet name first.
const REQUIRED_COLUMNS: [&[&str]; 3] = [
    &["monthly_investment", "monthly_amount"],
    &["rate_of_return", "annual_rate_percent"],
    &["years", "duration_years"],
];

/// Plan files hold either a bare list or `{ "plans": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum PlanFile {
    List(Vec<PlanInput>),
    Wrapped { plans: Vec<PlanInput> },
}

impl PlanFile {
    pub fn into_plans(self) -> Vec<PlanInput> {
        match self {
            PlanFile::List(plans) | PlanFile::Wrapped { plans } => plans,
        }
    }
}

/// Load plans from a JSON, YAML or CSV file, chosen by extension.
pub fn read_plans(path: &str) -> Result<Vec<PlanInput>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let ext = canonical
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    debug!(path = %canonical.display(), format = %ext, "loading plan file");

    let plans = match ext.as_str() {
        "csv" => parse_csv(&contents),
        "yaml" | "yml" => serde_yaml::from_str::<PlanFile>(&contents)
            .map(PlanFile::into_plans)
            .map_err(|e| e.to_string()),
        "json" | "" => serde_json::from_str::<PlanFile>(&contents)
            .map(PlanFile::into_plans)
            .map_err(|e| e.to_string()),
        other => Err(format!(
            "Unsupported plan file extension '.{other}' (use .json, .yaml or .csv)"
        )),
    }
    .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;

    debug!(count = plans.len(), "plans loaded");
    Ok(plans)
}

/// Parse a plan sheet. Headers may use either the exported-sheet names
/// (`fund_name, monthly_investment, rate_of_return, years`) or the field names.
pub fn parse_csv(contents: &str) -> Result<Vec<PlanInput>, String> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let headers = rdr.headers().map_err(|e| e.to_string())?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|names| !names.iter().any(|n| headers.iter().any(|h| h == *n)))
        .map(|names| names[0])
        .collect();
    if !missing.is_empty() {
        return Err(format!("Missing columns in CSV: {}", missing.join(", ")));
    }

    rdr.deserialize::<PlanInput>()
        .enumerate()
        .map(|(i, row)| row.map_err(|e| format!("row {}: {}", i + 1, e)))
        .collect()
}

/// Resolve and validate the path.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
