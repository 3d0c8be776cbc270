//! `licsync check` - input readiness report without running a reconciliation.

use std::path::PathBuf;

use licsync_recon::Table;

use crate::exit_codes::{EXIT_ERROR, EXIT_INPUT_NOT_READY};
use crate::load;
use crate::CliError;

fn check_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

pub fn cmd_check(
    facilities: PathBuf,
    providers: PathBuf,
    config_path: Option<PathBuf>,
    json_output: bool,
) -> Result<(), CliError> {
    let config = load::load_config(config_path.as_deref())?;

    let facility_table = load::load_facilities(&facilities)?;
    let provider_table = load::load_providers(&providers, &config)?;

    let facility_missing = missing_columns(&facility_table, &config.facility_required());
    let provider_missing = missing_columns(&provider_table, &config.provider_required());
    let passthrough_missing = missing_columns(&provider_table, &config.provider_passthrough());

    let ready = facility_missing.is_empty() && provider_missing.is_empty();

    if json_output {
        let report = serde_json::json!({
            "ready": ready,
            "facilities": {
                "rows": facility_table.row_count(),
                "columns": facility_table.columns.len(),
                "missing_required": &facility_missing,
            },
            "providers": {
                "rows": provider_table.row_count(),
                "columns": provider_table.columns.len(),
                "missing_required": &provider_missing,
                "missing_passthrough": &passthrough_missing,
            },
        });
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| check_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human report to stderr
    report_table("facilities", &facility_table, &facility_missing);
    report_table("providers", &provider_table, &provider_missing);
    if !passthrough_missing.is_empty() {
        eprintln!(
            "warning: bed-change output would be empty; provider table lacks {}",
            passthrough_missing.join(", ")
        );
    }

    if ready {
        eprintln!("ready: both inputs carry every required column");
        Ok(())
    } else {
        Err(
            check_err(EXIT_INPUT_NOT_READY, "inputs are missing required columns")
                .with_hint("column names are configurable; pass --config with the right map"),
        )
    }
}

fn missing_columns(table: &Table, wanted: &[&str]) -> Vec<String> {
    wanted
        .iter()
        .copied()
        .filter(|name| table.column_index(name).is_none())
        .map(|name| name.to_string())
        .collect()
}

fn report_table(label: &str, table: &Table, missing: &[String]) {
    eprintln!(
        "{label}: {} rows, {} columns",
        table.row_count(),
        table.columns.len()
    );
    if !missing.is_empty() {
        eprintln!("  missing required: {}", missing.join(", "));
    }
}
