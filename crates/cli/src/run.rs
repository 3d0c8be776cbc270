//! `licsync run` - load both registries, reconcile, write the change workbook.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use licsync_recon::ReconInput;

use crate::exit_codes::{EXIT_ERROR, EXIT_RUN_DEGRADED, EXIT_RUN_WRITE};
use crate::load;
use crate::CliError;

fn run_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

pub fn cmd_run(
    facilities: PathBuf,
    providers: PathBuf,
    out: PathBuf,
    config_path: Option<PathBuf>,
    as_of: Option<String>,
    json_output: bool,
) -> Result<(), CliError> {
    let config = load::load_config(config_path.as_deref())?;
    let run_at = resolve_run_at(as_of.as_deref())?;

    let input = ReconInput {
        facilities: load::load_facilities(&facilities)?,
        providers: load::load_providers(&providers, &config)?,
    };

    let result = licsync_recon::run(&config, &input, run_at);

    let export = licsync_io::xlsx::export_results(&result.tables, &out)
        .map_err(|e| run_err(EXIT_RUN_WRITE, e))?;
    eprintln!("wrote {} ({})", out.display(), export.summary());

    if json_output {
        let json_str = serde_json::to_string_pretty(&serde_json::json!({
            "meta": &result.meta,
            "summary": &result.summary,
        }))
        .map_err(|e| run_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "reconciled {} facility rows against {} provider rows: {} license updates, {} new, {} expired, {} bed updates, {} bed adds",
        s.facility_rows,
        s.provider_rows,
        s.update_licenses,
        s.new_licenses,
        s.expired_licenses,
        s.update_hospital_beds,
        s.add_hospital_beds,
    );

    if !s.diagnostics.is_empty() {
        for diagnostic in &s.diagnostics {
            eprintln!("warning: {diagnostic}");
        }
        return Err(run_err(
            EXIT_RUN_DEGRADED,
            format!("run degraded ({} diagnostic(s) reported)", s.diagnostics.len()),
        ));
    }

    Ok(())
}

/// Resolve the injected clock: `--as-of` pins midnight of the given day,
/// otherwise the local wall clock decides what counts as expired.
fn resolve_run_at(as_of: Option<&str>) -> Result<NaiveDateTime, CliError> {
    let Some(raw) = as_of else {
        return Ok(chrono::Local::now().naive_local());
    };
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        CliError::usage(format!("invalid --as-of date: \"{raw}\""))
            .with_hint("expected YYYY-MM-DD, e.g. --as-of 2025-08-01")
    })?;
    Ok(date.and_time(NaiveTime::MIN))
}
