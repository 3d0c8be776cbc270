//! Registry file loading shared by the `run` and `check` commands.

use std::path::Path;

use log::{info, warn};

use licsync_recon::{ReconConfig, Table};

use crate::exit_codes::{EXIT_INPUT_READ, EXIT_RUN_INVALID_CONFIG};
use crate::CliError;

fn input_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_INPUT_READ, message: msg.into(), hint: None }
}

/// Parse the column-map config, falling back to the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_RUN_INVALID_CONFIG,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: None,
    })?;
    ReconConfig::from_toml(&text).map_err(|e| CliError {
        code: EXIT_RUN_INVALID_CONFIG,
        message: e.to_string(),
        hint: None,
    })
}

/// True when the path looks like a spreadsheet workbook rather than CSV.
pub fn is_workbook(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("xlsx" | "xlsm" | "xlsb" | "xls")
    )
}

/// Load the facility registry. Workbooks read their first sheet; anything
/// else goes through the delimiter-sniffing CSV path.
pub fn load_facilities(path: &Path) -> Result<Table, CliError> {
    if is_workbook(path) {
        let (table, stats) = licsync_io::xlsx::import_first_sheet(path).map_err(input_err)?;
        info!("facilities: {}", stats.summary());
        if stats.has_warnings() {
            for warning in &stats.warnings {
                warn!("facilities: {warning}");
            }
        }
        Ok(table)
    } else {
        licsync_io::csv::import(path).map_err(input_err)
    }
}

/// Load the provider registry. Workbooks read the configured sheet; both
/// formats get the specialty filter and the column projection applied.
pub fn load_providers(path: &Path, config: &ReconConfig) -> Result<Table, CliError> {
    if is_workbook(path) {
        let (table, stats) = licsync_io::xlsx::import_providers(path, config).map_err(input_err)?;
        info!("providers: {}", stats.summary());
        if stats.has_warnings() {
            for warning in &stats.warnings {
                warn!("providers: {warning}");
            }
        }
        Ok(table)
    } else {
        let mut table = licsync_io::csv::import(path).map_err(input_err)?;
        let source = path.display().to_string();
        let filtered = licsync_io::provider::filter_specialties(&mut table, config, &source)
            .map_err(input_err)?;
        let table = licsync_io::provider::project_columns(table, config);
        if filtered > 0 {
            info!("providers: {} rows · {filtered} filtered out", table.row_count());
        } else {
            info!("providers: {} rows", table.row_count());
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn workbook_detection_is_case_insensitive() {
        assert!(is_workbook(Path::new("PROV.XLSX")));
        assert!(is_workbook(Path::new("registry.xls")));
        assert!(!is_workbook(Path::new("facilities.csv")));
        assert!(!is_workbook(Path::new("no_extension")));
    }

    #[test]
    fn absent_config_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.facility.name, "Name");
        assert_eq!(config.ingest.provider_sheet, "PROV");
    }

    #[test]
    fn unreadable_config_reports_its_path() {
        let err = load_config(Some(Path::new("/nonexistent/columns.toml"))).unwrap_err();
        assert_eq!(err.code, EXIT_RUN_INVALID_CONFIG);
        assert!(err.message.contains("/nonexistent/columns.toml"));
    }

    #[test]
    fn csv_providers_get_the_specialty_filter_too() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("providers.csv");
        std::fs::write(
            &path,
            "NAME,SPECIALTY_DE,LICENSE_NB\n\
             CAPE HOSPITAL,HOSPITAL,100\n\
             MAIN STREET PHARMACY,PHARMACY,200\n",
        )
        .unwrap();
        let config = ReconConfig::from_toml(
            r#"
[ingest]
specialties = ["HOSPITAL"]
"#,
        )
        .unwrap();

        let table = load_providers(&path, &config).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0][0], "CAPE HOSPITAL");
        assert_eq!(
            table.columns,
            vec!["NAME", "LICENSE_NB"],
            "filter column dropped by the projection"
        );
    }

    #[test]
    fn csv_filter_without_its_column_names_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("providers.csv");
        std::fs::write(&path, "NAME\nCAPE HOSPITAL\n").unwrap();
        let config = ReconConfig::from_toml(
            r#"
[ingest]
specialties = ["HOSPITAL"]
"#,
        )
        .unwrap();

        let err = load_providers(&path, &config).unwrap_err();
        assert_eq!(err.code, EXIT_INPUT_READ);
        assert!(err.message.contains("providers.csv"));
        assert!(err.message.contains("SPECIALTY_DE"));
    }
}
