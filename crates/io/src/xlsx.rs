// Excel registry import and result-workbook export

use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use licsync_recon::config::ReconConfig;
use licsync_recon::model::ResultTables;
use licsync_recon::Table;

use crate::provider;

/// Maximum number of cells to import (prevents DoS from huge files)
const MAX_CELLS: usize = 5_000_000;

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Statistics from one worksheet import.
#[derive(Debug, Default, Clone)]
pub struct ImportResult {
    /// Worksheet the rows came from
    pub sheet: String,
    /// Data rows kept (header excluded, filtered rows excluded)
    pub rows_read: usize,
    /// Rows removed by the specialty filter
    pub rows_filtered: usize,
    /// Total cells read
    pub cells_read: usize,
    /// Whether the cell cap cut the import short
    pub truncated: bool,
    /// Actionable warnings (not boilerplate)
    pub warnings: Vec<String>,
    /// Total import duration in milliseconds
    pub import_duration_ms: u128,
}

impl ImportResult {
    /// Returns a summary message suitable for display
    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("sheet '{}'", self.sheet),
            format!("{} rows", self.rows_read),
            format!("{} cells", self.cells_read),
        ];
        if self.rows_filtered > 0 {
            parts.push(format!("{} filtered out", self.rows_filtered));
        }
        parts.join(" · ")
    }

    pub fn has_warnings(&self) -> bool {
        self.truncated || !self.warnings.is_empty()
    }
}

/// Import one worksheet as a headered table. The first row of the used range
/// is the header; every cell is coerced to text. Rows that are entirely
/// blank are skipped.
pub fn import_sheet(path: &Path, sheet_name: &str) -> Result<(Table, ImportResult), String> {
    let start_time = Instant::now();

    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| format!("Failed to open Excel file: {e}"))?;

    let sheet_names = workbook.sheet_names().to_vec();
    if !sheet_names.iter().any(|s| s == sheet_name) {
        return Err(format!(
            "workbook has no sheet named '{sheet_name}' (found: {})",
            sheet_names.join(", ")
        ));
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| format!("Failed to read sheet '{sheet_name}': {e}"))?;

    let mut result = ImportResult {
        sheet: sheet_name.to_string(),
        ..Default::default()
    };

    let mut rows_iter = range.rows();
    let columns: Vec<String> = match rows_iter.next() {
        Some(header) => header.iter().map(cell_to_string).collect(),
        None => Vec::new(),
    };
    result.cells_read += columns.len();

    let mut table = Table::new(columns);
    for row in rows_iter {
        if result.cells_read + row.len() > MAX_CELLS {
            result.truncated = true;
            result
                .warnings
                .push(format!("Import stopped at {MAX_CELLS} cells (limit reached)"));
            break;
        }
        let mut cells: Vec<String> = row.iter().map(cell_to_string).collect();
        result.cells_read += cells.len();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        cells.resize(table.columns.len(), String::new());
        table.rows.push(cells);
    }
    result.rows_read = table.row_count();
    result.import_duration_ms = start_time.elapsed().as_millis();

    Ok((table, result))
}

/// Load the first worksheet in the workbook. Facility exports are
/// single-sheet files whose sheet name varies by vendor.
pub fn import_first_sheet(path: &Path) -> Result<(Table, ImportResult), String> {
    let workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| format!("Failed to open Excel file: {e}"))?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| format!("workbook {} has no sheets", path.display()))?;
    drop(workbook);
    import_sheet(path, &first)
}

/// Load the provider registry worksheet, apply the configured specialty
/// filter, and project to the columns the reconciliation consumes.
pub fn import_providers(
    path: &Path,
    config: &ReconConfig,
) -> Result<(Table, ImportResult), String> {
    let (mut table, mut result) = import_sheet(path, &config.ingest.provider_sheet)?;

    let source = format!("sheet '{}'", config.ingest.provider_sheet);
    result.rows_filtered = provider::filter_specialties(&mut table, config, &source)?;
    result.rows_read = table.row_count();

    Ok((provider::project_columns(table, config), result))
}

/// Coerce one worksheet cell to text. Floats with no fractional part render
/// without decimals; date cells render as naive timestamps the engine's
/// date parsing accepts.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Data::Int(n) => format!("{n}"),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(stamp) => stamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format!("{}", dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Statistics from one workbook export.
#[derive(Debug, Default, Clone)]
pub struct ExportResult {
    pub sheets_exported: usize,
    pub rows_exported: usize,
    pub export_duration_ms: u128,
}

impl ExportResult {
    pub fn summary(&self) -> String {
        format!("{} sheets · {} rows", self.sheets_exported, self.rows_exported)
    }
}

/// Write the five result tables as one workbook, one worksheet per table.
/// Empty tables still produce a worksheet holding only the header row.
pub fn export_results(tables: &ResultTables, path: &Path) -> Result<ExportResult, String> {
    let start_time = Instant::now();
    let mut result = ExportResult::default();

    let mut workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();

    for (name, table) in tables.named() {
        let worksheet = workbook
            .add_worksheet()
            .set_name(name)
            .map_err(|e| format!("Failed to create sheet '{name}': {e}"))?;

        for (col, column) in table.columns.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, column, &header_format)
                .map_err(|e| format!("Failed to write header '{column}': {e}"))?;
        }

        for (r, row) in table.rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                worksheet
                    .write_string((r + 1) as u32, c as u16, value)
                    .map_err(|e| format!("Failed to write cell: {e}"))?;
            }
        }

        result.sheets_exported += 1;
        result.rows_exported += table.row_count();
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {e}"))?;

    result.export_duration_ms = start_time.elapsed().as_millis();
    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
