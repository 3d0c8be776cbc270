// Provider registry ingestion rules shared by the workbook and CSV loaders

use licsync_recon::config::ReconConfig;
use licsync_recon::Table;

/// Apply the configured specialty filter in place, returning the number of
/// rows removed. An empty filter list keeps everything; a configured filter
/// whose column is absent is an error naming `source`.
pub fn filter_specialties(
    table: &mut Table,
    config: &ReconConfig,
    source: &str,
) -> Result<usize, String> {
    if config.ingest.specialties.is_empty() {
        return Ok(0);
    }
    let column = &config.ingest.specialty_column;
    let idx = table
        .column_index(column)
        .ok_or_else(|| format!("{source} has no '{column}' column to filter on"))?;
    let before = table.row_count();
    table
        .rows
        .retain(|row| config.ingest.specialties.iter().any(|s| s == &row[idx]));
    Ok(before - table.row_count())
}

/// Keep only the columns the reconciliation consumes, in a stable order.
/// Missing columns stay missing; the engine reports them.
pub fn project_columns(table: Table, config: &ReconConfig) -> Table {
    let wanted = [
        &config.provider.provider_id,
        &config.provider.name,
        &config.provider.fb_number,
        &config.provider.category,
        &config.provider.license,
        &config.provider.expiration,
        &config.provider.business_entity,
        &config.provider.bed_count,
    ];

    let keep: Vec<usize> = wanted
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();

    let mut projected = Table::new(keep.iter().map(|&i| table.columns[i].clone()).collect());
    for row in &table.rows {
        projected
            .rows
            .push(keep.iter().map(|&i| row[i].clone()).collect());
    }
    projected
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
