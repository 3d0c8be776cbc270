use chrono::{NaiveDate, NaiveDateTime};
use log::{error, info, warn};

use crate::classify;
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::matcher::match_pairs;
use crate::model::{
    FacilityRow, MatchCategory, MatchStrategy, MatchedPair, ProviderRow, ReconInput, ReconResult,
    ResultTables, RunMeta, Table,
};
use crate::normalize::{self, format_bed_count, FacilityIdx, ProviderIdx};
use crate::summary;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const OUTPUT_DATE_FORMAT: &str = "%m/%d/%Y";

const MATCH_TIMESTAMP_COLUMN: &str = "match_timestamp";
const MATCH_CRITERIA_COLUMN: &str = "match_criteria";
const EFFECTIVE_DATE_COLUMN: &str = "EFFECTIVE_DATE";

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run one reconciliation against the injected clock. Never fails: input
/// problems degrade to a complete set of empty tables, with the cause logged
/// and recorded in `summary.diagnostics`.
pub fn run(config: &ReconConfig, input: &ReconInput, run_at: NaiveDateTime) -> ReconResult {
    match try_run(config, input, run_at) {
        Ok(result) => result,
        Err(err) => {
            match &err {
                ReconError::EmptyTable { .. } => warn!("{err}"),
                _ => error!("reconciliation returned empty results: {err}"),
            }
            degraded(config, input, run_at, vec![err.to_string()])
        }
    }
}

/// Like [`run`], but surfaces validation problems as errors instead of
/// degrading. The pipeline itself cannot fail once validation passes.
pub fn try_run(
    config: &ReconConfig,
    input: &ReconInput,
    run_at: NaiveDateTime,
) -> Result<ReconResult, ReconError> {
    if input.facilities.is_empty() {
        return Err(ReconError::EmptyTable {
            table: "facility".into(),
        });
    }
    if input.providers.is_empty() {
        return Err(ReconError::EmptyTable {
            table: "provider".into(),
        });
    }

    info!("facility data: {} rows", input.facilities.row_count());
    info!("provider data: {} rows", input.providers.row_count());

    let facility_idx = normalize::resolve_facility_columns(&input.facilities, config)?;
    let provider_idx = normalize::resolve_provider_columns(&input.providers, config)?;

    let mut diagnostics: Vec<String> = Vec::new();

    let (facilities, facility_dropped) = normalize::facility_rows(&input.facilities, &facility_idx);
    let (providers, provider_dropped) = normalize::provider_rows(&input.providers, &provider_idx);
    if facility_dropped > 0 {
        info!("dropped {facility_dropped} facility rows with blank name or license keys");
    }
    if provider_dropped > 0 {
        info!("dropped {provider_dropped} provider rows with blank name or license keys");
    }
    info!(
        "after cleaning: facilities={}, providers={}",
        facilities.len(),
        providers.len()
    );

    let pairs = match_pairs(&input.facilities, &input.providers, &facilities, &providers);
    let primary = pairs
        .iter()
        .filter(|p| p.strategy == MatchStrategy::NameLicense)
        .count();
    info!(
        "matched pairs: {} ({primary} primary, {} fallback)",
        pairs.len(),
        pairs.len() - primary
    );

    let update_pairs = classify::update_licenses(&pairs, &facilities, &providers);
    info!(
        "update licenses: {} records with facility expiration past provider expiration",
        update_pairs.len()
    );

    let new_rows = classify::new_licenses(&facilities, &providers);
    info!(
        "new licenses: {} records where name exists but license is new",
        new_rows.len()
    );

    let expired_rows = classify::expired_licenses(&providers, &pairs, run_at.date());
    info!(
        "expired licenses: {} unmatched records past expiration",
        expired_rows.len()
    );

    let (update_bed_pairs, add_bed_pairs) = if provider_idx.passthrough.is_some() {
        classify::bed_changes(&update_pairs, &facilities, &providers)
    } else {
        let missing: Vec<&str> = config
            .provider_passthrough()
            .iter()
            .copied()
            .filter(|name| input.providers.column_index(name).is_none())
            .collect();
        let note = format!(
            "bed-change output disabled: provider table lacks column(s): {}",
            missing.join(", ")
        );
        warn!("{note}");
        diagnostics.push(note);
        (Vec::new(), Vec::new())
    };

    let tables = finalize(
        config,
        input,
        &facilities,
        &providers,
        &facility_idx,
        &provider_idx,
        &update_pairs,
        &new_rows,
        &expired_rows,
        &update_bed_pairs,
        &add_bed_pairs,
        run_at,
    );

    let summary = summary::build_summary(
        input,
        facility_dropped,
        provider_dropped,
        &pairs,
        &tables,
        diagnostics,
    );
    info!(
        "successfully processed: update_licenses={}, new_licenses={}, expired_licenses={}, update_hospital_beds={}, add_hospital_beds={}",
        summary.update_licenses,
        summary.new_licenses,
        summary.expired_licenses,
        summary.update_hospital_beds,
        summary.add_hospital_beds
    );

    Ok(ReconResult {
        meta: meta(run_at),
        summary,
        tables,
    })
}

// ---------------------------------------------------------------------------
// Finalize
// ---------------------------------------------------------------------------

fn finalize(
    config: &ReconConfig,
    input: &ReconInput,
    facilities: &[FacilityRow],
    providers: &[ProviderRow],
    facility_idx: &FacilityIdx,
    provider_idx: &ProviderIdx,
    update_pairs: &[MatchedPair],
    new_rows: &[usize],
    expired_rows: &[usize],
    update_bed_pairs: &[MatchedPair],
    add_bed_pairs: &[MatchedPair],
    run_at: NaiveDateTime,
) -> ResultTables {
    let stamp = run_at.format(TIMESTAMP_FORMAT).to_string();

    let mut update_licenses = Table::new(update_columns(input));
    for pair in update_pairs {
        let facility = &facilities[pair.facility];
        let provider = &providers[pair.provider];
        let mut row = output_cells(
            &input.facilities,
            facility.row,
            facility_idx.expiration,
            facility.expiration,
        );
        row.extend(output_cells(
            &input.providers,
            provider.row,
            provider_idx.expiration,
            provider.expiration,
        ));
        row.push(stamp.clone());
        row.push(MatchCategory::UpdateLicense.criteria().to_string());
        update_licenses.rows.push(row);
    }

    let mut new_licenses = Table::new(new_columns(input));
    for &i in new_rows {
        let facility = &facilities[i];
        let mut row = output_cells(
            &input.facilities,
            facility.row,
            facility_idx.expiration,
            facility.expiration,
        );
        row.push(stamp.clone());
        row.push(MatchCategory::NewLicense.criteria().to_string());
        new_licenses.rows.push(row);
    }

    let mut expired_licenses = Table::new(expired_columns(input));
    for &i in expired_rows {
        let provider = &providers[i];
        let mut row = output_cells(
            &input.providers,
            provider.row,
            provider_idx.expiration,
            provider.expiration,
        );
        row.push(stamp.clone());
        row.push(MatchCategory::ExpiredLicense.criteria().to_string());
        expired_licenses.rows.push(row);
    }

    ResultTables {
        update_licenses,
        new_licenses,
        expired_licenses,
        update_hospital_beds: bed_table(
            config,
            input,
            facilities,
            providers,
            provider_idx,
            update_bed_pairs,
            MatchCategory::UpdateBed,
            run_at,
            &stamp,
        ),
        add_hospital_beds: bed_table(
            config,
            input,
            facilities,
            providers,
            provider_idx,
            add_bed_pairs,
            MatchCategory::AddBed,
            run_at,
            &stamp,
        ),
    }
}

/// Source row padded to header width, with the expiration cell re-serialized
/// as MM/DD/YYYY when it parsed. Cells that never parsed pass through as-is.
fn output_cells(table: &Table, row: usize, exp_col: usize, exp: Option<NaiveDate>) -> Vec<String> {
    let mut cells = table.rows[row].clone();
    cells.resize(table.columns.len(), String::new());
    if let Some(date) = exp {
        cells[exp_col] = date.format(OUTPUT_DATE_FORMAT).to_string();
    }
    cells
}

#[allow(clippy::too_many_arguments)]
fn bed_table(
    config: &ReconConfig,
    input: &ReconInput,
    facilities: &[FacilityRow],
    providers: &[ProviderRow],
    provider_idx: &ProviderIdx,
    pairs: &[MatchedPair],
    category: MatchCategory,
    run_at: NaiveDateTime,
    stamp: &str,
) -> Table {
    let mut table = Table::new(bed_columns(config));

    let passthrough = match provider_idx.passthrough {
        Some(p) => p,
        None => return table,
    };
    let effective_date = run_at.date().format(OUTPUT_DATE_FORMAT).to_string();

    for pair in pairs {
        let provider = &providers[pair.provider];
        let new_count = facilities[pair.facility]
            .beds
            .map(format_bed_count)
            .unwrap_or_default();
        table.rows.push(vec![
            input
                .providers
                .cell(provider.row, passthrough.provider_id)
                .to_string(),
            input
                .providers
                .cell(provider.row, passthrough.fb_number)
                .to_string(),
            input
                .providers
                .cell(provider.row, passthrough.category)
                .to_string(),
            input
                .providers
                .cell(provider.row, provider_idx.license)
                .to_string(),
            new_count,
            effective_date.clone(),
            stamp.to_string(),
            category.criteria().to_string(),
        ]);
    }

    table
}

// ---------------------------------------------------------------------------
// Output shapes
// ---------------------------------------------------------------------------

fn stamp_columns(mut columns: Vec<String>) -> Vec<String> {
    columns.push(MATCH_TIMESTAMP_COLUMN.into());
    columns.push(MATCH_CRITERIA_COLUMN.into());
    columns
}

fn update_columns(input: &ReconInput) -> Vec<String> {
    let mut columns = input.facilities.columns.clone();
    columns.extend(input.providers.columns.iter().cloned());
    stamp_columns(columns)
}

fn new_columns(input: &ReconInput) -> Vec<String> {
    stamp_columns(input.facilities.columns.clone())
}

fn expired_columns(input: &ReconInput) -> Vec<String> {
    stamp_columns(input.providers.columns.clone())
}

fn bed_columns(config: &ReconConfig) -> Vec<String> {
    vec![
        config.provider.provider_id.clone(),
        config.provider.fb_number.clone(),
        config.provider.category.clone(),
        config.provider.license.clone(),
        config.provider.bed_count.clone(),
        EFFECTIVE_DATE_COLUMN.into(),
        MATCH_TIMESTAMP_COLUMN.into(),
        MATCH_CRITERIA_COLUMN.into(),
    ]
}

fn meta(run_at: NaiveDateTime) -> RunMeta {
    RunMeta {
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        run_at: run_at.format(TIMESTAMP_FORMAT).to_string(),
        run_date: run_at.date().to_string(),
    }
}

/// Complete result with the expected table shapes and zero rows everywhere.
fn degraded(
    config: &ReconConfig,
    input: &ReconInput,
    run_at: NaiveDateTime,
    diagnostics: Vec<String>,
) -> ReconResult {
    ReconResult {
        meta: meta(run_at),
        summary: summary::empty_summary(input, diagnostics),
        tables: ResultTables {
            update_licenses: Table::new(update_columns(input)),
            new_licenses: Table::new(new_columns(input)),
            expired_licenses: Table::new(expired_columns(input)),
            update_hospital_beds: Table::new(bed_columns(config)),
            add_hospital_beds: Table::new(bed_columns(config)),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
