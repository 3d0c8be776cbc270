use chrono::{NaiveDate, NaiveDateTime};

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::model::{FacilityRow, ProviderRow, Table};

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

/// Uppercased, trimmed, inner whitespace collapsed to single spaces.
pub fn name_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_uppercase()
}

/// Uppercased and trimmed, otherwise verbatim.
pub fn license_key(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Non-alphanumeric characters other than spaces stripped, then trimmed and
/// uppercased. "A & B Corp." and "A  B CORP" both survive as comparable keys.
pub fn business_entity_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_uppercase()
}

// ---------------------------------------------------------------------------
// Value coercion
// ---------------------------------------------------------------------------

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse an expiration cell. Unparseable values are missing, never errors.
pub fn parse_expiration(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Coerce a bed-count cell to a number. Non-numeric values are missing.
pub fn parse_bed_count(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    let parsed: f64 = value.parse().ok()?;
    parsed.is_finite().then_some(parsed)
}

/// Render a bed count for output: integral values without a decimal point.
pub fn format_bed_count(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct FacilityIdx {
    pub name: usize,
    pub license: usize,
    pub expiration: usize,
    pub beds: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct PassthroughIdx {
    pub provider_id: usize,
    pub fb_number: usize,
    pub category: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ProviderIdx {
    pub name: usize,
    pub license: usize,
    pub expiration: usize,
    pub business_entity: usize,
    pub bed_count: usize,
    /// None when any of the three identifier columns is absent; the bed
    /// tables stay empty in that case.
    pub passthrough: Option<PassthroughIdx>,
}

pub fn resolve_facility_columns(
    table: &Table,
    config: &ReconConfig,
) -> Result<FacilityIdx, ReconError> {
    let mut missing: Vec<String> = Vec::new();
    let mut idx = |name: &str| -> usize {
        match table.column_index(name) {
            Some(i) => i,
            None => {
                missing.push(name.to_string());
                0
            }
        }
    };

    let resolved = FacilityIdx {
        name: idx(&config.facility.name),
        license: idx(&config.facility.license),
        expiration: idx(&config.facility.expiration),
        beds: idx(&config.facility.beds),
    };

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(ReconError::MissingColumns {
            table: "facility".into(),
            columns: missing,
        })
    }
}

pub fn resolve_provider_columns(
    table: &Table,
    config: &ReconConfig,
) -> Result<ProviderIdx, ReconError> {
    let mut missing: Vec<String> = Vec::new();
    let mut idx = |name: &str| -> usize {
        match table.column_index(name) {
            Some(i) => i,
            None => {
                missing.push(name.to_string());
                0
            }
        }
    };

    let name = idx(&config.provider.name);
    let license = idx(&config.provider.license);
    let expiration = idx(&config.provider.expiration);
    let business_entity = idx(&config.provider.business_entity);
    let bed_count = idx(&config.provider.bed_count);

    if !missing.is_empty() {
        return Err(ReconError::MissingColumns {
            table: "provider".into(),
            columns: missing,
        });
    }

    let passthrough = match (
        table.column_index(&config.provider.provider_id),
        table.column_index(&config.provider.fb_number),
        table.column_index(&config.provider.category),
    ) {
        (Some(provider_id), Some(fb_number), Some(category)) => Some(PassthroughIdx {
            provider_id,
            fb_number,
            category,
        }),
        _ => None,
    };

    Ok(ProviderIdx {
        name,
        license,
        expiration,
        business_entity,
        bed_count,
        passthrough,
    })
}

// ---------------------------------------------------------------------------
// Row normalization
// ---------------------------------------------------------------------------

/// Derive keys and coerced values for every facility row. Rows whose name or
/// license key comes out blank are unusable for joining and are dropped; the
/// second element is the dropped count.
pub fn facility_rows(table: &Table, idx: &FacilityIdx) -> (Vec<FacilityRow>, usize) {
    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for i in 0..table.row_count() {
        let name = name_key(table.cell(i, idx.name));
        let license = license_key(table.cell(i, idx.license));
        if name.is_empty() || license.is_empty() {
            dropped += 1;
            continue;
        }
        rows.push(FacilityRow {
            row: i,
            name_key: name,
            license_key: license,
            expiration: parse_expiration(table.cell(i, idx.expiration)),
            beds: parse_bed_count(table.cell(i, idx.beds)),
        });
    }

    (rows, dropped)
}

pub fn provider_rows(table: &Table, idx: &ProviderIdx) -> (Vec<ProviderRow>, usize) {
    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for i in 0..table.row_count() {
        let name = name_key(table.cell(i, idx.name));
        let license = license_key(table.cell(i, idx.license));
        if name.is_empty() || license.is_empty() {
            dropped += 1;
            continue;
        }
        rows.push(ProviderRow {
            row: i,
            name_key: name,
            license_key: license,
            business_entity_key: business_entity_key(table.cell(i, idx.business_entity)),
            expiration: parse_expiration(table.cell(i, idx.expiration)),
            bed_count: parse_bed_count(table.cell(i, idx.bed_count)),
        });
    }

    (rows, dropped)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
