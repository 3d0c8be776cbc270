use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// A headered table of string cells, column order preserved.
///
/// Both input registries and all five output tables use this shape; cells
/// that were absent in the source are empty strings.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Parse headered CSV text. Ragged rows are padded (or truncated) to the
    /// header width.
    pub fn from_csv(data: &str, delimiter: u8) -> Result<Self, ReconError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(data.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| ReconError::Io(e.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ReconError::Io(e.to_string()))?;
            let mut row: Vec<String> = record.iter().map(|v| v.to_string()).collect();
            row.resize(columns.len(), String::new());
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The two registries handed to the engine, already loaded into memory.
#[derive(Debug, Clone)]
pub struct ReconInput {
    pub facilities: Table,
    pub providers: Table,
}

// ---------------------------------------------------------------------------
// Normalized rows
// ---------------------------------------------------------------------------

/// A facility row that survived key derivation. `row` indexes the source
/// table; derived fields never overwrite source cells.
#[derive(Debug, Clone)]
pub struct FacilityRow {
    pub row: usize,
    pub name_key: String,
    pub license_key: String,
    pub expiration: Option<NaiveDate>,
    pub beds: Option<f64>,
}

/// A provider row that survived key derivation.
#[derive(Debug, Clone)]
pub struct ProviderRow {
    pub row: usize,
    pub name_key: String,
    pub license_key: String,
    pub business_entity_key: String,
    pub expiration: Option<NaiveDate>,
    pub bed_count: Option<f64>,
}

// ---------------------------------------------------------------------------
// Pair matching
// ---------------------------------------------------------------------------

/// Which join produced a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Primary equi-join on (name_key, license_key).
    NameLicense,
    /// Fallback equi-join on (business_entity_key, license_key).
    BusinessEntity,
}

/// One facility x provider combination. Indices point into the normalized
/// row vectors, not the source tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedPair {
    pub facility: usize,
    pub provider: usize,
    pub strategy: MatchStrategy,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchCategory {
    UpdateLicense,
    NewLicense,
    ExpiredLicense,
    UpdateBed,
    AddBed,
}

impl MatchCategory {
    /// Output table / worksheet name.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::UpdateLicense => "update_licenses",
            Self::NewLicense => "new_licenses",
            Self::ExpiredLicense => "expired_licenses",
            Self::UpdateBed => "update_hospital_beds",
            Self::AddBed => "add_hospital_beds",
        }
    }

    /// The `match_criteria` constant stamped on every row of the category.
    pub fn criteria(&self) -> &'static str {
        match self {
            Self::UpdateLicense => "name_and_license_match_with_exp_date_filter",
            Self::NewLicense => "name_match_but_new_license",
            Self::ExpiredLicense => "expired_license_not_in_facilities",
            Self::UpdateBed => "name_and_license_match_with_bed_count_filter",
            Self::AddBed => "name_and_license_match_with_missing_bed_count",
        }
    }
}

impl std::fmt::Display for MatchCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

/// The five classified output tables. Always complete: an empty category is
/// a zero-row table with its full header, never absent.
#[derive(Debug, Clone, Serialize)]
pub struct ResultTables {
    pub update_licenses: Table,
    pub new_licenses: Table,
    pub expired_licenses: Table,
    pub update_hospital_beds: Table,
    pub add_hospital_beds: Table,
}

impl ResultTables {
    pub fn get(&self, category: MatchCategory) -> &Table {
        match category {
            MatchCategory::UpdateLicense => &self.update_licenses,
            MatchCategory::NewLicense => &self.new_licenses,
            MatchCategory::ExpiredLicense => &self.expired_licenses,
            MatchCategory::UpdateBed => &self.update_hospital_beds,
            MatchCategory::AddBed => &self.add_hospital_beds,
        }
    }

    /// Tables in workbook sheet order.
    pub fn named(&self) -> [(&'static str, &Table); 5] {
        [
            (MatchCategory::UpdateLicense.table_name(), &self.update_licenses),
            (MatchCategory::NewLicense.table_name(), &self.new_licenses),
            (MatchCategory::ExpiredLicense.table_name(), &self.expired_licenses),
            (MatchCategory::UpdateBed.table_name(), &self.update_hospital_beds),
            (MatchCategory::AddBed.table_name(), &self.add_hospital_beds),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub facility_rows: usize,
    pub provider_rows: usize,
    pub facility_rows_dropped: usize,
    pub provider_rows_dropped: usize,
    pub primary_matches: usize,
    pub fallback_matches: usize,
    pub update_licenses: usize,
    pub new_licenses: usize,
    pub expired_licenses: usize,
    pub update_hospital_beds: usize,
    pub add_hospital_beds: usize,
    pub diagnostics: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub engine_version: String,
    /// Injected run instant, stamped into `match_timestamp`.
    pub run_at: String,
    /// Date portion of the run instant; drives the expired filter.
    pub run_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub tables: ResultTables,
}
