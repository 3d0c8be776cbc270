use std::path::PathBuf;

use chrono::NaiveDateTime;

use licsync_recon::config::ReconConfig;
use licsync_recon::engine::run;
use licsync_recon::model::{MatchCategory, ReconInput, ReconResult, Table};

const RUN_AT: &str = "2025-08-01 06:00:00";

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_table(name: &str) -> Table {
    let path = fixtures_dir().join(name);
    let data = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    Table::from_csv(&data, b',').unwrap()
}

fn load_and_run(at: &str) -> ReconResult {
    let input = ReconInput {
        facilities: load_table("facilities.csv"),
        providers: load_table("providers.csv"),
    };
    let run_at = NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M:%S").unwrap();
    run(&ReconConfig::default(), &input, run_at)
}

fn run_inline(facilities_csv: &str, providers_csv: &str, at: &str) -> ReconResult {
    let input = ReconInput {
        facilities: Table::from_csv(facilities_csv, b',').unwrap(),
        providers: Table::from_csv(providers_csv, b',').unwrap(),
    };
    let run_at = NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M:%S").unwrap();
    run(&ReconConfig::default(), &input, run_at)
}

fn cell<'a>(table: &'a Table, row: usize, column: &str) -> &'a str {
    let idx = table
        .column_index(column)
        .unwrap_or_else(|| panic!("no column {column:?} in {:?}", table.columns));
    &table.rows[row][idx]
}

// -------------------------------------------------------------------------
// Full-run tests
// -------------------------------------------------------------------------

#[test]
fn full_run_summary_counts() {
    let result = load_and_run(RUN_AT);

    assert_eq!(result.summary.facility_rows, 6);
    assert_eq!(result.summary.provider_rows, 5);
    assert_eq!(result.summary.facility_rows_dropped, 1);
    assert_eq!(result.summary.provider_rows_dropped, 0);
    assert_eq!(result.summary.primary_matches, 2);
    assert_eq!(result.summary.fallback_matches, 1);
    assert_eq!(result.summary.update_licenses, 2);
    assert_eq!(result.summary.new_licenses, 1);
    assert_eq!(result.summary.expired_licenses, 1);
    assert_eq!(result.summary.update_hospital_beds, 1);
    assert_eq!(result.summary.add_hospital_beds, 1);
    assert!(result.summary.diagnostics.is_empty());
}

#[test]
fn update_rows_carry_both_registries() {
    let result = load_and_run(RUN_AT);
    let table = &result.tables.update_licenses;

    // facility columns, then provider columns, then the two stamps
    assert_eq!(table.columns.len(), 5 + 9 + 2);
    assert_eq!(table.row_count(), 2);

    assert_eq!(cell(table, 0, "Name"), "Cape Coral Hospital");
    assert_eq!(cell(table, 0, "NAME"), "CAPE CORAL HOSPITAL");
    assert_eq!(cell(table, 0, "License Expiration Date"), "06/30/2026");
    assert_eq!(cell(table, 0, "EXPIRATION_DATE"), "06/30/2025");
    assert_eq!(cell(table, 0, "match_timestamp"), RUN_AT);
    assert_eq!(
        cell(table, 0, "match_criteria"),
        "name_and_license_match_with_exp_date_filter"
    );

    // the fallback pair lands in the same table with the same criteria
    assert_eq!(cell(table, 1, "Name"), "Gulf Breeze Surgery Center");
    assert_eq!(cell(table, 1, "NAME"), "GULF BREEZE SURG CTR LLC");
    assert_eq!(cell(table, 1, "License Expiration Date"), "09/30/2026");
}

#[test]
fn new_and_expired_rows() {
    let result = load_and_run(RUN_AT);

    let new = &result.tables.new_licenses;
    assert_eq!(new.row_count(), 1);
    assert_eq!(cell(new, 0, "Name"), "Cape Coral Hospital");
    assert_eq!(cell(new, 0, "License Number"), "HOSP-300");
    assert_eq!(cell(new, 0, "License Expiration Date"), "01/15/2027");
    assert_eq!(cell(new, 0, "match_criteria"), "name_match_but_new_license");

    let expired = &result.tables.expired_licenses;
    assert_eq!(expired.row_count(), 1);
    assert_eq!(cell(expired, 0, "NAME"), "OLD TOWNE REHAB");
    assert_eq!(cell(expired, 0, "EXPIRATION_DATE"), "12/31/2024");
    assert_eq!(cell(expired, 0, "CITY"), "NAPLES", "untouched columns pass through");
    assert_eq!(
        cell(expired, 0, "match_criteria"),
        "expired_license_not_in_facilities"
    );
}

#[test]
fn bed_tables_use_provider_identity_and_facility_counts() {
    let result = load_and_run(RUN_AT);

    let update = &result.tables.update_hospital_beds;
    assert_eq!(update.row_count(), 1);
    assert_eq!(update.rows[0][..6], ["P100", "FB100", "HOSP", "HOSP-100", "120", "08/01/2025"]);
    assert_eq!(
        cell(update, 0, "match_criteria"),
        "name_and_license_match_with_bed_count_filter"
    );

    let add = &result.tables.add_hospital_beds;
    assert_eq!(add.row_count(), 1);
    assert_eq!(add.rows[0][..6], ["P400", "FB400", "ASC", "ASC-400", "12", "08/01/2025"]);
    assert_eq!(
        cell(add, 0, "match_criteria"),
        "name_and_license_match_with_missing_bed_count"
    );
}

#[test]
fn empty_categories_keep_their_headers() {
    // Clock moved before every expiration: nothing is expired, the table
    // still carries its full header.
    let result = load_and_run("2024-01-01 00:00:00");

    assert!(result.tables.expired_licenses.is_empty());
    assert_eq!(result.tables.expired_licenses.columns.len(), 9 + 2);
    assert_eq!(result.summary.expired_licenses, 0);

    // Empty or not, every category table ends in the two stamp columns and
    // every populated row carries that category's criteria constant.
    for category in [
        MatchCategory::UpdateLicense,
        MatchCategory::NewLicense,
        MatchCategory::ExpiredLicense,
        MatchCategory::UpdateBed,
        MatchCategory::AddBed,
    ] {
        let table = result.tables.get(category);
        let width = table.columns.len();
        assert_eq!(table.columns[width - 2], "match_timestamp", "{category}");
        assert_eq!(table.columns[width - 1], "match_criteria", "{category}");
        for row in 0..table.row_count() {
            assert_eq!(table.cell(row, width - 1), category.criteria(), "{category}");
        }
    }
}

// =========================================================================
// Adversarial Tests
// =========================================================================

const FACILITY_HEADER: &str = "Name,License Number,License Expiration Date,Licensed Beds";
const PROVIDER_HEADER: &str =
    "NAME,LICENSE_NB,EXPIRATION_DATE,BUSINESS_ENTITY_NAME,FACILITY_BED_COUNT,PROVIDER_ID,FB_NUMBER,PROVIDER_CATEGORY_CD";

/// Test 1: Duplicate facility rows.
/// Two byte-identical rows collapse to one output row; a third row that
/// differs only in bed count survives as its own match.
#[test]
fn adversarial_duplicate_rows_collapse_but_near_duplicates_fan_out() {
    let facilities = format!(
        "{FACILITY_HEADER}\n\
         Cape Hospital,100,2026-01-01,50\n\
         Cape Hospital,100,2026-01-01,50\n\
         Cape Hospital,100,2026-01-01,60"
    );
    let providers = format!("{PROVIDER_HEADER}\nCAPE HOSPITAL,100,2025-01-01,,40,P1,FB1,HOSP");
    let result = run_inline(&facilities, &providers, RUN_AT);

    assert_eq!(result.tables.update_licenses.row_count(), 2);
    assert_eq!(result.tables.update_hospital_beds.row_count(), 2);
}

/// Test 2: Quoted commas and CRLF line endings.
/// A legal-name comma must survive parsing, key derivation, and output.
#[test]
fn adversarial_quoted_commas_and_crlf() {
    let facilities =
        format!("{FACILITY_HEADER}\r\n\"Hospital, The\",100,2026-01-01,10\r\n");
    let providers =
        format!("{PROVIDER_HEADER}\r\n\"HOSPITAL, THE\",100,2025-01-01,,10,P1,FB1,HOSP\r\n");
    let result = run_inline(&facilities, &providers, RUN_AT);

    assert_eq!(result.summary.primary_matches, 1);
    let table = &result.tables.update_licenses;
    assert_eq!(table.row_count(), 1);
    assert_eq!(cell(table, 0, "Name"), "Hospital, The");
}

/// Test 3: Mixed date formats across the two registries.
/// US-format facility dates and ISO provider dates must compare correctly
/// and both render as MM/DD/YYYY.
#[test]
fn adversarial_mixed_date_formats() {
    let facilities = format!("{FACILITY_HEADER}\nCape Hospital,100,06/30/2026,50");
    let providers = format!("{PROVIDER_HEADER}\nCAPE HOSPITAL,100,2025-06-30,,50,P1,FB1,HOSP");
    let result = run_inline(&facilities, &providers, RUN_AT);

    let table = &result.tables.update_licenses;
    assert_eq!(table.row_count(), 1);
    assert_eq!(cell(table, 0, "License Expiration Date"), "06/30/2026");
    assert_eq!(cell(table, 0, "EXPIRATION_DATE"), "06/30/2025");
}

/// Test 4: Every facility row has blank keys.
/// The facility side cleans down to nothing; providers still flow through
/// the expired filter. No panic, no degraded run.
#[test]
fn adversarial_all_facility_keys_blank() {
    let facilities = format!(
        "{FACILITY_HEADER}\n\
         ,100,2026-01-01,10\n\
         Some Clinic,,2026-01-01,20"
    );
    let providers = format!("{PROVIDER_HEADER}\nOLD CLINIC,300,2020-01-01,,30,P3,FB3,HOSP");
    let result = run_inline(&facilities, &providers, RUN_AT);

    assert_eq!(result.summary.facility_rows_dropped, 2);
    assert!(result.tables.update_licenses.is_empty());
    assert!(result.tables.new_licenses.is_empty());
    assert_eq!(result.tables.expired_licenses.row_count(), 1);
    assert!(result.summary.diagnostics.is_empty());
}

// -------------------------------------------------------------------------
// Golden JSON snapshot tests: lock the output schema
// -------------------------------------------------------------------------

/// Strip the engine version from JSON for stable comparison. The run instant
/// is injected, so everything else is already deterministic.
fn stabilize_json(result: &ReconResult) -> serde_json::Value {
    let mut val = serde_json::to_value(result).unwrap();
    if let Some(meta) = val.get_mut("meta") {
        meta["engine_version"] = serde_json::Value::String("REDACTED".into());
    }
    val
}

fn golden_path(name: &str) -> PathBuf {
    fixtures_dir().join(format!("golden-{name}.json"))
}

/// Compare result against golden file. If golden doesn't exist, create it and
/// pass. If it exists, assert equality.
fn assert_golden(name: &str, result: &ReconResult) {
    let stable = stabilize_json(result);
    let json = serde_json::to_string_pretty(&stable).unwrap();
    let path = golden_path(name);

    if path.exists() {
        let expected = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read golden file {}: {e}", path.display()));
        assert_eq!(
            json.trim(),
            expected.trim(),
            "golden JSON mismatch for '{}'. If the schema change is intentional, delete {} and re-run.",
            name,
            path.display()
        );
    } else {
        std::fs::write(&path, &json)
            .unwrap_or_else(|e| panic!("cannot write golden file {}: {e}", path.display()));
        eprintln!("created golden file: {}", path.display());
    }
}

#[test]
fn golden_full_run() {
    let result = load_and_run(RUN_AT);

    // Structural assertions first
    assert_eq!(result.meta.run_at, RUN_AT);
    assert_eq!(result.meta.run_date, "2025-08-01");
    assert_eq!(result.summary.update_licenses, 2);

    assert_golden("full-run", &result);
}

#[test]
fn golden_schema_fields() {
    let result = load_and_run(RUN_AT);
    let json = serde_json::to_value(&result).unwrap();

    let meta = &json["meta"];
    assert!(meta["engine_version"].is_string());
    assert!(meta["run_at"].is_string());
    assert!(meta["run_date"].is_string());

    let summary = &json["summary"];
    for field in [
        "facility_rows",
        "provider_rows",
        "facility_rows_dropped",
        "provider_rows_dropped",
        "primary_matches",
        "fallback_matches",
        "update_licenses",
        "new_licenses",
        "expired_licenses",
        "update_hospital_beds",
        "add_hospital_beds",
    ] {
        assert!(
            summary[field].is_number(),
            "summary.{} must be a number, got {:?}",
            field,
            summary[field]
        );
    }
    assert!(summary["diagnostics"].is_array());

    let tables = json["tables"].as_object().unwrap();
    assert_eq!(tables.len(), 5);
    for (name, table) in tables {
        assert!(table["columns"].is_array(), "tables.{name}.columns must be an array");
        assert!(table["rows"].is_array(), "tables.{name}.rows must be an array");
        for row in table["rows"].as_array().unwrap() {
            assert_eq!(
                row.as_array().unwrap().len(),
                table["columns"].as_array().unwrap().len(),
                "tables.{name} rows must match header width"
            );
        }
    }
}
