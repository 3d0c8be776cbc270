use crate::model::{MatchStrategy, MatchedPair, ReconInput, ResultTables, RunSummary};

/// Assemble the per-run summary from stage outputs.
pub fn build_summary(
    input: &ReconInput,
    facility_rows_dropped: usize,
    provider_rows_dropped: usize,
    pairs: &[MatchedPair],
    tables: &ResultTables,
    diagnostics: Vec<String>,
) -> RunSummary {
    let primary_matches = pairs
        .iter()
        .filter(|p| p.strategy == MatchStrategy::NameLicense)
        .count();

    RunSummary {
        facility_rows: input.facilities.row_count(),
        provider_rows: input.providers.row_count(),
        facility_rows_dropped,
        provider_rows_dropped,
        primary_matches,
        fallback_matches: pairs.len() - primary_matches,
        update_licenses: tables.update_licenses.row_count(),
        new_licenses: tables.new_licenses.row_count(),
        expired_licenses: tables.expired_licenses.row_count(),
        update_hospital_beds: tables.update_hospital_beds.row_count(),
        add_hospital_beds: tables.add_hospital_beds.row_count(),
        diagnostics,
    }
}

/// Summary for a degraded run: observed input sizes, zero everywhere else.
pub fn empty_summary(input: &ReconInput, diagnostics: Vec<String>) -> RunSummary {
    RunSummary {
        facility_rows: input.facilities.row_count(),
        provider_rows: input.providers.row_count(),
        facility_rows_dropped: 0,
        provider_rows_dropped: 0,
        primary_matches: 0,
        fallback_matches: 0,
        update_licenses: 0,
        new_licenses: 0,
        expired_licenses: 0,
        update_hospital_beds: 0,
        add_hospital_beds: 0,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Table;

    fn empty_named(columns: &[&str]) -> Table {
        Table::new(columns.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn strategy_counts_split() {
        let input = ReconInput {
            facilities: empty_named(&["Name"]),
            providers: empty_named(&["NAME"]),
        };
        let pairs = vec![
            MatchedPair {
                facility: 0,
                provider: 0,
                strategy: MatchStrategy::NameLicense,
            },
            MatchedPair {
                facility: 0,
                provider: 1,
                strategy: MatchStrategy::BusinessEntity,
            },
            MatchedPair {
                facility: 1,
                provider: 2,
                strategy: MatchStrategy::NameLicense,
            },
        ];
        let tables = ResultTables {
            update_licenses: empty_named(&[]),
            new_licenses: empty_named(&[]),
            expired_licenses: empty_named(&[]),
            update_hospital_beds: empty_named(&[]),
            add_hospital_beds: empty_named(&[]),
        };

        let summary = build_summary(&input, 2, 3, &pairs, &tables, vec!["note".into()]);
        assert_eq!(summary.primary_matches, 2);
        assert_eq!(summary.fallback_matches, 1);
        assert_eq!(summary.facility_rows_dropped, 2);
        assert_eq!(summary.provider_rows_dropped, 3);
        assert_eq!(summary.diagnostics, vec!["note"]);
    }
}
