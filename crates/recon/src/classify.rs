use std::collections::HashSet;

use chrono::NaiveDate;

use crate::model::{FacilityRow, MatchedPair, ProviderRow};

/// Matched pairs that clear the expiration filter: both dates present and
/// the facility's strictly later. Equal dates are not an update.
pub fn update_licenses(
    pairs: &[MatchedPair],
    facilities: &[FacilityRow],
    providers: &[ProviderRow],
) -> Vec<MatchedPair> {
    pairs
        .iter()
        .copied()
        .filter(|p| {
            match (
                facilities[p.facility].expiration,
                providers[p.provider].expiration,
            ) {
                (Some(facility_exp), Some(provider_exp)) => facility_exp > provider_exp,
                _ => false,
            }
        })
        .collect()
}

/// Facility rows whose name the provider registry already knows but whose
/// license number it does not. Global set-membership test against the whole
/// provider table, independent of the pairwise join.
pub fn new_licenses(facilities: &[FacilityRow], providers: &[ProviderRow]) -> Vec<usize> {
    let provider_names: HashSet<&str> = providers.iter().map(|p| p.name_key.as_str()).collect();
    let provider_licenses: HashSet<&str> =
        providers.iter().map(|p| p.license_key.as_str()).collect();

    facilities
        .iter()
        .enumerate()
        .filter(|(_, f)| {
            provider_names.contains(f.name_key.as_str())
                && !provider_licenses.contains(f.license_key.as_str())
        })
        .map(|(i, _)| i)
        .collect()
}

/// Provider rows whose (name_key, license_key) composite is absent from the
/// matched-pair key set and whose expiration is present and strictly before
/// the run date. A missing expiration never counts as expired.
pub fn expired_licenses(
    providers: &[ProviderRow],
    pairs: &[MatchedPair],
    today: NaiveDate,
) -> Vec<usize> {
    let matched_keys: HashSet<(&str, &str)> = pairs
        .iter()
        .map(|p| {
            (
                providers[p.provider].name_key.as_str(),
                providers[p.provider].license_key.as_str(),
            )
        })
        .collect();

    providers
        .iter()
        .enumerate()
        .filter(|(_, p)| !matched_keys.contains(&(p.name_key.as_str(), p.license_key.as_str())))
        .filter(|(_, p)| matches!(p.expiration, Some(exp) if exp < today))
        .map(|(i, _)| i)
        .collect()
}

/// Split the update set by bed-count delta. First: both sides report a count
/// and they differ. Second: provider count missing, facility count present.
/// A pair lands in at most one of the two.
pub fn bed_changes(
    update_pairs: &[MatchedPair],
    facilities: &[FacilityRow],
    providers: &[ProviderRow],
) -> (Vec<MatchedPair>, Vec<MatchedPair>) {
    let mut update_beds = Vec::new();
    let mut add_beds = Vec::new();

    for pair in update_pairs {
        let facility_beds = facilities[pair.facility].beds;
        let provider_beds = providers[pair.provider].bed_count;
        match (facility_beds, provider_beds) {
            (Some(f), Some(p)) if f != p => update_beds.push(*pair),
            (Some(_), None) => add_beds.push(*pair),
            _ => {}
        }
    }

    (update_beds, add_beds)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
