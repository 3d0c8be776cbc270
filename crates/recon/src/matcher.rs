use std::collections::{BTreeMap, HashSet};

use crate::model::{FacilityRow, MatchStrategy, MatchedPair, ProviderRow, Table};

/// Join the two normalized registries into the matched-pair set.
///
/// Primary join: (name_key, license_key) equality. Fallback join: facility
/// name_key against provider business_entity_key, license_key equality,
/// considering only providers the primary join never touched. Duplicate keys
/// fan out to every combination; no best-match selection happens here.
pub fn match_pairs(
    facility_table: &Table,
    provider_table: &Table,
    facilities: &[FacilityRow],
    providers: &[ProviderRow],
) -> Vec<MatchedPair> {
    if facilities.is_empty() || providers.is_empty() {
        return Vec::new();
    }

    let mut by_name_license: BTreeMap<(&str, &str), Vec<usize>> = BTreeMap::new();
    for (pi, p) in providers.iter().enumerate() {
        by_name_license
            .entry((p.name_key.as_str(), p.license_key.as_str()))
            .or_default()
            .push(pi);
    }

    let mut pairs: Vec<MatchedPair> = Vec::new();
    let mut provider_matched = vec![false; providers.len()];

    for (fi, f) in facilities.iter().enumerate() {
        if let Some(pis) = by_name_license.get(&(f.name_key.as_str(), f.license_key.as_str())) {
            for &pi in pis {
                provider_matched[pi] = true;
                pairs.push(MatchedPair {
                    facility: fi,
                    provider: pi,
                    strategy: MatchStrategy::NameLicense,
                });
            }
        }
    }

    // Fallback index over the remainder. Blank entity keys never join:
    // facilities with a blank name_key were dropped upstream.
    let mut by_entity_license: BTreeMap<(&str, &str), Vec<usize>> = BTreeMap::new();
    for (pi, p) in providers.iter().enumerate() {
        if provider_matched[pi] || p.business_entity_key.is_empty() {
            continue;
        }
        by_entity_license
            .entry((p.business_entity_key.as_str(), p.license_key.as_str()))
            .or_default()
            .push(pi);
    }

    for (fi, f) in facilities.iter().enumerate() {
        if let Some(pis) = by_entity_license.get(&(f.name_key.as_str(), f.license_key.as_str())) {
            for &pi in pis {
                pairs.push(MatchedPair {
                    facility: fi,
                    provider: pi,
                    strategy: MatchStrategy::BusinessEntity,
                });
            }
        }
    }

    dedup_pairs(pairs, facility_table, provider_table, facilities, providers)
}

/// Union dedup: drop a pair when its materialized row (every facility cell
/// followed by every provider cell) duplicates an earlier pair's. Pairs that
/// agree on keys but differ in any other column are both kept.
fn dedup_pairs(
    pairs: Vec<MatchedPair>,
    facility_table: &Table,
    provider_table: &Table,
    facilities: &[FacilityRow],
    providers: &[ProviderRow],
) -> Vec<MatchedPair> {
    let mut seen: HashSet<(&[String], &[String])> = HashSet::new();
    let mut unique = Vec::new();

    for pair in pairs {
        let key = (
            facility_table.rows[facilities[pair.facility].row].as_slice(),
            provider_table.rows[providers[pair.provider].row].as_slice(),
        );
        if seen.insert(key) {
            unique.push(pair);
        }
    }

    unique
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
