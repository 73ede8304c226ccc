//! Integration tests for URL state restoration.
//!
//! Tests cover:
//! - Round-trip of filter states built through `set_filter`
//! - Foreign parameter preservation
//! - Malformed and stale filter strings
//! - Deferred restore until the catalog is ready

#![cfg(test)]

use unitfacet::FacetEngine;
use unitfacet::index::Catalog;
use unitfacet::state::{
    FilterRegistry, FilterValue, MultiState, MultiStateSelection, RangeValue, SelectionEntry,
};

use crate::common::{catalog, engine, visible};

/// Encode `e`, restore into a fresh engine, and compare constraints and results.
fn assert_round_trip(e: &FacetEngine<Catalog>) {
    let qs = e.to_query_string();
    let mut restored = engine();
    restored.restore_from_query(&qs);
    assert!(
        restored.filters().same_constraints(e.filters()),
        "constraints differ after restoring {qs}"
    );
    assert_eq!(visible(&restored), visible(e), "results differ after restoring {qs}");
    assert_eq!(restored.to_query_string(), qs);
}

#[test]
/// What: Filter states round-trip through the query string
///
/// Inputs:
/// - Plain selections with reserved characters, tri-state entries with counts,
///   fractional ranges, and era/faction selections.
///
/// Output:
/// - Each restored engine has the same constraints, results, and query string.
fn integration_url_round_trip_states() {
    let mut e = engine();
    e.set_filter("weightClass", FilterValue::selection(["Heavy", "Assault"]));
    assert_round_trip(&e);

    let mut eq = MultiStateSelection::new();
    eq.insert("AC/20".into(), SelectionEntry::or());
    eq.insert("Medium Laser".into(), SelectionEntry::new(MultiState::Or, 3));
    eq.insert("Machine Gun".into(), SelectionEntry::not());
    e.set_filter("equipment", FilterValue::MultiState(eq));
    assert_round_trip(&e);

    e.set_filter("tons", FilterValue::Range(RangeValue::new(20.5, 99.25)));
    e.set_filter("faction", FilterValue::selection(["Federated Suns"]));
    e.set_filter("era", FilterValue::selection(["Succession Wars", "Clan Invasion"]));
    e.set_filter("quirks", {
        let mut q = MultiStateSelection::new();
        q.insert("Command Mek".into(), SelectionEntry::and());
        FilterValue::MultiState(q)
    });
    assert_round_trip(&e);

    e.set_search("atlas; hunch");
    e.set_skills(2, 3);
    e.set_expanded(true);
    assert_round_trip(&e);
}

#[test]
/// What: Foreign parameters are preserved across rewrites
///
/// Inputs:
/// - Existing query with `tab`, `utm_source`, and stale owned parameters.
///
/// Output:
/// - Foreign parameters verbatim and in order, followed by the session.
fn integration_url_merge_keeps_foreign_params() {
    let mut e = engine();
    e.set_filter("type", FilterValue::selection(["Tank"]));
    let merged = e.merge_into_query("?tab=list&sort=bv&utm_source=a%2Bb&filters=x");
    assert_eq!(merged, "tab=list&utm_source=a%2Bb&filters=type%3ATank");
}

#[test]
/// What: Malformed segments are skipped and stale names dropped
///
/// Inputs:
/// - Segments without a key, an unknown key, a bad range, and a role list mixing
///   stale and present names.
///
/// Output:
/// - Only the valid role and tonnage constraints survive.
fn integration_url_tolerates_bad_segments() {
    let mut e = engine();
    e.restore_from_query(
        "filters=nonsense%7Cspeed%3Afast%7Cbv%3Aabc%7Crole%3AGhost%2CScout%7Ctons%3A10-30&sortDir=desc",
    );
    assert_eq!(e.filters().touched_count(), 2);
    assert_eq!(visible(&e), vec![2]);
    e.restore_from_query("filters=role%3AGhost");
    assert_eq!(e.filters().touched_count(), 0);
}

#[test]
/// What: Invalid escapes restore no filters but keep other parameters
///
/// Inputs:
/// - `filters` whose option name holds a broken escape, plus `q`.
///
/// Output:
/// - Empty filter state; search restored.
fn integration_url_invalid_encoding_yields_empty_state() {
    let mut e = engine();
    e.set_filter("type", FilterValue::selection(["Mek"]));
    e.restore_from_query("q=locust&filters=type%3AMek%2C%25G1");
    assert_eq!(e.filters().touched_count(), 0);
    assert_eq!(visible(&e), vec![2]);
}

#[test]
/// What: Restoring before data is ready waits for the catalog
///
/// Inputs:
/// - Pending catalog, a restored query, then the real catalog.
///
/// Output:
/// - Empty results while pending; the query applies once ready.
fn integration_url_restore_waits_for_data() {
    let mut e = FacetEngine::new(Catalog::pending(), FilterRegistry::standard());
    e.restore_from_query("filters=techBase%3AClan&gunnery=2");
    assert!(e.filtered_units().is_empty());
    assert!(e.filter_options().iter().all(|v| v.option("Clan").is_none()));
    e.replace_catalog(catalog());
    assert_eq!(visible(&e), vec![5]);
    assert_eq!(e.session().gunnery, 2);
}
