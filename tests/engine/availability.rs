//! Integration tests for option availability.
//!
//! Tests cover:
//! - Own-filter exclusion from context sets
//! - Jointly satisfiable tri-state options and quantity sums
//! - Range clamping into available bounds
//! - Tag option refresh after edits

#![cfg(test)]

use unitfacet::logic::FilterOptions;
use unitfacet::state::{FilterValue, MultiState, MultiStateSelection, RangeValue, SelectionEntry};

use crate::common::engine;

/// Names listed for a dropdown filter.
fn names(e: &unitfacet::FacetEngine<unitfacet::index::Catalog>, key: &str) -> Vec<String> {
    match e.filter_option(key).map(|v| v.options) {
        Some(FilterOptions::Dropdown { options, .. }) => options.into_iter().map(|o| o.name).collect(),
        _ => Vec::new(),
    }
}

#[test]
/// What: A filter's own selection does not shrink its options
///
/// Inputs:
/// - `weightClass = [Light]`.
///
/// Output:
/// - All four classes still listed; the type list narrows to `Mek`.
fn integration_availability_excludes_own_filter() {
    let mut e = engine();
    e.set_filter("weightClass", FilterValue::selection(["Light"]));
    assert_eq!(names(&e, "weightClass"), ["Light", "Medium", "Heavy", "Assault"]);
    assert_eq!(names(&e, "type"), ["Mek"]);
}

#[test]
/// What: Tri-state options report joint satisfiability
///
/// Inputs:
/// - Equipment `PPC` AND.
///
/// Output:
/// - Options mounted alongside a PPC are available; `AC/20` and `Gauss Rifle` are not;
///   no counts without a quantity request.
fn integration_availability_and_subset() {
    let mut e = engine();
    let mut sel = MultiStateSelection::new();
    sel.insert("PPC".into(), SelectionEntry::and());
    e.set_filter("equipment", FilterValue::MultiState(sel));
    let view = e.filter_option("equipment").expect("equipment view");
    for name in ["PPC", "Medium Laser", "SRM 6", "LRM 10", "Machine Gun"] {
        assert!(view.option(name).is_some_and(|o| o.available), "{name} should be available");
    }
    for name in ["AC/20", "Gauss Rifle"] {
        assert!(view.option(name).is_some_and(|o| !o.available), "{name} should be unavailable");
    }
    assert!(view.option("PPC").is_some_and(|o| o.count.is_none()));
}

#[test]
/// What: Quantity requests expose summed counts per option
///
/// Inputs:
/// - Equipment `Medium Laser` OR with count 2.
///
/// Output:
/// - `Medium Laser` sums to 10 and `Machine Gun` to 4 across the dataset.
fn integration_availability_quantity_sums() {
    let mut e = engine();
    let mut sel = MultiStateSelection::new();
    sel.insert("Medium Laser".into(), SelectionEntry::new(MultiState::Or, 2));
    e.set_filter("equipment", FilterValue::MultiState(sel));
    let view = e.filter_option("equipment").expect("equipment view");
    assert_eq!(view.option("Medium Laser").and_then(|o| o.count), Some(10));
    assert_eq!(view.option("Machine Gun").and_then(|o| o.count), Some(4));
}

#[test]
/// What: Stored ranges clamp into the available bounds
///
/// Inputs:
/// - Tons `[10, 1000]`; then weight class `Medium` narrows the context to 45..50.
///
/// Output:
/// - Exposed value `[20, 100]`, then `[45, 50]`; the total stays `[20, 100]`.
fn integration_availability_range_clamp() {
    let mut e = engine();
    e.set_filter("tons", FilterValue::Range(RangeValue::new(10.0, 1000.0)));
    let check = |e: &unitfacet::FacetEngine<unitfacet::index::Catalog>, lo: f64, hi: f64| {
        match e.filter_option("tons").map(|v| v.options) {
            Some(FilterOptions::Range { value, total, .. }) => {
                assert_eq!(value, RangeValue::new(lo, hi));
                assert_eq!(total, RangeValue::new(20.0, 100.0));
            }
            other => panic!("unexpected tons view: {other:?}"),
        }
    };
    check(&e, 20.0, 100.0);
    e.set_filter("weightClass", FilterValue::selection(["Medium"]));
    check(&e, 45.0, 50.0);
}

#[test]
/// What: Tag options follow tag edits
///
/// Inputs:
/// - Tag `lance-a` set on two units, then removed from one.
///
/// Output:
/// - Tag listed after the first edit and still listed after the second.
fn integration_availability_tags_refresh() {
    let mut e = engine();
    assert!(names(&e, "tags").is_empty());
    e.catalog_mut().set_tags(1, vec!["lance-a".into()]);
    e.catalog_mut().set_tags(4, vec!["lance-a".into(), "scouts".into()]);
    assert_eq!(names(&e, "tags"), ["lance-a", "scouts"]);
    e.catalog_mut().set_tags(4, Vec::new());
    assert_eq!(names(&e, "tags"), ["lance-a"]);
}
