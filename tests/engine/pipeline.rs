//! Integration tests for the filtering pipeline.
//!
//! Tests cover:
//! - Toggle restore for every registered filter
//! - Tri-state NOT dominance
//! - OR-groups and disjoint terms in text search
//! - Sentinel-aware ranges and era/faction scoping

#![cfg(test)]

use unitfacet::logic::FilterOptions;
use unitfacet::state::{
    FilterKind, FilterValue, MultiState, MultiStateSelection, RangeValue, SelectionEntry, SortDirection,
    SortKey,
};

use crate::common::{engine, visible};

#[test]
/// What: Applying then clearing any filter restores the result set
///
/// Inputs:
/// - For each registered filter: its first available option, or the lower half of its range.
///
/// Output:
/// - Visible ids after clearing equal those before applying.
///
/// Details:
/// - Filters without options (no tags in the fixture) are skipped.
fn integration_pipeline_toggle_restores_every_filter() {
    let mut e = engine();
    let before = visible(&e);
    let defs: Vec<_> = e.registry().iter().copied().collect();
    for def in defs {
        let Some(view) = e.filter_option(def.key) else {
            panic!("missing view for {}", def.key);
        };
        let value = match (&def.kind, &view.options) {
            (FilterKind::Dropdown(spec), FilterOptions::Dropdown { options, .. }) => {
                let Some(first) = options.first() else {
                    continue;
                };
                if spec.multistate {
                    let mut sel = MultiStateSelection::new();
                    sel.insert(first.name.clone(), SelectionEntry::or());
                    FilterValue::MultiState(sel)
                } else {
                    FilterValue::selection([first.name.clone()])
                }
            }
            (FilterKind::Range(_), FilterOptions::Range { total, .. }) => {
                FilterValue::Range(RangeValue::new(total.min, f64::midpoint(total.min, total.max)))
            }
            _ => panic!("view kind does not match definition for {}", def.key),
        };
        e.set_filter(def.key, value);
        e.clear_filter(def.key);
        assert_eq!(visible(&e), before, "toggle of {} changed results", def.key);
    }
}

#[test]
/// What: A NOT entry removes its possessors whatever OR/AND say
///
/// Inputs:
/// - Equipment `Medium Laser` AND and `PPC` OR, then `PPC` NOT added on `SRM 6`.
///
/// Output:
/// - PPC carriers disappear once NOT is set.
fn integration_pipeline_not_dominates() {
    let mut e = engine();
    let mut sel = MultiStateSelection::new();
    sel.insert("Medium Laser".into(), SelectionEntry::and());
    sel.insert("PPC".into(), SelectionEntry::or());
    e.set_filter("equipment", FilterValue::MultiState(sel.clone()));
    assert_eq!(visible(&e), vec![6, 3]);
    sel.insert("PPC".into(), SelectionEntry::not());
    sel.insert("SRM 6".into(), SelectionEntry::or());
    e.set_filter("equipment", FilterValue::MultiState(sel));
    assert_eq!(visible(&e), vec![1]);
}

#[test]
/// What: Quantity requirements on AND entries
///
/// Inputs:
/// - `Medium Laser` AND with count 2.
///
/// Output:
/// - Atlas, Hunchback, and Warhammer (two or more mounted).
fn integration_pipeline_and_quantity() {
    let mut e = engine();
    let mut sel = MultiStateSelection::new();
    sel.insert("Medium Laser".into(), SelectionEntry::new(MultiState::And, 2));
    e.set_filter("equipment", FilterValue::MultiState(sel));
    assert_eq!(visible(&e), vec![1, 4, 3]);
}

#[test]
/// What: Comma-separated search terms are alternatives
///
/// Inputs:
/// - `"atlas, warhammer"`, then `"hunch 4g"` within one group.
///
/// Output:
/// - Both named units, then the Hunchback only.
fn integration_pipeline_text_search_groups() {
    let mut e = engine();
    e.set_search("atlas, warhammer");
    assert_eq!(visible(&e), vec![1, 3]);
    e.set_search("hunch 4g");
    assert_eq!(visible(&e), vec![4]);
    e.set_search("  ");
    assert_eq!(visible(&e).len(), 6);
}

#[test]
/// What: Sentinel values pass only ranges starting at zero
///
/// Inputs:
/// - Jump range `[0, 50]` then `[5, 50]`; the Manticore's jump is `-1`.
///
/// Output:
/// - Manticore kept in the first, dropped in the second.
fn integration_pipeline_ignored_sentinel() {
    let mut e = engine();
    e.set_filter("jump", FilterValue::Range(RangeValue::new(0.0, 50.0)));
    assert!(visible(&e).contains(&6));
    e.set_filter("jump", FilterValue::Range(RangeValue::new(5.0, 50.0)));
    assert_eq!(visible(&e), vec![5]);
}

#[test]
/// What: Era filters drop extinct units; factions are scoped by era
///
/// Inputs:
/// - Era `Clan Invasion`, then faction `Draconis Combine` added, then era `Star League`.
///
/// Output:
/// - Locust (extinct there) removed; faction narrows to the Warhammer; no Combine units
///   in the Star League.
fn integration_pipeline_era_faction_scoping() {
    let mut e = engine();
    e.set_filter("era", FilterValue::selection(["Clan Invasion"]));
    assert_eq!(visible(&e), vec![1, 4, 6, 5, 3]);
    e.set_filter("faction", FilterValue::selection(["Draconis Combine"]));
    assert_eq!(visible(&e), vec![3]);
    e.set_filter("era", FilterValue::selection(["Star League"]));
    assert!(visible(&e).is_empty());
    e.clear_filter("era");
    assert_eq!(visible(&e), vec![2, 3]);
}

#[test]
/// What: Sorting is total and reversible
///
/// Inputs:
/// - Year ascending, then descending (Locust and Manticore share 2499).
///
/// Output:
/// - Ties broken by name; descending is the exact reverse.
fn integration_pipeline_sort_total_order() {
    let mut e = engine();
    e.set_sort(SortKey::Year, SortDirection::Asc);
    let asc = visible(&e);
    assert_eq!(asc, vec![2, 6, 3, 4, 1, 5]);
    e.set_sort(SortKey::Year, SortDirection::Desc);
    let mut desc = visible(&e);
    desc.reverse();
    assert_eq!(desc, asc);
}
