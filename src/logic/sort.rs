//! Result ordering: a total comparator over every sort key.

use std::cmp::Ordering;

use crate::logic::bv::BvContext;
use crate::state::{SortDirection, SortKey, Unit};

/// Case-insensitive text comparison with a case-sensitive tie-break.
fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// What: Default name ordering: chassis, then model, then year.
///
/// Inputs:
/// - `a`, `b`: Records to compare.
///
/// Output:
/// - Ordering used by the `name` key and as the tie-break for every other key.
#[must_use]
pub fn compare_by_name(a: &Unit, b: &Unit) -> Ordering {
    cmp_text(&a.chassis, &b.chassis)
        .then_with(|| cmp_text(&a.model, &b.model))
        .then_with(|| a.year.cmp(&b.year))
}

/// What: Total comparator for a sort key, before direction is applied.
///
/// Inputs:
/// - `key`: Selected sort key.
/// - `bv`: Adjusted battle value evaluator.
/// - `a`, `b`: Records to compare.
///
/// Output:
/// - Key ordering, then [`compare_by_name`], then unit id.
#[must_use]
pub fn compare_units(key: SortKey, bv: &BvContext<'_>, a: &Unit, b: &Unit) -> Ordering {
    let primary = match key {
        SortKey::Name => Ordering::Equal,
        SortKey::Bv => bv.value(a).total_cmp(&bv.value(b)),
        other => other.field().compare(a, b),
    };
    primary
        .then_with(|| compare_by_name(a, b))
        .then_with(|| a.id.cmp(&b.id))
}

/// What: Sort records in place by key and direction.
///
/// Inputs:
/// - `units`: Records to sort.
/// - `key`: Selected sort key.
/// - `direction`: Ascending or descending.
/// - `bv`: Adjusted battle value evaluator.
///
/// Output:
/// - `units` reordered; the order is fully determined by the record contents.
///
/// Details:
/// - `desc` reverses the whole comparison, tie-breaks included.
pub fn sort_units(units: &mut [&Unit], key: SortKey, direction: SortDirection, bv: &BvContext<'_>) {
    if key == SortKey::Bv && !bv.is_default() {
        // Adjust each record once instead of on every comparison.
        let mut keyed: Vec<(f64, &Unit)> = units.iter().map(|u| (bv.value(u), *u)).collect();
        keyed.sort_by(|(va, a), (vb, b)| {
            let ord = va
                .total_cmp(vb)
                .then_with(|| compare_by_name(a, b))
                .then_with(|| a.id.cmp(&b.id));
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        for (slot, (_, u)) in units.iter_mut().zip(keyed) {
            *slot = u;
        }
        return;
    }
    units.sort_by(|a, b| {
        let ord = compare_units(key, bv, a, b);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}
