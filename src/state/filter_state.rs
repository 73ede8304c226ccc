//! User filter selections: values, the touched flag, and replace-on-copy updates.

use std::collections::BTreeMap;

use serde::Serialize;

/// Per-option state of a tri-state (multistate) dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MultiState {
    /// Record must match at least one OR option.
    #[default]
    Or,
    /// Record must match every AND option.
    And,
    /// Record must match no NOT option.
    Not,
    /// Option is present in the selection but inert.
    Off,
}

/// One option's tri-state selection with its required quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionEntry {
    /// Membership logic for this option.
    pub state: MultiState,
    /// Minimum number of copies a record must carry; always at least 1.
    pub count: u32,
}

impl SelectionEntry {
    /// Build an entry, clamping `count` to at least 1.
    #[must_use]
    pub fn new(state: MultiState, count: u32) -> Self {
        Self {
            state,
            count: count.max(1),
        }
    }

    /// Plain OR membership with quantity 1.
    #[must_use]
    pub const fn or() -> Self {
        Self {
            state: MultiState::Or,
            count: 1,
        }
    }

    /// AND membership with quantity 1.
    #[must_use]
    pub const fn and() -> Self {
        Self {
            state: MultiState::And,
            count: 1,
        }
    }

    /// NOT membership.
    #[must_use]
    pub const fn not() -> Self {
        Self {
            state: MultiState::Not,
            count: 1,
        }
    }
}

/// Option name → tri-state entry for one multistate dropdown.
pub type MultiStateSelection = BTreeMap<String, SelectionEntry>;

/// What: Report whether a tri-state selection asks for a quantity above one.
///
/// Inputs:
/// - `selection`: Multistate selection to inspect.
///
/// Output:
/// - `true` when some OR/AND entry carries `count > 1`.
///
/// Details:
/// - NOT and `off` entries never require counting.
#[must_use]
pub fn needs_quantities(selection: &MultiStateSelection) -> bool {
    selection
        .values()
        .any(|e| matches!(e.state, MultiState::Or | MultiState::And) && e.count > 1)
}

/// Closed numeric interval selected on a range filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeValue {
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
}

impl RangeValue {
    /// Construct `[min, max]` as given (no reordering).
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `true` when `value` lies within the interval, bounds included.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// What: Clamp this interval into `bounds`.
    ///
    /// Inputs:
    /// - `bounds`: Interval to clamp into.
    ///
    /// Output:
    /// - Both endpoints limited to `bounds`; endpoints swapped if they end up inverted.
    #[must_use]
    pub fn clamp_into(&self, bounds: Self) -> Self {
        let lo = self.min.max(bounds.min).min(bounds.max);
        let hi = self.max.min(bounds.max).max(bounds.min);
        if lo > hi {
            Self::new(hi, lo)
        } else {
            Self::new(lo, hi)
        }
    }
}

/// Value held by one filter; its shape follows the filter definition's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Plain dropdown: ordered, de-duplicated option names (OR semantics).
    Selection(Vec<String>),
    /// Tri-state dropdown.
    MultiState(MultiStateSelection),
    /// Numeric range.
    Range(RangeValue),
}

impl FilterValue {
    /// What: Build a plain dropdown selection from names.
    ///
    /// Inputs:
    /// - `names`: Option names in selection order.
    ///
    /// Output:
    /// - `FilterValue::Selection` keeping first occurrences only.
    #[must_use]
    pub fn selection<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for n in names {
            let n = n.into();
            if !out.contains(&n) {
                out.push(n);
            }
        }
        Self::Selection(out)
    }

    /// `true` when the value cannot constrain anything (empty selection).
    #[must_use]
    pub fn is_empty_selection(&self) -> bool {
        match self {
            Self::Selection(names) => names.is_empty(),
            Self::MultiState(map) => map.values().all(|e| e.state == MultiState::Off),
            Self::Range(_) => false,
        }
    }
}

/// One filter's value plus whether the user has actively set it.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterEntry {
    /// Current value.
    pub value: FilterValue,
    /// `true` once the user (or restored state) set this filter.
    pub touched: bool,
}

/// What: Immutable snapshot of every filter's value and touched flag.
///
/// Inputs:
/// - Built empty, then replaced one key at a time through [`FilterState::with_filter`]
///   and friends, or wholesale by URL restoration.
///
/// Output:
/// - Read by the filtering pipeline, the availability engine, and the URL codec.
///
/// Details:
/// - Updates return a new snapshot and never mutate `self`, so older snapshots
///   remain valid for comparison.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    /// Entries keyed by filter key.
    entries: BTreeMap<String, FilterEntry>,
}

impl FilterState {
    /// Empty state: no filter touched.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry stored for `key`, touched or not.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FilterEntry> {
        self.entries.get(key)
    }

    /// Value of `key` only when it is touched.
    #[must_use]
    pub fn active(&self, key: &str) -> Option<&FilterValue> {
        self.entries
            .get(key)
            .filter(|e| e.touched)
            .map(|e| &e.value)
    }

    /// `true` when `key` is actively constraining.
    #[must_use]
    pub fn is_touched(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|e| e.touched)
    }

    /// Number of touched filters.
    #[must_use]
    pub fn touched_count(&self) -> usize {
        self.entries.values().filter(|e| e.touched).count()
    }

    /// Iterate every stored entry in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Return a copy with `key` set to `value` and marked touched.
    #[must_use]
    pub fn with_filter(&self, key: &str, value: FilterValue) -> Self {
        self.with_entry(key, value, true)
    }

    /// Return a copy with `key` set to `value` and the given touched flag.
    #[must_use]
    pub fn with_entry(&self, key: &str, value: FilterValue, touched: bool) -> Self {
        let mut next = self.clone();
        next.entries
            .insert(key.to_string(), FilterEntry { value, touched });
        next
    }

    /// Return a copy where `key` keeps its value but no longer constrains.
    #[must_use]
    pub fn with_untouched(&self, key: &str) -> Self {
        let mut next = self.clone();
        if let Some(entry) = next.entries.get_mut(key) {
            entry.touched = false;
        }
        next
    }

    /// Return a copy without any entry for `key`.
    #[must_use]
    pub fn without(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.entries.remove(key);
        next
    }

    /// `true` when both states constrain identically (untouched entries ignored).
    #[must_use]
    pub fn same_constraints(&self, other: &Self) -> bool {
        let a = self.entries.iter().filter(|(_, e)| e.touched);
        let b = other.entries.iter().filter(|(_, e)| e.touched);
        a.eq(b)
    }
}
