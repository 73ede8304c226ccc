//! Tri-state (OR / AND / NOT) membership matching with quantity thresholds.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::index::{ComponentIndex, UnitIndexEntry};
use crate::state::{MultiState, MultiStateSelection, Unit, UnitField, filter_state};

/// What: A multistate selection split by logic.
///
/// Inputs:
/// - Built from a [`MultiStateSelection`] with [`Partition::new`].
///
/// Output:
/// - OR and AND lists with required counts, a NOT set, and whether any count
///   above one is requested.
///
/// Details:
/// - `off` entries are dropped.
#[derive(Debug, Clone, Default)]
pub struct Partition<'s> {
    /// Names of which at least one must be present.
    pub or: Vec<(&'s str, u32)>,
    /// Names that must all be present.
    pub and: Vec<(&'s str, u32)>,
    /// Names that must all be absent.
    pub not: HashSet<&'s str>,
    /// `true` when quantities must be compared instead of plain membership.
    pub counted: bool,
}

impl<'s> Partition<'s> {
    /// Split `selection` by state.
    #[must_use]
    pub fn new(selection: &'s MultiStateSelection) -> Self {
        let mut p = Self {
            counted: filter_state::needs_quantities(selection),
            ..Self::default()
        };
        for (name, entry) in selection {
            match entry.state {
                MultiState::Or => p.or.push((name.as_str(), entry.count)),
                MultiState::And => p.and.push((name.as_str(), entry.count)),
                MultiState::Not => {
                    p.not.insert(name.as_str());
                }
                MultiState::Off => {}
            }
        }
        p
    }

    /// `true` when nothing constrains (no OR, AND, or NOT entries).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.or.is_empty() && self.and.is_empty() && self.not.is_empty()
    }
}

/// What: One record's label set (and optional quantities) for a field.
///
/// Inputs:
/// - Built with [`UnitMembership::of`].
///
/// Output:
/// - Membership and quantity queries for the matcher and the availability engine.
///
/// Details:
/// - The component field reads the memoized [`ComponentIndex`]; other fields derive
///   labels on the fly, each occurrence counting as one.
#[derive(Debug)]
pub enum UnitMembership<'u> {
    /// Memoized component entry.
    Indexed(Arc<UnitIndexEntry>),
    /// Labels derived directly from the record.
    Derived {
        /// Distinct labels.
        names: HashSet<&'u str>,
        /// Label → occurrences; only built when counting is needed.
        counts: Option<HashMap<&'u str, u32>>,
    },
}

impl<'u> UnitMembership<'u> {
    /// What: Collect `unit`'s membership data for `field`.
    ///
    /// Inputs:
    /// - `unit`: Record.
    /// - `field`: Label field to read.
    /// - `with_counts`: Build the quantity map for derived fields.
    /// - `index`: Memoized component index.
    ///
    /// Output:
    /// - Membership view for the record.
    #[must_use]
    pub fn of(unit: &'u Unit, field: UnitField, with_counts: bool, index: &ComponentIndex) -> Self {
        if field == UnitField::Components {
            return Self::Indexed(index.entry(unit));
        }
        let labels = field.labels(unit);
        let counts = with_counts.then(|| {
            let mut m: HashMap<&'u str, u32> = HashMap::with_capacity(labels.len());
            for l in &labels {
                *m.entry(*l).or_insert(0) += 1;
            }
            m
        });
        Self::Derived {
            names: labels.into_iter().collect(),
            counts,
        }
    }

    /// `true` when the record carries `name`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        match self {
            Self::Indexed(e) => e.names.contains(name),
            Self::Derived { names, .. } => names.contains(name),
        }
    }

    /// Quantity of `name` on the record (0 when absent).
    #[must_use]
    pub fn count(&self, name: &str) -> u32 {
        match self {
            Self::Indexed(e) => e.counts.get(name).copied().unwrap_or(0),
            Self::Derived { names, counts } => counts.as_ref().map_or_else(
                || u32::from(names.contains(name)),
                |m| m.get(name).copied().unwrap_or(0),
            ),
        }
    }

    /// Every distinct name with its quantity.
    #[must_use]
    pub fn quantities(&self) -> Vec<(&str, u32)> {
        match self {
            Self::Indexed(e) => e.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect(),
            Self::Derived { names, .. } => names.iter().map(|n| (*n, self.count(n))).collect(),
        }
    }

    /// `true` when the record satisfies `name` with at least `required` copies.
    #[must_use]
    pub fn satisfies(&self, name: &str, required: u32, counted: bool) -> bool {
        if counted {
            self.count(name) >= required
        } else {
            self.has(name)
        }
    }
}

/// What: Evaluate one record against a partition.
///
/// Inputs:
/// - `membership`: Record's label data.
/// - `partition`: Selection split by logic.
///
/// Output:
/// - `true` when the record passes NOT, then AND, then OR.
#[must_use]
pub fn matches_partition(membership: &UnitMembership<'_>, partition: &Partition<'_>) -> bool {
    if partition.not.iter().any(|n| membership.has(n)) {
        return false;
    }
    if !partition
        .and
        .iter()
        .all(|(n, c)| membership.satisfies(n, *c, partition.counted))
    {
        return false;
    }
    partition.or.is_empty()
        || partition
            .or
            .iter()
            .any(|(n, c)| membership.satisfies(n, *c, partition.counted))
}

/// What: Filter records by a tri-state selection on `field`.
///
/// Inputs:
/// - `units`: Candidate records.
/// - `field`: Label field the selection refers to.
/// - `selection`: Option name → state and count.
/// - `index`: Memoized component index.
///
/// Output:
/// - Records satisfying the selection, in input order; the input is returned
///   unchanged when the selection has no active entries.
#[must_use]
pub fn filter_multistate<'a>(
    units: Vec<&'a Unit>,
    field: UnitField,
    selection: &MultiStateSelection,
    index: &ComponentIndex,
) -> Vec<&'a Unit> {
    let partition = Partition::new(selection);
    if partition.is_empty() {
        return units;
    }
    units
        .into_iter()
        .filter(|u| {
            let m = UnitMembership::of(u, field, partition.counted, index);
            matches_partition(&m, &partition)
        })
        .collect()
}
