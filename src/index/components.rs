//! Memoized per-record derivations keyed by unit id.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::state::Unit;
use crate::util::normalize_search_text;

/// What: Derived lookup data for one record.
///
/// Inputs:
/// - Built once per unit id by [`ComponentIndex::entry`].
///
/// Output:
/// - Component name set and name → quantity map for the tri-state matcher,
///   plus the normalized search text for the text-search stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitIndexEntry {
    /// Distinct component names.
    pub names: HashSet<String>,
    /// Component name → total mounted quantity.
    pub counts: HashMap<String, u32>,
    /// Lowercased, accent-free `"{chassis} {model}"`.
    pub search_text: String,
}

impl UnitIndexEntry {
    /// What: Derive the entry for `unit`.
    ///
    /// Inputs:
    /// - `unit`: Record to index.
    ///
    /// Output:
    /// - Fresh entry; quantities of repeated component rows are summed.
    #[must_use]
    pub fn build(unit: &Unit) -> Self {
        let mut names = HashSet::with_capacity(unit.components.len());
        let mut counts: HashMap<String, u32> = HashMap::with_capacity(unit.components.len());
        for c in &unit.components {
            if c.name.is_empty() {
                continue;
            }
            names.insert(c.name.clone());
            *counts.entry(c.name.clone()).or_insert(0) += c.quantity.max(1);
        }
        let search_text = normalize_search_text(&format!("{} {}", unit.chassis, unit.model));
        Self {
            names,
            counts,
            search_text,
        }
    }
}

/// What: Side table of [`UnitIndexEntry`] values keyed by unit id.
///
/// Inputs:
/// - Populated lazily on first access per unit.
///
/// Output:
/// - Shared `Arc` entries reused by every pipeline pass.
///
/// Details:
/// - Records are immutable for the lifetime of a dataset, so entries never go stale;
///   the owner clears the table when the dataset is replaced.
/// - A poisoned lock degrades to building uncached entries.
#[derive(Debug, Default)]
pub struct ComponentIndex {
    /// Unit id → derived entry.
    entries: RwLock<HashMap<u32, Arc<UnitIndexEntry>>>,
}

impl ComponentIndex {
    /// Empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What: Fetch or build the entry for `unit`.
    ///
    /// Inputs:
    /// - `unit`: Record whose entry is needed.
    ///
    /// Output:
    /// - Shared entry; built and memoized on first request.
    pub fn entry(&self, unit: &Unit) -> Arc<UnitIndexEntry> {
        if let Ok(g) = self.entries.read()
            && let Some(e) = g.get(&unit.id)
        {
            return Arc::clone(e);
        }
        let built = Arc::new(UnitIndexEntry::build(unit));
        if let Ok(mut g) = self.entries.write() {
            g.entry(unit.id).or_insert_with(|| Arc::clone(&built));
        }
        built
    }

    /// Drop the entry for `id`; returns whether one existed.
    pub fn evict(&self, id: u32) -> bool {
        self.entries
            .write()
            .ok()
            .is_some_and(|mut g| g.remove(&id).is_some())
    }

    /// Drop every entry.
    pub fn clear(&self) {
        if let Ok(mut g) = self.entries.write() {
            g.clear();
        }
    }

    /// Number of memoized entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|g| g.len()).unwrap_or(0)
    }

    /// `true` when nothing is memoized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
