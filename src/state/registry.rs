//! Declarative filter definitions.
//!
//! The registry is an immutable table handed to the engine at construction.
//! Each definition names its key, the record field (or external index) it
//! reads, and a kind-specific configuration.

use crate::state::types::UnitField;

/// Where a filter reads its values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    /// A field on the record itself.
    Field(UnitField),
    /// Era membership index (external).
    Era,
    /// Faction membership index (external).
    Faction,
}

/// Dropdown-specific configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropdownSpec {
    /// Per-option OR/AND/NOT selection instead of a plain OR set.
    pub multistate: bool,
    /// Options carry quantities that selections may threshold on.
    pub countable: bool,
    /// Preferred option order; entries ending in `*` are prefix groups.
    pub sort_order: &'static [&'static str],
}

/// Range-specific configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSpec {
    /// Slider response curve exponent forwarded to the UI.
    pub curve: f64,
    /// Sentinel values meaning "unknown"; kept only when the range starts at 0.
    pub ignored_values: &'static [f64],
}

impl RangeSpec {
    /// `true` when `value` is one of the sentinel values.
    #[must_use]
    pub fn is_ignored(&self, value: f64) -> bool {
        self.ignored_values.iter().any(|v| (*v - value).abs() < f64::EPSILON)
    }
}

/// Filter kind, dispatched on at every pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    /// Option list.
    Dropdown(DropdownSpec),
    /// Numeric interval.
    Range(RangeSpec),
}

/// One filterable facet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterDefinition {
    /// Stable key used in state and URLs.
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Value source.
    pub source: FilterSource,
    /// Kind-specific configuration.
    pub kind: FilterKind,
}

impl FilterDefinition {
    /// `true` for era/faction filters resolved through id indices.
    #[must_use]
    pub const fn is_external(&self) -> bool {
        !matches!(self.source, FilterSource::Field(_))
    }

    /// Record field for non-external filters.
    #[must_use]
    pub const fn field(&self) -> Option<UnitField> {
        match self.source {
            FilterSource::Field(f) => Some(f),
            FilterSource::Era | FilterSource::Faction => None,
        }
    }

    /// Dropdown configuration, if this is a dropdown.
    #[must_use]
    pub const fn dropdown(&self) -> Option<&DropdownSpec> {
        match &self.kind {
            FilterKind::Dropdown(d) => Some(d),
            FilterKind::Range(_) => None,
        }
    }

    /// Range configuration, if this is a range.
    #[must_use]
    pub const fn range(&self) -> Option<&RangeSpec> {
        match &self.kind {
            FilterKind::Range(r) => Some(r),
            FilterKind::Dropdown(_) => None,
        }
    }

    /// `true` for tri-state dropdowns.
    #[must_use]
    pub const fn is_multistate(&self) -> bool {
        matches!(self.kind, FilterKind::Dropdown(DropdownSpec { multistate: true, .. }))
    }
}

/// Shorthand for a plain dropdown definition.
const fn dropdown(
    key: &'static str,
    label: &'static str,
    source: FilterSource,
    sort_order: &'static [&'static str],
) -> FilterDefinition {
    FilterDefinition {
        key,
        label,
        source,
        kind: FilterKind::Dropdown(DropdownSpec {
            multistate: false,
            countable: false,
            sort_order,
        }),
    }
}

/// Shorthand for a tri-state dropdown definition.
const fn multistate(
    key: &'static str,
    label: &'static str,
    field: UnitField,
    countable: bool,
) -> FilterDefinition {
    FilterDefinition {
        key,
        label,
        source: FilterSource::Field(field),
        kind: FilterKind::Dropdown(DropdownSpec {
            multistate: true,
            countable,
            sort_order: &[],
        }),
    }
}

/// Shorthand for a range definition.
const fn range(
    key: &'static str,
    label: &'static str,
    field: UnitField,
    curve: f64,
    ignored_values: &'static [f64],
) -> FilterDefinition {
    FilterDefinition {
        key,
        label,
        source: FilterSource::Field(field),
        kind: FilterKind::Range(RangeSpec {
            curve,
            ignored_values,
        }),
    }
}

/// Built-in facet table, in display order.
const STANDARD_FILTERS: &[FilterDefinition] = &[
    dropdown("era", "Era", FilterSource::Era, &[]),
    dropdown("faction", "Faction", FilterSource::Faction, &[]),
    dropdown(
        "type",
        "Type",
        FilterSource::Field(UnitField::Type),
        &["Mek", "ProtoMek", "Tank", "VTOL", "Naval", "Infantry", "Battle Armor", "Aero*"],
    ),
    dropdown(
        "subtype",
        "Subtype",
        FilterSource::Field(UnitField::Subtype),
        &["BattleMek*", "Industrial*", "Combat Vehicle*", "Support Vehicle*"],
    ),
    dropdown(
        "techBase",
        "Tech",
        FilterSource::Field(UnitField::TechBase),
        &["Inner Sphere", "Clan", "Mixed*"],
    ),
    dropdown("role", "Role", FilterSource::Field(UnitField::Role), &[]),
    dropdown(
        "weightClass",
        "Weight Class",
        FilterSource::Field(UnitField::WeightClass),
        &["Ultra Light*", "Light", "Medium", "Heavy", "Assault", "Colossal*", "Small*", "Large*"],
    ),
    dropdown(
        "level",
        "Rules",
        FilterSource::Field(UnitField::Level),
        &["Introductory", "Standard", "Advanced", "Experimental", "Unofficial"],
    ),
    dropdown("source", "Source", FilterSource::Field(UnitField::Source), &[]),
    multistate("equipment", "Equipment", UnitField::Components, true),
    multistate("quirks", "Quirks", UnitField::Quirks, false),
    multistate("features", "Features", UnitField::Features, false),
    multistate("tags", "Tags", UnitField::Tags, false),
    range("bv", "BV", UnitField::Bv, 0.5, &[]),
    range("pv", "PV", UnitField::Pv, 1.0, &[]),
    range("tons", "Tons", UnitField::Tons, 1.0, &[]),
    range("armor", "Armor", UnitField::Armor, 0.5, &[]),
    range("internal", "Structure", UnitField::Internal, 0.5, &[]),
    range("walk", "Walk MP", UnitField::Walk, 1.0, &[]),
    range("run", "Run MP", UnitField::Run, 1.0, &[]),
    range("jump", "Jump MP", UnitField::Jump, 1.0, &[-1.0]),
    range("heat", "Alpha Heat", UnitField::Heat, 1.0, &[]),
    range("dissipation", "Dissipation", UnitField::Dissipation, 1.0, &[]),
    range("year", "Year", UnitField::Year, 1.0, &[]),
    range("cost", "Cost", UnitField::Cost, 0.25, &[-1.0]),
];

/// What: Ordered, immutable collection of filter definitions.
///
/// Inputs:
/// - [`FilterRegistry::standard`] for the built-in table, or
///   [`FilterRegistry::new`] for a custom table (tests, embedders).
///
/// Output:
/// - Lookup by key and iteration in declared order.
///
/// Details:
/// - Declared order is the pipeline's application order and the URL codec's
///   serialization order.
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    /// Definitions in declared order.
    defs: Vec<FilterDefinition>,
}

impl FilterRegistry {
    /// Wrap a custom definition list; later duplicates of a key are dropped.
    #[must_use]
    pub fn new(defs: Vec<FilterDefinition>) -> Self {
        let mut unique: Vec<FilterDefinition> = Vec::with_capacity(defs.len());
        for def in defs {
            if unique.iter().any(|d| d.key == def.key) {
                tracing::warn!(key = def.key, "duplicate filter key dropped");
                continue;
            }
            unique.push(def);
        }
        Self { defs: unique }
    }

    /// Built-in table.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(STANDARD_FILTERS.to_vec())
    }

    /// Definition for `key`, if known.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FilterDefinition> {
        self.defs.iter().find(|d| d.key == key)
    }

    /// Definitions in declared order.
    pub fn iter(&self) -> impl Iterator<Item = &FilterDefinition> {
        self.defs.iter()
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// `true` when the registry holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Standard table shape
    ///
    /// - Input: Built-in registry
    /// - Output: Unique keys; externals first; jump/cost declare the -1 sentinel
    fn registry_standard_table_shape() {
        let reg = FilterRegistry::standard();
        assert_eq!(reg.len(), STANDARD_FILTERS.len());
        let era = reg.get("era").expect("era filter");
        assert!(era.is_external());
        assert!(reg.get("faction").is_some_and(FilterDefinition::is_external));
        let equipment = reg.get("equipment").expect("equipment filter");
        assert!(equipment.is_multistate());
        assert!(equipment.dropdown().is_some_and(|d| d.countable));
        let jump = reg.get("jump").and_then(FilterDefinition::range).expect("jump range");
        assert!(jump.is_ignored(-1.0));
        assert!(!jump.is_ignored(0.0));
        assert!(reg.get("nope").is_none());
    }

    #[test]
    /// What: Duplicate keys are dropped on construction
    ///
    /// - Input: Two definitions sharing a key
    /// - Output: Only the first survives
    fn registry_drops_duplicate_keys() {
        let reg = FilterRegistry::new(vec![
            range("tons", "Tons", UnitField::Tons, 1.0, &[]),
            range("tons", "Tonnage", UnitField::Tons, 1.0, &[]),
        ]);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("tons").map(|d| d.label), Some("Tons"));
    }
}
