//! Option availability: which filter values remain selectable given every other filter.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::logic::filter::{
    PipelineContext, apply_filters, era_member_ids, faction_member_ids, numeric_value,
    selected_era_ids,
};
use crate::logic::smart_sort::smart_sort;
use crate::logic::tristate::{Partition, UnitMembership, matches_partition};
use crate::state::{
    DropdownSpec, FilterDefinition, FilterKind, FilterSource, FilterState, FilterValue,
    MultiStateSelection, RangeSpec, RangeValue, Unit, UnitField, filter_state,
};

/// One selectable dropdown option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    /// Option name.
    pub name: String,
    /// `true` when choosing this option can still yield results.
    pub available: bool,
    /// Summed quantity across the context set, for countable filters asking for counts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

/// Kind-specific option metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterOptions {
    /// Dropdown option list.
    Dropdown {
        /// Tri-state selection applies.
        multistate: bool,
        /// Options in display order.
        options: Vec<OptionView>,
    },
    /// Range bounds.
    Range {
        /// Bounds observed in the context set.
        available: RangeValue,
        /// Interval to display: the touched value clamped into `available`, else `available`.
        value: RangeValue,
        /// Dataset-wide bounds.
        total: RangeValue,
        /// Slider curve exponent.
        curve: f64,
    },
}

/// What: Option metadata for one filter.
///
/// Inputs:
/// - Produced by [`filter_views`].
///
/// Output:
/// - Key, label, touched flag, and kind-specific options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterView {
    /// Filter key.
    pub key: &'static str,
    /// Display label.
    pub label: &'static str,
    /// `true` when the filter currently constrains.
    pub touched: bool,
    /// Options or bounds.
    pub options: FilterOptions,
}

impl FilterView {
    /// Option entry by name, for dropdown views.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&OptionView> {
        match &self.options {
            FilterOptions::Dropdown { options, .. } => options.iter().find(|o| o.name == name),
            FilterOptions::Range { .. } => None,
        }
    }
}

/// What: Names of `def` present in a context set.
///
/// Inputs:
/// - `ctx`: Pipeline context.
/// - `def`: Dropdown definition.
/// - `state`: Filter state (faction presence honours the era filter).
/// - `context`: Records surviving every other filter.
///
/// Output:
/// - Field dropdowns: distinct labels, sorted.
/// - Era: era names (catalog order) with a non-extinct member in `context`.
/// - Faction: faction names fielding a member of `context`, scoped to the selected eras.
#[must_use]
pub fn present_names(
    ctx: &PipelineContext<'_>,
    def: &FilterDefinition,
    state: &FilterState,
    context: &[&Unit],
) -> Vec<String> {
    match def.source {
        FilterSource::Field(field) => {
            let mut names: BTreeSet<String> = BTreeSet::new();
            for unit in context {
                if field == UnitField::Components {
                    names.extend(ctx.index.entry(unit).names.iter().cloned());
                } else {
                    names.extend(field.labels(unit).into_iter().map(str::to_string));
                }
            }
            names.into_iter().collect()
        }
        FilterSource::Era => {
            let ids: HashSet<u32> = context.iter().map(|u| u.id).collect();
            ctx.catalog
                .eras()
                .iter()
                .filter(|era| !era_member_ids(ctx.catalog, era).is_disjoint(&ids))
                .map(|era| era.name.clone())
                .collect()
        }
        FilterSource::Faction => {
            let ids: HashSet<u32> = context.iter().map(|u| u.id).collect();
            let scope = selected_era_ids(ctx, state, Some(def.key));
            ctx.catalog
                .factions()
                .iter()
                .filter(|f| !faction_member_ids(f, scope.as_deref()).is_disjoint(&ids))
                .map(|f| f.name.clone())
                .collect()
        }
    }
}

/// What: Names jointly satisfiable with the current AND/NOT entries.
///
/// Inputs:
/// - `ctx`: Pipeline context.
/// - `field`: Label field of the multistate filter.
/// - `selection`: Current tri-state selection.
/// - `context`: Records surviving every other filter.
///
/// Output:
/// - `None` when there are no AND/NOT entries (every present name is valid);
///   otherwise the names carried by context records meeting every AND entry and no NOT entry.
///
/// Details:
/// - OR entries are ignored here.
fn validity_names(
    ctx: &PipelineContext<'_>,
    field: UnitField,
    selection: &MultiStateSelection,
    context: &[&Unit],
) -> Option<HashSet<String>> {
    let mut partition = Partition::new(selection);
    partition.or.clear();
    if partition.is_empty() {
        return None;
    }
    let mut names = HashSet::new();
    for unit in context {
        let m = UnitMembership::of(unit, field, partition.counted, ctx.index);
        if matches_partition(&m, &partition) {
            names.extend(m.quantities().into_iter().map(|(n, _)| n.to_string()));
        }
    }
    Some(names)
}

/// Sum each name's quantity over `context`.
fn summed_quantities(
    ctx: &PipelineContext<'_>,
    field: UnitField,
    context: &[&Unit],
) -> HashMap<String, u32> {
    let mut totals: HashMap<String, u32> = HashMap::new();
    for unit in context {
        let m = UnitMembership::of(unit, field, true, ctx.index);
        for (name, qty) in m.quantities() {
            *totals.entry(name.to_string()).or_insert(0) += qty;
        }
    }
    totals
}

/// What: Build the option list for a dropdown.
///
/// Inputs:
/// - `ctx`: Pipeline context.
/// - `def`: Dropdown definition and `spec` its configuration.
/// - `value`: Active value, if the filter is touched.
/// - `context`: Records surviving every other filter.
/// - `present`: Names present in `context` (see [`present_names`]).
///
/// Output:
/// - Options in display order with availability flags and optional counts.
fn dropdown_options(
    ctx: &PipelineContext<'_>,
    def: &FilterDefinition,
    spec: &DropdownSpec,
    value: Option<&FilterValue>,
    context: &[&Unit],
    present: &[String],
) -> Vec<OptionView> {
    let present_set: HashSet<&str> = present.iter().map(String::as_str).collect();
    let ordered: Vec<String> = match def.source {
        FilterSource::Era => ctx.catalog.eras().iter().map(|e| e.name.clone()).collect(),
        FilterSource::Faction => smart_sort(
            ctx.catalog.factions().iter().map(|f| f.name.clone()),
            spec.sort_order,
        ),
        FilterSource::Field(_) => {
            let mut names: BTreeSet<String> = present.iter().cloned().collect();
            match value {
                Some(FilterValue::Selection(sel)) => names.extend(sel.iter().cloned()),
                Some(FilterValue::MultiState(sel)) => names.extend(sel.keys().cloned()),
                _ => {}
            }
            smart_sort(names, spec.sort_order)
        }
    };
    let (valid, counts) = match (def.field(), value) {
        (Some(field), Some(FilterValue::MultiState(sel))) if spec.multistate => {
            let counts = (spec.countable && filter_state::needs_quantities(sel))
                .then(|| summed_quantities(ctx, field, context));
            (validity_names(ctx, field, sel, context), counts)
        }
        _ => (None, None),
    };
    ordered
        .into_iter()
        .map(|name| {
            let available = valid.as_ref().map_or_else(
                || present_set.contains(name.as_str()),
                |v| v.contains(&name),
            );
            let count = counts
                .as_ref()
                .map(|c| c.get(&name).copied().unwrap_or(0));
            OptionView {
                name,
                available,
                count,
            }
        })
        .collect()
}

/// What: Observed bounds of a range field over `units`.
///
/// Inputs:
/// - `ctx`: Pipeline context (battle value adjustment).
/// - `field`: Numeric field.
/// - `spec`: Range configuration; sentinel values are skipped.
/// - `units`: Records to scan.
///
/// Output:
/// - `Some([min, max])`, or `None` when no record has a usable value.
#[must_use]
pub fn observed_range(
    ctx: &PipelineContext<'_>,
    field: UnitField,
    spec: &RangeSpec,
    units: &[&Unit],
) -> Option<RangeValue> {
    let mut bounds: Option<RangeValue> = None;
    for unit in units {
        let Some(v) = numeric_value(field, unit, &ctx.bv) else {
            continue;
        };
        if spec.is_ignored(v) || !v.is_finite() {
            continue;
        }
        bounds = Some(bounds.map_or(RangeValue::new(v, v), |b| {
            RangeValue::new(b.min.min(v), b.max.max(v))
        }));
    }
    bounds
}

/// What: Dataset-wide bounds for every range filter.
///
/// Inputs:
/// - `ctx`: Pipeline context.
///
/// Output:
/// - Filter key → total range; fields with no usable value map to `[0, 0]`.
#[must_use]
pub fn total_ranges(ctx: &PipelineContext<'_>) -> BTreeMap<&'static str, RangeValue> {
    let all: Vec<&Unit> = ctx.catalog.units().iter().collect();
    ctx.registry
        .iter()
        .filter_map(|def| {
            let spec = def.range()?;
            let field = def.field()?;
            let r = observed_range(ctx, field, spec, &all).unwrap_or(RangeValue::new(0.0, 0.0));
            Some((def.key, r))
        })
        .collect()
}

/// What: Option metadata for one definition given its context set.
///
/// Inputs:
/// - `ctx`: Pipeline context.
/// - `def`: Filter definition.
/// - `state`: Filter state.
/// - `context`: Records surviving every filter except `def`.
/// - `present`: Names present in `context` (dropdowns only).
/// - `total`: Dataset-wide range (ranges only).
///
/// Output:
/// - The filter's [`FilterView`].
#[must_use]
pub fn describe_filter(
    ctx: &PipelineContext<'_>,
    def: &FilterDefinition,
    state: &FilterState,
    context: &[&Unit],
    present: &[String],
    total: RangeValue,
) -> FilterView {
    let touched = state.is_touched(def.key);
    let value = state.active(def.key);
    let options = match &def.kind {
        FilterKind::Dropdown(spec) => FilterOptions::Dropdown {
            multistate: spec.multistate,
            options: dropdown_options(ctx, def, spec, value, context, present),
        },
        FilterKind::Range(spec) => {
            let available = def
                .field()
                .and_then(|f| observed_range(ctx, f, spec, context))
                .unwrap_or(total);
            let shown = match state.active(def.key) {
                Some(FilterValue::Range(r)) => r.clamp_into(available),
                _ => available,
            };
            FilterOptions::Range {
                available,
                value: shown,
                total,
                curve: spec.curve,
            }
        }
    };
    FilterView {
        key: def.key,
        label: def.label,
        touched,
        options,
    }
}

/// What: Option metadata for every registered filter.
///
/// Inputs:
/// - `ctx`: Pipeline context.
/// - `state`: Filter state.
/// - `search`: Free-text query.
/// - `totals`: Dataset-wide ranges, as from [`total_ranges`].
/// - `names`: Supplies present names for a dropdown and its context set; the engine
///   plugs its name cache in here.
///
/// Output:
/// - One view per definition, in declared order.
///
/// Details:
/// - Untouched filters share the full result as their context set.
pub fn filter_views<F>(
    ctx: &PipelineContext<'_>,
    state: &FilterState,
    search: &str,
    totals: &BTreeMap<&'static str, RangeValue>,
    mut names: F,
) -> Vec<FilterView>
where
    F: FnMut(&FilterDefinition, &[&Unit]) -> Arc<Vec<String>>,
{
    let full = apply_filters(ctx, state, search, None);
    ctx.registry
        .iter()
        .map(|def| {
            let own;
            let context: &[&Unit] = if state.is_touched(def.key) {
                own = apply_filters(ctx, state, search, Some(def.key));
                &own
            } else {
                &full
            };
            let present = match def.kind {
                FilterKind::Dropdown(_) => names(def, context),
                FilterKind::Range(_) => Arc::new(Vec::new()),
            };
            let total = totals
                .get(def.key)
                .copied()
                .unwrap_or(RangeValue::new(0.0, 0.0));
            describe_filter(ctx, def, state, context, &present, total)
        })
        .collect()
}
