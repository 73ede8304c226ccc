//! Filtering pipeline: text search, era/faction membership, then per-field filters.

use std::collections::HashSet;

use crate::index::{CatalogSource, ComponentIndex, Era, Faction};
use crate::logic::bv::BvContext;
use crate::logic::search::filter_by_text;
use crate::logic::tristate::filter_multistate;
use crate::state::{
    FilterDefinition, FilterKind, FilterRegistry, FilterSource, FilterState, FilterValue,
    MultiState, RangeSpec, RangeValue, Unit, UnitField,
};

/// What: Everything the pipeline reads besides the filter state.
///
/// Inputs:
/// - Borrowed from the engine for the duration of one computation.
///
/// Output:
/// - Passed by reference to [`apply_filters`] and the availability engine.
#[derive(Clone, Copy)]
pub struct PipelineContext<'a> {
    /// Record and membership provider.
    pub catalog: &'a dyn CatalogSource,
    /// Filter definitions in declared order.
    pub registry: &'a FilterRegistry,
    /// Memoized per-record derivations.
    pub index: &'a ComponentIndex,
    /// Adjusted battle value evaluator.
    pub bv: BvContext<'a>,
}

impl std::fmt::Debug for PipelineContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("units", &self.catalog.units().len())
            .field("filters", &self.registry.len())
            .field("bv", &self.bv)
            .finish_non_exhaustive()
    }
}

/// What: Names a dropdown value selects for membership purposes.
///
/// Inputs:
/// - `value`: Stored filter value.
///
/// Output:
/// - Plain selections as-is; tri-state values contribute their OR and AND names.
#[must_use]
pub fn selected_names(value: &FilterValue) -> Vec<&str> {
    match value {
        FilterValue::Selection(names) => names.iter().map(String::as_str).collect(),
        FilterValue::MultiState(map) => map
            .iter()
            .filter(|(_, e)| matches!(e.state, MultiState::Or | MultiState::And))
            .map(|(n, _)| n.as_str())
            .collect(),
        FilterValue::Range(_) => Vec::new(),
    }
}

/// What: Record ids an era contributes, minus the units extinct in that era.
///
/// Inputs:
/// - `catalog`: Provider of the extinct sets.
/// - `era`: Era to expand.
///
/// Output:
/// - Member ids.
#[must_use]
pub fn era_member_ids(catalog: &dyn CatalogSource, era: &Era) -> HashSet<u32> {
    let extinct = catalog.extinct_for_era(era.id);
    era.units
        .iter()
        .copied()
        .filter(|id| !extinct.is_some_and(|s| s.contains(id)))
        .collect()
}

/// What: Record ids a faction fields, optionally limited to some eras.
///
/// Inputs:
/// - `faction`: Faction to expand.
/// - `era_scope`: Era ids to union over; `None` means every era.
///
/// Output:
/// - Member ids.
#[must_use]
pub fn faction_member_ids(faction: &Faction, era_scope: Option<&[u32]>) -> HashSet<u32> {
    match era_scope {
        Some(eras) => eras
            .iter()
            .filter_map(|id| faction.eras.get(id))
            .flatten()
            .copied()
            .collect(),
        None => faction.eras.values().flatten().copied().collect(),
    }
}

/// First definition reading from `source`, if any.
fn external_definition(registry: &FilterRegistry, source: FilterSource) -> Option<&FilterDefinition> {
    registry.iter().find(|d| d.source == source)
}

/// What: Era ids selected by the active era filter.
///
/// Inputs:
/// - `ctx`: Pipeline context.
/// - `state`: Filter state.
/// - `exclude`: Filter key left out of this computation.
///
/// Output:
/// - `Some(ids)` when the era filter is touched and not excluded; unknown names are skipped.
#[must_use]
pub fn selected_era_ids(
    ctx: &PipelineContext<'_>,
    state: &FilterState,
    exclude: Option<&str>,
) -> Option<Vec<u32>> {
    let def = external_definition(ctx.registry, FilterSource::Era)?;
    if exclude == Some(def.key) {
        return None;
    }
    let value = state.active(def.key)?;
    Some(
        selected_names(value)
            .into_iter()
            .filter_map(|n| ctx.catalog.era_by_name(n).map(|e| e.id))
            .collect(),
    )
}

/// What: Resolve the era and faction filters to one set of admissible record ids.
///
/// Inputs:
/// - `ctx`: Pipeline context.
/// - `state`: Filter state.
/// - `exclude`: Filter key left out of this computation.
///
/// Output:
/// - `None` when neither external filter constrains; otherwise the admissible ids.
///
/// Details:
/// - Era ids drop the units extinct in each selected era.
/// - Faction ids are unioned over the selected eras when the era filter is active,
///   else over every era.
/// - Both present: intersection.
#[must_use]
pub fn external_ids(
    ctx: &PipelineContext<'_>,
    state: &FilterState,
    exclude: Option<&str>,
) -> Option<HashSet<u32>> {
    let era_ids = selected_era_ids(ctx, state, exclude);
    let era_set: Option<HashSet<u32>> = era_ids.as_ref().map(|ids| {
        ids.iter()
            .filter_map(|id| ctx.catalog.eras().iter().find(|e| e.id == *id))
            .flat_map(|era| era_member_ids(ctx.catalog, era))
            .collect()
    });
    let faction_set: Option<HashSet<u32>> = external_definition(ctx.registry, FilterSource::Faction)
        .filter(|def| exclude != Some(def.key))
        .and_then(|def| state.active(def.key))
        .map(|value| {
            selected_names(value)
                .into_iter()
                .filter_map(|n| ctx.catalog.faction_by_name(n))
                .flat_map(|f| faction_member_ids(f, era_ids.as_deref()))
                .collect()
        });
    match (era_set, faction_set) {
        (Some(e), Some(f)) => Some(e.intersection(&f).copied().collect()),
        (Some(s), None) | (None, Some(s)) => Some(s),
        (None, None) => None,
    }
}

/// What: Numeric value a range filter or sort compares for `field`.
///
/// Inputs:
/// - `field`: Record field.
/// - `unit`: Record.
/// - `bv`: Adjusted battle value evaluator.
///
/// Output:
/// - Adjusted value for [`UnitField::Bv`], the raw number otherwise; `None` for label fields.
#[must_use]
pub fn numeric_value(field: UnitField, unit: &Unit, bv: &BvContext<'_>) -> Option<f64> {
    if field == UnitField::Bv {
        Some(bv.value(unit))
    } else {
        field.number(unit)
    }
}

/// What: Decide whether a range filter admits a value.
///
/// Inputs:
/// - `spec`: Range configuration with sentinel values.
/// - `range`: Active interval.
/// - `value`: Record's value, if the field is numeric.
///
/// Output:
/// - `true` when inside `[min, max]`; sentinel values pass only when `min` is exactly 0.
#[must_use]
pub fn range_admits(spec: &RangeSpec, range: &RangeValue, value: Option<f64>) -> bool {
    let Some(v) = value else {
        return false;
    };
    if spec.is_ignored(v) {
        return range.min.abs() < f64::EPSILON;
    }
    range.contains(v)
}

/// What: Apply one non-external filter definition.
///
/// Inputs:
/// - `ctx`: Pipeline context.
/// - `def`: Filter definition.
/// - `value`: Active value for `def`.
/// - `units`: Candidates.
///
/// Output:
/// - Surviving candidates; a value whose shape does not match the definition is ignored.
fn apply_field_filter<'a>(
    ctx: &PipelineContext<'_>,
    def: &FilterDefinition,
    value: &FilterValue,
    units: Vec<&'a Unit>,
) -> Vec<&'a Unit> {
    let Some(field) = def.field() else {
        return units;
    };
    match (&def.kind, value) {
        (FilterKind::Dropdown(d), FilterValue::MultiState(sel)) if d.multistate => {
            filter_multistate(units, field, sel, ctx.index)
        }
        (FilterKind::Dropdown(_), FilterValue::Selection(names)) => {
            if names.is_empty() {
                return units;
            }
            units
                .into_iter()
                .filter(|u| field.labels(u).iter().any(|l| names.iter().any(|n| n == l)))
                .collect()
        }
        (FilterKind::Range(spec), FilterValue::Range(r)) => units
            .into_iter()
            .filter(|u| range_admits(spec, r, numeric_value(field, u, &ctx.bv)))
            .collect(),
        _ => {
            tracing::debug!(key = def.key, "filter value does not match its definition; ignored");
            units
        }
    }
}

/// What: Run the pipeline up to, but not including, sorting.
///
/// Inputs:
/// - `ctx`: Pipeline context.
/// - `state`: Filter state.
/// - `search`: Free-text query.
/// - `exclude`: Filter key to leave out (context-set computation), or `None`.
///
/// Output:
/// - Surviving records in catalog order; empty while the catalog is not ready.
///
/// Details:
/// - Stages: text search, era/faction ids, then every touched field filter in
///   declared order. Keys without a definition are ignored.
#[must_use]
pub fn apply_filters<'a>(
    ctx: &PipelineContext<'a>,
    state: &FilterState,
    search: &str,
    exclude: Option<&str>,
) -> Vec<&'a Unit> {
    if !ctx.catalog.is_ready() {
        return Vec::new();
    }
    let catalog: &'a dyn CatalogSource = ctx.catalog;
    let mut units: Vec<&'a Unit> = filter_by_text(catalog.units().iter().collect(), search, ctx.index);
    if let Some(ids) = external_ids(ctx, state, exclude) {
        units.retain(|u| ids.contains(&u.id));
    }
    for def in ctx.registry.iter() {
        if def.is_external() || exclude == Some(def.key) {
            continue;
        }
        let Some(value) = state.active(def.key) else {
            continue;
        };
        units = apply_field_filter(ctx, def, value, units);
        if units.is_empty() {
            break;
        }
    }
    units
}
