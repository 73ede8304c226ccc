//! Search engine facade: owns the catalog, the session, and every derived cache.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::codec::{self, CodecError, UrlState, decode_filters, encode_filters, parse_query_string};
use crate::index::{CatalogSource, ComponentIndex, PersistError, TagPersistence};
use crate::logic::availability::{FilterView, filter_views, present_names, total_ranges};
use crate::logic::bv::{BvAdjuster, BvContext, SkillTableAdjuster};
use crate::logic::filter::{PipelineContext, apply_filters, selected_era_ids};
use crate::logic::sort::sort_units;
use crate::settings::DEFAULT_OPTION_CACHE_CAPACITY;
use crate::state::{
    FilterDefinition, FilterRegistry, FilterSource, FilterState, FilterValue, RangeValue,
    SearchSession, SortDirection, SortKey, Unit, UnitField, session::clamp_skill,
};

/// Filter key whose total range depends on the pilot skills.
const BV_KEY: &str = "bv";

/// What: Faceted search over a catalog.
///
/// Inputs:
/// - A [`CatalogSource`], a [`FilterRegistry`], and optionally a custom [`BvAdjuster`].
///
/// Output:
/// - Filtered and sorted records ([`FacetEngine::filtered_units`]), option metadata
///   ([`FacetEngine::filter_options`]), and URL round-tripping.
///
/// Details:
/// - Derived outputs are recomputed on every call from the current session; caches
///   only memoize content-keyed intermediate results.
/// - Total ranges are recomputed when the catalog is replaced and, for `bv`, when
///   the pilot skills change.
/// - Option-name lists are cached in an LRU keyed by filter key, context size, and a
///   hash of the context ids; the `tags` filter also keys on the tag version.
pub struct FacetEngine<C: CatalogSource> {
    /// Dataset provider.
    catalog: C,
    /// Filter definitions.
    registry: FilterRegistry,
    /// User-controlled state.
    session: SearchSession,
    /// Adjusted battle value formula.
    adjuster: Box<dyn BvAdjuster>,
    /// Per-record derivations keyed by unit id.
    index: ComponentIndex,
    /// Dataset-wide bounds per range filter.
    totals: BTreeMap<&'static str, RangeValue>,
    /// Present option names per (filter, context) signature.
    name_cache: Mutex<LruCache<String, Arc<Vec<String>>>>,
    /// Bumped whenever tags may have changed.
    tag_version: u64,
    /// Query string waiting for the catalog to become ready.
    pending_query: Option<String>,
}

impl<C: CatalogSource> std::fmt::Debug for FacetEngine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacetEngine")
            .field("units", &self.catalog.units().len())
            .field("ready", &self.catalog.is_ready())
            .field("session", &self.session)
            .field("tag_version", &self.tag_version)
            .field("pending_query", &self.pending_query)
            .finish_non_exhaustive()
    }
}

impl<C: CatalogSource> FacetEngine<C> {
    /// What: Build an engine with the standard skill table and default cache size.
    ///
    /// Inputs:
    /// - `catalog`: Dataset provider (may still be loading).
    /// - `registry`: Filter definitions.
    ///
    /// Output:
    /// - Engine with a default session and computed total ranges.
    #[must_use]
    pub fn new(catalog: C, registry: FilterRegistry) -> Self {
        let mut engine = Self {
            catalog,
            registry,
            session: SearchSession::default(),
            adjuster: Box::new(SkillTableAdjuster),
            index: ComponentIndex::new(),
            totals: BTreeMap::new(),
            name_cache: Mutex::new(LruCache::new(cache_capacity(DEFAULT_OPTION_CACHE_CAPACITY))),
            tag_version: 0,
            pending_query: None,
        };
        engine.recompute_totals();
        engine
    }

    /// Replace the battle value formula; total ranges are recomputed.
    #[must_use]
    pub fn with_adjuster(mut self, adjuster: Box<dyn BvAdjuster>) -> Self {
        self.adjuster = adjuster;
        self.recompute_bv_total();
        self
    }

    /// Resize the option-name cache (at least one entry); clears it.
    #[must_use]
    pub fn with_cache_capacity(self, capacity: usize) -> Self {
        Self {
            name_cache: Mutex::new(LruCache::new(cache_capacity(capacity))),
            ..self
        }
    }

    /// Dataset provider.
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    /// What: Mutable dataset access for tag edits.
    ///
    /// Inputs: none
    ///
    /// Output:
    /// - Mutable catalog; the tag version is bumped so cached tag names are rebuilt.
    ///
    /// Details:
    /// - Only tags may change through this handle; other record edits require
    ///   [`FacetEngine::replace_catalog`].
    pub fn catalog_mut(&mut self) -> &mut C {
        self.tag_version += 1;
        &mut self.catalog
    }

    /// Filter definitions.
    pub const fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// Current session.
    pub const fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Current filter state.
    pub const fn filters(&self) -> &FilterState {
        &self.session.filters
    }

    /// Counter bumped whenever tags may have changed.
    pub const fn tag_version(&self) -> u64 {
        self.tag_version
    }

    /// `true` while a restored query waits for the catalog.
    pub const fn has_pending_query(&self) -> bool {
        self.pending_query.is_some()
    }

    /// Battle value evaluator for the current skills.
    fn bv_context(&self) -> BvContext<'_> {
        BvContext::new(self.adjuster.as_ref(), self.session.gunnery, self.session.piloting)
    }

    /// Borrowed inputs for the pipeline and availability engine.
    fn pipeline_context(&self) -> PipelineContext<'_> {
        PipelineContext {
            catalog: &self.catalog,
            registry: &self.registry,
            index: &self.index,
            bv: self.bv_context(),
        }
    }

    /// Recompute every total range.
    fn recompute_totals(&mut self) {
        let totals = total_ranges(&self.pipeline_context());
        tracing::debug!(ranges = totals.len(), "recomputed total ranges");
        self.totals = totals;
    }

    /// Recompute the `bv` total range only.
    fn recompute_bv_total(&mut self) {
        let fresh = total_ranges(&self.pipeline_context());
        if let Some(r) = fresh.get(BV_KEY) {
            self.totals.insert(BV_KEY, *r);
        }
    }

    /// Adjusted battle value of `unit` for the current skills.
    #[must_use]
    pub fn adjusted_bv(&self, unit: &Unit) -> f64 {
        self.bv_context().value(unit)
    }

    /// Dataset-wide range of a range filter.
    #[must_use]
    pub fn total_range(&self, key: &str) -> Option<RangeValue> {
        self.totals.get(key).copied()
    }

    /// What: Set a filter's value.
    ///
    /// Inputs:
    /// - `key`: Filter key; unknown keys are ignored.
    /// - `value`: New value.
    ///
    /// Output:
    /// - `true` when the key is registered and the state was updated.
    ///
    /// Details:
    /// - An empty selection, an all-`off` multistate selection, or a range equal to
    ///   the total range is stored untouched, so it does not constrain.
    pub fn set_filter(&mut self, key: &str, value: FilterValue) -> bool {
        let Some(def) = self.registry.get(key) else {
            tracing::debug!(key, "ignoring unknown filter key");
            return false;
        };
        let spans_total = match (&value, self.totals.get(def.key)) {
            (FilterValue::Range(r), Some(t)) => r == t,
            _ => false,
        };
        let touched = !value.is_empty_selection() && !spans_total;
        self.session.filters = self.session.filters.with_entry(def.key, value, touched);
        true
    }

    /// Stop `key` from constraining; its value is kept for display.
    pub fn clear_filter(&mut self, key: &str) {
        self.session.filters = self.session.filters.with_untouched(key);
    }

    /// Set the free-text query.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.session.search_text = text.into();
    }

    /// Set the sort key and direction.
    pub const fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        self.session.sort_key = key;
        self.session.sort_direction = direction;
    }

    /// Set the expanded-view flag.
    pub const fn set_expanded(&mut self, expanded: bool) {
        self.session.expanded = expanded;
    }

    /// What: Set the pilot skills.
    ///
    /// Inputs:
    /// - `gunnery`, `piloting`: Requested skills; clamped to `0..=8`.
    ///
    /// Output:
    /// - None; the `bv` total range is recomputed when either skill changes.
    pub fn set_skills(&mut self, gunnery: i64, piloting: i64) {
        let (g, p) = (clamp_skill(gunnery), clamp_skill(piloting));
        if (g, p) == (self.session.gunnery, self.session.piloting) {
            return;
        }
        self.session.gunnery = g;
        self.session.piloting = p;
        self.recompute_bv_total();
    }

    /// Restore filters, search, sort, and skills to their defaults; the expanded flag is kept.
    pub fn reset(&mut self) {
        let skills_changed = !self.session.skills_are_default();
        self.session.reset();
        if skills_changed {
            self.recompute_bv_total();
        }
    }

    /// What: Visible records: filtered, then sorted.
    ///
    /// Inputs: none
    ///
    /// Output:
    /// - Records passing every active filter, in the session's sort order; empty while
    ///   the catalog is not ready.
    #[must_use]
    pub fn filtered_units(&self) -> Vec<&Unit> {
        let ctx = self.pipeline_context();
        let mut units = apply_filters(&ctx, &self.session.filters, &self.session.search_text, None);
        sort_units(&mut units, self.session.sort_key, self.session.sort_direction, &ctx.bv);
        tracing::debug!(
            total = self.catalog.units().len(),
            visible = units.len(),
            active_filters = self.session.filters.touched_count(),
            "pipeline applied"
        );
        units
    }

    /// What: Option metadata for every filter.
    ///
    /// Inputs: none
    ///
    /// Output:
    /// - One view per registered filter in declared order.
    #[must_use]
    pub fn filter_options(&self) -> Vec<FilterView> {
        let ctx = self.pipeline_context();
        let state = &self.session.filters;
        filter_views(&ctx, state, &self.session.search_text, &self.totals, |def, context| {
            self.cached_names(&ctx, def, state, context)
        })
    }

    /// Option metadata for one filter.
    #[must_use]
    pub fn filter_option(&self, key: &str) -> Option<FilterView> {
        self.filter_options().into_iter().find(|v| v.key == key)
    }

    /// Present names for `def` over `context`, through the LRU cache.
    fn cached_names(
        &self,
        ctx: &PipelineContext<'_>,
        def: &FilterDefinition,
        state: &FilterState,
        context: &[&Unit],
    ) -> Arc<Vec<String>> {
        let mut hasher = DefaultHasher::new();
        for u in context {
            u.id.hash(&mut hasher);
        }
        if def.source == FilterSource::Faction {
            selected_era_ids(ctx, state, Some(def.key)).hash(&mut hasher);
        }
        let mut key = format!("{}|{}|{:016x}", def.key, context.len(), hasher.finish());
        if def.field() == Some(UnitField::Tags) {
            key.push_str(&format!("|v{}", self.tag_version));
        }
        if let Ok(mut g) = self.name_cache.lock()
            && let Some(hit) = g.get(&key)
        {
            return Arc::clone(hit);
        }
        let names = Arc::new(present_names(ctx, def, state, context));
        if let Ok(mut g) = self.name_cache.lock() {
            let _ = g.put(key, Arc::clone(&names));
        }
        names
    }

    /// What: Replace the dataset.
    ///
    /// Inputs:
    /// - `catalog`: New dataset provider.
    ///
    /// Output:
    /// - None; component entries for vanished or changed ids are evicted, total ranges and
    ///   option names rebuilt, and a pending query applied once the catalog is ready.
    pub fn replace_catalog(&mut self, catalog: C) {
        let keep: HashSet<u32> = catalog.units().iter().map(|u| u.id).collect();
        let evicted = self
            .catalog
            .units()
            .iter()
            .filter(|u| !keep.contains(&u.id))
            .filter(|u| self.index.evict(u.id))
            .count();
        // Same id with different content must not reuse stale entries.
        let changed: Vec<u32> = {
            let old: HashMap<u32, &Unit> = self.catalog.units().iter().map(|u| (u.id, u)).collect();
            catalog
                .units()
                .iter()
                .filter(|u| old.get(&u.id).is_some_and(|o| *o != *u))
                .map(|u| u.id)
                .collect()
        };
        for id in &changed {
            self.index.evict(*id);
        }
        self.catalog = catalog;
        self.tag_version += 1;
        if let Ok(mut g) = self.name_cache.lock() {
            g.clear();
        }
        self.recompute_totals();
        tracing::info!(
            units = self.catalog.units().len(),
            evicted,
            changed = changed.len(),
            ready = self.catalog.is_ready(),
            "catalog replaced"
        );
        if self.catalog.is_ready()
            && let Some(query) = self.pending_query.take()
        {
            self.restore_from_query(&query);
        }
    }

    /// Every option name of dropdown `def` across the whole dataset.
    fn known_names(&self, def: &FilterDefinition) -> HashSet<String> {
        match def.source {
            FilterSource::Era => self.catalog.eras().iter().map(|e| e.name.clone()).collect(),
            FilterSource::Faction => self.catalog.factions().iter().map(|f| f.name.clone()).collect(),
            FilterSource::Field(_) => {
                let all: Vec<&Unit> = self.catalog.units().iter().collect();
                present_names(&self.pipeline_context(), def, &FilterState::new(), &all)
                    .into_iter()
                    .collect()
            }
        }
    }

    /// Decode a compact filter string, dropping option names absent from the dataset.
    fn decode_known(&self, compact: &str) -> Result<FilterState, CodecError> {
        let mut known: HashMap<&'static str, HashSet<String>> = HashMap::new();
        decode_filters(compact, &self.registry, |def, name| {
            known
                .entry(def.key)
                .or_insert_with(|| self.known_names(def))
                .contains(name)
        })
    }

    /// What: Replace the filter state from a compact filter string.
    ///
    /// Inputs:
    /// - `compact`: String in the format produced by [`encode_filters`].
    ///
    /// Output:
    /// - `Ok(())` with the filters replaced; other session fields are kept.
    ///
    /// # Errors
    /// - Returns `CodecError` when an option name has invalid percent-encoding; the
    ///   current filters are left unchanged then.
    pub fn apply_filter_string(&mut self, compact: &str) -> Result<(), CodecError> {
        let filters = self.decode_known(compact)?;
        self.session.filters = filters;
        Ok(())
    }

    /// What: Restore the session from a URL query string.
    ///
    /// Inputs:
    /// - `query`: Query string, with or without `?`.
    ///
    /// Output:
    /// - None; the whole session is replaced by the query's contents (absent
    ///   parameters reset to defaults).
    ///
    /// Details:
    /// - Before the catalog is ready the query is stored and applied by the next
    ///   ready [`FacetEngine::replace_catalog`].
    /// - A filter string that cannot be decoded is logged and restores no filters.
    /// - Option names missing from the dataset are dropped.
    pub fn restore_from_query(&mut self, query: &str) {
        if !self.catalog.is_ready() {
            tracing::debug!("catalog not ready; deferring query restore");
            self.pending_query = Some(query.to_string());
            return;
        }
        self.pending_query = None;
        let url = parse_query_string(query);
        let filters = url.filters.as_deref().map_or_else(FilterState::new, |compact| {
            self.decode_known(compact).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to decode filters from URL; starting with none");
                FilterState::new()
            })
        });
        let old_skills = (self.session.gunnery, self.session.piloting);
        let defaults = SearchSession::default();
        self.session = SearchSession {
            filters,
            search_text: url.q.unwrap_or_default(),
            sort_key: url.sort.unwrap_or(defaults.sort_key),
            sort_direction: url.sort_dir.unwrap_or(defaults.sort_direction),
            expanded: url.expanded,
            gunnery: url.gunnery.unwrap_or(defaults.gunnery),
            piloting: url.piloting.unwrap_or(defaults.piloting),
        };
        if old_skills != (self.session.gunnery, self.session.piloting) {
            self.recompute_bv_total();
        }
        tracing::debug!(
            filters = self.session.filters.touched_count(),
            "restored session from URL"
        );
    }

    /// Session as URL parameters (defaults omitted).
    #[must_use]
    pub fn url_state(&self) -> UrlState {
        UrlState::from_session(&self.session, encode_filters(&self.registry, &self.session.filters))
    }

    /// Session as a query string (without `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.url_state().to_query_string()
    }

    /// Rewrite `existing` with the session parameters, preserving foreign parameters.
    #[must_use]
    pub fn merge_into_query(&self, existing: &str) -> String {
        codec::merge_into_query(existing, &self.url_state())
    }

    /// What: Persist every record's tags and invalidate cached tag names.
    ///
    /// Inputs:
    /// - `store`: Tag persistence implementation.
    ///
    /// Output:
    /// - `Ok(())` once the store confirms the save.
    ///
    /// # Errors
    /// - Returns the store's `PersistError`; the tag version is not bumped then.
    pub async fn persist_tags<P: TagPersistence>(&mut self, store: &P) -> Result<(), PersistError> {
        store.save_tags(self.catalog.units()).await?;
        self.tag_version += 1;
        tracing::debug!(tag_version = self.tag_version, "tags persisted");
        Ok(())
    }
}

/// Cache capacity as a non-zero size.
fn cache_capacity(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Catalog, CatalogData};
    use crate::state::{Component, MultiState, MultiStateSelection, SelectionEntry};
    use crate::test_utils::sample_catalog;

    /// Engine over the sample catalog with the standard registry.
    fn engine() -> FacetEngine<Catalog> {
        FacetEngine::new(sample_catalog(), FilterRegistry::standard())
    }

    /// Ids of the visible records.
    fn visible(e: &FacetEngine<Catalog>) -> Vec<u32> {
        e.filtered_units().iter().map(|u| u.id).collect()
    }

    #[test]
    /// What: Default session lists every unit sorted by name
    ///
    /// Inputs:
    /// - Fresh engine.
    ///
    /// Output:
    /// - Atlas, Hunchback, Locust, Manticore, Shadow Cat, Warhammer.
    fn engine_default_order() {
        assert_eq!(visible(&engine()), vec![1, 4, 2, 6, 5, 3]);
    }

    #[test]
    /// What: Applying then clearing a filter restores the result set
    ///
    /// Inputs:
    /// - `weightClass = [Heavy]`, then `clear_filter`.
    ///
    /// Output:
    /// - Narrowed, then identical to the unfiltered result.
    fn engine_toggle_restores_results() {
        let mut e = engine();
        let before = visible(&e);
        assert!(e.set_filter("weightClass", FilterValue::selection(["Heavy"])));
        assert_eq!(visible(&e), vec![6, 3]);
        e.clear_filter("weightClass");
        assert_eq!(visible(&e), before);
    }

    #[test]
    /// What: Inert values are stored untouched
    ///
    /// Inputs:
    /// - Empty selection, all-off multistate, full-span range, unknown key.
    ///
    /// Output:
    /// - Nothing touched; unknown key rejected.
    fn engine_set_filter_inert_values() {
        let mut e = engine();
        e.set_filter("type", FilterValue::selection(Vec::<String>::new()));
        let mut off = MultiStateSelection::new();
        off.insert("PPC".into(), SelectionEntry::new(MultiState::Off, 1));
        e.set_filter("equipment", FilterValue::MultiState(off));
        let total = e.total_range("tons").expect("tons range");
        e.set_filter("tons", FilterValue::Range(total));
        assert!(!e.set_filter("speed", FilterValue::selection(["fast"])));
        assert_eq!(e.filters().touched_count(), 0);
    }

    #[test]
    /// What: Skill changes adjust BV results and the BV total range
    ///
    /// Inputs:
    /// - Skills (3, 4) then back to defaults.
    ///
    /// Output:
    /// - Total BV range scaled by 1.32; restored at defaults.
    fn engine_skills_recompute_bv_total() {
        let mut e = engine();
        assert_eq!(e.total_range("bv"), Some(RangeValue::new(432.0, 2050.0)));
        e.set_skills(3, 4);
        assert_eq!(e.total_range("bv"), Some(RangeValue::new(570.0, 2706.0)));
        let atlas = e.catalog().unit(1).cloned().expect("atlas");
        assert!((e.adjusted_bv(&atlas) - 2504.0).abs() < f64::EPSILON);
        e.set_skills(99, -4);
        assert_eq!((e.session().gunnery, e.session().piloting), (8, 0));
        e.reset();
        assert_eq!(e.total_range("bv"), Some(RangeValue::new(432.0, 2050.0)));
    }

    #[test]
    /// What: A custom adjuster replaces the skill table
    ///
    /// Inputs:
    /// - Adjuster doubling every value, engine at default then non-default skills.
    ///
    /// Output:
    /// - Raw BV at defaults; doubled totals and sort inputs otherwise.
    fn engine_custom_adjuster() {
        struct Doubling;
        impl BvAdjuster for Doubling {
            fn adjust(&self, base: f64, _gunnery: u8, _piloting: u8) -> f64 {
                base * 2.0
            }
        }
        let mut e = engine().with_adjuster(Box::new(Doubling));
        assert_eq!(e.total_range("bv"), Some(RangeValue::new(432.0, 2050.0)));
        e.set_skills(0, 0);
        assert_eq!(e.total_range("bv"), Some(RangeValue::new(864.0, 4100.0)));
        e.set_filter("bv", FilterValue::Range(RangeValue::new(3000.0, 4100.0)));
        assert_eq!(visible(&e), vec![1, 5]);
    }

    #[test]
    /// What: URL round-trip of the whole session
    ///
    /// Inputs:
    /// - Filters, search, sort, skills, and expanded flag set on one engine.
    ///
    /// Output:
    /// - A second engine restored from the query string has the same session.
    fn engine_url_round_trip() {
        let mut e = engine();
        let mut eq = MultiStateSelection::new();
        eq.insert("Medium Laser".into(), SelectionEntry::new(MultiState::And, 2));
        eq.insert("AC/20".into(), SelectionEntry::not());
        e.set_filter("equipment", FilterValue::MultiState(eq));
        e.set_filter("era", FilterValue::selection(["Succession Wars"]));
        e.set_filter("tons", FilterValue::Range(RangeValue::new(40.0, 80.0)));
        e.set_search("war");
        e.set_sort(SortKey::Tons, SortDirection::Desc);
        e.set_skills(3, 4);
        e.set_expanded(true);
        let qs = e.to_query_string();
        let mut f = engine();
        f.restore_from_query(&qs);
        assert_eq!(f.session(), e.session());
        assert_eq!(visible(&f), visible(&e));
        assert_eq!(f.to_query_string(), qs);
    }

    #[test]
    /// What: Vanished names and invalid encodings on restore
    ///
    /// Inputs:
    /// - Query naming an unknown role, then one with a broken escape.
    ///
    /// Output:
    /// - Unknown role dropped; broken escape yields an empty filter state while other
    ///   parameters still apply.
    fn engine_restore_drops_unknown_and_invalid() {
        let mut e = engine();
        e.restore_from_query("filters=role%3AGhost%2CScout&q=loc");
        assert_eq!(
            e.filters().active("role"),
            Some(&FilterValue::Selection(vec!["Scout".into()]))
        );
        e.restore_from_query("filters=type%3A%25ZZ&sort=year");
        assert_eq!(e.filters().touched_count(), 0);
        assert_eq!(e.session().sort_key, SortKey::Year);
        assert!(e.session().search_text.is_empty());
    }

    #[test]
    /// What: Compact filter strings replace only the filters
    ///
    /// Inputs:
    /// - Search text set, then a compact string with a tri-state equipment filter.
    ///
    /// Output:
    /// - Filters applied with the search kept; a broken escape leaves filters unchanged.
    fn engine_apply_filter_string() {
        let mut e = engine();
        e.set_search("a");
        e.apply_filter_string("equipment:PPC,AC%2F20|weightClass:Heavy,Assault")
            .expect("valid filters");
        assert_eq!(visible(&e), vec![1, 6, 3]);
        assert_eq!(e.session().search_text, "a");
        assert!(e.apply_filter_string("type:%Z1").is_err());
        assert_eq!(e.filters().touched_count(), 2);
    }

    #[test]
    /// What: Restore before readiness is deferred
    ///
    /// Inputs:
    /// - Engine over a pending catalog; query restored; then the real catalog.
    ///
    /// Output:
    /// - No results while pending; query applied after replacement.
    fn engine_pending_query_applied_when_ready() {
        let mut e = FacetEngine::new(Catalog::pending(), FilterRegistry::standard());
        e.restore_from_query("filters=type%3ATank");
        assert!(e.has_pending_query());
        assert!(e.filtered_units().is_empty());
        e.replace_catalog(sample_catalog());
        assert!(!e.has_pending_query());
        assert_eq!(visible(&e), vec![6]);
    }

    /// Single OR entry on the equipment filter.
    fn equipment_or(name: &str) -> FilterValue {
        let mut eq = MultiStateSelection::new();
        eq.insert(name.into(), SelectionEntry::new(MultiState::Or, 1));
        FilterValue::MultiState(eq)
    }

    #[test]
    /// What: Replacing a record under the same id drops its cached index entry
    ///
    /// Inputs:
    /// - Index warmed by searching and filtering, then unit 1 rebuilt as a PPC-armed Zeus.
    ///
    /// Output:
    /// - Search and equipment results follow the new record, not the cached Atlas.
    fn engine_replace_catalog_evicts_changed_records() {
        let mut e = engine();
        e.set_search("atlas");
        assert_eq!(visible(&e), vec![1]);
        e.set_search("");
        e.set_filter("equipment", equipment_or("AC/20"));
        assert!(visible(&e).contains(&1));
        e.clear_filter("equipment");

        let mut data: CatalogData =
            serde_json::from_str(include_str!("../tests/fixtures/catalog.json")).expect("fixture");
        let atlas = data.units.iter_mut().find(|u| u.id == 1).expect("unit 1");
        atlas.chassis = "Zeus".into();
        atlas.name = "Zeus AS7-D".into();
        atlas.components = vec![Component {
            name: "PPC".into(),
            quantity: 1,
        }];
        e.replace_catalog(Catalog::new(data));

        e.set_search("atlas");
        assert!(visible(&e).is_empty());
        e.set_search("zeus");
        assert_eq!(visible(&e), vec![1]);
        e.set_search("");
        e.set_filter("equipment", equipment_or("PPC"));
        assert!(visible(&e).contains(&1));
        e.set_filter("equipment", equipment_or("AC/20"));
        assert!(!visible(&e).contains(&1));
    }

    #[test]
    /// What: Foreign query parameters survive a merge
    ///
    /// Inputs:
    /// - Existing query with `tab` and a stale `q`.
    ///
    /// Output:
    /// - `tab` kept first; session parameters appended.
    fn engine_merge_into_query() {
        let mut e = engine();
        e.set_search("atlas");
        assert_eq!(e.merge_into_query("?tab=grid&q=old"), "tab=grid&q=atlas");
    }

    #[tokio::test]
    /// What: Persisting tags bumps the tag version and refreshes tag options
    ///
    /// Inputs:
    /// - Tag added through `catalog_mut`, then saved to a temp JSON store.
    ///
    /// Output:
    /// - New tag listed in options; tag version increases on save.
    async fn engine_persist_tags_bumps_version() {
        let mut e = engine();
        assert!(e.filter_option("tags").and_then(|v| v.option("fav").cloned()).is_none());
        assert!(e.catalog_mut().set_tags(3, vec!["fav".into()]));
        assert!(e.filter_option("tags").is_some_and(|v| v.option("fav").is_some()));
        let dir = tempfile::tempdir().expect("tempdir");
        let store = crate::index::JsonTagStore::new(dir.path().join("tags.json"));
        let before = e.tag_version();
        e.persist_tags(&store).await.expect("save tags");
        assert_eq!(e.tag_version(), before + 1);
        let saved = crate::index::load_tags(store.path()).expect("load tags");
        assert_eq!(saved.get("Warhammer WHM-6R"), Some(&vec!["fav".to_string()]));
    }
}
