//! Shared helpers for engine integration tests.

use unitfacet::FacetEngine;
use unitfacet::index::Catalog;
use unitfacet::state::FilterRegistry;

/// What: Load the sample catalog fixture.
///
/// Inputs: none
///
/// Output:
/// - Six units across three eras and four factions.
pub fn catalog() -> Catalog {
    Catalog::from_json_str(include_str!("../fixtures/catalog.json")).expect("fixture catalog parses")
}

/// Engine over the sample catalog with the standard filters.
pub fn engine() -> FacetEngine<Catalog> {
    FacetEngine::new(catalog(), FilterRegistry::standard())
}

/// Ids of the visible records, in display order.
pub fn visible(engine: &FacetEngine<Catalog>) -> Vec<u32> {
    engine.filtered_units().iter().map(|u| u.id).collect()
}
