//! Test utilities for common test setup.
//!
//! This module provides shared test helpers used across multiple test modules.

#[cfg(test)]
use crate::index::Catalog;

/// Six-unit catalog with three eras and four factions, shared with the integration tests.
#[cfg(test)]
const SAMPLE_CATALOG_JSON: &str = include_str!("../tests/fixtures/catalog.json");

#[cfg(test)]
/// What: Provide the sample catalog for pipeline and engine tests.
///
/// Inputs: None
///
/// Output: Ready `Catalog` parsed from `tests/fixtures/catalog.json`
///
/// Details:
/// - Units: Atlas (1), Locust (2), Warhammer (3), Hunchback (4), Shadow Cat (5),
///   Manticore (6). The Locust is extinct in `Clan Invasion`; the Manticore has
///   jump `-1` and the Shadow Cat cost `-1`.
pub fn sample_catalog() -> Catalog {
    Catalog::from_json_str(SAMPLE_CATALOG_JSON).expect("sample catalog fixture parses")
}
