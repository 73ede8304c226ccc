//! Library entry for unitfacet: faceted search, tri-state filtering, and compact
//! URL state over game-unit catalogs.

pub mod args;
pub mod codec;
pub mod engine;
pub mod index;
pub mod logic;
pub mod settings;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_utils;

pub use engine::FacetEngine;
