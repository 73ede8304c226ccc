//! Session state: record types, the filter registry, and filter selections.
//!
//! Split into smaller files while keeping the public API under
//! `crate::state::*` via re-exports.

pub mod filter_state;
pub mod registry;
pub mod session;
pub mod types;

// Public re-exports to keep short import paths working
pub use filter_state::{
    FilterEntry, FilterState, FilterValue, MultiState, MultiStateSelection, RangeValue,
    SelectionEntry,
};
pub use registry::{DropdownSpec, FilterDefinition, FilterKind, FilterRegistry, FilterSource, RangeSpec};
pub use session::{DEFAULT_GUNNERY, DEFAULT_PILOTING, MAX_SKILL, SearchSession};
pub use types::{Component, SortDirection, SortKey, Unit, UnitField};
