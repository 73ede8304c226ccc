//! Core filtering logic split into modular submodules.

pub mod availability;
pub mod bv;
pub mod filter;
pub mod search;
pub mod smart_sort;
pub mod sort;
pub mod tristate;

// Re-export public APIs so callers can use `crate::logic::...` directly
pub use availability::{FilterOptions, FilterView, OptionView, filter_views, present_names, total_ranges};
pub use bv::{BvAdjuster, BvContext, SkillTableAdjuster};
pub use filter::{PipelineContext, apply_filters};
pub use search::{filter_by_text, parse_query};
pub use smart_sort::{natural_compare, smart_sort};
pub use sort::sort_units;
pub use tristate::filter_multistate;
