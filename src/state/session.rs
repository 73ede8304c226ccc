//! Search session: everything a user can set, bundled for reset and URL sync.

use crate::state::filter_state::FilterState;
use crate::state::types::{SortDirection, SortKey};

/// Default gunnery skill; the adjusted BV equals the base BV at (4, 5).
pub const DEFAULT_GUNNERY: u8 = 4;
/// Default piloting skill.
pub const DEFAULT_PILOTING: u8 = 5;
/// Highest accepted skill value.
pub const MAX_SKILL: u8 = 8;

/// What: User-controlled inputs to the filtering pipeline.
///
/// Inputs:
/// - Mutated by the engine's setters or replaced by URL restoration.
///
/// Output:
/// - Read by the pipeline, availability engine, and URL codec.
///
/// Details:
/// - [`SearchSession::reset`] restores filters, search, sort, and skills; the expanded flag is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSession {
    /// Active filter selections.
    pub filters: FilterState,
    /// Free-text query.
    pub search_text: String,
    /// Results sort key.
    pub sort_key: SortKey,
    /// Results sort direction.
    pub sort_direction: SortDirection,
    /// Expanded results view flag (UI hint carried through URLs).
    pub expanded: bool,
    /// Pilot gunnery skill, 0–8.
    pub gunnery: u8,
    /// Pilot piloting skill, 0–8.
    pub piloting: u8,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self {
            filters: FilterState::new(),
            search_text: String::new(),
            sort_key: SortKey::default(),
            sort_direction: SortDirection::default(),
            expanded: false,
            gunnery: DEFAULT_GUNNERY,
            piloting: DEFAULT_PILOTING,
        }
    }
}

impl SearchSession {
    /// Clear filters, search, sort, and pilot skills; the expanded view flag is kept.
    pub fn reset(&mut self) {
        *self = Self {
            expanded: self.expanded,
            ..Self::default()
        };
    }

    /// `true` when both pilot skills are at their defaults.
    #[must_use]
    pub const fn skills_are_default(&self) -> bool {
        self.gunnery == DEFAULT_GUNNERY && self.piloting == DEFAULT_PILOTING
    }
}

/// Clamp a skill value into `0..=MAX_SKILL`.
#[must_use]
pub fn clamp_skill(value: i64) -> u8 {
    u8::try_from(value.clamp(0, i64::from(MAX_SKILL))).unwrap_or(MAX_SKILL)
}
