//! Battle value adjusted for pilot gunnery and piloting skills.

use crate::state::{DEFAULT_GUNNERY, DEFAULT_PILOTING, MAX_SKILL, Unit};

/// What: Formula turning a base battle value into a skill-adjusted one.
///
/// Inputs:
/// - `base`: Record's raw battle value.
/// - `gunnery`, `piloting`: Pilot skills, `0..=8`.
///
/// Output:
/// - Adjusted battle value.
///
/// Details:
/// - Only consulted when either skill differs from the defaults (4, 5).
pub trait BvAdjuster: Send + Sync {
    /// Adjust `base` for the given skills.
    fn adjust(&self, base: f64, gunnery: u8, piloting: u8) -> f64;
}

/// Multipliers indexed by `[gunnery][piloting]`.
const SKILL_MULTIPLIERS: [[f64; 9]; 9] = [
    [2.42, 2.31, 2.21, 2.10, 1.93, 1.75, 1.68, 1.59, 1.50],
    [2.21, 2.11, 2.02, 1.92, 1.76, 1.60, 1.54, 1.46, 1.38],
    [1.93, 1.85, 1.76, 1.68, 1.54, 1.40, 1.35, 1.28, 1.21],
    [1.66, 1.58, 1.51, 1.44, 1.32, 1.20, 1.16, 1.10, 1.04],
    [1.38, 1.32, 1.26, 1.20, 1.10, 1.00, 0.95, 0.90, 0.85],
    [1.31, 1.19, 1.13, 1.08, 0.99, 0.90, 0.86, 0.81, 0.77],
    [1.24, 1.12, 1.07, 1.02, 0.94, 0.85, 0.81, 0.77, 0.72],
    [1.17, 1.06, 1.01, 0.96, 0.88, 0.80, 0.76, 0.72, 0.68],
    [1.10, 0.99, 0.95, 0.90, 0.83, 0.75, 0.71, 0.68, 0.64],
];

/// Standard gunnery/piloting multiplier table, rounded to whole points.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillTableAdjuster;

impl BvAdjuster for SkillTableAdjuster {
    fn adjust(&self, base: f64, gunnery: u8, piloting: u8) -> f64 {
        let g = usize::from(gunnery.min(MAX_SKILL));
        let p = usize::from(piloting.min(MAX_SKILL));
        (base * SKILL_MULTIPLIERS[g][p]).round()
    }
}

/// What: Battle value evaluator bound to one pair of pilot skills.
///
/// Inputs:
/// - `adjuster`: Formula to apply.
/// - `gunnery`, `piloting`: Current pilot skills.
///
/// Output:
/// - [`BvContext::value`] yields the value the `bv` filter and sort compare on.
#[derive(Clone, Copy)]
pub struct BvContext<'a> {
    /// Formula.
    pub adjuster: &'a dyn BvAdjuster,
    /// Gunnery skill.
    pub gunnery: u8,
    /// Piloting skill.
    pub piloting: u8,
}

impl std::fmt::Debug for BvContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BvContext")
            .field("gunnery", &self.gunnery)
            .field("piloting", &self.piloting)
            .finish_non_exhaustive()
    }
}

impl<'a> BvContext<'a> {
    /// Bind `adjuster` to the given skills.
    #[must_use]
    pub const fn new(adjuster: &'a dyn BvAdjuster, gunnery: u8, piloting: u8) -> Self {
        Self {
            adjuster,
            gunnery,
            piloting,
        }
    }

    /// `true` when the skills are the defaults and values pass through unchanged.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.gunnery == DEFAULT_GUNNERY && self.piloting == DEFAULT_PILOTING
    }

    /// What: Adjusted battle value of `unit`.
    ///
    /// Inputs:
    /// - `unit`: Record to evaluate.
    ///
    /// Output:
    /// - `unit.bv` at default skills; otherwise the adjuster's result.
    #[must_use]
    pub fn value(&self, unit: &Unit) -> f64 {
        if self.is_default() {
            unit.bv
        } else {
            self.adjuster.adjust(unit.bv, self.gunnery, self.piloting)
        }
    }
}
