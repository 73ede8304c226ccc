//! Text and JSON rendering for CLI output.

use std::fmt::Write;

use serde::Serialize;

use crate::args::definition::CliError;
use crate::engine::FacetEngine;
use crate::index::CatalogSource;
use crate::logic::{FilterOptions, FilterView};
use crate::state::{RangeValue, Unit};
use crate::util::format_number;

/// One result row for JSON output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnitRow<'a> {
    /// Record as loaded.
    #[serde(flatten)]
    unit: &'a Unit,
    /// Battle value for the session's pilot skills.
    adjusted_bv: f64,
}

/// Result listing for JSON output.
#[derive(Serialize)]
struct UnitsReport<'a> {
    /// Records in the catalog.
    total: usize,
    /// Records passing every filter.
    visible: usize,
    /// Printed rows (at most the limit).
    units: Vec<UnitRow<'a>>,
    /// Shareable query string, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

/// Option listing for JSON output.
#[derive(Serialize)]
struct OptionsReport<'a> {
    /// One view per filter.
    filters: &'a [FilterView],
    /// Shareable query string, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

/// Render a range as `min..max`.
fn fmt_range(r: RangeValue) -> String {
    format!("{}..{}", format_number(r.min), format_number(r.max))
}

/// What: Render the visible records.
///
/// Inputs:
/// - `engine`: Engine holding the session.
/// - `limit`: Maximum rows to print.
/// - `url`: Query string to append, if requested.
/// - `json`: Emit JSON instead of text.
///
/// Output:
/// - Rendered listing.
///
/// # Errors
/// - `CliError::Json` when serialization fails.
pub fn render_units<C: CatalogSource>(
    engine: &FacetEngine<C>,
    limit: usize,
    url: Option<&str>,
    json: bool,
) -> Result<String, CliError> {
    let units = engine.filtered_units();
    let total = engine.catalog().units().len();
    if json {
        let report = UnitsReport {
            total,
            visible: units.len(),
            units: units
                .iter()
                .take(limit)
                .map(|u| UnitRow {
                    unit: u,
                    adjusted_bv: engine.adjusted_bv(u),
                })
                .collect(),
            url,
        };
        return Ok(serde_json::to_string_pretty(&report)?);
    }
    let mut out = String::new();
    let _ = writeln!(out, "{} of {} units", units.len(), total);
    for u in units.iter().take(limit) {
        let _ = writeln!(
            out,
            "{:>6}  {:<32} {:<10} {:>5}t  BV {:>6}  {}",
            u.id,
            u.name,
            u.weight_class,
            format_number(u.tons),
            format_number(engine.adjusted_bv(u)),
            u.year
        );
    }
    if units.len() > limit {
        let _ = writeln!(out, "... {} more", units.len() - limit);
    }
    if let Some(q) = url {
        let _ = writeln!(out, "?{q}");
    }
    Ok(out)
}

/// What: Render option metadata for every filter.
///
/// Inputs:
/// - `views`: Views from [`FacetEngine::filter_options`].
/// - `url`: Query string to append, if requested.
/// - `json`: Emit JSON instead of text.
///
/// Output:
/// - Rendered listing; touched filters are starred and unavailable options marked `-`.
///
/// # Errors
/// - `CliError::Json` when serialization fails.
pub fn render_options(views: &[FilterView], url: Option<&str>, json: bool) -> Result<String, CliError> {
    if json {
        return Ok(serde_json::to_string_pretty(&OptionsReport { filters: views, url })?);
    }
    let mut out = String::new();
    for view in views {
        let mark = if view.touched { " *" } else { "" };
        let _ = writeln!(out, "{} [{}]{}", view.label, view.key, mark);
        match &view.options {
            FilterOptions::Dropdown { options, .. } => {
                for o in options {
                    let flag = if o.available { ' ' } else { '-' };
                    match o.count {
                        Some(n) => {
                            let _ = writeln!(out, "  {flag} {} (x{n})", o.name);
                        }
                        None => {
                            let _ = writeln!(out, "  {flag} {}", o.name);
                        }
                    }
                }
            }
            FilterOptions::Range {
                available,
                value,
                total,
                ..
            } => {
                let _ = writeln!(
                    out,
                    "  value {}  available {}  total {}",
                    fmt_range(*value),
                    fmt_range(*available),
                    fmt_range(*total)
                );
            }
        }
    }
    if let Some(q) = url {
        let _ = writeln!(out, "?{q}");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FilterRegistry, FilterValue};
    use crate::test_utils::sample_catalog;

    #[test]
    /// What: Text listing honours the limit and appends the URL
    ///
    /// Inputs:
    /// - Heavy filter, limit 1, URL requested.
    ///
    /// Output:
    /// - Header, one row, overflow note, and the query string.
    fn output_units_text() {
        let mut e = FacetEngine::new(sample_catalog(), FilterRegistry::standard());
        e.set_filter("weightClass", FilterValue::selection(["Heavy"]));
        let url = e.to_query_string();
        let text = render_units(&e, 1, Some(&url), false).expect("render");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "2 of 6 units");
        assert!(lines[1].contains("Manticore Heavy Tank"));
        assert_eq!(lines[2], "... 1 more");
        assert_eq!(lines[3], "?filters=weightClass%3AHeavy");
    }

    #[test]
    /// What: JSON listing carries adjusted battle values
    ///
    /// Inputs:
    /// - Skills 3/4 and a search for the Atlas.
    ///
    /// Output:
    /// - One unit with `adjustedBv` 2504 and camelCase record keys.
    fn output_units_json() {
        let mut e = FacetEngine::new(sample_catalog(), FilterRegistry::standard());
        e.set_skills(3, 4);
        e.set_search("atlas");
        let text = render_units(&e, 10, None, true).expect("render");
        let v: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(v["visible"], 1);
        assert_eq!(v["units"][0]["adjustedBv"], 2504.0);
        assert_eq!(v["units"][0]["weightClass"], "Assault");
        assert!(v.get("url").is_none());
    }

    #[test]
    /// What: Option listing marks touched filters and range bounds
    ///
    /// Inputs:
    /// - Tons range filter set.
    ///
    /// Output:
    /// - Starred tons header with value, available, and total bounds.
    fn output_options_text() {
        let mut e = FacetEngine::new(sample_catalog(), FilterRegistry::standard());
        e.set_filter("tons", FilterValue::Range(RangeValue::new(40.0, 60.0)));
        let text = render_options(&e.filter_options(), None, false).expect("render");
        let tons = text
            .lines()
            .skip_while(|l| !l.ends_with("[tons] *"))
            .nth(1)
            .expect("tons bounds");
        assert_eq!(tons, "  value 40..60  available 20..100  total 20..100");
    }
}
