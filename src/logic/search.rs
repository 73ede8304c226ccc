//! Free-text search with OR-groups and non-overlapping term matching.

use crate::index::ComponentIndex;
use crate::state::Unit;
use crate::util::normalize_search_text;

/// What: Split a raw query into OR-groups of normalized terms.
///
/// Inputs:
/// - `query`: Raw search text.
///
/// Output:
/// - One `Vec` of terms per non-empty group; empty when the query is blank.
///
/// Details:
/// - Groups are separated by `,` or `;`; terms by whitespace.
/// - Terms are accent-stripped and lowercased, de-duplicated, and ordered
///   longest first so long terms claim their spans before short ones.
#[must_use]
pub fn parse_query(query: &str) -> Vec<Vec<String>> {
    query
        .trim()
        .split([',', ';'])
        .filter_map(|group| {
            let mut terms: Vec<String> = Vec::new();
            for raw in group.split_whitespace() {
                let term = normalize_search_text(raw);
                if !term.is_empty() && !terms.contains(&term) {
                    terms.push(term);
                }
            }
            if terms.is_empty() {
                return None;
            }
            terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
            Some(terms)
        })
        .collect()
}

/// What: Check that every term owns a distinct, non-overlapping span of `haystack`.
///
/// Inputs:
/// - `terms`: Normalized terms, longest first.
/// - `haystack`: Normalized text to search.
///
/// Output:
/// - `true` when each term finds a leftmost occurrence not overlapping any span
///   already claimed by an earlier term.
#[must_use]
pub fn matches_disjoint(terms: &[String], haystack: &str) -> bool {
    let mut claimed: Vec<(usize, usize)> = Vec::with_capacity(terms.len());
    'terms: for term in terms {
        let mut from = 0;
        while from <= haystack.len() {
            let Some(off) = haystack.get(from..).and_then(|rest| rest.find(term.as_str())) else {
                return false;
            };
            let start = from + off;
            let end = start + term.len();
            if claimed.iter().all(|&(s, e)| end <= s || start >= e) {
                claimed.push((start, end));
                continue 'terms;
            }
            // Step past the first char of this occurrence and keep scanning.
            from = start
                + haystack[start..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
        }
        return false;
    }
    true
}

/// What: Filter records by a free-text query.
///
/// Inputs:
/// - `units`: Candidate records.
/// - `query`: Raw search text.
/// - `index`: Memoized index holding each record's normalized search text.
///
/// Output:
/// - Records matching at least one OR-group; all records when the query is blank.
#[must_use]
pub fn filter_by_text<'a>(units: Vec<&'a Unit>, query: &str, index: &ComponentIndex) -> Vec<&'a Unit> {
    let groups = parse_query(query);
    if groups.is_empty() {
        return units;
    }
    units
        .into_iter()
        .filter(|u| {
            let entry = index.entry(u);
            groups.iter().any(|g| matches_disjoint(g, &entry.search_text))
        })
        .collect()
}
