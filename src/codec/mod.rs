//! Compact text encoding of filter state for URLs.
//!
//! Format: touched filters in registry order, `key:payload` joined by `|`.
//! - range: `min-max`
//! - dropdown: comma-joined percent-encoded names
//! - multistate: comma-joined names with `.` (and) or `!` (not) suffixes and
//!   `~count` when the count exceeds one; `off` entries are omitted

pub mod query;

use std::fmt;

use crate::state::{
    FilterDefinition, FilterKind, FilterRegistry, FilterState, FilterValue, MultiState,
    MultiStateSelection, RangeValue, SelectionEntry,
};
use crate::util::{PercentDecodeError, format_number, percent_decode, percent_encode};

pub use query::{UrlState, merge_into_query, parse_query_string};

/// What: Error raised when a compact filter string cannot be decoded at all.
///
/// Inputs: Produced by [`decode_filters`].
///
/// Output: Implements `Display`/`Error` for ergonomic propagation.
///
/// Details:
/// - Individual malformed segments never raise this; they are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A percent escape was malformed or decoded to invalid UTF-8.
    PercentEncoding(PercentDecodeError),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PercentEncoding(err) => write!(f, "invalid filter encoding: {err}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PercentEncoding(err) => Some(err),
        }
    }
}

impl From<PercentDecodeError> for CodecError {
    fn from(value: PercentDecodeError) -> Self {
        Self::PercentEncoding(value)
    }
}

/// Percent-encode a multistate option name, also escaping the suffix characters.
fn encode_multistate_name(name: &str) -> String {
    percent_encode(name)
        .replace('.', "%2E")
        .replace('!', "%21")
        .replace('~', "%7E")
}

/// Encode one multistate selection; `None` when every entry is `off`.
fn encode_multistate(selection: &MultiStateSelection) -> Option<String> {
    let tokens: Vec<String> = selection
        .iter()
        .filter_map(|(name, entry)| {
            let suffix = match entry.state {
                MultiState::Or => "",
                MultiState::And => ".",
                MultiState::Not => "!",
                MultiState::Off => return None,
            };
            let mut token = format!("{}{suffix}", encode_multistate_name(name));
            if entry.count > 1 {
                token.push('~');
                token.push_str(&entry.count.to_string());
            }
            Some(token)
        })
        .collect();
    (!tokens.is_empty()).then(|| tokens.join(","))
}

/// Encode one filter value; `None` when it has nothing to say.
fn encode_value(value: &FilterValue) -> Option<String> {
    match value {
        FilterValue::Range(r) => Some(format!("{}-{}", format_number(r.min), format_number(r.max))),
        FilterValue::Selection(names) if names.is_empty() => None,
        FilterValue::Selection(names) => Some(
            names
                .iter()
                .map(|n| percent_encode(n))
                .collect::<Vec<_>>()
                .join(","),
        ),
        FilterValue::MultiState(sel) => encode_multistate(sel),
    }
}

/// What: Serialize the touched filters of `state`.
///
/// Inputs:
/// - `registry`: Definitions; fixes the output order.
/// - `state`: Filter state to encode.
///
/// Output:
/// - Compact string; empty when nothing is touched.
///
/// Details:
/// - Keys without a definition are not written.
#[must_use]
pub fn encode_filters(registry: &FilterRegistry, state: &FilterState) -> String {
    registry
        .iter()
        .filter_map(|def| {
            let value = state.active(def.key)?;
            encode_value(value).map(|payload| format!("{}:{payload}", def.key))
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// What: Parse a `min-max` range payload.
///
/// Inputs:
/// - `payload`: Text such as `10-50`, `-1-5`, or `-5--1`.
///
/// Output:
/// - `Some(range)` when both bounds parse as finite numbers; `None` otherwise.
#[must_use]
pub fn parse_range(payload: &str) -> Option<RangeValue> {
    let split = payload.get(1..)?.find('-')? + 1;
    let min: f64 = payload[..split].trim().parse().ok()?;
    let max: f64 = payload[split + 1..].trim().parse().ok()?;
    (min.is_finite() && max.is_finite()).then(|| RangeValue::new(min, max))
}

/// What: Parse one multistate token.
///
/// Inputs:
/// - `token`: `name[.|!][~count]` with a percent-encoded name.
///
/// Output:
/// - `Ok(Some((name, entry)))`; `Ok(None)` for an empty name.
///
/// # Errors
/// - Returns `Err(PercentDecodeError)` when the name is not valid percent-encoding.
///
/// Details:
/// - A count that does not parse falls back to 1.
fn parse_multistate_token(token: &str) -> Result<Option<(String, SelectionEntry)>, PercentDecodeError> {
    let (head, count) = match token.rsplit_once('~') {
        Some((head, raw)) => (head, raw.trim().parse::<u32>().unwrap_or(1)),
        None => (token, 1),
    };
    let (raw_name, state) = if let Some(n) = head.strip_suffix('.') {
        (n, MultiState::And)
    } else if let Some(n) = head.strip_suffix('!') {
        (n, MultiState::Not)
    } else {
        (head, MultiState::Or)
    };
    let name = percent_decode(raw_name)?;
    if name.is_empty() {
        return Ok(None);
    }
    Ok(Some((name, SelectionEntry::new(state, count))))
}

/// Decode a dropdown payload for `def`, keeping only names accepted by `is_known`.
fn decode_dropdown<F>(
    def: &FilterDefinition,
    multistate: bool,
    payload: &str,
    is_known: &mut F,
) -> Result<Option<FilterValue>, CodecError>
where
    F: FnMut(&FilterDefinition, &str) -> bool,
{
    let tokens = payload.split(',').filter(|t| !t.trim().is_empty());
    if multistate {
        let mut sel = MultiStateSelection::new();
        for token in tokens {
            if let Some((name, entry)) = parse_multistate_token(token)?
                && is_known(def, &name)
            {
                sel.insert(name, entry);
            }
        }
        return Ok((!sel.is_empty()).then_some(FilterValue::MultiState(sel)));
    }
    let mut names: Vec<String> = Vec::new();
    for token in tokens {
        let name = percent_decode(token)?;
        if !name.is_empty() && is_known(def, &name) {
            names.push(name);
        }
    }
    let value = FilterValue::selection(names);
    Ok((!value.is_empty_selection()).then_some(value))
}

/// What: Restore a filter state from its compact encoding.
///
/// Inputs:
/// - `input`: Compact string as produced by [`encode_filters`].
/// - `registry`: Definitions; unknown keys are skipped.
/// - `is_known`: Reports whether an option name still exists for a dropdown.
///
/// Output:
/// - Filter state with every restored filter touched.
///
/// # Errors
/// - Returns `Err(CodecError::PercentEncoding)` when any name carries invalid
///   percent-encoding.
///
/// Details:
/// - Segments without `key:payload` syntax, unknown keys, and unparsable ranges
///   are skipped.
/// - Dropdowns whose names are all unknown are omitted.
/// - Range bounds are kept as written; clamping happens in the availability engine.
pub fn decode_filters<F>(
    input: &str,
    registry: &FilterRegistry,
    mut is_known: F,
) -> Result<FilterState, CodecError>
where
    F: FnMut(&FilterDefinition, &str) -> bool,
{
    let mut state = FilterState::new();
    for segment in input.split('|') {
        let Some((key, payload)) = segment.split_once(':') else {
            if !segment.trim().is_empty() {
                tracing::debug!(segment, "skipping filter segment without key");
            }
            continue;
        };
        let Some(def) = registry.get(key.trim()) else {
            tracing::debug!(key, "skipping unknown filter key");
            continue;
        };
        let value = match &def.kind {
            FilterKind::Range(_) => parse_range(payload).map(FilterValue::Range),
            FilterKind::Dropdown(spec) => decode_dropdown(def, spec.multistate, payload, &mut is_known)?,
        };
        match value {
            Some(v) => state = state.with_filter(def.key, v),
            None => tracing::debug!(key = def.key, "filter segment restored nothing"),
        }
    }
    Ok(state)
}
