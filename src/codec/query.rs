//! URL query parameters carrying the search session.

use crate::state::{
    DEFAULT_GUNNERY, DEFAULT_PILOTING, SearchSession, SortDirection, SortKey,
    session::clamp_skill,
};
use crate::util::{percent_decode, percent_encode};

/// Parameter names owned by the session; everything else is passed through.
pub const KNOWN_PARAMS: [&str; 7] = ["q", "sort", "sortDir", "filters", "expanded", "gunnery", "piloting"];

/// What: Session fields as read from or written to a URL query.
///
/// Inputs:
/// - Parsed with [`parse_query_string`] or built with [`UrlState::from_session`].
///
/// Output:
/// - Rendered with [`UrlState::to_query_string`] or merged with [`merge_into_query`].
///
/// Details:
/// - `filters` holds the compact filter string (see [`crate::codec::encode_filters`])
///   with the query-level escaping already removed; it is decoded by the engine so a
///   failure can fall back to an empty filter state.
/// - `None`/`false` fields are defaults and are not written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlState {
    /// Free-text search.
    pub q: Option<String>,
    /// Sort key; unknown keys parse to `None`.
    pub sort: Option<SortKey>,
    /// Sort direction.
    pub sort_dir: Option<SortDirection>,
    /// Compact filter string, or the raw parameter when its escaping was invalid.
    pub filters: Option<String>,
    /// Expanded results view.
    pub expanded: bool,
    /// Gunnery skill, clamped to `0..=8`.
    pub gunnery: Option<u8>,
    /// Piloting skill, clamped to `0..=8`.
    pub piloting: Option<u8>,
    /// Parameters not owned by the session, raw and in original order.
    pub extra: Vec<(String, String)>,
}

/// Decode a query-parameter value, keeping the raw text when the escaping is invalid.
fn decode_param(raw: &str) -> String {
    percent_decode(&raw.replace('+', " ")).unwrap_or_else(|e| {
        tracing::warn!(value = raw, error = %e, "invalid percent-encoding in query parameter");
        raw.to_string()
    })
}

/// Parse a skill parameter; failures yield `None` (default skill).
fn parse_skill(raw: &str) -> Option<u8> {
    raw.trim().parse::<i64>().ok().map(clamp_skill)
}

/// Split a query string into raw `(key, value)` pairs.
fn raw_pairs(query: &str) -> impl Iterator<Item = (&str, &str)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| p.split_once('=').unwrap_or((p, "")))
}

/// What: Parse a URL query string.
///
/// Inputs:
/// - `query`: Query text, with or without the leading `?`.
///
/// Output:
/// - Parsed state; unknown parameters collected into `extra`.
///
/// Details:
/// - Never fails: bad sort keys, directions, and skills read as defaults.
/// - The `filters` value is kept raw when its outer escaping is invalid so the
///   engine reports the failure when decoding it.
#[must_use]
pub fn parse_query_string(query: &str) -> UrlState {
    let mut state = UrlState::default();
    for (key, raw) in raw_pairs(query) {
        match key {
            "q" => {
                let q = decode_param(raw);
                state.q = (!q.is_empty()).then_some(q);
            }
            "sort" => state.sort = SortKey::from_key(&decode_param(raw)),
            "sortDir" => state.sort_dir = SortDirection::from_key(&decode_param(raw)),
            "filters" => {
                let f = percent_decode(raw).unwrap_or_else(|e| {
                    tracing::warn!(
                        value = raw,
                        error = %e,
                        "invalid percent-encoding in filters parameter; no filters will be restored"
                    );
                    raw.to_string()
                });
                state.filters = (!f.is_empty()).then_some(f);
            }
            "expanded" => state.expanded = raw == "true",
            "gunnery" => state.gunnery = parse_skill(raw),
            "piloting" => state.piloting = parse_skill(raw),
            _ => state.extra.push((key.to_string(), raw.to_string())),
        }
    }
    state
}

impl UrlState {
    /// What: Capture the session for a URL.
    ///
    /// Inputs:
    /// - `session`: Current session.
    /// - `filters`: Compact filter string for the session's filters.
    ///
    /// Output:
    /// - State with defaults left unset so they are not written.
    #[must_use]
    pub fn from_session(session: &SearchSession, filters: String) -> Self {
        let q = session.search_text.trim();
        Self {
            q: (!q.is_empty()).then(|| q.to_string()),
            sort: (session.sort_key != SortKey::default()).then_some(session.sort_key),
            sort_dir: (session.sort_direction != SortDirection::default())
                .then_some(session.sort_direction),
            filters: (!filters.is_empty()).then_some(filters),
            expanded: session.expanded,
            gunnery: (session.gunnery != DEFAULT_GUNNERY).then_some(session.gunnery),
            piloting: (session.piloting != DEFAULT_PILOTING).then_some(session.piloting),
            extra: Vec::new(),
        }
    }

    /// Owned parameters as encoded `(key, value)` pairs, in canonical order.
    #[must_use]
    pub fn known_pairs(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(q) = &self.q {
            out.push(("q", percent_encode(q)));
        }
        if let Some(sort) = self.sort {
            out.push(("sort", sort.as_key().to_string()));
        }
        if let Some(dir) = self.sort_dir {
            out.push(("sortDir", dir.as_key().to_string()));
        }
        if let Some(f) = &self.filters {
            out.push(("filters", percent_encode(f)));
        }
        if self.expanded {
            out.push(("expanded", "true".to_string()));
        }
        if let Some(g) = self.gunnery {
            out.push(("gunnery", g.to_string()));
        }
        if let Some(p) = self.piloting {
            out.push(("piloting", p.to_string()));
        }
        out
    }

    /// What: Render the owned parameters followed by `extra`.
    ///
    /// Inputs: None
    ///
    /// Output:
    /// - `k=v` pairs joined by `&`, without a leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let extra = self.extra.iter().map(|(k, v)| join_pair(k, v));
        self.known_pairs()
            .iter()
            .map(|(k, v)| join_pair(k, v))
            .chain(extra)
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Render one raw pair; empty values keep the bare key.
fn join_pair(key: &str, value: &str) -> String {
    if value.is_empty() {
        key.to_string()
    } else {
        format!("{key}={value}")
    }
}

/// What: Rewrite a query string with new session parameters.
///
/// Inputs:
/// - `existing`: Current query string (may contain foreign parameters).
/// - `state`: Session parameters to write.
///
/// Output:
/// - Foreign parameters verbatim and in their original order, followed by the
///   session's non-default parameters.
#[must_use]
pub fn merge_into_query(existing: &str, state: &UrlState) -> String {
    raw_pairs(existing)
        .filter(|(k, _)| !KNOWN_PARAMS.contains(k))
        .map(|(k, v)| join_pair(k, v))
        .chain(state.known_pairs().iter().map(|(k, v)| join_pair(k, v)))
        .collect::<Vec<_>>()
        .join("&")
}
