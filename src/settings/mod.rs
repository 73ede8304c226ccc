//! User settings loaded from `settings.conf`.
//!
//! Lines are `key = value`; `#`, `//`, and `;` start comments. Unknown keys are
//! ignored and unparsable values keep their defaults.

mod paths;

use std::fs;
use std::path::{Path, PathBuf};

pub use paths::{config_dir, expand_home, logs_dir, resolve_settings_config_path};

use crate::util::config::{parse_bool, parse_key_value, skip_comment_or_empty};

/// Default capacity of the option-name cache.
pub const DEFAULT_OPTION_CACHE_CAPACITY: usize = 256;
/// Default number of result rows the CLI prints.
pub const DEFAULT_RESULT_LIMIT: usize = 50;

/// What: Runtime settings for the engine and CLI.
///
/// Inputs:
/// - Built with [`Settings::default`], then overlaid by [`parse_settings`].
///
/// Output:
/// - Consumed by `main` to locate data, configure logging, and size caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Catalog JSON file.
    pub data_path: Option<PathBuf>,
    /// Tag store JSON file.
    pub tags_path: Option<PathBuf>,
    /// Default log filter (e.g., `info`, `debug`).
    pub log_level: String,
    /// Capacity of the option-name LRU cache.
    pub option_cache_capacity: usize,
    /// Result rows printed by the CLI.
    pub result_limit: usize,
    /// Start sessions with the expanded view flag set.
    pub expanded: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: None,
            tags_path: None,
            log_level: "info".to_string(),
            option_cache_capacity: DEFAULT_OPTION_CACHE_CAPACITY,
            result_limit: DEFAULT_RESULT_LIMIT,
            expanded: false,
        }
    }
}

/// What: Overlay settings from `settings.conf` content.
///
/// Inputs:
/// - `content`: File contents.
/// - `settings`: Settings to update in place.
///
/// Output:
/// - None (modifies `settings` in-place).
///
/// Details:
/// - Keys are normalized by [`parse_key_value`]; a few aliases are accepted.
/// - Zero capacities are rejected so caches always hold at least one entry.
pub fn parse_settings(content: &str, settings: &mut Settings) {
    for line in content.lines() {
        if skip_comment_or_empty(line) {
            continue;
        }
        let Some((key, val)) = parse_key_value(line) else {
            continue;
        };
        match key.as_str() {
            "data_path" | "catalog" | "data" => {
                if !val.is_empty() {
                    settings.data_path = Some(expand_home(&val));
                }
            }
            "tags_path" | "tags" => {
                if !val.is_empty() {
                    settings.tags_path = Some(expand_home(&val));
                }
            }
            "log_level" => {
                if !val.is_empty() {
                    settings.log_level = val.to_ascii_lowercase();
                }
            }
            "option_cache_capacity" | "cache_capacity" => {
                if let Ok(v) = val.parse::<usize>()
                    && v > 0
                {
                    settings.option_cache_capacity = v;
                }
            }
            "result_limit" | "limit" => {
                if let Ok(v) = val.parse::<usize>() {
                    settings.result_limit = v;
                }
            }
            "expanded" | "expanded_view" => settings.expanded = parse_bool(&val),
            _ => {
                tracing::debug!(key = %key, "ignoring unknown settings key");
            }
        }
    }
}

/// What: Load settings from a specific file.
///
/// Inputs:
/// - `path`: Settings file.
///
/// Output:
/// - Defaults overlaid with the file's values; defaults alone when the file is unreadable.
#[must_use]
pub fn load_settings_from(path: &Path) -> Settings {
    let mut out = Settings::default();
    match fs::read_to_string(path) {
        Ok(content) => parse_settings(&content, &mut out),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read settings file");
        }
    }
    out
}

/// Load user settings from the resolved `settings.conf`, or defaults when absent.
#[must_use]
pub fn settings() -> Settings {
    resolve_settings_config_path().map_or_else(Settings::default, |p| load_settings_from(&p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Parse every recognised key with comments and aliases
    ///
    /// Inputs:
    /// - Settings text with comments, aliases, and a bad number.
    ///
    /// Output:
    /// - Recognised values applied; bad values keep defaults; unknown keys ignored.
    fn settings_parse_keys() {
        let content = "\
# unitfacet settings
data_path = /srv/units.json   # catalog
tags = /srv/tags.json
log-level = DEBUG
option.cache.capacity = 0
result_limit = 20 // rows
expanded_view = yes
; legacy comment
unknown_key = 5
";
        let mut s = Settings::default();
        parse_settings(content, &mut s);
        assert_eq!(s.data_path, Some(PathBuf::from("/srv/units.json")));
        assert_eq!(s.tags_path, Some(PathBuf::from("/srv/tags.json")));
        assert_eq!(s.log_level, "debug");
        assert_eq!(s.option_cache_capacity, DEFAULT_OPTION_CACHE_CAPACITY);
        assert_eq!(s.result_limit, 20);
        assert!(s.expanded);
    }

    #[test]
    /// What: Loading from disk and from a missing file
    ///
    /// Inputs:
    /// - Temp settings file, then a path that does not exist.
    ///
    /// Output:
    /// - File values applied; defaults for the missing file.
    fn settings_load_from_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.conf");
        std::fs::write(&path, "option_cache_capacity = 8\n").expect("write settings");
        assert_eq!(load_settings_from(&path).option_cache_capacity, 8);
        assert_eq!(load_settings_from(&dir.path().join("missing.conf")), Settings::default());
    }
}
