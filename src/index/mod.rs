//! Catalog access: the dataset provider seam, the in-memory catalog, the
//! per-record component index, and persistence.
//!
//! Split into submodules for maintainability. Public API is re-exported so
//! consumers can keep using `crate::index::*`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::state::Unit;

/// Per-record component index (memoized names, counts, search text).
mod components;
/// Catalog and tag persistence.
mod persist;

pub use components::{ComponentIndex, UnitIndexEntry};
pub use persist::{JsonTagStore, PersistError, TagPersistence, load_tags};

/// Name of the pseudo-faction whose per-era sets mark units extinct in that era.
pub const EXTINCT_FACTION: &str = "Extinct";

/// What: One era with the ids of every unit available in it.
///
/// Inputs:
/// - Deserialized from the catalog JSON.
///
/// Output:
/// - Used by the era filter and by faction scoping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Era {
    /// Stable era id; faction membership is keyed by it.
    pub id: u32,
    /// Display name (e.g., "Succession Wars").
    pub name: String,
    /// First year of the era.
    pub from_year: Option<i32>,
    /// Last year of the era.
    pub to_year: Option<i32>,
    /// Ids of units available in the era.
    pub units: BTreeSet<u32>,
}

/// What: One faction with its per-era unit id sets.
///
/// Inputs:
/// - Deserialized from the catalog JSON; `eras` maps era id to unit ids.
///
/// Output:
/// - Used by the faction filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Faction {
    /// Stable faction id.
    pub id: u32,
    /// Display name (e.g., "Federated Suns").
    pub name: String,
    /// Era id → unit ids fielded by this faction in that era.
    pub eras: BTreeMap<u32, BTreeSet<u32>>,
}

impl Faction {
    /// `true` when the faction fields `unit_id` in any era.
    #[must_use]
    pub fn fields(&self, unit_id: u32) -> bool {
        self.eras.values().any(|ids| ids.contains(&unit_id))
    }
}

/// What: Read-only dataset provider consumed by the engine.
///
/// Inputs:
/// - Implemented by [`Catalog`] or by an embedder's own store.
///
/// Output:
/// - Records plus era/faction id-membership indices.
///
/// Details:
/// - `is_ready` gates every computation; an unready source yields empty results.
/// - Name lookups have linear default implementations; override them when an
///   index is available.
pub trait CatalogSource {
    /// Every record, in catalog order.
    fn units(&self) -> &[Unit];

    /// Every era, in chronological order.
    fn eras(&self) -> &[Era];

    /// Every faction.
    fn factions(&self) -> &[Faction];

    /// Era by exact name.
    fn era_by_name(&self, name: &str) -> Option<&Era> {
        self.eras().iter().find(|e| e.name == name)
    }

    /// Faction by exact name.
    fn faction_by_name(&self, name: &str) -> Option<&Faction> {
        self.factions().iter().find(|f| f.name == name)
    }

    /// Ids of units extinct in `era_id`, if any are recorded.
    fn extinct_for_era(&self, era_id: u32) -> Option<&BTreeSet<u32>> {
        self.faction_by_name(EXTINCT_FACTION)
            .and_then(|f| f.eras.get(&era_id))
    }

    /// `true` once the dataset has finished loading.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Serialized catalog document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogData {
    /// Unit records.
    pub units: Vec<Unit>,
    /// Eras in chronological order.
    pub eras: Vec<Era>,
    /// Factions.
    pub factions: Vec<Faction>,
}

/// What: Error raised while loading a catalog document.
///
/// Inputs: Generated by [`Catalog::load_from_path`] and [`Catalog::from_json_str`].
///
/// Output: Implements `Display`/`Error` for ergonomic propagation.
#[derive(Debug)]
pub enum CatalogError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The document is not valid catalog JSON.
    Parse(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read catalog: {err}"),
            Self::Parse(err) => write!(f, "failed to parse catalog: {err}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// What: In-memory [`CatalogSource`] with name lookups backed by hash maps.
///
/// Inputs:
/// - Built from [`CatalogData`], a JSON string, or a JSON file.
///
/// Output:
/// - Serves records and membership indices to the engine.
///
/// Details:
/// - `name_to_era`/`name_to_faction` are derived from the lists and rebuilt on construction.
/// - [`Catalog::pending`] creates an unready placeholder used before loading finishes.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    /// Records in catalog order.
    units: Vec<Unit>,
    /// Eras in chronological order.
    eras: Vec<Era>,
    /// Factions.
    factions: Vec<Faction>,
    /// Era name → position in `eras`.
    name_to_era: HashMap<String, usize>,
    /// Faction name → position in `factions`.
    name_to_faction: HashMap<String, usize>,
    /// Readiness flag.
    ready: bool,
}

impl Catalog {
    /// Build a ready catalog from a document.
    #[must_use]
    pub fn new(data: CatalogData) -> Self {
        let name_to_era = data
            .eras
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();
        let name_to_faction = data
            .factions
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        Self {
            units: data.units,
            eras: data.eras,
            factions: data.factions,
            name_to_era,
            name_to_faction,
            ready: true,
        }
    }

    /// Empty placeholder that reports `is_ready() == false`.
    #[must_use]
    pub fn pending() -> Self {
        Self::default()
    }

    /// What: Parse a catalog from JSON text.
    ///
    /// Inputs:
    /// - `json`: Catalog document.
    ///
    /// Output:
    /// - Ready catalog, or `CatalogError::Parse`.
    ///
    /// # Errors
    /// - Returns `Err(CatalogError::Parse)` when the text is not a catalog document.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;
        Ok(Self::new(data))
    }

    /// What: Load a catalog from a JSON file.
    ///
    /// Inputs:
    /// - `path`: Catalog file.
    ///
    /// Output:
    /// - Ready catalog on success.
    ///
    /// # Errors
    /// - Returns `Err(CatalogError::Io)` when the file cannot be read.
    /// - Returns `Err(CatalogError::Parse)` when the contents are not a catalog document.
    pub fn load_from_path(path: &Path) -> Result<Self, CatalogError> {
        let body = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&body)?;
        tracing::info!(
            path = %path.display(),
            units = catalog.units.len(),
            eras = catalog.eras.len(),
            factions = catalog.factions.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Record by id.
    #[must_use]
    pub fn unit(&self, id: u32) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// What: Replace a unit's tags.
    ///
    /// Inputs:
    /// - `id`: Unit id.
    /// - `tags`: New tag list; blanks and duplicates are dropped.
    ///
    /// Output:
    /// - `true` when the unit exists and was updated.
    pub fn set_tags(&mut self, id: u32, tags: Vec<String>) -> bool {
        let Some(unit) = self.units.iter_mut().find(|u| u.id == id) else {
            return false;
        };
        let mut clean: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !clean.contains(&tag) {
                clean.push(tag);
            }
        }
        unit.tags = clean;
        true
    }

    /// What: Merge persisted tags into the records.
    ///
    /// Inputs:
    /// - `tags`: Unit name → tags, as produced by [`JsonTagStore`].
    ///
    /// Output:
    /// - Number of units whose tags were replaced.
    pub fn apply_tags(&mut self, tags: &BTreeMap<String, Vec<String>>) -> usize {
        let mut applied = 0;
        for unit in &mut self.units {
            if let Some(t) = tags.get(&unit.name) {
                unit.tags.clone_from(t);
                applied += 1;
            }
        }
        applied
    }
}

impl CatalogSource for Catalog {
    fn units(&self) -> &[Unit] {
        &self.units
    }

    fn eras(&self) -> &[Era] {
        &self.eras
    }

    fn factions(&self) -> &[Faction] {
        &self.factions
    }

    fn era_by_name(&self, name: &str) -> Option<&Era> {
        self.name_to_era.get(name).and_then(|&i| self.eras.get(i))
    }

    fn faction_by_name(&self, name: &str) -> Option<&Faction> {
        self.name_to_faction
            .get(name)
            .and_then(|&i| self.factions.get(i))
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small catalog with two eras and an extinct marker.
    fn sample_json() -> String {
        serde_json::json!({
            "units": [
                {"id": 1, "name": "Atlas AS7-D", "chassis": "Atlas", "model": "AS7-D"},
                {"id": 2, "name": "Locust LCT-1V", "chassis": "Locust", "model": "LCT-1V"}
            ],
            "eras": [
                {"id": 10, "name": "Star League", "units": [1, 2]},
                {"id": 11, "name": "Succession Wars", "units": [1, 2]}
            ],
            "factions": [
                {"id": 100, "name": "Extinct", "eras": {"11": [2]}},
                {"id": 101, "name": "Federated Suns", "eras": {"10": [1], "11": [1]}}
            ]
        })
        .to_string()
    }

    #[test]
    /// What: JSON parsing builds name lookups and extinct sets
    ///
    /// Inputs:
    /// - Sample catalog document.
    ///
    /// Output:
    /// - Eras and factions resolve by name; extinct set found for era 11 only.
    fn catalog_from_json_builds_lookups() {
        let cat = Catalog::from_json_str(&sample_json()).expect("valid catalog");
        assert!(cat.is_ready());
        assert_eq!(cat.units().len(), 2);
        assert_eq!(cat.era_by_name("Succession Wars").map(|e| e.id), Some(11));
        assert!(cat.era_by_name("Clan Invasion").is_none());
        let fs = cat.faction_by_name("Federated Suns").expect("faction");
        assert!(fs.fields(1));
        assert!(!fs.fields(2));
        assert!(cat.extinct_for_era(11).is_some_and(|s| s.contains(&2)));
        assert!(cat.extinct_for_era(10).is_none());
    }

    #[test]
    /// What: Malformed JSON is a parse error, not a panic
    ///
    /// Inputs:
    /// - Truncated document.
    ///
    /// Output:
    /// - `CatalogError::Parse`.
    fn catalog_rejects_malformed_json() {
        let err = Catalog::from_json_str("{\"units\": [").expect_err("must fail");
        assert!(matches!(err, CatalogError::Parse(_)));
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    /// What: Pending catalogs are not ready
    ///
    /// Inputs:
    /// - `Catalog::pending()`.
    ///
    /// Output:
    /// - `is_ready()` is false and no units are served.
    fn catalog_pending_is_not_ready() {
        let cat = Catalog::pending();
        assert!(!cat.is_ready());
        assert!(cat.units().is_empty());
    }

    #[test]
    /// What: Tag edits are cleaned and merged
    ///
    /// Inputs:
    /// - `set_tags` with blanks/duplicates; `apply_tags` from a name map.
    ///
    /// Output:
    /// - Clean tag lists on the targeted units only.
    fn catalog_set_and_apply_tags() {
        let mut cat = Catalog::from_json_str(&sample_json()).expect("valid catalog");
        assert!(cat.set_tags(1, vec![" fav ".into(), String::new(), "fav".into(), "cmd".into()]));
        assert_eq!(cat.unit(1).map(|u| u.tags.clone()), Some(vec!["fav".into(), "cmd".into()]));
        assert!(!cat.set_tags(99, vec!["x".into()]));

        let mut map = BTreeMap::new();
        map.insert("Locust LCT-1V".to_string(), vec!["scout".to_string()]);
        assert_eq!(cat.apply_tags(&map), 1);
        assert_eq!(cat.unit(2).map(|u| u.tags.clone()), Some(vec!["scout".into()]));
    }

    #[test]
    /// What: Loading from disk reports IO errors for missing files
    ///
    /// Inputs:
    /// - A path inside a fresh temp dir that does not exist, then a written file.
    ///
    /// Output:
    /// - `CatalogError::Io` first; a ready catalog second.
    fn catalog_load_from_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        assert!(matches!(
            Catalog::load_from_path(&path),
            Err(CatalogError::Io(_))
        ));
        std::fs::write(&path, sample_json()).expect("write catalog");
        let cat = Catalog::load_from_path(&path).expect("load catalog");
        assert_eq!(cat.eras().len(), 2);
    }
}
