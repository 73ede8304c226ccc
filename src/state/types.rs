//! Core value types used by unitfacet state.

use serde::{Deserialize, Serialize};

/// One equipment entry mounted on a unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Display name (e.g., "Medium Laser").
    pub name: String,
    /// Number of identical copies mounted.
    #[serde(default = "default_quantity", alias = "q")]
    pub quantity: u32,
}

/// Serde default for [`Component::quantity`].
const fn default_quantity() -> u32 {
    1
}

/// What: One catalog record as seen by the filter engine.
///
/// Inputs:
/// - Deserialized from the catalog JSON (camelCase keys); missing fields default.
///
/// Output:
/// - Read-only view consumed by search, filtering, sorting, and option derivation.
///
/// Details:
/// - `id` is the stable identity used as the key for every per-record cache.
/// - `-1` marks an unknown value for sentinel-aware numeric fields such as
///   `jump` or `cost`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Unit {
    /// Stable numeric identifier.
    pub id: u32,
    /// Unique display name, usually `"{chassis} {model}"`.
    pub name: String,
    /// Chassis name (e.g., "Atlas").
    pub chassis: String,
    /// Model designation (e.g., "AS7-D").
    pub model: String,
    /// Unit type (e.g., "Mek", "Tank").
    #[serde(rename = "type")]
    pub unit_type: String,
    /// Finer type grouping (e.g., "BattleMek", "Industrial Mek").
    pub subtype: String,
    /// Technology base (e.g., "Inner Sphere", "Clan").
    pub tech_base: String,
    /// Battlefield role (e.g., "Juggernaut").
    pub role: String,
    /// Weight class (e.g., "Assault").
    pub weight_class: String,
    /// Rules level (e.g., "Standard").
    pub level: String,
    /// Rulebooks the unit appears in.
    pub source: Vec<String>,
    /// Battle value.
    pub bv: f64,
    /// Point value.
    pub pv: f64,
    /// Tonnage.
    pub tons: f64,
    /// Total armor points.
    pub armor: f64,
    /// Total internal structure points.
    pub internal: f64,
    /// Walking MP.
    pub walk: f64,
    /// Running MP.
    pub run: f64,
    /// Jumping MP; `-1` when unknown.
    pub jump: f64,
    /// Heat generated by a full alpha strike.
    pub heat: f64,
    /// Heat dissipation.
    pub dissipation: f64,
    /// Introduction year.
    pub year: i32,
    /// C-bill cost; `-1` when unknown.
    pub cost: f64,
    /// Mounted equipment.
    pub components: Vec<Component>,
    /// Design quirks.
    pub quirks: Vec<String>,
    /// Special features.
    pub features: Vec<String>,
    /// User-assigned tags.
    pub tags: Vec<String>,
}

/// What: Closed set of record fields the engine can filter or sort on.
///
/// Inputs:
/// - Referenced by filter definitions and sort keys.
///
/// Output:
/// - Typed accessors ([`UnitField::number`], [`UnitField::labels`]) over a [`Unit`].
///
/// Details:
/// - Each variant is either numeric or label-valued; callers dispatch on the
///   filter definition's kind, never on the runtime shape of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitField {
    /// Display name.
    Name,
    /// Chassis name.
    Chassis,
    /// Model designation.
    Model,
    /// Unit type.
    Type,
    /// Unit subtype.
    Subtype,
    /// Technology base.
    TechBase,
    /// Battlefield role.
    Role,
    /// Weight class.
    WeightClass,
    /// Rules level.
    Level,
    /// Source rulebooks (list).
    Source,
    /// Battle value.
    Bv,
    /// Point value.
    Pv,
    /// Tonnage.
    Tons,
    /// Armor points.
    Armor,
    /// Internal structure points.
    Internal,
    /// Walking MP.
    Walk,
    /// Running MP.
    Run,
    /// Jumping MP.
    Jump,
    /// Alpha-strike heat.
    Heat,
    /// Heat dissipation.
    Dissipation,
    /// Introduction year.
    Year,
    /// C-bill cost.
    Cost,
    /// Mounted equipment names (list, with quantities).
    Components,
    /// Design quirks (list).
    Quirks,
    /// Special features (list).
    Features,
    /// User tags (list).
    Tags,
}

impl UnitField {
    /// `true` for fields read through [`UnitField::number`].
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Bv
                | Self::Pv
                | Self::Tons
                | Self::Armor
                | Self::Internal
                | Self::Walk
                | Self::Run
                | Self::Jump
                | Self::Heat
                | Self::Dissipation
                | Self::Year
                | Self::Cost
        )
    }

    /// What: Read a numeric field.
    ///
    /// Inputs:
    /// - `unit`: Record to read.
    ///
    /// Output:
    /// - `Some(value)` for numeric fields; `None` for label fields.
    #[must_use]
    pub fn number(self, unit: &Unit) -> Option<f64> {
        let v = match self {
            Self::Bv => unit.bv,
            Self::Pv => unit.pv,
            Self::Tons => unit.tons,
            Self::Armor => unit.armor,
            Self::Internal => unit.internal,
            Self::Walk => unit.walk,
            Self::Run => unit.run,
            Self::Jump => unit.jump,
            Self::Heat => unit.heat,
            Self::Dissipation => unit.dissipation,
            Self::Year => f64::from(unit.year),
            Self::Cost => unit.cost,
            _ => return None,
        };
        Some(v)
    }

    /// What: Read a label-valued field as a list of non-empty labels.
    ///
    /// Inputs:
    /// - `unit`: Record to read.
    ///
    /// Output:
    /// - Scalar fields yield zero or one label; list fields yield every non-empty entry.
    ///
    /// Details:
    /// - Numeric fields yield an empty list.
    /// - Component quantities are not expanded here; see the component index.
    #[must_use]
    pub fn labels(self, unit: &Unit) -> Vec<&str> {
        match self {
            Self::Name => single(&unit.name),
            Self::Chassis => single(&unit.chassis),
            Self::Model => single(&unit.model),
            Self::Type => single(&unit.unit_type),
            Self::Subtype => single(&unit.subtype),
            Self::TechBase => single(&unit.tech_base),
            Self::Role => single(&unit.role),
            Self::WeightClass => single(&unit.weight_class),
            Self::Level => single(&unit.level),
            Self::Source => non_empty(&unit.source),
            Self::Components => unit
                .components
                .iter()
                .map(|c| c.name.as_str())
                .filter(|s| !s.is_empty())
                .collect(),
            Self::Quirks => non_empty(&unit.quirks),
            Self::Features => non_empty(&unit.features),
            Self::Tags => non_empty(&unit.tags),
            _ => Vec::new(),
        }
    }

    /// What: Compare two records on this field.
    ///
    /// Inputs:
    /// - `a`, `b`: Records to compare.
    ///
    /// Output:
    /// - Numeric fields compare by value (`total_cmp`); label fields compare the
    ///   joined labels case-insensitively.
    #[must_use]
    pub fn compare(self, a: &Unit, b: &Unit) -> std::cmp::Ordering {
        if let (Some(x), Some(y)) = (self.number(a), self.number(b)) {
            return x.total_cmp(&y);
        }
        let la = self.labels(a).join(",").to_lowercase();
        let lb = self.labels(b).join(",").to_lowercase();
        la.cmp(&lb)
    }
}

/// Wrap a scalar label, dropping empty strings.
fn single(label: &str) -> Vec<&str> {
    if label.is_empty() {
        Vec::new()
    } else {
        vec![label]
    }
}

/// Collect the non-empty entries of a label list.
fn non_empty(list: &[String]) -> Vec<&str> {
    list.iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Sorting key for the results list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Default: chassis, then model, then year.
    #[default]
    Name,
    /// Battle value adjusted for the current pilot skills.
    Bv,
    /// Point value.
    Pv,
    /// Tonnage.
    Tons,
    /// Armor points.
    Armor,
    /// Internal structure points.
    Internal,
    /// Walking MP.
    Walk,
    /// Running MP.
    Run,
    /// Jumping MP.
    Jump,
    /// Alpha-strike heat.
    Heat,
    /// Heat dissipation.
    Dissipation,
    /// Introduction year.
    Year,
    /// C-bill cost.
    Cost,
    /// Unit type.
    Type,
    /// Battlefield role.
    Role,
    /// Technology base.
    TechBase,
    /// Weight class.
    WeightClass,
}

impl SortKey {
    /// Every sortable key, in menu order.
    pub const ALL: [Self; 17] = [
        Self::Name,
        Self::Bv,
        Self::Pv,
        Self::Tons,
        Self::Armor,
        Self::Internal,
        Self::Walk,
        Self::Run,
        Self::Jump,
        Self::Heat,
        Self::Dissipation,
        Self::Year,
        Self::Cost,
        Self::Type,
        Self::Role,
        Self::TechBase,
        Self::WeightClass,
    ];

    /// Return the string key used in URLs and settings files for this sort key.
    ///
    /// Inputs: none
    ///
    /// Output: Static key string.
    #[must_use]
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Bv => "bv",
            Self::Pv => "pv",
            Self::Tons => "tons",
            Self::Armor => "armor",
            Self::Internal => "internal",
            Self::Walk => "walk",
            Self::Run => "run",
            Self::Jump => "jump",
            Self::Heat => "heat",
            Self::Dissipation => "dissipation",
            Self::Year => "year",
            Self::Cost => "cost",
            Self::Type => "type",
            Self::Role => "role",
            Self::TechBase => "techBase",
            Self::WeightClass => "weightClass",
        }
    }

    /// Parse a sort key from its URL/settings key.
    ///
    /// Inputs: `s` key string (exact match, surrounding whitespace ignored).
    ///
    /// Output: `Some(SortKey)` on a known key; `None` otherwise.
    #[must_use]
    pub fn from_key(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|k| k.as_key() == s)
    }

    /// Record field this key reads.
    #[must_use]
    pub const fn field(self) -> UnitField {
        match self {
            Self::Name => UnitField::Name,
            Self::Bv => UnitField::Bv,
            Self::Pv => UnitField::Pv,
            Self::Tons => UnitField::Tons,
            Self::Armor => UnitField::Armor,
            Self::Internal => UnitField::Internal,
            Self::Walk => UnitField::Walk,
            Self::Run => UnitField::Run,
            Self::Jump => UnitField::Jump,
            Self::Heat => UnitField::Heat,
            Self::Dissipation => UnitField::Dissipation,
            Self::Year => UnitField::Year,
            Self::Cost => UnitField::Cost,
            Self::Type => UnitField::Type,
            Self::Role => UnitField::Role,
            Self::TechBase => UnitField::TechBase,
            Self::WeightClass => UnitField::WeightClass,
        }
    }
}

/// Sort direction for the results list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// URL key (`asc` / `desc`).
    #[must_use]
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parse `asc` / `desc`; anything else is `None`.
    #[must_use]
    pub fn from_key(s: &str) -> Option<Self> {
        match s.trim() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}
