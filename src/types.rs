use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 5-digit state+county FIPS code, zero-padded (e.g. "01001").
pub type Fips = String;

/// Prevailing wages for one county, annual USD (already hourly × 2080).
///
/// `level1 == 0` marks a county the survey covers but publishes no wages
/// for; such a record is never tier-classified or color-interpolated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountyWageRecord {
    pub county: String,
    pub state: String,
    pub level1: u32,
    pub level2: u32,
    pub level3: u32,
    pub level4: u32,
    pub average: u32,
}

impl CountyWageRecord {
    pub fn has_data(&self) -> bool {
        self.level1 > 0
    }
}

/// Bounds of the selected wage-level field across all counties with data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WageScale {
    pub min: u32,
    pub max: u32,
}

impl WageScale {
    /// A zero-width (or all-no-data) scale cannot be interpolated over.
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max || self.max == 0
    }
}

/// Attribution carried verbatim into every detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub soc: String,
    pub soc_title: String,
    pub wage_year: String,
    pub source: String,
}

/// One occupation's wage data for every covered county.
///
/// Counties are keyed in a BTreeMap so iteration (and therefore every
/// derived encoding) is deterministic for identical inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WageDataset {
    pub data: BTreeMap<Fips, CountyWageRecord>,
    pub scale: WageScale,
    pub meta: DatasetMeta,
    /// Snapshot counter assigned by the store; not part of the wire shape.
    #[serde(skip)]
    pub version: u64,
}

impl WageDataset {
    pub fn get(&self, fips: &str) -> Option<&CountyWageRecord> {
        self.data.get(fips)
    }

    pub fn contains(&self, fips: &str) -> bool {
        self.data.contains_key(fips)
    }
}

/// The five absolute wage-level views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WageLevel {
    #[default]
    Level1,
    Level2,
    Level3,
    Level4,
    Average,
}

impl WageLevel {
    pub const ALL: [WageLevel; 5] = [
        WageLevel::Level1,
        WageLevel::Level2,
        WageLevel::Level3,
        WageLevel::Level4,
        WageLevel::Average,
    ];

    /// Typed accessor for the record field this view reads.
    pub fn value_in(self, record: &CountyWageRecord) -> u32 {
        match self {
            WageLevel::Level1 => record.level1,
            WageLevel::Level2 => record.level2,
            WageLevel::Level3 => record.level3,
            WageLevel::Level4 => record.level4,
            WageLevel::Average => record.average,
        }
    }

    /// Row caption used by the detail panel.
    pub fn row_label(self) -> &'static str {
        match self {
            WageLevel::Level1 => "Level I",
            WageLevel::Level2 => "Level II",
            WageLevel::Level3 => "Level III",
            WageLevel::Level4 => "Level IV",
            WageLevel::Average => "Average Annual Wage",
        }
    }

    pub fn parse(s: &str) -> Option<WageLevel> {
        match s {
            "level1" => Some(WageLevel::Level1),
            "level2" => Some(WageLevel::Level2),
            "level3" => Some(WageLevel::Level3),
            "level4" => Some(WageLevel::Level4),
            "average" => Some(WageLevel::Average),
            _ => None,
        }
    }
}

/// Industry-collection filter: the FLAG all-industries table or the
/// ACWIA education/research table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "ed")]
    Education,
}

impl Collection {
    pub fn parse(s: &str) -> Option<Collection> {
        match s {
            "all" => Some(Collection::All),
            "ed" => Some(Collection::Education),
            _ => None,
        }
    }
}

/// Light/dark rendering theme. Comparison-tier colors ignore this; the
/// absolute gradient and the no-data fills do not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn parse(s: &str) -> Option<Theme> {
        match s {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

/// Classification of a personal salary against one county's wage levels.
///
/// Ordered by threshold: Fail < MeetsL1 < ... < MeetsL4Plus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Fail,
    MeetsL1,
    MeetsL2,
    MeetsL3,
    MeetsL4Plus,
}

impl Tier {
    /// Short on-map label.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Tier::Fail => "Fail",
            Tier::MeetsL1 => "L1",
            Tier::MeetsL2 => "L2",
            Tier::MeetsL3 => "L3",
            Tier::MeetsL4Plus => "L4+",
        }
    }

    /// Badge text for the detail panel.
    pub fn description(self) -> &'static str {
        match self {
            Tier::Fail => "Fails Level 1",
            Tier::MeetsL1 => "Meets Level 1",
            Tier::MeetsL2 => "Meets Level 2",
            Tier::MeetsL3 => "Meets Level 3",
            Tier::MeetsL4Plus => "Exceeds Level 4",
        }
    }

    /// The next threshold a salary at this tier has not yet reached.
    /// MeetsL4Plus is terminal.
    pub fn next_threshold(self, record: &CountyWageRecord) -> Option<u32> {
        match self {
            Tier::Fail => Some(record.level1),
            Tier::MeetsL1 => Some(record.level2),
            Tier::MeetsL2 => Some(record.level3),
            Tier::MeetsL3 => Some(record.level4),
            Tier::MeetsL4Plus => None,
        }
    }
}

/// How the map is being colored/labeled right now. A positive personal
/// salary always wins over the absolute-level view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    Comparison { salary: u32 },
    Absolute(WageLevel),
}

impl ViewMode {
    pub fn resolve(level: WageLevel, personal_salary: Option<u32>) -> ViewMode {
        match personal_salary {
            Some(salary) if salary > 0 => ViewMode::Comparison { salary },
            _ => ViewMode::Absolute(level),
        }
    }
}

/// The subset of a county map feature's properties the engine needs when a
/// selection has no backing wage record (name/state come from the geometry
/// source, not the wage table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureInfo {
    pub fips: Fips,
    pub name: String,
    pub state: String,
}
