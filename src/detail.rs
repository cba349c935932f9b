use crate::classify::classify;
use crate::types::{
    CountyWageRecord, DatasetMeta, FeatureInfo, Fips, Tier, WageDataset, WageLevel,
};
use serde::Serialize;

/// One line of the wage table in the detail popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WageRow {
    pub level: WageLevel,
    pub label: &'static str,
    pub value: u32,
    /// Matches the currently selected absolute view; drives row emphasis.
    pub is_active: bool,
}

/// Wage table or the explicit no-data state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetailContent {
    Wages { rows: Vec<WageRow> },
    NoData,
}

/// Verdict block shown when a personal salary is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonBadge {
    pub salary: u32,
    pub tier: Tier,
    pub text: &'static str,
    /// Dollars short of the next wage level; absent at the terminal tier.
    pub gap_to_next: Option<u32>,
}

/// Everything the detail popup renders for one selected county.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailViewModel {
    pub fips: Fips,
    pub county: String,
    pub state: String,
    pub content: DetailContent,
    pub comparison: Option<ComparisonBadge>,
    pub meta: DatasetMeta,
}

/// Build the detail view for `fips`.
///
/// A FIPS the dataset does not cover degrades to a minimal view model named
/// from the map feature (never an error); a record with no published wages
/// produces the explicit no-data state. A non-positive salary means no badge.
pub fn format(
    dataset: &WageDataset,
    fips: &str,
    feature: Option<&FeatureInfo>,
    active_level: WageLevel,
    personal_salary: Option<u32>,
) -> DetailViewModel {
    let meta = dataset.meta.clone();

    let record = match dataset.get(fips) {
        Some(record) => record,
        None => {
            // County is on the map but not in this dataset: carry the
            // geographic name through so the popup still has a title.
            let (county, state) = match feature {
                Some(f) => (format!("{} County", f.name), f.state.clone()),
                None => (fips.to_string(), String::new()),
            };
            return DetailViewModel {
                fips: fips.to_string(),
                county,
                state,
                content: DetailContent::NoData,
                comparison: None,
                meta,
            };
        }
    };

    let content = if record.has_data() {
        DetailContent::Wages {
            rows: WageLevel::ALL
                .iter()
                .map(|&level| WageRow {
                    level,
                    label: level.row_label(),
                    value: level.value_in(record),
                    is_active: level == active_level,
                })
                .collect(),
        }
    } else {
        DetailContent::NoData
    };

    let comparison = build_badge(record, personal_salary);

    DetailViewModel {
        fips: fips.to_string(),
        county: record.county.clone(),
        state: record.state.clone(),
        content,
        comparison,
        meta,
    }
}

fn build_badge(record: &CountyWageRecord, personal_salary: Option<u32>) -> Option<ComparisonBadge> {
    let salary = personal_salary.filter(|s| *s > 0)?;
    let tier = classify(Some(record), Some(salary))?;
    Some(ComparisonBadge {
        salary,
        tier,
        text: tier.description(),
        gap_to_next: tier.next_threshold(record).map(|next| next - salary),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WageScale;
    use std::collections::BTreeMap;

    fn record(l1: u32, l2: u32, l3: u32, l4: u32, avg: u32) -> CountyWageRecord {
        CountyWageRecord {
            county: "Autauga County".to_string(),
            state: "Alabama".to_string(),
            level1: l1,
            level2: l2,
            level3: l3,
            level4: l4,
            average: avg,
        }
    }

    fn dataset(entries: Vec<(&str, CountyWageRecord)>) -> WageDataset {
        let mut data = BTreeMap::new();
        for (fips, r) in entries {
            data.insert(fips.to_string(), r);
        }
        WageDataset {
            data,
            scale: WageScale { min: 40_000, max: 110_000 },
            meta: DatasetMeta {
                soc: "15-1252".to_string(),
                soc_title: "Software Developers".to_string(),
                wage_year: "2025-2026".to_string(),
                source: "U.S. DOL OFLC (FLAG wage data)".to_string(),
            },
            version: 1,
        }
    }

    #[test]
    fn test_badge_tier_and_gap_to_next_level() {
        // Scenario: 65k against 50/60/70/80 meets level 2, 5k short of level 3.
        let ds = dataset(vec![("01001", record(50_000, 60_000, 70_000, 80_000, 65_000))]);
        let vm = format(&ds, "01001", None, WageLevel::Level1, Some(65_000));
        let badge = vm.comparison.expect("salary set, badge expected");
        assert_eq!(badge.tier, Tier::MeetsL2);
        assert_eq!(badge.gap_to_next, Some(5_000));
        assert_eq!(badge.text, "Meets Level 2");
    }

    #[test]
    fn test_terminal_tier_has_no_gap() {
        let ds = dataset(vec![("01001", record(50_000, 60_000, 70_000, 80_000, 65_000))]);
        let vm = format(&ds, "01001", None, WageLevel::Level1, Some(80_000));
        let badge = vm.comparison.unwrap();
        assert_eq!(badge.tier, Tier::MeetsL4Plus);
        assert_eq!(badge.gap_to_next, None);
    }

    #[test]
    fn test_rows_flag_the_active_level() {
        let ds = dataset(vec![("01001", record(50_000, 60_000, 70_000, 80_000, 65_000))]);
        let vm = format(&ds, "01001", None, WageLevel::Level3, None);
        match vm.content {
            DetailContent::Wages { rows } => {
                assert_eq!(rows.len(), 5);
                let active: Vec<_> = rows.iter().filter(|r| r.is_active).collect();
                assert_eq!(active.len(), 1);
                assert_eq!(active[0].level, WageLevel::Level3);
                assert_eq!(active[0].value, 70_000);
            }
            DetailContent::NoData => panic!("expected wage rows"),
        }
    }

    #[test]
    fn test_no_wage_data_state() {
        let ds = dataset(vec![("01005", record(0, 0, 0, 0, 0))]);
        let vm = format(&ds, "01005", None, WageLevel::Level1, Some(65_000));
        assert_eq!(vm.content, DetailContent::NoData);
        assert!(vm.comparison.is_none(), "no data means nothing to compare");
        assert_eq!(vm.county, "Autauga County");
    }

    #[test]
    fn test_unknown_fips_degrades_to_feature_name() {
        // Scenario: selection survives a dataset swap that dropped the county.
        let ds = dataset(vec![("01001", record(50_000, 60_000, 70_000, 80_000, 65_000))]);
        let feature = FeatureInfo {
            fips: "56045".to_string(),
            name: "Weston".to_string(),
            state: "56".to_string(),
        };
        let vm = format(&ds, "56045", Some(&feature), WageLevel::Level1, Some(65_000));
        assert_eq!(vm.county, "Weston County");
        assert_eq!(vm.state, "56");
        assert_eq!(vm.content, DetailContent::NoData);
        assert!(vm.comparison.is_none());
    }

    #[test]
    fn test_unknown_fips_without_feature_still_returns() {
        let ds = dataset(vec![]);
        let vm = format(&ds, "99999", None, WageLevel::Average, None);
        assert_eq!(vm.county, "99999");
        assert_eq!(vm.content, DetailContent::NoData);
    }

    #[test]
    fn test_meta_passes_through_verbatim() {
        let ds = dataset(vec![("01001", record(50_000, 60_000, 70_000, 80_000, 65_000))]);
        let vm = format(&ds, "01001", None, WageLevel::Level1, None);
        assert_eq!(vm.meta, ds.meta);
    }

    #[test]
    fn test_fail_tier_gap_is_distance_to_level1() {
        let ds = dataset(vec![("01001", record(50_000, 60_000, 70_000, 80_000, 65_000))]);
        let vm = format(&ds, "01001", None, WageLevel::Level1, Some(45_000));
        let badge = vm.comparison.unwrap();
        assert_eq!(badge.tier, Tier::Fail);
        assert_eq!(badge.gap_to_next, Some(5_000));
        assert_eq!(badge.text, "Fails Level 1");
    }
}
