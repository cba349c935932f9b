use crate::classify::classify;
use crate::types::{Fips, ViewMode, WageDataset};
use std::collections::BTreeMap;

/// Compact on-map annotation for every county in the dataset.
///
/// Comparison mode labels with the tier mnemonic, absolute mode with an
/// abbreviated dollar amount. Counties without a usable value get the empty
/// string, never a missing key, so the renderer can treat the map as total.
pub fn label(dataset: &WageDataset, mode: ViewMode) -> BTreeMap<Fips, String> {
    dataset
        .data
        .iter()
        .map(|(fips, record)| {
            let text = match mode {
                ViewMode::Comparison { salary } => classify(Some(record), Some(salary))
                    .map(|tier| tier.mnemonic().to_string())
                    .unwrap_or_default(),
                ViewMode::Absolute(level) => {
                    if record.has_data() {
                        compact_dollars(level.value_in(record))
                    } else {
                        String::new()
                    }
                }
            };
            (fips.clone(), text)
        })
        .collect()
}

/// "$105k" for 105_000, "$850" below a thousand, empty for zero.
/// Thousands round to nearest, not truncate.
pub fn compact_dollars(value: u32) -> String {
    if value == 0 {
        String::new()
    } else if value >= 1000 {
        format!("${}k", (value + 500) / 1000)
    } else {
        format!("${}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CountyWageRecord, DatasetMeta, WageLevel, WageScale};

    fn record(l1: u32, l2: u32, l3: u32, l4: u32, avg: u32) -> CountyWageRecord {
        CountyWageRecord {
            county: "Test".to_string(),
            state: "TS".to_string(),
            level1: l1,
            level2: l2,
            level3: l3,
            level4: l4,
            average: avg,
        }
    }

    fn dataset(entries: Vec<(&str, CountyWageRecord)>) -> WageDataset {
        let scale = WageScale { min: 40_000, max: 110_000 };
        WageDataset {
            data: entries
                .into_iter()
                .map(|(fips, r)| (fips.to_string(), r))
                .collect(),
            scale,
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
    fn test_compact_dollars_rounds_to_nearest_thousand() {
        assert_eq!(compact_dollars(105_000), "$105k");
        assert_eq!(compact_dollars(104_499), "$104k");
        assert_eq!(compact_dollars(104_500), "$105k");
        assert_eq!(compact_dollars(1_000), "$1k");
    }

    #[test]
    fn test_compact_dollars_small_and_zero() {
        assert_eq!(compact_dollars(850), "$850");
        assert_eq!(compact_dollars(999), "$999");
        assert_eq!(compact_dollars(0), "");
    }

    #[test]
    fn test_absolute_labels_use_active_level() {
        let ds = dataset(vec![("01001", record(105_000, 110_000, 115_000, 120_000, 112_000))]);
        let labels = label(&ds, ViewMode::Absolute(WageLevel::Level1));
        assert_eq!(labels["01001"], "$105k");
        let labels = label(&ds, ViewMode::Absolute(WageLevel::Level4));
        assert_eq!(labels["01001"], "$120k");
    }

    #[test]
    fn test_comparison_labels_are_tier_mnemonics() {
        let ds = dataset(vec![
            ("01001", record(50_000, 60_000, 70_000, 80_000, 65_000)),
            ("01003", record(90_000, 95_000, 99_000, 105_000, 97_000)),
        ]);
        let labels = label(&ds, ViewMode::Comparison { salary: 75_000 });
        assert_eq!(labels["01001"], "L3");
        assert_eq!(labels["01003"], "Fail");
    }

    #[test]
    fn test_no_data_county_gets_empty_label_in_both_modes() {
        let ds = dataset(vec![("01005", record(0, 0, 0, 0, 0))]);
        let labels = label(&ds, ViewMode::Comparison { salary: 75_000 });
        assert_eq!(labels["01005"], "");
        let labels = label(&ds, ViewMode::Absolute(WageLevel::Average));
        assert_eq!(labels["01005"], "");
    }

    #[test]
    fn test_labels_are_total_over_dataset_keys() {
        let ds = dataset(vec![
            ("01001", record(50_000, 60_000, 70_000, 80_000, 65_000)),
            ("01005", record(0, 0, 0, 0, 0)),
            ("56045", record(45_000, 52_000, 61_000, 72_000, 57_000)),
        ]);
        let labels = label(&ds, ViewMode::Absolute(WageLevel::Level2));
        assert_eq!(labels.len(), ds.data.len());
        for fips in ds.data.keys() {
            assert!(labels.contains_key(fips), "missing label for {fips}");
        }
    }
}
