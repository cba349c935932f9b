use crate::classify::classify;
use crate::color::{ramp_color, theme_colors, tier_color};
use crate::types::{Fips, Theme, ViewMode, WageDataset};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-county fill colors plus the fallback for map features the dataset
/// does not cover. Every key present in the dataset gets exactly one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorEncoding {
    pub counties: BTreeMap<Fips, String>,
    pub fallback: String,
}

/// Build the per-county color assignment for the current view.
///
/// Branches are evaluated in a fixed order: a degenerate scale flattens the
/// whole map, then a positive salary selects the fixed tier palette, then
/// the absolute view interpolates the theme ramp over [scale.min, scale.max].
pub fn encode(dataset: &WageDataset, mode: ViewMode, theme: Theme) -> ColorEncoding {
    let colors = theme_colors(theme);

    if dataset.scale.is_degenerate() {
        let counties = dataset
            .data
            .keys()
            .map(|fips| (fips.clone(), colors.no_data_fill.to_string()))
            .collect();
        return ColorEncoding {
            counties,
            fallback: colors.no_data_fill.to_string(),
        };
    }

    let counties = match mode {
        ViewMode::Comparison { salary } => dataset
            .data
            .iter()
            .map(|(fips, record)| {
                let fill = match classify(Some(record), Some(salary)) {
                    Some(tier) => tier_color(tier).to_string(),
                    None => colors.unknown.to_string(),
                };
                (fips.clone(), fill)
            })
            .collect(),
        ViewMode::Absolute(level) => {
            let range = f64::from(dataset.scale.max - dataset.scale.min);
            dataset
                .data
                .iter()
                .map(|(fips, record)| {
                    let wage = level.value_in(record);
                    let fill = if record.has_data() && wage > 0 {
                        let t = f64::from(wage.saturating_sub(dataset.scale.min)) / range;
                        ramp_color(&colors.ramp, t)
                    } else {
                        colors.unknown.to_string()
                    };
                    (fips.clone(), fill)
                })
                .collect()
        }
    };

    ColorEncoding {
        counties,
        fallback: colors.unknown.to_string(),
    }
}
