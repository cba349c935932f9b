use crate::types::{Theme, Tier};

/// sRGB 8-bit triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub fn hex_to_rgb(hex: &str) -> Rgb {
    let hex = hex.trim_start_matches('#');
    let r = u8::from_str_radix(hex.get(0..2).unwrap_or("00"), 16).unwrap_or(0);
    let g = u8::from_str_radix(hex.get(2..4).unwrap_or("00"), 16).unwrap_or(0);
    let b = u8::from_str_radix(hex.get(4..6).unwrap_or("00"), 16).unwrap_or(0);
    Rgb(r, g, b)
}

pub fn rgb_to_hex(c: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", c.0, c.1, c.2)
}

fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
}

pub fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
    Rgb(
        lerp_channel(a.0, b.0, t),
        lerp_channel(a.1, b.1, t),
        lerp_channel(a.2, b.2, t),
    )
}

/// Fixed pass/fail palette for salary-comparison coloring. These are
/// semantic colors, identical in both themes.
pub fn tier_color(tier: Tier) -> &'static str {
    match tier {
        Tier::Fail => "#ef4444",
        Tier::MeetsL1 => "#f97316",
        Tier::MeetsL2 => "#eab308",
        Tier::MeetsL3 => "#14b8a6",
        Tier::MeetsL4Plus => "#3b82f6",
    }
}

/// Theme-dependent colors for everything that is not a tier verdict.
#[derive(Debug, Clone, Copy)]
pub struct ThemeColors {
    /// 5-stop ramp for the absolute wage gradient, low to high.
    pub ramp: [&'static str; 5],
    /// Flat fill when the whole dataset has no usable scale.
    pub no_data_fill: &'static str,
    /// Fill for an individual county without wage data.
    pub unknown: &'static str,
}

const DARK: ThemeColors = ThemeColors {
    ramp: ["#f8fafc", "#bae6fd", "#3b82f6", "#4338ca", "#312e81"],
    no_data_fill: "#1e293b",
    unknown: "rgba(255, 255, 255, 0.05)",
};

const LIGHT: ThemeColors = ThemeColors {
    ramp: ["#e0e7ff", "#a5b4fc", "#6366f1", "#3730a3", "#1e1b4b"],
    no_data_fill: "#f1f5f9",
    unknown: "rgba(0, 0, 0, 0.03)",
};

pub fn theme_colors(theme: Theme) -> ThemeColors {
    match theme {
        Theme::Dark => DARK,
        Theme::Light => LIGHT,
    }
}

/// Sample the 5-stop ramp at position `t` in [0, 1], linearly interpolating
/// between the two neighboring stops. Out-of-range values clamp.
pub fn ramp_color(ramp: &[&'static str; 5], t: f64) -> String {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (ramp.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(ramp.len() - 2);
    let frac = scaled - i as f64;
    rgb_to_hex(lerp(hex_to_rgb(ramp[i]), hex_to_rgb(ramp[i + 1]), frac))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(rgb_to_hex(hex_to_rgb("#3b82f6")), "#3b82f6");
        assert_eq!(hex_to_rgb("ef4444"), Rgb(0xef, 0x44, 0x44));
    }

    #[test]
    fn test_malformed_hex_degrades_to_black_channels() {
        assert_eq!(hex_to_rgb("#zz0000"), Rgb(0, 0, 0));
        assert_eq!(hex_to_rgb("#ab"), Rgb(0xab, 0, 0));
    }

    #[test]
    fn test_ramp_endpoints_are_the_outer_stops() {
        let ramp = DARK.ramp;
        assert_eq!(ramp_color(&ramp, 0.0), "#f8fafc");
        assert_eq!(ramp_color(&ramp, 1.0), "#312e81");
    }

    #[test]
    fn test_ramp_midpoint_is_the_middle_stop() {
        assert_eq!(ramp_color(&DARK.ramp, 0.5), "#3b82f6");
    }

    #[test]
    fn test_ramp_clamps_out_of_range() {
        assert_eq!(ramp_color(&DARK.ramp, -3.0), ramp_color(&DARK.ramp, 0.0));
        assert_eq!(ramp_color(&DARK.ramp, 7.5), ramp_color(&DARK.ramp, 1.0));
    }

    #[test]
    fn test_lerp_interpolates_per_channel() {
        let mid = lerp(Rgb(0, 0, 0), Rgb(200, 100, 50), 0.5);
        assert_eq!(mid, Rgb(100, 50, 25));
    }

    #[test]
    fn test_tier_palette_is_theme_independent() {
        // The comparison palette never consults the theme tables.
        assert_eq!(tier_color(Tier::Fail), "#ef4444");
        assert_eq!(tier_color(Tier::MeetsL4Plus), "#3b82f6");
    }
}
