#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Visual encoding for the surveillance map.
//!
//! Maps alert levels (1-4) and sanitation percentages (0-100) to fill
//! colors and opacities, and layers region and zoom dimming on top. All
//! functions here are pure: geometry never reaches this crate, only the
//! values that decide how a polygon is painted.

pub mod palette;

use epi_map_alert_models::{AlertLevel, AlertRecord};
use serde::Serialize;

pub use palette::Color;

/// Opacity of a state filled from real data.
pub const DATA_OPACITY: f64 = 0.7;
/// Opacity of a state with no data.
pub const NO_DATA_OPACITY: f64 = 0.3;
/// Opacity of a state outside the active region filter.
pub const DIMMED_OPACITY: f64 = 0.2;
/// Opacity of every state once municipalities are shown.
pub const ZOOMED_IN_OPACITY: f64 = 0.1;
/// Opacity of a municipality with an alert record.
pub const MUNICIPALITY_OPACITY: f64 = 0.75;
/// Opacity of a municipality without an alert record.
pub const MUNICIPALITY_NO_DATA_OPACITY: f64 = 0.15;

/// Lowest sanitation opacity (0%).
pub const SANITATION_MIN_OPACITY: f64 = 0.35;
/// Opacity range added across 0-100%.
pub const SANITATION_OPACITY_SPAN: f64 = 0.4;

/// Paint applied to one polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyle {
    /// Fill color (`#rrggbb`).
    pub fill_color: Color,
    /// Fill opacity in `0.0..=1.0`.
    pub fill_opacity: f64,
    /// Outline color (`#rrggbb`).
    pub stroke_color: Color,
    /// Outline width in pixels.
    pub stroke_weight: f64,
}

/// Color for a raw alert level. Anything outside 1-4 gets the level-1
/// color.
#[must_use]
pub const fn color_for(level: i64) -> Color {
    level_color(AlertLevel::from_value_or_green(level))
}

/// Color for an alert level.
#[must_use]
pub const fn level_color(level: AlertLevel) -> Color {
    match level {
        AlertLevel::Green => palette::GREEN,
        AlertLevel::Attention => palette::YELLOW,
        AlertLevel::Alert => palette::ORANGE,
        AlertLevel::Emergency => palette::RED,
    }
}

/// State-level opacity for the disease layer.
///
/// Zoomed-in wins over everything, then region dimming, then whether the
/// state has data at all.
#[must_use]
pub const fn opacity_for(has_data: bool, dimmed: bool, zoomed_in: bool) -> f64 {
    let base = if has_data {
        DATA_OPACITY
    } else {
        NO_DATA_OPACITY
    };
    dim(base, dimmed, zoomed_in)
}

/// Color band for a sanitation percentage.
///
/// Bands: `>= 80`, `[60, 80)`, `[40, 60)`, `[20, 40)`, `< 20`.
#[must_use]
pub fn sanitation_color_for(percent: f64) -> Color {
    if percent >= 80.0 {
        palette::SANITATION_BANDS[0]
    } else if percent >= 60.0 {
        palette::SANITATION_BANDS[1]
    } else if percent >= 40.0 {
        palette::SANITATION_BANDS[2]
    } else if percent >= 20.0 {
        palette::SANITATION_BANDS[3]
    } else {
        palette::SANITATION_BANDS[4]
    }
}

/// `0.35 + 0.4 * percent / 100`, with `percent` clamped to `0..=100`.
#[must_use]
pub fn sanitation_opacity_for(percent: f64) -> f64 {
    let percent = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    };
    SANITATION_OPACITY_SPAN.mul_add(percent / 100.0, SANITATION_MIN_OPACITY)
}

/// What a state polygon is filled from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateFill {
    /// Disease layer: the state's latest alert level, if any.
    Alert(Option<i64>),
    /// Sanitation layer: the state's coverage percentage, if any.
    Sanitation(Option<f64>),
}

/// Style of a state polygon.
///
/// The fill decides color and base opacity; region dimming then replaces
/// the opacity (keeping the color) and zoom dimming replaces it again.
#[must_use]
pub fn state_style(fill: StateFill, dimmed: bool, zoomed_in: bool) -> FeatureStyle {
    let (fill_color, base) = match fill {
        StateFill::Alert(Some(level)) => (color_for(level), DATA_OPACITY),
        StateFill::Sanitation(Some(percent)) => (
            sanitation_color_for(percent),
            sanitation_opacity_for(percent),
        ),
        StateFill::Alert(None) | StateFill::Sanitation(None) => {
            (palette::NO_DATA, NO_DATA_OPACITY)
        }
    };

    FeatureStyle {
        fill_color,
        fill_opacity: dim(base, dimmed, zoomed_in),
        stroke_color: palette::STATE_STROKE,
        stroke_weight: 1.0,
    }
}

/// Style of a municipality polygon from its latest alert record.
#[must_use]
pub const fn municipality_style(record: Option<&AlertRecord>) -> FeatureStyle {
    let (fill_color, fill_opacity) = match record {
        Some(record) => (color_for(record.level), MUNICIPALITY_OPACITY),
        None => (palette::NO_DATA, MUNICIPALITY_NO_DATA_OPACITY),
    };

    FeatureStyle {
        fill_color,
        fill_opacity,
        stroke_color: palette::MUNICIPALITY_STROKE,
        stroke_weight: 0.5,
    }
}

/// Highlight applied while the pointer is over a polygon.
#[must_use]
pub const fn hover_style(base: FeatureStyle) -> FeatureStyle {
    FeatureStyle {
        stroke_color: palette::HOVER_STROKE,
        stroke_weight: 3.0,
        ..base
    }
}

/// Legend rows for the disease layer: `(level, label, color)`.
#[must_use]
pub fn alert_legend() -> Vec<(AlertLevel, &'static str, Color)> {
    AlertLevel::all()
        .iter()
        .map(|level| (*level, level.label(), level_color(*level)))
        .collect()
}

/// Legend rows for sanitation layers: `(label, color)`, best band first.
#[must_use]
pub fn sanitation_legend() -> Vec<(&'static str, Color)> {
    ["≥ 80%", "60–80%", "40–60%", "20–40%", "< 20%"]
        .into_iter()
        .zip(palette::SANITATION_BANDS)
        .collect()
}

const fn dim(base: f64, dimmed: bool, zoomed_in: bool) -> f64 {
    if zoomed_in {
        ZOOMED_IN_OPACITY
    } else if dimmed {
        DIMMED_OPACITY
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epi_map_alert_models::EpiWeek;

    fn record(level: i64) -> AlertRecord {
        AlertRecord {
            week: EpiWeek::from_encoded(202_410).unwrap(),
            cases: 12,
            rt: Some(1.2),
            incidence_100k: Some(3.4),
            cumulative_year_notifications: Some(120),
            level,
        }
    }

    #[test]
    fn fixed_palette_for_known_levels() {
        assert_eq!(color_for(1), palette::GREEN);
        assert_eq!(color_for(2), palette::YELLOW);
        assert_eq!(color_for(3), palette::ORANGE);
        assert_eq!(color_for(4), palette::RED);
    }

    #[test]
    fn unknown_levels_fail_safe_to_green() {
        for level in [i64::MIN, -1, 0, 5, 10, i64::MAX] {
            assert_eq!(color_for(level), color_for(1), "level {level}");
        }
    }

    #[test]
    fn zoomed_in_overrides_every_other_flag() {
        for has_data in [true, false] {
            for dimmed in [true, false] {
                assert!(
                    (opacity_for(has_data, dimmed, true) - ZOOMED_IN_OPACITY).abs()
                        < f64::EPSILON
                );
            }
        }
        assert!((opacity_for(true, true, false) - DIMMED_OPACITY).abs() < f64::EPSILON);
        assert!((opacity_for(true, false, false) - DATA_OPACITY).abs() < f64::EPSILON);
        assert!((opacity_for(false, false, false) - NO_DATA_OPACITY).abs() < f64::EPSILON);
    }

    #[test]
    fn sanitation_bands() {
        assert_eq!(sanitation_color_for(100.0), palette::SANITATION_BANDS[0]);
        assert_eq!(sanitation_color_for(80.0), palette::SANITATION_BANDS[0]);
        assert_eq!(sanitation_color_for(79.9), palette::SANITATION_BANDS[1]);
        assert_eq!(sanitation_color_for(60.0), palette::SANITATION_BANDS[1]);
        assert_eq!(sanitation_color_for(40.0), palette::SANITATION_BANDS[2]);
        assert_eq!(sanitation_color_for(20.0), palette::SANITATION_BANDS[3]);
        assert_eq!(sanitation_color_for(19.9), palette::SANITATION_BANDS[4]);
        assert_eq!(sanitation_color_for(0.0), palette::SANITATION_BANDS[4]);
    }

    #[test]
    fn sanitation_opacity_endpoints() {
        assert!((sanitation_opacity_for(0.0) - 0.35).abs() < 1e-12);
        assert!((sanitation_opacity_for(100.0) - 0.75).abs() < 1e-12);
        assert!((sanitation_opacity_for(50.0) - 0.55).abs() < 1e-12);
    }

    #[test]
    fn sanitation_opacity_is_monotone_and_bounded() {
        let mut previous = sanitation_opacity_for(0.0);
        for tenth in 0..=1000 {
            let percent = f64::from(tenth) / 10.0;
            let opacity = sanitation_opacity_for(percent);
            assert!(opacity >= previous, "decreased at {percent}");
            assert!((0.35..=0.75).contains(&opacity), "out of bounds at {percent}");
            previous = opacity;
        }
        assert!((sanitation_opacity_for(-10.0) - 0.35).abs() < 1e-12);
        assert!((sanitation_opacity_for(250.0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn state_style_region_dimming_keeps_color() {
        let normal = state_style(StateFill::Alert(Some(4)), false, false);
        let dimmed = state_style(StateFill::Alert(Some(4)), true, false);
        assert_eq!(normal.fill_color, dimmed.fill_color);
        assert!((dimmed.fill_opacity - DIMMED_OPACITY).abs() < f64::EPSILON);

        let sanitation = state_style(StateFill::Sanitation(Some(90.0)), true, false);
        assert_eq!(sanitation.fill_color, palette::SANITATION_BANDS[0]);
        assert!((sanitation.fill_opacity - DIMMED_OPACITY).abs() < f64::EPSILON);
    }

    #[test]
    fn state_style_zoom_dimming_is_lowest() {
        let style = state_style(StateFill::Sanitation(Some(90.0)), true, true);
        assert!((style.fill_opacity - ZOOMED_IN_OPACITY).abs() < f64::EPSILON);
        assert!(ZOOMED_IN_OPACITY < DIMMED_OPACITY);
    }

    #[test]
    fn missing_data_is_neutral_not_zero() {
        let no_alert = state_style(StateFill::Alert(None), false, false);
        let no_sanitation = state_style(StateFill::Sanitation(None), false, false);
        let zero = state_style(StateFill::Sanitation(Some(0.0)), false, false);
        assert_eq!(no_alert.fill_color, palette::NO_DATA);
        assert_eq!(no_sanitation.fill_color, palette::NO_DATA);
        assert_ne!(zero.fill_color, palette::NO_DATA);
    }

    #[test]
    fn municipality_styles() {
        let with_data = municipality_style(Some(&record(3)));
        assert_eq!(with_data.fill_color, palette::ORANGE);
        assert!((with_data.fill_opacity - MUNICIPALITY_OPACITY).abs() < f64::EPSILON);

        let without = municipality_style(None);
        assert_eq!(without.fill_color, palette::NO_DATA);
        assert!(without.fill_opacity < with_data.fill_opacity);
    }

    #[test]
    fn hover_boosts_stroke_only() {
        let base = municipality_style(Some(&record(2)));
        let hovered = hover_style(base);
        assert!(hovered.stroke_weight > base.stroke_weight);
        assert_ne!(hovered.stroke_color, base.stroke_color);
        assert_eq!(hovered.fill_color, base.fill_color);
        assert!((hovered.fill_opacity - base.fill_opacity).abs() < f64::EPSILON);
    }

    #[test]
    fn legends_cover_every_band() {
        assert_eq!(alert_legend().len(), 4);
        assert_eq!(sanitation_legend().len(), 5);
        assert_eq!(alert_legend()[3].1, "Emergency");
    }

    #[test]
    fn styles_serialize_with_camel_case_keys() {
        let json = serde_json::to_value(hover_style(municipality_style(None))).unwrap();
        assert_eq!(json["fillColor"], palette::NO_DATA);
        assert_eq!(json["strokeColor"], palette::HOVER_STROKE);
        assert_eq!(json["strokeWeight"], 3.0);
    }
}
