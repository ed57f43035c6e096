//! Fixed colors used by the map.

/// A `#rrggbb` color.
pub type Color = &'static str;

/// Alert level 1.
pub const GREEN: Color = "#22c55e";
/// Alert level 2.
pub const YELLOW: Color = "#eab308";
/// Alert level 3.
pub const ORANGE: Color = "#f97316";
/// Alert level 4.
pub const RED: Color = "#ef4444";

/// Fill for polygons without data.
pub const NO_DATA: Color = "#9ca3af";

/// Sanitation bands, best coverage first. The last band doubles as a
/// warning color.
pub const SANITATION_BANDS: [Color; 5] = ["#0369a1", "#0ea5e9", "#7dd3fc", "#fcd34d", "#ea580c"];

/// State outline.
pub const STATE_STROKE: Color = "#ffffff";
/// Municipality outline.
pub const MUNICIPALITY_STROKE: Color = "#f8fafc";
/// Outline while hovered.
pub const HOVER_STROKE: Color = "#111827";
