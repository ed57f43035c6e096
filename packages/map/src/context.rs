//! The map's current selection and view.

use std::str::FromStr;

use epi_map_alert_models::{Disease, EpiWeekRange};
use epi_map_geography_models::BoundingBox;
use epi_map_region_models::{Region, SanitationMetric, UfCode};

/// Zoom level at which municipality detail appears.
pub const MUNICIPALITY_ZOOM_THRESHOLD: f64 = 6.0;

/// Zoom level of a freshly opened map.
pub const INITIAL_ZOOM: f64 = 4.0;

/// Metric painted on the national overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MapLayer {
    /// Capital alert levels for the selected disease.
    #[default]
    Disease,
    /// Static sanitation coverage.
    Sanitation(SanitationMetric),
}

impl std::fmt::Display for MapLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disease => f.write_str("disease"),
            Self::Sanitation(metric) => write!(f, "{metric}"),
        }
    }
}

/// Error returned for an unrecognized layer name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown map layer {0:?}: expected disease, sewage-collection or sewage-treatment")]
pub struct UnknownLayerError(pub String);

impl FromStr for MapLayer {
    type Err = UnknownLayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("disease") {
            return Ok(Self::Disease);
        }
        SanitationMetric::from_str(s)
            .map(Self::Sanitation)
            .map_err(|_| UnknownLayerError(s.to_string()))
    }
}

/// Everything the layer manager and the state renderer decide from.
///
/// Owned by the municipality layer manager; the state renderer borrows it.
#[derive(Debug, Clone, PartialEq)]
pub struct MapContext {
    /// Active overlay metric.
    pub layer: MapLayer,
    /// Active disease.
    pub disease: Disease,
    /// Active region filter.
    pub region: Region,
    /// Current zoom level.
    pub zoom: f64,
    /// Current visible bounds.
    pub viewport: BoundingBox,
    /// Weeks queried for "latest alert" data.
    pub window: EpiWeekRange,
}

impl MapContext {
    /// A national view at the initial zoom.
    #[must_use]
    pub fn new(window: EpiWeekRange) -> Self {
        Self {
            layer: MapLayer::default(),
            disease: Disease::default(),
            region: Region::All,
            zoom: INITIAL_ZOOM,
            viewport: Region::All.bounds(),
            window,
        }
    }

    /// Whether municipality detail should be shown.
    #[must_use]
    pub fn is_zoomed_in(&self) -> bool {
        self.zoom >= MUNICIPALITY_ZOOM_THRESHOLD
    }

    /// Whether the region filter excludes `uf`.
    #[must_use]
    pub fn is_dimmed(&self, uf: UfCode) -> bool {
        !self.region.contains(uf)
    }
}
