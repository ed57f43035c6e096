//! Boundaries between the map engine and its host.
//!
//! [`MapSurface`] is whatever actually draws polygons (a vector-map
//! widget, a `GeoJSON` writer, a test recorder). [`MapListener`] receives
//! selection notifications for the surrounding UI.

use std::sync::Arc;

use epi_map_alert_models::Disease;
use epi_map_geography_models::BoundingBox;
use epi_map_region_models::{MunicipalityCode, Region, UfCode};
use epi_map_style::FeatureStyle;
use geo::MultiPolygon;

use crate::context::MapLayer;

/// Identifies one drawn polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureRef {
    /// A state on the national overlay.
    State(UfCode),
    /// A municipality inside an expanded state.
    Municipality {
        /// Owning state.
        uf: UfCode,
        /// Municipality geocode.
        code: MunicipalityCode,
    },
}

/// A polygon ready to draw.
#[derive(Debug, Clone)]
pub struct StyledFeature {
    /// What the polygon is.
    pub target: FeatureRef,
    /// Display name for tooltips.
    pub name: String,
    /// Geometry, shared with the cached mesh.
    pub geometry: Arc<MultiPolygon<f64>>,
    /// Paint.
    pub style: FeatureStyle,
}

/// Draws and restyles map polygons.
pub trait MapSurface {
    /// Replaces the national overlay.
    fn draw_state_layer(&mut self, features: Vec<StyledFeature>);

    /// Adds the municipality overlay of one state.
    fn draw_municipality_layer(&mut self, uf: UfCode, features: Vec<StyledFeature>);

    /// Removes the municipality overlay of one state.
    fn remove_municipality_layer(&mut self, uf: UfCode);

    /// Changes the paint of one polygon, optionally raising it above its
    /// siblings.
    fn restyle(&mut self, target: FeatureRef, style: FeatureStyle, bring_to_front: bool);

    /// Frames the view on `bounds`.
    fn fit_bounds(&mut self, bounds: BoundingBox);

    /// Shows or hides the loading indicator.
    fn show_loading(&mut self, loading: bool);

    /// Replaces the loading indicator with an error message.
    fn show_error(&mut self, message: &str);
}

/// Selection notifications. Every method defaults to doing nothing.
pub trait MapListener {
    /// A state polygon was clicked.
    fn on_unit_click(&mut self, _uf: UfCode, _abbr: &str, _name: &str) {}

    /// The overlay metric changed.
    fn on_layer_change(&mut self, _layer: MapLayer) {}

    /// The selected disease changed.
    fn on_disease_change(&mut self, _disease: Disease) {}

    /// The region filter changed.
    fn on_region_change(&mut self, _region: Region) {}
}

/// A [`MapListener`] that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullListener;

impl MapListener for NullListener {}
