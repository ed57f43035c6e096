//! A [`MapSurface`] that collects drawn polygons into `GeoJSON`.

use std::collections::BTreeMap;

use epi_map_geography_models::BoundingBox;
use epi_map_map::{FeatureRef, MapSurface, StyledFeature};
use epi_map_region_models::UfCode;
use epi_map_style::FeatureStyle;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

/// Keeps whatever is currently drawn, in draw order.
#[derive(Debug, Default)]
pub struct GeoJsonSurface {
    states: Vec<StyledFeature>,
    municipalities: BTreeMap<UfCode, Vec<StyledFeature>>,
    bounds: Option<BoundingBox>,
    error: Option<String>,
}

impl GeoJsonSurface {
    /// Message of the last error state, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Last framed bounds.
    #[must_use]
    pub const fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    /// States first, then municipality layers by UF.
    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .states
            .iter()
            .chain(self.municipalities.values().flatten())
            .map(to_feature)
            .collect();

        FeatureCollection {
            bbox: self
                .bounds
                .map(|b| vec![b.west, b.south, b.east, b.north]),
            features,
            foreign_members: None,
        }
    }

    fn find_mut(&mut self, target: FeatureRef) -> Option<&mut StyledFeature> {
        let layer = match target {
            FeatureRef::State(_) => &mut self.states,
            FeatureRef::Municipality { uf, .. } => self.municipalities.get_mut(&uf)?,
        };
        layer.iter_mut().find(|f| f.target == target)
    }
}

impl MapSurface for GeoJsonSurface {
    fn draw_state_layer(&mut self, features: Vec<StyledFeature>) {
        self.states = features;
    }

    fn draw_municipality_layer(&mut self, uf: UfCode, features: Vec<StyledFeature>) {
        self.municipalities.insert(uf, features);
    }

    fn remove_municipality_layer(&mut self, uf: UfCode) {
        self.municipalities.remove(&uf);
    }

    fn restyle(&mut self, target: FeatureRef, style: FeatureStyle, _bring_to_front: bool) {
        if let Some(feature) = self.find_mut(target) {
            feature.style = style;
        }
    }

    fn fit_bounds(&mut self, bounds: BoundingBox) {
        self.bounds = Some(bounds);
    }

    fn show_loading(&mut self, loading: bool) {
        log::debug!("Loading: {loading}");
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }
}

fn to_feature(feature: &StyledFeature) -> Feature {
    let mut properties = JsonObject::new();

    match feature.target {
        FeatureRef::State(uf) => {
            properties.insert("layer".into(), "state".into());
            properties.insert("code".into(), u32::from(uf).into());
            properties.insert("uf".into(), uf.abbr().into());
        }
        FeatureRef::Municipality { uf, code } => {
            properties.insert("layer".into(), "municipality".into());
            properties.insert("code".into(), code.0.into());
            properties.insert("uf".into(), uf.abbr().into());
        }
    }
    properties.insert("name".into(), JsonValue::from(feature.name.as_str()));

    let style = feature.style;
    properties.insert("fillColor".into(), style.fill_color.into());
    properties.insert("fillOpacity".into(), style.fill_opacity.into());
    properties.insert("strokeColor".into(), style.stroke_color.into());
    properties.insert("strokeWeight".into(), style.stroke_weight.into());

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(feature.geometry.as_ref()))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
