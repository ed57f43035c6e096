//! National state overlay.

use std::sync::Arc;

use epi_map_geography_models::BoundaryFeature;
use epi_map_region_models::{UfCode, sanitation::sanitation};
use epi_map_source::service::CapitalSummary;
use epi_map_style::{FeatureStyle, StateFill, hover_style, state_style};

use crate::context::{MapContext, MapLayer};
use crate::surface::{FeatureRef, MapListener, MapSurface, StyledFeature};

/// Builds and restyles the one-polygon-per-state overlay.
pub struct StateLayerRenderer {
    features: Arc<Vec<BoundaryFeature>>,
    capitals: Option<Arc<CapitalSummary>>,
}

impl StateLayerRenderer {
    /// A renderer over the national mesh, with no capital data yet.
    #[must_use]
    pub const fn new(features: Arc<Vec<BoundaryFeature>>) -> Self {
        Self {
            features,
            capitals: None,
        }
    }

    /// Replaces the capital dataset used by the disease layer. `None`
    /// paints every state as having no data.
    pub fn set_capital_summary(&mut self, capitals: Option<Arc<CapitalSummary>>) {
        self.capitals = capitals;
    }

    /// What a state is filled from under `context`.
    #[must_use]
    pub fn fill(&self, uf: UfCode, context: &MapContext) -> StateFill {
        match context.layer {
            MapLayer::Disease => StateFill::Alert(
                self.capitals
                    .as_ref()
                    .and_then(|capitals| capitals.get(&uf))
                    .map(|record| record.level),
            ),
            MapLayer::Sanitation(metric) => {
                StateFill::Sanitation(sanitation(uf).map(|s| s.percent(metric)))
            }
        }
    }

    /// Style of a state when not hovered.
    #[must_use]
    pub fn base_style(&self, uf: UfCode, context: &MapContext) -> FeatureStyle {
        state_style(
            self.fill(uf, context),
            context.is_dimmed(uf),
            context.is_zoomed_in(),
        )
    }

    /// Redraws the whole overlay. Features with unusable geometry or a
    /// code outside the UF enumeration are left out.
    pub fn render(&self, context: &MapContext, surface: &mut impl MapSurface) {
        let features: Vec<StyledFeature> = self
            .features
            .iter()
            .filter_map(|feature| {
                let uf = UfCode::from_code(feature.code)?;
                let geometry = Arc::clone(feature.geometry.as_ref()?);
                Some(StyledFeature {
                    target: FeatureRef::State(uf),
                    name: uf.name().to_string(),
                    geometry,
                    style: self.base_style(uf, context),
                })
            })
            .collect();

        log::debug!(
            "Rendering {} states (layer {}, region {})",
            features.len(),
            context.layer,
            context.region
        );
        surface.draw_state_layer(features);
    }

    /// Applies or clears the hover highlight on a state.
    pub fn hover(
        &self,
        uf: UfCode,
        entering: bool,
        context: &MapContext,
        surface: &mut impl MapSurface,
    ) {
        let base = self.base_style(uf, context);
        if entering {
            surface.restyle(FeatureRef::State(uf), hover_style(base), true);
        } else {
            surface.restyle(FeatureRef::State(uf), base, false);
        }
    }

    /// Reports a click on a drawn state to the listener.
    pub fn click(&self, uf: UfCode, listener: &mut impl MapListener) {
        if self.features.iter().any(|f| f.code == u32::from(uf)) {
            listener.on_unit_click(uf, uf.abbr(), uf.name());
        }
    }
}
