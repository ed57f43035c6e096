//! Event entry point tying the overlays to a surface.

use std::sync::Arc;

use epi_map_alert_models::{Disease, EpiWeekRange};
use epi_map_geography_models::BoundingBox;
use epi_map_region_models::{Region, UfCode};
use epi_map_source::DataService;
use epi_map_source::search::LocalityMatch;
use epi_map_spatial::ViewportResolver;

use crate::MapError;
use crate::context::{MapContext, MapLayer};
use crate::events::{FeatureEvent, MapAction, action_for};
use crate::municipality::{LoadReport, MunicipalityLayerManager, ViewportUpdate};
use crate::state::StateLayerRenderer;
use crate::surface::{FeatureRef, MapListener, MapSurface, NullListener};

/// One open map.
///
/// Every UI event goes through a `&mut self` method that finishes before
/// the next event is handled. Municipality fetches started by an event
/// complete later through [`MapSession::next_completion`].
pub struct MapSession<S: MapSurface, L: MapListener = NullListener> {
    service: Arc<DataService>,
    manager: MunicipalityLayerManager,
    states: Option<StateLayerRenderer>,
    surface: S,
    listener: L,
}

impl<S: MapSurface> MapSession<S> {
    /// A session that reports selections nowhere.
    #[must_use]
    pub fn new(service: Arc<DataService>, window: EpiWeekRange, surface: S) -> Self {
        Self::with_listener(service, window, surface, NullListener)
    }
}

impl<S: MapSurface, L: MapListener> MapSession<S, L> {
    /// A national view at the initial zoom. Nothing is drawn until
    /// [`load`](Self::load).
    #[must_use]
    pub fn with_listener(
        service: Arc<DataService>,
        window: EpiWeekRange,
        surface: S,
        listener: L,
    ) -> Self {
        let manager = MunicipalityLayerManager::new(Arc::clone(&service), MapContext::new(window));
        Self {
            service,
            manager,
            states: None,
            surface,
            listener,
        }
    }

    /// Loads the national mesh and the capital summary, draws the state
    /// overlay and frames the active region.
    ///
    /// # Errors
    ///
    /// * [`MapError::NationalLoad`] if the mesh cannot be fetched
    /// * [`MapError::CapitalSummary`] if no capital alert can be fetched
    ///
    /// Either way the surface is switched to its error state.
    pub async fn load(&mut self) -> Result<(), MapError> {
        self.surface.show_loading(true);

        let features = match self.service.national_geometry().await {
            Ok(features) => features,
            Err(e) => {
                log::error!("National mesh unavailable: {e}");
                self.surface.show_error("Could not load the map of Brazil.");
                return Err(MapError::NationalLoad(e));
            }
        };

        let MapContext {
            disease, window, ..
        } = *self.manager.context();
        let capitals = match self.service.capital_summary(disease, window).await {
            Ok(capitals) => capitals,
            Err(e) => {
                log::error!("Capital alerts unavailable for {disease}: {e}");
                self.surface.show_error("Could not load alert data.");
                return Err(MapError::CapitalSummary(e));
            }
        };

        let resolver = ViewportResolver::new(&features);
        log::info!("Loaded national mesh with {} units", resolver.len());
        self.manager.set_resolver(resolver);

        let mut states = StateLayerRenderer::new(features);
        states.set_capital_summary(Some(capitals));
        self.states = Some(states);
        self.render_states();

        self.surface.show_loading(false);
        self.surface.fit_bounds(self.manager.context().region.bounds());
        self.manager.evaluate();
        Ok(())
    }

    fn render_states(&mut self) {
        if let Some(states) = &self.states {
            states.render(self.manager.context(), &mut self.surface);
        }
    }

    /// Switches the overlay metric.
    pub fn set_layer(&mut self, layer: MapLayer) {
        if self.manager.context().layer == layer {
            return;
        }
        self.manager.set_layer(layer);
        self.render_states();
        self.listener.on_layer_change(layer);
    }

    /// Switches disease: municipality layers are rebuilt for the new
    /// disease and the state overlay is repainted from refreshed capital
    /// alerts. If those cannot be fetched every state shows no data.
    ///
    /// Returns the states that started loading.
    pub async fn set_disease(&mut self, disease: Disease) -> Vec<UfCode> {
        let Some(started) = self.manager.set_disease(disease, &mut self.surface) else {
            return Vec::new();
        };

        let window = self.manager.context().window;
        let capitals = match self.service.capital_summary(disease, window).await {
            Ok(capitals) => Some(capitals),
            Err(e) => {
                log::warn!("Capital alerts unavailable for {disease}: {e}");
                None
            }
        };
        if let Some(states) = &mut self.states {
            states.set_capital_summary(capitals);
        }
        self.render_states();
        self.listener.on_disease_change(disease);
        started
    }

    /// Applies a region filter and frames it.
    pub fn set_region(&mut self, region: Region) {
        self.manager.set_region(region);
        self.surface.fit_bounds(region.bounds());
        self.render_states();
        self.listener.on_region_change(region);
    }

    /// Handles a zoom or pan.
    pub fn on_viewport_change(&mut self, zoom: f64, viewport: BoundingBox) -> ViewportUpdate {
        let update = self
            .manager
            .on_viewport_change(zoom, viewport, &mut self.surface);
        if update.crossed_threshold {
            self.render_states();
        }
        update
    }

    /// Handles a pointer event on a drawn polygon.
    pub fn handle_feature_event(&mut self, event: FeatureEvent, target: FeatureRef) -> MapAction {
        let action = action_for(event, target);
        let entering = action == MapAction::Highlight;

        match (action, target) {
            (MapAction::Highlight | MapAction::RestoreBase, FeatureRef::State(uf)) => {
                if let Some(states) = &self.states {
                    states.hover(uf, entering, self.manager.context(), &mut self.surface);
                }
            }
            (MapAction::Highlight | MapAction::RestoreBase, FeatureRef::Municipality { uf, code }) => {
                self.manager.hover(uf, code, entering, &mut self.surface);
            }
            (MapAction::SelectUnit, FeatureRef::State(uf)) => {
                if let Some(states) = &self.states {
                    states.click(uf, &mut self.listener);
                }
            }
            _ => {}
        }
        action
    }

    /// Waits for the next municipality fetch and applies it.
    pub async fn next_completion(&mut self) -> Option<LoadReport> {
        self.manager.next_completion(&mut self.surface).await
    }

    /// Applies fetches until none is pending.
    pub async fn run_until_idle(&mut self) -> Vec<LoadReport> {
        let mut reports = Vec::new();
        while let Some(report) = self.next_completion().await {
            reports.push(report);
        }
        reports
    }

    /// Looks up states and municipalities by name.
    ///
    /// # Errors
    ///
    /// * [`MapError::SearchIndex`] if the locality directory cannot be
    ///   fetched; the surface is switched to its error state
    pub async fn search(
        &mut self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocalityMatch>, MapError> {
        match self.service.search_index().await {
            Ok(index) => Ok(index.search(query, limit).into_iter().cloned().collect()),
            Err(e) => {
                log::error!("Locality directory unavailable: {e}");
                self.surface.show_error("Could not load the locality list.");
                Err(MapError::SearchIndex(e))
            }
        }
    }

    /// Current selection and viewport.
    #[must_use]
    pub const fn context(&self) -> &MapContext {
        self.manager.context()
    }

    /// Municipality layer state.
    #[must_use]
    pub const fn manager(&self) -> &MunicipalityLayerManager {
        &self.manager
    }

    /// The drawing surface.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// The click listener.
    #[must_use]
    pub const fn listener(&self) -> &L {
        &self.listener
    }

    /// Ends the session, handing back the surface.
    pub fn into_surface(self) -> S {
        self.surface
    }
}
