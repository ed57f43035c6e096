//! Per-state municipality overlays.
//!
//! Every state is in one of three phases: absent, loading (an entry in
//! the loading set) or loaded (a [`MunicipalityLayer`]). A state starts
//! loading when it is visible, the map is zoomed in past
//! [`MUNICIPALITY_ZOOM_THRESHOLD`](crate::context::MUNICIPALITY_ZOOM_THRESHOLD)
//! and it has a curated municipality list. Its mesh and the latest alerts
//! of its curated municipalities are then fetched together.
//!
//! Fetches are never cancelled. Each one carries the [`LoadTicket`] it was
//! issued with, and its result is only applied if the loading set still
//! holds that exact ticket when it completes. Zooming out or switching
//! disease drops the loading set, so results of fetches issued before
//! either are discarded on arrival.

use std::collections::BTreeMap;
use std::sync::Arc;

use epi_map_alert_models::{AlertRecord, Disease};
use epi_map_geography_models::{BoundaryFeature, BoundingBox};
use epi_map_region_models::{MunicipalityCode, Region, UfCode, localities};
use epi_map_source::{DataService, LatestAlerts, SourceError};
use epi_map_spatial::ViewportResolver;
use epi_map_style::{FeatureStyle, hover_style, municipality_style};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt as _};
use futures::FutureExt as _;

use crate::context::{MapContext, MapLayer};
use crate::surface::{FeatureRef, MapSurface, StyledFeature};

/// Identifies one issued load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    /// Unique per manager.
    pub id: u64,
    /// Disease active when the load was issued.
    pub disease: Disease,
}

/// A loaded municipality overlay and its alert snapshot.
#[derive(Debug, Clone)]
pub struct MunicipalityLayer {
    uf: UfCode,
    features: Arc<Vec<BoundaryFeature>>,
    alerts: Arc<LatestAlerts>,
    disease: Disease,
}

impl MunicipalityLayer {
    /// State this layer belongs to.
    #[must_use]
    pub const fn uf(&self) -> UfCode {
        self.uf
    }

    /// Disease the alert snapshot is for.
    #[must_use]
    pub const fn disease(&self) -> Disease {
        self.disease
    }

    /// Latest alert of a municipality in this layer.
    #[must_use]
    pub fn alert(&self, code: MunicipalityCode) -> Option<&AlertRecord> {
        self.alerts.get(&code)
    }

    /// Number of municipalities with an alert record.
    #[must_use]
    pub fn alerts_len(&self) -> usize {
        self.alerts.len()
    }

    /// Style of a municipality when not hovered.
    #[must_use]
    pub fn base_style(&self, code: MunicipalityCode) -> FeatureStyle {
        municipality_style(self.alert(code))
    }

    fn styled_features(&self) -> Vec<StyledFeature> {
        let curated = localities::representative_municipalities(self.uf).unwrap_or_default();

        self.features
            .iter()
            .filter_map(|feature| {
                let geometry = Arc::clone(feature.geometry.as_ref()?);
                let code = MunicipalityCode(feature.code);
                let name = curated
                    .iter()
                    .find(|l| l.code == code)
                    .map_or_else(|| code.to_string(), |l| l.name.clone());
                Some(StyledFeature {
                    target: FeatureRef::Municipality { uf: self.uf, code },
                    name,
                    geometry,
                    style: self.base_style(code),
                })
            })
            .collect()
    }
}

/// A finished fetch, before it is checked against the loading set.
pub struct LoadOutcome {
    uf: UfCode,
    ticket: LoadTicket,
    result: Result<(Arc<Vec<BoundaryFeature>>, Arc<LatestAlerts>), SourceError>,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadReport {
    /// The layer was built and drawn.
    Loaded(UfCode),
    /// The fetch failed; the state is absent again.
    Failed(UfCode),
    /// The fetch was superseded and its result dropped.
    Discarded(UfCode),
}

/// Result of a viewport change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewportUpdate {
    /// States that started loading.
    pub started: Vec<UfCode>,
    /// Whether the zoom moved across the municipality threshold.
    pub crossed_threshold: bool,
}

/// Owns the map context, the loading set and the loaded layers.
pub struct MunicipalityLayerManager {
    service: Arc<DataService>,
    context: MapContext,
    resolver: Option<ViewportResolver>,
    layers: BTreeMap<UfCode, MunicipalityLayer>,
    loading: BTreeMap<UfCode, LoadTicket>,
    pending: FuturesUnordered<BoxFuture<'static, LoadOutcome>>,
    next_ticket: u64,
}

impl MunicipalityLayerManager {
    /// A manager with nothing loaded.
    #[must_use]
    pub fn new(service: Arc<DataService>, context: MapContext) -> Self {
        Self {
            service,
            context,
            resolver: None,
            layers: BTreeMap::new(),
            loading: BTreeMap::new(),
            pending: FuturesUnordered::new(),
            next_ticket: 0,
        }
    }

    /// Current map context.
    #[must_use]
    pub const fn context(&self) -> &MapContext {
        &self.context
    }

    /// Installs the state index built from the national mesh. Until this
    /// is called no state is considered visible.
    pub fn set_resolver(&mut self, resolver: ViewportResolver) {
        self.resolver = Some(resolver);
    }

    /// Loaded layer of `uf`.
    #[must_use]
    pub fn layer(&self, uf: UfCode) -> Option<&MunicipalityLayer> {
        self.layers.get(&uf)
    }

    /// States with a loaded layer.
    pub fn loaded(&self) -> impl Iterator<Item = UfCode> + '_ {
        self.layers.keys().copied()
    }

    /// States currently loading, with their tickets.
    pub fn loading(&self) -> impl Iterator<Item = (UfCode, LoadTicket)> + '_ {
        self.loading.iter().map(|(uf, ticket)| (*uf, *ticket))
    }

    /// Whether `uf` is loading.
    #[must_use]
    pub fn is_loading(&self, uf: UfCode) -> bool {
        self.loading.contains_key(&uf)
    }

    /// Whether any fetch (current or superseded) has yet to complete.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Changes the overlay metric.
    pub const fn set_layer(&mut self, layer: MapLayer) {
        self.context.layer = layer;
    }

    /// Changes the region filter.
    pub const fn set_region(&mut self, region: Region) {
        self.context.region = region;
    }

    /// Records a new view and re-evaluates which states to load.
    ///
    /// Dropping below the threshold tears every layer down and abandons
    /// in-flight loads.
    pub fn on_viewport_change(
        &mut self,
        zoom: f64,
        viewport: BoundingBox,
        surface: &mut impl MapSurface,
    ) -> ViewportUpdate {
        let was_zoomed_in = self.context.is_zoomed_in();
        self.context.zoom = zoom;
        self.context.viewport = viewport;
        let zoomed_in = self.context.is_zoomed_in();

        if was_zoomed_in && !zoomed_in {
            log::debug!("Zoomed out to {zoom}: removing municipality layers");
            self.teardown(surface);
        }

        ViewportUpdate {
            started: self.evaluate(),
            crossed_threshold: was_zoomed_in != zoomed_in,
        }
    }

    /// Switches disease. Every layer is removed, cached municipality alert
    /// snapshots are invalidated, in-flight loads are abandoned, and
    /// visible states reload for the new disease if the map is still
    /// zoomed in.
    ///
    /// Returns the states that started loading, or `None` if `disease`
    /// was already selected.
    pub fn set_disease(
        &mut self,
        disease: Disease,
        surface: &mut impl MapSurface,
    ) -> Option<Vec<UfCode>> {
        if self.context.disease == disease {
            return None;
        }
        log::info!("Disease changed {} -> {disease}", self.context.disease);
        self.context.disease = disease;
        self.teardown(surface);
        self.service.invalidate_unit_alerts();
        Some(self.evaluate())
    }

    /// Starts loading every eligible state. Returns the states started.
    ///
    /// Calling this again without a change in view or disease starts
    /// nothing.
    pub fn evaluate(&mut self) -> Vec<UfCode> {
        if !self.context.is_zoomed_in() {
            return Vec::new();
        }
        let Some(resolver) = &self.resolver else {
            return Vec::new();
        };

        let candidates: Vec<UfCode> = resolver
            .visible_units(&self.context.viewport)
            .into_iter()
            .filter(|uf| !self.layers.contains_key(uf) && !self.loading.contains_key(uf))
            .filter(|uf| localities::representative_municipalities(*uf).is_some())
            .collect();

        for uf in &candidates {
            self.start_load(*uf);
        }
        candidates
    }

    fn start_load(&mut self, uf: UfCode) {
        self.next_ticket += 1;
        let ticket = LoadTicket {
            id: self.next_ticket,
            disease: self.context.disease,
        };
        self.loading.insert(uf, ticket);
        log::debug!("Loading municipalities of {} (ticket {})", uf.abbr(), ticket.id);

        let service = Arc::clone(&self.service);
        let window = self.context.window;
        let fetch = async move {
            let geometry = service.unit_geometry(uf);
            let alerts = service.unit_latest_alerts(ticket.disease, uf, window);
            futures::future::try_join(geometry, alerts).await
        };

        self.pending.push(
            fetch
                .map(move |result| LoadOutcome { uf, ticket, result })
                .boxed(),
        );
    }

    /// Waits for the next fetch to finish and applies it.
    ///
    /// Returns `None` when nothing is pending.
    pub async fn next_completion(&mut self, surface: &mut impl MapSurface) -> Option<LoadReport> {
        let outcome = self.pending.next().await?;
        Some(self.apply(outcome, surface))
    }

    fn apply(&mut self, outcome: LoadOutcome, surface: &mut impl MapSurface) -> LoadReport {
        let LoadOutcome { uf, ticket, result } = outcome;

        let current = self.loading.get(&uf) == Some(&ticket)
            && ticket.disease == self.context.disease
            && self.context.is_zoomed_in();
        if !current {
            log::debug!(
                "Discarding stale load of {} (ticket {}, {})",
                uf.abbr(),
                ticket.id,
                ticket.disease
            );
            return LoadReport::Discarded(uf);
        }
        self.loading.remove(&uf);

        match result {
            Ok((features, alerts)) => {
                let layer = MunicipalityLayer {
                    uf,
                    features,
                    alerts,
                    disease: ticket.disease,
                };
                log::info!(
                    "Loaded {} municipalities of {} ({} with alerts)",
                    layer.features.len(),
                    uf.abbr(),
                    layer.alerts_len()
                );
                surface.draw_municipality_layer(uf, layer.styled_features());
                self.layers.insert(uf, layer);
                LoadReport::Loaded(uf)
            }
            Err(e) => {
                log::warn!("Failed to load municipalities of {}: {e}", uf.abbr());
                LoadReport::Failed(uf)
            }
        }
    }

    /// Applies or clears the hover highlight on a municipality.
    pub fn hover(
        &self,
        uf: UfCode,
        code: MunicipalityCode,
        entering: bool,
        surface: &mut impl MapSurface,
    ) {
        let Some(layer) = self.layers.get(&uf) else {
            return;
        };
        let base = layer.base_style(code);
        let target = FeatureRef::Municipality { uf, code };
        if entering {
            surface.restyle(target, hover_style(base), true);
        } else {
            surface.restyle(target, base, false);
        }
    }

    fn teardown(&mut self, surface: &mut impl MapSurface) {
        for uf in std::mem::take(&mut self.layers).into_keys() {
            surface.remove_municipality_layer(uf);
        }
        if !self.loading.is_empty() {
            log::debug!("Abandoning {} in-flight loads", self.loading.len());
            self.loading.clear();
        }
    }
}
