//! Fakes shared by this crate's tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use epi_map_alert_models::{AlertRecord, Disease, EpiWeek, EpiWeekRange};
use epi_map_geography_models::{BoundaryFeature, BoundingBox};
use epi_map_region_models::{MunicipalityCode, Region, UfCode, localities};
use epi_map_source::{
    AlertQuery, BulkAlerts, DataService, MunicipalityEntry, SourceError, StateEntry, Upstream,
};
use epi_map_style::FeatureStyle;
use geo::{MultiPolygon, Rect};

use crate::context::{MapContext, MapLayer};
use crate::surface::{FeatureRef, MapListener, MapSurface, StyledFeature};

/// State boxes served as the national mesh.
const STATE_BOXES: &[(u32, [f64; 4])] = &[
    (35, [-53.1, -25.3, -44.2, -19.8]), // SP
    (33, [-44.9, -23.4, -40.9, -20.8]), // RJ
    (16, [-54.9, -1.2, -49.8, 4.5]),    // AP, no curated list
    (13, [-73.8, -9.8, -56.1, 2.2]),    // AM
];

pub fn uf(code: u32) -> UfCode {
    UfCode::from_code(code).unwrap()
}

pub fn window() -> EpiWeekRange {
    EpiWeekRange::new(
        EpiWeek::from_encoded(202_401).unwrap(),
        EpiWeek::from_encoded(202_410).unwrap(),
    )
    .unwrap()
}

pub fn context() -> MapContext {
    MapContext::new(window())
}

fn square(code: u32, [west, south, east, north]: [f64; 4]) -> BoundaryFeature {
    let rect = Rect::new((west, south), (east, north));
    BoundaryFeature::new(code, MultiPolygon(vec![rect.to_polygon()]))
}

fn state_box(uf: UfCode) -> [f64; 4] {
    STATE_BOXES
        .iter()
        .find(|(code, _)| *code == u32::from(uf))
        .map(|(_, b)| *b)
        .unwrap()
}

/// A small viewport in the middle of `uf` that touches no other state.
pub fn viewport_over(uf: UfCode) -> BoundingBox {
    let [west, south, east, north] = state_box(uf);
    let (x, y) = (f64::midpoint(west, east), f64::midpoint(south, north));
    BoundingBox::new(x - 0.25, y - 0.25, x + 0.25, y + 0.25)
}

pub fn service(upstream: &Arc<ScriptedUpstream>) -> Arc<DataService> {
    Arc::new(DataService::new(Arc::clone(upstream) as Arc<dyn Upstream>))
}

/// Upstream with canned data, call counters and switchable failures.
#[derive(Default)]
pub struct ScriptedUpstream {
    national_calls: AtomicUsize,
    geometry_calls: Mutex<BTreeMap<UfCode, usize>>,
    bulk_calls: Mutex<Vec<(Disease, Option<UfCode>)>>,
    failing_geometry: Mutex<BTreeSet<UfCode>>,
    fail_national: AtomicBool,
    fail_alerts: AtomicBool,
    fail_directory: AtomicBool,
}

impl ScriptedUpstream {
    /// Alert level every municipality reports for `disease`.
    pub const fn level_for(disease: Disease) -> i64 {
        match disease {
            Disease::Dengue => 4,
            Disease::Chikungunya => 3,
            Disease::Zika => 2,
        }
    }

    /// A municipality present in the mesh of `uf` but not curated.
    pub fn uncurated_code(uf: UfCode) -> MunicipalityCode {
        MunicipalityCode(u32::from(uf) * 100_000 + 99_999)
    }

    pub fn uncurated_target(uf: UfCode) -> FeatureRef {
        FeatureRef::Municipality {
            uf,
            code: Self::uncurated_code(uf),
        }
    }

    /// The national mesh, plus a malformed MG and a non-UF feature.
    pub fn national_features(&self) -> Vec<BoundaryFeature> {
        let mut features: Vec<BoundaryFeature> = STATE_BOXES
            .iter()
            .map(|(code, b)| square(*code, *b))
            .collect();
        features.push(BoundaryFeature::malformed(31));
        features.push(square(99, [-60.0, -10.0, -50.0, 0.0]));
        features
    }

    pub fn fail_geometry(&self, uf: UfCode, fail: bool) {
        let mut failing = self.failing_geometry.lock().unwrap();
        if fail {
            failing.insert(uf);
        } else {
            failing.remove(&uf);
        }
    }

    pub fn fail_national(&self, fail: bool) {
        self.fail_national.store(fail, Ordering::SeqCst);
    }

    pub fn fail_alerts(&self, fail: bool) {
        self.fail_alerts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_directory(&self, fail: bool) {
        self.fail_directory.store(fail, Ordering::SeqCst);
    }

    pub fn national_calls(&self) -> usize {
        self.national_calls.load(Ordering::SeqCst)
    }

    pub fn geometry_calls(&self, uf: UfCode) -> usize {
        self.geometry_calls
            .lock()
            .unwrap()
            .get(&uf)
            .copied()
            .unwrap_or(0)
    }

    pub fn unit_bulk_calls(&self, uf: UfCode) -> usize {
        self.bulk_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, target)| *target == Some(uf))
            .count()
    }

    pub fn unit_bulk_calls_for(&self, uf: UfCode, disease: Disease) -> usize {
        self.bulk_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == (disease, Some(uf)))
            .count()
    }

    fn record(disease: Disease) -> AlertRecord {
        AlertRecord {
            week: EpiWeek::from_encoded(202_410).unwrap(),
            cases: 42,
            rt: Some(1.1),
            incidence_100k: Some(12.5),
            cumulative_year_notifications: Some(400),
            level: Self::level_for(disease),
        }
    }

    fn unavailable(what: &str) -> SourceError {
        SourceError::Status {
            status: 503,
            url: format!("scripted://{what}"),
        }
    }
}

#[async_trait]
impl Upstream for ScriptedUpstream {
    async fn states(&self) -> Result<Vec<StateEntry>, SourceError> {
        if self.fail_directory.load(Ordering::SeqCst) {
            return Err(Self::unavailable("estados"));
        }
        Ok(STATE_BOXES
            .iter()
            .map(|(code, _)| {
                let unit = uf(*code);
                StateEntry {
                    uf: unit,
                    abbr: unit.abbr().to_string(),
                    name: unit.name().to_string(),
                }
            })
            .collect())
    }

    async fn municipalities(&self, uf: UfCode) -> Result<Vec<MunicipalityEntry>, SourceError> {
        Ok(localities::representative_municipalities(uf)
            .unwrap_or_default()
            .iter()
            .map(|l| MunicipalityEntry {
                code: l.code,
                name: l.name.clone(),
            })
            .collect())
    }

    async fn all_municipalities(&self) -> Result<Vec<MunicipalityEntry>, SourceError> {
        let mut all = Vec::new();
        for (code, _) in STATE_BOXES {
            all.extend(self.municipalities(uf(*code)).await?);
        }
        Ok(all)
    }

    async fn national_geometry(&self) -> Result<Vec<BoundaryFeature>, SourceError> {
        self.national_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_national.load(Ordering::SeqCst) {
            return Err(Self::unavailable("malhas/paises/BR"));
        }
        Ok(self.national_features())
    }

    async fn unit_geometry(&self, uf: UfCode) -> Result<Vec<BoundaryFeature>, SourceError> {
        *self.geometry_calls.lock().unwrap().entry(uf).or_default() += 1;
        if self.failing_geometry.lock().unwrap().contains(&uf) {
            return Err(Self::unavailable("malhas/estados"));
        }

        let [west, south, _, _] = state_box(uf);
        let mut codes: Vec<MunicipalityCode> = localities::representative_municipalities(uf)
            .unwrap_or_default()
            .iter()
            .map(|l| l.code)
            .collect();
        codes.push(Self::uncurated_code(uf));

        Ok(codes
            .into_iter()
            .zip(0_u32..)
            .map(|(code, i)| {
                let x = f64::from(i).mul_add(0.2, west);
                square(code.0, [x, south, x + 0.1, south + 0.1])
            })
            .collect())
    }

    async fn alert_series(&self, query: &AlertQuery) -> Result<Vec<AlertRecord>, SourceError> {
        if self.fail_alerts.load(Ordering::SeqCst) {
            return Err(Self::unavailable("alertcity"));
        }
        Ok(vec![Self::record(query.disease)])
    }

    async fn latest_alerts(
        &self,
        disease: Disease,
        geocodes: &[MunicipalityCode],
        _range: EpiWeekRange,
    ) -> Result<BulkAlerts, SourceError> {
        let units: BTreeSet<Option<UfCode>> = geocodes.iter().map(|g| g.uf()).collect();
        let target = if units.len() == 1 {
            units.into_iter().next().flatten()
        } else {
            None
        };
        self.bulk_calls.lock().unwrap().push((disease, target));

        if self.fail_alerts.load(Ordering::SeqCst) {
            return Err(Self::unavailable("alertcity"));
        }
        Ok(BulkAlerts {
            latest: geocodes
                .iter()
                .map(|g| (*g, Self::record(disease)))
                .collect(),
            failed: Vec::new(),
        })
    }
}

/// Surface that records every call.
#[derive(Default)]
pub struct RecordingSurface {
    pub state_layer: Vec<StyledFeature>,
    pub state_draws: usize,
    pub municipality_layers: BTreeMap<UfCode, Vec<StyledFeature>>,
    pub removed: Vec<UfCode>,
    pub restyles: Vec<(FeatureRef, FeatureStyle, bool)>,
    pub fitted: Vec<BoundingBox>,
    pub loading: bool,
    pub errors: Vec<String>,
}

impl RecordingSurface {
    pub fn state_style(&self, uf: UfCode) -> FeatureStyle {
        self.state_layer
            .iter()
            .find(|f| f.target == FeatureRef::State(uf))
            .map(|f| f.style)
            .unwrap()
    }
}

impl MapSurface for RecordingSurface {
    fn draw_state_layer(&mut self, features: Vec<StyledFeature>) {
        self.state_layer = features;
        self.state_draws += 1;
    }

    fn draw_municipality_layer(&mut self, uf: UfCode, features: Vec<StyledFeature>) {
        assert!(
            self.municipality_layers.insert(uf, features).is_none(),
            "second layer drawn for {uf}"
        );
    }

    fn remove_municipality_layer(&mut self, uf: UfCode) {
        self.municipality_layers.remove(&uf);
        self.removed.push(uf);
    }

    fn restyle(&mut self, target: FeatureRef, style: FeatureStyle, bring_to_front: bool) {
        self.restyles.push((target, style, bring_to_front));
    }

    fn fit_bounds(&mut self, bounds: BoundingBox) {
        self.fitted.push(bounds);
    }

    fn show_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn show_error(&mut self, message: &str) {
        self.loading = false;
        self.errors.push(message.to_string());
    }
}

/// Listener that records every notification.
#[derive(Default)]
pub struct RecordingListener {
    pub clicks: Vec<(UfCode, String, String)>,
    pub layers: Vec<MapLayer>,
    pub diseases: Vec<Disease>,
    pub regions: Vec<Region>,
}

impl MapListener for RecordingListener {
    fn on_unit_click(&mut self, uf: UfCode, abbr: &str, name: &str) {
        self.clicks.push((uf, abbr.to_string(), name.to_string()));
    }

    fn on_layer_change(&mut self, layer: MapLayer) {
        self.layers.push(layer);
    }

    fn on_disease_change(&mut self, disease: Disease) {
        self.diseases.push(disease);
    }

    fn on_region_change(&mut self, region: Region) {
        self.regions.push(region);
    }
}
