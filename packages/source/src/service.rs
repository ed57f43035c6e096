//! Cached data access for the map.
//!
//! [`DataService`] answers every query through a [`RequestCache`], so each
//! distinct request reaches the upstream at most once per session. Failed
//! requests and bulk alert fetches with failed geocodes are not stored.
//! Municipality alert snapshots are also dropped on
//! [`DataService::invalidate_unit_alerts`]. Results are shared as [`Arc`]s.

use std::collections::BTreeMap;
use std::sync::Arc;

use epi_map_alert_models::{AlertRecord, Disease, EpiWeekRange, SeriesSummary};
use epi_map_cache::{CacheKey, RequestCache};
use epi_map_geography_models::BoundaryFeature;
use epi_map_region_models::localities;
use epi_map_region_models::{MunicipalityCode, UfCode};

use crate::search::LocalitySearch;
use crate::{
    AlertQuery, LatestAlerts, MunicipalityEntry, SourceError, StateEntry, Upstream,
};

/// Latest alert of each UF's capital.
pub type CapitalSummary = BTreeMap<UfCode, AlertRecord>;

/// Session-scoped, cached view of an [`Upstream`].
pub struct DataService {
    upstream: Arc<dyn Upstream>,
    states: RequestCache<Vec<StateEntry>>,
    municipalities: RequestCache<Vec<MunicipalityEntry>>,
    national_geometry: RequestCache<Vec<BoundaryFeature>>,
    unit_geometry: RequestCache<Vec<BoundaryFeature>>,
    series: RequestCache<Vec<AlertRecord>>,
    latest: RequestCache<LatestAlerts>,
    capitals: RequestCache<CapitalSummary>,
    search: RequestCache<LocalitySearch>,
}

impl DataService {
    /// Wraps `upstream` with empty caches.
    #[must_use]
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self {
            upstream,
            states: RequestCache::new(),
            municipalities: RequestCache::new(),
            national_geometry: RequestCache::new(),
            unit_geometry: RequestCache::new(),
            series: RequestCache::new(),
            latest: RequestCache::new(),
            capitals: RequestCache::new(),
            search: RequestCache::new(),
        }
    }

    /// Every federative unit.
    ///
    /// # Errors
    ///
    /// Returns the upstream error if the directory cannot be fetched.
    pub async fn states(&self) -> Result<Arc<Vec<StateEntry>>, SourceError> {
        let key = CacheKey::new("states", std::iter::empty::<&str>());
        self.states.get_or_fetch(key, || self.upstream.states()).await
    }

    /// Municipalities of one UF.
    ///
    /// # Errors
    ///
    /// Returns the upstream error if the directory cannot be fetched.
    pub async fn municipalities(
        &self,
        uf: UfCode,
    ) -> Result<Arc<Vec<MunicipalityEntry>>, SourceError> {
        let key = CacheKey::new("municipalities", [uf]);
        self.municipalities
            .get_or_fetch(key, || self.upstream.municipalities(uf))
            .await
    }

    /// National mesh, one feature per UF.
    ///
    /// # Errors
    ///
    /// Returns the upstream error if the mesh cannot be fetched or parsed.
    pub async fn national_geometry(&self) -> Result<Arc<Vec<BoundaryFeature>>, SourceError> {
        let key = CacheKey::new("geometry", ["BR"]);
        self.national_geometry
            .get_or_fetch(key, || self.upstream.national_geometry())
            .await
    }

    /// Mesh of one UF, one feature per municipality.
    ///
    /// # Errors
    ///
    /// Returns the upstream error if the mesh cannot be fetched or parsed.
    pub async fn unit_geometry(&self, uf: UfCode) -> Result<Arc<Vec<BoundaryFeature>>, SourceError> {
        let key = CacheKey::new("geometry", [uf]);
        self.unit_geometry
            .get_or_fetch(key, || self.upstream.unit_geometry(uf))
            .await
    }

    /// Weekly series for one municipality, sorted ascending by week.
    ///
    /// # Errors
    ///
    /// Returns the upstream error if the series cannot be fetched.
    pub async fn alert_series(
        &self,
        disease: Disease,
        geocode: MunicipalityCode,
        range: EpiWeekRange,
    ) -> Result<Arc<Vec<AlertRecord>>, SourceError> {
        let query = AlertQuery {
            disease,
            geocode,
            range,
        };
        let key = series_key(&query);
        self.series
            .get_or_fetch(key, || async move { self.upstream.alert_series(&query).await })
            .await
    }

    /// Summary-card figures for one municipality, or `None` when the
    /// range holds no data.
    ///
    /// # Errors
    ///
    /// Returns the upstream error if the series cannot be fetched.
    pub async fn series_summary(
        &self,
        disease: Disease,
        geocode: MunicipalityCode,
        range: EpiWeekRange,
    ) -> Result<Option<SeriesSummary>, SourceError> {
        let series = self.alert_series(disease, geocode, range).await?;
        Ok(SeriesSummary::from_series(&series))
    }

    /// Latest record of each curated municipality of `uf`.
    ///
    /// Units without a curated list get an empty map without touching the
    /// upstream. A result where some municipalities failed is returned
    /// but not cached, so the next call fetches them again.
    ///
    /// # Errors
    ///
    /// Returns the upstream error if every municipality failed.
    pub async fn unit_latest_alerts(
        &self,
        disease: Disease,
        uf: UfCode,
        range: EpiWeekRange,
    ) -> Result<Arc<LatestAlerts>, SourceError> {
        let geocodes: Vec<MunicipalityCode> = localities::representative_municipalities(uf)
            .unwrap_or_default()
            .iter()
            .map(|l| l.code)
            .collect();
        if geocodes.is_empty() {
            return Ok(Arc::new(LatestAlerts::new()));
        }

        let key = CacheKey::new(
            "latest",
            [disease.to_string(), uf.to_string(), range.to_string()],
        );
        if let Some(hit) = self.latest.get(&key) {
            log::debug!("cache hit: {key}");
            return Ok(hit);
        }

        let bulk = self.upstream.latest_alerts(disease, &geocodes, range).await?;
        if bulk.is_complete() {
            return Ok(self.latest.insert(key, bulk.latest));
        }
        log::warn!(
            "Not caching {key}: {}/{} municipalities failed",
            bulk.failed.len(),
            geocodes.len()
        );
        Ok(Arc::new(bulk.latest))
    }

    /// Drops every cached municipality alert snapshot.
    pub fn invalidate_unit_alerts(&self) {
        log::debug!("Invalidating {} municipality alert snapshots", self.latest.len());
        self.latest.clear();
    }

    /// Latest record of every UF capital, keyed by UF.
    ///
    /// Capitals without data are absent. As with
    /// [`unit_latest_alerts`](Self::unit_latest_alerts), a summary with
    /// failed capitals is returned but not cached.
    ///
    /// # Errors
    ///
    /// Returns the upstream error if every capital failed.
    pub async fn capital_summary(
        &self,
        disease: Disease,
        range: EpiWeekRange,
    ) -> Result<Arc<CapitalSummary>, SourceError> {
        let key = CacheKey::new("capitals", [disease.to_string(), range.to_string()]);
        if let Some(hit) = self.capitals.get(&key) {
            log::debug!("cache hit: {key}");
            return Ok(hit);
        }

        let capitals: Vec<(UfCode, MunicipalityCode)> = localities::capitals()
            .map(|(uf, capital)| (uf, capital.code))
            .collect();
        let geocodes: Vec<MunicipalityCode> = capitals.iter().map(|(_, code)| *code).collect();

        let mut bulk = self.upstream.latest_alerts(disease, &geocodes, range).await?;
        let summary: CapitalSummary = capitals
            .into_iter()
            .filter_map(|(uf, code)| bulk.latest.remove(&code).map(|record| (uf, record)))
            .collect();
        log::info!(
            "Capital summary for {disease}: {}/{} units with data, {} failed",
            summary.len(),
            geocodes.len(),
            bulk.failed.len()
        );

        if bulk.is_complete() {
            Ok(self.capitals.insert(key, summary))
        } else {
            Ok(Arc::new(summary))
        }
    }

    /// Search index over every state and municipality.
    ///
    /// # Errors
    ///
    /// Returns the upstream error if either directory cannot be fetched.
    pub async fn search_index(&self) -> Result<Arc<LocalitySearch>, SourceError> {
        let key = CacheKey::new("search-index", std::iter::empty::<&str>());
        self.search
            .get_or_fetch(key, || async move {
                let states = self.states().await?;
                let municipalities = self.upstream.all_municipalities().await?;
                Ok(LocalitySearch::new(&states, &municipalities))
            })
            .await
    }
}

fn series_key(query: &AlertQuery) -> CacheKey {
    CacheKey::new(
        "series",
        [
            query.disease.to_string(),
            query.geocode.to_string(),
            query.range.to_string(),
        ],
    )
}
