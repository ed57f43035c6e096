//! [`Upstream`] over the public HTTP APIs.

use async_trait::async_trait;
use epi_map_alert_models::AlertRecord;
use epi_map_geography_models::{BoundaryFeature, parse_boundaries};
use epi_map_region_models::UfCode;

use crate::ibge::{self, IbgeMunicipality, IbgeState};
use crate::infodengue::{self, AlertCityRow};
use crate::{
    AlertQuery, MunicipalityEntry, SourceError, StateEntry, Upstream, UpstreamConfig, retry,
};

/// Reads IBGE and `InfoDengue` over HTTP.
pub struct HttpUpstream {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl HttpUpstream {
    /// Builds a client configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: UpstreamConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self { client, config })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    async fn get_json<T>(&self, url: &str) -> Result<T, SourceError>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        log::debug!("GET {url}");
        retry::send_json(|| self.client.get(url), self.config.max_retries).await
    }

    async fn get_mesh(&self, url: &str) -> Result<Vec<BoundaryFeature>, SourceError> {
        log::debug!("GET {url}");
        let body = retry::send_text(|| self.client.get(url), self.config.max_retries).await?;
        Ok(parse_boundaries(&body)?)
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn states(&self) -> Result<Vec<StateEntry>, SourceError> {
        let url = ibge::states_url(&self.config.localities_url);
        let rows: Vec<IbgeState> = self.get_json(&url).await?;
        Ok(ibge::into_states(rows))
    }

    async fn municipalities(&self, uf: UfCode) -> Result<Vec<MunicipalityEntry>, SourceError> {
        let url = ibge::municipalities_url(&self.config.localities_url, uf);
        let rows: Vec<IbgeMunicipality> = self.get_json(&url).await?;
        Ok(ibge::into_municipalities(rows))
    }

    async fn all_municipalities(&self) -> Result<Vec<MunicipalityEntry>, SourceError> {
        let url = ibge::all_municipalities_url(&self.config.localities_url);
        let rows: Vec<IbgeMunicipality> = self.get_json(&url).await?;
        log::info!("Loaded {} municipalities from the IBGE directory", rows.len());
        Ok(ibge::into_municipalities(rows))
    }

    async fn national_geometry(&self) -> Result<Vec<BoundaryFeature>, SourceError> {
        let features = self
            .get_mesh(&ibge::national_mesh_url(&self.config.meshes_url))
            .await?;
        log::info!("Loaded national mesh with {} features", features.len());
        Ok(features)
    }

    async fn unit_geometry(&self, uf: UfCode) -> Result<Vec<BoundaryFeature>, SourceError> {
        let features = self
            .get_mesh(&ibge::unit_mesh_url(&self.config.meshes_url, uf))
            .await?;
        log::info!("Loaded mesh for {} with {} features", uf.abbr(), features.len());
        Ok(features)
    }

    async fn alert_series(&self, query: &AlertQuery) -> Result<Vec<AlertRecord>, SourceError> {
        let url = infodengue::alertcity_url(&self.config.infodengue_url, query);
        let rows: Vec<AlertCityRow> = self.get_json(&url).await?;
        Ok(infodengue::into_series(rows))
    }

    fn bulk_concurrency(&self) -> usize {
        self.config.bulk_concurrency
    }
}
