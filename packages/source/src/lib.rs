#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Upstream data sources for the surveillance map.
//!
//! The map reads from three public services: the IBGE locality directory,
//! the IBGE boundary meshes and the `InfoDengue` case-alert feed. Each is
//! reached through the [`Upstream`] trait, implemented over HTTP by
//! [`http::HttpUpstream`]. [`service::DataService`] puts a session-scoped
//! request cache in front of an upstream and is what the map consumes.

pub mod config;
pub mod http;
pub mod ibge;
pub mod infodengue;
pub mod retry;
pub mod search;
pub mod service;

use std::collections::BTreeMap;

use async_trait::async_trait;
use epi_map_alert_models::{AlertRecord, Disease, EpiWeekRange};
use epi_map_geography_models::{BoundaryFeature, GeometryError};
use epi_map_region_models::{MunicipalityCode, UfCode};
use futures::stream::{self, StreamExt as _};
use serde::{Deserialize, Serialize};

pub use config::UpstreamConfig;
pub use http::HttpUpstream;
pub use search::LocalitySearch;
pub use service::DataService;

/// Bulk fetches run this many per-geocode requests at once unless the
/// upstream says otherwise.
pub const DEFAULT_BULK_CONCURRENCY: usize = 8;

/// Errors that can occur while talking to an upstream.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Status code returned.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (config file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Boundary mesh could not be parsed.
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// A response parsed but its content made no sense.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what went wrong.
        message: String,
    },
}

impl SourceError {
    /// Whether the error came from the network rather than the payload.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}

/// A federative unit as listed by the IBGE directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    /// IBGE code.
    pub uf: UfCode,
    /// Two-letter abbreviation.
    pub abbr: String,
    /// Full name.
    pub name: String,
}

/// A municipality as listed by the IBGE directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalityEntry {
    /// 7-digit geocode.
    pub code: MunicipalityCode,
    /// Official name.
    pub name: String,
}

impl MunicipalityEntry {
    /// UF the municipality belongs to.
    #[must_use]
    pub fn uf(&self) -> Option<UfCode> {
        self.code.uf()
    }
}

/// Parameters of one alert-series request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertQuery {
    /// Disease to query.
    pub disease: Disease,
    /// Municipality to query.
    pub geocode: MunicipalityCode,
    /// Inclusive week range.
    pub range: EpiWeekRange,
}

/// Latest alert record per municipality. Municipalities without data are
/// absent.
pub type LatestAlerts = BTreeMap<MunicipalityCode, AlertRecord>;

/// Result of a bulk latest-alert fetch.
///
/// A geocode in `failed` could not be fetched; it is missing from
/// `latest` for a different reason than a geocode with no data, and a
/// later fetch may still succeed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkAlerts {
    /// Latest record of every geocode that returned data.
    pub latest: LatestAlerts,
    /// Geocodes whose request failed.
    pub failed: Vec<MunicipalityCode>,
}

impl BulkAlerts {
    /// Whether every geocode was fetched.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Read-only access to the map's upstream services.
///
/// Implementations must be `Send + Sync` so fetches can run on spawned
/// futures while the map keeps handling events.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Every federative unit.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request or parsing fails.
    async fn states(&self) -> Result<Vec<StateEntry>, SourceError>;

    /// Municipalities of one UF.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request or parsing fails.
    async fn municipalities(&self, uf: UfCode) -> Result<Vec<MunicipalityEntry>, SourceError>;

    /// Every municipality in the country.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request or parsing fails.
    async fn all_municipalities(&self) -> Result<Vec<MunicipalityEntry>, SourceError>;

    /// National mesh with one feature per UF.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request or parsing fails.
    async fn national_geometry(&self) -> Result<Vec<BoundaryFeature>, SourceError>;

    /// Mesh of one UF with one feature per municipality.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request or parsing fails.
    async fn unit_geometry(&self, uf: UfCode) -> Result<Vec<BoundaryFeature>, SourceError>;

    /// Weekly alert series for one municipality, sorted ascending by week.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request or parsing fails.
    async fn alert_series(&self, query: &AlertQuery) -> Result<Vec<AlertRecord>, SourceError>;

    /// How many per-geocode requests [`Self::latest_alerts`] keeps in
    /// flight.
    fn bulk_concurrency(&self) -> usize {
        DEFAULT_BULK_CONCURRENCY
    }

    /// Latest record of each geocode, fetched concurrently.
    ///
    /// A geocode whose request fails is logged and listed in
    /// [`BulkAlerts::failed`]. The call only fails when every geocode
    /// failed.
    ///
    /// # Errors
    ///
    /// Returns the first [`SourceError`] when no geocode could be fetched.
    async fn latest_alerts(
        &self,
        disease: Disease,
        geocodes: &[MunicipalityCode],
        range: EpiWeekRange,
    ) -> Result<BulkAlerts, SourceError> {
        let results: Vec<_> = stream::iter(geocodes.iter().copied().map(|geocode| async move {
            let query = AlertQuery {
                disease,
                geocode,
                range,
            };
            (geocode, self.alert_series(&query).await)
        }))
        .buffer_unordered(self.bulk_concurrency().max(1))
        .collect()
        .await;

        let mut bulk = BulkAlerts::default();
        let mut first_error = None;

        for (geocode, result) in results {
            match result {
                Ok(series) => {
                    if let Some(record) = series.into_iter().max_by_key(|r| r.week) {
                        bulk.latest.insert(geocode, record);
                    }
                }
                Err(e) => {
                    log::warn!("Alert fetch for {geocode} ({disease}) failed: {e}");
                    bulk.failed.push(geocode);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if bulk.failed.len() == geocodes.len() => Err(e),
            _ => {
                bulk.failed.sort_unstable();
                Ok(bulk)
            }
        }
    }
}
