#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive map engine for arbovirus alerts.
//!
//! A [`MapSession`] owns the map context and drives two overlays: the
//! national state layer, painted from capital alerts or sanitation
//! coverage, and per-state municipality layers that appear when the view
//! is zoomed in far enough. Drawing is delegated to a [`MapSurface`];
//! selections are reported to a [`MapListener`].

pub mod context;
pub mod events;
pub mod municipality;
pub mod session;
pub mod state;
pub mod surface;

#[cfg(test)]
mod testing;

use epi_map_source::SourceError;
use thiserror::Error;

pub use context::{MUNICIPALITY_ZOOM_THRESHOLD, MapContext, MapLayer};
pub use events::{FeatureEvent, MapAction, action_for};
pub use municipality::{LoadReport, MunicipalityLayerManager, ViewportUpdate};
pub use session::MapSession;
pub use state::StateLayerRenderer;
pub use surface::{FeatureRef, MapListener, MapSurface, NullListener, StyledFeature};

/// Errors surfaced to the host as an error state.
#[derive(Debug, Error)]
pub enum MapError {
    /// The national state mesh could not be loaded.
    #[error("failed to load the national map: {0}")]
    NationalLoad(#[source] SourceError),
    /// The capital alert summary could not be loaded.
    #[error("failed to load capital alerts: {0}")]
    CapitalSummary(#[source] SourceError),
    /// The locality directory could not be loaded.
    #[error("failed to load the search index: {0}")]
    SearchIndex(#[source] SourceError),
}
