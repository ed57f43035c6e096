#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Bounding boxes and administrative boundary features.
//!
//! IBGE serves its meshes (`/api/v3/malhas`) as `GeoJSON` feature
//! collections where every feature carries its numeric area code in
//! `properties.codarea`. This crate turns those collections into
//! [`BoundaryFeature`]s with pre-computed bounding boxes. It performs no
//! projection or topology work.

use std::sync::Arc;

use geo::{BoundingRect, MultiPolygon};
use geojson::GeoJson;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Returns `true` when the two boxes share at least one point.
    ///
    /// Edges touching counts as an overlap.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.west <= other.east
            && other.west <= self.east
            && self.south <= other.north
            && other.south <= self.north
    }

    /// Returns `true` if the point lies inside or on the edge of the box.
    #[must_use]
    pub fn contains_point(&self, lng: f64, lat: f64) -> bool {
        lng >= self.west && lng <= self.east && lat >= self.south && lat <= self.north
    }

    /// Returns `false` for boxes with NaN corners or inverted edges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.west, self.south, self.east, self.north]
            .iter()
            .all(|v| v.is_finite())
            && self.west <= self.east
            && self.south <= self.north
    }

    /// Parses a `"west,south,east,north"` string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<f64> = s.split(',').filter_map(|p| p.trim().parse().ok()).collect();
        if parts.len() != 4 {
            return None;
        }
        let bbox = Self::new(parts[0], parts[1], parts[2], parts[3]);
        bbox.is_valid().then_some(bbox)
    }
}

impl From<geo::Rect<f64>> for BoundingBox {
    fn from(rect: geo::Rect<f64>) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

/// One polygon set from an IBGE mesh, keyed by its `codarea`.
///
/// `geometry` and `bounds` are `None` when the feature had no usable
/// polygon geometry. Consumers skip such features instead of failing.
#[derive(Debug, Clone)]
pub struct BoundaryFeature {
    /// IBGE area code (UF code or 7-digit municipality geocode).
    pub code: u32,
    /// Polygon geometry, shared so styled copies don't duplicate it.
    pub geometry: Option<Arc<MultiPolygon<f64>>>,
    /// Bounding box of `geometry`.
    pub bounds: Option<BoundingBox>,
}

impl BoundaryFeature {
    /// Builds a feature from a polygon set, computing its bounding box.
    #[must_use]
    pub fn new(code: u32, geometry: MultiPolygon<f64>) -> Self {
        let bounds = geometry.bounding_rect().map(BoundingBox::from);
        Self {
            code,
            geometry: Some(Arc::new(geometry)),
            bounds,
        }
    }

    /// A feature whose geometry could not be used.
    #[must_use]
    pub const fn malformed(code: u32) -> Self {
        Self {
            code,
            geometry: None,
            bounds: None,
        }
    }
}

/// Errors from parsing a mesh response.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The body was not valid `GeoJSON`.
    #[error("GeoJSON parse error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The document parsed but was not a `FeatureCollection`.
    #[error("expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,
}

/// Parses an IBGE mesh `FeatureCollection` into boundary features.
///
/// Features without a readable `codarea` are dropped with a warning.
/// Features whose geometry is missing or not polygonal are kept as
/// [`BoundaryFeature::malformed`].
///
/// # Errors
///
/// Returns [`GeometryError`] if the body is not a `GeoJSON`
/// `FeatureCollection`.
pub fn parse_boundaries(geojson_str: &str) -> Result<Vec<BoundaryFeature>, GeometryError> {
    let GeoJson::FeatureCollection(collection) = geojson_str.parse::<GeoJson>()? else {
        return Err(GeometryError::NotFeatureCollection);
    };

    let mut features = Vec::with_capacity(collection.features.len());

    for feature in collection.features {
        let Some(code) = feature.property("codarea").and_then(parse_codarea) else {
            log::warn!("Skipping mesh feature without a usable codarea");
            continue;
        };

        let polygons = feature.geometry.and_then(|geom| {
            let geo_geom: geo::Geometry<f64> = geom.try_into().ok()?;
            match geo_geom {
                geo::Geometry::MultiPolygon(mp) => Some(mp),
                geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
                _ => None,
            }
        });

        match polygons {
            Some(mp) => features.push(BoundaryFeature::new(code, mp)),
            None => {
                log::debug!("Mesh feature {code} has no polygon geometry");
                features.push(BoundaryFeature::malformed(code));
            }
        }
    }

    Ok(features)
}

/// IBGE encodes `codarea` as a string, but accept numbers too.
fn parse_codarea(value: &geojson::JsonValue) -> Option<u32> {
    value
        .as_str()
        .and_then(|s| s.trim().parse().ok())
        .or_else(|| value.as_u64().and_then(|n| u32::try_from(n).ok()))
}
