#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index over federative-unit boundaries.
//!
//! Indexes the bounding box of every state polygon in an R-tree and
//! answers "which units does this viewport touch". The test is envelope
//! overlap only: a viewport that grazes a unit's bounding box counts as
//! seeing the unit, even if it misses the polygon itself.

use std::collections::BTreeSet;

use epi_map_geography_models::{BoundaryFeature, BoundingBox};
use epi_map_region_models::UfCode;
use rstar::{AABB, RTree, RTreeObject};

/// A unit's envelope stored in the R-tree.
struct UnitEntry {
    uf: UfCode,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for UnitEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Pre-built index of state envelopes.
///
/// Built once from the national mesh and queried on every viewport
/// change.
pub struct ViewportResolver {
    units: RTree<UnitEntry>,
}

impl ViewportResolver {
    /// Indexes the given state features.
    ///
    /// Features without a bounding box (malformed geometry) are skipped,
    /// as are codes outside the national UF enumeration.
    #[must_use]
    pub fn new(features: &[BoundaryFeature]) -> Self {
        let entries: Vec<UnitEntry> = features
            .iter()
            .filter_map(|feature| {
                let Some(uf) = UfCode::from_code(feature.code) else {
                    log::debug!("Ignoring non-UF boundary {}", feature.code);
                    return None;
                };
                let Some(bounds) = feature.bounds.filter(BoundingBox::is_valid) else {
                    log::debug!("Skipping UF {uf} without a usable bounding box");
                    return None;
                };
                Some(UnitEntry {
                    uf,
                    envelope: to_envelope(&bounds),
                })
            })
            .collect();

        log::info!("Indexed {} state envelopes", entries.len());

        Self {
            units: RTree::bulk_load(entries),
        }
    }

    /// Units whose bounding box overlaps the viewport.
    ///
    /// An invalid viewport (NaN or inverted edges) sees nothing.
    #[must_use]
    pub fn visible_units(&self, viewport: &BoundingBox) -> BTreeSet<UfCode> {
        if !viewport.is_valid() {
            return BTreeSet::new();
        }

        self.units
            .locate_in_envelope_intersecting(&to_envelope(viewport))
            .map(|entry| entry.uf)
            .collect()
    }

    /// Number of indexed units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.size()
    }

    /// Whether no unit could be indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.size() == 0
    }
}

/// One-shot form of [`ViewportResolver::visible_units`].
///
/// Scans `features` linearly; callers evaluating many viewports against
/// the same features should build a [`ViewportResolver`] once instead.
#[must_use]
pub fn visible_units(viewport: &BoundingBox, features: &[BoundaryFeature]) -> BTreeSet<UfCode> {
    if !viewport.is_valid() {
        return BTreeSet::new();
    }

    features
        .iter()
        .filter(|f| f.bounds.is_some_and(|b| b.is_valid() && b.intersects(viewport)))
        .filter_map(|f| UfCode::from_code(f.code))
        .collect()
}

fn to_envelope(bbox: &BoundingBox) -> AABB<[f64; 2]> {
    AABB::from_corners([bbox.west, bbox.south], [bbox.east, bbox.north])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiPolygon, Rect};

    fn square(code: u32, west: f64, south: f64, east: f64, north: f64) -> BoundaryFeature {
        let rect = Rect::new((west, south), (east, north));
        BoundaryFeature::new(code, MultiPolygon(vec![rect.to_polygon()]))
    }

    fn uf(code: u32) -> UfCode {
        UfCode::from_code(code).unwrap()
    }

    fn southeast() -> Vec<BoundaryFeature> {
        vec![
            square(35, -53.1, -25.3, -44.2, -19.8), // SP
            square(33, -44.9, -23.4, -40.9, -20.8), // RJ
            square(31, -51.0, -22.9, -39.9, -14.2), // MG
            square(41, -54.6, -26.7, -48.0, -22.5), // PR
        ]
    }

    #[test]
    fn viewport_over_campinas_includes_sao_paulo() {
        let resolver = ViewportResolver::new(&southeast());
        let viewport = BoundingBox::new(-47.3, -23.1, -46.9, -22.7);
        let visible = resolver.visible_units(&viewport);
        assert!(visible.contains(&uf(35)));
        assert!(!visible.contains(&uf(33)));
    }

    #[test]
    fn wide_viewport_sees_every_overlapping_unit() {
        let resolver = ViewportResolver::new(&southeast());
        let viewport = BoundingBox::new(-56.0, -27.0, -38.0, -13.0);
        let visible = resolver.visible_units(&viewport);
        assert_eq!(visible.len(), 4);
    }

    #[test]
    fn touching_edges_count_as_visible() {
        let resolver = ViewportResolver::new(&southeast());
        let viewport = BoundingBox::new(-40.9, -21.0, -40.0, -20.0);
        assert!(resolver.visible_units(&viewport).contains(&uf(33)));
    }

    #[test]
    fn malformed_and_unknown_features_are_skipped() {
        let mut features = southeast();
        features.push(BoundaryFeature::malformed(16));
        features.push(square(99, -60.0, -10.0, -50.0, 0.0));

        let resolver = ViewportResolver::new(&features);
        assert_eq!(resolver.len(), 4);

        let everywhere = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
        let visible = resolver.visible_units(&everywhere);
        assert!(!visible.contains(&uf(16)));
        assert_eq!(visible, visible_units(&everywhere, &features));
    }

    #[test]
    fn invalid_viewport_sees_nothing() {
        let resolver = ViewportResolver::new(&southeast());
        let inverted = BoundingBox::new(-40.0, -20.0, -50.0, -25.0);
        assert!(resolver.visible_units(&inverted).is_empty());
        assert!(visible_units(&inverted, &southeast()).is_empty());
    }

    #[test]
    fn free_function_matches_resolver() {
        let features = southeast();
        let resolver = ViewportResolver::new(&features);
        let viewport = BoundingBox::new(-45.0, -23.0, -43.0, -21.0);
        assert_eq!(
            resolver.visible_units(&viewport),
            visible_units(&viewport, &features)
        );
    }
}
