//! Pointer events and what they do.

use crate::surface::FeatureRef;

/// A pointer event on a drawn polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureEvent {
    /// Pointer entered the polygon.
    PointerEnter,
    /// Pointer left the polygon.
    PointerLeave,
    /// Polygon clicked.
    Click,
}

/// Reaction to a [`FeatureEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapAction {
    /// Apply the hover style and raise the polygon.
    Highlight,
    /// Put the polygon's base style back.
    RestoreBase,
    /// Notify the listener that a state was selected.
    SelectUnit,
    /// Nothing to do.
    Ignore,
}

/// The interaction table.
///
/// Hover applies to every polygon; only state clicks select.
#[must_use]
pub const fn action_for(event: FeatureEvent, target: FeatureRef) -> MapAction {
    match (event, target) {
        (FeatureEvent::PointerEnter, _) => MapAction::Highlight,
        (FeatureEvent::PointerLeave, _) => MapAction::RestoreBase,
        (FeatureEvent::Click, FeatureRef::State(_)) => MapAction::SelectUnit,
        (FeatureEvent::Click, FeatureRef::Municipality { .. }) => MapAction::Ignore,
    }
}
