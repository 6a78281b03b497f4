//! Grid-snap advisor: alignment hints for free placement on a railed deck.
//!
//! Consulted only when no discrete snap target matched. Every check that
//! falls within the snap margin overwrites the previous hint on its axis, so
//! the evaluation order below is the tie-break:
//!
//! 1. top rail margin (`deck.y + 63`)
//! 2. bottom rail margin (`deck.y + 63 + rail_height - height`)
//! 3. left deck edge (`deck.x`)
//! 4. each rail (`100 + 22.5 * i`), in ascending order

use serde::{Deserialize, Serialize};

use crate::deck::{rail_x, HAMILTON_TOP_MARGIN_MM};
use crate::{DeckScene, EditorConfig, Rect, ResourceKind};

/// Per-axis grid-snap hints. Empty when nothing is in range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSnap {
    /// Corrected absolute x of the dragged resource's left edge.
    pub resource_x: Option<f64>,
    /// Corrected absolute y of the dragged resource's near edge.
    pub resource_y: Option<f64>,
    /// Position of the vertical guide line.
    pub snapping_x: Option<f64>,
    /// Position of the horizontal guide line.
    pub snapping_y: Option<f64>,
}

impl GridSnap {
    /// Whether no axis has a hint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resource_x.is_none() && self.resource_y.is_none()
    }
}

/// Compute grid-snap hints for a resource whose absolute footprint is `rect`.
///
/// Only railed (Hamilton) decks produce hints; snapping disabled, a missing
/// deck or any other deck type yield an empty result.
#[must_use]
pub fn grid_snap_hints(scene: &DeckScene, config: &EditorConfig, rect: Rect) -> GridSnap {
    let mut hints = GridSnap::default();
    if !config.snapping_enabled {
        return hints;
    }
    let Some(root) = scene.root() else {
        return hints;
    };
    let Some(deck) = scene.get(root) else {
        return hints;
    };
    let ResourceKind::HamiltonDeck { num_rails } = deck.kind else {
        return hints;
    };
    let Some(rail_height) = deck.kind.rail_height() else {
        return hints;
    };
    let Some(origin) = scene.absolute_location(root) else {
        return hints;
    };

    let margin = config.snap_margin_mm;
    let within = |value: f64, line: f64| (value - line).abs() < margin;

    let top = origin.y + HAMILTON_TOP_MARGIN_MM;
    if within(rect.y, top) {
        hints.resource_y = Some(top);
    }

    let bottom = top + rail_height;
    if within(rect.y, bottom - rect.height) {
        hints.resource_y = Some(bottom - rect.height);
        hints.snapping_y = Some(bottom);
    }

    if within(rect.x, origin.x) {
        hints.resource_x = Some(origin.x);
    }

    for rail in 0..num_rails {
        let x = rail_x(rail);
        if within(rect.x, x) {
            hints.resource_x = Some(x);
        }
    }

    if hints.snapping_x.is_none() {
        hints.snapping_x = hints.resource_x;
    }
    if hints.snapping_y.is_none() {
        hints.snapping_y = hints.resource_y;
    }
    hints
}
