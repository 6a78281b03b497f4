//! Snap-target resolution: which slot does a dragged resource drop into?
//!
//! Candidates are checked in strict priority order and the first match wins:
//!
//! ```text
//! 1. trash zone         -> delete
//! 2. carrier sites      -> re-parent onto the site at (0, 0)
//! 3. numbered OT grid   -> re-parent onto the deck at the site offset
//! 4. nothing            -> free placement (see grid module)
//! ```
//!
//! The point tested is the center of the dragged resource.

use serde::{Deserialize, Serialize};

use crate::deck::{ot_site_rect, OT_DECK_SITE_LOCATIONS};
use crate::{Coordinate, DeckScene, EditorConfig, Rect, ResourceId, ResourceKind, ResourceType};

/// What a drop resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum SnapTarget {
    /// The trash drop zone.
    Trash,
    /// A resource that becomes the new parent.
    Resource(ResourceId),
}

/// A resolved drop target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapResult {
    /// The target.
    pub target: SnapTarget,
    /// Location of the dropped resource relative to the target.
    pub relative_location: Coordinate,
    /// Absolute area to highlight while hovering the target.
    pub bounds: Rect,
}

/// Whether a resource of type `candidate` may sit in a site of a carrier of
/// type `carrier`.
#[must_use]
pub fn site_accepts(carrier: ResourceType, candidate: ResourceType) -> bool {
    matches!(
        (candidate, carrier),
        (ResourceType::Plate, ResourceType::PlateCarrier)
            | (ResourceType::TipRack, ResourceType::TipCarrier)
    )
}

/// Find the drop target for `candidate` when its center is at `(x, y)`.
///
/// Returns `None` when snapping is disabled or nothing matches.
#[must_use]
pub fn resolve_snap_target(
    scene: &DeckScene,
    config: &EditorConfig,
    candidate: ResourceId,
    x: f64,
    y: f64,
) -> Option<SnapResult> {
    if !config.snapping_enabled {
        return None;
    }

    if config.trash_zone.contains(x, y) {
        return Some(SnapResult {
            target: SnapTarget::Trash,
            relative_location: Coordinate::zero(),
            bounds: config.trash_zone,
        });
    }

    let candidate_type = scene.get(candidate)?.resource_type();
    let root = scene.root()?;

    if let Some(hit) = carrier_site_at(scene, root, candidate, candidate_type, x, y) {
        return Some(hit);
    }

    let deck = scene.get(root)?;
    if matches!(deck.kind, ResourceKind::OTDeck) {
        let deck_location = scene.absolute_location(root)?;
        for site in OT_DECK_SITE_LOCATIONS {
            let bounds = ot_site_rect(deck_location, site);
            if bounds.contains(x, y) {
                return Some(SnapResult {
                    target: SnapTarget::Resource(root),
                    relative_location: Coordinate::planar(site.0, site.1),
                    bounds,
                });
            }
        }
    }

    None
}

fn carrier_site_at(
    scene: &DeckScene,
    root: ResourceId,
    candidate: ResourceId,
    candidate_type: ResourceType,
    x: f64,
    y: f64,
) -> Option<SnapResult> {
    for site in scene.walk(root) {
        let Some(resource) = scene.get(site) else {
            continue;
        };
        if resource.resource_type() != ResourceType::CarrierSite {
            continue;
        }
        let Some(carrier_type) = scene
            .parent(site)
            .and_then(|p| scene.get(p))
            .map(crate::Resource::resource_type)
        else {
            continue;
        };
        if !site_accepts(carrier_type, candidate_type) {
            continue;
        }
        // Never drop a resource into its own subtree.
        if scene.is_ancestor_or_self(candidate, site) {
            continue;
        }
        // A site holds at most one payload; the candidate may return to its own site.
        if resource.children().iter().any(|&c| c != candidate) {
            continue;
        }
        let Some(bounds) = scene.absolute_rect(site) else {
            continue;
        };
        if bounds.contains(x, y) {
            return Some(SnapResult {
                target: SnapTarget::Resource(site),
                relative_location: Coordinate::zero(),
                bounds,
            });
        }
    }
    None
}
