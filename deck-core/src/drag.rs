//! Drag gesture controller.
//!
//! A [`DragSession`] is created when a drag starts and consumed when it ends
//! or is cancelled. While it is alive the tree is untouched: only the
//! on-screen pose of the dragged resource moves. The tree is mutated once,
//! in [`DragSession::finish`].

use serde::{Deserialize, Serialize};

use crate::grid::{grid_snap_hints, GridSnap};
use crate::snap::{resolve_snap_target, SnapResult, SnapTarget};
use crate::surface::{DeckSurface, GuideLine};
use crate::{Coordinate, DeckScene, EditorConfig, Rect, ResourceId};

/// What the user sees while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DragPreview {
    /// A discrete target is highlighted.
    Target(SnapResult),
    /// Grid hints corrected the pose and guide lines are shown.
    Guides(GridSnap),
    /// Nothing to snap to.
    Free,
}

/// How a gesture ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DragOutcome {
    /// Dropped on the trash; the resource and its descendants are gone.
    Deleted {
        /// Removed names, deepest first.
        removed: Vec<String>,
    },
    /// Dropped on a snap target and re-parented.
    Snapped {
        /// The new parent.
        parent: ResourceId,
        /// Location relative to the new parent.
        location: Coordinate,
    },
    /// Dropped on empty space; attached to the deck.
    Placed {
        /// Location relative to the deck.
        location: Coordinate,
    },
    /// The gesture was abandoned and the pre-drag placement restored.
    Cancelled,
}

impl DragOutcome {
    /// Whether the layout changed and should be persisted.
    #[must_use]
    pub fn changed_layout(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// State of one in-progress drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    resource: ResourceId,
    origin_parent: Option<ResourceId>,
    origin_location: Coordinate,
    /// On-screen offset relative to the parent.
    pose: (f64, f64),
}

impl DragSession {
    /// Begin dragging `resource`.
    ///
    /// Raises the resource and every ancestor to the top of the z-order and
    /// reveals the trash zone. Returns `None` for unknown or non-draggable
    /// resources.
    pub fn start(
        scene: &DeckScene,
        surface: &mut dyn DeckSurface,
        resource: ResourceId,
    ) -> Option<Self> {
        let node = scene.get(resource)?;
        if !node.resource_type().is_draggable() {
            tracing::debug!("{} is not draggable", node.name);
            return None;
        }

        let mut current = Some(resource);
        while let Some(id) = current {
            surface.raise(id);
            current = scene.parent(id);
        }
        surface.set_trash_visible(true);

        tracing::debug!("Drag start: {}", node.name);
        Some(Self {
            resource,
            origin_parent: node.parent(),
            origin_location: node.location,
            pose: (node.location.x, node.location.y),
        })
    }

    /// The dragged resource.
    #[must_use]
    pub fn resource(&self) -> ResourceId {
        self.resource
    }

    /// Current on-screen offset relative to the parent.
    #[must_use]
    pub fn pose(&self) -> (f64, f64) {
        self.pose
    }

    /// Parent and location captured at drag start.
    #[must_use]
    pub fn origin(&self) -> (Option<ResourceId>, Coordinate) {
        (self.origin_parent, self.origin_location)
    }

    /// Convert an absolute position into a pose relative to the current parent.
    #[must_use]
    pub fn pose_for_absolute(&self, scene: &DeckScene, x: f64, y: f64) -> (f64, f64) {
        let parent = self.parent_origin(scene);
        (x - parent.x, y - parent.y)
    }

    /// Handle a drag move to `pose` (offset relative to the parent).
    ///
    /// A discrete target only gets highlighted. Without one, grid hints
    /// correct the pose immediately and draw guide lines. The surface is told
    /// the resulting pose on every move.
    pub fn update(
        &mut self,
        scene: &DeckScene,
        config: &EditorConfig,
        surface: &mut dyn DeckSurface,
        pose: (f64, f64),
    ) -> DragPreview {
        self.pose = pose;
        surface.clear_guides();
        let preview = self.preview(scene, config, surface);
        surface.set_pose(self.resource, self.pose.0, self.pose.1);
        preview
    }

    fn preview(
        &mut self,
        scene: &DeckScene,
        config: &EditorConfig,
        surface: &mut dyn DeckSurface,
    ) -> DragPreview {
        let Some(rect) = self.provisional_rect(scene) else {
            return DragPreview::Free;
        };
        let (cx, cy) = rect.center();

        if let Some(hit) = resolve_snap_target(scene, config, self.resource, cx, cy) {
            surface.show_snap_box(hit.bounds);
            return DragPreview::Target(hit);
        }

        let hints = grid_snap_hints(scene, config, rect);
        if hints.is_empty() {
            return DragPreview::Free;
        }

        let parent = self.parent_origin(scene);
        if let (Some(x), Some(line)) = (hints.resource_x, hints.snapping_x) {
            self.pose.0 = x - parent.x;
            surface.show_guide(GuideLine::Vertical(line));
        }
        if let (Some(y), Some(line)) = (hints.resource_y, hints.snapping_y) {
            self.pose.1 = y - parent.y;
            surface.show_guide(GuideLine::Horizontal(line));
        }
        DragPreview::Guides(hints)
    }

    /// End the drag and commit the drop.
    ///
    /// Trash deletes the resource with its descendants. A snap target
    /// re-parents it at the target's relative location. Otherwise it is
    /// attached to the deck at its current absolute position. The trash zone
    /// is hidden in every case.
    pub fn finish(
        self,
        scene: &mut DeckScene,
        config: &EditorConfig,
        surface: &mut dyn DeckSurface,
    ) -> DragOutcome {
        surface.clear_guides();

        let Some(rect) = self.provisional_rect(scene) else {
            tracing::debug!("Dragged resource vanished before drop");
            surface.set_trash_visible(false);
            return DragOutcome::Cancelled;
        };
        let (cx, cy) = rect.center();

        let outcome = match resolve_snap_target(scene, config, self.resource, cx, cy) {
            Some(SnapResult {
                target: SnapTarget::Trash,
                ..
            }) => {
                let removed = scene.destroy(self.resource);
                surface.remove(self.resource);
                tracing::debug!("Dropped on trash, removed {} resources", removed.len());
                DragOutcome::Deleted { removed }
            }
            Some(SnapResult {
                target: SnapTarget::Resource(parent),
                relative_location,
                ..
            }) => self.reparent(scene, surface, parent, relative_location),
            None => self.place_free(scene, surface, rect),
        };

        surface.set_trash_visible(false);
        outcome
    }

    /// Abandon the drag and restore the pre-drag parent, location and pose.
    pub fn cancel(self, scene: &mut DeckScene, surface: &mut dyn DeckSurface) -> DragOutcome {
        surface.clear_guides();
        self.restore(scene, surface);
        surface.set_trash_visible(false);
        tracing::debug!("Drag cancelled");
        DragOutcome::Cancelled
    }

    fn reparent(
        &self,
        scene: &mut DeckScene,
        surface: &mut dyn DeckSurface,
        parent: ResourceId,
        relative_location: Coordinate,
    ) -> DragOutcome {
        let location = Coordinate::planar(relative_location.x, relative_location.y);
        if !self.attach(scene, parent, location) {
            self.restore(scene, surface);
            return DragOutcome::Cancelled;
        }
        surface.redraw(parent);
        surface.set_pose(self.resource, location.x, location.y);
        tracing::debug!("Snapped onto {parent}");
        DragOutcome::Snapped { parent, location }
    }

    fn place_free(
        &self,
        scene: &mut DeckScene,
        surface: &mut dyn DeckSurface,
        rect: Rect,
    ) -> DragOutcome {
        let Some(root) = scene.root() else {
            self.restore(scene, surface);
            return DragOutcome::Cancelled;
        };
        let deck_origin = scene.absolute_location(root).unwrap_or_default();
        let z = scene.get(self.resource).map_or(0.0, |r| r.location.z);
        let location = Coordinate::new(rect.x - deck_origin.x, rect.y - deck_origin.y, z);

        if !self.attach(scene, root, location) {
            self.restore(scene, surface);
            return DragOutcome::Cancelled;
        }
        surface.redraw(root);
        surface.set_pose(self.resource, location.x, location.y);
        tracing::debug!("Placed at ({}, {}) on the deck", location.x, location.y);
        DragOutcome::Placed { location }
    }

    /// Move the resource under `parent` at `location`. Leaves the tree
    /// untouched and returns false when the move would create a cycle.
    fn attach(&self, scene: &mut DeckScene, parent: ResourceId, location: Coordinate) -> bool {
        if scene.is_ancestor_or_self(self.resource, parent) {
            tracing::warn!("Refusing to drop a resource into its own subtree");
            return false;
        }
        if let Some(old) = scene.parent(self.resource) {
            scene.unassign_child(old, self.resource);
        }
        if let Some(node) = scene.get_mut(self.resource) {
            node.location = location;
        }
        scene.assign_child(parent, self.resource);
        true
    }

    fn restore(&self, scene: &mut DeckScene, surface: &mut dyn DeckSurface) {
        if scene.get(self.resource).is_none() {
            return;
        }
        let current_parent = scene.parent(self.resource);
        if let Some(origin) = self.origin_parent {
            if current_parent != Some(origin) {
                scene.assign_child(origin, self.resource);
            }
        }
        if let Some(node) = scene.get_mut(self.resource) {
            node.location = self.origin_location;
        }
        surface.set_pose(
            self.resource,
            self.origin_location.x,
            self.origin_location.y,
        );
    }

    fn parent_origin(&self, scene: &DeckScene) -> Coordinate {
        scene
            .parent(self.resource)
            .and_then(|p| scene.absolute_location(p))
            .unwrap_or_default()
    }

    /// Absolute footprint at the current pose.
    fn provisional_rect(&self, scene: &DeckScene) -> Option<Rect> {
        let node = scene.get(self.resource)?;
        let parent = self.parent_origin(scene);
        Some(Rect::new(
            parent.x + self.pose.0,
            parent.y + self.pose.1,
            node.size_x,
            node.size_y,
        ))
    }
}
