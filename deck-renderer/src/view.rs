//! Editor overlay state, fed by the core through [`DeckSurface`].
//!
//! The view does not own resource visuals. Each frame is rebuilt from the
//! scene; the view only remembers what the scene does not know: the pose of
//! a resource mid-drag, sibling z-order, the selection and transient overlays
//! (trash zone, snap box, guides, tooltip).

use std::collections::HashMap;

use deck_core::{DeckSurface, GuideLine, Rect, ResourceId};

/// A hover label anchored at a deck position.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    /// Label text.
    pub label: String,
    /// Anchor x in deck millimetres.
    pub x: f64,
    /// Anchor y in deck millimetres.
    pub y: f64,
}

/// Overlay state of an editor canvas.
#[derive(Debug, Clone)]
pub struct EditorView {
    trash_zone: Rect,
    trash_visible: bool,
    snap_box: Option<Rect>,
    guides: Vec<GuideLine>,
    poses: HashMap<ResourceId, (f64, f64)>,
    raise_order: Vec<ResourceId>,
    selection: Option<ResourceId>,
    tooltip: Option<Tooltip>,
    dirty: bool,
}

impl EditorView {
    /// Create a view whose trash icon occupies `trash_zone`.
    #[must_use]
    pub fn new(trash_zone: Rect) -> Self {
        Self {
            trash_zone,
            trash_visible: false,
            snap_box: None,
            guides: Vec::new(),
            poses: HashMap::new(),
            raise_order: Vec::new(),
            selection: None,
            tooltip: None,
            dirty: true,
        }
    }

    /// Trash zone bounds.
    #[must_use]
    pub fn trash_zone(&self) -> Rect {
        self.trash_zone
    }

    /// Whether the trash icon is shown.
    #[must_use]
    pub fn trash_visible(&self) -> bool {
        self.trash_visible
    }

    /// Current snap box, if any.
    #[must_use]
    pub fn snap_box(&self) -> Option<Rect> {
        self.snap_box
    }

    /// Current guide lines.
    #[must_use]
    pub fn guides(&self) -> &[GuideLine] {
        &self.guides
    }

    /// Pose override of a resource, relative to its parent.
    #[must_use]
    pub fn pose(&self, id: ResourceId) -> Option<(f64, f64)> {
        self.poses.get(&id).copied()
    }

    /// Position of a resource in the raise order, later is higher.
    #[must_use]
    pub fn raise_rank(&self, id: ResourceId) -> Option<usize> {
        self.raise_order.iter().position(|&r| r == id)
    }

    /// Selected resource.
    #[must_use]
    pub fn selection(&self) -> Option<ResourceId> {
        self.selection
    }

    /// Current tooltip.
    #[must_use]
    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Show a hover label, replacing any previous one.
    pub fn show_tooltip(&mut self, label: impl Into<String>, x: f64, y: f64) {
        self.tooltip = Some(Tooltip {
            label: label.into(),
            x,
            y,
        });
        self.dirty = true;
    }

    /// Hide the hover label.
    pub fn hide_tooltip(&mut self) {
        if self.tooltip.take().is_some() {
            self.dirty = true;
        }
    }

    /// Whether anything changed since the last frame.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record that a frame reflecting the current state was produced.
    pub fn mark_rendered(&mut self) {
        self.dirty = false;
    }
}

impl Default for EditorView {
    fn default() -> Self {
        Self::new(deck_core::EditorConfig::default().trash_zone)
    }
}

impl DeckSurface for EditorView {
    fn raise(&mut self, id: ResourceId) {
        self.raise_order.retain(|&r| r != id);
        self.raise_order.push(id);
        self.dirty = true;
    }

    fn set_trash_visible(&mut self, visible: bool) {
        self.trash_visible = visible;
        if !visible {
            // Gesture over: the scene holds the committed locations.
            self.poses.clear();
        }
        self.dirty = true;
    }

    fn show_snap_box(&mut self, bounds: Rect) {
        self.snap_box = Some(bounds);
        self.dirty = true;
    }

    fn show_guide(&mut self, guide: GuideLine) {
        self.guides.push(guide);
        self.dirty = true;
    }

    fn clear_guides(&mut self) {
        self.snap_box = None;
        self.guides.clear();
        self.dirty = true;
    }

    fn set_pose(&mut self, id: ResourceId, x: f64, y: f64) {
        self.poses.insert(id, (x, y));
        self.dirty = true;
    }

    fn redraw(&mut self, id: ResourceId) {
        tracing::trace!("Redraw requested for {id}");
        self.dirty = true;
    }

    fn remove(&mut self, id: ResourceId) {
        self.poses.remove(&id);
        self.raise_order.retain(|&r| r != id);
        if self.selection == Some(id) {
            self.selection = None;
        }
        self.dirty = true;
    }

    fn set_selection(&mut self, id: Option<ResourceId>) {
        self.selection = id;
        self.dirty = true;
    }
}
