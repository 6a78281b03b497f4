//! The narrow interface between the editor core and whatever draws it.
//!
//! The core never draws. It tells a [`DeckSurface`] what changed and the
//! surface decides how to show it. All methods default to no-ops so that a
//! surface only implements what it can display.

use serde::{Deserialize, Serialize};

use crate::{Rect, ResourceId};

/// A full-span alignment guide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "axis", content = "position", rename_all = "lowercase")]
pub enum GuideLine {
    /// Vertical line at the given x.
    Vertical(f64),
    /// Horizontal line at the given y.
    Horizontal(f64),
}

/// Render-side effects requested by the core.
pub trait DeckSurface {
    /// Bring a resource's visual to the top of the z-order.
    fn raise(&mut self, _id: ResourceId) {}

    /// Show or hide the trash drop zone.
    fn set_trash_visible(&mut self, _visible: bool) {}

    /// Highlight a snap target.
    fn show_snap_box(&mut self, _bounds: Rect) {}

    /// Draw an alignment guide.
    fn show_guide(&mut self, _guide: GuideLine) {}

    /// Remove the snap box and all guides.
    fn clear_guides(&mut self) {}

    /// Move a resource's visual to an offset relative to its parent.
    fn set_pose(&mut self, _id: ResourceId, _x: f64, _y: f64) {}

    /// Rebuild a resource's visual (and those of its children).
    fn redraw(&mut self, _id: ResourceId) {}

    /// Destroy a resource's visual.
    fn remove(&mut self, _id: ResourceId) {}

    /// Outline the selected resource, or nothing.
    fn set_selection(&mut self, _id: Option<ResourceId>) {}
}

/// A surface that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl DeckSurface for NullSurface {}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
#[allow(missing_docs)] // Variant fields mirror the DeckSurface parameters
pub enum SurfaceCommand {
    /// See [`DeckSurface::raise`].
    Raise { id: ResourceId },
    /// See [`DeckSurface::set_trash_visible`].
    SetTrashVisible { visible: bool },
    /// See [`DeckSurface::show_snap_box`].
    ShowSnapBox { bounds: Rect },
    /// See [`DeckSurface::show_guide`].
    ShowGuide { guide: GuideLine },
    /// See [`DeckSurface::clear_guides`].
    ClearGuides,
    /// See [`DeckSurface::set_pose`].
    SetPose { id: ResourceId, x: f64, y: f64 },
    /// See [`DeckSurface::redraw`].
    Redraw { id: ResourceId },
    /// See [`DeckSurface::remove`].
    Remove { id: ResourceId },
    /// See [`DeckSurface::set_selection`].
    SetSelection { id: Option<ResourceId> },
}

/// A surface that records every call, for hosts that replay them elsewhere
/// (e.g. a JavaScript scene graph) and for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<SurfaceCommand>,
}

impl RecordingSurface {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands in call order.
    #[must_use]
    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the recorder empty.
    pub fn drain(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Whether the trash zone is visible after replaying all commands.
    #[must_use]
    pub fn trash_visible(&self) -> bool {
        self.commands
            .iter()
            .rev()
            .find_map(|c| match c {
                SurfaceCommand::SetTrashVisible { visible } => Some(*visible),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Last pose set for a resource.
    #[must_use]
    pub fn last_pose(&self, id: ResourceId) -> Option<(f64, f64)> {
        self.commands.iter().rev().find_map(|c| match c {
            SurfaceCommand::SetPose { id: target, x, y } if *target == id => Some((*x, *y)),
            _ => None,
        })
    }
}

impl DeckSurface for RecordingSurface {
    fn raise(&mut self, id: ResourceId) {
        self.commands.push(SurfaceCommand::Raise { id });
    }

    fn set_trash_visible(&mut self, visible: bool) {
        self.commands.push(SurfaceCommand::SetTrashVisible { visible });
    }

    fn show_snap_box(&mut self, bounds: Rect) {
        self.commands.push(SurfaceCommand::ShowSnapBox { bounds });
    }

    fn show_guide(&mut self, guide: GuideLine) {
        self.commands.push(SurfaceCommand::ShowGuide { guide });
    }

    fn clear_guides(&mut self) {
        self.commands.push(SurfaceCommand::ClearGuides);
    }

    fn set_pose(&mut self, id: ResourceId, x: f64, y: f64) {
        self.commands.push(SurfaceCommand::SetPose { id, x, y });
    }

    fn redraw(&mut self, id: ResourceId) {
        self.commands.push(SurfaceCommand::Redraw { id });
    }

    fn remove(&mut self, id: ResourceId) {
        self.commands.push(SurfaceCommand::Remove { id });
    }

    fn set_selection(&mut self, id: Option<ResourceId>) {
        self.commands.push(SurfaceCommand::SetSelection { id });
    }
}
